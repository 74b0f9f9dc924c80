//! Text parser
//!
//! A recursive descent over the source text. Each call to
//! `parse_expression` skips leading whitespace and comments, then dispatches
//! on the next characters:
//! - `#(` array, `@(` map
//! - `[name]` reference definition, `*[name]` reference insertion
//! - `<...>` Base64 binary data
//! - anything else is a quoted string or bareword value

use base64::prelude::*;
use indexmap::IndexMap;

use crate::error::{Error, Position, Result};
use crate::expression::Expression;
use crate::scanner::{is_reserved, ParseState};

/// Parse exactly one expression, allowing only whitespace and comments around it.
pub fn parse_root(state: &mut ParseState<'_, '_>) -> Result<Expression> {
    let expr = parse_expression(state)?;

    state.skip_trivia();
    if !state.is_empty() {
        return Err(Error::ExtraData(state.position()));
    }

    expr.ok_or_else(|| Error::EmptyInput(state.position()))
}

/// Parse the next expression.
///
/// Returns `Ok(None)` if only whitespace and comments remained.
fn parse_expression(state: &mut ParseState<'_, '_>) -> Result<Option<Expression>> {
    parse_slot(state, false)
}

/// Parse the expression in one slot of the tree.
///
/// With `optional` set, a slot that holds nothing (end of input, or an
/// empty bareword at the slot itself) yields `Ok(None)` instead of an
/// error. Nested compounds always parse their children with
/// `optional` unset.
fn parse_slot(state: &mut ParseState<'_, '_>, optional: bool) -> Result<Option<Expression>> {
    if state.is_empty() {
        if optional {
            return Ok(None);
        }
        return Err(Error::EmptyInput(state.position()));
    }

    state.skip_trivia();
    if state.is_empty() {
        return Ok(None);
    }

    if state.starts_with("#(") {
        parse_array(state).map(Some)
    } else if state.starts_with("@(") {
        parse_map(state).map(Some)
    } else if state.starts_with("[") {
        parse_reference_definition(state, optional)
    } else if state.starts_with("*[") {
        parse_reference_insert(state).map(Some)
    } else if state.starts_with("<") {
        parse_binary_data(state).map(Some)
    } else {
        let start = state.position();
        match parse_value(state) {
            // Only an empty token right at this slot counts as missing.
            Err(e) if optional && e.is_empty_input() && e.position() == Some(start) => Ok(None),
            result => result.map(Some),
        }
    }
}

// ============================================================================
// Compounds
// ============================================================================

fn parse_array(state: &mut ParseState<'_, '_>) -> Result<Expression> {
    state.advance(2);

    let mut items = Vec::new();
    loop {
        state.skip_trivia();
        if state.is_empty() {
            return Err(Error::ArrayMissingEndParen(state.position()));
        }
        if state.starts_with(")") {
            break;
        }

        if let Some(item) = parse_expression(state)? {
            items.push(item);
        }
    }

    state.advance(1);
    Ok(Expression::Array(items))
}

fn parse_map(state: &mut ParseState<'_, '_>) -> Result<Expression> {
    state.advance(2);

    let mut entries = IndexMap::new();
    loop {
        state.skip_trivia();
        if state.is_empty() {
            return Err(Error::MapMissingEndParen(state.position()));
        }
        if state.starts_with(")") {
            break;
        }

        let key_pos = state.position();
        let key = match parse_expression(state)? {
            Some(Expression::Value(key)) => key,
            _ => return Err(Error::MapKeyMustBeValue(key_pos)),
        };

        // A missing value is reported against the key.
        let Some(value) = parse_slot(state, true)? else {
            return Err(Error::MapNoValue(key_pos));
        };

        entries.insert(key, value);
    }

    state.advance(1);
    Ok(Expression::Map(entries))
}

// ============================================================================
// References
// ============================================================================

/// Reference names follow identifier rules: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_reference_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `[name] expr` binds a copy of `expr` to `name` and yields `expr` itself.
fn parse_reference_definition(
    state: &mut ParseState<'_, '_>,
    optional: bool,
) -> Result<Option<Expression>> {
    let start = state.position();
    let rest = state.rest();

    let Some(end) = rest.find(']') else {
        return Err(Error::ReferenceMissingEndBracket(start));
    };
    let name = &rest[1..end];
    if !is_reference_name(name) {
        return Err(Error::InvalidReferenceName(start, name.to_string()));
    }
    state.advance(end + 1);

    let expr = parse_slot(state, optional)?;
    if let Some(expr) = &expr {
        state.internal.set(name, expr.copy());
    }
    Ok(expr)
}

/// `*[name]` yields a copy of the expression bound to `name`.
///
/// Only definitions earlier in the document are visible. The caller's table
/// is consulted when the document has no binding of its own.
fn parse_reference_insert(state: &mut ParseState<'_, '_>) -> Result<Expression> {
    let rest = state.rest();

    let Some(end) = rest.find(']') else {
        return Err(Error::ReferenceUseMissingEndBracket(state.position()));
    };
    let name = &rest[2..end];
    state.advance(end + 1);

    let found = state
        .internal
        .get(name)
        .or_else(|| state.external.and_then(|table| table.get(name)));

    match found {
        Some(expr) => Ok(expr.copy()),
        None => Err(Error::UnknownReference(state.position(), name.to_string())),
    }
}

// ============================================================================
// Scalars
// ============================================================================

fn parse_binary_data(state: &mut ParseState<'_, '_>) -> Result<Expression> {
    let start = state.position();
    let rest = state.rest();

    let Some(end) = rest.find('>') else {
        return Err(Error::BinaryDataMissingEnd(start));
    };
    let encoded: String = rest[1..end]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let data = BASE64_STANDARD
        .decode(encoded)
        .map_err(|_| Error::InvalidBase64(start))?;

    state.advance(end + 1);
    Ok(Expression::BinaryData(data))
}

fn parse_value(state: &mut ParseState<'_, '_>) -> Result<Expression> {
    let start = state.position();
    let (text, len) = scan_value(state.rest(), start)?;
    state.advance(len);

    if text == "null" || text == "nil" {
        Ok(Expression::Null)
    } else {
        Ok(Expression::Value(text))
    }
}

/// Read a quoted string or bareword from the start of `s`.
/// Returns the unescaped text and the number of bytes it occupied.
fn scan_value(s: &str, pos: Position) -> Result<(String, usize)> {
    let Some(body) = s.strip_prefix('"') else {
        let len = s.find(is_reserved).unwrap_or(s.len());
        if len == 0 {
            return Err(Error::EmptyString(pos));
        }
        return Ok((s[..len].to_string(), len));
    };

    let mut result = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            // Both quotes are part of the token.
            '"' => return Ok((result, i + 2)),
            '\\' => match chars.next() {
                Some((_, escaped)) => result.push(unescape(escaped, pos)?),
                None => break,
            },
            c => result.push(c),
        }
    }

    Err(Error::MissingEndQuote(pos))
}

fn unescape(c: char, pos: Position) -> Result<char> {
    match c {
        '"' => Ok('"'),
        'r' => Ok('\r'),
        'n' => Ok('\n'),
        't' => Ok('\t'),
        '\\' => Ok('\\'),
        _ => Err(Error::InvalidEscape(pos, c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceTable;

    fn parse(input: &str) -> Result<Expression> {
        parse_root(&mut ParseState::new(input, None))
    }

    fn error_position(input: &str) -> (usize, usize) {
        let pos = parse(input).unwrap_err().position().unwrap();
        (pos.line, pos.column)
    }

    #[test]
    fn test_bareword() {
        assert_eq!(parse("val").unwrap(), Expression::value("val"));
        assert_eq!(parse("2.45").unwrap(), Expression::value("2.45"));
    }

    #[test]
    fn test_quoted_with_escapes() {
        assert_eq!(parse(" \"val\" ").unwrap(), Expression::value("val"));
        assert_eq!(parse(" \"val\\\"\" ").unwrap(), Expression::value("val\""));
        assert_eq!(
            parse(r#""a\tb\nc\rd\\e""#).unwrap(),
            Expression::value("a\tb\nc\rd\\e")
        );
        assert_eq!(parse("\"\"").unwrap(), Expression::value(""));
    }

    #[test]
    fn test_null_words() {
        assert_eq!(parse("null").unwrap(), Expression::Null);
        assert_eq!(parse("nil").unwrap(), Expression::Null);
        assert_eq!(parse("nullable").unwrap(), Expression::value("nullable"));
    }

    #[test]
    fn test_bareword_stops_at_reserved() {
        let expr = parse("#(a#b)");
        assert!(matches!(expr, Err(Error::EmptyString(_))));
        let expr = parse("#(a\"b\")").unwrap();
        assert_eq!(
            expr,
            Expression::from(vec![Expression::value("a"), Expression::value("b")])
        );
    }

    #[test]
    fn test_array() {
        let expr = parse("#(1 2 3)").unwrap();
        assert_eq!(expr.array_len().unwrap(), 3);
        assert_eq!(expr.array_at(2).unwrap(), Some(&Expression::value("3")));
        assert_eq!(parse("#()").unwrap(), Expression::array());
    }

    #[test]
    fn test_map() {
        let expr = parse("@(a b c d)").unwrap();
        assert_eq!(expr.map_len().unwrap(), 2);
        assert_eq!(expr.map_key_at(0).unwrap(), Some("a"));
        assert_eq!(expr.map_value_for_key("c").unwrap(), Some(&Expression::value("d")));
    }

    #[test]
    fn test_map_duplicate_key_updates_in_place() {
        let expr = parse("@(a 1 c 2 a 3)").unwrap();
        assert_eq!(expr.map_len().unwrap(), 2);
        assert_eq!(expr.map_key_at(0).unwrap(), Some("a"));
        assert_eq!(expr.map_value_at(0).unwrap(), Some(&Expression::value("3")));
    }

    #[test]
    fn test_binary_data() {
        let expr = parse("<aGVsbG8=>").unwrap();
        assert_eq!(expr.as_binary_data().unwrap(), b"hello");
        assert_eq!(parse("<>").unwrap(), Expression::binary_data(Vec::new()));
    }

    #[test]
    fn test_comments() {
        let input = "; leading\n#(a ;(-- inline --) b ; trailing\n c)";
        let expr = parse(input).unwrap();
        assert_eq!(expr.array_len().unwrap(), 3);
    }

    #[test]
    fn test_reference_definition_is_transparent() {
        let expr = parse("@(first [val]\"name\")").unwrap();
        assert_eq!(
            expr.map_value_for_key("first").unwrap(),
            Some(&Expression::value("name"))
        );
    }

    #[test]
    fn test_reference_insert_copies() {
        let expr = parse("@(first [val]#(1 2) second *[val])").unwrap();
        let second = expr.map_value_for_key("second").unwrap().unwrap();
        assert_eq!(second.array_len().unwrap(), 2);
    }

    #[test]
    fn test_reference_must_be_defined_first() {
        let err = parse("@(second *[val] first [val]a)").unwrap_err();
        assert!(matches!(err, Error::UnknownReference(_, ref name) if name == "val"));
    }

    #[test]
    fn test_internal_reference_shadows_external() {
        let mut external = ReferenceTable::new();
        external.set("v", Expression::value("outside"));
        let mut state = ParseState::new("#([v]inside *[v])", Some(&external));
        let expr = parse_root(&mut state).unwrap();
        assert_eq!(expr.array_at(1).unwrap(), Some(&Expression::value("inside")));
        assert_eq!(external.get("v"), Some(&Expression::value("outside")));
    }

    #[test]
    fn test_reference_names() {
        assert!(is_reference_name("_a1"));
        assert!(is_reference_name("Name"));
        assert!(!is_reference_name(""));
        assert!(!is_reference_name("1a"));
        assert!(!is_reference_name("asd-b"));
    }

    #[test]
    fn test_error_positions() {
        assert_eq!(error_position(""), (1, 1));
        assert_eq!(error_position("#(1) 1"), (1, 6));
        assert_eq!(error_position("#("), (1, 3));
        assert_eq!(error_position("@("), (1, 3));
        assert_eq!(error_position("@(#() a)"), (1, 3));
        assert_eq!(error_position("["), (1, 1));
        assert_eq!(error_position("*[asdf]"), (1, 8));
        assert_eq!(error_position(" ;(-- asdf --)  "), (1, 17));
        assert_eq!(error_position("[asd-b] c"), (1, 1));
        assert_eq!(error_position("\n#(a) 1"), (2, 6));
        assert_eq!(error_position("\r\n#(a) 1"), (2, 6));
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(parse(""), Err(Error::EmptyInput(_))));
        assert!(matches!(parse("   "), Err(Error::EmptyInput(_))));
        assert!(matches!(parse("#(1) 1"), Err(Error::ExtraData(_))));
        assert!(matches!(parse("#("), Err(Error::ArrayMissingEndParen(_))));
        assert!(matches!(parse("@("), Err(Error::MapMissingEndParen(_))));
        assert!(matches!(parse("@(#() a)"), Err(Error::MapKeyMustBeValue(_))));
        assert!(matches!(parse("["), Err(Error::ReferenceMissingEndBracket(_))));
        assert!(matches!(parse("*[a"), Err(Error::ReferenceUseMissingEndBracket(_))));
        assert!(matches!(parse("[1a] b"), Err(Error::InvalidReferenceName(..))));
        assert!(matches!(parse("<aGVs"), Err(Error::BinaryDataMissingEnd(_))));
        assert!(matches!(parse("<a!b>"), Err(Error::InvalidBase64(_))));
        assert!(matches!(parse("\"abc"), Err(Error::MissingEndQuote(_))));
        assert!(matches!(parse("\"a\\qb\""), Err(Error::InvalidEscape(_, 'q'))));
        assert!(matches!(parse(")"), Err(Error::EmptyString(_))));
    }

    #[test]
    fn test_map_missing_value() {
        assert_eq!(parse("@(a)").unwrap_err(), Error::MapNoValue(Position::new(1, 3)));
        assert_eq!(parse("@(a b c").unwrap_err(), Error::MapNoValue(Position::new(1, 7)));
        assert_eq!(parse("@(a   ").unwrap_err(), Error::MapNoValue(Position::new(1, 3)));
    }

    #[test]
    fn test_map_missing_value_behind_reference_definition() {
        assert_eq!(parse("@(k [r])").unwrap_err(), Error::MapNoValue(Position::new(1, 3)));
    }

    #[test]
    fn test_map_nested_empty_token_is_not_missing_value() {
        assert_eq!(parse("@(k #(a ]))").unwrap_err(), Error::EmptyString(Position::new(1, 9)));
        assert_eq!(parse("@(k #(*))").unwrap_err(), Error::EmptyString(Position::new(1, 7)));
        assert_eq!(
            parse("@(k @(x #(])))").unwrap_err(),
            Error::EmptyString(Position::new(1, 11))
        );
        assert_eq!(parse("#(a ])").unwrap_err(), Error::EmptyString(Position::new(1, 5)));
    }

    #[test]
    fn test_map_value_errors_propagate() {
        let err = parse("@(a #(b)").unwrap_err();
        assert_eq!(err, Error::MapMissingEndParen(Position::new(1, 9)));
        let err = parse("@(a \"b)").unwrap_err();
        assert_eq!(err, Error::MissingEndQuote(Position::new(1, 5)));
    }

    #[test]
    fn test_positions_inside_strings_and_comments() {
        let err = parse("#(\"a\nb\" ;(-- x\ny --) c").unwrap_err();
        assert_eq!(err, Error::ArrayMissingEndParen(Position::new(3, 8)));
    }
}
