//! Write Wexpr expressions back to text.

use base64::prelude::*;

use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::scanner::is_reserved;

/// Layout of the written text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// Everything on one line, children separated by single spaces.
    #[default]
    Compact,
    /// One child per line, indented with a tab per nesting level.
    HumanReadable,
}

/// Encode an expression as Wexpr text.
///
/// No newline follows the outermost expression. Fails only if the tree
/// contains an `Invalid` expression.
pub fn encode(expr: &Expression, style: Style) -> Result<String> {
    let mut out = String::new();
    write_expression(&mut out, expr, style, 0)?;
    Ok(out)
}

// Assumes the caller already placed us at the right indent; `indent` is the
// level the closing paren of a multiline compound goes at.
fn write_expression(out: &mut String, expr: &Expression, style: Style, indent: usize) -> Result<()> {
    match expr {
        Expression::Invalid => return Err(Error::InvalidExpression),
        Expression::Null => out.push_str("null"),
        Expression::Value(s) => write_value(out, s),
        Expression::BinaryData(b) => {
            out.push('<');
            out.push_str(&BASE64_STANDARD.encode(b));
            out.push('>');
        }
        Expression::Array(items) => {
            if items.is_empty() {
                out.push_str("#()");
                return Ok(());
            }
            out.push_str("#(");
            for (i, item) in items.iter().enumerate() {
                start_child(out, style, indent, i);
                write_expression(out, item, style, indent + 1)?;
                end_child(out, style);
            }
            close(out, style, indent);
        }
        Expression::Map(entries) => {
            // An empty key can only come from mutating keys after parsing; it has no text form.
            let written: Vec<_> = entries.iter().filter(|(k, _)| !k.is_empty()).collect();
            if written.is_empty() {
                out.push_str("@()");
                return Ok(());
            }
            out.push_str("@(");
            for (i, (key, value)) in written.into_iter().enumerate() {
                start_child(out, style, indent, i);
                write_value(out, key);
                out.push(' ');
                write_expression(out, value, style, indent + 1)?;
                end_child(out, style);
            }
            close(out, style, indent);
        }
    }
    Ok(())
}

fn start_child(out: &mut String, style: Style, indent: usize, index: usize) {
    match style {
        Style::Compact => {
            if index > 0 {
                out.push(' ');
            }
        }
        Style::HumanReadable => {
            if index == 0 {
                out.push('\n');
            }
            push_indent(out, indent + 1);
        }
    }
}

fn end_child(out: &mut String, style: Style) {
    if style == Style::HumanReadable {
        out.push('\n');
    }
}

fn close(out: &mut String, style: Style, indent: usize) {
    if style == Style::HumanReadable {
        push_indent(out, indent);
    }
    out.push(')');
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push('\t');
    }
}

/// A value can be written bare if it is non-empty and has no reserved characters.
pub fn is_bareword_safe(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(is_reserved)
}

fn write_value(out: &mut String, s: &str) {
    if is_bareword_safe(s) {
        out.push_str(s);
        return;
    }

    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}
