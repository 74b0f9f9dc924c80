//! Named expressions for `*[name]` lookups.

use indexmap::IndexMap;

use crate::expression::Expression;

/// A table of expressions keyed by name, kept in insertion order.
///
/// The parser builds one of these from the `[name]` definitions in a
/// document. Callers can also hand one to
/// [`parse_with_references`](crate::parse_with_references) so documents can
/// refer to expressions defined elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    entries: IndexMap<String, Expression>,
}

impl ReferenceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `expression`. Rebinding keeps the original position.
    pub fn set(&mut self, name: impl Into<String>, expression: Expression) {
        self.entries.insert(name.into(), expression);
    }

    /// The expression bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Expression> {
        self.entries.get(name)
    }

    /// Remove `name`, returning what it was bound to.
    pub fn remove(&mut self, name: &str) -> Option<Expression> {
        self.entries.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of `name` in insertion order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.entries.get_index(index).map(|(k, _)| k.as_str())
    }

    pub fn expression_at(&self, index: usize) -> Option<&Expression> {
        self.entries.get_index(index).map(|(_, v)| v)
    }

    /// Iterate over `(name, expression)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expression)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Expression)> for ReferenceTable {
    fn from_iter<I: IntoIterator<Item = (String, Expression)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut table = ReferenceTable::new();
        table.set("name", Expression::value("Bob"));
        assert_eq!(table.get("name"), Some(&Expression::value("Bob")));
        assert_eq!(table.get("other"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_overwrite_in_place() {
        let mut table = ReferenceTable::new();
        table.set("a", Expression::value("1"));
        table.set("b", Expression::value("2"));
        table.set("a", Expression::value("3"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.key_at(0), Some("a"));
        assert_eq!(table.expression_at(0), Some(&Expression::value("3")));
        assert_eq!(table.index_of("b"), Some(1));
    }

    #[test]
    fn test_remove_keeps_order_of_rest() {
        let mut table: ReferenceTable = [
            ("a".to_string(), Expression::null()),
            ("b".to_string(), Expression::null()),
            ("c".to_string(), Expression::null()),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.remove("a"), Some(Expression::null()));
        assert!(table.remove("a").is_none());
        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert_eq!(table.index_of("a"), None);
    }
}
