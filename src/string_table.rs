use crate::{AbxError, INTERNED_STRING_NEW, Result};

/// Append-only table of interned strings
///
/// Indices are handed out in order of first appearance and stay valid for the
/// whole document. `0xFFFF` is reserved on the wire and never names an entry.
#[derive(Debug, Default, Clone)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly seen literal, returning the index later references will use
    pub fn push(&mut self, value: String) -> usize {
        self.strings.push(value);
        self.strings.len() - 1
    }

    /// Look up a previously interned string
    pub fn get(&self, index: u16) -> Result<&str> {
        if index == INTERNED_STRING_NEW {
            return Err(AbxError::InvalidInternedStringIndex {
                index,
                len: self.strings.len(),
            });
        }
        self.strings
            .get(index as usize)
            .map(String::as_str)
            .ok_or(AbxError::InvalidInternedStringIndex {
                index,
                len: self.strings.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_appearance_order() {
        let mut table = StringTable::new();
        assert_eq!(table.push("package".to_string()), 0);
        assert_eq!(table.push("name".to_string()), 1);
        assert_eq!(table.get(1).unwrap(), "name");
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["package", "name"]);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut table = StringTable::new();
        table.push("a".to_string());
        assert!(matches!(
            table.get(1),
            Err(AbxError::InvalidInternedStringIndex { index: 1, len: 1 })
        ));
        assert!(table.get(INTERNED_STRING_NEW).is_err());
    }
}
