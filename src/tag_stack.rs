use crate::{AbxError, Result};

/// Name pushed for the document itself, never rendered
pub const DOCUMENT_ROOT: &str = "xml";

/// Stack of open element names
///
/// The bottom entry is the synthetic document root pushed on START_DOCUMENT,
/// so `depth()` (the number of open elements) is one less than the length.
#[derive(Debug, Default, Clone)]
pub struct TagStack {
    tags: Vec<String>,
}

impl TagStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_document(&mut self) {
        self.tags.push(DOCUMENT_ROOT.to_string());
    }

    /// Pop the synthetic root; every element must already be closed
    pub fn close_document(&mut self) -> Result<()> {
        if self.tags.len() > 1 {
            return Err(AbxError::UnclosedTags(self.tags.split_off(1)));
        }
        self.tags.pop();
        Ok(())
    }

    pub fn push(&mut self, name: String) {
        self.tags.push(name);
    }

    /// Pop the innermost element, checking it is the one being closed
    pub fn pop(&mut self, name: &str) -> Result<String> {
        if self.tags.len() <= 1 {
            return Err(AbxError::UnbalancedEndTag(name.to_string()));
        }
        match self.tags.pop() {
            Some(open) if open == name => Ok(open),
            Some(open) => Err(AbxError::TagMismatch {
                expected: open,
                found: name.to_string(),
            }),
            None => Err(AbxError::UnbalancedEndTag(name.to_string())),
        }
    }

    /// Number of open elements, excluding the document root
    pub fn depth(&self) -> usize {
        self.tags.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_excludes_root() {
        let mut tags = TagStack::new();
        tags.open_document();
        assert_eq!(tags.depth(), 0);
        tags.push("packages".to_string());
        tags.push("package".to_string());
        assert_eq!(tags.depth(), 2);
        tags.pop("package").unwrap();
        tags.pop("packages").unwrap();
        tags.close_document().unwrap();
        assert_eq!(tags.depth(), 0);
    }

    #[test]
    fn test_mismatched_end_tag() {
        let mut tags = TagStack::new();
        tags.open_document();
        tags.push("a".to_string());
        match tags.pop("b") {
            Err(AbxError::TagMismatch { expected, found }) => {
                assert_eq!(expected, "a");
                assert_eq!(found, "b");
            }
            other => panic!("Expected TagMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_and_unbalanced() {
        let mut tags = TagStack::new();
        tags.open_document();
        assert!(matches!(tags.pop("a"), Err(AbxError::UnbalancedEndTag(_))));

        tags.push("a".to_string());
        match tags.close_document() {
            Err(AbxError::UnclosedTags(open)) => assert_eq!(open, vec!["a".to_string()]),
            other => panic!("Expected UnclosedTags, got {other:?}"),
        }
    }
}
