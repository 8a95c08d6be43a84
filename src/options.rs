use clap::ValueEnum;

/// Spelling of boolean values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BoolStyle {
    /// `True` / `False`
    #[default]
    Capitalized,
    /// `true` / `false`
    Lowercase,
    /// `TRUE` / `FALSE`
    Uppercase,
    /// `1` / `0`
    Numeric,
}

impl BoolStyle {
    pub fn spell(self, value: bool) -> &'static str {
        match (self, value) {
            (BoolStyle::Capitalized, true) => "True",
            (BoolStyle::Capitalized, false) => "False",
            (BoolStyle::Lowercase, true) => "true",
            (BoolStyle::Lowercase, false) => "false",
            (BoolStyle::Uppercase, true) => "TRUE",
            (BoolStyle::Uppercase, false) => "FALSE",
            (BoolStyle::Numeric, true) => "1",
            (BoolStyle::Numeric, false) => "0",
        }
    }
}

/// Which renderer consumes the decoded tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented, readable approximation of the document
    #[default]
    Text,
    /// Well-formed, entity-escaped XML
    Xml,
}

/// Presentation settings
///
/// None of these change what is decoded, only how it is printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Emitted after tags and content; empty for a single line
    pub newline: String,
    /// Repeated once per open element; empty for no indentation
    pub indent: String,
    /// Quote every attribute value, otherwise numbers and booleans are bare
    pub quote_all_attributes: bool,
    /// Put every attribute after the first on its own line
    pub break_attributes: bool,
    /// Render empty elements as `<name />` instead of `<name></name>`
    pub self_close_empty: bool,
    pub bool_style: BoolStyle,
    /// Drop leading zeros from hex numbers: `0x0000001f` becomes `0x1f`
    pub trim_hex: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            newline: "\n".to_string(),
            indent: "\t".to_string(),
            quote_all_attributes: true,
            break_attributes: false,
            self_close_empty: true,
            bool_style: BoolStyle::Capitalized,
            trim_hex: true,
        }
    }
}

impl FormatOptions {
    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_quote_all_attributes(mut self, quote_all: bool) -> Self {
        self.quote_all_attributes = quote_all;
        self
    }

    pub fn with_break_attributes(mut self, break_attributes: bool) -> Self {
        self.break_attributes = break_attributes;
        self
    }

    pub fn with_self_close_empty(mut self, self_close: bool) -> Self {
        self.self_close_empty = self_close;
        self
    }

    pub fn with_bool_style(mut self, style: BoolStyle) -> Self {
        self.bool_style = style;
        self
    }

    pub fn with_trim_hex(mut self, trim_hex: bool) -> Self {
        self.trim_hex = trim_hex;
        self
    }

    /// Indentation for the given number of open elements
    pub fn indentation(&self, depth: usize) -> String {
        self.indent.repeat(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_styles() {
        let spelled: Vec<_> = [
            BoolStyle::Capitalized,
            BoolStyle::Lowercase,
            BoolStyle::Uppercase,
            BoolStyle::Numeric,
        ]
        .into_iter()
        .map(|style| (style.spell(true), style.spell(false)))
        .collect();
        assert_eq!(
            spelled,
            vec![
                ("True", "False"),
                ("true", "false"),
                ("TRUE", "FALSE"),
                ("1", "0")
            ]
        );
    }

    #[test]
    fn test_builder() {
        let options = FormatOptions::default()
            .with_indent("  ")
            .with_newline("")
            .with_trim_hex(false);
        assert_eq!(options.indentation(2), "    ");
        assert!(options.newline.is_empty());
        assert!(!options.trim_hex);
        assert!(options.self_close_empty);
    }

    #[test]
    fn test_value_enum_names() {
        assert_eq!(
            BoolStyle::from_str("numeric", false).unwrap(),
            BoolStyle::Numeric
        );
        assert_eq!(OutputFormat::from_str("xml", false).unwrap(), OutputFormat::Xml);
    }
}
