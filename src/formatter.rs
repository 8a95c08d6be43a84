use crate::{AbxError, Event, FormatOptions, Result, TagStack, Token};
use log::debug;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::Write;

/// Consumer of decoded tokens
///
/// `handle` returns `Ok(false)` once the document is complete.
pub trait TokenHandler {
    fn handle(&mut self, token: &Token) -> Result<bool>;
}

/// Collects the raw token stream
impl TokenHandler for Vec<Token> {
    fn handle(&mut self, token: &Token) -> Result<bool> {
        self.push(token.clone());
        Ok(token.event != Event::EndDocument)
    }
}

/// Escape an attribute value for display inside double quotes
///
/// Backslashes and quotes get a backslash, tab/CR/LF their usual escapes and
/// any other control character becomes `\xNN`.
pub fn escape_attribute_value(value: &str) -> Cow<'_, str> {
    if !value
        .chars()
        .any(|c| c == '\\' || c == '"' || c.is_ascii_control())
    {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(escaped, "\\x{:02x}", c as u32);
            }
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Renders tokens as indented, readable XML-like text
///
/// Start tags are left open after their name so attributes can follow; the
/// bracket is closed by whatever comes next. Output is not guaranteed to be
/// reparsable: text is written raw.
pub struct TextFormatter<W: Write> {
    output: W,
    options: FormatOptions,
    tags: TagStack,
    in_tag: bool,
    has_content: bool,
    attribute_count: usize,
}

impl<W: Write> TextFormatter<W> {
    pub fn new(output: W, options: FormatOptions) -> Self {
        Self {
            output,
            options,
            tags: TagStack::new(),
            in_tag: false,
            has_content: false,
            attribute_count: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn newline(&mut self) -> Result<()> {
        self.output.write_all(self.options.newline.as_bytes())?;
        Ok(())
    }

    fn indent(&mut self) -> Result<()> {
        let depth = self.tags.depth();
        if !self.options.indent.is_empty() && depth > 0 {
            let indentation = self.options.indentation(depth);
            self.output.write_all(indentation.as_bytes())?;
        }
        Ok(())
    }

    /// Finish an open start tag with `>`
    fn close_start_tag(&mut self) -> Result<()> {
        if self.in_tag {
            self.output.write_all(b">")?;
            self.newline()?;
            self.in_tag = false;
        }
        Ok(())
    }

    fn start_tag(&mut self, name: String) -> Result<()> {
        self.close_start_tag()?;
        self.indent()?;
        write!(self.output, "<{}", name)?;
        self.tags.push(name);
        self.in_tag = true;
        self.has_content = false;
        self.attribute_count = 0;
        Ok(())
    }

    fn end_tag(&mut self, name: &str) -> Result<()> {
        let name = self.tags.pop(name)?;
        if self.in_tag {
            self.in_tag = false;
            if self.options.self_close_empty && !self.has_content {
                self.output.write_all(b" />")?;
                self.newline()?;
                self.has_content = true;
                return Ok(());
            }
            self.output.write_all(b">")?;
            self.newline()?;
        }
        self.indent()?;
        write!(self.output, "</{}>", name)?;
        self.newline()?;
        self.has_content = true;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.close_start_tag()?;
        self.has_content = true;
        self.indent()?;
        self.output.write_all(text.as_bytes())?;
        self.newline()
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        self.close_start_tag()?;
        self.has_content = true;
        write!(self.output, "<!-- {} -->", text)?;
        self.newline()
    }

    fn attribute(&mut self, token: &Token) -> Result<()> {
        if !self.in_tag {
            return Err(AbxError::AttributeOutsideTag);
        }
        let name = token.name.as_deref().unwrap_or_default();
        let rendered = token.value.render(&self.options);
        let value = escape_attribute_value(&rendered);

        if self.options.break_attributes && self.attribute_count > 0 {
            self.newline()?;
            self.indent()?;
        } else {
            self.output.write_all(b" ")?;
        }

        if self.options.quote_all_attributes || !token.value.is_numeric() {
            write!(self.output, "{}=\"{}\"", name, value)?;
        } else {
            write!(self.output, "{}={}", name, value)?;
        }
        self.attribute_count += 1;
        Ok(())
    }
}

impl<W: Write> TokenHandler for TextFormatter<W> {
    fn handle(&mut self, token: &Token) -> Result<bool> {
        match token.event {
            Event::StartDocument => self.tags.open_document(),
            Event::EndDocument => {
                self.tags.close_document()?;
                self.output.flush()?;
                return Ok(false);
            }
            Event::StartTag => {
                let name = token.value.render(&self.options).into_owned();
                self.start_tag(name)?;
            }
            Event::EndTag => {
                let name = token.value.render(&self.options);
                self.end_tag(&name)?;
            }
            Event::Text => {
                let text = token.value.render(&self.options);
                self.text(&text)?;
            }
            Event::IgnorableWhitespace => {
                let text = token.value.render(&self.options);
                self.output.write_all(text.as_bytes())?;
            }
            Event::Comment => {
                let text = token.value.render(&self.options);
                self.comment(&text)?;
            }
            Event::Attribute => self.attribute(token)?,
            Event::CdSect | Event::EntityRef | Event::ProcessingInstruction | Event::DocDecl => {
                debug!("skipping {:?} token", token.event);
            }
        }
        Ok(true)
    }
}
