use crate::{AbxError, Event, FormatOptions, Result, TagStack, Token, TokenHandler};
use log::debug;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use std::io::Write;

/// Renders tokens as entity-escaped XML through `quick-xml`
///
/// Unlike [`TextFormatter`](crate::TextFormatter) this escapes text and
/// attribute values as entities and keeps `--` out of comment bodies, so the
/// result can be fed to an XML parser. Line breaks between elements come from
/// the writer's indentation; the newline option only terminates the document.
/// Attributes are gathered on a pending start tag until the next structural
/// token decides between an empty element and an open one.
pub struct XmlEmitter<W: Write> {
    writer: Writer<W>,
    options: FormatOptions,
    tags: TagStack,
    pending: Option<BytesStart<'static>>,
}

/// Break up every `--`, which may not appear inside an XML comment
fn comment_body(text: &str) -> String {
    let mut body = text.to_string();
    while body.contains("--") {
        body = body.replace("--", "- -");
    }
    format!(" {body} ")
}

impl<W: Write> XmlEmitter<W> {
    pub fn new(output: W, options: FormatOptions) -> Self {
        // quick-xml indents with a repeated single byte
        let writer = match options.indent.as_bytes() {
            [] => Writer::new(output),
            [first, rest @ ..] if rest.iter().all(|b| b == first) => {
                Writer::new_with_indent(output, *first, options.indent.len())
            }
            _ => Writer::new_with_indent(output, b'\t', 1),
        };
        Self {
            writer,
            options,
            tags: TagStack::new(),
            pending: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn emit(&mut self, event: XmlEvent<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| AbxError::Xml(e.to_string()))
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.emit(XmlEvent::Start(start))?;
        }
        Ok(())
    }

    fn end_tag(&mut self, name: &str) -> Result<()> {
        let name = self.tags.pop(name)?;
        match self.pending.take() {
            Some(start) if self.options.self_close_empty => self.emit(XmlEvent::Empty(start)),
            Some(start) => {
                self.emit(XmlEvent::Start(start))?;
                self.emit(XmlEvent::End(BytesEnd::new(name)))
            }
            None => self.emit(XmlEvent::End(BytesEnd::new(name))),
        }
    }
}

impl<W: Write> TokenHandler for XmlEmitter<W> {
    fn handle(&mut self, token: &Token) -> Result<bool> {
        match token.event {
            Event::StartDocument => {
                self.tags.open_document();
                self.emit(XmlEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            }
            Event::EndDocument => {
                self.flush_pending()?;
                self.tags.close_document()?;
                let newline = self.options.newline.clone();
                let output = self.writer.get_mut();
                output.write_all(newline.as_bytes())?;
                output.flush()?;
                return Ok(false);
            }
            Event::StartTag => {
                self.flush_pending()?;
                let name = token.value.render(&self.options).into_owned();
                self.tags.push(name.clone());
                self.pending = Some(BytesStart::new(name));
            }
            Event::EndTag => {
                let name = token.value.render(&self.options);
                self.end_tag(&name)?;
            }
            Event::Attribute => {
                let start = self.pending.as_mut().ok_or(AbxError::AttributeOutsideTag)?;
                let name = token.name.as_deref().unwrap_or_default();
                let value = token.value.render(&self.options);
                start.push_attribute((name, value.as_ref()));
            }
            Event::Text => {
                self.flush_pending()?;
                let text = token.value.render(&self.options);
                self.emit(XmlEvent::Text(BytesText::new(&text)))?;
            }
            Event::Comment => {
                self.flush_pending()?;
                let text = token.value.render(&self.options);
                self.emit(XmlEvent::Comment(BytesText::from_escaped(comment_body(&text))))?;
            }
            // the writer does its own indentation
            Event::IgnorableWhitespace => {}
            Event::CdSect | Event::EntityRef | Event::ProcessingInstruction | Event::DocDecl => {
                debug!("skipping {:?} token", token.event);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use quick_xml::Reader;
    use quick_xml::events::Event as ReadEvent;

    fn token(event: Event, value: Value) -> Token {
        Token {
            event,
            name: None,
            value,
        }
    }

    fn attr(name: &str, value: Value) -> Token {
        Token {
            event: Event::Attribute,
            name: Some(name.to_string()),
            value,
        }
    }

    fn render(options: FormatOptions, body: Vec<Token>) -> String {
        let mut emitter = XmlEmitter::new(Vec::new(), options);
        emitter.handle(&token(Event::StartDocument, Value::Null)).unwrap();
        for t in &body {
            emitter.handle(t).unwrap();
        }
        emitter.handle(&token(Event::EndDocument, Value::Null)).unwrap();
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    #[test]
    fn test_escapes_entities() {
        let xml = render(
            FormatOptions::default().with_indent(""),
            vec![
                token(Event::StartTag, Value::String("a".to_string())),
                attr("q", Value::String("x\"<y".to_string())),
                token(Event::Text, Value::String("1 & 2".to_string())),
                token(Event::EndTag, Value::String("a".to_string())),
            ],
        );
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><a q=\"x&quot;&lt;y\">1 &amp; 2</a>\n"
        );
    }

    #[test]
    fn test_output_is_well_formed() {
        let xml = render(
            FormatOptions::default(),
            vec![
                token(Event::StartTag, Value::String("packages".to_string())),
                token(Event::StartTag, Value::String("package".to_string())),
                attr("version", Value::Int(3)),
                attr("flags", Value::IntHex(0x10)),
                token(Event::EndTag, Value::String("package".to_string())),
                token(Event::Comment, Value::String("done".to_string())),
                token(Event::EndTag, Value::String("packages".to_string())),
            ],
        );

        let mut reader = Reader::from_str(&xml);
        let mut names = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                ReadEvent::Eof => break,
                ReadEvent::Start(e) | ReadEvent::Empty(e) => {
                    names.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
                }
                _ => {}
            }
        }
        assert_eq!(names, vec!["packages", "package"]);
        assert!(xml.contains("<package version=\"3\" flags=\"0x10\"/>"));
    }

    #[test]
    fn test_comment_dashes_are_split() {
        let xml = render(
            FormatOptions::default().with_indent(""),
            vec![
                token(Event::StartTag, Value::String("a".to_string())),
                token(Event::Comment, Value::String("x--y ---".to_string())),
                token(Event::Comment, Value::String("-".to_string())),
                token(Event::EndTag, Value::String("a".to_string())),
            ],
        );

        let mut reader = Reader::from_str(&xml);
        reader.config_mut().check_comments = true;
        let mut comments = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                ReadEvent::Eof => break,
                ReadEvent::Comment(c) => {
                    comments.push(String::from_utf8_lossy(&c).to_string());
                }
                _ => {}
            }
        }
        assert_eq!(comments, vec![" x- -y - - - ", " - "]);
    }

    #[test]
    fn test_attribute_needs_open_start_tag() {
        let mut emitter = XmlEmitter::new(Vec::new(), FormatOptions::default());
        emitter.handle(&token(Event::StartDocument, Value::Null)).unwrap();
        assert!(matches!(
            emitter.handle(&attr("x", Value::Int(1))),
            Err(AbxError::AttributeOutsideTag)
        ));
    }
}
