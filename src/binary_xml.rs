use crate::{ATTRIBUTE, COMMENT, DOCDECL, IGNORABLE_WHITESPACE, PROCESSING_INSTRUCTION};
use crate::{AbxError, INTERNED_STRING_NEW, PROTOCOL_MAGIC_VERSION_0, Result};
use crate::{ByteCursor, StringTable, Value, ValueType};
use crate::{CDSECT, END_DOCUMENT, END_TAG, ENTITY_REF, START_DOCUMENT, START_TAG, TEXT};
use log::{debug, trace};
use std::io::{self, Read};

/// Structural meaning selected by the low nibble of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    StartDocument,
    EndDocument,
    StartTag,
    EndTag,
    Text,
    CdSect,
    EntityRef,
    IgnorableWhitespace,
    ProcessingInstruction,
    Comment,
    DocDecl,
    Attribute,
}

impl Event {
    /// Split the event out of a token byte
    pub fn from_token(token: u8) -> Result<Self> {
        let event = match token & 0x0F {
            START_DOCUMENT => Event::StartDocument,
            END_DOCUMENT => Event::EndDocument,
            START_TAG => Event::StartTag,
            END_TAG => Event::EndTag,
            TEXT => Event::Text,
            CDSECT => Event::CdSect,
            ENTITY_REF => Event::EntityRef,
            IGNORABLE_WHITESPACE => Event::IgnorableWhitespace,
            PROCESSING_INSTRUCTION => Event::ProcessingInstruction,
            COMMENT => Event::Comment,
            DOCDECL => Event::DocDecl,
            ATTRIBUTE => Event::Attribute,
            other => return Err(AbxError::UnknownEvent(other)),
        };
        Ok(event)
    }

    /// Whether this event ends the attribute list of an open start tag
    pub fn closes_start_tag(self) -> bool {
        matches!(
            self,
            Event::StartDocument
                | Event::EndDocument
                | Event::StartTag
                | Event::EndTag
                | Event::Text
                | Event::Comment
        )
    }
}

/// One decoded token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub event: Event,
    /// Attribute name, present only for [`Event::Attribute`]
    pub name: Option<String>,
    pub value: Value,
}

/// Fast data input reader for binary ABX format
pub struct FastDataInput<R: Read> {
    reader: ByteCursor<R>,
    interned_strings: StringTable,
}

fn read_error(err: io::Error, what: &'static str) -> AbxError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        AbxError::UnexpectedEof(what)
    } else {
        AbxError::Io(err)
    }
}

impl<R: Read> FastDataInput<R> {
    /// Create a new FastDataInput reader
    pub fn new(reader: ByteCursor<R>) -> Self {
        Self {
            reader,
            interned_strings: StringTable::new(),
        }
    }

    fn read_array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.reader
            .read_exact(&mut buf)
            .map_err(|e| read_error(e, what))?;
        Ok(buf)
    }

    /// Read a single byte
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>("byte")?[0])
    }

    /// Read a 16-bit unsigned integer (big-endian)
    pub fn read_short(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array("short")?))
    }

    /// Read a 32-bit signed integer (big-endian)
    pub fn read_int(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array("int")?))
    }

    /// Read a 64-bit signed integer (big-endian)
    pub fn read_long(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array("long")?))
    }

    /// Read a 32-bit float
    pub fn read_float(&mut self) -> Result<f32> {
        Ok(f32::from_bits(u32::from_be_bytes(self.read_array("float")?)))
    }

    /// Read a 64-bit double
    pub fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(u64::from_be_bytes(self.read_array("double")?)))
    }

    /// Read a length-prefixed byte array
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let length = self.read_short()?;
        let mut data = vec![0u8; length as usize];
        self.reader
            .read_exact(&mut data)
            .map_err(|e| read_error(e, "bytes"))?;
        Ok(data)
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_utf(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Read an interned UTF-8 string, adding it to the table when it is new
    pub fn read_interned_utf(&mut self) -> Result<String> {
        let index = self.read_short()?;
        if index == INTERNED_STRING_NEW {
            let string = self.read_utf()?;
            let index = self.interned_strings.push(string.clone());
            trace!("interned string #{index}: {string:?}");
            Ok(string)
        } else {
            self.interned_strings.get(index).map(str::to_string)
        }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Bytes left before the declared end of the document, if known
    pub fn remaining(&self) -> Option<u64> {
        self.reader.remaining()
    }

    pub fn declared_len(&self) -> Option<u64> {
        self.reader.declared_len()
    }

    /// Get the interned strings table
    pub fn interned_strings(&self) -> &StringTable {
        &self.interned_strings
    }
}

/// Token dispatcher turning an ABX byte stream into [`Token`]s
///
/// Only decoding happens here; rendering is left to a
/// [`TokenHandler`](crate::TokenHandler). The reader tracks just enough
/// structure to reject attributes that appear outside a start tag.
pub struct AbxReader<R: Read> {
    input: FastDataInput<R>,
    in_tag: bool,
    finished: bool,
}

impl<R: Read> AbxReader<R> {
    /// Create a reader over a stream of unknown length, checking the magic header
    pub fn new(reader: R) -> Result<Self> {
        Self::from_cursor(ByteCursor::new(reader))
    }

    /// Create a reader over a source of exactly `len` bytes, checking the magic header
    pub fn with_len(reader: R, len: u64) -> Result<Self> {
        Self::from_cursor(ByteCursor::with_len(reader, len))
    }

    fn from_cursor(mut cursor: ByteCursor<R>) -> Result<Self> {
        let mut magic = Vec::with_capacity(PROTOCOL_MAGIC_VERSION_0.len());
        (&mut cursor)
            .take(PROTOCOL_MAGIC_VERSION_0.len() as u64)
            .read_to_end(&mut magic)?;

        if magic != PROTOCOL_MAGIC_VERSION_0 {
            return Err(AbxError::InvalidMagicHeader {
                expected: PROTOCOL_MAGIC_VERSION_0,
                actual: magic,
            });
        }
        debug!(
            "ABX header ok, document length {:?}",
            cursor.declared_len()
        );

        Ok(Self {
            input: FastDataInput::new(cursor),
            in_tag: false,
            finished: false,
        })
    }

    /// Decode the next token
    pub fn next_token(&mut self) -> Result<Token> {
        let token = self.input.read_byte()?;
        let event = Event::from_token(token)?;
        let value_type = ValueType::from_token(token)?;
        trace!("token {token:#04x}: {event:?} {value_type:?}");

        let name = match event {
            Event::Attribute => Some(self.read_attribute_name()?),
            _ => None,
        };
        let value = self.read_value(value_type)?;

        if event.closes_start_tag() {
            self.in_tag = event == Event::StartTag;
        }
        if event == Event::EndDocument {
            self.finished = true;
        }

        Ok(Token { event, name, value })
    }

    /// Resolve the implicit interned name preceding every attribute value
    fn read_attribute_name(&mut self) -> Result<String> {
        if !self.in_tag {
            return Err(AbxError::AttributeOutsideTag);
        }
        self.input.read_interned_utf()
    }

    /// Decode the payload of the given wire type
    fn read_value(&mut self, value_type: ValueType) -> Result<Value> {
        let value = match value_type {
            ValueType::Null => Value::Null,
            ValueType::String => Value::String(self.input.read_utf()?),
            ValueType::StringInterned => Value::Interned(self.input.read_interned_utf()?),
            ValueType::BytesHex => Value::BytesHex(self.input.read_bytes()?),
            ValueType::BytesBase64 => Value::BytesBase64(self.input.read_bytes()?),
            ValueType::Int => Value::Int(self.input.read_int()?),
            ValueType::IntHex => Value::IntHex(self.input.read_int()? as u32),
            ValueType::Long => Value::Long(self.input.read_long()?),
            ValueType::LongHex => Value::LongHex(self.input.read_long()? as u64),
            ValueType::Float => Value::Float(self.input.read_float()?),
            ValueType::Double => Value::Double(self.input.read_double()?),
            ValueType::BooleanTrue => Value::Bool(true),
            ValueType::BooleanFalse => Value::Bool(false),
        };
        Ok(value)
    }

    /// Check that END_DOCUMENT was the last token of a known-length document
    pub fn finish(self) -> Result<()> {
        if !self.finished {
            return Err(AbxError::UnexpectedEof("END_DOCUMENT"));
        }
        if let (Some(declared), Some(left)) = (self.input.declared_len(), self.input.remaining()) {
            if left > 0 {
                return Err(AbxError::TrailingData {
                    consumed: self.input.position(),
                    declared,
                });
            }
        }
        debug!(
            "decoded {} bytes, {} interned strings",
            self.input.position(),
            self.input.interned_strings().len()
        );
        Ok(())
    }

    pub fn strings(&self) -> &StringTable {
        self.input.interned_strings()
    }
}

/// Yields tokens up to and including END_DOCUMENT, stopping after the first error
impl<R: Read> Iterator for AbxReader<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is_err() {
            self.finished = true;
        }
        Some(token)
    }
}
