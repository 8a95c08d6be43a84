//! Shared helpers for building ABX documents in tests.
#![allow(dead_code)]

use std::collections::HashMap;

pub const MAGIC: &[u8; 4] = b"ABX\0";

// Event nibbles
pub const START_DOCUMENT: u8 = 0;
pub const END_DOCUMENT: u8 = 1;
pub const START_TAG: u8 = 2;
pub const END_TAG: u8 = 3;
pub const TEXT: u8 = 4;
pub const WHITESPACE: u8 = 7;
pub const COMMENT: u8 = 9;
pub const ATTRIBUTE: u8 = 15;

// Type nibbles
pub const NULL: u8 = 1;
pub const STRING: u8 = 2;
pub const STRING_INTERNED: u8 = 3;
pub const BYTES_HEX: u8 = 4;
pub const BYTES_BASE64: u8 = 5;
pub const INT: u8 = 6;
pub const INT_HEX: u8 = 7;
pub const LONG: u8 = 8;
pub const LONG_HEX: u8 = 9;
pub const FLOAT: u8 = 10;
pub const DOUBLE: u8 = 11;
pub const TRUE: u8 = 12;
pub const FALSE: u8 = 13;

/// Writes ABX the way Android's serializer does: tag and attribute names are
/// interned, a name is sent inline the first time and by index afterwards.
#[derive(Default)]
pub struct AbxBuilder {
    bytes: Vec<u8>,
    interned: HashMap<String, u16>,
}

impl AbxBuilder {
    pub fn new() -> Self {
        let mut builder = Self::default();
        builder.bytes.extend_from_slice(MAGIC);
        builder
    }

    /// Builder with header and START_DOCUMENT already written
    pub fn document() -> Self {
        let mut builder = Self::new();
        builder.token(NULL, START_DOCUMENT);
        builder
    }

    pub fn token(&mut self, value_type: u8, event: u8) -> &mut Self {
        self.bytes.push((value_type << 4) | event);
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn utf(&mut self, s: &str) -> &mut Self {
        self.bytes
            .extend_from_slice(&(s.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(s.as_bytes());
        self
    }

    pub fn interned(&mut self, s: &str) -> &mut Self {
        match self.interned.get(s) {
            Some(&index) => {
                self.bytes.extend_from_slice(&index.to_be_bytes());
            }
            None => {
                let index = self.interned.len() as u16;
                self.interned.insert(s.to_string(), index);
                self.bytes.extend_from_slice(&[0xFF, 0xFF]);
                self.utf(s);
            }
        }
        self
    }

    pub fn start_tag(&mut self, name: &str) -> &mut Self {
        self.token(STRING_INTERNED, START_TAG).interned(name)
    }

    pub fn end_tag(&mut self, name: &str) -> &mut Self {
        self.token(STRING_INTERNED, END_TAG).interned(name)
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        self.token(STRING, TEXT).utf(text)
    }

    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.token(STRING, COMMENT).utf(text)
    }

    pub fn whitespace(&mut self, text: &str) -> &mut Self {
        self.token(STRING, WHITESPACE).utf(text)
    }

    /// Attribute header: token plus implicit interned name
    pub fn attribute(&mut self, value_type: u8, name: &str) -> &mut Self {
        self.token(value_type, ATTRIBUTE).interned(name)
    }

    pub fn attr_string(&mut self, name: &str, value: &str) -> &mut Self {
        self.attribute(STRING, name).utf(value)
    }

    pub fn attr_interned(&mut self, name: &str, value: &str) -> &mut Self {
        self.attribute(STRING_INTERNED, name).interned(value)
    }

    pub fn attr_int(&mut self, name: &str, value: i32) -> &mut Self {
        self.attribute(INT, name).raw(&value.to_be_bytes())
    }

    pub fn attr_int_hex(&mut self, name: &str, value: u32) -> &mut Self {
        self.attribute(INT_HEX, name).raw(&value.to_be_bytes())
    }

    pub fn attr_long(&mut self, name: &str, value: i64) -> &mut Self {
        self.attribute(LONG, name).raw(&value.to_be_bytes())
    }

    pub fn attr_long_hex(&mut self, name: &str, value: u64) -> &mut Self {
        self.attribute(LONG_HEX, name).raw(&value.to_be_bytes())
    }

    pub fn attr_float(&mut self, name: &str, value: f32) -> &mut Self {
        self.attribute(FLOAT, name).raw(&value.to_be_bytes())
    }

    pub fn attr_double(&mut self, name: &str, value: f64) -> &mut Self {
        self.attribute(DOUBLE, name).raw(&value.to_be_bytes())
    }

    pub fn attr_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.attribute(if value { TRUE } else { FALSE }, name)
    }

    pub fn attr_bytes_hex(&mut self, name: &str, value: &[u8]) -> &mut Self {
        self.attribute(BYTES_HEX, name)
            .raw(&(value.len() as u16).to_be_bytes())
            .raw(value)
    }

    pub fn attr_bytes_base64(&mut self, name: &str, value: &[u8]) -> &mut Self {
        self.attribute(BYTES_BASE64, name)
            .raw(&(value.len() as u16).to_be_bytes())
            .raw(value)
    }

    pub fn end_document(&mut self) -> &mut Self {
        self.token(NULL, END_DOCUMENT)
    }

    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
