//! A library for decoding Android Binary XML (ABX) into human-readable text.
//!
//! ABX is the tokenized binary encoding Android uses for system configuration
//! files such as `/data/system/packages.xml`. Decoding is split in two layers:
//! [`AbxReader`] turns the byte stream into [`Token`]s, and a [`TokenHandler`]
//! ([`TextFormatter`] or [`XmlEmitter`]) renders them.
//!
//! # Examples
//!
//! ```no_run
//! use abx2xml::{AbxToXmlConverter, FormatOptions};
//! use std::fs::File;
//!
//! // Convert a file
//! AbxToXmlConverter::default().convert_file("input.abx", "output.xml").unwrap();
//!
//! // Convert from reader to writer, quoting only non-numeric attributes
//! let converter = AbxToXmlConverter::new(FormatOptions::default().with_quote_all_attributes(false));
//! let input = File::open("input.abx").unwrap();
//! let output = File::create("output.xml").unwrap();
//! converter.convert(input, output).unwrap();
//! ```

use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

mod binary_xml;
pub mod cli;
mod converter;
mod cursor;
mod formatter;
mod options;
mod string_table;
mod tag_stack;
mod value;
mod xml_writer;

pub use binary_xml::{AbxReader, Event, FastDataInput, Token};
pub use converter::{AbxToXmlConverter, decode, decode_tokens};
pub use cursor::ByteCursor;
pub use formatter::{TextFormatter, TokenHandler, escape_attribute_value};
pub use options::{BoolStyle, FormatOptions, OutputFormat};
pub use string_table::StringTable;
pub use tag_stack::TagStack;
pub use value::{Value, ValueType};
pub use xml_writer::XmlEmitter;

/// Error types for ABX decoding
#[derive(Error, Debug)]
pub enum AbxError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("not an ABX file: magic header mismatch. Expected: {expected:02X?}, got: {actual:02X?}")]
    InvalidMagicHeader { expected: [u8; 4], actual: Vec<u8> },
    #[error("unexpected end of stream while reading {0}")]
    UnexpectedEof(&'static str),
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
    #[error("invalid interned string index {index} (table holds {len} strings)")]
    InvalidInternedStringIndex { index: u16, len: usize },
    #[error("unknown type: {0}")]
    UnknownType(u8),
    #[error("unknown event: {0}")]
    UnknownEvent(u8),
    #[error("attribute outside tag")]
    AttributeOutsideTag,
    #[error("end tag </{found}> does not match open tag <{expected}>")]
    TagMismatch { expected: String, found: String },
    #[error("end tag </{0}> without a matching start tag")]
    UnbalancedEndTag(String),
    #[error("document ended with unclosed tags: {0:?}")]
    UnclosedTags(Vec<String>),
    #[error("trailing data: document ended at byte {consumed} of {declared}")]
    TrailingData { consumed: u64, declared: u64 },
    #[error("XML writer error: {0}")]
    Xml(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Broad classification of an [`AbxError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input does not start with the ABX magic header
    NotAbx,
    /// The input is ABX but structurally broken
    Corrupt,
    /// The byte source or the output sink failed
    Io,
    /// The caller asked for something that cannot be done
    Usage,
}

impl AbxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AbxError::InvalidMagicHeader { .. } => ErrorKind::NotAbx,
            AbxError::Io(_) | AbxError::Xml(_) => ErrorKind::Io,
            AbxError::ParseError(_) => ErrorKind::Usage,
            _ => ErrorKind::Corrupt,
        }
    }

    /// Process exit code for the command line tool
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::NotAbx => 2,
            _ => 1,
        }
    }
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, AbxError>;

pub const PROTOCOL_MAGIC_VERSION_0: [u8; 4] = [0x41, 0x42, 0x58, 0x00];

/// Interned string index meaning "a new literal follows"
pub const INTERNED_STRING_NEW: u16 = 0xFFFF;

// Event tokens (low nibble)
pub const START_DOCUMENT: u8 = 0;
pub const END_DOCUMENT: u8 = 1;
pub const START_TAG: u8 = 2;
pub const END_TAG: u8 = 3;
pub const TEXT: u8 = 4;
pub const CDSECT: u8 = 5;
pub const ENTITY_REF: u8 = 6;
pub const IGNORABLE_WHITESPACE: u8 = 7;
pub const PROCESSING_INSTRUCTION: u8 = 8;
pub const COMMENT: u8 = 9;
pub const DOCDECL: u8 = 10;
pub const ATTRIBUTE: u8 = 15;

// Type tokens (high nibble)
pub const TYPE_NULL: u8 = 1 << 4;
pub const TYPE_STRING: u8 = 2 << 4;
pub const TYPE_STRING_INTERNED: u8 = 3 << 4;
pub const TYPE_BYTES_HEX: u8 = 4 << 4;
pub const TYPE_BYTES_BASE64: u8 = 5 << 4;
pub const TYPE_INT: u8 = 6 << 4;
pub const TYPE_INT_HEX: u8 = 7 << 4;
pub const TYPE_LONG: u8 = 8 << 4;
pub const TYPE_LONG_HEX: u8 = 9 << 4;
pub const TYPE_FLOAT: u8 = 10 << 4;
pub const TYPE_DOUBLE: u8 = 11 << 4;
pub const TYPE_BOOLEAN_TRUE: u8 = 12 << 4;
pub const TYPE_BOOLEAN_FALSE: u8 = 13 << 4;
