use crate::{AbxReader, FormatOptions, OutputFormat, Result, TextFormatter, Token, TokenHandler};
use crate::XmlEmitter;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};

/// Decode a whole ABX document, feeding every token to `handler`
///
/// With `declared_len` set the document must occupy exactly that many bytes;
/// without it the source is read until END_DOCUMENT. Anything the handler has
/// written before an error stays written.
pub fn decode<R: Read, H: TokenHandler>(
    reader: R,
    declared_len: Option<u64>,
    handler: &mut H,
) -> Result<()> {
    let mut reader = match declared_len {
        Some(len) => AbxReader::with_len(reader, len)?,
        None => AbxReader::new(reader)?,
    };

    loop {
        let token = reader.next_token()?;
        if !handler.handle(&token)? {
            break;
        }
    }

    reader.finish()
}

/// Decode an in-memory ABX document into its token stream
pub fn decode_tokens(abx_data: &[u8]) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    decode(Cursor::new(abx_data), Some(abx_data.len() as u64), &mut tokens)?;
    Ok(tokens)
}

/// Open an input path, reporting its size only when it is a regular file
///
/// Pipes, FIFOs and character devices report a length of zero (or nothing
/// useful), so they are streamed to END_DOCUMENT like stdin.
fn open_input(input_path: &str) -> Result<(BufReader<File>, Option<u64>)> {
    let input_file = File::open(input_path)?;
    let metadata = input_file.metadata()?;
    let len = metadata.is_file().then(|| metadata.len());
    Ok((BufReader::new(input_file), len))
}

/// High-level converter for ABX to text conversion
#[derive(Debug, Clone, Default)]
pub struct AbxToXmlConverter {
    options: FormatOptions,
    format: OutputFormat,
}

impl AbxToXmlConverter {
    pub fn new(options: FormatOptions) -> Self {
        Self {
            options,
            format: OutputFormat::Text,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Convert ABX from a reader of known length to a writer
    pub fn convert_with_len<R: Read, W: Write>(
        &self,
        reader: R,
        declared_len: Option<u64>,
        writer: W,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                let mut formatter = TextFormatter::new(writer, self.options.clone());
                decode(reader, declared_len, &mut formatter)?;
                formatter.into_inner().flush()?;
            }
            OutputFormat::Xml => {
                let mut emitter = XmlEmitter::new(writer, self.options.clone());
                decode(reader, declared_len, &mut emitter)?;
                emitter.into_inner().flush()?;
            }
        }
        Ok(())
    }

    /// Convert ABX from a reader to a writer
    ///
    /// The reader is treated as a stream of unknown length, so trailing bytes
    /// after END_DOCUMENT go unnoticed. Use [`convert_with_len`](Self::convert_with_len)
    /// when the size is known.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use abx2xml::AbxToXmlConverter;
    /// use std::fs::File;
    ///
    /// let input = File::open("input.abx").unwrap();
    /// let output = File::create("output.xml").unwrap();
    /// AbxToXmlConverter::default().convert(input, output).unwrap();
    /// ```
    pub fn convert<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<()> {
        self.convert_with_len(reader, None, writer)
    }

    /// Convert ABX file to a text file
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use abx2xml::AbxToXmlConverter;
    ///
    /// AbxToXmlConverter::default().convert_file("input.abx", "output.xml").unwrap();
    /// ```
    pub fn convert_file(&self, input_path: &str, output_path: &str) -> Result<()> {
        if input_path == output_path {
            return self.convert_file_in_place(input_path);
        }

        let (reader, len) = open_input(input_path)?;

        let output_file = File::create(output_path)?;
        let writer = BufWriter::new(output_file);

        self.convert_with_len(reader, len, writer)
    }

    /// Convert ABX from stdin to stdout
    ///
    /// ```no_run
    /// use abx2xml::AbxToXmlConverter;
    ///
    /// // This would be called when processing: cat file.abx | abx2xml - -
    /// AbxToXmlConverter::default().convert_stdin_stdout().unwrap();
    /// ```
    pub fn convert_stdin_stdout(&self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let writer = BufWriter::new(stdout.lock());

        self.convert(stdin.lock(), writer)
    }

    /// Convert ABX from stdin to a file
    pub fn convert_stdin_to_file(&self, output_path: &str) -> Result<()> {
        let stdin = io::stdin();
        let output_file = File::create(output_path)?;
        let writer = BufWriter::new(output_file);

        self.convert(stdin.lock(), writer)
    }

    /// Convert ABX file to stdout
    pub fn convert_file_to_stdout(&self, input_path: &str) -> Result<()> {
        let (reader, len) = open_input(input_path)?;
        let stdout = io::stdout();
        let writer = BufWriter::new(stdout.lock());

        self.convert_with_len(reader, len, writer)
    }

    /// Convert ABX file in place (overwrites the original file)
    ///
    /// The whole conversion happens in memory; the file is only rewritten
    /// once decoding has succeeded.
    fn convert_file_in_place(&self, file_path: &str) -> Result<()> {
        let file_data = std::fs::read(file_path)?;
        let output_data = self.convert_to_vec(&file_data)?;

        let output_file = File::create(file_path)?;
        let mut writer = BufWriter::new(output_file);
        writer.write_all(&output_data)?;
        writer.flush()?;

        Ok(())
    }

    fn convert_to_vec(&self, abx_data: &[u8]) -> Result<Vec<u8>> {
        let mut output_data = Vec::new();
        self.convert_with_len(
            Cursor::new(abx_data),
            Some(abx_data.len() as u64),
            &mut output_data,
        )?;
        Ok(output_data)
    }

    /// Convert ABX data from a byte slice to a String
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use abx2xml::AbxToXmlConverter;
    ///
    /// let abx_data = std::fs::read("input.abx").unwrap();
    /// let xml_string = AbxToXmlConverter::default().convert_bytes(&abx_data).unwrap();
    /// println!("{}", xml_string);
    /// ```
    pub fn convert_bytes(&self, abx_data: &[u8]) -> Result<String> {
        let output_data = self.convert_to_vec(abx_data)?;
        String::from_utf8(output_data)
            .map_err(|_| crate::AbxError::ParseError("Invalid UTF-8 in output".to_string()))
    }
}
