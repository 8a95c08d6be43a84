use crate::{AbxError, AbxToXmlConverter, BoolStyle, FormatOptions, OutputFormat, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

pub struct Cli;

/// Expand `\t`, `\n`, `\r` and `\\` so separators can be typed on a shell line
fn unescape(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut chars = arg.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

impl Cli {
    pub fn build_command() -> Command {
        Command::new("abx2xml")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Decodes Android Binary XML (ABX) into human-readable XML")
            .long_about("Decodes Android Binary XML (ABX) into human-readable XML.\n\nWhen invoked with the '-i' argument, the output of a successful conversion will overwrite the original input file. Input can be '-' to use stdin, and output can be '-' to use stdout.")
            .arg(
                Arg::new("in-place")
                    .short('i')
                    .long("in-place")
                    .help("Overwrite input file with converted output")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("input")
                    .help("Input file path (use '-' for stdin)")
                    .default_value("-")
                    .index(1),
            )
            .arg(
                Arg::new("output")
                    .help("Output file path (use '-' for stdout)")
                    .index(2),
            )
            .arg(
                Arg::new("format")
                    .long("format")
                    .help("Output renderer")
                    .value_parser(value_parser!(OutputFormat))
                    .default_value("text"),
            )
            .arg(
                Arg::new("indent")
                    .long("indent")
                    .help("Indentation unit, backslash escapes allowed (empty for none)")
                    .default_value("\\t"),
            )
            .arg(
                Arg::new("newline")
                    .long("newline")
                    .help("Line terminator, backslash escapes allowed (empty for none)")
                    .default_value("\\n"),
            )
            .arg(
                Arg::new("bare-values")
                    .long("bare-values")
                    .help("Leave numeric and boolean attribute values unquoted")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("break-attributes")
                    .long("break-attributes")
                    .help("Put each attribute on its own line")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("no-self-close")
                    .long("no-self-close")
                    .help("Write empty elements as <tag></tag>")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("bool-style")
                    .long("bool-style")
                    .help("Spelling of boolean values")
                    .value_parser(value_parser!(BoolStyle))
                    .default_value("capitalized"),
            )
            .arg(
                Arg::new("no-trim-hex")
                    .long("no-trim-hex")
                    .help("Keep leading zeros in hex numbers")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Log more (repeat for more detail)")
                    .action(ArgAction::Count),
            )
    }

    /// Presentation options selected on the command line
    pub fn format_options(matches: &ArgMatches) -> FormatOptions {
        let text = |id: &str| {
            matches
                .get_one::<String>(id)
                .map(|s| unescape(s))
                .unwrap_or_default()
        };
        FormatOptions::default()
            .with_indent(text("indent"))
            .with_newline(text("newline"))
            .with_quote_all_attributes(!matches.get_flag("bare-values"))
            .with_break_attributes(matches.get_flag("break-attributes"))
            .with_self_close_empty(!matches.get_flag("no-self-close"))
            .with_bool_style(
                matches
                    .get_one::<BoolStyle>("bool-style")
                    .copied()
                    .unwrap_or_default(),
            )
            .with_trim_hex(!matches.get_flag("no-trim-hex"))
    }

    pub fn run_with_matches(matches: ArgMatches) -> Result<()> {
        let input_path = matches
            .get_one::<String>("input")
            .map(String::as_str)
            .unwrap_or("-");
        let output_path = matches.get_one::<String>("output");
        let in_place = matches.get_flag("in-place");

        if in_place && input_path == "-" {
            return Err(AbxError::ParseError(
                "Cannot use -i option with stdin input".to_string(),
            ));
        }

        let output_path = match output_path {
            Some(path) => path.as_str(),
            None if in_place => input_path,
            None => "-",
        };

        let format = matches
            .get_one::<OutputFormat>("format")
            .copied()
            .unwrap_or_default();
        let converter = AbxToXmlConverter::new(Self::format_options(&matches)).with_format(format);

        match (input_path, output_path) {
            ("-", "-") => converter.convert_stdin_stdout(),
            ("-", output) => converter.convert_stdin_to_file(output),
            (input, "-") => converter.convert_file_to_stdout(input),
            (input, output) => converter.convert_file(input, output),
        }
    }
}

// test
