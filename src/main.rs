use std::process;

use abx2xml::cli::Cli;
use log::LevelFilter;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let matches = match Cli::build_command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            // --help and --version end up here too
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    init_logging(matches.get_count("verbose"));

    if let Err(e) = Cli::run_with_matches(matches) {
        eprintln!("abx2xml: {}", e);
        process::exit(e.exit_code());
    }
}
