use std::{env, ffi::OsString, path::PathBuf, process::ExitCode};

use async_std::io::{self, BufReader};
use clap::{CommandFactory, Parser};
use line_index::{session::Session, Config, Error, Indexable};
use tracing_subscriber::EnvFilter;

/// Wrong arguments or configuration, nothing was indexed yet
const EXIT_USAGE: u8 = 1;
/// The file could not be indexed
const EXIT_BUILD: u8 = 2;
/// Reading a line number or printing a line failed
const EXIT_RUNTIME: u8 = 3;

/// Index the lines of a file and print any of them by number
#[derive(clap::Parser, Debug)]
#[command(
    version,
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Options {
    /// File to index
    #[arg(allow_hyphen_values = true)]
    file: PathBuf,
}

impl Options {
    /// Takes exactly one argument, always as the file path. Names like `-x` or `--help` are files
    /// too.
    fn from_args() -> Option<Options> {
        let mut args: Vec<OsString> = env::args_os().collect();
        if args.len() != 2 {
            return None;
        }

        let file = args.pop()?;
        let program = args.pop()?;
        Options::try_parse_from([program, OsString::from("--"), file]).ok()
    }
}

/// Prefix for diagnostics of a failed session
fn runtime_context(err: &Error) -> &'static str {
    if err.is_input_error() {
        "Error while reading line numbers"
    } else {
        "Error while printing a line"
    }
}

#[async_std::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let options = match Options::from_args() {
        Some(options) => options,
        None => {
            println!("{}", Options::command().render_usage());
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration, error code: {}: {}", err.code(), err);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let path = async_std::path::PathBuf::from(options.file.clone());
    let session = match Session::open(&path, config).await {
        Ok(session) => session,
        Err(err) => {
            eprintln!(
                "Error while creating the line index, error code: {}: {}",
                err.code(),
                err
            );
            return ExitCode::from(EXIT_BUILD);
        }
    };

    tracing::info!(
        file = %options.file.display(),
        lines = session.lines().total_lines(),
        "ready"
    );

    let mut input = BufReader::new(io::stdin());
    let mut output = io::stdout();

    if let Err(err) = session.run(&mut input, &mut output).await {
        eprintln!(
            "{}, error code: {}: {}",
            runtime_context(&err),
            err.code(),
            err
        );
        return ExitCode::from(EXIT_RUNTIME);
    }

    ExitCode::SUCCESS
}
