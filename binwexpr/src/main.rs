//! Wexpr command-line tool for validating, formatting, minifying, and
//! binary-encoding Wexpr documents.
//!
//! Usage: wexpr [OPTIONS]
//!
//! Options:
//!   -c, --cmd <COMMAND>    humanReadable, validate, mini, binary [default: humanReadable]
//!   -i, --input <PATH>     Input file, `-` for stdin [default: -]
//!   -o, --output <PATH>    Output file, `-` for stdout [default: -]
//!   -h, --help             Print help
//!   -V, --version          Print version
//!
//! Input starting with the binary file magic is read as a binary Wexpr file,
//! anything else as UTF-8 text.

use std::fs;
use std::io::{self, Read, Write};
use std::process;

use clap::{Parser, ValueEnum};
use libwexpr::{
    encode, is_binary_file, parse, read_binary_file, write_binary_file, Expression, Style,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wexpr")]
#[command(about = "Validate, format, minify, and binary-encode Wexpr documents")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Command to run
    #[arg(short, long, value_enum, default_value_t = Command::HumanReadable)]
    cmd: Command,

    /// Input file (or - for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output file (or - for stdout)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Print version
    #[arg(short = 'V', long)]
    version: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Command {
    /// Pretty-print with one entry per line
    #[value(name = "humanReadable")]
    HumanReadable,
    /// Print true or false and exit accordingly
    #[value(name = "validate")]
    Validate,
    /// Print on a single line
    #[value(name = "mini")]
    Mini,
    /// Write a binary Wexpr file
    #[value(name = "binary")]
    Binary,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if cli.version {
        println!("wexpr {}", libwexpr::VERSION);
        return;
    }

    process::exit(run(&cli));
}

/// Run one command and return the process exit code.
fn run(cli: &Cli) -> i32 {
    let input_name = if cli.input == "-" {
        "(stdin)"
    } else {
        cli.input.as_str()
    };

    let raw_bytes = match read_input(&cli.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("wexpr: {}: {}", input_name, e);
            return 1;
        }
    };
    debug!(input = input_name, len = raw_bytes.len(), "read input");

    let parsed = load(&raw_bytes);

    if cli.cmd == Command::Validate {
        let valid = match &parsed {
            Ok(_) => true,
            Err(e) => {
                info!(input = input_name, "invalid document: {}", e);
                false
            }
        };
        let text = if valid { "true\n" } else { "false\n" };
        if let Err(e) = write_output(&cli.output, text.as_bytes()) {
            eprintln!("wexpr: {}: {}", cli.output, e);
        }
        return if valid { 0 } else { 1 };
    }

    let expr = match parsed {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("wexpr: {}: {}", input_name, e);
            return 1;
        }
    };

    let rendered = match cli.cmd {
        Command::Mini => encode(&expr, Style::Compact).map(String::into_bytes),
        Command::Binary => write_binary_file(&expr),
        Command::HumanReadable | Command::Validate => {
            encode(&expr, Style::HumanReadable).map(String::into_bytes)
        }
    };

    let bytes = match rendered {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("wexpr: {}: {}", input_name, e);
            return 1;
        }
    };

    match write_output(&cli.output, &bytes) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("wexpr: {}: {}", cli.output, e);
            1
        }
    }
}

/// Decode raw input, choosing binary or text by the leading byte.
fn load(raw_bytes: &[u8]) -> Result<Expression, String> {
    if is_binary_file(raw_bytes) {
        debug!("reading binary file");
        return read_binary_file(raw_bytes).map_err(|e| e.to_string());
    }

    let text = std::str::from_utf8(raw_bytes)
        .map_err(|e| format!("input is not valid UTF-8: {}", e))?;
    parse(text).map_err(|e| e.to_string())
}

fn read_input(path: &str) -> io::Result<Vec<u8>> {
    if path == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read(path)
    }
}

fn write_output(path: &str, bytes: &[u8]) -> io::Result<()> {
    if path == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()
    } else {
        fs::write(path, bytes)
    }
}
