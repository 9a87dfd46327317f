//! Purpose: `jsonite` CLI entry point.
//! Role: Binary crate root; parses args, runs one codec pass, writes to stdout.
//! Invariants: Non-interactive errors are emitted as a single JSON line on stderr.
//! Invariants: Process exit code is derived from `to_exit_code`.
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueHint};
use serde_json::json;

use jsonite::{DEFAULT_MAX_DEPTH, DecodeErrorKind, DecodeLimits, Value, decode_with_limits, encode};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

#[derive(Debug)]
struct CliError {
    kind: CliErrorKind,
    message: String,
    pos: Option<usize>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CliErrorKind {
    Io,
    Decode(DecodeErrorKind),
    Encode,
}

impl CliError {
    fn io(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Io,
            message: message.into(),
            pos: None,
        }
    }

    fn kind_name(&self) -> String {
        match self.kind {
            CliErrorKind::Io => "Io".to_string(),
            CliErrorKind::Decode(kind) => format!("{kind:?}"),
            CliErrorKind::Encode => "Encode".to_string(),
        }
    }
}

fn to_exit_code(kind: CliErrorKind) -> i32 {
    match kind {
        CliErrorKind::Io => 3,
        CliErrorKind::Decode(_) | CliErrorKind::Encode => 7,
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind)
        }
    };
    std::process::exit(exit_code);
}

#[derive(Parser)]
#[command(
    name = "jsonite",
    version,
    about = "Byte-exact JSON codec for loosely typed host values",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Decode input and report what it holds")]
    Check {
        #[arg(long, help = "Read input from a file instead of stdin", value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, help = "Maximum array/object nesting depth")]
        max_depth: usize,
    },
    #[command(about = "Decode input and re-encode it compactly on stdout")]
    Echo {
        #[arg(long, help = "Read input from a file instead of stdin", value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, help = "Maximum array/object nesting depth")]
        max_depth: usize,
    },
}

fn run() -> Result<RunOutcome, CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check { file, max_depth } => {
            let input = read_input(file.as_deref())?;
            let value = decode_input(&input, max_depth)?;
            let summary = json!({
                "ok": true,
                "value": value.type_name(),
                "bytes": input.len(),
            });
            println!("{summary}");
            Ok(RunOutcome::ok())
        }
        Command::Echo { file, max_depth } => {
            let input = read_input(file.as_deref())?;
            let value = decode_input(&input, max_depth)?;
            let output = encode(&value).map_err(|err| CliError {
                kind: CliErrorKind::Encode,
                message: err.to_string(),
                pos: None,
            })?;
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&output)
                .and_then(|()| stdout.write_all(b"\n"))
                .map_err(|err| CliError::io(format!("failed to write output: {err}")))?;
            Ok(RunOutcome::ok())
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match file {
        Some(path) => std::fs::read(path)
            .map_err(|err| CliError::io(format!("failed to read {}: {err}", path.display()))),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(|err| CliError::io(format!("failed to read stdin: {err}")))?;
            Ok(buf)
        }
    }
}

fn decode_input(input: &[u8], max_depth: usize) -> Result<Value, CliError> {
    decode_with_limits(input, DecodeLimits { max_depth }).map_err(|err| CliError {
        kind: CliErrorKind::Decode(err.kind()),
        message: err.message().to_string(),
        pos: Some(err.position()),
    })
}

fn error_json(err: &CliError) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("kind".to_string(), err.kind_name().into());
    body.insert("message".to_string(), err.message.clone().into());
    if let Some(pos) = err.pos {
        body.insert("pos".to_string(), pos.into());
    }
    json!({ "error": body })
}

fn emit_error(err: &CliError) {
    if io::stderr().is_terminal() {
        eprintln!("jsonite: {}", err.message);
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}
