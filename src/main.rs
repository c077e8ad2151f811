//! Purpose: `vieta` CLI entry point.
//! Role: Binary crate root; parses args, runs the decode pipeline, prints the constant term.
//! Invariants: stdout carries only the result (label + decimal, or one JSON line).
//! Invariants: Errors go to stderr as text on a terminal, JSON otherwise; stdout stays empty.
//! Invariants: Process exit code is derived from `core::error::to_exit_code`.
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

use vieta::core::constant::{Solution, solve};
use vieta::core::document::RootDocument;
use vieta::core::error::{Error, ErrorKind, to_exit_code};

const CONSTANT_LABEL: &str = "The constant term 'c' of the polynomial is:";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `vieta --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    init_tracing(color_mode);

    execute(&cli.input, cli.format)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))?;
    Ok(RunOutcome::ok())
}

#[derive(Parser)]
#[command(
    name = "vieta",
    version,
    about = "Print the constant term of a polynomial from radix-encoded roots",
    long_about = None,
    after_help = r#"INPUT FORMAT
  {
    "keys": { "n": 4, "k": 3 },
    "1": { "base": "10", "value": "4" },
    "2": { "base": "2", "value": "111" },
    "3": { "base": "16", "value": "ff" }
  }

  The first k entries are decoded (digits 0-9 then a-z, case-insensitive),
  multiplied, and negated when k is odd.

EXAMPLES
  $ vieta roots.json
  $ vieta --format json roots.json
  $ RUST_LOG=debug vieta roots.json"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(help = "Path to the JSON document describing the roots", value_hint = ValueHint::FilePath)]
    input: PathBuf,
    #[arg(
        long,
        value_enum,
        default_value = "text",
        help = "Output format for the result"
    )]
    format: OutputFormat,
    #[arg(
        long,
        value_enum,
        default_value = "auto",
        help = "Colorize error labels on a terminal"
    )]
    color: ColorMode,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

fn init_tracing(color_mode: ColorMode) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(color_mode.use_color(io::stderr().is_terminal()))
        .with_writer(io::stderr)
        .try_init();
}

fn execute(input: &Path, format: OutputFormat) -> Result<(), Error> {
    let text = read_input(input)?;
    tracing::debug!(path = %input.display(), bytes = text.len(), "read input");

    let doc = RootDocument::parse(&text).map_err(|err| err.with_path(input))?;
    let solution = solve(&doc).map_err(|err| err.with_path(input))?;
    tracing::debug!(k = doc.k, bits = solution.constant.bits(), "computed constant term");

    let rendered = match format {
        OutputFormat::Text => format!("{CONSTANT_LABEL}\n{}\n", solution.constant),
        OutputFormat::Json => {
            let value = solution_json(&doc, &solution);
            let line = serde_json::to_string(&value).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to encode result")
                    .with_source(err)
            })?;
            format!("{line}\n")
        }
    };

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to write result")
                .with_source(err)
        })
}

fn read_input(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|err| {
        let (kind, message) = match err.kind() {
            io::ErrorKind::NotFound => (ErrorKind::NotFound, "input file not found"),
            io::ErrorKind::PermissionDenied => (ErrorKind::Permission, "input file is not readable"),
            io::ErrorKind::InvalidData => (ErrorKind::Parse, "input file is not valid UTF-8"),
            _ => (ErrorKind::Io, "failed to read input file"),
        };
        Error::new(kind)
            .with_message(message)
            .with_path(path)
            .with_source(err)
    })
}

fn solution_json(doc: &RootDocument, solution: &Solution) -> Value {
    let mut out = Map::new();
    out.insert("k".to_string(), json!(doc.k));
    if let Some(n) = doc.n {
        out.insert("n".to_string(), json!(n));
    }
    let roots: Vec<String> = solution.roots.iter().map(ToString::to_string).collect();
    out.insert("roots".to_string(), json!(roots));
    out.insert(
        "constant".to_string(),
        json!(solution.constant.to_string()),
    );
    Value::Object(out)
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::NotFound => err.with_hint("Check the input path."),
        ErrorKind::Permission => err.with_hint("Permission denied. Check file permissions."),
        ErrorKind::Io => err.with_hint("I/O error. Check the path and filesystem."),
        _ => err,
    }
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share the input if it persists.",
    )
}

enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Parse => "invalid JSON".to_string(),
        ErrorKind::Schema => "unexpected document shape".to_string(),
        ErrorKind::Decode => "invalid root digits".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(root) = err.root() {
        inner.insert("root".to_string(), json!(root));
    }
    if let Some(position) = err.position() {
        inner.insert("position".to_string(), json!(position));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(root) = err.root() {
        lines.push(format!(
            "{} {root}",
            colorize_label("root:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(position) = err.position() {
        lines.push(format!(
            "{} {position}",
            colorize_label("position:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
