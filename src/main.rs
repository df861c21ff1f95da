// SPDX-License-Identifier: MIT
//
// n-vi — replay Vim keystrokes over a text file.
//
// The binary is a thin host around n-engine. It reads the text, hands it
// to a Session as a rope buffer, feeds the keys given in Vim notation,
// and prints what is left:
//
//   file/stdin → Buffer → Session::feed(keys) → buffer with `|` cursor
//                                              → mode and status line
//
// Options come from an optional TOML file first, then from `--set`
// directives in the order given, so `--set ts=4` wins over the file.
//
// Logging goes to stderr and is off unless RUST_LOG asks for it, e.g.
// `RUST_LOG=engine.session=trace n-vi file.txt 'dw'`.

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use n_engine::{Buffer, Options, Session, TextBuffer};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: n-vi [--set OPT]... [--config FILE] [--name NAME] <FILE|-> <KEYS>";

// ─── Arguments ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    /// `set`-style directives, applied in order.
    sets: Vec<String>,
    config: Option<PathBuf>,
    name: Option<String>,
    /// `-` reads stdin.
    input: String,
    keys: String,
}

fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut argv = argv.into_iter();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--set" => args.sets.push(value(&mut argv, "--set")?),
            "--config" => args.config = Some(PathBuf::from(value(&mut argv, "--config")?)),
            "--name" => args.name = Some(value(&mut argv, "--name")?),
            "-h" | "--help" => bail!("{USAGE}"),
            "--" => positional.extend(argv.by_ref()),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            _ => positional.push(arg),
        }
    }
    let [input, keys]: [String; 2] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!("{USAGE}"))?;
    args.input = input;
    args.keys = keys;
    Ok(args)
}

fn value(argv: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    argv.next().with_context(|| format!("{flag} needs a value"))
}

// ─── Setup ──────────────────────────────────────────────────────────────────

fn load_options(args: &Args) -> Result<Options> {
    let mut options = match &args.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    for directive in &args.sets {
        options
            .set(directive)
            .with_context(|| format!("--set {directive}"))?;
    }
    Ok(options)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    fs::read_to_string(input).with_context(|| format!("reading {input}"))
}

// ─── Output ─────────────────────────────────────────────────────────────────

/// The buffer's lines with `|` inserted at the cursor.
fn render<B: TextBuffer>(session: &Session<B>) -> String {
    let buffer = session.buffer();
    let cursor = session.cursor();
    let mut out = String::new();
    for idx in 0..buffer.line_count() {
        let line = buffer.line(idx);
        if idx == cursor.line {
            let byte = line
                .char_indices()
                .nth(cursor.col)
                .map_or(line.len(), |(i, _)| i);
            out.push_str(&line[..byte]);
            out.push('|');
            out.push_str(&line[byte..]);
        } else {
            out.push_str(&line);
        }
        out.push('\n');
    }
    out
}

fn run() -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let options = load_options(&args)?;
    let text = read_input(&args.input)?;
    // The final newline ends the last line; it is not an empty line of its own.
    let body = text.strip_suffix('\n').unwrap_or(&text);
    let name = args.name.clone().unwrap_or_else(|| args.input.clone());

    let mut session = Session::with_options(Buffer::from_text(body), options).named(name);
    let outcome = session.feed(&args.keys);
    debug!(target: "engine.session", mode = outcome.mode.display_name(), "replay done");

    let mut stdout = io::stdout().lock();
    stdout.write_all(render(&session).as_bytes())?;
    writeln!(stdout, "-- {} --", outcome.mode.display_name())?;
    if let Some(status) = session.status() {
        writeln!(stdout, "{status}")?;
    }
    if let Some(request) = outcome.request {
        writeln!(stdout, "{request:?}")?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("n-vi: {e:#}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
