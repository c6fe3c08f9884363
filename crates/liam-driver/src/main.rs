use ariadne::{sources, Color, Label, Report, ReportKind};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use liam_driver::{Backend, CompileOptions, Compilation, Pipeline, SignatureDump};
use liam_lexer::{Token, TokenKind};
use liam_typeck::{ErrorReport, Pass, UnitId};

#[derive(Parser)]
#[command(
    name = "liamc",
    version = "0.1.0",
    about = "liam compiler front end",
    long_about = "Loads a liam program with its imports, then type checks and\nborrow checks it."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a program without emitting anything
    Check {
        /// Entry source file
        input: PathBuf,

        /// Stop after this pass
        #[arg(long)]
        stop_after: Option<StopAfter>,
    },

    /// Check a program and print its signatures
    Dump {
        /// Entry source file
        input: PathBuf,
    },

    /// Lex a file and show tokens (debug)
    Lex {
        /// Input source file
        input: PathBuf,

        /// Show token positions
        #[arg(short, long)]
        positions: bool,
    },

    /// Parse a file and show the tree (debug)
    Parse {
        /// Input source file
        input: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StopAfter {
    Load,
    Declare,
    TypeCheck,
    BorrowCheck,
}

impl From<StopAfter> for Pass {
    fn from(stop: StopAfter) -> Self {
        match stop {
            StopAfter::Load => Pass::Load,
            StopAfter::Declare => Pass::Declare,
            StopAfter::TypeCheck => Pass::TypeCheck,
            StopAfter::BorrowCheck => Pass::BorrowCheck,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Check { input, stop_after } => check_command(&input, stop_after),
        Commands::Dump { input } => dump_command(&input),
        Commands::Lex { input, positions } => lex_command(&input, positions),
        Commands::Parse { input } => parse_command(&input),
    }
}

fn check_command(input: &Path, stop_after: Option<StopAfter>) -> ExitCode {
    let options = CompileOptions {
        stop_after: stop_after.map(Pass::from),
    };
    let compilation = Pipeline::new(options).run(input, None);
    finish(&compilation)
}

fn dump_command(input: &Path) -> ExitCode {
    let mut dump = SignatureDump::new(io::stdout().lock());
    let compilation = Pipeline::new(CompileOptions::default()).run(input, Some(&mut dump as &mut dyn Backend));
    finish(&compilation)
}

fn finish(compilation: &Compilation) -> ExitCode {
    for report in compilation.diagnostics.reports() {
        render_report(compilation, report);
    }

    match compilation.halted_at {
        Some(pass) => {
            eprintln!(
                "{} error(s) in {}; later passes were skipped",
                compilation.diagnostics.len(),
                pass
            );
            ExitCode::FAILURE
        }
        None => {
            let stages: Vec<String> = compilation.stages.iter().map(ToString::to_string).collect();
            println!(
                "ok: {} unit(s), passes: {}",
                compilation.bundle.len(),
                stages.join(", ")
            );
            ExitCode::SUCCESS
        }
    }
}

fn lex_command(input: &Path, positions: bool) -> ExitCode {
    let source = match fs::read_to_string(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filename = input.to_string_lossy().to_string();
    let tokens = liam_lexer::tokenize(&source, 0);

    println!("Tokens for {}:\n", filename);
    println!("{}", "=".repeat(80));

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            println!("\n{:4} | {:?}", i, token.kind);
            break;
        }

        if positions {
            println!(
                "{:4} | {:20?} | {:?} | {}:{}",
                i, token.kind, token.value, token.span.line, token.span.column
            );
        } else {
            println!("{:4} | {:20?} | {:?}", i, token.kind, token.value);
        }
    }

    println!("{}", "=".repeat(80));
    println!("\nTotal tokens: {}", tokens.len());

    let error_count = tokens.iter().filter(|t| t.kind == TokenKind::Error).count();
    if error_count > 0 {
        println!("\nLexer errors found: {}", error_count);
        report_lexer_errors(&tokens, &filename, &source);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn parse_command(input: &Path) -> ExitCode {
    let source = match fs::read_to_string(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filename = input.to_string_lossy().to_string();
    let tokens = liam_lexer::tokenize(&source, 0);

    if tokens.iter().any(|t| t.kind == TokenKind::Error) {
        report_lexer_errors(&tokens, &filename, &source);
        return ExitCode::FAILURE;
    }

    match liam_parser::Parser::new(tokens).parse_file() {
        Ok(file) => {
            println!("{:#?}", file);
            ExitCode::SUCCESS
        }
        Err(errors) => {
            for err in &errors {
                report_error(
                    "E0001",
                    "Parse error",
                    &err.message,
                    err.span.start..err.span.end,
                    &filename,
                    &source,
                );
            }
            ExitCode::FAILURE
        }
    }
}

// Helper functions

fn report_lexer_errors(tokens: &[Token], filename: &str, source: &str) {
    for token in tokens.iter().filter(|t| t.kind == TokenKind::Error) {
        report_error(
            "E0001",
            "Lexical error",
            &token.value,
            token.span.start..token.span.end,
            filename,
            source,
        );
    }
}

fn report_error(code: &str, title: &str, message: &str, range: std::ops::Range<usize>, filename: &str, source: &str) {
    let span = (filename.to_string(), range);
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_code(code)
        .with_message(title)
        .with_label(Label::new(span).with_message(message).with_color(Color::Red))
        .finish()
        .eprint(sources(vec![(filename.to_string(), source.to_string())]));
    if let Err(e) = printed {
        log::warn!("failed to render diagnostic: {}", e);
    }
}

/// Renders one pipeline report against the sources it points into.
///
/// Notes may point into other units of the bundle; files that never made it
/// into the bundle are read back from disk, and a report whose file cannot be
/// read is printed as a single line.
fn render_report(compilation: &Compilation, report: &ErrorReport) {
    let mut files: HashMap<String, String> = compilation
        .bundle
        .units()
        .iter()
        .map(|unit| (unit.path().display().to_string(), unit.source().to_string()))
        .collect();

    let primary = report.file.display().to_string();
    if !files.contains_key(&primary) {
        match fs::read_to_string(&report.file) {
            Ok(source) => {
                files.insert(primary.clone(), source);
            }
            Err(_) => {
                eprintln!("error[{}]: {}", report.kind.code(), report);
                return;
            }
        }
    }

    let file_of = |file_id: usize| -> String {
        compilation
            .bundle
            .get(UnitId(file_id))
            .map(|unit| unit.path().display().to_string())
            .unwrap_or_else(|| primary.clone())
    };

    let span = (primary.clone(), report.span.start..report.span.end);
    let mut builder = Report::build(ReportKind::Error, span.clone())
        .with_code(report.kind.code())
        .with_message(format!("{} error", report.pass))
        .with_label(Label::new(span).with_message(&report.message).with_color(Color::Red));

    for note in &report.notes {
        let file = file_of(note.span.file_id);
        builder = builder.with_label(
            Label::new((file, note.span.start..note.span.end))
                .with_message(&note.message)
                .with_color(Color::Blue),
        );
    }

    if let Err(e) = builder.finish().eprint(sources(files)) {
        log::warn!("failed to render diagnostic: {}", e);
    }
}
