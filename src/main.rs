//! lexscope driver
//!
//! Dumps token streams and checks block nesting for source files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use lexscope::feedback::{ErrorReport, Location, Severity};
use lexscope::{AnalyzerConfig, Error, Lexer, ScopeAnalyzer, Token, TokenKind};

/// lexscope front end
#[derive(Parser, Debug)]
#[command(name = "lexscope")]
#[command(version = "0.1.0")]
#[command(about = "Lexer and scope analyzer for a small imperative language")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token stream of a source file
    Tokens {
        /// Input source file
        input: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Lex a source file and check its block nesting
    Check {
        /// Input source file
        input: PathBuf,

        /// Maximum block nesting, outermost level included
        #[arg(long)]
        max_depth: Option<usize>,

        /// JSON analyzer configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Emit JSON reports instead of text
        #[arg(long)]
        json: bool,
    },
}

/// One line of `tokens` output
#[derive(Debug, Serialize)]
struct TokenRecord {
    line: usize,
    kind: String,
    index: Option<usize>,
    text: Option<String>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::Tokens { input, json } => dump_tokens(input, *json),
        Commands::Check { input, max_depth, config, json } => {
            check_file(input, *max_depth, config.as_deref(), *json)
        }
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

fn read_lexer(input: &Path) -> Result<Lexer> {
    let file = fs::File::open(input)
        .with_context(|| format!("cannot open {}", input.display()))?;
    let lexer = Lexer::from_reader(file)
        .with_context(|| format!("cannot read {}", input.display()))?;
    Ok(lexer)
}

/// Drain the lexer, keeping the tokens produced before a failure
fn collect_tokens(lexer: &mut Lexer) -> (Vec<Token>, Option<Error>) {
    let mut tokens = Vec::new();
    for item in lexer.run() {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => return (tokens, Some(e)),
        }
    }
    (tokens, None)
}

/// Table text behind a token's secondary index
fn token_text(lexer: &Lexer, token: &Token) -> Option<String> {
    let index = token.index?;
    match token.kind {
        TokenKind::Identifier => token.name().and_then(|id| lexer.name_of(id)).map(str::to_string),
        TokenKind::Numeral => lexer.numeral(index).map(|n| n.to_string()),
        TokenKind::StringLiteral => lexer.string(index).map(|s| format!("{s:?}")),
        TokenKind::Character => lexer.rune(index).map(|c| format!("{c:?}")),
        _ => None,
    }
}

fn dump_tokens(input: &Path, json: bool) -> Result<bool> {
    let mut lexer = read_lexer(input)?;
    let (tokens, failure) = collect_tokens(&mut lexer);
    info!("{} tokens, {} identifiers", tokens.len(), lexer.identifiers().len());

    let records: Vec<_> = tokens
        .iter()
        .map(|token| TokenRecord {
            line: token.span.line,
            kind: format!("{:?}", token.kind),
            index: token.index,
            text: token_text(&lexer, token),
        })
        .collect();

    let file_name = input.to_string_lossy();
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            match &record.text {
                Some(text) => println!("{:>4}  {} {}", record.line, record.kind, text),
                None => println!("{:>4}  {}", record.line, record.kind),
            }
        }
    }

    match failure {
        Some(e) => {
            print_reports(&[ErrorReport::from_error(&e, &file_name)], json);
            Ok(false)
        }
        None => Ok(true),
    }
}

fn load_config(max_depth: Option<usize>, config: Option<&Path>) -> Result<AnalyzerConfig> {
    let mut loaded = match config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            AnalyzerConfig::from_json(&text)?
        }
        None => AnalyzerConfig::default(),
    };
    if let Some(depth) = max_depth {
        loaded = loaded.with_max_depth(depth);
    }
    loaded.validate()?;
    Ok(loaded)
}

fn check_file(input: &Path, max_depth: Option<usize>, config: Option<&Path>, json: bool) -> Result<bool> {
    let config = load_config(max_depth, config)?;
    let mut lexer = read_lexer(input)?;
    let mut scopes = ScopeAnalyzer::new(&config)?;
    let file_name = input.to_string_lossy().to_string();
    let location = |token: &Token| Location {
        file: file_name.clone(),
        line: token.span.line,
        start: token.span.start,
        end: token.span.end,
    };

    let (tokens, failure) = collect_tokens(&mut lexer);
    let mut reports = Vec::new();

    for token in &tokens {
        let nesting = match token.kind {
            TokenKind::LeftBraces => scopes.open_block().map(drop),
            TokenKind::RightBraces => scopes.close_block().map(drop),
            TokenKind::Unknown(c) => {
                reports.push(ErrorReport::warning(
                    "L1001",
                    &format!("unexpected character {c:?}"),
                    Some(location(token)),
                ));
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(e) = nesting {
            let mut report = ErrorReport::from_error(&e, &file_name);
            report.location = Some(location(token));
            reports.push(report);
            break;
        }
    }

    match failure {
        Some(e) => reports.push(ErrorReport::from_error(&e, &file_name)),
        None if scopes.current_level() > 0 => reports.push(ErrorReport::warning(
            "S1001",
            &format!("{} block(s) left open at end of input", scopes.current_level()),
            tokens.last().map(location),
        )),
        None => {}
    }

    let clean = reports.iter().all(|r| r.severity != Severity::Error);
    if reports.is_empty() && !json {
        println!("No errors found");
    } else {
        print_reports(&reports, json);
    }
    Ok(clean)
}

fn print_reports(reports: &[ErrorReport], json: bool) {
    if json {
        let body = serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string());
        println!("{}", body);
        return;
    }
    for report in reports {
        let tag = match report.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &report.location {
            Some(loc) => eprintln!("{}[{}]: {}:{}: {}", tag, report.code, loc.file, loc.line, report.message),
            None => eprintln!("{}[{}]: {}", tag, report.code, report.message),
        }
    }
}
