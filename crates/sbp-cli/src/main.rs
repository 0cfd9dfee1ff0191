#![forbid(unsafe_code)]

//! Service blueprint CLI - turn blueprint step lines into lane graphs.
//!
//! # Commands
//!
//! - `parse`: Output parsed steps (or a summary) as JSON
//! - `detect`: Show which grammar each line uses
//! - `validate`: Check every line and report diagnostics
//! - `render`: Draw each step as a plain-text lane view

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use sbp_core::BlueprintStep;
use sbp_parser::{
    DocumentParse, comma_count, detect_grammar, parse_document, parse_evidence_json,
};
use sbp_render_term::{GlyphMode, LaneRenderConfig, render_lanes_with_config};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Service blueprint CLI - turn blueprint step lines into lane graphs.
#[derive(Debug, Parser)]
#[command(
    name = "sbp-cli",
    version,
    about = "Service blueprint CLI - parse blueprint step lines into lane graphs",
    long_about = "Reads one blueprint step per line, in either the legacy\n\
        'step, flow, actions' form or the inline 'Step:C Action/F Action' form,\n\
        and emits the resulting lane graph as JSON or a terminal lane view."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse every line and output the steps as JSON.
    Parse {
        /// Input file path or "-" for stdin. If omitted, reads from stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output counts instead of the full steps
        #[arg(long)]
        summary: bool,

        /// Drop invalid lines with a warning instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Show the grammar chosen for each line.
    Detect {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate every line and report diagnostics.
    Validate {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON (structured diagnostics)
        #[arg(long)]
        json: bool,
    },

    /// Render each step as a terminal lane view.
    Render {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Layout density
        #[arg(short, long, value_enum, default_value = "default")]
        preset: Preset,

        /// Use ASCII glyphs instead of Unicode box-drawing
        #[arg(long)]
        ascii: bool,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,

        /// Drop invalid lines with a warning instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },
}

/// Density preset for the render command.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum Preset {
    Default,
    Compact,
    Rich,
}

#[derive(Debug, Serialize)]
struct DetectResult {
    line: usize,
    comma_count: usize,
    first_choice: String,
    parsed_as: Option<String>,
    fell_back: bool,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    line_count: usize,
    step_count: usize,
    warnings: Vec<ValidationWarning>,
    errors: Vec<ValidationError>,
}

#[derive(Debug, Serialize)]
struct ValidationWarning {
    line: usize,
    message: String,
}

#[derive(Debug, Serialize)]
struct ValidationError {
    code: String,
    message: String,
    line: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Parse {
            input,
            pretty,
            summary,
            skip_invalid,
        } => cmd_parse(&input, pretty, summary, skip_invalid),

        Command::Detect { input, json } => cmd_detect(&input, json),

        Command::Validate { input, json } => cmd_validate(&input, json),

        Command::Render {
            input,
            preset,
            ascii,
            output,
            skip_invalid,
        } => cmd_render(&input, preset, ascii, output.as_deref(), skip_invalid),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline blueprint text
        Ok(input.to_string())
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

/// Successful steps in order. Any failed line aborts unless `skip_invalid`.
fn collect_steps(parsed: &DocumentParse, skip_invalid: bool) -> Result<Vec<&BlueprintStep>> {
    let mut steps = Vec::with_capacity(parsed.lines.len());
    for line in &parsed.lines {
        match &line.result {
            Ok(line_parse) => {
                if let Some(err) = &line_parse.legacy_error {
                    debug!(
                        "Line {}: legacy grammar rejected ({err}); parsed as inline",
                        line.line_number
                    );
                }
                steps.push(&line_parse.step);
            }
            Err(err) if skip_invalid => {
                warn!("Skipping line {}: {err}", line.line_number);
            }
            Err(err) => bail!("Line {}: {err}", line.line_number),
        }
    }
    Ok(steps)
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, pretty: bool, summary: bool, skip_invalid: bool) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_document(&source);

    debug!(
        "Parsed: lines={}, steps={}",
        parsed.lines.len(),
        parsed.steps().count()
    );

    let output = if summary {
        let evidence = parse_evidence_json(&parsed);
        if pretty {
            let value: serde_json::Value = serde_json::from_str(&evidence)?;
            serde_json::to_string_pretty(&value)?
        } else {
            evidence
        }
    } else {
        let steps = collect_steps(&parsed, skip_invalid)?;
        if pretty {
            serde_json::to_string_pretty(&steps)?
        } else {
            serde_json::to_string(&steps)?
        }
    };

    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: detect
// =============================================================================

fn cmd_detect(input: &str, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_document(&source);

    let results: Vec<DetectResult> = parsed
        .lines
        .iter()
        .map(|line| {
            let (parsed_as, fell_back, error) = match &line.result {
                Ok(line_parse) => (
                    Some(line_parse.grammar.as_str().to_string()),
                    line_parse.fell_back(),
                    None,
                ),
                Err(err) => (None, false, Some(err.to_string())),
            };
            DetectResult {
                line: line.line_number,
                comma_count: comma_count(&line.text),
                first_choice: detect_grammar(&line.text).as_str().to_string(),
                parsed_as,
                fell_back,
                error,
            }
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            let outcome = match (&result.parsed_as, &result.error) {
                (Some(grammar), _) if result.fell_back => format!("{grammar} (fallback)"),
                (Some(grammar), _) => grammar.clone(),
                (None, Some(error)) => format!("error: {error}"),
                (None, None) => "error".to_string(),
            };
            println!(
                "Line {:>4}: commas={} first={} parsed={}",
                result.line, result.comma_count, result.first_choice, outcome
            );
        }
    }

    Ok(())
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_document(&source);

    let mut errors: Vec<ValidationError> = parsed
        .errors()
        .map(|(line, err)| ValidationError {
            code: err.code().as_str().to_string(),
            message: err.to_string(),
            line: Some(line),
        })
        .collect();

    if parsed.lines.is_empty() {
        errors.push(ValidationError {
            code: "sbp/error/empty-input".to_string(),
            message: "Input has no blueprint lines".to_string(),
            line: None,
        });
    }

    let warnings: Vec<ValidationWarning> = parsed
        .lines
        .iter()
        .filter_map(|line| {
            let line_parse = line.result.as_ref().ok()?;
            let err = line_parse.legacy_error.as_ref()?;
            Some(ValidationWarning {
                line: line.line_number,
                message: format!("Legacy grammar rejected ({err}); parsed as inline"),
            })
        })
        .collect();

    let result = ValidateResult {
        valid: errors.is_empty(),
        line_count: parsed.lines.len(),
        step_count: parsed.steps().count(),
        warnings,
        errors,
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if result.valid {
            println!("✓ Valid blueprint ({} steps)", result.step_count);
        } else {
            println!("✗ Invalid blueprint");
        }

        println!("  Lines: {}", result.line_count);
        println!("  Steps: {}", result.step_count);

        if !result.errors.is_empty() {
            println!("\nErrors:");
            for err in &result.errors {
                let location = err.line.map(|l| format!(" (line {l})")).unwrap_or_default();
                println!("  [{}] {}{}", err.code, err.message, location);
            }
        }

        if !result.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &result.warnings {
                println!("  (line {}) {}", warning.line, warning.message);
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

// =============================================================================
// Command: render
// =============================================================================

fn cmd_render(
    input: &str,
    preset: Preset,
    ascii: bool,
    output: Option<&str>,
    skip_invalid: bool,
) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_document(&source);
    let steps = collect_steps(&parsed, skip_invalid)?;

    let mut config = match preset {
        Preset::Default => LaneRenderConfig::default(),
        Preset::Compact => LaneRenderConfig::compact(),
        Preset::Rich => LaneRenderConfig::rich(),
    };
    if ascii {
        config = config.with_glyph_mode(GlyphMode::Ascii);
    }

    let mut rendered = steps
        .iter()
        .map(|step| render_lanes_with_config(step, &config))
        .collect::<Vec<_>>()
        .join("\n\n");
    rendered.push('\n');

    write_output(output, &rendered)?;

    info!("Rendered {} steps", steps.len());
    Ok(())
}
