use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use promptly_core::buffer::{DocumentBuffer, PieceTable};
use promptly_core::config::{ApplyMode, EngineConfig, FallbackPlacement, StrategyKind};
use promptly_core::engine::Applier;
use promptly_core::logger::{generate_rid, Logger};
use promptly_core::route::{ParsedResponse, Router};
use promptly_core::{preview, prompts, test_runner};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_INPUT_SIZE: u64 = 100_000_000;

#[derive(Parser)]
#[command(name = "promptly", version, about = "Route LLM replies and apply edit blocks to prompt documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a response into chat narration and editor content
    Route {
        #[arg(long)]
        response: PathBuf,
        #[arg(long)]
        document: Option<PathBuf>,
        /// Recover a block whose closing marker was cut off
        #[arg(long)]
        incomplete: bool,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        matching: MatchArgs,
    },
    /// Apply an edit block to a document
    Apply {
        #[arg(long)]
        document: PathBuf,
        #[arg(long)]
        edits: PathBuf,
        #[arg(long, value_enum, default_value = "snapshot")]
        mode: ModeArg,
        /// Byte offset for fallback insertion instead of the document end
        #[arg(long)]
        cursor: Option<usize>,
        /// Write the result back to the document
        #[arg(long)]
        write: bool,
        #[command(flatten)]
        matching: MatchArgs,
    },
    /// Print the assistant instructions for the edit grammar
    Prompt,
    /// Run the fixture gauntlet under tests/cases
    SelfTest,
}

#[derive(Args)]
struct MatchArgs {
    #[arg(long, value_enum, default_value = "word-overlap")]
    strategy: StrategyArg,
    /// Exact matches only
    #[arg(long)]
    no_fuzzy: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Snapshot,
    Chained,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    WordOverlap,
    EditDistance,
}

impl MatchArgs {
    fn config(&self) -> EngineConfig {
        let mut config = EngineConfig::new();
        config.fuzzy = !self.no_fuzzy;
        config.strategy = match self.strategy {
            StrategyArg::WordOverlap => StrategyKind::WordOverlap,
            StrategyArg::EditDistance => StrategyKind::EditDistance,
        };
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Route { response, document, incomplete, json, matching } => {
            route(&response, document.as_deref(), incomplete, json, &matching)
        }
        Command::Apply { document, edits, mode, cursor, write, matching } => {
            let mut config = matching.config();
            config.apply_mode = match mode {
                ModeArg::Snapshot => ApplyMode::Snapshot,
                ModeArg::Chained => ApplyMode::Chained,
            };
            if let Some(offset) = cursor {
                config.fallback = FallbackPlacement::Cursor(offset);
            }
            apply(&document, &edits, config, write)
        }
        Command::Prompt => {
            println!("{}", prompts::build_agent_prompt());
            Ok(())
        }
        Command::SelfTest => {
            let summary = test_runner::run();
            println!("{}", summary.log);
            if !summary.all_passed() {
                bail!("{}/{} gauntlet cases passed", summary.passed, summary.total);
            }
            Ok(())
        }
    }
}

fn route(
    response: &Path,
    document: Option<&Path>,
    incomplete: bool,
    json: bool,
    matching: &MatchArgs,
) -> Result<()> {
    let raw = read_input(response)?;
    let current = document.map(read_input).transpose()?;

    let logger = Logger::new(generate_rid());
    let router = Router::new(&logger, matching.config())?;
    let parsed = if incomplete {
        router.parse_response_with_incomplete_delimiters(&raw, current.as_deref())
    } else {
        router.parse_response(&raw, current.as_deref())
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }
    print_parsed(&parsed, current.as_deref());
    Ok(())
}

fn print_parsed(parsed: &ParsedResponse, current: Option<&str>) {
    if !parsed.sidebar_content.is_empty() {
        println!("{}\n", parsed.sidebar_content);
    }
    let Some(content) = &parsed.editor_content else {
        if let Some(summary) = parsed.summary() {
            println!("{summary}");
        }
        return;
    };

    match current {
        Some(current) => print!("{}", preview::render_diff(current, content)),
        None => println!("{content}"),
    }
    for outcome in parsed.edit_instructions.iter().filter(|o| !o.applied) {
        println!(
            "✗ {}: {}",
            outcome.instruction.verb(),
            outcome.error.as_deref().unwrap_or("not applied")
        );
    }
    if let Some(summary) = parsed.summary() {
        println!("{summary}");
    }
}

fn apply(document: &Path, edits: &Path, config: EngineConfig, write: bool) -> Result<()> {
    let original = read_input(document)?;
    let raw = read_input(edits)?;

    let logger = Logger::new(generate_rid());
    let applier = Applier::new(&logger, config)?;
    let mut buffer = PieceTable::from_text(&original);
    let report = applier.apply_block_or_fallback(&mut buffer, &raw)?;
    let updated = buffer.value();

    print!("{}", preview::render_diff(&original, &updated));
    for outcome in report.outcomes.iter().filter(|o| !o.applied) {
        println!(
            "✗ {}: {}",
            outcome.instruction.verb(),
            outcome.error.as_deref().unwrap_or("not applied")
        );
    }
    let (inserted, deleted) = preview::change_counts(&original, &updated);
    println!("{} (+{inserted} -{deleted} lines)", report.summary());

    if write && updated != original {
        fs::write(document, &updated)
            .with_context(|| format!("failed to write {}", document.display()))?;
        println!("✓ Wrote {}", document.display());
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    let meta = fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    if meta.len() > MAX_INPUT_SIZE {
        bail!("{} exceeds max input size {MAX_INPUT_SIZE}", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}
