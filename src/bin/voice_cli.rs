//! Voice command CLI
//!
//! # Usage
//!
//! ```bash
//! # Interpret one utterance (lexical stages only unless a classifier is given)
//! voice_cli interpret "I want to do squats"
//! voice_cli interpret "let's get going" --classifier-url http://localhost:9001/zero-shot
//!
//! # Run the accuracy corpus
//! voice_cli evaluate --corpus tests/golden_corpus/commands.yaml --json
//!
//! # Validate a lexicon file
//! voice_cli lexicon --path my_lexicon.yaml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use coach_intent::{Confidence, Intent, LexiconCompiler};
use coach_voice::evaluation::{EvalCorpus, EvaluationReport, Evaluator};
use coach_voice::service::build_matcher;
use coach_voice::AppConfig;

const BUNDLED_CORPUS: &str = include_str!("../../tests/golden_corpus/commands.yaml");

#[derive(Parser)]
#[command(name = "voice_cli")]
#[command(version)]
#[command(about = "Interpret workout voice commands and measure accuracy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpret a transcribed utterance and print the command JSON
    Interpret {
        /// Transcribed text
        text: String,

        /// Zero-shot classifier endpoint for the fallback stage
        #[arg(long, env = "COACH_CLASSIFIER_URL")]
        classifier_url: Option<Url>,

        /// Also print the deciding stage and raw intent
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run a labelled corpus through the interpreter
    Evaluate {
        /// Corpus YAML (the bundled golden corpus if omitted)
        #[arg(short, long)]
        corpus: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load and validate a lexicon, then print its summary
    Lexicon {
        /// Lexicon YAML (the built-in lexicon if omitted)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coach_voice=warn,coach_intent=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Interpret {
            text,
            classifier_url,
            verbose,
        } => cmd_interpret(&text, classifier_url, verbose).await,
        Commands::Evaluate { corpus, json } => cmd_evaluate(corpus, json).await,
        Commands::Lexicon { path } => cmd_lexicon(path),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(classifier_url: Option<Url>) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if classifier_url.is_some() {
        config.classifier_url = classifier_url;
    }
    Ok(config)
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn cmd_interpret(
    text: &str,
    classifier_url: Option<Url>,
    verbose: bool,
) -> anyhow::Result<bool> {
    let config = load_config(classifier_url)?;
    let matcher = build_matcher(&config).context("Failed to build interpreter")?;

    let interpretation = matcher.interpret(text).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&interpretation.command)
            .context("Failed to serialize command")?
    );

    if verbose {
        let confidence = match interpretation.command.confidence {
            Confidence::High => "high".green(),
            Confidence::Medium => "medium".yellow(),
        };
        eprintln!(
            "{} {}  {} {}  {} {}",
            "stage:".dimmed(),
            interpretation.stage.to_string().cyan(),
            "raw:".dimmed(),
            interpretation.raw_intent,
            "confidence:".dimmed(),
            confidence
        );
    }
    Ok(interpretation.command.intent != Intent::Unknown)
}

async fn cmd_evaluate(corpus: Option<PathBuf>, json: bool) -> anyhow::Result<bool> {
    let corpus = match &corpus {
        Some(path) => EvalCorpus::from_path(path)
            .with_context(|| format!("Failed to load corpus {}", path.display()))?,
        None => EvalCorpus::from_yaml_str(BUNDLED_CORPUS).context("Bundled corpus is invalid")?,
    };

    let config = load_config(None)?;
    let matcher = build_matcher(&config).context("Failed to build interpreter")?;
    let report = Evaluator::new(matcher).run(&corpus.cases).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_report(&report);
    }
    Ok(report.is_perfect())
}

fn print_report(report: &EvaluationReport) {
    println!("{}", "Voice command accuracy".cyan().bold());
    println!("  lexicon   {}", &report.lexicon_hash[..12.min(report.lexicon_hash.len())]);
    println!("  cases     {}", report.total_cases);
    println!("  intent    {:.1}%", report.intent_accuracy);
    println!("  entity    {:.1}%", report.entity_accuracy);
    println!("  overall   {:.1}%", report.overall_accuracy);
    println!(
        "  latency   min {:.2}ms  mean {:.2}ms  max {:.2}ms",
        report.latency.min_ms, report.latency.mean_ms, report.latency.max_ms
    );

    println!();
    println!("{}", "By intent".cyan().bold());
    for (intent, breakdown) in &report.by_intent {
        println!(
            "  {:<16} {}/{} ({:.1}%)",
            intent, breakdown.correct, breakdown.total, breakdown.accuracy
        );
    }

    println!();
    println!("{}", "By stage".cyan().bold());
    for (stage, count) in &report.by_stage {
        println!("  {:<16} {}", stage, count);
    }

    if report.is_perfect() {
        println!();
        println!("{} All cases passed", "OK".green().bold());
        return;
    }

    println!();
    println!("{}", "Failures".red().bold());
    for failure in &report.failures {
        println!(
            "  {:?}: expected {} / {:?}, got {} / {:?} ({})",
            failure.case.text,
            failure.case.expected_intent,
            failure.case.expected_entity,
            failure.actual.intent.to_string().red(),
            failure.actual.entity,
            failure.stage
        );
    }
}

fn cmd_lexicon(path: Option<PathBuf>) -> anyhow::Result<bool> {
    let lexicon = match &path {
        Some(path) => LexiconCompiler::from_path(path)
            .with_context(|| format!("Lexicon {} rejected", path.display()))?,
        None => LexiconCompiler::builtin().context("Built-in lexicon rejected")?,
    };

    println!("{} Lexicon is valid", "OK".green().bold());
    println!("  version            {}", lexicon.version);
    println!("  sha256             {}", lexicon.hash);
    println!("  single tokens      {}", lexicon.single_tokens().count());
    println!("  phrase categories  {}", lexicon.phrase_sets().len());
    println!("  exercise keywords  {}", lexicon.exercise_keywords().len());
    println!("  mishearings        {}", lexicon.mishearings().count());
    println!("  fallback labels    {}", lexicon.fallback().candidates().len());
    println!("  exercises          {}", lexicon.exercise_vocabulary().join(", "));
    println!("  routines           {}", lexicon.routine_codes().join(", "));
    Ok(true)
}
