use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use chat_dynamics::analyzers::Registry;
use chat_dynamics::report::render;
use chat_dynamics::{
    CancelToken, Engine, EngineConfig, ExecutionMode, InputFormat, Personalization, Progress,
};

#[derive(Parser)]
#[command(name = "chat-dynamics")]
#[command(version)]
#[command(about = "Analyze the communication dynamics of a two-person chat transcript")]
struct Cli {
    /// Transcript file (reads stdin when omitted or "-")
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Input format: paste, file, or screenshot
    #[arg(long, default_value = "paste")]
    format: String,

    /// Your name as it appears in the transcript
    #[arg(long)]
    you: Option<String>,

    /// The other person's name as it appears in the transcript
    #[arg(long)]
    them: Option<String>,

    /// What you want to learn from this conversation
    #[arg(long)]
    goal: Option<String>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    output: String,

    /// Engine config YAML (see --print-defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lexicon YAML replacing the built-in phrase tables
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Minimum number of messages to analyze
    #[arg(long)]
    min_messages: Option<usize>,

    /// Minutes of silence that start a new conversation
    #[arg(long)]
    initiation_gap_minutes: Option<i64>,

    /// Run analyzers in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the default engine config as YAML and exit
    #[arg(long)]
    print_defaults: bool,

    /// Suppress progress output on stderr
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_dynamics=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if cli.print_defaults {
        print!("{}", EngineConfig::defaults_yaml()?);
        return Ok(());
    }

    let format: InputFormat = cli.format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    if cli.output != "text" && cli.output != "json" {
        anyhow::bail!("invalid output '{}': expected text or json", cli.output);
    }

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    config.apply_overrides(
        cli.min_messages,
        cli.initiation_gap_minutes,
        cli.parallel.then_some(ExecutionMode::Parallel),
        cli.lexicon.clone(),
    );

    let raw = read_input(cli.input.as_ref())?;
    let personalization = Personalization {
        your_name: cli.you,
        counterpart_name: cli.them,
        stated_goal: cli.goal,
    };

    let engine = Engine::new(config).context("failed to initialize engine")?;
    let quiet = cli.quiet;
    let mut on_progress = |p: &Progress| {
        if !quiet {
            eprintln!("[{:>3.0}%] {}", p.fraction * 100.0, p.classifier);
        }
    };

    let report = engine.analyze(
        &raw,
        format,
        &personalization,
        &mut on_progress,
        &CancelToken::new(),
    )?;

    if cli.output == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::text(&report, &Registry::builtin()));
    }

    if !report.success {
        std::process::exit(2);
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read transcript '{}'", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read transcript from stdin")?;
            Ok(buf)
        }
    }
}
