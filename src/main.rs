//! sigil - run directive chains from the command line

use anyhow::Context;
use clap::{Parser, Subcommand};
use sigil_core::{BrainwaveMode, EngineLayer, RecursionGauge};
use sigil_orchestrator::{Orchestrator, Response, SigilConfig};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sigil", version, about = "Symbolic directive orchestration")]
struct Cli {
    /// Config file (TOML). Missing file means defaults.
    #[arg(short, long, global = true, default_value = "sigil.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one input. Reads stdin when TEXT is omitted.
    Run {
        text: Option<String>,
        #[arg(short, long, default_value = "cli")]
        session: String,
        #[arg(short, long, default_value = "local")]
        user: String,
        /// delta, theta, alpha, beta, gamma or emergence
        #[arg(short, long)]
        mode: Option<BrainwaveMode>,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Process stdin line by line against one orchestrator
    Repl {
        #[arg(short, long, default_value = "repl")]
        session: String,
        #[arg(short, long, default_value = "local")]
        user: String,
        #[arg(short, long)]
        mode: Option<BrainwaveMode>,
    },
    /// List directive keywords serviced by registered engines
    Keywords,
    /// One-line help for a keyword
    Help { keyword: String },
    /// List engines, optionally one layer only
    Engines {
        #[arg(short, long)]
        layer: Option<EngineLayer>,
    },
    /// Process each input, then print per-engine runtime state
    Stats { inputs: Vec<String> },
    /// Verify engine dependencies and mode mappings
    Check,
    /// Print the effective config as TOML
    DumpConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "sigil=info".into()))
        .with(
            cli.log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with((!cli.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let config = SigilConfig::load(&cli.config);
    tracing::debug!("Default mode {}", config.orchestrator.default_mode);

    match cli.command {
        Commands::Run {
            text,
            session,
            user,
            mode,
            json,
        } => {
            let orch = Orchestrator::from_config(config)?;
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut buf)
                        .await
                        .context("reading stdin")?;
                    buf
                }
            };
            let response = orch.process_input(&text, &session, &user, mode).await;
            print_response(&response, json);
            if !response.success {
                std::process::exit(2);
            }
        }

        Commands::Repl { session, user, mode } => {
            let orch = Orchestrator::from_config(config)?;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, ":q" | ":quit" | ":exit") {
                    break;
                }
                if line == ":stats" {
                    println!("{}", serde_json::to_string_pretty(&orch.snapshot())?);
                    continue;
                }
                let response = orch.process_input(line, &session, &user, mode).await;
                print_response(&response, false);
            }
        }

        Commands::Keywords => {
            let orch = Orchestrator::from_config(config)?;
            for keyword in orch.keywords() {
                match orch.keyword_help(keyword) {
                    Some(help) => println!("{}", help),
                    None => println!("#{}", keyword),
                }
            }
        }

        Commands::Help { keyword } => {
            let orch = Orchestrator::from_config(config)?;
            match orch.keyword_help(&keyword) {
                Some(help) => println!("{}", help),
                None => {
                    eprintln!("unknown directive: {}", keyword);
                    std::process::exit(1);
                }
            }
        }

        Commands::Engines { layer } => {
            let orch = Orchestrator::from_config(config)?;
            let layers = match layer {
                Some(layer) => vec![layer],
                None => vec![EngineLayer::Primary, EngineLayer::Secondary, EngineLayer::Meta],
            };
            for layer in layers {
                for engine in orch.engines_by_layer(layer) {
                    println!(
                        "{} {:<10} v{:<6} [{}] {}",
                        engine.symbol(),
                        engine.name(),
                        engine.version(),
                        layer.as_str(),
                        engine.description()
                    );
                }
            }
        }

        Commands::Stats { inputs } => {
            let orch = Orchestrator::from_config(config)?;
            for input in &inputs {
                orch.process_input(input, "stats", "local", None).await;
            }
            println!("{}", serde_json::to_string_pretty(&orch.snapshot())?);
        }

        Commands::Check => {
            let registry = sigil_engines::create_default_registry(RecursionGauge::new());
            let report = registry.check_dependencies();
            let unresolved = config.modes.unresolved(&registry.list());

            print!("{}", report);
            if report.is_ok() {
                println!();
            }
            for (mode, engine) in &unresolved {
                println!("mode {} -> {} (unregistered)", mode, engine);
            }
            if !report.is_ok() || !unresolved.is_empty() {
                std::process::exit(1);
            }
            println!("ok: {} engines, {} keywords", registry.len(), registry.keywords().len());
        }

        Commands::DumpConfig => {
            print!("{}", config.to_toml());
        }
    }

    Ok(())
}

fn print_response(response: &Response, json: bool) {
    if json {
        println!("{}", response.to_json());
        return;
    }
    println!("{}", response.text.trim_end());
    if !response.paradoxes.is_empty() {
        println!("paradoxes: {}", response.paradoxes.join(", "));
    }
    if let Some(error) = &response.error {
        eprintln!("error: {}", error);
    }
}
