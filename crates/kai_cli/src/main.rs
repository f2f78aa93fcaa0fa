use anyhow::{Context, Result};
use clap::Parser;
use kai_core::config::{KaiConfig, ResponderBackend};
use kai_memory::{Responders, Session, TurnOutcome};
use kai_reasoning::{OllamaResponder, TemplateResponder};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kai", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "KAI_CONFIG", default_value = "kai.toml")]
    config: PathBuf,

    /// Directory for persisted state (overrides config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Seed for every random choice, for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Also serve the HTTP gateway
    #[arg(long)]
    gateway: bool,

    /// Gateway port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Send open-ended messages to the local Ollama model
    #[arg(long)]
    llm: bool,

    /// Never send unprompted messages
    #[arg(long)]
    no_initiate: bool,
}

impl Args {
    fn apply(&self, config: &mut KaiConfig) {
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.clone();
        }
        if let Some(seed) = self.seed {
            config.rng_seed = Some(seed);
        }
        if let Some(port) = self.port {
            config.gateway.port = port;
        }
        if self.llm {
            config.responder.backend = ResponderBackend::Ollama;
        }
        if self.no_initiate {
            config.initiator.enabled = false;
        }
    }
}

fn build_responders(config: &KaiConfig) -> Result<Responders> {
    let mut responders = Responders::rule_based(Arc::new(TemplateResponder::new(config.rng_seed)));
    if config.responder.backend == ResponderBackend::Ollama {
        let model = OllamaResponder::new(&config.responder)
            .context("Failed to set up the Ollama responder")?;
        info!(
            "Open-ended messages go to Ollama model {} at {}",
            model.model(),
            config.responder.base_url
        );
        responders.open_ended = Some(Arc::new(model));
    }
    Ok(responders)
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn print_outcome(outcome: &TurnOutcome) {
    println!("\nKai: {}", outcome.reply);
    println!("  [{}]", outcome.emotion.stat_line());
    for change in &outcome.hormone_changes {
        println!("  {}", change.describe());
    }
    println!();
}

async fn print_pending(session: &Session) {
    for msg in session.drain_pending().await {
        println!("\nKai (reaching out): {}\n", msg.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut config = KaiConfig::load_or_default(&args.config);
    args.apply(&mut config);

    info!("Initializing Kai...");
    let responders = build_responders(&config)?;
    let session = Arc::new(Session::open(config.clone(), responders));
    let initiator = session.spawn_initiator();

    #[cfg(feature = "gateway")]
    if args.gateway {
        kai_gateway::GatewayServer::new(session.clone(), &config.gateway.host, config.gateway.port)
            .start();
    }
    #[cfg(not(feature = "gateway"))]
    if args.gateway {
        tracing::warn!("Built without the gateway feature, ignoring --gateway");
    }

    println!("Kai is here. Commands: status, inbox, quit.");
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "quit" | "exit" => break,
                    "" => {}
                    "status" => {
                        let status = session.status().await;
                        println!("{}", serde_json::to_string_pretty(&status)?);
                    }
                    "inbox" => {
                        let pending = session.drain_pending().await;
                        if pending.is_empty() {
                            println!("(nothing waiting)");
                        }
                        for msg in pending {
                            println!("[{}] {}", msg.timestamp.format("%H:%M:%S"), msg.message);
                        }
                    }
                    text => {
                        let outcome = session.process_message(text).await;
                        print_outcome(&outcome);
                    }
                }
                prompt()?;
            }
            _ = session.initiated() => {
                print_pending(&session).await;
                prompt()?;
            }
        }
    }

    if let Some(handle) = initiator {
        handle.abort();
    }
    session.flush().await?;
    info!("State saved. Bye.");
    Ok(())
}
