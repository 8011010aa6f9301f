//! counsel — run the counsellor chat API or the researcher A2A server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use counsel_a2a::{A2aServer, AgentCard, DelegateResearchTool, RemoteResearcher};
use counsel_core::config::{DEFAULT_COUNSELLOR_PORT, DEFAULT_RESEARCHER_PORT};
use counsel_core::prompts::{COUNSELLOR_INSTRUCTION, RESEARCHER_INSTRUCTION};
use counsel_core::tools::ToolRegistry;
use counsel_core::{Config, ConversationRouter, GeminiProvider, LlmAgent};
use counsel_store::{LookupCareerInfoTool, ResearchStore, SaveCareerInfoTool};

#[derive(Parser)]
#[command(name = "counsel", version, about = "Career counselling multi-agent service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the counsellor: the public chat API that delegates research
    Counsellor,
    /// Run the researcher: the A2A task server with the research store
    Researcher,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Counsellor => run_counsellor().await,
        Command::Researcher => run_researcher().await,
    }
}

async fn run_counsellor() -> Result<()> {
    let config = Config::from_env(DEFAULT_COUNSELLOR_PORT);
    banner("COUNSELLOR API", config.port, &config);

    let provider = Arc::new(GeminiProvider::new(&config.api_key, &config.model));

    let researcher = Arc::new(RemoteResearcher::new(
        &config.researcher_url,
        config.a2a_timeout,
    ));
    researcher.connect().await;

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(DelegateResearchTool::new(researcher)));

    let agent = LlmAgent::new("counsellor", COUNSELLOR_INSTRUCTION, provider, tools);
    let router = Arc::new(ConversationRouter::new(Arc::new(agent)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    counsel_gateway::serve(router, addr).await
}

async fn run_researcher() -> Result<()> {
    let config = Config::from_env(DEFAULT_RESEARCHER_PORT);
    banner("RESEARCHER A2A SERVER", config.port, &config);

    let provider = Arc::new(GeminiProvider::new(&config.api_key, &config.model));

    let store = Arc::new(ResearchStore::new(&config.research_db));
    info!("Research store: {}", store.path().display());

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(SaveCareerInfoTool::new(store.clone())));
    tools.register(Arc::new(LookupCareerInfoTool::new(store)));

    let agent = LlmAgent::new("researcher", RESEARCHER_INSTRUCTION, provider, tools);

    let card = AgentCard {
        name: "researcher".to_string(),
        description: "Career research agent that stores and reports findings".to_string(),
        url: format!("http://localhost:{}", config.port),
        capabilities: vec!["career_research".to_string(), "research_store".to_string()],
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    A2aServer::new(card, Arc::new(agent)).serve(addr).await
}

fn banner(role: &str, port: u16, config: &Config) {
    info!("{}", "=".repeat(50));
    info!("  {}", role);
    info!("{}", "=".repeat(50));
    info!("  URL: http://localhost:{}", port);
    info!("  Model: {}", config.model);
    info!("  Researcher: {}", config.researcher_url);
    info!("{}", "=".repeat(50));
}
