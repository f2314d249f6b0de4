use clap::{Parser, Subcommand};
use oxidized_react::agents::AgentSettings;
use oxidized_react::config::Config;
use oxidized_react::llm::ModelChoice;
use oxidized_react::middleware::RateLimiter;
use oxidized_react::session::{ChatSession, SessionStore};
use oxidized_react::utils::init_logger;
use oxidized_react::{build_agent, create_router, repl, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "oxidized-react", version, about = "ReAct research agent with web, Wikipedia and arXiv tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat session
    Chat {
        #[arg(long)]
        model: Option<ModelChoice>,
        #[arg(long)]
        max_steps: Option<usize>,
    },
    /// Answer a single question and exit
    Ask {
        question: String,
        #[arg(long)]
        model: Option<ModelChoice>,
        #[arg(long)]
        max_steps: Option<usize>,
    },
    /// Serve the HTTP chat API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    let default_filter = match cli.command {
        Command::Serve => "oxidized_react=info,tower_http=info",
        _ => "oxidized_react=warn",
    };
    let _guard = init_logger(default_filter, config.logging.log_dir.as_deref());

    let agent = build_agent(&config)?;

    match cli.command {
        Command::Chat { model, max_steps } => {
            let mut session = new_session(&config, model, max_steps)?;
            repl::run_repl(&agent, &mut session).await?;
        }
        Command::Ask { question, model, max_steps } => {
            let mut session = new_session(&config, model, max_steps)?;
            let outcome = session.ask(&agent, &question).await?;
            println!("{}", outcome.answer);
        }
        Command::Serve => serve(config, agent).await?,
    }

    Ok(())
}

fn new_session(config: &Config, model: Option<ModelChoice>, max_steps: Option<usize>) -> anyhow::Result<ChatSession> {
    let mut session = ChatSession::new(
        settings(config),
        RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_secs),
    );
    if let Some(model) = model {
        session.set_model(model);
    }
    if let Some(max_steps) = max_steps {
        session.set_max_steps(max_steps)?;
    }
    Ok(session)
}

fn settings(config: &Config) -> AgentSettings {
    AgentSettings {
        model: config.llm.model,
        max_iters: config.agent.max_steps,
    }
}

async fn serve(config: Config, agent: oxidized_react::agents::ReactAgent) -> anyhow::Result<()> {
    info!(provider = %config.llm.provider, model = %config.llm.model, "Configuration loaded");

    let state = AppState {
        sessions: Arc::new(SessionStore::new(
            settings(&config),
            config.rate_limit.clone(),
            &config.sessions,
        )),
        agent: Arc::new(agent),
        config: config.clone(),
    };

    let app = create_router(state);

    let ip: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((ip, config.server.port));
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
