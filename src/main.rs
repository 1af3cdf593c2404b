use chat_widget::{
    AgentDescriptor, AgentListing, AgentRegistry, ChatBackend, ChatReply, ChatRequest,
    ExchangeError, ExchangeState, HealthStatus, HttpBackend, Language, PendingExchange,
    TerminalView, WidgetConfig, WidgetController,
};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use warp::http::StatusCode;
use warp::Filter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Widget config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the widget in this terminal against a chat backend
    Chat {
        /// Backend base URL
        #[arg(long, env = "CHAT_WIDGET_API_URL")]
        api_url: Option<String>,

        /// Interface language (ru, kz)
        #[arg(short, long)]
        language: Option<Language>,

        /// Load agents from the backend's /api/agents instead of the config
        #[arg(long)]
        remote_agents: bool,

        /// Where /export writes history files (defaults to the Downloads folder)
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Serve a stub chat backend for local demos
    ServeMock {
        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => WidgetConfig::load(path)?,
        None => WidgetConfig::default(),
    };

    match args.command {
        Command::Chat {
            api_url,
            language,
            remote_agents,
            export_dir,
        } => run_chat(config, api_url, language, remote_agents, export_dir).await,
        Command::ServeMock { port } => {
            serve_mock(config, port).await;
            Ok(())
        }
    }
}

// ===== TERMINAL HOST =====

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
enum HostCommand {
    Send(String),
    QuickReply(usize),
    Open,
    Close,
    Toggle,
    Agent(String),
    Agents,
    Language(Language),
    Clear,
    Export,
    Health,
    Help,
    Quit,
    Unknown(String),
}

impl HostCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return HostCommand::Send(line.to_string());
        };

        let mut parts = command.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        match (name, arg) {
            ("open", _) => HostCommand::Open,
            ("close", _) => HostCommand::Close,
            ("toggle", _) => HostCommand::Toggle,
            ("agents", _) => HostCommand::Agents,
            ("agent", id) if !id.is_empty() => HostCommand::Agent(id.to_string()),
            ("lang", lang) => match lang.parse() {
                Ok(language) => HostCommand::Language(language),
                Err(_) => HostCommand::Unknown(line.to_string()),
            },
            ("quick", n) => match n.parse::<usize>() {
                Ok(n) if n > 0 => HostCommand::QuickReply(n),
                _ => HostCommand::Unknown(line.to_string()),
            },
            ("clear", _) => HostCommand::Clear,
            ("export", _) => HostCommand::Export,
            ("health", _) => HostCommand::Health,
            ("help", _) => HostCommand::Help,
            ("quit", _) | ("exit", _) => HostCommand::Quit,
            _ => HostCommand::Unknown(line.to_string()),
        }
    }
}

fn print_help() {
    println!("Type a message and press Enter to send it. Commands:");
    println!("  /open /close /toggle   show or hide the chat panel");
    println!("  /agents                list agents, /agent <id> to switch");
    println!("  /lang ru|kz            switch interface language");
    println!("  /quick <n>             send quick reply number n");
    println!("  /clear                 start the conversation over");
    println!("  /export                save the history as JSON");
    println!("  /health                check that the backend is up");
    println!("  /quit                  leave");
}

type InFlight = JoinHandle<Result<ChatReply, ExchangeError>>;

/// Render the user message and hand the request to a background task
fn start_exchange<W: std::io::Write>(
    widget: &mut WidgetController<TerminalView<W>>,
    text: &str,
) -> Option<(PendingExchange, InFlight)> {
    if text.trim().is_empty() {
        return None;
    }
    if widget.exchange_state() == ExchangeState::Awaiting {
        println!("(still waiting for the previous reply)");
        return None;
    }
    widget.open();
    let exchange = widget.begin_send(text)?;

    let backend = widget.backend();
    let request = exchange.request().clone();
    let handle = tokio::spawn(async move { backend.send(&request).await });
    Some((exchange, handle))
}

/// Switch to `id` if the registry has it; returns whether the agent is known
fn select_agent<W: std::io::Write>(
    widget: &mut WidgetController<TerminalView<W>>,
    id: &str,
) -> bool {
    if !widget.config().agents.contains(id) {
        println!("Unknown agent '{}', see /agents", id);
        false
    } else {
        widget.switch_agent(id);
        true
    }
}

async fn report_health(backend: &dyn ChatBackend) {
    match backend.health().await {
        Ok(health) if health.is_healthy() => println!("Backend is healthy"),
        Ok(health) => println!("Backend reports status '{}'", health.status),
        Err(e) => println!("Health check failed: {}", e),
    }
}

async fn run_chat(
    mut config: WidgetConfig,
    api_url: Option<String>,
    language: Option<Language>,
    remote_agents: bool,
    export_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(url) = api_url {
        config = config.with_api_base_url(url);
    }
    if let Some(language) = language {
        config.language = language;
    }

    let backend = Arc::new(HttpBackend::new(&config));
    if remote_agents {
        match backend.list_agents().await {
            Ok(descriptors) if !descriptors.is_empty() => {
                log::info!("Loaded {} agents from backend", descriptors.len());
                config = config.with_agents(AgentRegistry::from_descriptors(&descriptors));
            }
            Ok(_) => log::warn!("Backend listed no agents; keeping configured registry"),
            Err(e) => log::warn!("Failed to fetch agents: {}", e),
        }
    }

    let export_dir = export_dir
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut widget = WidgetController::new(config, backend, TerminalView::stdout())?;
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<PendingExchange> = None;
    let mut in_flight: Option<InFlight> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match HostCommand::parse(&line) {
                    HostCommand::Send(text) => {
                        if let Some((exchange, handle)) = start_exchange(&mut widget, &text) {
                            pending = Some(exchange);
                            in_flight = Some(handle);
                        }
                    }
                    HostCommand::QuickReply(n) => {
                        let reply = widget.view().quick_replies().get(n - 1).cloned();
                        match reply {
                            Some(text) => {
                                if let Some((exchange, handle)) = start_exchange(&mut widget, &text) {
                                    pending = Some(exchange);
                                    in_flight = Some(handle);
                                }
                            }
                            None => println!("No quick reply number {}", n),
                        }
                    }
                    HostCommand::Open => widget.open(),
                    HostCommand::Close => widget.close(),
                    HostCommand::Toggle => widget.toggle(),
                    HostCommand::Agent(id) => {
                        select_agent(&mut widget, &id);
                    }
                    HostCommand::Agents => {
                        let current = widget.agent().id.clone();
                        for agent in widget.config().agents.iter() {
                            let marker = if agent.id == current { "*" } else { " " };
                            println!("{} {:<12} {}", marker, agent.id, agent.label);
                        }
                    }
                    HostCommand::Language(language) => widget.switch_language(language),
                    HostCommand::Clear => widget.clear(),
                    HostCommand::Export => {
                        let export = widget.export_history();
                        match export.write_to_dir(&export_dir).await {
                            Ok(path) => println!("History saved to {}", path.display()),
                            Err(e) => eprintln!("Export failed: {}", e),
                        }
                    }
                    HostCommand::Health => report_health(widget.backend().as_ref()).await,
                    HostCommand::Help => print_help(),
                    HostCommand::Quit => break,
                    HostCommand::Unknown(input) => println!("Unknown command: {} (try /help)", input),
                }
            }
            joined = async {
                match in_flight.as_mut() {
                    Some(handle) => handle.await,
                    None => std::future::pending().await,
                }
            } => {
                in_flight = None;
                let outcome = joined.unwrap_or_else(|e| Err(ExchangeError::Transport(e.to_string())));
                if let Some(exchange) = pending.take() {
                    widget.complete_send(exchange, outcome);
                }
            }
        }
    }

    Ok(())
}

// ===== MOCK BACKEND =====

async fn serve_mock(config: WidgetConfig, port: u16) {
    let listing = Arc::new(agent_listing(&config.agents));

    // Health check endpoint
    let health = warp::path!("api" / "health").map(|| {
        warp::reply::json(&HealthStatus {
            status: "healthy".to_string(),
            timestamp: Some(chrono::Utc::now().timestamp_millis() as f64 / 1000.0),
        })
    });

    let chat = warp::path!("api" / "chat")
        .and(warp::post())
        .and(warp::body::json())
        .map(handle_mock_chat);

    let agents = warp::path!("api" / "agents")
        .and(warp::get())
        .map(move || warp::reply::json(&*listing));

    let routes = health.or(chat).or(agents);

    // Bind manually to handle "port in use" error gracefully
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            log::info!("Mock chat backend listening on http://{}", addr);
            warp::serve(routes)
                .run_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
                .await;
        }
        Err(e) => {
            log::error!("Failed to bind to port {}: {}", port, e);
            eprintln!("Error: Port {} is already in use or unavailable.", port);
            std::process::exit(1);
        }
    }
}

fn agent_listing(registry: &AgentRegistry) -> AgentListing {
    let agents: Vec<AgentDescriptor> = registry
        .iter()
        .map(|agent| AgentDescriptor {
            agent_type: agent.id.clone(),
            name: agent.label.clone(),
            description: agent.welcome.get(Language::Ru).to_string(),
        })
        .collect();
    AgentListing {
        total_agents: Some(agents.len()),
        agents,
    }
}

fn handle_mock_chat(request: ChatRequest) -> warp::reply::WithStatus<warp::reply::Json> {
    log::info!(
        "Mock chat request (session={}, agent={:?}): {}",
        request.session_id,
        request.agent_type,
        request.message
    );

    let message = request.message.trim();
    if message.is_empty() {
        let reply = ChatReply {
            error: Some("Пустое сообщение".to_string()),
            ..Default::default()
        };
        return warp::reply::with_status(warp::reply::json(&reply), StatusCode::BAD_REQUEST);
    }

    let response = match request.language {
        Language::Ru => format!("Вы спросили: «{}». Это демонстрационный ответ.", message),
        Language::Kz => format!("Сіз сұрадыңыз: «{}». Бұл демонстрациялық жауап.", message),
    };
    let reply = ChatReply {
        response: Some(response),
        response_time: Some(0.0),
        agent_type: request.agent_type.clone(),
        ..Default::default()
    };
    warp::reply::with_status(warp::reply::json(&reply), StatusCode::OK)
}
