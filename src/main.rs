mod app;
mod ui;

use std::fs;
use std::io;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::Level;

use erc20_indexer::config::{self, Config};
use erc20_indexer::domain::address::checksum;
use erc20_indexer::domain::token::display_balance;
use erc20_indexer::infrastructure::ethereum::{create_provider, Network, ProviderConfig};
use erc20_indexer::infrastructure::runtime::{
    RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerSettings,
};
use erc20_indexer::pipeline::{Pipeline, QueryOrchestrator};
use erc20_indexer::{QueryKey, QueryState};

use crate::app::{App, StatusLevel};

#[derive(Debug, Parser)]
#[command(
    name = "erc20-indexer",
    version,
    about = "See all ERC-20 token balances of an address or ENS name"
)]
struct Args {
    /// Full JSON-RPC endpoint (overrides --network/--api-key)
    #[arg(long)]
    endpoint: Option<String>,

    /// Alchemy network slug (e.g. eth-mainnet, eth-sepolia)
    #[arg(long)]
    network: Option<String>,

    /// Alchemy API key
    #[arg(long, env = "ALCHEMY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Wallet JSON-RPC endpoint exposing accounts (e.g. http://127.0.0.1:8545)
    #[arg(long)]
    wallet_rpc: Option<String>,

    /// Run a single lookup, print the balances and exit
    #[arg(long)]
    query: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = Level::from_str(&args.log_level)
        .map_err(|_| anyhow::anyhow!("Invalid log level '{}'", args.log_level))?;

    if let Some(query) = args.query.clone() {
        init_stderr_logging(level);
        let config = config::load();
        return run_headless(&args, &config, query);
    }

    init_file_logging(level);
    let config = config::load();
    let settings = worker_settings(&args, &config)?;
    let endpoint_display = settings.provider.display();
    tracing::info!(endpoint = %endpoint_display, "starting");

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create the runtime bridge
    let runtime = RuntimeBridge::new(settings)?;

    let mut app = App::new();
    app.endpoint = endpoint_display;
    app.set_status("Connecting…", StatusLevel::Info);

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn provider_config(args: &Args, config: &Config) -> Result<ProviderConfig> {
    let network = match args.network.as_ref().or(config.provider.network.as_ref()) {
        Some(slug) => Network::from_str(slug)?,
        None => Network::default(),
    };
    Ok(ProviderConfig {
        endpoint: args.endpoint.clone().or_else(|| config.provider.endpoint.clone()),
        network,
        api_key: args.api_key.clone().or_else(|| config.provider.api_key.clone()),
    })
}

fn worker_settings(args: &Args, config: &Config) -> Result<WorkerSettings> {
    Ok(WorkerSettings {
        provider: provider_config(args, config)?,
        wallet_rpc: args.wallet_rpc.clone().or_else(|| config.wallet.rpc.clone()),
        debounce: config.query.debounce(),
        metadata_concurrency: config.query.metadata_concurrency,
    })
}

/// Logs go to a file: the terminal belongs to the UI
fn init_file_logging(level: Level) {
    let Some(path) = config::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(_) => return,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn init_stderr_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run_headless(args: &Args, config: &Config, query: String) -> Result<()> {
    let provider_config = provider_config(args, config)?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    rt.block_on(print_balances(
        provider_config,
        config.query.metadata_concurrency,
        QueryKey::from(query),
    ))
}

async fn print_balances(
    provider_config: ProviderConfig,
    metadata_concurrency: Option<usize>,
    key: QueryKey,
) -> Result<()> {
    let provider = create_provider(&provider_config).await?;
    let mut orchestrator =
        QueryOrchestrator::with_pipeline(Pipeline::new(provider, metadata_concurrency));

    match orchestrator.run(key).await {
        QueryState::Success(result) => {
            println!("Owner: {}", checksum(&result.owner()));
            println!("{:<12} {:>28}  {}", "SYMBOL", "BALANCE", "CONTRACT");
            for (balance, meta) in result.rows() {
                println!(
                    "{:<12} {:>28}  {}",
                    meta.display_symbol(),
                    display_balance(balance.balance, meta.decimals),
                    checksum(&balance.contract)
                );
            }
            Ok(())
        }
        QueryState::Failure(kind, message) => {
            anyhow::bail!("{} ({})", message, kind.label())
        }
        QueryState::Idle | QueryState::Loading => anyhow::bail!("Query did not complete"),
    }
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(120);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &mut app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    // Process runtime events
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::Ready {
                endpoint,
                wallet_available,
            } => app.apply_ready(endpoint, wallet_available),
            RuntimeEvent::InputSettled { value } => app.apply_settled(value),
            RuntimeEvent::WalletConnected { address, prefill } => {
                app.apply_wallet(address, prefill)
            }
            RuntimeEvent::QueryUpdated {
                generation,
                state,
                cached_queries,
            } => app.apply_query(generation, state, cached_queries),
            RuntimeEvent::Error { message } => app.apply_error(message),
        }
    }

    // Process pending commands
    if let Some(value) = app.take_input_change() {
        send_or_report(app, runtime, RuntimeCommand::InputChanged { value });
    }
    if app.take_submit_request() {
        send_or_report(app, runtime, RuntimeCommand::Submit);
    }
    if app.take_connect_request() {
        send_or_report(app, runtime, RuntimeCommand::ConnectWallet);
    }
}

fn send_or_report(app: &mut App, runtime: &RuntimeBridge, cmd: RuntimeCommand) {
    if let Err(err) = runtime.send(cmd) {
        app.set_status(format!("{err}"), StatusLevel::Error);
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => app.should_quit = true,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => app.should_quit = true,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => app.clear_input(),
        (KeyCode::Char('?'), _) if app.input.is_empty() => app.help_open = true,
        (KeyCode::F(2), _) => app.connect_wallet(),
        (KeyCode::Enter, _) => app.submit(),
        (KeyCode::Backspace, _) => app.pop_char(),
        (KeyCode::Up, _) => app.scroll_up(),
        (KeyCode::Down, _) => app.scroll_down(),
        (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => app.push_char(c),
        _ => {}
    }
}
