//! xbridge - terminal wizard for depositing tokens over the RSK bridges.

mod action;
mod app;
mod config;
mod event;
mod log_buffer;
mod theme;
mod tui;
mod ui;

use action::{Action, ChainRequest};
use app::App;
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use event::{Event, EventHandler};
use log_buffer::{LogBuffer, LogBufferLayer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tui::Tui;
use xbridge_chain::{
    BridgeNetwork, RpcEndpoints, load_aggregator_limits, parse_tx_hash, wait_for_receipt,
};
use xbridge_core::{
    Asset, Chain, ConnectionStatus, Dictionaries, LimitsContext, NavigationState,
    deposit_target_asset, format_amount,
};

/// xbridge - deposit tokens from Ethereum or BSC to RSK.
#[derive(Parser, Debug)]
#[command(name = "xbridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Receiver address on RSK. Opens the deposit wizard directly.
    #[arg(short, long)]
    receiver: Option<String>,

    /// Asset to deposit, as the wallet names it (e.g. ETH, SOV, XUSD)
    #[arg(short, long)]
    asset: Option<Asset>,

    /// Custom RSK RPC endpoint URL
    #[arg(long = "rpc-rsk")]
    rpc_rsk: Option<String>,

    /// Custom Ethereum RPC endpoint URL
    #[arg(long = "rpc-eth")]
    rpc_eth: Option<String>,

    /// Custom BSC RPC endpoint URL
    #[arg(long = "rpc-bsc")]
    rpc_bsc: Option<String>,

    /// Bridge dictionary file replacing the bundled one
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Print the aggregator limits for a source chain and asset, then exit.
    /// Use with --chain and --asset.
    #[arg(long)]
    limits: bool,

    /// Source chain for --limits
    #[arg(long, requires = "limits")]
    chain: Option<Chain>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Headless mode never enters raw mode, so the plain hooks suffice
    if args.limits {
        color_eyre::install()?;
    } else {
        tui::install_hooks()?;
    }

    let log_buffer = LogBuffer::new();

    // Headless mode logs to stderr, the TUI to its log pane
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("xbridge=info".parse()?)
        .add_directive("xbridge_chain=info".parse()?)
        .add_directive("xbridge_core=info".parse()?);

    if args.limits {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(LogBufferLayer::new(log_buffer.clone()))
            .init();
    }

    let mut app_config = config::load_config().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        Default::default()
    });

    let dictionary_path = args.dictionary.clone().or_else(|| app_config.dictionary_path.clone());
    let dictionaries = match dictionary_path {
        Some(path) => Dictionaries::load(&path)
            .map_err(|e| eyre!("Failed to load dictionary {}: {}", path.display(), e))?,
        None => Dictionaries::bundled()?,
    };

    let endpoints = config::rpc_endpoints(
        &app_config,
        [
            (Chain::Rsk, args.rpc_rsk.clone()),
            (Chain::Eth, args.rpc_eth.clone()),
            (Chain::Bsc, args.rpc_bsc.clone()),
        ],
    );

    if args.limits {
        let (Some(chain), Some(asset)) = (args.chain, args.asset) else {
            return Err(eyre!("--limits needs --chain and --asset"));
        };
        return run_limits_mode(&dictionaries, &endpoints, chain, asset).await;
    }

    const ACTION_CHANNEL_CAPACITY: usize = 100;
    let (action_tx, mut action_rx) = mpsc::channel::<Action>(ACTION_CHANNEL_CAPACITY);

    const REQUEST_CHANNEL_CAPACITY: usize = 50;
    let (request_tx, request_rx) = mpsc::channel::<ChainRequest>(REQUEST_CHANNEL_CAPACITY);

    // Must happen before raw mode
    let theme = theme::Theme::resolve(app_config.theme);

    let shared_dictionaries = Arc::new(dictionaries.clone());
    let mut app = App::new(dictionaries, log_buffer, theme);

    if let Some(receiver) = app_config.last_receiver() {
        app.wallet.receiver = receiver.to_string();
    }
    if let Some(asset) = app_config.last_asset {
        app.wallet.select_asset(asset);
    }

    let mut tui = Tui::new()?;
    tui.enter()?;

    let mut events = EventHandler::new(Duration::from_millis(100));

    let poll = ReceiptPolling {
        attempts: app_config.receipt_attempts,
        interval: Duration::from_secs(app_config.receipt_poll_secs),
    };
    let chain_action_tx = action_tx.clone();
    tokio::spawn(async move {
        chain_task(shared_dictionaries, endpoints, poll, chain_action_tx, request_rx).await;
    });

    // Opened from the command line: skip the wallet page
    if args.receiver.is_some() || args.asset.is_some() {
        let navigation = NavigationState {
            receiver: args.receiver.clone(),
            asset: args.asset,
        };
        let _ = action_tx.send(Action::OpenDeposit(navigation)).await;
    }

    loop {
        tui.draw(|frame| ui::render(frame, &mut app))?;

        tokio::select! {
            event = events.next() => {
                match event? {
                    Event::Tick => app.tick(),
                    Event::Key(key_event) => {
                        if let Some(action) = app.handle_key(key_event) {
                            let _ = action_tx.send(action).await;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                let opening = match &action {
                    Action::OpenDeposit(navigation) => Some(navigation.clone()),
                    _ => None,
                };
                if let Some(request) = app.handle_action(action) {
                    let _ = request_tx.send(request).await;
                }
                // Only navigation the deposit page accepted is worth keeping
                if let Some(navigation) = opening
                    && config::remember_opened(&mut app_config, &navigation, app.route)
                    && let Err(e) = config::save_config(&app_config)
                {
                    tracing::warn!("Failed to save config: {}", e);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    tui.exit()?;

    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct ReceiptPolling {
    attempts: u32,
    interval: Duration,
}

/// Background task for chain operations.
async fn chain_task(
    dictionaries: Arc<Dictionaries>,
    endpoints: RpcEndpoints,
    poll: ReceiptPolling,
    action_tx: mpsc::Sender<Action>,
    mut request_rx: mpsc::Receiver<ChainRequest>,
) {
    const STATUS_CHANNEL_CAPACITY: usize = 10;
    let (status_tx, mut status_rx) =
        mpsc::channel::<(Chain, ConnectionStatus)>(STATUS_CHANNEL_CAPACITY);

    let action_tx_for_status = action_tx.clone();
    tokio::spawn(async move {
        while let Some((chain, status)) = status_rx.recv().await {
            let _ = action_tx_for_status
                .send(Action::UpdateConnectionStatus(chain, status))
                .await;
        }
    });

    let network = Arc::new(BridgeNetwork::connect(&dictionaries.networks, &endpoints, status_tx).await);
    let connected: Vec<String> = Chain::all()
        .iter()
        .filter(|c| network.is_connected(**c))
        .map(|c| c.to_string())
        .collect();
    tracing::info!("Connected to {}", connected.join(", "));

    while let Some(request) = request_rx.recv().await {
        let network = Arc::clone(&network);
        let dictionaries = Arc::clone(&dictionaries);
        let action_tx = action_tx.clone();

        // Requests run concurrently; a slow receipt must not hold up limits
        tokio::spawn(async move {
            match request {
                ChainRequest::FetchLimits(context) => {
                    let limits =
                        load_aggregator_limits(network.as_ref(), &dictionaries, context).await;
                    let _ = action_tx
                        .send(Action::SetAggregatorLimits { context, limits })
                        .await;
                }
                ChainRequest::WatchDeposit { chain, hash } => {
                    let outcome = match parse_tx_hash(&hash) {
                        Ok(tx_hash) => wait_for_receipt(
                            network.as_ref(),
                            chain,
                            tx_hash,
                            poll.attempts,
                            poll.interval,
                        )
                        .await
                        .map_err(|e| e.to_string()),
                        Err(e) => Err(e.to_string()),
                    };
                    let _ = action_tx.send(Action::DepositReceipt { hash, outcome }).await;
                }
            }
        });
    }
}

/// Print aggregator limits for every source asset of `asset` on `chain`.
async fn run_limits_mode(
    dictionaries: &Dictionaries,
    endpoints: &RpcEndpoints,
    chain: Chain,
    asset: Asset,
) -> Result<()> {
    let target_asset =
        deposit_target_asset(asset).ok_or_else(|| eyre!("{} cannot be deposited", asset))?;
    let target_chain = Chain::home();
    let sources = dictionaries
        .bridges
        .source_assets(chain, target_chain, target_asset);
    if sources.is_empty() {
        println!("No {} deposits from {}", target_asset, chain);
        return Ok(());
    }

    let (status_tx, _status_rx) = mpsc::channel::<(Chain, ConnectionStatus)>(8);
    let network = BridgeNetwork::connect(&dictionaries.networks, endpoints, status_tx).await;
    if !network.is_connected(target_chain) {
        return Err(eyre!("Could not connect to {}", target_chain));
    }

    let context = LimitsContext {
        chain,
        target_chain,
        target_asset,
    };
    let limits = load_aggregator_limits(&network, dictionaries, context).await;

    println!("{} -> {} {}", chain, target_chain, target_asset);
    for source in sources {
        let available = match limits.get(&source.symbol) {
            Some(units) => format_amount(*units, source.decimals, 8),
            None if source.has_aggregator_limit() => "unavailable".to_string(),
            None => "unlimited".to_string(),
        };
        println!("  {:<6} {}", source.symbol, available);
    }

    Ok(())
}
