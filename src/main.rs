// ============================================================================
// pichart - Prix du Pi + opérations d'un portefeuille sur le graphique
// ============================================================================
// Programme TUI : graphique du prix (CoinGecko) sur 5 fenêtres de temps,
// avec en surimpression les opérations d'une adresse du registre Pi.
//
// ARCHITECTURE :
// - Thread principal : boucle render -> input -> update, état dans
//   Arc<Mutex<App>>
// - Worker thread : runtime tokio, exécute les AppCommand l'une après
//   l'autre et renvoie des AppResult
// - Chaque commande porte le numéro de requête émis par App ; une réponse
//   périmée est ignorée à l'application
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use pichart::api::{collect_operations, CoinGeckoClient, HorizonClient, LedgerLoad, LedgerProvider, PriceFeed};
use pichart::app::App;
use pichart::config::{LedgerConfig, Settings};
use pichart::models::{MarketTicker, PriceSample, TimeframeMode};
use pichart::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand / AppResult : échanges avec le worker thread
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Historique du mode donné
    LoadHistory { mode: TimeframeMode, request: u64 },

    /// Prix courant, variation et volume 24 h
    RefreshTicker,

    /// Toutes les opérations récentes d'un compte (pagination bornée)
    LoadOperations { account: String, request: u64 },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    HistoryLoaded {
        request: u64,
        samples: Vec<PriceSample>,
    },
    HistoryFailed {
        request: u64,
        error: String,
    },
    TickerLoaded(MarketTicker),
    TickerFailed {
        error: String,
    },
    OperationsLoaded {
        request: u64,
        account: String,
        load: LedgerLoad,
    },
    OperationsFailed {
        request: u64,
        error: String,
    },
}

// ============================================================================
// Initialisation du logging
// ============================================================================

/// Initialise le logging vers un fichier à rotation quotidienne
///
/// Les logs sont écrits dans :
/// - Linux : ~/.local/share/pichart/logs/pichart.log
/// - macOS : ~/Library/Application Support/pichart/logs/pichart.log
/// - Windows : C:\Users\<user>\AppData\Local\pichart\logs\pichart.log
///
/// ```bash
/// tail -f ~/.local/share/pichart/logs/pichart.log
/// RUST_LOG=pichart=trace cargo run
/// ```
fn init_logging() -> Result<PathBuf> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("pichart").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "pichart.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pichart=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(log_dir)
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("Warning: failed to initialize logging: {}", e);
        eprintln!("Continuing without logging...");
    }

    info!("pichart starting up");
    let settings = Settings::load_default();

    let feed: Box<dyn PriceFeed> = Box::new(CoinGeckoClient::new(settings.feed.clone())?);
    let horizon = HorizonClient::new(settings.ledger.clone())?;
    let ledger_config = horizon.config().clone();
    let ledger: Box<dyn LedgerProvider> = Box::new(horizon);

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, feed, ledger, ledger_config);

    // Premier chargement : historique du mode par défaut + compte configuré
    let mut app = App::new(settings);
    let request = app.request_history();
    let _ = command_tx.send(AppCommand::LoadHistory {
        mode: app.mode,
        request,
    });
    if let Some(account) = app.settings.account.clone() {
        submit_account(&mut app, &account, &command_tx);
    }
    let app = Arc::new(Mutex::new(app));

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }
    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================

/// Worker thread : un runtime tokio, les commandes traitées dans l'ordre
///
/// Les erreurs deviennent des AppResult::*Failed portant un message court ;
/// rien n'est relancé automatiquement.
fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    feed: Box<dyn PriceFeed>,
    ledger: Box<dyn LedgerProvider>,
    ledger_config: LedgerConfig,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, worker disabled");
                return;
            }
        };

        while let Ok(command) = command_rx.recv() {
            debug!(?command, "Worker received command");

            let result = match command {
                AppCommand::LoadHistory { mode, request } => {
                    match runtime.block_on(feed.fetch_history(mode.history_window())) {
                        Ok(samples) => AppResult::HistoryLoaded { request, samples },
                        Err(e) => {
                            error!(mode = %mode.label(), error = ?e, "Failed to load price history");
                            AppResult::HistoryFailed {
                                request,
                                error: format!("{:#}", e),
                            }
                        }
                    }
                }

                AppCommand::RefreshTicker => match runtime.block_on(feed.fetch_current()) {
                    Ok(ticker) => AppResult::TickerLoaded(ticker),
                    Err(e) => {
                        error!(error = ?e, "Failed to load current price");
                        AppResult::TickerFailed {
                            error: format!("{:#}", e),
                        }
                    }
                },

                AppCommand::LoadOperations { account, request } => {
                    match runtime.block_on(collect_operations(ledger.as_ref(), &account, &ledger_config)) {
                        Ok(load) => AppResult::OperationsLoaded {
                            request,
                            account,
                            load,
                        },
                        Err(e) => {
                            error!(account = %account, error = ?e, "Failed to load wallet operations");
                            AppResult::OperationsFailed {
                                request,
                                error: format!("{:#}", e),
                            }
                        }
                    }
                }
            };

            if result_tx.send(result).is_err() {
                break;
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================

fn lock(app: &Arc<Mutex<App>>) -> Result<MutexGuard<'_, App>> {
    app.lock().map_err(|_| anyhow!("État de l'application empoisonné"))
}

/// Boucle render -> input -> update jusqu'à ce que l'app s'arrête
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        if !lock(&app)?.is_running() {
            break;
        }

        // 0. RÉSULTATS du worker (tous ceux en attente)
        loop {
            match result_rx.try_recv() {
                Ok(result) => apply_result(&mut *lock(&app)?, result),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    warn!("Worker thread disconnected");
                    break;
                }
            }
        }

        // 1. RENDER
        {
            let app_lock = lock(&app)?;
            terminal.draw(|frame| render(frame, &app_lock))?;
        }

        // 2. INPUT
        match events.next() {
            Ok(event) => handle_event(&mut *lock(&app)?, event, &command_tx),
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }

        // 3. UPDATE : rafraîchissement périodique du prix courant
        if lock(&app)?.tick() {
            let _ = command_tx.send(AppCommand::RefreshTicker);
        }
    }

    Ok(())
}

/// Applique un résultat du worker à l'état
fn apply_result(app: &mut App, result: AppResult) {
    match result {
        AppResult::HistoryLoaded { request, samples } => {
            let count = samples.len();
            if app.apply_history(request, samples) {
                info!(request, samples = count, mode = %app.mode.label(), "Price history applied");
            }
        }
        AppResult::HistoryFailed { request, error } => app.apply_history_error(request, &error),
        AppResult::TickerLoaded(ticker) => app.apply_ticker(ticker),
        AppResult::TickerFailed { error } => app.apply_ticker_error(&error),
        AppResult::OperationsLoaded {
            request,
            account,
            load,
        } => {
            app.apply_operations(request, &account, load);
        }
        AppResult::OperationsFailed { request, error } => app.apply_operations_error(request, &error),
    }
}

fn submit_account(app: &mut App, input: &str, command_tx: &mpsc::Sender<AppCommand>) {
    if let Some((account, request)) = app.submit_account(input) {
        let _ = command_tx.send(AppCommand::LoadOperations { account, request });
    }
}

fn load_history(app: &App, request: u64, command_tx: &mpsc::Sender<AppCommand>) {
    let _ = command_tx.send(AppCommand::LoadHistory {
        mode: app.mode,
        request,
    });
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: pichart::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use pichart::ui::events::{
        get_char_from_event, is_account_event, is_address_char_event, is_backspace_event,
        is_enter_event, is_escape_event, is_next_mode_event, is_previous_mode_event,
        is_quit_event, is_refresh_event, timeframe_from_event, Event,
    };

    if let Event::Tick = event {
        return;
    }

    // ========================================
    // Input Mode : saisie d'une adresse
    // ========================================
    if app.is_in_input_mode() {
        if is_escape_event(&event) {
            info!("User cancelled address input");
            app.cancel_input();
        } else if is_enter_event(&event) {
            let input = app.submit_input();
            submit_account(app, &input, command_tx);
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if is_address_char_event(&event) && app.input_buffer.len() < pichart::api::ledger::ADDRESS_LEN {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c.to_ascii_uppercase());
            }
        }
        return;
    }

    // ========================================
    // Écran graphique
    // ========================================
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return;
    }

    app.cancel_quit();

    if let Some(mode) = timeframe_from_event(&event) {
        let request = app.select_mode(mode);
        load_history(app, request, command_tx);
    } else if is_next_mode_event(&event) {
        let request = app.next_mode();
        load_history(app, request, command_tx);
    } else if is_previous_mode_event(&event) {
        let request = app.previous_mode();
        load_history(app, request, command_tx);
    } else if is_account_event(&event) {
        info!("User requested wallet input");
        app.start_input("Wallet address: ".to_string());
    } else if is_refresh_event(&event) {
        info!("User requested refresh");
        let request = app.request_history();
        load_history(app, request, command_tx);
        let _ = command_tx.send(AppCommand::RefreshTicker);
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Raw mode + écran alternatif
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal (appelé même en cas d'erreur)
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
