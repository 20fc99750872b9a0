// ============================================================================
// Structure : App
// ============================================================================
// État global de l'application TUI : mode d'affichage, fenêtre de prix,
// opérations du compte suivi, ticker de marché, saisie et statut.
//
// PATTERN : "Application State"
// - L'UI lit depuis App, les modifications passent par ses méthodes
// - Le worker thread ne touche pas directement aux données : il renvoie des
//   résultats que la boucle principale applique avec apply_*()
// - Chaque requête porte un numéro ; seule la plus récente est appliquée
// ============================================================================

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::api::{is_valid_address, normalize_address, LedgerLoad};
use crate::chart::{ChartContext, Viewport};
use crate::config::Settings;
use crate::models::node::estimate;
use crate::models::{EventSet, MarketTicker, NodeEstimate, PriceSample, SampleStore, TimeframeMode};

/// Statut affiché quand le flux de prix ne répond pas
pub const FEED_UNAVAILABLE: &str = "price feed unavailable";

/// Statut d'une adresse mal formée
pub const INVALID_ADDRESS: &str = "Invalid Pi address (G..., 56 chars)";

/// Statut d'un échec de chargement des opérations
pub const LEDGER_FAILED: &str = "Failed to load (check address or network)";

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Graphique + ticker + statut
    Chart,

    /// Saisie d'une adresse de portefeuille
    /// - Capture les touches pour construire un buffer
    /// - Enter valide, ESC annule
    InputMode,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    pub current_screen: Screen,

    pub settings: Settings,

    /// Mode d'affichage actif (un seul à la fois)
    pub mode: TimeframeMode,

    /// Fenêtre de prix du mode actif
    pub samples: SampleStore,

    /// Opérations du compte suivi
    pub events: EventSet,

    /// Dernier ticker reçu
    pub ticker: Option<MarketTicker>,

    /// Le dernier appel au flux de prix a échoué
    pub feed_unavailable: bool,

    /// Ligne de statut (résultats de chargement, erreurs)
    pub status_message: Option<String>,

    /// Two-step quit : première pression de 'q' -> confirm_quit = true
    pub confirm_quit: bool,

    pub is_loading: bool,
    pub loading_message: Option<String>,

    /// Buffer de saisie pour le mode Input
    pub input_buffer: String,

    /// Prompt affiché en mode Input
    pub input_prompt: String,

    /// Dernière demande de rafraîchissement du ticker
    last_ticker_refresh: Option<Instant>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            running: true,
            current_screen: Screen::Chart,
            settings,
            mode: TimeframeMode::default(),
            samples: SampleStore::new(),
            events: EventSet::new(),
            ticker: None,
            feed_unavailable: false,
            status_message: None,
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            input_buffer: String::new(),
            input_prompt: String::new(),
            last_ticker_refresh: None,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Quit confirmation
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Chargement
    // ========================================================================

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Mode d'affichage et historique
    // ========================================================================

    /// Active un mode : la fenêtre précédente est jetée, une nouvelle requête
    /// est émise. Retourne son numéro (à joindre à la commande du worker).
    pub fn select_mode(&mut self, mode: TimeframeMode) -> u64 {
        self.mode = mode;
        self.samples.clear();
        info!(mode = %mode.label(), "Timeframe selected");
        self.request_history()
    }

    pub fn next_mode(&mut self) -> u64 {
        self.select_mode(self.mode.next())
    }

    pub fn previous_mode(&mut self) -> u64 {
        self.select_mode(self.mode.previous())
    }

    /// Nouvelle requête d'historique pour le mode courant
    pub fn request_history(&mut self) -> u64 {
        let request = self.samples.begin_request();
        self.start_loading(Some(format!("Loading {} history...", self.mode.label())));
        request
    }

    /// Applique un historique reçu ; false si la réponse est périmée
    pub fn apply_history(&mut self, request: u64, samples: Vec<PriceSample>) -> bool {
        if !self.samples.accept(request, samples) {
            return false;
        }
        self.feed_unavailable = false;
        self.stop_loading();
        debug!(request, samples = self.samples.len(), "History applied");
        true
    }

    /// Échec du flux : pas de nouvel essai, graphique vide et statut
    pub fn apply_history_error(&mut self, request: u64, error: &str) {
        if request != self.samples.latest_request() {
            debug!(request, "Ignoring error of a superseded history request");
            return;
        }
        warn!(request, error = %error, "Price history unavailable");
        self.samples.clear();
        self.feed_unavailable = true;
        self.stop_loading();
    }

    // ========================================================================
    // Ticker (prix courant)
    // ========================================================================

    pub fn apply_ticker(&mut self, ticker: MarketTicker) {
        self.ticker = Some(ticker);
        self.feed_unavailable = false;
    }

    /// Le ticker précédent reste affiché mais le statut le signale
    pub fn apply_ticker_error(&mut self, error: &str) {
        warn!(error = %error, "Current price unavailable");
        self.feed_unavailable = true;
    }

    /// Texte de la ligne "dernière mise à jour" de l'en-tête
    pub fn feed_status(&self) -> String {
        if self.feed_unavailable {
            return FEED_UNAVAILABLE.to_string();
        }
        match &self.ticker {
            Some(ticker) => format!("updated {}", ticker.fetched_at.format("%H:%M:%S UTC")),
            None => "waiting for price...".to_string(),
        }
    }

    /// Tick de la boucle principale : true si le ticker doit être rafraîchi
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Variante testable de `tick()`
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let interval = Duration::from_secs(self.settings.refresh_secs.0.max(1));
        let due = match self.last_ticker_refresh {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= interval,
        };
        if due {
            self.last_ticker_refresh = Some(now);
        }
        due
    }

    // ========================================================================
    // Compte suivi et opérations
    // ========================================================================

    /// Valide une adresse saisie et émet une requête d'opérations
    ///
    /// Retourne (adresse normalisée, numéro de requête), ou None si
    /// l'adresse est mal formée (le statut l'indique).
    pub fn submit_account(&mut self, input: &str) -> Option<(String, u64)> {
        let account = normalize_address(input);
        if !is_valid_address(&account) {
            warn!(input = %input, "Rejected malformed address");
            self.status_message = Some(INVALID_ADDRESS.to_string());
            return None;
        }

        let request = self.events.begin_request();
        let cutoff = self.settings.ledger.cutoff.format("%b %Y");
        self.status_message = Some(format!("Loading wallet operations (from {})...", cutoff));
        info!(account = %account, request, "Loading wallet operations");
        Some((account, request))
    }

    /// Applique un chargement d'opérations ; false si périmé
    pub fn apply_operations(&mut self, request: u64, account: &str, load: LedgerLoad) -> bool {
        let events = load.events.len();
        if !self.events.accept(request, account, load.events) {
            return false;
        }

        let cutoff = self.settings.ledger.cutoff.format("%b %Y");
        let mut status = format!("Loaded {} relevant Pi operations (from {})", events, cutoff);
        if load.exhausted {
            status.push_str(&format!(", stopped after {} records", load.records_fetched));
        }
        self.status_message = Some(status);
        true
    }

    pub fn apply_operations_error(&mut self, request: u64, error: &str) {
        if request != self.events.latest_request() {
            debug!(request, "Ignoring error of a superseded ledger request");
            return;
        }
        warn!(request, error = %error, "Wallet operations unavailable");
        self.status_message = Some(LEDGER_FAILED.to_string());
    }

    pub fn reference_account(&self) -> Option<&str> {
        self.events.reference_account()
    }

    // ========================================================================
    // Rendu et calculateur
    // ========================================================================

    /// Contexte de rendu pour une surface de `viewport`
    pub fn chart_context(&self, viewport: Viewport) -> ChartContext<'_> {
        ChartContext {
            samples: &self.samples,
            events: &self.events,
            mode: self.mode,
            viewport,
            config: &self.settings.chart,
        }
    }

    /// Estimation du nœud au prix courant (None sans prix)
    pub fn node_estimate(&self) -> Option<NodeEstimate> {
        self.ticker
            .as_ref()
            .map(|ticker| estimate(&self.settings.node.inputs, ticker.price))
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    pub fn start_input(&mut self, prompt: String) {
        self.current_screen = Screen::InputMode;
        self.input_buffer.clear();
        self.input_prompt = prompt;
    }

    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Chart;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Récupère la valeur saisie et retourne au graphique
    pub fn submit_input(&mut self) -> String {
        let value = std::mem::take(&mut self.input_buffer);
        self.current_screen = Screen::Chart;
        self.input_prompt.clear();
        value
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }

    pub fn is_on_chart(&self) -> bool {
        self.current_screen == Screen::Chart
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, LedgerEvent};
    use chrono::{TimeZone, Utc};

    const ME: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    const OTHER: &str = "GBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

    fn samples(n: i64) -> Vec<PriceSample> {
        (0..n)
            .map(|i| PriceSample::from_millis(i * 86_400_000, 0.5 + i as f64 / 100.0).unwrap())
            .collect()
    }

    fn load_of(events: Vec<LedgerEvent>) -> LedgerLoad {
        LedgerLoad {
            records_fetched: events.len(),
            pages: 1,
            exhausted: false,
            events,
        }
    }

    #[test]
    fn test_app_creation() {
        let app = App::default();
        assert!(app.is_running());
        assert!(app.is_on_chart());
        assert_eq!(app.mode, TimeframeMode::Day);
        assert!(app.samples.is_empty());
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::default();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_select_mode_discards_window() {
        let mut app = App::default();
        let first = app.request_history();
        assert!(app.apply_history(first, samples(7)));
        assert_eq!(app.samples.len(), 7);

        let second = app.select_mode(TimeframeMode::Month);
        assert!(second > first);
        assert_eq!(app.mode, TimeframeMode::Month);
        assert!(app.samples.is_empty());
        assert!(app.is_loading_data());
    }

    #[test]
    fn test_stale_history_is_ignored() {
        let mut app = App::default();
        let week = app.select_mode(TimeframeMode::Week);
        let year = app.select_mode(TimeframeMode::Year);

        // La réponse "Year" arrive d'abord, puis la réponse "Week" en retard
        assert!(app.apply_history(year, samples(12)));
        assert!(!app.apply_history(week, samples(49)));
        assert_eq!(app.samples.len(), 12);
        assert_eq!(app.mode, TimeframeMode::Year);
    }

    #[test]
    fn test_history_error_degrades_to_empty() {
        let mut app = App::default();
        let request = app.request_history();
        app.apply_history_error(request, "timeout");

        assert!(app.samples.is_empty());
        assert!(app.feed_unavailable);
        assert_eq!(app.feed_status(), FEED_UNAVAILABLE);
        assert!(!app.is_loading_data());
    }

    #[test]
    fn test_superseded_error_is_ignored() {
        let mut app = App::default();
        let old = app.request_history();
        let new = app.request_history();
        app.apply_history_error(old, "timeout");

        assert!(!app.feed_unavailable);
        assert!(app.apply_history(new, samples(3)));
    }

    #[test]
    fn test_history_recovery_clears_feed_status() {
        let mut app = App::default();
        app.apply_ticker(MarketTicker::new(0.61, 1.2, 1_000.0));
        let failed = app.request_history();
        app.apply_history_error(failed, "timeout");
        assert_eq!(app.feed_status(), FEED_UNAVAILABLE);

        let request = app.select_mode(TimeframeMode::Week);
        assert!(app.apply_history(request, samples(2)));

        assert!(!app.feed_unavailable);
        assert_ne!(app.feed_status(), FEED_UNAVAILABLE);
    }

    #[test]
    fn test_ticker_updates_feed_status() {
        let mut app = App::default();
        assert_eq!(app.feed_status(), "waiting for price...");

        app.apply_ticker(MarketTicker::new(0.61, 1.2, 1_000.0));
        assert!(app.feed_status().starts_with("updated "));

        app.apply_ticker_error("HTTP 429");
        assert_eq!(app.feed_status(), FEED_UNAVAILABLE);
        assert!(app.ticker.is_some());
    }

    #[test]
    fn test_tick_schedules_refresh() {
        let mut app = App::default();
        let start = Instant::now();

        assert!(app.tick_at(start));
        assert!(!app.tick_at(start + Duration::from_secs(59)));
        assert!(app.tick_at(start + Duration::from_secs(60)));
        assert!(!app.tick_at(start + Duration::from_secs(61)));
    }

    #[test]
    fn test_submit_invalid_account() {
        let mut app = App::default();
        assert!(app.submit_account("not-an-address").is_none());
        assert_eq!(app.status_message.as_deref(), Some(INVALID_ADDRESS));
        assert_eq!(app.events.latest_request(), 0);
    }

    #[test]
    fn test_submit_and_apply_operations() {
        let mut app = App::default();
        let (account, request) = app.submit_account(&format!(" {} ", ME.to_lowercase())).unwrap();
        assert_eq!(account, ME);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Loading wallet operations (from Jan 2025)...")
        );

        let time = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let events = vec![
            LedgerEvent::new(time, OTHER.to_string(), ME.to_string(), ME),
            LedgerEvent::new(time, ME.to_string(), OTHER.to_string(), ME),
        ];
        assert!(app.apply_operations(request, &account, load_of(events)));

        assert_eq!(app.reference_account(), Some(ME));
        assert_eq!(app.events.events()[0].direction, Direction::In);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Loaded 2 relevant Pi operations (from Jan 2025)")
        );
    }

    #[test]
    fn test_exhausted_load_is_reported() {
        let mut app = App::default();
        let (account, request) = app.submit_account(ME).unwrap();
        let mut load = load_of(Vec::new());
        load.records_fetched = 2000;
        load.exhausted = true;

        assert!(app.apply_operations(request, &account, load));
        assert!(app.status_message.unwrap().ends_with("stopped after 2000 records"));
    }

    #[test]
    fn test_stale_operations_are_ignored() {
        let mut app = App::default();
        let (_, old) = app.submit_account(OTHER).unwrap();
        let (account, new) = app.submit_account(ME).unwrap();

        assert!(!app.apply_operations(old, OTHER, load_of(Vec::new())));
        app.apply_operations_error(old, "late failure");
        assert_ne!(app.status_message.as_deref(), Some(LEDGER_FAILED));

        app.apply_operations_error(new, "HTTP 500");
        assert_eq!(app.status_message.as_deref(), Some(LEDGER_FAILED));
        assert!(app.reference_account().is_none());
        assert_eq!(account, ME);
    }

    #[test]
    fn test_node_estimate_needs_price() {
        let mut app = App::default();
        assert!(app.node_estimate().is_none());

        app.settings.node.inputs.base_rate = 0.02;
        app.apply_ticker(MarketTicker::new(0.5, 0.0, 0.0));
        let estimate = app.node_estimate().unwrap();
        assert!(estimate.with_node > estimate.without_node);
    }

    #[test]
    fn test_input_mode() {
        let mut app = App::default();
        app.start_input("Wallet: ".to_string());
        assert!(app.is_in_input_mode());

        app.append_char('G');
        app.append_char('X');
        app.backspace();
        assert_eq!(app.submit_input(), "G");
        assert!(app.is_on_chart());
        assert!(app.input_buffer.is_empty());

        app.start_input("Wallet: ".to_string());
        app.append_char('A');
        app.cancel_input();
        assert!(app.is_on_chart());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_chart_context_follows_state() {
        let mut app = App::default();
        app.select_mode(TimeframeMode::All);
        let ctx = app.chart_context(Viewport::new(640.0, 320.0));

        assert_eq!(ctx.mode, TimeframeMode::All);
        assert_eq!(ctx.viewport.width, 640.0);
        assert_eq!(ctx.config.marker_radius, 5.0);
    }
}
