// ============================================================================
// Module : api
// ============================================================================
// Fournisseurs de données externes :
// - Flux de prix (CoinGecko) : prix courant + historique
// - Registre (API Horizon du mainnet Pi) : opérations d'un compte, paginées
//
// Les traits permettent de remplacer les clients HTTP par des fakes dans les
// tests (pagination infinie, flux en panne, etc.).
// ============================================================================

pub mod coingecko; // Client CoinGecko
pub mod ledger;    // Client Horizon + pagination bornée

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{HistoryWindow, MarketTicker, PriceSample};

pub use coingecko::CoinGeckoClient;
pub use ledger::{collect_operations, is_valid_address, normalize_address, HorizonClient, LedgerLoad, OperationRecord, OperationsPage};

/// Source du prix courant et de l'historique
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Prix courant, variation 24 h, volume 24 h
    async fn fetch_current(&self) -> Result<MarketTicker>;

    /// Historique journalier sur la fenêtre demandée
    async fn fetch_history(&self, window: HistoryWindow) -> Result<Vec<PriceSample>>;
}

/// Source paginée des opérations d'un compte
#[async_trait]
pub trait LedgerProvider: Send + Sync {
    /// Une page d'opérations ; `cursor` est le lien "next" de la page précédente
    async fn fetch_operations_page(&self, account: &str, cursor: Option<&str>) -> Result<OperationsPage>;
}
