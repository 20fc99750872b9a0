// ============================================================================
// Module : models
// ============================================================================
// Structures de données : historique de prix, événements du registre,
// modes d'affichage, ticker de marché et calculateur de nœud
// ============================================================================

pub mod ledger;    // LedgerEvent, EventSet, classify()
pub mod node;      // Calculateur de rentabilité d'un nœud
pub mod sample;    // PriceSample, SampleStore
pub mod ticker;    // MarketTicker
pub mod timeframe; // TimeframeMode, HistoryWindow

// Re-export des structures principales pour simplifier les imports
pub use ledger::{classify, Direction, DirectionCounts, EventSet, LedgerEvent};
pub use node::{DisplayCurrency, NodeEstimate, NodeInputs};
pub use sample::{PriceSample, SampleStore};
pub use ticker::MarketTicker;
pub use timeframe::{HistoryWindow, TimeframeMode};
