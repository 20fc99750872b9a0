// ============================================================================
// pichart - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;    // CoinGecko + Horizon
pub mod app;    // État de l'application
pub mod chart;  // Moteur du graphique (bornes, axes, rendu)
pub mod config; // Settings
pub mod models; // Structures de données
pub mod ui;     // Interface utilisateur
