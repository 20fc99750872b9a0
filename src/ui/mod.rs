// ============================================================================
// Module : ui
// ============================================================================
// Interface terminal : événements clavier, disposition des panneaux et
// rejeu du graphique sur un Canvas ratatui
// ============================================================================

pub mod chart;     // DrawList -> Canvas
pub mod dashboard; // Disposition et panneaux
pub mod events;    // Gestion des événements clavier

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
