// ============================================================================
// Module : chart
// ============================================================================
// Moteur du graphique, indépendant du terminal :
// projection, graduations, recherche du point le plus proche, rendu sur une
// surface de dessin abstraite
// ============================================================================

pub mod axis;    // Ticks et labels calendaires
pub mod bounds;  // Bounds, Viewport
pub mod matcher; // nearest_index()
pub mod render;  // render(), ChartContext
pub mod surface; // DrawingSurface, DrawList

pub use axis::{format_price, price_ticks, time_label, time_ticks, Tick};
pub use bounds::{Bounds, Viewport};
pub use matcher::nearest_index;
pub use render::{direction_color, render, ChartContext, RenderSummary};
pub use surface::{DrawCommand, DrawList, DrawingSurface, Segment, TextAlign};
