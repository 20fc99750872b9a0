// ============================================================================
// Rendu du graphique : bornes -> axes -> courbe -> points d'opérations
// ============================================================================
// Aucun état entre deux rendus : tout ce qu'il faut arrive dans ChartContext
// (fenêtre de prix, événements classés, mode, dimensions, géométrie).
//
// Étapes :
// 1. Effacer la surface ; série vide -> on s'arrête là
// 2. Bounds::compute()
// 3. Axes : grille + labels de prix, ticks + labels de dates
// 4. Courbe des prix (chemin unique, points consécutifs reliés)
// 5. Un point par événement dans [time_min, time_max], posé sur l'échantillon
//    le plus proche, coloré selon la direction. Les autres sont ignorés.
// ============================================================================

use ratatui::style::Color;
use tracing::{debug, instrument};

use crate::chart::axis::{price_ticks, time_ticks};
use crate::chart::bounds::{Bounds, Viewport};
use crate::chart::matcher::nearest_index;
use crate::chart::surface::{DrawingSurface, TextAlign};
use crate::config::ChartConfig;
use crate::models::{Direction, EventSet, SampleStore, TimeframeMode};

/// Couleur de la courbe des prix (#2dd4bf)
pub const LINE_COLOR: Color = Color::Rgb(45, 212, 191);
/// Couleur des labels d'axes (#7fbf86)
pub const LABEL_COLOR: Color = Color::Rgb(127, 191, 134);
/// Couleur de la grille et des ticks
pub const GRID_COLOR: Color = Color::Rgb(40, 72, 48);
/// Couleur du cadre (axes)
pub const AXIS_COLOR: Color = Color::Rgb(74, 122, 82);

pub const IN_COLOR: Color = Color::Rgb(88, 184, 106);
pub const OUT_COLOR: Color = Color::Rgb(225, 87, 89);
pub const SELF_COLOR: Color = Color::Rgb(250, 204, 21);

/// Longueur des ticks de l'axe du temps
const TICK_LENGTH: f64 = 4.0;
/// Distance entre l'axe du temps et ses labels
const TIME_LABEL_OFFSET: f64 = 6.0;
/// Distance entre l'axe des prix et ses labels
const PRICE_LABEL_OFFSET: f64 = 6.0;

/// Couleur d'un point selon la direction
pub fn direction_color(direction: Direction) -> Color {
    match direction {
        Direction::In => IN_COLOR,
        Direction::Out => OUT_COLOR,
        Direction::SelfTransfer => SELF_COLOR,
    }
}

/// Tout ce dont un rendu a besoin, fourni par l'hôte à chaque appel
#[derive(Debug, Clone, Copy)]
pub struct ChartContext<'a> {
    pub samples: &'a SampleStore,
    pub events: &'a EventSet,
    pub mode: TimeframeMode,
    pub viewport: Viewport,
    pub config: &'a ChartConfig,
}

/// Bilan d'un rendu (affiché dans la ligne de statut)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Aucun échantillon : seule la surface a été effacée
    pub empty: bool,
    /// Domaine remplacé par le carré unité
    pub fallback: bool,
    /// Points d'opérations dessinés
    pub markers: usize,
    /// Événements hors de la fenêtre de prix
    pub dropped_events: usize,
}

/// Dessine le graphique complet sur `surface`
#[instrument(skip_all, fields(mode = ?ctx.mode, samples = ctx.samples.len(), events = ctx.events.len()))]
pub fn render<S: DrawingSurface + ?Sized>(ctx: &ChartContext<'_>, surface: &mut S) -> RenderSummary {
    surface.clear();

    if ctx.samples.is_empty() {
        debug!("No samples, chart left empty");
        return RenderSummary {
            empty: true,
            dropped_events: ctx.events.len(),
            ..RenderSummary::default()
        };
    }

    let bounds = Bounds::compute(ctx.samples.samples(), ctx.viewport, ctx.config.margins);

    draw_axes(&bounds, ctx, surface);
    draw_price_line(&bounds, ctx.samples, surface);
    let (markers, dropped_events) = draw_markers(&bounds, ctx, surface);

    debug!(markers, dropped_events, fallback = bounds.fallback, "Chart rendered");
    RenderSummary {
        empty: false,
        fallback: bounds.fallback,
        markers,
        dropped_events,
    }
}

/// Cadre, grille horizontale, labels de prix, ticks et labels de dates
fn draw_axes<S: DrawingSurface + ?Sized>(bounds: &Bounds, ctx: &ChartContext<'_>, surface: &mut S) {
    let left = bounds.plot_left();
    let right = bounds.plot_right();
    let top = bounds.plot_top();
    let bottom = bounds.plot_bottom();

    for tick in price_ticks(bounds, ctx.config.price_intervals) {
        surface.move_to(left, tick.position);
        surface.line_to(right, tick.position);
        surface.stroke(GRID_COLOR, 1.0);
        surface.fill_text(
            &tick.label,
            left - PRICE_LABEL_OFFSET,
            tick.position,
            TextAlign::Right,
            LABEL_COLOR,
        );
    }

    for tick in time_ticks(bounds, ctx.mode, ctx.config.time_intervals) {
        surface.move_to(tick.position, bottom);
        surface.line_to(tick.position, bottom + TICK_LENGTH);
        surface.stroke(GRID_COLOR, 1.0);
        surface.fill_text(
            &tick.label,
            tick.position,
            bottom + TIME_LABEL_OFFSET,
            TextAlign::Center,
            LABEL_COLOR,
        );
    }

    // Axes : vertical à gauche, horizontal en bas
    surface.move_to(left, top);
    surface.line_to(left, bottom);
    surface.line_to(right, bottom);
    surface.stroke(AXIS_COLOR, 1.0);
}

fn draw_price_line<S: DrawingSurface + ?Sized>(bounds: &Bounds, store: &SampleStore, surface: &mut S) {
    let mut points = store.samples().iter().map(|s| bounds.project(s));

    if let Some((x, y)) = points.next() {
        surface.move_to(x, y);
        for (x, y) in points {
            surface.line_to(x, y);
        }
        surface.stroke(LINE_COLOR, 2.0);
    }
}

/// Retourne (points dessinés, événements ignorés)
fn draw_markers<S: DrawingSurface + ?Sized>(
    bounds: &Bounds,
    ctx: &ChartContext<'_>,
    surface: &mut S,
) -> (usize, usize) {
    let Some((time_min, time_max)) = ctx.samples.window_millis() else {
        return (0, ctx.events.len());
    };
    let times = ctx.samples.times();
    let samples = ctx.samples.samples();

    let mut markers = 0;
    let mut dropped = 0;
    for event in ctx.events.events() {
        let t = event.time_ms();
        if t < time_min || t > time_max {
            dropped += 1;
            continue;
        }

        let Some(index) = nearest_index(times, t) else {
            dropped += 1;
            continue;
        };

        let (x, y) = bounds.project(&samples[index]);
        surface.fill_circle(x, y, ctx.config.marker_radius, direction_color(event.direction));
        markers += 1;
    }

    (markers, dropped)
}

// ============================================================================
// Tests unitaires
// ============================================================================
