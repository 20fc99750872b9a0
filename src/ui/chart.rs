// ============================================================================
// Chart - Rejoue le graphique sur un Canvas ratatui
// ============================================================================
// Le moteur (crate::chart) dessine dans une DrawList en unités "pixel" ;
// ici on convertit :
// - une cellule de terminal = CELL_WIDTH x CELL_HEIGHT unités
// - y vers le bas (moteur) -> y vers le haut (Canvas) : y' = hauteur - y
// - disques pleins approchés par des cercles concentriques + point central
// - texte ancré à gauche / centré / à droite selon sa largeur en cellules
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::app::App;
use crate::chart::{render, DrawCommand, DrawList, RenderSummary, TextAlign, Viewport};

/// Largeur d'une cellule de terminal en unités de surface
pub const CELL_WIDTH: f64 = 8.0;

/// Hauteur d'une cellule de terminal en unités de surface
pub const CELL_HEIGHT: f64 = 16.0;

const BORDER_COLOR: Color = Color::Rgb(74, 122, 82);

/// Dimensions de la surface pour une zone du terminal
pub fn viewport_for(area: Rect) -> Viewport {
    Viewport::new(area.width as f64 * CELL_WIDTH, area.height as f64 * CELL_HEIGHT)
}

/// Bord gauche d'un texte ancré en `x`, gardé dans [0, largeur]
pub fn text_left(x: f64, text: &str, align: TextAlign, surface_width: f64) -> f64 {
    let text_width = text.chars().count() as f64 * CELL_WIDTH;
    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - text_width / 2.0,
        TextAlign::Right => x - text_width,
    };
    left.min(surface_width - text_width).max(0.0)
}

/// Dessine le graphique dans `area` et retourne le bilan du rendu
pub fn render_chart(frame: &mut Frame, app: &App, area: Rect) -> RenderSummary {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_COLOR));
    let inner = block.inner(area);
    let viewport = viewport_for(inner);

    let mut list = DrawList::new();
    let summary = render(&app.chart_context(viewport), &mut list);

    let block = block.title(chart_title(app, &summary));

    if summary.empty {
        let message = if app.is_loading_data() {
            "Loading price history..."
        } else {
            "No price data"
        };
        let paragraph = Paragraph::new(vec![Line::from(""), Line::from(message)])
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return summary;
    }

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(|ctx| replay(ctx, &list, viewport));
    frame.render_widget(canvas, area);

    summary
}

/// " PI/USD · Week · 12 ops (3 outside window) "
fn chart_title(app: &App, summary: &RenderSummary) -> String {
    let mut title = format!(" PI/USD · {} ", app.mode.label());
    if !app.events.is_empty() {
        title.push_str(&format!("· {} ops", summary.markers));
        if summary.dropped_events > 0 {
            title.push_str(&format!(" ({} outside window)", summary.dropped_events));
        }
        title.push(' ');
    }
    title
}

/// Rejoue les commandes : formes d'abord, textes sur un calque au-dessus
fn replay(ctx: &mut Context, list: &DrawList, viewport: Viewport) {
    let flip = |y: f64| viewport.height - y;

    for command in list.commands() {
        match command {
            DrawCommand::Stroke { segments, color, .. } => {
                for s in segments {
                    ctx.draw(&CanvasLine::new(s.x1, flip(s.y1), s.x2, flip(s.y2), *color));
                }
            }
            DrawCommand::Circle {
                x,
                y,
                radius,
                color,
            } => {
                for step in [1.0, 0.66, 0.33] {
                    ctx.draw(&Circle {
                        x: *x,
                        y: flip(*y),
                        radius: radius * step,
                        color: *color,
                    });
                }
                ctx.draw(&Points {
                    coords: &[(*x, flip(*y))],
                    color: *color,
                });
            }
            DrawCommand::Text { .. } => {}
        }
    }

    ctx.layer();

    for command in list.commands() {
        if let DrawCommand::Text {
            text,
            x,
            y,
            align,
            color,
        } = command
        {
            let left = text_left(*x, text, *align, viewport.width);
            ctx.print(left, flip(*y), Span::styled(text.clone(), Style::default().fg(*color)));
        }
    }
}
