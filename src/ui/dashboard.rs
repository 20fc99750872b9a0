// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Disposition verticale :
// ┌ header ─ prix, variation 24 h, volume 24 h, état du flux ┐
// │ graphique (Canvas)                                       │
// ├ statut ─ message courant + estimation du nœud            ┤
// └ footer ─ raccourcis, confirmation de quit ou saisie      ┘
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::chart::render::{IN_COLOR, LABEL_COLOR, LINE_COLOR, OUT_COLOR, SELF_COLOR};
use crate::models::TimeframeMode;
use crate::ui::chart::render_chart;

const FRAME_COLOR: Color = Color::Rgb(74, 122, 82);
const KEY_COLOR: Color = Color::Rgb(250, 204, 21);

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);

    match app.current_screen {
        Screen::Chart => render_footer(frame, app, chunks[3]),
        Screen::InputMode => render_input_footer(frame, app, chunks[3]),
    }
}

/// header, graphique, statut, footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Graphique
            Constraint::Length(5), // Statut, compte, nœud
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

fn framed(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(FRAME_COLOR))
        .title(title)
}

// ============================================================================
// Header : ticker de marché
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut spans = match &app.ticker {
        Some(ticker) => {
            let change_color = if ticker.is_positive() { IN_COLOR } else { OUT_COLOR };
            vec![
                Span::raw("PI "),
                Span::styled(format!("${}", ticker.price_display()), bold.fg(LINE_COLOR)),
                Span::raw("  24h "),
                Span::styled(ticker.change_display(), bold.fg(change_color)),
                Span::raw("  Vol "),
                Span::styled(ticker.volume_display(), Style::default().fg(LABEL_COLOR)),
                Span::raw("  "),
            ]
        }
        None => vec![Span::raw("PI $-.----  ")],
    };

    let status_color = if app.feed_unavailable { OUT_COLOR } else { Color::Gray };
    spans.push(Span::styled(app.feed_status(), Style::default().fg(status_color)));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(framed(" pichart ").title_alignment(Alignment::Center))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Statut : message courant, compte suivi, estimation du nœud
// ============================================================================

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let message = if let Some(loading) = app.loading_message.as_ref().filter(|_| app.is_loading) {
        Line::from(Span::styled(loading.as_str(), Style::default().fg(KEY_COLOR)))
    } else {
        Line::from(app.status_message.as_deref().unwrap_or("Press [e] to overlay a wallet's operations"))
    };

    let mut lines = vec![message, legend_line(app)];
    if let Some(node) = node_line(app) {
        lines.push(node);
    }

    let paragraph = Paragraph::new(lines).block(framed(" status "));
    frame.render_widget(paragraph, area);
}

/// Compte suivi + nombre d'opérations par direction
fn legend_line(app: &App) -> Line<'static> {
    let Some(account) = app.reference_account() else {
        return Line::from(Span::styled("no wallet loaded", Style::default().fg(Color::DarkGray)));
    };

    let counts = app.events.counts();
    let short = match (account.get(..4), account.get(account.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if account.len() > 8 => format!("{}…{}", head, tail),
        _ => account.to_string(),
    };
    Line::from(vec![
        Span::raw(format!("{}  ", short)),
        Span::styled(format!("● in {}  ", counts.incoming), Style::default().fg(IN_COLOR)),
        Span::styled(format!("● out {}  ", counts.outgoing), Style::default().fg(OUT_COLOR)),
        Span::styled(format!("● self {}", counts.self_transfers), Style::default().fg(SELF_COLOR)),
    ])
}

/// "Node: +0.480 π/day, net $0.21/day" dans la devise d'affichage
fn node_line(app: &App) -> Option<Line<'static>> {
    let estimate = app.node_estimate()?;
    let currency = &app.settings.node.currency;
    let color = if estimate.is_profit() { IN_COLOR } else { OUT_COLOR };

    Some(Line::from(vec![
        Span::raw(format!(
            "Node: {:.3} → {:.3} π/day (+{:.3}), power {}  ",
            estimate.without_node,
            estimate.with_node,
            estimate.extra_pi,
            currency.format(estimate.electricity_cost_usd, 2)
        )),
        Span::styled(
            format!("net {}/day", currency.format(estimate.net_usd, 2)),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]))
}

// ============================================================================
// Footer : raccourcis
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(KEY_COLOR).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("Press ", key),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(OUT_COLOR)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" again to quit, any other key to cancel", key),
        ])
    } else {
        let mut spans = Vec::new();
        for mode in TimeframeMode::all() {
            let style = if mode == app.mode {
                key.add_modifier(Modifier::REVERSED)
            } else {
                key
            };
            spans.push(Span::styled(format!("[{}]", mode.token().to_ascii_lowercase()), style));
            spans.push(Span::raw(format!(" {}  ", mode.label())));
        }
        spans.extend([
            Span::styled("[h/l]", key),
            Span::raw(" Cycle  "),
            Span::styled("[e]", key),
            Span::raw(" Wallet  "),
            Span::styled("[r]", key),
            Span::raw(" Refresh  "),
            Span::styled("[q]", key),
            Span::raw(" Quit"),
        ]);
        Line::from(spans)
    };

    let paragraph = Paragraph::new(shortcuts)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(FRAME_COLOR)))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Footer en mode saisie : prompt + buffer + curseur
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(LINE_COLOR).add_modifier(Modifier::BOLD),
        ),
        Span::raw(app.input_buffer.as_str()),
        Span::styled("█", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        Span::styled("   [Enter] Load  [ESC] Cancel", Style::default().fg(Color::DarkGray)),
    ]);

    let paragraph = Paragraph::new(input_line)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(LINE_COLOR)))
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}
