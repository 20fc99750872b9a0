// ============================================================================
// Gestion des événements
// ============================================================================
// Événements clavier et ticks de la boucle principale.
//
// Raccourcis (écran graphique) :
//   d / w / m / y / a   mode Day / Week / Month / Year / All
//   h / l  (← / →)      mode précédent / suivant
//   e                   saisir une adresse de portefeuille
//   r                   recharger l'historique et le prix
//   q                   quitter (deux pressions)
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::models::TimeframeMode;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Pas d'entrée pendant l'intervalle de poll
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant au plus `tick_rate`)
    ///
    /// Les relâchements de touche (envoyés par certains OS) et les autres
    /// événements terminal deviennent des Tick. Un resize provoque donc
    /// simplement un nouveau rendu aux nouvelles dimensions.
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            _ => Ok(Event::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// 'l' ou → (mode suivant)
pub fn is_next_mode_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('l') | KeyCode::Right))
}

/// 'h' ou ← (mode précédent)
pub fn is_previous_mode_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('h') | KeyCode::Left))
}

/// 'e' (saisir une adresse)
pub fn is_account_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('e') | KeyCode::Char('E')))
}

/// 'r' (recharger)
pub fn is_refresh_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

/// Mode correspondant à la touche (d/w/m/y/a, majuscules acceptées)
pub fn timeframe_from_event(event: &Event) -> Option<TimeframeMode> {
    match key_code(event)? {
        KeyCode::Char(c) => TimeframeMode::from_token(c.to_ascii_uppercase()),
        _ => None,
    }
}

/// Caractère admis dans une adresse saisie (lettres et chiffres)
pub fn is_address_char_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char(c)) if c.is_ascii_alphanumeric())
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event)? {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
