// ============================================================================
// Axis Labeler : positions des ticks et labels calendaires
// ============================================================================
// Axe vertical : ticks régulièrement espacés dans l'espace des prix (marge
// incluse), labels "$0.6123".
//
// Axe horizontal : ticks régulièrement espacés sur le domaine temporel,
// label selon le mode :
// - Day   : "Jan 16"  (mois court + jour)
// - Week  : "Wk 3"    (numéro de semaine ISO-8601)
// - Month : "Jan 31"  (mois court + DERNIER jour du mois, pas le jour du tick)
// - Year  : "Jan"     (mois court)
// - All   : "2025"    (année)
//
// Tous les calculs calendaires sont en UTC.
// ============================================================================

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::chart::bounds::Bounds;
use crate::models::TimeframeMode;

/// Une graduation : position sur l'axe (pixels) et son texte
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// Ticks de l'axe des prix, du bas vers le haut (`intervals + 1` ticks)
pub fn price_ticks(bounds: &Bounds, intervals: usize) -> Vec<Tick> {
    let intervals = intervals.max(1);
    let span = bounds.price_max - bounds.price_min;

    (0..=intervals)
        .map(|i| {
            let value = bounds.price_min + (i as f64 * span) / intervals as f64;
            Tick {
                position: bounds.price_to_y(value),
                label: format_price(value),
            }
        })
        .collect()
}

/// Ticks de l'axe du temps, de gauche à droite (`intervals + 1` ticks)
///
/// Domaine réduit à un instant : tous les ticks tombent au même endroit avec
/// le même label, sans erreur.
pub fn time_ticks(bounds: &Bounds, mode: TimeframeMode, intervals: usize) -> Vec<Tick> {
    let intervals = intervals.max(1);
    let span = bounds.time_max - bounds.time_min;

    (0..=intervals)
        .map(|i| {
            let t = bounds.time_min + (i as f64 * span) / intervals as f64;
            let label = DateTime::from_timestamp_millis(t.round() as i64)
                .map(|instant| time_label(mode, instant))
                .unwrap_or_default();
            Tick {
                position: bounds.time_to_x(t),
                label,
            }
        })
        .collect()
}

/// "$0.6123"
pub fn format_price(value: f64) -> String {
    format!("${:.4}", value)
}

/// Label d'un instant selon le mode d'affichage
pub fn time_label(mode: TimeframeMode, instant: DateTime<Utc>) -> String {
    match mode {
        TimeframeMode::Day => instant.format("%b %-d").to_string(),
        TimeframeMode::Week => format!("Wk {}", iso_week(instant)),
        TimeframeMode::Month => format!(
            "{} {}",
            instant.format("%b"),
            last_day_of_month(instant.year(), instant.month())
        ),
        TimeframeMode::Year => instant.format("%b").to_string(),
        TimeframeMode::All => instant.year().to_string(),
    }
}

/// Numéro de semaine ISO-8601 : la semaine qui contient le jeudi de la date,
/// numérotée dans l'année de ce jeudi
pub fn iso_week(instant: DateTime<Utc>) -> u32 {
    instant.iso_week().week()
}

/// Dernier jour du mois (28..=31)
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

// ============================================================================
// Tests unitaires
// ============================================================================
