// ============================================================================
// Structure : MarketTicker
// ============================================================================
// Instantané du marché : prix courant, variation 24h et volume 24h
//
// CONCEPTS RUST :
// 1. Méthodes d'affichage : le formatage vit à côté de la donnée
// 2. Iterator sur les caractères pour les séparateurs de milliers
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prix courant d'un actif et statistiques sur 24h
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTicker {
    /// Prix courant (USD)
    pub price: f64,

    /// Variation sur 24h en pourcentage
    pub change_24h_pct: f64,

    /// Volume échangé sur 24h (USD)
    pub volume_24h: f64,

    /// Instant de la récupération
    pub fetched_at: DateTime<Utc>,
}

impl MarketTicker {
    pub fn new(price: f64, change_24h_pct: f64, volume_24h: f64) -> Self {
        Self {
            price,
            change_24h_pct,
            volume_24h,
            fetched_at: Utc::now(),
        }
    }

    /// "0.6123" (4 décimales)
    pub fn price_display(&self) -> String {
        format!("{:.4}", self.price)
    }

    /// "+2.11%" ou "-0.42%"
    pub fn change_display(&self) -> String {
        format!("{:+.2}%", self.change_24h_pct)
    }

    /// "$1,234,567" (arrondi à l'unité)
    pub fn volume_display(&self) -> String {
        format!("${}", group_thousands(self.volume_24h.round() as i64))
    }

    pub fn is_positive(&self) -> bool {
        self.change_24h_pct >= 0.0
    }
}

/// Insère une virgule toutes les trois positions : 1234567 -> "1,234,567"
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
