// ============================================================================
// Configuration
// ============================================================================
// Paramètres chargés depuis un fichier JSON, avec valeurs par défaut pour
// tout ce qui manque.
//
// Ordre de recherche :
// 1. ./pichart.json
// 2. <config_dir>/pichart/config.json (~/.config/pichart/config.json sous Linux)
// 3. Settings::default()
//
// La variable d'environnement PICHART_ACCOUNT remplace `account`.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{DisplayCurrency, NodeInputs};

/// Variable d'environnement pour le compte de référence
pub const ACCOUNT_ENV_VAR: &str = "PICHART_ACCOUNT";

/// Racine de la configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chart: ChartConfig,
    pub feed: FeedConfig,
    pub ledger: LedgerConfig,
    pub node: NodeConfig,
    /// Intervalle de rafraîchissement du prix courant (secondes)
    pub refresh_secs: RefreshSecs,
    /// Adresse chargée au démarrage (optionnelle)
    pub account: Option<String>,
}

/// Newtype pour donner 60 s par défaut au champ `refresh_secs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshSecs(pub u64);

impl Default for RefreshSecs {
    fn default() -> Self {
        RefreshSecs(60)
    }
}

/// Marges du cadre de tracé (unités de la surface de dessin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        // Marge basse plus haute pour les labels de dates
        Self {
            left: 56.0,
            right: 10.0,
            top: 10.0,
            bottom: 60.0,
        }
    }
}

/// Géométrie du graphique
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub margins: Margins,
    /// Nombre d'intervalles sur l'axe des prix (ticks = intervalles + 1)
    pub price_intervals: usize,
    /// Nombre d'intervalles sur l'axe du temps (ticks = intervalles + 1)
    pub time_intervals: usize,
    /// Rayon des points d'opérations
    pub marker_radius: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            price_intervals: 5,
            time_intervals: 6,
            marker_radius: 5.0,
        }
    }
}

/// Flux de prix (CoinGecko)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    pub coin_id: String,
    pub vs_currency: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            coin_id: "pi-network".to_string(),
            vs_currency: "usd".to_string(),
        }
    }
}

/// Registre (API Horizon du mainnet Pi)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub base_url: String,
    /// Taille de page demandée
    pub page_limit: u32,
    /// Plafond de sécurité sur le nombre total d'enregistrements récupérés
    pub max_records: usize,
    /// Les opérations antérieures sont ignorées
    pub cutoff: DateTime<Utc>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mainnet.minepi.com".to_string(),
            page_limit: 200,
            max_records: 2000,
            cutoff: default_cutoff(),
        }
    }
}

/// 2025-01-01T00:00:00Z
fn default_cutoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Calculateur de nœud
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub inputs: NodeInputs,
    pub currency: DisplayCurrency,
}

impl Settings {
    /// Charge un fichier de configuration précis
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Échec de la lecture de {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Configuration invalide : {}", path.display()))?;
        Ok(settings)
    }

    /// Charge depuis les emplacements par défaut, puis applique l'environnement
    pub fn load_default() -> Self {
        let mut settings = Self::candidate_paths()
            .into_iter()
            .find_map(|path| {
                if !path.exists() {
                    return None;
                }
                match Self::load(&path) {
                    Ok(settings) => {
                        info!(path = %path.display(), "Configuration loaded");
                        Some(settings)
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = ?e, "Ignoring invalid configuration");
                        None
                    }
                }
            })
            .unwrap_or_else(|| {
                debug!("No configuration file found, using defaults");
                Self::default()
            });

        if let Ok(account) = std::env::var(ACCOUNT_ENV_VAR) {
            settings.account = Some(account);
        }
        settings
    }

    /// ./pichart.json puis <config_dir>/pichart/config.json
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("pichart.json")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("pichart").join("config.json"));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chart.margins.left, 56.0);
        assert_eq!(settings.chart.margins.bottom, 60.0);
        assert_eq!(settings.chart.price_intervals, 5);
        assert_eq!(settings.chart.time_intervals, 6);
        assert_eq!(settings.ledger.max_records, 2000);
        assert_eq!(settings.refresh_secs, RefreshSecs(60));
        assert_eq!(settings.ledger.cutoff.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "chart": { "margins": { "left": 80 } },
            "refresh_secs": 30,
            "node": { "currency": { "code": "EUR", "rate": 0.9 } }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.chart.margins.left, 80.0);
        assert_eq!(settings.chart.margins.right, 10.0);
        assert_eq!(settings.chart.time_intervals, 6);
        assert_eq!(settings.refresh_secs, RefreshSecs(30));
        assert_eq!(settings.node.currency.code, "EUR");
        assert_eq!(settings.feed.coin_id, "pi-network");
        assert!(settings.account.is_none());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Settings::load("/nonexistent/pichart.json").is_err());
    }
}
