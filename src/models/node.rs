// ============================================================================
// Calculateur : rentabilité d'un nœud Pi
// ============================================================================
// Fonction pure de six entrées numériques (plus le prix du Pi et un taux de
// change) : Pi minés par jour avec et sans nœud, coût électrique, bilan net.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Paramètres saisis par l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInputs {
    /// Taux de base (π/heure)
    pub base_rate: f64,
    /// Boost en pourcentage (100 = x1)
    pub boost_pct: f64,
    /// Nombre de récompenses sans nœud
    pub rewards: f64,
    /// Multiplicateur apporté par le nœud
    pub node_multiplier: f64,
    /// Consommation de la machine (W)
    pub watts: f64,
    /// Prix de l'électricité (USD/kWh)
    pub kwh_cost_usd: f64,
}

impl Default for NodeInputs {
    fn default() -> Self {
        Self {
            base_rate: 0.0,
            boost_pct: 100.0,
            rewards: 1.0,
            node_multiplier: 1.0,
            watts: 60.0,
            kwh_cost_usd: 0.18,
        }
    }
}

/// Résultat journalier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeEstimate {
    pub without_node: f64,
    pub with_node: f64,
    pub extra_pi: f64,
    pub electricity_cost_usd: f64,
    pub net_usd: f64,
}

impl NodeEstimate {
    pub fn is_profit(&self) -> bool {
        self.net_usd >= 0.0
    }
}

/// Calcule l'estimation journalière pour un prix du Pi en USD
pub fn estimate(inputs: &NodeInputs, pi_price_usd: f64) -> NodeEstimate {
    let boost = inputs.boost_pct / 100.0;
    let without_node = inputs.base_rate * boost * inputs.rewards * 24.0;
    let with_node = inputs.base_rate * boost * (inputs.rewards + inputs.node_multiplier) * 24.0;
    let extra_pi = with_node - without_node;

    let electricity_cost_usd = (inputs.watts * 24.0 / 1000.0) * inputs.kwh_cost_usd;
    let net_usd = extra_pi * pi_price_usd - electricity_cost_usd;

    NodeEstimate {
        without_node,
        with_node,
        extra_pi,
        electricity_cost_usd,
        net_usd,
    }
}

/// Devise d'affichage : simple multiplication par un taux fourni
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayCurrency {
    pub code: String,
    /// Unités locales pour 1 USD
    pub rate: f64,
}

impl Default for DisplayCurrency {
    fn default() -> Self {
        Self {
            code: "USD".to_string(),
            rate: 1.0,
        }
    }
}

impl DisplayCurrency {
    /// Devise avec le taux statique de repli
    pub fn with_fallback_rate(code: &str) -> Self {
        let code = code.to_uppercase();
        let rate = fallback_rate(&code).unwrap_or(1.0);
        Self { code, rate }
    }

    pub fn symbol(&self) -> &'static str {
        currency_symbol(&self.code)
    }

    /// "$0.26" pour un montant USD converti
    pub fn format(&self, usd: f64, decimals: usize) -> String {
        format!("{}{:.*}", self.symbol(), decimals, usd * self.rate)
    }
}

/// Symbole monétaire, "$" par défaut
pub fn currency_symbol(code: &str) -> &'static str {
    match code {
        "EUR" => "€",
        "PHP" => "₱",
        "VND" => "₫",
        "KRW" => "₩",
        "IDR" => "Rp",
        "INR" => "₹",
        "NGN" => "₦",
        _ => "$",
    }
}

/// Taux statiques utilisés quand aucun taux live n'est disponible
pub fn fallback_rate(code: &str) -> Option<f64> {
    match code {
        "USD" => Some(1.0),
        "EUR" => Some(0.92),
        "PHP" => Some(58.0),
        "VND" => Some(25400.0),
        "KRW" => Some(1420.0),
        "IDR" => Some(16200.0),
        "INR" => Some(86.0),
        "NGN" => Some(1650.0),
        _ => None,
    }
}
