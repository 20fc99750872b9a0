// ============================================================================
// Enum : TimeframeMode
// ============================================================================
// Sélectionne à la fois la fenêtre d'historique demandée au flux de prix et
// la règle de formatage des labels de l'axe X.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Longueur de l'historique demandé au fournisseur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryWindow {
    /// N derniers jours
    Days(u32),
    /// Maximum disponible chez le fournisseur
    Max,
}

impl HistoryWindow {
    /// Valeur du paramètre `days` de l'API ("7", "49", ..., "max")
    pub fn to_query(&self) -> String {
        match self {
            HistoryWindow::Days(days) => days.to_string(),
            HistoryWindow::Max => "max".to_string(),
        }
    }
}

/// Mode d'affichage du graphique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeframeMode {
    /// 7 derniers jours, labels "Jan 16"
    #[default]
    Day,
    /// 7 dernières semaines, labels "Wk 3"
    Week,
    /// ~7 derniers mois, labels fin de mois "Jan 31"
    Month,
    /// 12 derniers mois, labels "Jan"
    Year,
    /// Tout l'historique, labels "2025"
    All,
}

impl TimeframeMode {
    /// Fenêtre demandée : jour=7j, semaine=49j, mois=210j, année=365j, tout=max
    pub fn history_window(&self) -> HistoryWindow {
        match self {
            TimeframeMode::Day => HistoryWindow::Days(7),
            TimeframeMode::Week => HistoryWindow::Days(49),
            TimeframeMode::Month => HistoryWindow::Days(210),
            TimeframeMode::Year => HistoryWindow::Days(365),
            TimeframeMode::All => HistoryWindow::Max,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeframeMode::Day => "Day",
            TimeframeMode::Week => "Week",
            TimeframeMode::Month => "Month",
            TimeframeMode::Year => "Year",
            TimeframeMode::All => "All",
        }
    }

    /// Jeton court d'un bouton de sélection ("D", "W", "M", "Y", "A")
    pub fn token(&self) -> char {
        match self {
            TimeframeMode::Day => 'D',
            TimeframeMode::Week => 'W',
            TimeframeMode::Month => 'M',
            TimeframeMode::Year => 'Y',
            TimeframeMode::All => 'A',
        }
    }

    /// Inverse de `token()`, insensible à la casse
    pub fn from_token(token: char) -> Option<Self> {
        match token.to_ascii_uppercase() {
            'D' => Some(TimeframeMode::Day),
            'W' => Some(TimeframeMode::Week),
            'M' => Some(TimeframeMode::Month),
            'Y' => Some(TimeframeMode::Year),
            'A' => Some(TimeframeMode::All),
            _ => None,
        }
    }

    pub fn all() -> [TimeframeMode; 5] {
        [
            TimeframeMode::Day,
            TimeframeMode::Week,
            TimeframeMode::Month,
            TimeframeMode::Year,
            TimeframeMode::All,
        ]
    }

    /// Mode suivant (cycle)
    pub fn next(&self) -> Self {
        match self {
            TimeframeMode::Day => TimeframeMode::Week,
            TimeframeMode::Week => TimeframeMode::Month,
            TimeframeMode::Month => TimeframeMode::Year,
            TimeframeMode::Year => TimeframeMode::All,
            TimeframeMode::All => TimeframeMode::Day,
        }
    }

    /// Mode précédent (cycle)
    pub fn previous(&self) -> Self {
        match self {
            TimeframeMode::Day => TimeframeMode::All,
            TimeframeMode::Week => TimeframeMode::Day,
            TimeframeMode::Month => TimeframeMode::Week,
            TimeframeMode::Year => TimeframeMode::Month,
            TimeframeMode::All => TimeframeMode::Year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_windows() {
        assert_eq!(TimeframeMode::Day.history_window(), HistoryWindow::Days(7));
        assert_eq!(TimeframeMode::Week.history_window(), HistoryWindow::Days(49));
        assert_eq!(TimeframeMode::Month.history_window(), HistoryWindow::Days(210));
        assert_eq!(TimeframeMode::Year.history_window(), HistoryWindow::Days(365));
        assert_eq!(TimeframeMode::All.history_window().to_query(), "max");
    }

    #[test]
    fn test_tokens_round_trip() {
        for mode in TimeframeMode::all() {
            assert_eq!(TimeframeMode::from_token(mode.token()), Some(mode));
        }
        assert_eq!(TimeframeMode::from_token('w'), Some(TimeframeMode::Week));
        assert_eq!(TimeframeMode::from_token('x'), None);
    }

    #[test]
    fn test_cycle() {
        assert_eq!(TimeframeMode::Day.next(), TimeframeMode::Week);
        assert_eq!(TimeframeMode::All.next(), TimeframeMode::Day);
        assert_eq!(TimeframeMode::Day.previous(), TimeframeMode::All);
    }
}
