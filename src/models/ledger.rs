// ============================================================================
// Structure : LedgerEvent + EventSet
// ============================================================================
// Une opération du registre Pi, classée par rapport à un compte de référence,
// et l'ensemble des événements superposés au graphique.
//
// CONCEPTS RUST :
// 1. Fonction pure : classify() ne dépend que de ses arguments
// 2. Enum Copy : Direction se passe par valeur
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sens d'une opération vis-à-vis du compte de référence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Reçu par le compte de référence
    In,
    /// Envoyé par le compte de référence
    Out,
    /// Tout le reste (source == destination, ou compte non impliqué)
    SelfTransfer,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::SelfTransfer => "self",
        }
    }
}

/// Une opération datée entre deux comptes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub time: DateTime<Utc>,
    pub source_account: String,
    pub dest_account: String,
    /// Dérivé de (source, destination, compte de référence), jamais fourni
    pub direction: Direction,
}

impl LedgerEvent {
    /// Crée un événement déjà classé pour `reference`
    pub fn new(
        time: DateTime<Utc>,
        source_account: String,
        dest_account: String,
        reference: &str,
    ) -> Self {
        let direction = classify_accounts(&source_account, &dest_account, reference);
        Self {
            time,
            source_account,
            dest_account,
            direction,
        }
    }

    pub fn time_ms(&self) -> i64 {
        self.time.timestamp_millis()
    }
}

/// Classe un événement par rapport au compte de référence
pub fn classify(event: &LedgerEvent, reference: &str) -> Direction {
    classify_accounts(&event.source_account, &event.dest_account, reference)
}

/// OUT si la source est la référence (et pas la destination), IN dans le
/// cas symétrique, SELF sinon.
pub fn classify_accounts(source: &str, dest: &str, reference: &str) -> Direction {
    if source == reference && dest != reference {
        Direction::Out
    } else if dest == reference && source != reference {
        Direction::In
    } else {
        Direction::SelfTransfer
    }
}

/// Nombre d'événements par sens (pour la ligne de statut)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionCounts {
    pub incoming: usize,
    pub outgoing: usize,
    pub self_transfers: usize,
}

/// Événements chargés pour un compte
///
/// Même discipline que `SampleStore` : remplacement en bloc, numéros de
/// requête croissants, réponses périmées ignorées.
#[derive(Debug, Clone, Default)]
pub struct EventSet {
    events: Vec<LedgerEvent>,
    reference_account: Option<String>,
    latest_request: u64,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace les événements et le compte de référence
    pub fn load(&mut self, reference: &str, events: Vec<LedgerEvent>) {
        self.events = events;
        self.set_reference_account(reference);
    }

    /// Change le compte de référence et reclasse tous les événements
    ///
    /// Pas de refetch : la classification est une fonction pure.
    pub fn set_reference_account(&mut self, reference: &str) {
        for event in &mut self.events {
            event.direction = classify(event, reference);
        }
        self.reference_account = Some(reference.to_string());
        debug!(events = self.events.len(), account = %reference, "Events reclassified");
    }

    pub fn begin_request(&mut self) -> u64 {
        self.latest_request += 1;
        self.latest_request
    }

    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    /// Charge la réponse si elle correspond à la dernière requête émise
    pub fn accept(&mut self, request: u64, reference: &str, events: Vec<LedgerEvent>) -> bool {
        if request != self.latest_request {
            warn!(request, latest = self.latest_request, "Discarding stale ledger response");
            return false;
        }
        self.load(reference, events);
        true
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn reference_account(&self) -> Option<&str> {
        self.reference_account.as_deref()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn counts(&self) -> DirectionCounts {
        self.events
            .iter()
            .fold(DirectionCounts::default(), |mut acc, e| {
                match e.direction {
                    Direction::In => acc.incoming += 1,
                    Direction::Out => acc.outgoing += 1,
                    Direction::SelfTransfer => acc.self_transfers += 1,
                }
                acc
            })
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn event(source: &str, dest: &str) -> LedgerEvent {
        LedgerEvent::new(Utc::now(), source.to_string(), dest.to_string(), "")
    }

    #[test]
    fn test_classify_out_in_self() {
        let e = event("A", "B");
        assert_eq!(classify(&e, "A"), Direction::Out);
        assert_eq!(classify(&e, "B"), Direction::In);

        let same = event("A", "A");
        assert_eq!(classify(&same, "A"), Direction::SelfTransfer);
    }

    #[test]
    fn test_classify_unrelated_account_is_self() {
        assert_eq!(classify(&event("A", "B"), "C"), Direction::SelfTransfer);
    }

    #[test]
    fn test_classify_is_referentially_transparent() {
        let e = event("A", "B");
        assert_eq!(classify(&e, "A"), classify(&e, "A"));
    }

    #[test]
    fn test_reference_change_reclassifies() {
        let mut set = EventSet::new();
        set.load("A", vec![event("A", "B"), event("B", "A"), event("A", "A")]);
        assert_eq!(
            set.counts(),
            DirectionCounts { incoming: 1, outgoing: 1, self_transfers: 1 }
        );

        set.set_reference_account("B");
        assert_eq!(set.events()[0].direction, Direction::In);
        assert_eq!(set.events()[1].direction, Direction::Out);
        assert_eq!(set.reference_account(), Some("B"));
    }

    #[test]
    fn test_stale_ledger_response_is_discarded() {
        let mut set = EventSet::new();
        let first = set.begin_request();
        let second = set.begin_request();

        assert!(!set.accept(first, "A", vec![event("A", "B")]));
        assert!(set.is_empty());
        assert!(set.accept(second, "B", vec![event("A", "B")]));
        assert_eq!(set.events()[0].direction, Direction::In);
    }
}
