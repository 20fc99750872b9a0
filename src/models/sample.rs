// ============================================================================
// Structure : PriceSample + SampleStore
// ============================================================================
// Une observation (instant, prix) de l'historique et le magasin qui détient
// la fenêtre courante.
//
// CONCEPTS RUST :
// 1. Vec<T> possédé : la série est remplacée en bloc, jamais fusionnée
// 2. Option<(T, T)> : la fenêtre vide est une valeur, pas une erreur
// 3. Numéro de séquence : une réponse périmée ne peut pas écraser la récente
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Un point de l'historique de prix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Instant de l'observation
    pub time: DateTime<Utc>,

    /// Prix (dans la devise du flux, USD par défaut)
    pub price: f64,
}

impl PriceSample {
    pub fn new(time: DateTime<Utc>, price: f64) -> Self {
        Self { time, price }
    }

    /// Construit un point depuis un timestamp Unix en millisecondes
    ///
    /// Retourne None si le timestamp est hors de la plage de chrono.
    pub fn from_millis(millis: i64, price: f64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|time| Self { time, price })
    }

    /// Timestamp en millisecondes (l'unité du domaine temporel du graphique)
    pub fn time_ms(&self) -> i64 {
        self.time.timestamp_millis()
    }
}

/// Fenêtre de prix courante
///
/// CONCEPT : Remplacement atomique
/// - `load()` remplace toute la série (pas d'append)
/// - `times` est un tableau parallèle de millisecondes croissantes, construit
///   une seule fois par chargement pour la recherche binaire
/// - `latest_request` est le dernier numéro de requête émis ; `accept()`
///   ignore toute réponse dont le numéro n'est pas celui-là
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    samples: Vec<PriceSample>,
    times: Vec<i64>,
    latest_request: u64,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace la série courante
    ///
    /// Le fournisseur promet un ordre croissant mais on ne s'y fie pas :
    /// tri stable par instant avant de construire le tableau des temps.
    pub fn load(&mut self, mut samples: Vec<PriceSample>) {
        samples.sort_by_key(|s| s.time);
        self.times = samples.iter().map(PriceSample::time_ms).collect();
        self.samples = samples;
        debug!(samples = self.samples.len(), "Sample store reloaded");
    }

    /// Émet un nouveau numéro de requête (strictement croissant)
    pub fn begin_request(&mut self) -> u64 {
        self.latest_request += 1;
        self.latest_request
    }

    /// Dernier numéro de requête émis
    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    /// Charge la réponse d'une requête si elle est toujours la plus récente
    ///
    /// Retourne false (et ne touche à rien) pour une réponse périmée.
    pub fn accept(&mut self, request: u64, samples: Vec<PriceSample>) -> bool {
        if request != self.latest_request {
            warn!(
                request,
                latest = self.latest_request,
                "Discarding stale price history response"
            );
            return false;
        }
        self.load(samples);
        true
    }

    /// Bornes temporelles de la fenêtre, None si aucune donnée
    pub fn window_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        Some((first.time, last.time))
    }

    /// Bornes temporelles en millisecondes, None si aucune donnée
    pub fn window_millis(&self) -> Option<(i64, i64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    /// Timestamps croissants (ms), alignés index par index avec `samples()`
    pub fn times(&self) -> &[i64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Vide la série (état "pas de données")
    pub fn clear(&mut self) {
        self.samples.clear();
        self.times.clear();
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ms: i64, price: f64) -> PriceSample {
        PriceSample::from_millis(ms, price).unwrap()
    }

    #[test]
    fn test_empty_store_has_no_window() {
        let store = SampleStore::new();
        assert!(store.is_empty());
        assert!(store.window_bounds().is_none());
        assert!(store.window_millis().is_none());
    }

    #[test]
    fn test_load_replaces_series() {
        let mut store = SampleStore::new();
        store.load(vec![sample(0, 1.0), sample(10, 2.0), sample(20, 3.0)]);
        assert_eq!(store.len(), 3);

        store.load(vec![sample(500, 9.0)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.times(), &[500]);
        assert_eq!(store.window_millis(), Some((500, 500)));
    }

    #[test]
    fn test_load_sorts_unsorted_input() {
        let mut store = SampleStore::new();
        store.load(vec![sample(30, 3.0), sample(10, 1.0), sample(20, 2.0)]);

        assert_eq!(store.times(), &[10, 20, 30]);
        assert_eq!(store.samples()[0].price, 1.0);
        assert_eq!(store.window_millis(), Some((10, 30)));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut store = SampleStore::new();
        let week = store.begin_request();
        let month = store.begin_request();
        assert!(month > week);

        // La réponse "mois" arrive en premier
        assert!(store.accept(month, vec![sample(0, 1.0), sample(100, 2.0)]));

        // La réponse "semaine" arrive en retard : ignorée
        assert!(!store.accept(week, vec![sample(5, 7.0)]));
        assert_eq!(store.len(), 2);
        assert_eq!(store.window_millis(), Some((0, 100)));
    }

    #[test]
    fn test_clear() {
        let mut store = SampleStore::new();
        store.load(vec![sample(0, 1.0)]);
        store.clear();
        assert!(store.is_empty());
        assert!(store.times().is_empty());
    }
}
