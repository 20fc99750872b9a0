// ============================================================================
// Bounds : projection (temps, prix) -> coordonnées de la surface
// ============================================================================
// Calculées à chaque rendu depuis la fenêtre de prix courante. Jamais mises
// en cache : deux calculs sur la même entrée donnent la même valeur.
//
// ALGORITHME :
// - Un seul passage pour min/max du temps et du prix (pas de confiance dans
//   l'ordre fourni)
// - Moins de 2 instants distincts, ou aucun prix fini : carré unité [0,1]x[0,1]
// - Marge de 6 % de l'étendue sur l'axe des prix (minimum 0.001), jamais sur
//   l'axe du temps
// ============================================================================

use crate::config::Margins;
use crate::models::PriceSample;

/// Part de l'étendue des prix ajoutée au-dessus et en dessous
pub const PRICE_PADDING_RATIO: f64 = 0.06;

/// Marge minimale sur l'axe des prix (unités de prix)
pub const MIN_PRICE_PADDING: f64 = 0.001;

/// Dimensions de la surface de dessin fournies par l'hôte
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Domaine (temps en ms, prix) et sa projection affine sur la surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Premier instant du domaine (ms)
    pub time_min: f64,
    /// Dernier instant du domaine (ms)
    pub time_max: f64,
    /// Bas de l'axe des prix, marge incluse
    pub price_min: f64,
    /// Haut de l'axe des prix, marge incluse
    pub price_max: f64,
    /// Prix minimum observé (0 en repli)
    pub data_price_min: f64,
    /// Prix maximum observé (1 en repli)
    pub data_price_max: f64,
    /// true si le domaine a été remplacé par le carré unité
    pub fallback: bool,
    pub viewport: Viewport,
    pub margins: Margins,
}

impl Bounds {
    /// Calcule les bornes d'une série (vide, non triée ou dégénérée acceptée)
    pub fn compute(samples: &[PriceSample], viewport: Viewport, margins: Margins) -> Self {
        let mut time_lo = f64::INFINITY;
        let mut time_hi = f64::NEG_INFINITY;
        let mut price_lo = f64::INFINITY;
        let mut price_hi = f64::NEG_INFINITY;

        for sample in samples {
            let t = sample.time_ms() as f64;
            time_lo = time_lo.min(t);
            time_hi = time_hi.max(t);
            if sample.price.is_finite() {
                price_lo = price_lo.min(sample.price);
                price_hi = price_hi.max(sample.price);
            }
        }

        // Vide (inf > -inf), instant unique, ou aucun prix fini
        let degenerate = time_lo >= time_hi || !price_lo.is_finite() || !price_hi.is_finite();
        let (time_lo, time_hi, price_lo, price_hi) = if degenerate {
            (0.0, 1.0, 0.0, 1.0)
        } else {
            (time_lo, time_hi, price_lo, price_hi)
        };

        let pad = ((price_hi - price_lo) * PRICE_PADDING_RATIO).max(MIN_PRICE_PADDING);

        Self {
            time_min: time_lo,
            time_max: time_hi,
            price_min: price_lo - pad,
            price_max: price_hi + pad,
            data_price_min: price_lo,
            data_price_max: price_hi,
            fallback: degenerate,
            viewport,
            margins,
        }
    }

    /// Bord gauche du cadre de tracé
    pub fn plot_left(&self) -> f64 {
        self.margins.left
    }

    /// Bord droit du cadre de tracé
    pub fn plot_right(&self) -> f64 {
        self.viewport.width - self.margins.right
    }

    /// Bord haut du cadre de tracé
    pub fn plot_top(&self) -> f64 {
        self.margins.top
    }

    /// Bord bas du cadre de tracé (l'axe des temps)
    pub fn plot_bottom(&self) -> f64 {
        self.viewport.height - self.margins.bottom
    }

    /// Instant (ms) -> x
    pub fn time_to_x(&self, t: f64) -> f64 {
        let plot_width = self.viewport.width - self.margins.left - self.margins.right;
        self.margins.left + plot_width * (t - self.time_min) / (self.time_max - self.time_min)
    }

    /// Prix -> y (y croît vers le bas)
    pub fn price_to_y(&self, price: f64) -> f64 {
        let plot_height = self.viewport.height - self.margins.top - self.margins.bottom;
        self.viewport.height
            - self.margins.bottom
            - plot_height * (price - self.price_min) / (self.price_max - self.price_min)
    }

    /// Projette un point de la série
    pub fn project(&self, sample: &PriceSample) -> (f64, f64) {
        (
            self.time_to_x(sample.time_ms() as f64),
            self.price_to_y(sample.price),
        )
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 400.0)
    }

    fn series(points: &[(i64, f64)]) -> Vec<PriceSample> {
        points
            .iter()
            .map(|&(t, p)| PriceSample::from_millis(t, p).unwrap())
            .collect()
    }

    #[test]
    fn test_boundary_exactness() {
        let samples = series(&[(1_000, 0.5), (2_000, 0.7), (5_000, 0.6)]);
        let b = Bounds::compute(&samples, viewport(), Margins::default());

        assert!(!b.fallback);
        assert_eq!(b.time_to_x(b.time_min), 56.0);
        assert_eq!(b.time_to_x(b.time_max), 800.0 - 10.0);
    }

    #[test]
    fn test_price_padding() {
        let samples = series(&[(0, 1.0), (100, 2.0)]);
        let b = Bounds::compute(&samples, viewport(), Margins::default());

        assert!((b.price_min - 0.94).abs() < 1e-12);
        assert!((b.price_max - 2.06).abs() < 1e-12);
        assert_eq!(b.data_price_min, 1.0);
        assert_eq!(b.data_price_max, 2.0);
        // Pas de marge sur le temps
        assert_eq!(b.time_min, 0.0);
        assert_eq!(b.time_max, 100.0);
    }

    #[test]
    fn test_flat_price_gets_minimum_padding() {
        let samples = series(&[(0, 0.5), (100, 0.5)]);
        let b = Bounds::compute(&samples, viewport(), Margins::default());

        assert!(!b.fallback);
        assert!((b.price_min - 0.499).abs() < 1e-12);
        assert!((b.price_max - 0.501).abs() < 1e-12);
        assert!(b.price_to_y(0.5).is_finite());
    }

    #[test]
    fn test_empty_series_falls_back_to_unit_square() {
        let b = Bounds::compute(&[], viewport(), Margins::default());

        assert!(b.fallback);
        assert_eq!((b.time_min, b.time_max), (0.0, 1.0));
        assert_eq!((b.data_price_min, b.data_price_max), (0.0, 1.0));
        assert!(b.time_to_x(0.5).is_finite());
        assert!(b.price_to_y(0.5).is_finite());
    }

    #[test]
    fn test_single_point_falls_back_to_unit_square() {
        let samples = series(&[(42, 3.0)]);
        let b = Bounds::compute(&samples, viewport(), Margins::default());

        assert!(b.fallback);
        assert_eq!((b.time_min, b.time_max), (0.0, 1.0));
        assert_eq!(b.time_to_x(0.0), 56.0);
        assert_eq!(b.time_to_x(1.0), 790.0);
    }

    #[test]
    fn test_same_timestamp_falls_back() {
        let samples = series(&[(42, 3.0), (42, 4.0)]);
        assert!(Bounds::compute(&samples, viewport(), Margins::default()).fallback);
    }

    #[test]
    fn test_non_finite_prices_fall_back() {
        let samples = series(&[(0, f64::NAN), (10, f64::INFINITY)]);
        let b = Bounds::compute(&samples, viewport(), Margins::default());
        assert!(b.fallback);
        assert!(b.price_to_y(0.0).is_finite());
    }

    #[test]
    fn test_unsorted_input_uses_min_max() {
        let samples = series(&[(300, 2.0), (100, 1.0), (200, 3.0)]);
        let b = Bounds::compute(&samples, viewport(), Margins::default());
        assert_eq!((b.time_min, b.time_max), (100.0, 300.0));
        assert_eq!((b.data_price_min, b.data_price_max), (1.0, 3.0));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let samples = series(&[(0, 1.0), (50, 1.5), (100, 2.0)]);
        let a = Bounds::compute(&samples, viewport(), Margins::default());
        let b = Bounds::compute(&samples, viewport(), Margins::default());

        assert_eq!(a, b);
        assert_eq!(a.time_to_x(37.0).to_bits(), b.time_to_x(37.0).to_bits());
        assert_eq!(a.price_to_y(1.23).to_bits(), b.price_to_y(1.23).to_bits());
    }

    #[test]
    fn test_price_axis_direction() {
        let samples = series(&[(0, 1.0), (100, 2.0)]);
        let b = Bounds::compute(&samples, viewport(), Margins::default());

        // Le haut de l'axe (prix max) est en haut de la surface
        assert_eq!(b.price_to_y(b.price_max), 10.0);
        assert_eq!(b.price_to_y(b.price_min), 400.0 - 60.0);
        assert!(b.price_to_y(2.0) < b.price_to_y(1.0));
    }
}
