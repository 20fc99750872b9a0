// ============================================================================
// Recherche du point de prix le plus proche d'un instant
// ============================================================================
// Recherche binaire sur le tableau croissant des timestamps. On maintient
// [lo, hi] tel que le point le plus proche y reste, jusqu'à hi - lo <= 1,
// puis on compare les deux candidats. Égalité de distance : l'index le plus
// haut l'emporte.
//
// O(log n), aucune allocation : appelé une fois par opération affichée.
// ============================================================================

/// Index de l'instant le plus proche de `t` dans `times` (croissant)
///
/// Retourne None pour un tableau vide.
pub fn nearest_index(times: &[i64], t: i64) -> Option<usize> {
    if times.is_empty() {
        return None;
    }

    let mut lo = 0;
    let mut hi = times.len() - 1;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if times[mid] < t {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    if t.abs_diff(times[lo]) < t.abs_diff(times[hi]) {
        Some(lo)
    } else {
        Some(hi)
    }
}
