use std::collections::HashSet;

use crate::ranking::RankTable;

/// Hasta `needed` valores distintos, primero de `primary` en orden de ranking
/// y después de `fallback`, saltando lo que ya esté en `exclude`. Cada valor
/// devuelto se añade a `exclude`, de modo que llamadas sucesivas con el mismo
/// conjunto son disjuntas. Un resultado corto indica rankings agotados.
pub fn select_top_unique(
    primary: &RankTable,
    fallback: &RankTable,
    needed: usize,
    exclude: &mut HashSet<u8>,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(needed);
    if needed == 0 {
        return out;
    }

    for value in primary.values().chain(fallback.values()) {
        if exclude.insert(value) {
            out.push(value);
            if out.len() >= needed {
                break;
            }
        }
    }
    out
}
