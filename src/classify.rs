//! Archetype classifier
//!
//! Maps a finalized trait vector to the best-matching persona. The match
//! score for an archetype is the weight-normalized sum of the vector's values
//! over the traits its rules name; the highest score wins, ties broken by
//! catalog declaration order.

use serde::Serialize;

use crate::catalog::{Archetype, ArchetypeCatalog};
use crate::profile::TraitVector;

/// Display-only percentage stat derived from one trait
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeStat {
    pub label: &'static str,
    /// Trait value rendered as an integer percentage
    pub percent: u8,
}

/// Result of classifying a profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub archetype_id: &'static str,
    pub title: &'static str,
    /// Normalized match score in [0,1]
    pub score: f64,
    /// Presentational stats; never used in scoring
    pub stats: Vec<ArchetypeStat>,
}

/// Normalized weighted match of a trait vector against one rule set
pub fn match_score(archetype: &Archetype, vector: &TraitVector) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for rule in &archetype.match_rules {
        weighted += rule.weight * vector.get(rule.trait_dim);
        total_weight += rule.weight;
    }
    if total_weight <= 0.0 {
        return 0.0;
    }
    weighted / total_weight
}

/// Pick the best-matching archetype for a finalized vector.
///
/// Strict greater-than comparison keeps the first declared archetype on ties.
pub fn classify<'a>(
    catalog: &'a ArchetypeCatalog,
    vector: &TraitVector,
) -> (&'a Archetype, Classification) {
    let mut best: Option<(&Archetype, f64)> = None;
    for archetype in catalog.iter() {
        let score = match_score(archetype, vector);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((archetype, score)),
        }
    }
    // Catalog is never empty; standard() guarantees at least one entry.
    let (archetype, score) = best.expect("archetype catalog must not be empty");

    let stats = archetype
        .stat_traits
        .iter()
        .map(|(label, t)| ArchetypeStat {
            label,
            percent: (vector.get(*t) * 100.0).round().clamp(0.0, 100.0) as u8,
        })
        .collect();

    let classification = Classification {
        archetype_id: archetype.id,
        title: archetype.title,
        score,
        stats,
    };
    (archetype, classification)
}
