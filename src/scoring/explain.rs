//! Deterministic explanation generator
//!
//! Renders human-readable justifications straight from the scorer's numeric
//! internals. No generative model is involved; the same inputs always yield
//! the same strings.

use serde::Serialize;

use crate::catalog::Archetype;
use crate::data::{Attribute, Candidate};
use crate::profile::{Ecosystem, HardConstraint};

use super::scorer::{ImportanceWeights, HIGH_WEIGHT_THRESHOLD};

/// How many attributes to surface as top contributors
const TOP_CONTRIBUTING_COUNT: usize = 3;

/// Score gap (on the 0-10 scale) below the weighted expectation that counts
/// as a shortfall
const SHORTFALL_GAP: f64 = 2.0;

/// Explanation record attached to every rerank result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    /// Attributes with the largest weighted contribution, strongest first
    pub top_contributing: Vec<String>,
    /// Hard constraints this candidate satisfies (boolean facts)
    pub matches: Vec<String>,
    /// Attributes falling notably short of the weighted expectation, or
    /// with frequent real-user complaints
    pub shortfalls: Vec<String>,
}

/// Combined psych + archetype contribution of one attribute
fn contribution(
    weights: &ImportanceWeights,
    archetype: &Archetype,
    candidate: &Candidate,
    attribute: Attribute,
) -> f64 {
    let scaled = candidate.attributes.get(attribute) / 10.0;
    let arch_weight: f64 = archetype
        .match_rules
        .iter()
        .filter(|r| r.attribute == attribute)
        .map(|r| r.weight)
        .sum();
    weights.get(attribute) * scaled + arch_weight * scaled
}

/// Derive the explanation for one scored candidate
pub fn explain(
    weights: &ImportanceWeights,
    archetype: &Archetype,
    candidate: &Candidate,
    constraints: &[HardConstraint],
) -> Explanation {
    // Top contributors: sort by contribution descending; canonical attribute
    // order breaks exact ties so output is stable.
    let mut ranked: Vec<(Attribute, f64)> = Attribute::ALL
        .iter()
        .map(|a| (*a, contribution(weights, archetype, candidate, *a)))
        .collect();
    ranked.sort_by(|(a1, c1), (a2, c2)| {
        c2.partial_cmp(c1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a1.index().cmp(&a2.index()))
    });
    let total: f64 = ranked.iter().map(|(_, c)| c).sum();
    let top_contributing = ranked
        .iter()
        .take(TOP_CONTRIBUTING_COUNT)
        .filter(|(_, contrib)| *contrib > 0.0)
        .map(|(a, contrib)| {
            let share = if total > 0.0 { contrib / total } else { 0.0 };
            format!("{} ({:.0}% of fit)", a.label(), share * 100.0)
        })
        .collect();

    // Matches: every recorded constraint this candidate survived the filter
    // for is a satisfied boolean fact.
    let matches = constraints
        .iter()
        .map(|constraint| match constraint {
            HardConstraint::EcosystemLock { ecosystem } => {
                let label = match ecosystem {
                    Ecosystem::Ios => "iOS",
                    Ecosystem::Android => "Android",
                };
                format!("stays within your {label} ecosystem")
            }
            HardConstraint::BudgetCeiling { max_price } => {
                format!("fits your budget ceiling of {max_price}")
            }
            HardConstraint::RegretSensitive { attribute } => {
                format!("no frequent {} complaints on record", attribute.label())
            }
        })
        .collect();

    // Shortfalls: highly weighted attributes scoring well under expectation,
    // plus any attribute real users complain about often.
    let mut shortfalls = Vec::new();
    for a in Attribute::ALL {
        let weight = weights.get(a);
        let score = candidate.attributes.get(a);
        if weight >= HIGH_WEIGHT_THRESHOLD && score < weight * 10.0 - SHORTFALL_GAP {
            shortfalls.push(format!(
                "{} scores {:.1} where your profile expects {:.1}",
                a.label(),
                score,
                weight * 10.0
            ));
        }
    }
    if let Some(regret) = &candidate.regret {
        for (a, entry) in regret.iter() {
            if entry.frequency.is_severe() {
                let bucket = match entry.frequency {
                    crate::data::ComplaintFrequency::VeryHigh => "very high",
                    _ => "high",
                };
                shortfalls.push(format!(
                    "{} complaint frequency is {} among owners",
                    a.label(),
                    bucket
                ));
            }
        }
    }

    Explanation {
        top_contributing,
        matches,
        shortfalls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ArchetypeCatalog;
    use crate::data::{
        AttributeRegret, AttributeScores, ComplaintFrequency, RegretData, ATTRIBUTE_COUNT,
    };
    use crate::profile::{Trait, TraitDelta, TraitVector};
    use crate::scoring::scorer::importance_weights;

    fn camera_candidate() -> Candidate {
        Candidate {
            id: "cam".into(),
            name: "Cam".into(),
            ecosystem: Ecosystem::Android,
            price: 700,
            attributes: AttributeScores::new([9.5, 5.0, 7.0, 7.0, 7.0, 6.0, 6.5]),
            regret: None,
        }
    }

    fn camera_weights() -> ImportanceWeights {
        importance_weights(&TraitVector::neutral().apply_delta(
            &TraitDelta::new()
                .with(Trait::CameraReliance, 0.5)
                .with(Trait::LowLightShooting, 0.45)
                .with(Trait::VideoCreation, 0.4),
        ))
    }

    #[test]
    fn test_camera_leads_top_contributing_for_camera_profile() {
        let catalog = ArchetypeCatalog::standard();
        let archetype = catalog.by_id("memory-keeper").unwrap();
        let e = explain(&camera_weights(), archetype, &camera_candidate(), &[]);
        assert!(e.top_contributing[0].starts_with("camera"));
        assert_eq!(e.top_contributing.len(), 3);
    }

    #[test]
    fn test_matches_render_constraints() {
        let catalog = ArchetypeCatalog::standard();
        let archetype = catalog.by_id("memory-keeper").unwrap();
        let constraints = vec![
            HardConstraint::BudgetCeiling { max_price: 900 },
            HardConstraint::EcosystemLock {
                ecosystem: Ecosystem::Android,
            },
        ];
        let e = explain(&camera_weights(), archetype, &camera_candidate(), &constraints);
        assert_eq!(e.matches.len(), 2);
        assert!(e.matches[0].contains("900"));
        assert!(e.matches[1].contains("Android"));
    }

    #[test]
    fn test_weak_weighted_attribute_is_a_shortfall() {
        let catalog = ArchetypeCatalog::standard();
        let archetype = catalog.by_id("memory-keeper").unwrap();
        let mut candidate = camera_candidate();
        // Camera heavily weighted but the candidate is weak there.
        candidate.attributes = AttributeScores::new([3.0, 8.0, 8.0, 8.0, 8.0, 8.0, 8.0]);
        let e = explain(&camera_weights(), archetype, &candidate, &[]);
        assert!(e.shortfalls.iter().any(|s| s.starts_with("camera")));
    }

    #[test]
    fn test_severe_complaints_are_shortfalls() {
        let catalog = ArchetypeCatalog::standard();
        let archetype = catalog.by_id("memory-keeper").unwrap();
        let mut candidate = camera_candidate();
        candidate.regret = Some(RegretData::new(vec![(
            Attribute::Battery,
            AttributeRegret {
                score: 0.7,
                frequency: ComplaintFrequency::VeryHigh,
                examples: vec![],
            },
        )]));
        let e = explain(&camera_weights(), archetype, &candidate, &[]);
        assert!(e
            .shortfalls
            .iter()
            .any(|s| s.contains("battery") && s.contains("very high")));
    }

    #[test]
    fn test_explanations_are_reproducible() {
        let catalog = ArchetypeCatalog::standard();
        let archetype = catalog.by_id("memory-keeper").unwrap();
        let candidate = camera_candidate();
        let weights = camera_weights();
        let e1 = explain(&weights, archetype, &candidate, &[]);
        let e2 = explain(&weights, archetype, &candidate, &[]);
        assert_eq!(e1.top_contributing, e2.top_contributing);
        assert_eq!(e1.shortfalls, e2.shortfalls);
    }

    #[test]
    fn test_all_attributes_ranked_without_panic_on_zero_scores() {
        let catalog = ArchetypeCatalog::standard();
        let archetype = catalog.by_id("memory-keeper").unwrap();
        let mut candidate = camera_candidate();
        candidate.attributes = AttributeScores::new([0.0; ATTRIBUTE_COUNT]);
        let e = explain(&camera_weights(), archetype, &candidate, &[]);
        assert!(e.top_contributing.is_empty());
    }
}
