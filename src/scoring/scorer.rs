//! Per-candidate component math
//!
//! Everything here is a total function: out-of-range inputs are clamped,
//! missing regret data falls back to a neutral default with a confidence
//! penalty, and nothing returns an error.
//!
//! The trait-to-attribute importance mapping is a fixed table of weighted
//! contributions. Each attribute's importance is the coefficient-normalized
//! mean of its contributing traits, which keeps the weight monotonic in every
//! contributing trait and inside [0,1] by construction.

use crate::catalog::Archetype;
use crate::data::{Attribute, Candidate, ATTRIBUTE_COUNT};
use crate::profile::{Trait, TraitVector};

use super::{Components, ScoreWeights};

/// Importance above which an attribute counts as "highly weighted" for the
/// satisfaction component and for shortfall detection
pub const HIGH_WEIGHT_THRESHOLD: f64 = 0.55;

/// Satisfaction/regret fallback when a candidate has no regret data
pub const NEUTRAL_REGRET: f64 = 0.5;

/// Confidence multiplier for candidates missing regret data
pub const INCOMPLETE_DATA_FACTOR: f64 = 0.8;

/// One trait feeding an attribute's importance weight. Inverted
/// contributions count `1 - value` (e.g. strict charging discipline lowers
/// the need for battery capacity).
struct Contribution {
    source: Trait,
    coeff: f64,
    inverted: bool,
}

const fn c(source: Trait, coeff: f64) -> Contribution {
    Contribution {
        source,
        coeff,
        inverted: false,
    }
}

const fn inv(source: Trait, coeff: f64) -> Contribution {
    Contribution {
        source,
        coeff,
        inverted: true,
    }
}

const CAMERA_SOURCES: &[Contribution] = &[
    c(Trait::CameraReliance, 1.0),
    c(Trait::LowLightShooting, 0.7),
    c(Trait::VideoCreation, 0.6),
    c(Trait::ZoomReach, 0.4),
    c(Trait::SocialSharing, 0.3),
];

const BATTERY_SOURCES: &[Contribution] = &[
    c(Trait::BatteryAnxiety, 1.0),
    c(Trait::TravelFrequency, 0.7),
    c(Trait::ScreenTimeLoad, 0.6),
    inv(Trait::ChargingDiscipline, 0.4),
];

const PERFORMANCE_SOURCES: &[Contribution] = &[
    c(Trait::LagSensitivity, 1.0),
    c(Trait::GamingLoad, 0.8),
    c(Trait::MultitaskIntensity, 0.7),
    inv(Trait::ThermalTolerance, 0.3),
];

const DISPLAY_SOURCES: &[Contribution] = &[
    c(Trait::ScreenTimeLoad, 0.7),
    c(Trait::VideoCreation, 0.5),
    c(Trait::GamingLoad, 0.4),
    c(Trait::DesignSensitivity, 0.3),
];

const SOFTWARE_SOURCES: &[Contribution] = &[
    c(Trait::LongevityExpectation, 0.7),
    c(Trait::ReviewDependence, 0.4),
    c(Trait::EcosystemAttachment, 0.4),
    c(Trait::RegretAversion, 0.3),
];

const DESIGN_SOURCES: &[Contribution] = &[
    c(Trait::DesignSensitivity, 1.0),
    c(Trait::StatusSignaling, 0.8),
    c(Trait::AccessoryBudget, 0.3),
];

const LONGEVITY_SOURCES: &[Contribution] = &[
    c(Trait::LongevityExpectation, 1.0),
    c(Trait::DurabilityConcern, 0.8),
    c(Trait::RegretAversion, 0.5),
    c(Trait::ResaleAwareness, 0.4),
];

/// Which traits drive the importance of each attribute
fn contributions(attribute: Attribute) -> &'static [Contribution] {
    match attribute {
        Attribute::Camera => CAMERA_SOURCES,
        Attribute::Battery => BATTERY_SOURCES,
        Attribute::Performance => PERFORMANCE_SOURCES,
        Attribute::Display => DISPLAY_SOURCES,
        Attribute::Software => SOFTWARE_SOURCES,
        Attribute::Design => DESIGN_SOURCES,
        Attribute::Longevity => LONGEVITY_SOURCES,
    }
}

/// Per-attribute importance weights derived from a trait vector, each in [0,1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportanceWeights {
    weights: [f64; ATTRIBUTE_COUNT],
}

impl ImportanceWeights {
    pub fn get(&self, a: Attribute) -> f64 {
        self.weights[a.index()]
    }

    /// Attributes the user weights highly, in canonical order
    pub fn high_weight_attributes(&self) -> Vec<Attribute> {
        Attribute::ALL
            .iter()
            .copied()
            .filter(|a| self.get(*a) >= HIGH_WEIGHT_THRESHOLD)
            .collect()
    }

    fn total(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Derive importance weights from a profile
pub fn importance_weights(vector: &TraitVector) -> ImportanceWeights {
    let mut weights = [0.0; ATTRIBUTE_COUNT];
    for attribute in Attribute::ALL {
        let table = contributions(attribute);
        let mut weighted = 0.0;
        let mut total_coeff = 0.0;
        for contrib in table {
            let value = if contrib.inverted {
                1.0 - vector.get(contrib.source)
            } else {
                vector.get(contrib.source)
            };
            weighted += contrib.coeff * value;
            total_coeff += contrib.coeff;
        }
        weights[attribute.index()] = (weighted / total_coeff).clamp(0.0, 1.0);
    }
    ImportanceWeights { weights }
}

/// Normalized weighted alignment between importance weights and a
/// candidate's attribute scores, in [0,1]
pub fn psych_alignment(weights: &ImportanceWeights, candidate: &Candidate) -> f64 {
    let total = weights.total();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = Attribute::ALL
        .iter()
        .map(|a| weights.get(*a) * (candidate.attributes.get(*a) / 10.0))
        .sum();
    weighted / total
}

/// Archetype fit: the classifier's rule formula evaluated against candidate
/// attributes (scaled to [0,1]) instead of trait values
pub fn archetype_fit(archetype: &Archetype, candidate: &Candidate) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for rule in &archetype.match_rules {
        weighted += rule.weight * (candidate.attributes.get(rule.attribute) / 10.0);
        total_weight += rule.weight;
    }
    if total_weight <= 0.0 {
        return 0.0;
    }
    weighted / total_weight
}

/// Aggregated regret penalty over the attributes the user weights highly.
///
/// Returns `None` when the candidate carries no regret data at all; callers
/// substitute `NEUTRAL_REGRET` and downgrade confidence. Attributes the
/// enrichment pipeline reported nothing for count as zero regret. When no
/// attribute clears the high-weight threshold the aggregation falls back to
/// all attributes, weighted by importance.
pub fn aggregated_regret(weights: &ImportanceWeights, candidate: &Candidate) -> Option<f64> {
    let regret = candidate.regret.as_ref()?;

    let focus = weights.high_weight_attributes();
    let focus: Vec<Attribute> = if focus.is_empty() {
        Attribute::ALL.to_vec()
    } else {
        focus
    };

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for a in focus {
        let w = weights.get(a);
        let r = regret.get(a).map(|e| e.score.clamp(0.0, 1.0)).unwrap_or(0.0);
        weighted += w * r;
        total_weight += w;
    }
    if total_weight <= 0.0 {
        return Some(0.0);
    }
    Some((weighted / total_weight).clamp(0.0, 1.0))
}

/// Output of scoring one candidate, before explanation rendering
pub struct ScoredCandidate {
    pub components: Components,
    pub overall: f64,
    /// Data-completeness factor for the confidence calculation
    pub completeness: f64,
    /// Importance weights used, kept for the explanation generator
    pub weights: ImportanceWeights,
}

/// Compute the five components and the weighted overall score
pub fn score_candidate(
    vector: &TraitVector,
    archetype: &Archetype,
    candidate: &Candidate,
    score_weights: &ScoreWeights,
) -> ScoredCandidate {
    let weights = importance_weights(vector);

    let psych = psych_alignment(&weights, candidate);
    let mag = (candidate.attributes.mean() / 10.0).clamp(0.0, 1.0);
    let arch = archetype_fit(archetype, candidate);

    let (regret, completeness) = match aggregated_regret(&weights, candidate) {
        Some(r) => (r, 1.0),
        None => (NEUTRAL_REGRET, INCOMPLETE_DATA_FACTOR),
    };
    let satisfaction = (1.0 - regret).clamp(0.0, 1.0);

    let components = Components {
        psych,
        mag,
        satisfaction,
        arch,
        regret,
    };

    let overall = score_weights.psych * psych
        + score_weights.mag * mag
        + score_weights.satisfaction * satisfaction
        + score_weights.arch * arch
        + score_weights.regret * (1.0 - regret);

    ScoredCandidate {
        components,
        overall,
        completeness,
        weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ArchetypeCatalog;
    use crate::data::{
        AttributeRegret, AttributeScores, ComplaintFrequency, RegretData,
    };
    use crate::profile::{Ecosystem, TraitDelta};

    fn candidate(id: &str, attrs: [f64; ATTRIBUTE_COUNT]) -> Candidate {
        Candidate {
            id: id.into(),
            name: id.into(),
            ecosystem: Ecosystem::Android,
            price: 700,
            attributes: AttributeScores::new(attrs),
            regret: Some(RegretData::new(vec![])),
        }
    }

    fn camera_profile() -> TraitVector {
        TraitVector::neutral().apply_delta(
            &TraitDelta::new()
                .with(Trait::CameraReliance, 0.5)
                .with(Trait::LowLightShooting, 0.45)
                .with(Trait::VideoCreation, 0.4)
                .with(Trait::SocialSharing, 0.3),
        )
    }

    #[test]
    fn test_importance_weights_stay_in_range() {
        let w = importance_weights(&camera_profile());
        for a in Attribute::ALL {
            assert!((0.0..=1.0).contains(&w.get(a)));
        }
    }

    #[test]
    fn test_camera_traits_raise_camera_weight() {
        let neutral = importance_weights(&TraitVector::neutral());
        let skewed = importance_weights(&camera_profile());
        assert!(skewed.get(Attribute::Camera) > neutral.get(Attribute::Camera));
        assert!(skewed.get(Attribute::Camera) >= HIGH_WEIGHT_THRESHOLD);
    }

    #[test]
    fn test_inverted_contribution_is_monotonic_downward() {
        let disciplined = TraitVector::neutral()
            .apply_delta(&TraitDelta::new().with(Trait::ChargingDiscipline, 0.4));
        let base = importance_weights(&TraitVector::neutral());
        let after = importance_weights(&disciplined);
        assert!(after.get(Attribute::Battery) < base.get(Attribute::Battery));
    }

    #[test]
    fn test_camera_candidate_outscores_battery_candidate_for_camera_profile() {
        let vector = camera_profile();
        let catalog = ArchetypeCatalog::standard();
        let archetype = catalog.by_id("memory-keeper").unwrap();
        let weights = ScoreWeights::default();

        let a = candidate("camera-phone", [9.5, 6.0, 7.0, 7.5, 7.0, 7.0, 7.0]);
        let b = candidate("battery-phone", [6.0, 9.5, 7.0, 7.5, 7.0, 7.0, 7.0]);

        let sa = score_candidate(&vector, archetype, &a, &weights);
        let sb = score_candidate(&vector, archetype, &b, &weights);
        assert!(sa.overall > sb.overall);
        assert!(sa.components.psych > sb.components.psych);
    }

    #[test]
    fn test_missing_regret_data_is_neutral_with_penalty() {
        let vector = camera_profile();
        let catalog = ArchetypeCatalog::standard();
        let archetype = catalog.by_id("memory-keeper").unwrap();
        let weights = ScoreWeights::default();

        let mut complete = candidate("c", [8.0; ATTRIBUTE_COUNT]);
        complete.regret = Some(RegretData::new(vec![(
            Attribute::Camera,
            AttributeRegret {
                score: 0.5,
                frequency: ComplaintFrequency::Moderate,
                examples: vec![],
            },
        )]));
        let mut missing = candidate("m", [8.0; ATTRIBUTE_COUNT]);
        missing.regret = None;

        let sc = score_candidate(&vector, archetype, &complete, &weights);
        let sm = score_candidate(&vector, archetype, &missing, &weights);
        assert_eq!(sc.completeness, 1.0);
        assert_eq!(sm.completeness, INCOMPLETE_DATA_FACTOR);
        assert_eq!(sm.components.regret, NEUTRAL_REGRET);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let vector = camera_profile();
        let catalog = ArchetypeCatalog::standard();
        let archetype = catalog.by_id("memory-keeper").unwrap();
        let weights = ScoreWeights::default();
        let c = candidate("x", [9.0, 4.0, 6.5, 8.0, 7.0, 5.5, 6.0]);

        let s1 = score_candidate(&vector, archetype, &c, &weights);
        let s2 = score_candidate(&vector, archetype, &c, &weights);
        assert_eq!(s1.overall, s2.overall);
        assert_eq!(s1.components.psych, s2.components.psych);
        assert_eq!(s1.components.arch, s2.components.arch);
    }

    #[test]
    fn test_regret_on_unweighted_attribute_is_ignored() {
        let vector = camera_profile();
        let weights = importance_weights(&vector);
        let mut c = candidate("c", [8.0; ATTRIBUTE_COUNT]);
        // Heavy regret on design, which a camera profile does not weight highly.
        c.regret = Some(RegretData::new(vec![(
            Attribute::Design,
            AttributeRegret {
                score: 0.9,
                frequency: ComplaintFrequency::VeryHigh,
                examples: vec![],
            },
        )]));
        let r = aggregated_regret(&weights, &c).unwrap();
        assert!(r < 0.1);
    }
}
