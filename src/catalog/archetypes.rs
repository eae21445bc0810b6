//! Persona archetype catalog
//!
//! Each archetype carries a weighted rule set bridging the trait space and
//! the candidate attribute space: the classifier evaluates rules against the
//! final trait vector, the scorer evaluates the same rules against candidate
//! attribute scores. Declaration order is the tie-break order.

use serde::Serialize;

use crate::data::Attribute;
use crate::profile::Trait;

/// One weighted match rule. `trait_dim` is read by the classifier,
/// `attribute` by the scorer's archetype-fit component.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRule {
    pub trait_dim: Trait,
    pub attribute: Attribute,
    pub weight: f64,
}

/// A descriptive persona summarizing a converged profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Archetype {
    /// Stable identifier
    pub id: &'static str,
    /// Display title
    pub title: &'static str,
    /// One-sentence description
    pub description: &'static str,
    /// Weighted rules mapping semantic dimensions to importance
    pub match_rules: Vec<MatchRule>,
    /// Traits rendered as percentage stats for display only
    #[serde(skip)]
    pub stat_traits: Vec<(&'static str, Trait)>,
}

/// The static archetype catalog
pub struct ArchetypeCatalog {
    archetypes: Vec<Archetype>,
}

impl ArchetypeCatalog {
    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&Archetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    /// The standard persona set
    pub fn standard() -> Self {
        let rule = |trait_dim: Trait, attribute: Attribute, weight: f64| MatchRule {
            trait_dim,
            attribute,
            weight,
        };

        let archetypes = vec![
            Archetype {
                id: "power-seeker",
                title: "The Power Seeker",
                description: "Chases responsiveness above all; a dropped frame is a broken promise.",
                match_rules: vec![
                    rule(Trait::LagSensitivity, Attribute::Performance, 1.0),
                    rule(Trait::GamingLoad, Attribute::Performance, 0.8),
                    rule(Trait::MultitaskIntensity, Attribute::Performance, 0.6),
                    rule(Trait::StorageAppetite, Attribute::Display, 0.3),
                ],
                stat_traits: vec![
                    ("performance driven", Trait::LagSensitivity),
                    ("gaming load", Trait::GamingLoad),
                    ("multitasking", Trait::MultitaskIntensity),
                ],
            },
            Archetype {
                id: "memory-keeper",
                title: "The Memory Keeper",
                description: "The phone is a camera first; missed shots are the real cost.",
                match_rules: vec![
                    rule(Trait::CameraReliance, Attribute::Camera, 1.0),
                    rule(Trait::LowLightShooting, Attribute::Camera, 0.8),
                    rule(Trait::VideoCreation, Attribute::Camera, 0.6),
                    rule(Trait::SocialSharing, Attribute::Display, 0.4),
                ],
                stat_traits: vec![
                    ("camera reliance", Trait::CameraReliance),
                    ("low-light shooting", Trait::LowLightShooting),
                    ("sharing", Trait::SocialSharing),
                ],
            },
            Archetype {
                id: "road-warrior",
                title: "The Road Warrior",
                description: "Far from outlets and heavy on the screen; endurance decides everything.",
                match_rules: vec![
                    rule(Trait::BatteryAnxiety, Attribute::Battery, 1.0),
                    rule(Trait::TravelFrequency, Attribute::Battery, 0.8),
                    rule(Trait::ScreenTimeLoad, Attribute::Battery, 0.5),
                    rule(Trait::DurabilityConcern, Attribute::Longevity, 0.4),
                ],
                stat_traits: vec![
                    ("battery anxiety", Trait::BatteryAnxiety),
                    ("time off-grid", Trait::TravelFrequency),
                    ("screen load", Trait::ScreenTimeLoad),
                ],
            },
            Archetype {
                id: "value-hunter",
                title: "The Value Hunter",
                description: "Every dollar is audited; the best phone is the one that over-delivers.",
                match_rules: vec![
                    rule(Trait::PriceElasticity, Attribute::Longevity, 1.0),
                    rule(Trait::DealSeeking, Attribute::Battery, 0.6),
                    rule(Trait::ResaleAwareness, Attribute::Longevity, 0.5),
                    rule(Trait::LongevityExpectation, Attribute::Software, 0.5),
                ],
                stat_traits: vec![
                    ("price sensitivity", Trait::PriceElasticity),
                    ("deal seeking", Trait::DealSeeking),
                    ("resale awareness", Trait::ResaleAwareness),
                ],
            },
            Archetype {
                id: "trend-setter",
                title: "The Trend Setter",
                description: "The phone is part of the outfit; design and novelty carry weight.",
                match_rules: vec![
                    rule(Trait::StatusSignaling, Attribute::Design, 1.0),
                    rule(Trait::DesignSensitivity, Attribute::Design, 0.8),
                    rule(Trait::EarlyAdoption, Attribute::Display, 0.6),
                    rule(Trait::BrandLoyalty, Attribute::Design, 0.3),
                ],
                stat_traits: vec![
                    ("status signaling", Trait::StatusSignaling),
                    ("design taste", Trait::DesignSensitivity),
                    ("early adoption", Trait::EarlyAdoption),
                ],
            },
            Archetype {
                id: "careful-researcher",
                title: "The Careful Researcher",
                description: "Buys once, buys right; durability and update promises settle the vote.",
                match_rules: vec![
                    rule(Trait::RegretAversion, Attribute::Longevity, 1.0),
                    rule(Trait::LongevityExpectation, Attribute::Longevity, 0.8),
                    rule(Trait::ReviewDependence, Attribute::Software, 0.6),
                    rule(Trait::DurabilityConcern, Attribute::Longevity, 0.6),
                ],
                stat_traits: vec![
                    ("regret aversion", Trait::RegretAversion),
                    ("longevity expectation", Trait::LongevityExpectation),
                    ("research depth", Trait::ReviewDependence),
                ],
            },
        ];

        Self { archetypes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_archetype_ids_unique() {
        let catalog = ArchetypeCatalog::standard();
        let ids: HashSet<_> = catalog.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_rules_have_positive_weights() {
        for a in ArchetypeCatalog::standard().iter() {
            assert!(!a.match_rules.is_empty());
            for r in &a.match_rules {
                assert!(r.weight > 0.0, "{} has non-positive rule weight", a.id);
            }
        }
    }

    #[test]
    fn test_declaration_order_is_stable() {
        let catalog = ArchetypeCatalog::standard();
        let first = catalog.iter().next().unwrap();
        assert_eq!(first.id, "power-seeker");
        assert!(catalog.by_id("memory-keeper").is_some());
    }
}
