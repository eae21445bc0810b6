//! Psychographic trait model
//!
//! The user profile is a vector over a closed set of 28 semantic dimensions.
//! The set is fixed at compile time: a `Trait` is an enum, the vector is an
//! enum-indexed array, and a misspelled dimension is a build error rather than
//! a silently ignored map key.
//!
//! Traits cluster into six named groups. Groups are metadata for UI and debug
//! summaries only; no update or scoring semantics hang off them.

pub mod delta;
pub mod vector;

pub use delta::{AnswerEffect, Ecosystem, HardConstraint, RegretTrigger, TraitDelta};
pub use vector::{TraitVector, DEFAULT_CONVERGENCE_THRESHOLD, TRAIT_COUNT};

use serde::{Deserialize, Serialize};

/// One of the 28 fixed psychographic dimensions, each valued in [0,1]
/// with 0.5 as the neutral prior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trait {
    // Performance & responsiveness
    LagSensitivity,
    MultitaskIntensity,
    GamingLoad,
    ThermalTolerance,
    StorageAppetite,
    // Battery & endurance
    BatteryAnxiety,
    ChargingDiscipline,
    TravelFrequency,
    ScreenTimeLoad,
    // Camera & creation
    CameraReliance,
    LowLightShooting,
    VideoCreation,
    ZoomReach,
    SocialSharing,
    // Budget & value
    PriceElasticity,
    DealSeeking,
    ResaleAwareness,
    FinancingComfort,
    AccessoryBudget,
    // Identity & ecosystem
    BrandLoyalty,
    EcosystemAttachment,
    StatusSignaling,
    DesignSensitivity,
    // Risk & regret
    RegretAversion,
    ReviewDependence,
    EarlyAdoption,
    DurabilityConcern,
    LongevityExpectation,
}

impl Trait {
    /// All traits in canonical declaration order. This order defines the
    /// vector layout; never reorder without migrating stored profiles.
    pub const ALL: [Trait; TRAIT_COUNT] = [
        Trait::LagSensitivity,
        Trait::MultitaskIntensity,
        Trait::GamingLoad,
        Trait::ThermalTolerance,
        Trait::StorageAppetite,
        Trait::BatteryAnxiety,
        Trait::ChargingDiscipline,
        Trait::TravelFrequency,
        Trait::ScreenTimeLoad,
        Trait::CameraReliance,
        Trait::LowLightShooting,
        Trait::VideoCreation,
        Trait::ZoomReach,
        Trait::SocialSharing,
        Trait::PriceElasticity,
        Trait::DealSeeking,
        Trait::ResaleAwareness,
        Trait::FinancingComfort,
        Trait::AccessoryBudget,
        Trait::BrandLoyalty,
        Trait::EcosystemAttachment,
        Trait::StatusSignaling,
        Trait::DesignSensitivity,
        Trait::RegretAversion,
        Trait::ReviewDependence,
        Trait::EarlyAdoption,
        Trait::DurabilityConcern,
        Trait::LongevityExpectation,
    ];

    /// Index into the vector array
    pub fn index(self) -> usize {
        self as usize
    }

    /// The group this trait belongs to
    pub fn group(self) -> TraitGroup {
        use Trait::*;
        match self {
            LagSensitivity | MultitaskIntensity | GamingLoad | ThermalTolerance
            | StorageAppetite => TraitGroup::Performance,
            BatteryAnxiety | ChargingDiscipline | TravelFrequency | ScreenTimeLoad => {
                TraitGroup::Endurance
            }
            CameraReliance | LowLightShooting | VideoCreation | ZoomReach | SocialSharing => {
                TraitGroup::Capture
            }
            PriceElasticity | DealSeeking | ResaleAwareness | FinancingComfort
            | AccessoryBudget => TraitGroup::Value,
            BrandLoyalty | EcosystemAttachment | StatusSignaling | DesignSensitivity => {
                TraitGroup::Identity
            }
            RegretAversion | ReviewDependence | EarlyAdoption | DurabilityConcern
            | LongevityExpectation => TraitGroup::Assurance,
        }
    }
}

/// Named cluster of traits, used for UI/debug summaries only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraitGroup {
    Performance,
    Endurance,
    Capture,
    Value,
    Identity,
    Assurance,
}

impl TraitGroup {
    /// All six groups in declaration order
    pub const ALL: [TraitGroup; 6] = [
        TraitGroup::Performance,
        TraitGroup::Endurance,
        TraitGroup::Capture,
        TraitGroup::Value,
        TraitGroup::Identity,
        TraitGroup::Assurance,
    ];

    /// Human-readable description for debug summaries
    pub fn description(self) -> &'static str {
        match self {
            TraitGroup::Performance => "Responsiveness, multitasking and gaming demands",
            TraitGroup::Endurance => "Battery stress, charging habits and time away from outlets",
            TraitGroup::Capture => "Photo and video reliance, sharing and low-light needs",
            TraitGroup::Value => "Price sensitivity, deal seeking and resale awareness",
            TraitGroup::Identity => "Brand attachment, ecosystem lock-in and design taste",
            TraitGroup::Assurance => "Regret aversion, research depth and longevity expectations",
        }
    }

    /// Traits belonging to this group, in canonical order
    pub fn traits(self) -> Vec<Trait> {
        Trait::ALL.iter().copied().filter(|t| t.group() == self).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_traits_have_unique_indices() {
        let mut seen = [false; TRAIT_COUNT];
        for t in Trait::ALL {
            assert!(!seen[t.index()], "duplicate index for {:?}", t);
            seen[t.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_groups_partition_the_trait_set() {
        let total: usize = TraitGroup::ALL.iter().map(|g| g.traits().len()).sum();
        assert_eq!(total, TRAIT_COUNT);
    }

    #[test]
    fn test_trait_serializes_camel_case() {
        let json = serde_json::to_string(&Trait::CameraReliance).unwrap();
        assert_eq!(json, "\"cameraReliance\"");
    }
}
