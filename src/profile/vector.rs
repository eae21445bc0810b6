//! Trait vector math
//!
//! All functions here are pure and total: out-of-range inputs are clamped,
//! never rejected. The session state machine owns when these run; nothing in
//! this module blocks or suspends.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::delta::TraitDelta;
use super::Trait;

/// Number of psychographic dimensions in a profile
pub const TRAIT_COUNT: usize = 28;

/// Default entropy threshold below which a profile counts as converged
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.3;

/// A complete psychographic profile: every trait always present, every value
/// always in [0,1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitVector {
    values: [f64; TRAIT_COUNT],
}

impl TraitVector {
    /// The neutral prior: every trait at 0.5
    pub fn neutral() -> Self {
        Self {
            values: [0.5; TRAIT_COUNT],
        }
    }

    /// Value of a single trait
    pub fn get(&self, t: Trait) -> f64 {
        self.values[t.index()]
    }

    /// Return a copy with one trait forced to a clamped value.
    /// Used for posterior locks, which bypass additive blending.
    pub fn with_locked(&self, t: Trait, value: f64) -> Self {
        let mut next = *self;
        next.values[t.index()] = value.clamp(0.0, 1.0);
        next
    }

    /// Apply a delta, returning a new vector. Each adjusted trait is clamped
    /// to [0,1] at this step; deltas across a session are cumulative and
    /// clamped per application, not summed then clamped once.
    pub fn apply_delta(&self, delta: &TraitDelta) -> Self {
        let mut next = *self;
        for (t, d) in delta.adjustments() {
            let i = t.index();
            next.values[i] = (next.values[i] + d).clamp(0.0, 1.0);
        }
        next
    }

    /// How undecided the profile still is, in [0,1].
    ///
    /// 1.0 means every trait sits at the neutral prior; 0.0 means every trait
    /// has been pushed all the way to an extreme. Computed as
    /// `1 - 2 * mean(|v - 0.5|)`.
    pub fn entropy(&self) -> f64 {
        let mean_dev: f64 =
            self.values.iter().map(|v| (v - 0.5).abs()).sum::<f64>() / TRAIT_COUNT as f64;
        1.0 - 2.0 * mean_dev
    }

    /// Early-stop signal: true once entropy drops below the threshold
    pub fn has_converged(&self, threshold: f64) -> bool {
        self.entropy() < threshold
    }

    /// Snapshot as an ordered trait -> value map, for wire/debug output
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        Trait::ALL
            .iter()
            .map(|t| {
                let key = serde_json::to_value(t)
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default();
                (key, self.get(*t))
            })
            .collect()
    }
}

impl Default for TraitVector {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Serialize for TraitVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TraitVector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Unknown keys are ignored; missing traits stay at the neutral prior.
        let map: BTreeMap<Trait, f64> = BTreeMap::deserialize(deserializer)?;
        let mut v = TraitVector::neutral();
        for (t, value) in map {
            v.values[t.index()] = value.clamp(0.0, 1.0);
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_entropy_is_one() {
        assert!((TraitVector::neutral().entropy() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_vector_entropy_is_zero() {
        let mut v = TraitVector::neutral();
        for (i, t) in Trait::ALL.iter().enumerate() {
            v = v.with_locked(*t, if i % 2 == 0 { 0.0 } else { 1.0 });
        }
        assert!(v.entropy().abs() < 1e-12);
    }

    #[test]
    fn test_apply_empty_delta_is_identity() {
        let v = TraitVector::neutral();
        assert_eq!(v.apply_delta(&TraitDelta::new()), v);
    }

    #[test]
    fn test_single_delta_moves_one_trait_only() {
        let v = TraitVector::neutral()
            .apply_delta(&TraitDelta::new().with(Trait::CameraReliance, 0.4));
        assert!((v.get(Trait::CameraReliance) - 0.9).abs() < 1e-12);
        for t in Trait::ALL {
            if t != Trait::CameraReliance {
                assert!((v.get(t) - 0.5).abs() < 1e-12, "{:?} moved", t);
            }
        }
    }

    #[test]
    fn test_delta_clamps_at_one() {
        let v = TraitVector::neutral()
            .apply_delta(&TraitDelta::new().with(Trait::CameraReliance, 0.9));
        assert!((v.get(Trait::CameraReliance) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_delta_clamps_at_zero() {
        let v = TraitVector::neutral()
            .apply_delta(&TraitDelta::new().with(Trait::PriceElasticity, -0.8));
        assert_eq!(v.get(Trait::PriceElasticity), 0.0);
    }

    #[test]
    fn test_values_stay_in_range_under_any_delta_sequence() {
        let deltas = [
            TraitDelta::new().with(Trait::GamingLoad, 0.7),
            TraitDelta::new().with(Trait::GamingLoad, 0.7),
            TraitDelta::new().with(Trait::GamingLoad, -2.5),
            TraitDelta::new()
                .with(Trait::BatteryAnxiety, 0.3)
                .with(Trait::GamingLoad, 0.1),
        ];
        let mut v = TraitVector::neutral();
        for d in &deltas {
            v = v.apply_delta(d);
            for t in Trait::ALL {
                assert!((0.0..=1.0).contains(&v.get(t)));
            }
        }
    }

    #[test]
    fn test_cumulative_clamp_per_step_not_once() {
        // +0.7 then -0.3 clamps to 1.0 first, landing on 0.7;
        // a single summed +0.4 would land on 0.9.
        let v = TraitVector::neutral()
            .apply_delta(&TraitDelta::new().with(Trait::StatusSignaling, 0.7))
            .apply_delta(&TraitDelta::new().with(Trait::StatusSignaling, -0.3));
        assert!((v.get(Trait::StatusSignaling) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_has_converged_matches_entropy_threshold() {
        let v = TraitVector::neutral();
        assert!(!v.has_converged(DEFAULT_CONVERGENCE_THRESHOLD));
        assert!(v.has_converged(1.01));
        // Exact boundary: strict less-than.
        assert!(!v.has_converged(v.entropy()));
    }

    #[test]
    fn test_serde_round_trip() {
        let v = TraitVector::neutral().apply_delta(
            &TraitDelta::new()
                .with(Trait::CameraReliance, 0.3)
                .with(Trait::PriceElasticity, -0.2),
        );
        let json = serde_json::to_string(&v).unwrap();
        let back: TraitVector = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
