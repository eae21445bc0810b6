//! Trait deltas and answer effects
//!
//! A `TraitDelta` is the numeric payload of an answered question: a partial
//! map of signed adjustments. The two out-of-band signals a delta can carry
//! (posterior lock, regret trigger) are modeled as an explicit sum type,
//! `AnswerEffect`, so the state machine's special-case branches are exhaustive.

use serde::{Deserialize, Serialize};

use crate::data::Attribute;

use super::Trait;

/// Partial map of signed trait adjustments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitDelta {
    adjustments: Vec<(Trait, f64)>,
}

impl TraitDelta {
    /// Empty delta (identity under application)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: add or replace an adjustment for one trait
    pub fn with(mut self, t: Trait, d: f64) -> Self {
        if let Some(entry) = self.adjustments.iter_mut().find(|(et, _)| *et == t) {
            entry.1 = d;
        } else {
            self.adjustments.push((t, d));
        }
        self
    }

    /// Iterate adjustments in insertion order
    pub fn adjustments(&self) -> impl Iterator<Item = (Trait, f64)> + '_ {
        self.adjustments.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty()
    }
}

/// An answer signaling strong anticipated dissatisfaction with one candidate
/// attribute. Recorded on the session and used downstream to exclude
/// candidates with high complaint frequency on that attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegretTrigger {
    /// The attribute the user cannot afford to regret
    pub attribute: Attribute,
}

/// What applying an answer does to the session
///
/// The lock and trigger variants still carry a plain delta for the traits
/// they do not address; locks bypass additive blending entirely for the
/// traits they name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnswerEffect {
    /// Ordinary nudge: additive, clamped per step
    Adjust { delta: TraitDelta },
    /// Posterior lock: the named traits are forced directly to the given
    /// values, overriding prior uncertainty
    AdjustWithLock {
        delta: TraitDelta,
        locks: Vec<(Trait, f64)>,
    },
    /// Nudge plus a recorded regret trigger for downstream filtering
    AdjustWithRegretTrigger {
        delta: TraitDelta,
        trigger: RegretTrigger,
    },
}

impl AnswerEffect {
    /// The plain-delta part of the effect, regardless of variant
    pub fn delta(&self) -> &TraitDelta {
        match self {
            AnswerEffect::Adjust { delta } => delta,
            AnswerEffect::AdjustWithLock { delta, .. } => delta,
            AnswerEffect::AdjustWithRegretTrigger { delta, .. } => delta,
        }
    }
}

/// A hard constraint recorded during the session, applied as a candidate
/// filter at scoring time. Boolean facts, not score inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HardConstraint {
    /// Only candidates in this ecosystem are eligible
    EcosystemLock { ecosystem: Ecosystem },
    /// Only candidates at or below this price (whole currency units)
    BudgetCeiling { max_price: u32 },
    /// Exclude candidates with high complaint frequency on this attribute
    RegretSensitive { attribute: Attribute },
}

/// Platform ecosystem a candidate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ecosystem {
    Ios,
    Android,
}
