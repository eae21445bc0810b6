//! Candidate data model and the external store seam
//!
//! Attribute scores and regret statistics are produced by an external
//! review-ingestion pipeline; this engine only reads them. `CandidateStore`
//! is the integration seam; `MemoryCandidateStore` is the shipped in-process
//! implementation, seeded from an embedded catalog for dev and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::profile::Ecosystem;
use crate::types::{EngineError, Result};

/// Number of scored attributes per candidate
pub const ATTRIBUTE_COUNT: usize = 7;

/// One of the 7 fixed candidate attributes, each scored 0-10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Camera,
    Battery,
    Performance,
    Display,
    Software,
    Design,
    Longevity,
}

impl Attribute {
    /// All attributes in canonical declaration order
    pub const ALL: [Attribute; ATTRIBUTE_COUNT] = [
        Attribute::Camera,
        Attribute::Battery,
        Attribute::Performance,
        Attribute::Display,
        Attribute::Software,
        Attribute::Design,
        Attribute::Longevity,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label used in explanations
    pub fn label(self) -> &'static str {
        match self {
            Attribute::Camera => "camera",
            Attribute::Battery => "battery",
            Attribute::Performance => "performance",
            Attribute::Display => "display",
            Attribute::Software => "software",
            Attribute::Design => "design",
            Attribute::Longevity => "longevity",
        }
    }
}

/// Per-candidate attribute scores, each clamped to [0,10]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeScores {
    scores: [f64; ATTRIBUTE_COUNT],
}

impl AttributeScores {
    pub fn new(scores: [f64; ATTRIBUTE_COUNT]) -> Self {
        let mut clamped = scores;
        for s in &mut clamped {
            *s = s.clamp(0.0, 10.0);
        }
        Self { scores: clamped }
    }

    pub fn get(&self, a: Attribute) -> f64 {
        self.scores[a.index()]
    }

    /// Mean across all attributes, the candidate's own quality signal
    pub fn mean(&self) -> f64 {
        self.scores.iter().sum::<f64>() / ATTRIBUTE_COUNT as f64
    }
}

/// How often real users complained about an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComplaintFrequency {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ComplaintFrequency {
    /// True for the buckets that trip regret-sensitive hard constraints
    /// and show up as shortfalls in explanations.
    pub fn is_severe(self) -> bool {
        matches!(self, ComplaintFrequency::High | ComplaintFrequency::VeryHigh)
    }
}

/// Regret statistics for one attribute of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRegret {
    /// Aggregated regret severity in [0,1]
    pub score: f64,
    /// Complaint-frequency bucket
    pub frequency: ComplaintFrequency,
    /// Example complaints from the enrichment pipeline (may be empty)
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Regret statistics for a candidate, keyed by attribute.
/// Attributes without reported regret are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegretData {
    entries: Vec<(Attribute, AttributeRegret)>,
}

impl RegretData {
    pub fn new(entries: Vec<(Attribute, AttributeRegret)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, a: Attribute) -> Option<&AttributeRegret> {
        self.entries.iter().find(|(ea, _)| *ea == a).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &AttributeRegret)> {
        self.entries.iter().map(|(a, r)| (*a, r))
    }
}

/// A phone in the catalog, as supplied by the external data store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Stable item identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Platform ecosystem
    pub ecosystem: Ecosystem,
    /// Price in whole currency units
    pub price: u32,
    /// 7-dimensional attribute score vector
    pub attributes: AttributeScores,
    /// Regret statistics; None when the enrichment pipeline has not
    /// processed this candidate yet
    pub regret: Option<RegretData>,
}

/// Read-only lookup into the external attribute/regret store
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// All candidate ids eligible for scoring
    async fn list_candidate_ids(&self) -> Result<Vec<String>>;

    /// Fetch one candidate's attribute and regret data
    async fn get_candidate_data(&self, id: &str) -> Result<Candidate>;
}

/// In-process candidate store backed by a concurrent map
pub struct MemoryCandidateStore {
    candidates: DashMap<String, Candidate>,
}

impl MemoryCandidateStore {
    pub fn new() -> Self {
        Self {
            candidates: DashMap::new(),
        }
    }

    /// Store seeded with the embedded demo catalog
    pub fn with_seed_catalog() -> Self {
        let store = Self::new();
        for c in seed_catalog() {
            store.insert(c);
        }
        store
    }

    pub fn insert(&self, candidate: Candidate) {
        self.candidates.insert(candidate.id.clone(), candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl Default for MemoryCandidateStore {
    fn default() -> Self {
        Self::with_seed_catalog()
    }
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn list_candidate_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.candidates.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn get_candidate_data(&self, id: &str) -> Result<Candidate> {
        self.candidates
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| EngineError::DataIncomplete(format!("candidate {id} not in store")))
    }
}

/// Embedded demo catalog, standing in for the external enrichment pipeline
fn seed_catalog() -> Vec<Candidate> {
    let regret = |entries: Vec<(Attribute, f64, ComplaintFrequency, &str)>| {
        Some(RegretData::new(
            entries
                .into_iter()
                .map(|(a, score, frequency, example)| {
                    (
                        a,
                        AttributeRegret {
                            score,
                            frequency,
                            examples: vec![example.to_string()],
                        },
                    )
                })
                .collect(),
        ))
    };

    vec![
        Candidate {
            id: "aurora-pro-15".into(),
            name: "Aurora Pro 15".into(),
            ecosystem: Ecosystem::Ios,
            price: 1099,
            attributes: AttributeScores::new([9.4, 7.8, 9.2, 9.0, 9.1, 8.8, 8.9]),
            regret: regret(vec![(
                Attribute::Battery,
                0.35,
                ComplaintFrequency::Moderate,
                "Battery fades noticeably by evening with heavy camera use",
            )]),
        },
        Candidate {
            id: "galactic-ultra-s".into(),
            name: "Galactic Ultra S".into(),
            ecosystem: Ecosystem::Android,
            price: 1199,
            attributes: AttributeScores::new([9.6, 8.2, 9.0, 9.5, 7.9, 8.5, 8.0]),
            regret: regret(vec![(
                Attribute::Software,
                0.4,
                ComplaintFrequency::Moderate,
                "Preinstalled apps and duplicated assistants frustrate some owners",
            )]),
        },
        Candidate {
            id: "pixelcraft-9".into(),
            name: "Pixelcraft 9".into(),
            ecosystem: Ecosystem::Android,
            price: 799,
            attributes: AttributeScores::new([9.1, 7.5, 8.0, 8.4, 9.3, 7.9, 8.2]),
            regret: regret(vec![(
                Attribute::Battery,
                0.55,
                ComplaintFrequency::High,
                "Screen-on time disappoints commuters without midday top-ups",
            )]),
        },
        Candidate {
            id: "endurance-max-5g".into(),
            name: "Endurance Max 5G".into(),
            ecosystem: Ecosystem::Android,
            price: 549,
            attributes: AttributeScores::new([6.8, 9.7, 7.2, 7.5, 7.0, 6.5, 7.8]),
            regret: regret(vec![(
                Attribute::Camera,
                0.6,
                ComplaintFrequency::High,
                "Night shots come out muddy compared to same-price rivals",
            )]),
        },
        Candidate {
            id: "flux-fold-3".into(),
            name: "Flux Fold 3".into(),
            ecosystem: Ecosystem::Android,
            price: 1599,
            attributes: AttributeScores::new([8.2, 6.9, 8.8, 9.6, 8.0, 9.4, 6.2]),
            regret: regret(vec![(
                Attribute::Longevity,
                0.7,
                ComplaintFrequency::VeryHigh,
                "Hinge and crease wear reported within eighteen months",
            )]),
        },
        Candidate {
            id: "essential-se".into(),
            name: "Essential SE".into(),
            ecosystem: Ecosystem::Ios,
            price: 429,
            attributes: AttributeScores::new([7.0, 7.6, 8.1, 6.5, 9.0, 6.8, 8.5]),
            // Enrichment pipeline has not processed this model yet.
            regret: None,
        },
        Candidate {
            id: "value-king-12".into(),
            name: "Value King 12".into(),
            ecosystem: Ecosystem::Android,
            price: 349,
            attributes: AttributeScores::new([6.2, 8.8, 6.9, 7.8, 6.0, 7.1, 6.4]),
            regret: regret(vec![(
                Attribute::Software,
                0.65,
                ComplaintFrequency::High,
                "Only one major OS update promised, ads in system apps",
            )]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_catalog_loads() {
        let store = MemoryCandidateStore::with_seed_catalog();
        assert!(store.len() >= 5);
        let ids = store.list_candidate_ids().await.unwrap();
        assert!(ids.contains(&"aurora-pro-15".to_string()));
        // Deterministic listing order.
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn test_missing_candidate_is_soft_error() {
        let store = MemoryCandidateStore::new();
        let err = store.get_candidate_data("nope").await.unwrap_err();
        assert_eq!(err.code(), "DATA_INCOMPLETE");
    }

    #[test]
    fn test_attribute_scores_clamp() {
        let s = AttributeScores::new([12.0, -3.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        assert_eq!(s.get(Attribute::Camera), 10.0);
        assert_eq!(s.get(Attribute::Battery), 0.0);
    }
}
