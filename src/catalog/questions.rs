//! Canonical question catalog
//!
//! Questions are served in the declaration order below. The session state
//! machine walks this list top to bottom and stops early once the profile
//! converges or a dealbreaker answer fires.

use serde::Serialize;

use crate::profile::{AnswerEffect, Ecosystem, HardConstraint, RegretTrigger, Trait, TraitDelta};
use crate::data::Attribute;

/// One selectable answer option
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Stable answer identifier, unique within its question
    pub id: &'static str,
    /// Display text
    pub text: &'static str,
    /// What applying this answer does to the profile
    #[serde(skip)]
    pub effect: AnswerEffect,
    /// Hard constraint this answer records, if any
    #[serde(skip)]
    pub constraint: Option<HardConstraint>,
    /// Dealbreaker answers may end the questionnaire immediately
    /// (policy-controlled, see `Args::dealbreaker_terminates`)
    #[serde(skip)]
    pub dealbreaker: bool,
}

/// A question with its ordered answer options
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Stable question identifier
    pub id: &'static str,
    /// Prompt shown to the user
    pub prompt: &'static str,
    /// Ordered answer options
    pub answers: Vec<Answer>,
}

impl Question {
    /// Look up an answer option by id
    pub fn answer(&self, answer_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }
}

/// The canonical, ordered question list
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Question at a given position in canonical order
    pub fn at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Look up a question by id
    pub fn by_id(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// The standard questionnaire
    pub fn standard() -> Self {
        let nudge = |delta: TraitDelta| AnswerEffect::Adjust { delta };

        let questions = vec![
            Question {
                id: "q-frustration",
                prompt: "What bothers you most about your current phone?",
                answers: vec![
                    Answer {
                        id: "a-lag",
                        text: "It stutters and keeps me waiting",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::LagSensitivity, 0.35)
                                .with(Trait::MultitaskIntensity, 0.2)
                                .with(Trait::ThermalTolerance, -0.15),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-battery-dead",
                        text: "The battery never makes it through the day",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::BatteryAnxiety, 0.4)
                                .with(Trait::ScreenTimeLoad, 0.25)
                                .with(Trait::ChargingDiscipline, -0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-bad-photos",
                        text: "Photos come out worse than the moment deserved",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::CameraReliance, 0.4)
                                .with(Trait::LowLightShooting, 0.25)
                                .with(Trait::RegretAversion, 0.1),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-too-expensive",
                        text: "I paid too much for what I got",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::PriceElasticity, 0.4)
                                .with(Trait::DealSeeking, 0.3)
                                .with(Trait::RegretAversion, 0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
            Question {
                id: "q-ecosystem",
                prompt: "How tied are you to your current platform?",
                answers: vec![
                    Answer {
                        id: "a-locked-ios",
                        text: "All my devices and chats are Apple, I'm not switching",
                        effect: AnswerEffect::AdjustWithLock {
                            delta: TraitDelta::new().with(Trait::BrandLoyalty, 0.3),
                            locks: vec![(Trait::EcosystemAttachment, 1.0)],
                        },
                        constraint: Some(HardConstraint::EcosystemLock {
                            ecosystem: Ecosystem::Ios,
                        }),
                        dealbreaker: true,
                    },
                    Answer {
                        id: "a-locked-android",
                        text: "I'm deep into Android and Google services",
                        effect: AnswerEffect::AdjustWithLock {
                            delta: TraitDelta::new().with(Trait::BrandLoyalty, 0.25),
                            locks: vec![(Trait::EcosystemAttachment, 1.0)],
                        },
                        constraint: Some(HardConstraint::EcosystemLock {
                            ecosystem: Ecosystem::Android,
                        }),
                        dealbreaker: true,
                    },
                    Answer {
                        id: "a-flexible",
                        text: "I'd switch platforms for the right phone",
                        effect: AnswerEffect::AdjustWithLock {
                            delta: TraitDelta::new().with(Trait::EarlyAdoption, 0.15),
                            locks: vec![(Trait::EcosystemAttachment, 0.0)],
                        },
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
            Question {
                id: "q-budget",
                prompt: "What are you comfortable spending?",
                answers: vec![
                    Answer {
                        id: "a-budget-tight",
                        text: "Under 500 - every extra dollar needs to earn its place",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::PriceElasticity, 0.4)
                                .with(Trait::DealSeeking, 0.3)
                                .with(Trait::FinancingComfort, -0.25),
                        ),
                        constraint: Some(HardConstraint::BudgetCeiling { max_price: 500 }),
                        dealbreaker: true,
                    },
                    Answer {
                        id: "a-budget-mid",
                        text: "Up to about 900 for the right phone",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::PriceElasticity, 0.15)
                                .with(Trait::ResaleAwareness, 0.15),
                        ),
                        constraint: Some(HardConstraint::BudgetCeiling { max_price: 900 }),
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-budget-open",
                        text: "Price doesn't matter if it's the best",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::PriceElasticity, -0.4)
                                .with(Trait::StatusSignaling, 0.2)
                                .with(Trait::FinancingComfort, 0.25),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
            Question {
                id: "q-camera-moment",
                prompt: "Your friend's wedding is tomorrow and you can only bring your phone. How do you feel?",
                answers: vec![
                    Answer {
                        id: "a-camera-confident",
                        text: "Great, my phone IS my camera",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::CameraReliance, 0.4)
                                .with(Trait::VideoCreation, 0.25)
                                .with(Trait::SocialSharing, 0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-camera-worried",
                        text: "Nervous - dim reception halls ruin my shots",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::LowLightShooting, 0.4)
                                .with(Trait::CameraReliance, 0.3)
                                .with(Trait::RegretAversion, 0.15),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-camera-indifferent",
                        text: "Someone else will take the photos",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::CameraReliance, -0.35)
                                .with(Trait::SocialSharing, -0.25)
                                .with(Trait::ZoomReach, -0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
            Question {
                id: "q-day-shape",
                prompt: "Which describes a typical day with your phone?",
                answers: vec![
                    Answer {
                        id: "a-day-heavy",
                        text: "Screen on constantly - maps, calls, video, games",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::ScreenTimeLoad, 0.4)
                                .with(Trait::BatteryAnxiety, 0.25)
                                .with(Trait::MultitaskIntensity, 0.25),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-day-travel",
                        text: "Long stretches away from any charger",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::TravelFrequency, 0.4)
                                .with(Trait::BatteryAnxiety, 0.3)
                                .with(Trait::DurabilityConcern, 0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-day-light",
                        text: "Messages and a bit of browsing, nothing heavy",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::ScreenTimeLoad, -0.3)
                                .with(Trait::GamingLoad, -0.3)
                                .with(Trait::PriceElasticity, 0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
            Question {
                id: "q-gaming",
                prompt: "How much do games matter on your phone?",
                answers: vec![
                    Answer {
                        id: "a-gaming-core",
                        text: "A lot - frame drops in a ranked match are unacceptable",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::GamingLoad, 0.45)
                                .with(Trait::LagSensitivity, 0.3)
                                .with(Trait::ThermalTolerance, -0.25),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-gaming-casual",
                        text: "Casual puzzles while commuting",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::GamingLoad, 0.1)
                                .with(Trait::ScreenTimeLoad, 0.1),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-gaming-none",
                        text: "I don't game on my phone",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::GamingLoad, -0.45)
                                .with(Trait::ThermalTolerance, 0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
            Question {
                id: "q-regret",
                prompt: "Which past-purchase outcome would sting the most?",
                answers: vec![
                    Answer {
                        id: "a-regret-battery",
                        text: "Battery degrading to half a day within a year",
                        effect: AnswerEffect::AdjustWithRegretTrigger {
                            delta: TraitDelta::new()
                                .with(Trait::RegretAversion, 0.3)
                                .with(Trait::BatteryAnxiety, 0.25),
                            trigger: RegretTrigger {
                                attribute: Attribute::Battery,
                            },
                        },
                        constraint: Some(HardConstraint::RegretSensitive {
                            attribute: Attribute::Battery,
                        }),
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-regret-camera",
                        text: "Realizing a year of photos all look mediocre",
                        effect: AnswerEffect::AdjustWithRegretTrigger {
                            delta: TraitDelta::new()
                                .with(Trait::RegretAversion, 0.3)
                                .with(Trait::CameraReliance, 0.25),
                            trigger: RegretTrigger {
                                attribute: Attribute::Camera,
                            },
                        },
                        constraint: Some(HardConstraint::RegretSensitive {
                            attribute: Attribute::Camera,
                        }),
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-regret-breakage",
                        text: "The phone falling apart before I planned to replace it",
                        effect: AnswerEffect::AdjustWithRegretTrigger {
                            delta: TraitDelta::new()
                                .with(Trait::RegretAversion, 0.3)
                                .with(Trait::DurabilityConcern, 0.3)
                                .with(Trait::LongevityExpectation, 0.25),
                            trigger: RegretTrigger {
                                attribute: Attribute::Longevity,
                            },
                        },
                        constraint: Some(HardConstraint::RegretSensitive {
                            attribute: Attribute::Longevity,
                        }),
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-regret-none",
                        text: "I don't dwell on purchases once they're made",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::RegretAversion, -0.4)
                                .with(Trait::ReviewDependence, -0.25),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
            Question {
                id: "q-research",
                prompt: "How do you decide on a big purchase?",
                answers: vec![
                    Answer {
                        id: "a-research-deep",
                        text: "Weeks of reviews, spreadsheets and spec comparisons",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::ReviewDependence, 0.4)
                                .with(Trait::RegretAversion, 0.25)
                                .with(Trait::ResaleAwareness, 0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-research-gut",
                        text: "I grab the newest thing that excites me",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::EarlyAdoption, 0.4)
                                .with(Trait::ReviewDependence, -0.3)
                                .with(Trait::StatusSignaling, 0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-research-ask",
                        text: "I buy whatever a trusted friend recommends",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::ReviewDependence, 0.15)
                                .with(Trait::BrandLoyalty, 0.15),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
            Question {
                id: "q-style",
                prompt: "How much does the way a phone looks and feels matter?",
                answers: vec![
                    Answer {
                        id: "a-style-statement",
                        text: "It's the object I handle most - it should turn heads",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::DesignSensitivity, 0.4)
                                .with(Trait::StatusSignaling, 0.35)
                                .with(Trait::AccessoryBudget, 0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-style-case",
                        text: "It lives in a rugged case anyway",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::DesignSensitivity, -0.35)
                                .with(Trait::DurabilityConcern, 0.3),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-style-neutral",
                        text: "Nice to have, not a deciding factor",
                        effect: nudge(TraitDelta::new().with(Trait::DesignSensitivity, 0.05)),
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
            Question {
                id: "q-horizon",
                prompt: "How long do you expect to keep your next phone?",
                answers: vec![
                    Answer {
                        id: "a-horizon-long",
                        text: "Four years or more - it has to age well",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::LongevityExpectation, 0.45)
                                .with(Trait::DurabilityConcern, 0.25)
                                .with(Trait::StorageAppetite, 0.2),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-horizon-upgrade",
                        text: "I trade up every year or two",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::LongevityExpectation, -0.35)
                                .with(Trait::EarlyAdoption, 0.3)
                                .with(Trait::ResaleAwareness, 0.3),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                    Answer {
                        id: "a-horizon-until-dies",
                        text: "Until it stops working, however long that is",
                        effect: nudge(
                            TraitDelta::new()
                                .with(Trait::LongevityExpectation, 0.3)
                                .with(Trait::PriceElasticity, 0.2)
                                .with(Trait::EarlyAdoption, -0.25),
                        ),
                        constraint: None,
                        dealbreaker: false,
                    },
                ],
            },
        ];

        Self { questions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_question_ids_unique() {
        let catalog = QuestionCatalog::standard();
        let ids: HashSet<_> = catalog.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_answer_ids_unique_within_question() {
        for q in QuestionCatalog::standard().iter() {
            let ids: HashSet<_> = q.answers.iter().map(|a| a.id).collect();
            assert_eq!(ids.len(), q.answers.len(), "dupes in {}", q.id);
        }
    }

    #[test]
    fn test_every_question_has_options() {
        for q in QuestionCatalog::standard().iter() {
            assert!(q.answers.len() >= 2, "{} lacks options", q.id);
        }
    }

    #[test]
    fn test_canonical_order_is_stable() {
        let catalog = QuestionCatalog::standard();
        assert_eq!(catalog.at(0).unwrap().id, "q-frustration");
        assert_eq!(catalog.at(1).unwrap().id, "q-ecosystem");
        assert_eq!(catalog.by_id("q-regret").unwrap().id, "q-regret");
    }

    #[test]
    fn test_dealbreakers_carry_constraints() {
        for q in QuestionCatalog::standard().iter() {
            for a in &q.answers {
                if a.dealbreaker {
                    assert!(a.constraint.is_some(), "{}/{} dealbreaker without constraint", q.id, a.id);
                }
            }
        }
    }
}
