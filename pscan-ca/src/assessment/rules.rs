//! Scoring rule table
//!
//! Rules fire independently and are evaluated in table order; that order
//! is the order of rule-tier causes and recommendations in the result.

use super::answers::{ObservedFeatures, QuestionnaireAnswers, Symptom, YES};

/// Weak cry: mean energy below this...
pub const WEAK_CRY_ENERGY: f64 = 0.005;
/// ...and active-cry ratio below this
pub const WEAK_CRY_RATIO: f64 = 0.4;
/// Intense cry: mean energy above this...
pub const INTENSE_CRY_ENERGY: f64 = 0.015;
/// ...and energy variation above this
pub const INTENSE_CRY_VARIATION: f64 = 0.01;

/// Condition under which a rule fires
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Answer equals one of the listed values exactly
    Answer(Symptom, &'static [&'static str]),
    /// Quiet, mostly silent crying; needs both energy and ratio
    WeakCry,
    /// Loud, strongly varying crying; needs both energy and variation
    IntenseCry,
}

impl Trigger {
    pub fn fires(&self, answers: &QuestionnaireAnswers, features: &ObservedFeatures) -> bool {
        match *self {
            Trigger::Answer(symptom, accepted) => answers
                .get(symptom)
                .is_some_and(|value| accepted.iter().any(|a| *a == value)),
            Trigger::WeakCry => match (features.average_energy, features.cry_silence_ratio) {
                (Some(energy), Some(ratio)) => energy < WEAK_CRY_ENERGY && ratio < WEAK_CRY_RATIO,
                _ => false,
            },
            Trigger::IntenseCry => match (features.average_energy, features.energy_variation) {
                (Some(energy), Some(variation)) => {
                    energy > INTENSE_CRY_ENERGY && variation > INTENSE_CRY_VARIATION
                }
                _ => false,
            },
        }
    }
}

/// Score contribution of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Points {
    Dehydration(u32),
    Throat(u32),
    Unscored,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub trigger: Trigger,
    pub points: Points,
    pub cause: Option<&'static str>,
    pub recommendation: Option<&'static str>,
}

const fn answer(symptom: Symptom, accepted: &'static [&'static str]) -> Trigger {
    Trigger::Answer(symptom, accepted)
}

const AFFIRMATIVE: &[&str] = &[YES];

/// Ordered rule table
pub static RULES: [Rule; 13] = [
    // Dehydration
    Rule {
        trigger: answer(Symptom::WetDiapers, &["0-1", "0", "1"]),
        points: Points::Dehydration(2),
        cause: None,
        recommendation: Some("Monitor diaper output closely"),
    },
    Rule {
        trigger: answer(Symptom::WetDiapers, &["2-3"]),
        points: Points::Dehydration(1),
        cause: None,
        recommendation: None,
    },
    Rule {
        trigger: answer(Symptom::Vomiting, AFFIRMATIVE),
        points: Points::Dehydration(1),
        cause: None,
        recommendation: Some("Ensure adequate fluid intake"),
    },
    Rule {
        trigger: answer(Symptom::Diarrhea, AFFIRMATIVE),
        points: Points::Dehydration(1),
        cause: None,
        recommendation: Some("Watch for signs of dehydration"),
    },
    Rule {
        trigger: answer(Symptom::SleepyOrWeak, AFFIRMATIVE),
        points: Points::Dehydration(1),
        cause: None,
        recommendation: Some("Monitor baby's activity level"),
    },
    Rule {
        trigger: answer(Symptom::DryMouth, AFFIRMATIVE),
        points: Points::Dehydration(1),
        cause: None,
        recommendation: None,
    },
    Rule {
        trigger: Trigger::WeakCry,
        points: Points::Dehydration(1),
        cause: Some("Weak cry pattern detected (may indicate low energy)"),
        recommendation: None,
    },
    // Throat
    Rule {
        trigger: answer(Symptom::PainWhileSwallowing, AFFIRMATIVE),
        points: Points::Throat(2),
        cause: None,
        recommendation: None,
    },
    Rule {
        trigger: answer(Symptom::MouthRedness, AFFIRMATIVE),
        points: Points::Throat(1),
        cause: None,
        recommendation: None,
    },
    Rule {
        trigger: answer(Symptom::Fever, AFFIRMATIVE),
        points: Points::Throat(1),
        cause: None,
        recommendation: Some("Monitor temperature regularly"),
    },
    Rule {
        trigger: Trigger::IntenseCry,
        points: Points::Throat(1),
        cause: Some("Intense cry pattern detected (may indicate discomfort/pain)"),
        recommendation: None,
    },
    // Unscored observations
    Rule {
        trigger: answer(Symptom::GasOrColicSigns, AFFIRMATIVE),
        points: Points::Unscored,
        cause: Some("Possible gas/colic"),
        recommendation: Some("Try gentle tummy massage or burping techniques"),
    },
    Rule {
        trigger: answer(Symptom::FeedingDifficulty, AFFIRMATIVE),
        points: Points::Unscored,
        cause: Some("Feeding difficulties reported"),
        recommendation: Some("Consult pediatrician about feeding concerns"),
    },
];

/// Raw scores and rule-tier explanations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub dehydration_score: u32,
    pub throat_score: u32,
    pub causes: Vec<&'static str>,
    pub recommendations: Vec<&'static str>,
}

/// Apply every rule in table order
pub fn evaluate(answers: &QuestionnaireAnswers, features: &ObservedFeatures) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();

    for rule in RULES.iter().filter(|r| r.trigger.fires(answers, features)) {
        match rule.points {
            Points::Dehydration(points) => outcome.dehydration_score += points,
            Points::Throat(points) => outcome.throat_score += points,
            Points::Unscored => {}
        }
        outcome.causes.extend(rule.cause);
        outcome.recommendations.extend(rule.recommendation);
    }

    outcome
}
