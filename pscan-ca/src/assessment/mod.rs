//! Dehydration and throat risk assessment
//!
//! Combines caregiver answers with cry features into a risk level, scores
//! and ordered explanations. Pure and infallible: every well-typed input
//! produces a result.
//!
//! **Algorithm:**
//! 1. Evaluate the rule table ([`rules::RULES`]) to get raw scores and
//!    rule-tier explanations
//! 2. Bucket the dehydration score: ≥4 High, ≥2 Moderate, else Low
//! 3. Throat score ≥3 adds throat-priority explanations
//! 4. Fill fallback explanations when nothing else applies
//! 5. Merge tiers: throat, dehydration, rule, fallback

pub mod answers;
pub mod explanations;
pub mod rules;

use serde::Serialize;
use tracing::debug;

pub use self::answers::{ObservedFeatures, QuestionnaireAnswers, Symptom};
use self::explanations::{Tier, TieredExplanations};

/// Dehydration score at or above which risk is High
pub const HIGH_RISK_SCORE: u32 = 4;
/// Dehydration score at or above which risk is Moderate
pub const MODERATE_RISK_SCORE: u32 = 2;
/// Throat score at or above which throat concerns take priority
pub const THROAT_CONCERN_SCORE: u32 = 3;

const HIGH_RISK_CAUSE: &str = "⚠️ Possible dehydration (multiple indicators)";
const HIGH_RISK_RECOMMENDATION: &str = "⚠️ SEEK MEDICAL ATTENTION PROMPTLY";
const MODERATE_RISK_CAUSE: &str = "⚠️ Possible mild dehydration";
const MODERATE_RISK_RECOMMENDATION: &str = "Contact your pediatrician for guidance";
const THROAT_CAUSE: &str = "⚠️ Possible throat pain/infection";
const THROAT_RECOMMENDATION: &str = "Consider consulting pediatrician about throat symptoms";
const NO_INDICATORS_CAUSE: &str = "No significant dehydration indicators detected";
const DEFAULT_RECOMMENDATION: &str = "Continue normal monitoring";

/// Dehydration risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_score(dehydration_score: u32) -> Self {
        if dehydration_score >= HIGH_RISK_SCORE {
            RiskLevel::High
        } else if dehydration_score >= MODERATE_RISK_SCORE {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

/// Qualitative cry loudness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnergyLevel {
    Low,
    Normal,
    High,
}

impl EnergyLevel {
    pub fn from_energy(average_energy: f64) -> Self {
        if average_energy < 0.005 {
            EnergyLevel::Low
        } else if average_energy < 0.015 {
            EnergyLevel::Normal
        } else {
            EnergyLevel::High
        }
    }
}

/// Qualitative cry continuity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CryConsistency {
    Intermittent,
    Consistent,
}

impl CryConsistency {
    pub fn from_ratio(cry_silence_ratio: f64) -> Self {
        if cry_silence_ratio < 0.5 {
            CryConsistency::Intermittent
        } else {
            CryConsistency::Consistent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CryFeaturesSummary {
    pub energy_level: EnergyLevel,
    pub cry_consistency: CryConsistency,
}

impl CryFeaturesSummary {
    /// Missing features count as 0
    pub fn from_features(features: &ObservedFeatures) -> Self {
        Self {
            energy_level: EnergyLevel::from_energy(features.average_energy.unwrap_or(0.0)),
            cry_consistency: CryConsistency::from_ratio(features.cry_silence_ratio.unwrap_or(0.0)),
        }
    }
}

/// Assessment outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub dehydration_risk: RiskLevel,
    pub dehydration_score: u32,
    pub throat_score: u32,
    pub possible_causes: Vec<String>,
    pub recommendations: Vec<String>,
    pub cry_features_summary: CryFeaturesSummary,
}

/// Assess dehydration and throat risk
///
/// # Arguments
/// * `answers` - Caregiver questionnaire
/// * `features` - Cry features; absent keys never trigger cry rules
///
/// # Returns
/// Scores, risk level, and causes/recommendations in tier order
pub fn assess(answers: &QuestionnaireAnswers, features: &ObservedFeatures) -> AssessmentResult {
    let outcome = rules::evaluate(answers, features);
    let dehydration_risk = RiskLevel::from_score(outcome.dehydration_score);

    let mut causes = TieredExplanations::new();
    let mut recommendations = TieredExplanations::new();
    causes.extend(Tier::Rule, outcome.causes);
    recommendations.extend(Tier::Rule, outcome.recommendations);

    match dehydration_risk {
        RiskLevel::High => {
            causes.push(Tier::Dehydration, HIGH_RISK_CAUSE);
            recommendations.push(Tier::Dehydration, HIGH_RISK_RECOMMENDATION);
        }
        RiskLevel::Moderate => {
            causes.push(Tier::Dehydration, MODERATE_RISK_CAUSE);
            recommendations.push(Tier::Dehydration, MODERATE_RISK_RECOMMENDATION);
        }
        RiskLevel::Low => {
            if !causes.has_tier(Tier::Rule) {
                causes.push(Tier::Fallback, NO_INDICATORS_CAUSE);
            }
        }
    }

    if outcome.throat_score >= THROAT_CONCERN_SCORE {
        causes.push(Tier::Throat, THROAT_CAUSE);
        recommendations.push(Tier::Throat, THROAT_RECOMMENDATION);
    }

    if recommendations.is_empty() {
        recommendations.push(Tier::Fallback, DEFAULT_RECOMMENDATION);
    }

    debug!(
        dehydration_score = outcome.dehydration_score,
        throat_score = outcome.throat_score,
        risk = dehydration_risk.as_str(),
        "Assessment scored"
    );

    AssessmentResult {
        dehydration_risk,
        dehydration_score: outcome.dehydration_score,
        throat_score: outcome.throat_score,
        possible_causes: causes.into_ordered(),
        recommendations: recommendations.into_ordered(),
        cry_features_summary: CryFeaturesSummary::from_features(features),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_buckets() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(3), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(4), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(9), RiskLevel::High);
    }

    #[test]
    fn test_summary_levels() {
        assert_eq!(EnergyLevel::from_energy(0.004), EnergyLevel::Low);
        assert_eq!(EnergyLevel::from_energy(0.005), EnergyLevel::Normal);
        assert_eq!(EnergyLevel::from_energy(0.015), EnergyLevel::High);
        assert_eq!(CryConsistency::from_ratio(0.49), CryConsistency::Intermittent);
        assert_eq!(CryConsistency::from_ratio(0.5), CryConsistency::Consistent);

        let summary = CryFeaturesSummary::from_features(&ObservedFeatures::default());
        assert_eq!(summary.energy_level, EnergyLevel::Low);
        assert_eq!(summary.cry_consistency, CryConsistency::Intermittent);
    }

    #[test]
    fn test_low_risk_with_rule_cause_has_no_fallback_cause() {
        let answers = QuestionnaireAnswers::default().with(Symptom::GasOrColicSigns, "yes");
        let result = assess(&answers, &ObservedFeatures::default());

        assert_eq!(result.dehydration_risk, RiskLevel::Low);
        assert_eq!(result.possible_causes, vec!["Possible gas/colic"]);
        assert_eq!(
            result.recommendations,
            vec!["Try gentle tummy massage or burping techniques"]
        );
    }

    #[test]
    fn test_high_risk_priority_items_lead() {
        let answers = QuestionnaireAnswers::default()
            .with(Symptom::WetDiapers, "0-1")
            .with(Symptom::Vomiting, "yes")
            .with(Symptom::Diarrhea, "yes");
        let result = assess(&answers, &ObservedFeatures::default());

        assert_eq!(result.dehydration_score, 4);
        assert_eq!(result.dehydration_risk, RiskLevel::High);
        assert_eq!(result.possible_causes, vec![HIGH_RISK_CAUSE]);
        assert_eq!(
            result.recommendations,
            vec![
                HIGH_RISK_RECOMMENDATION,
                "Monitor diaper output closely",
                "Ensure adequate fluid intake",
                "Watch for signs of dehydration",
            ]
        );
    }

    #[test]
    fn test_throat_without_dehydration() {
        let answers = QuestionnaireAnswers::default()
            .with(Symptom::PainWhileSwallowing, "yes")
            .with(Symptom::MouthRedness, "yes");
        let result = assess(&answers, &ObservedFeatures::default());

        assert_eq!(result.throat_score, 3);
        assert_eq!(result.dehydration_risk, RiskLevel::Low);
        assert_eq!(result.possible_causes, vec![THROAT_CAUSE, NO_INDICATORS_CAUSE]);
        assert_eq!(result.recommendations, vec![THROAT_RECOMMENDATION]);
    }
}
