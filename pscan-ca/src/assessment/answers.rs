//! Typed questionnaire answers and cry observations
//!
//! Both are parsed leniently: a value of the wrong shape behaves like a
//! missing value instead of rejecting the whole assessment.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::features::CryFeatures;

/// Affirmative answer value
pub const YES: &str = "yes";

/// Questionnaire keys, in questionnaire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symptom {
    WetDiapers,
    Vomiting,
    Diarrhea,
    SleepyOrWeak,
    DryMouth,
    PainWhileSwallowing,
    MouthRedness,
    Fever,
    GasOrColicSigns,
    FeedingDifficulty,
}

impl Symptom {
    pub const ALL: [Symptom; 10] = [
        Symptom::WetDiapers,
        Symptom::Vomiting,
        Symptom::Diarrhea,
        Symptom::SleepyOrWeak,
        Symptom::DryMouth,
        Symptom::PainWhileSwallowing,
        Symptom::MouthRedness,
        Symptom::Fever,
        Symptom::GasOrColicSigns,
        Symptom::FeedingDifficulty,
    ];

    /// Wire name of the key
    pub fn key(&self) -> &'static str {
        match self {
            Symptom::WetDiapers => "wet_diapers",
            Symptom::Vomiting => "vomiting",
            Symptom::Diarrhea => "diarrhea",
            Symptom::SleepyOrWeak => "sleepy_or_weak",
            Symptom::DryMouth => "dry_mouth",
            Symptom::PainWhileSwallowing => "pain_while_swallowing",
            Symptom::MouthRedness => "mouth_redness",
            Symptom::Fever => "fever",
            Symptom::GasOrColicSigns => "gas_or_colic_signs",
            Symptom::FeedingDifficulty => "feeding_difficulty",
        }
    }
}

/// Caregiver questionnaire
///
/// `wet_diapers` holds a count band (`"0-1"`, `"2-3"`, `"4-6"`, `"6+"`);
/// every other key holds `"yes"` or `"no"`. Values are compared exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionnaireAnswers {
    #[serde(default, deserialize_with = "lenient_answer")]
    pub wet_diapers: Option<String>,
    #[serde(default, deserialize_with = "lenient_answer")]
    pub vomiting: Option<String>,
    #[serde(default, deserialize_with = "lenient_answer")]
    pub diarrhea: Option<String>,
    #[serde(default, deserialize_with = "lenient_answer")]
    pub sleepy_or_weak: Option<String>,
    #[serde(default, deserialize_with = "lenient_answer")]
    pub dry_mouth: Option<String>,
    #[serde(default, deserialize_with = "lenient_answer")]
    pub pain_while_swallowing: Option<String>,
    #[serde(default, deserialize_with = "lenient_answer")]
    pub mouth_redness: Option<String>,
    #[serde(default, deserialize_with = "lenient_answer")]
    pub fever: Option<String>,
    #[serde(default, deserialize_with = "lenient_answer")]
    pub gas_or_colic_signs: Option<String>,
    #[serde(default, deserialize_with = "lenient_answer")]
    pub feeding_difficulty: Option<String>,
}

impl QuestionnaireAnswers {
    fn slot(&self, symptom: Symptom) -> &Option<String> {
        match symptom {
            Symptom::WetDiapers => &self.wet_diapers,
            Symptom::Vomiting => &self.vomiting,
            Symptom::Diarrhea => &self.diarrhea,
            Symptom::SleepyOrWeak => &self.sleepy_or_weak,
            Symptom::DryMouth => &self.dry_mouth,
            Symptom::PainWhileSwallowing => &self.pain_while_swallowing,
            Symptom::MouthRedness => &self.mouth_redness,
            Symptom::Fever => &self.fever,
            Symptom::GasOrColicSigns => &self.gas_or_colic_signs,
            Symptom::FeedingDifficulty => &self.feeding_difficulty,
        }
    }

    fn slot_mut(&mut self, symptom: Symptom) -> &mut Option<String> {
        match symptom {
            Symptom::WetDiapers => &mut self.wet_diapers,
            Symptom::Vomiting => &mut self.vomiting,
            Symptom::Diarrhea => &mut self.diarrhea,
            Symptom::SleepyOrWeak => &mut self.sleepy_or_weak,
            Symptom::DryMouth => &mut self.dry_mouth,
            Symptom::PainWhileSwallowing => &mut self.pain_while_swallowing,
            Symptom::MouthRedness => &mut self.mouth_redness,
            Symptom::Fever => &mut self.fever,
            Symptom::GasOrColicSigns => &mut self.gas_or_colic_signs,
            Symptom::FeedingDifficulty => &mut self.feeding_difficulty,
        }
    }

    pub fn get(&self, symptom: Symptom) -> Option<&str> {
        self.slot(symptom).as_deref()
    }

    pub fn is_yes(&self, symptom: Symptom) -> bool {
        self.get(symptom) == Some(YES)
    }

    pub fn set(&mut self, symptom: Symptom, value: impl Into<String>) {
        *self.slot_mut(symptom) = Some(value.into());
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, symptom: Symptom, value: impl Into<String>) -> Self {
        self.set(symptom, value);
        self
    }

    /// Keys answered `"yes"`, in questionnaire order, excluding `wet_diapers`
    pub fn affirmed(&self) -> Vec<&'static str> {
        Symptom::ALL
            .iter()
            .filter(|&&s| s != Symptom::WetDiapers && self.is_yes(s))
            .map(Symptom::key)
            .collect()
    }
}

/// Cry features as received by the assessor; any key may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ObservedFeatures {
    #[serde(default, deserialize_with = "lenient_number")]
    pub average_energy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub energy_variation: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cry_silence_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_pitch: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub duration_seconds: Option<f64>,
}

impl From<&CryFeatures> for ObservedFeatures {
    fn from(features: &CryFeatures) -> Self {
        Self {
            average_energy: Some(features.average_energy),
            energy_variation: Some(features.energy_variation),
            cry_silence_ratio: Some(features.cry_silence_ratio),
            avg_pitch: Some(features.avg_pitch),
            duration_seconds: Some(features.duration_seconds),
        }
    }
}

/// Strings are kept, integers become their decimal text, anything else is absent
fn lenient_answer<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    })
}

/// Finite JSON numbers only
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    })
}
