use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Locale assumed when the caller does not send one.
pub const DEFAULT_LOCALE: &str = "ja-JP";

/// Upper bound on `ocr_text`, counted in Unicode scalar values.
pub const MAX_OCR_TEXT_CHARS: usize = 20_000;

pub const MIN_LOCALE_CHARS: usize = 2;
pub const MAX_LOCALE_CHARS: usize = 16;

/// School grade hint supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Nencho,
    Nensho,
    Nenchu,
    Shogaku1,
    Shogaku2,
    Shogaku3,
    Shogaku4,
    Shogaku5,
    Shogaku6,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Nencho => "nencho",
            Grade::Nensho => "nensho",
            Grade::Nenchu => "nenchu",
            Grade::Shogaku1 => "shogaku1",
            Grade::Shogaku2 => "shogaku2",
            Grade::Shogaku3 => "shogaku3",
            Grade::Shogaku4 => "shogaku4",
            Grade::Shogaku5 => "shogaku5",
            Grade::Shogaku6 => "shogaku6",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
}

/// A validated extraction request.
///
/// Only built through [`crate::schema::validate_request`], so `ocr_text`
/// and `locale` are already within bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    pub ocr_text: String,
    pub locale: String,
    pub hint: Option<RequestHint>,
}

impl ExtractRequest {
    pub fn grade(&self) -> Option<Grade> {
        self.hint.as_ref().and_then(|h| h.grade)
    }
}

/// Inclusive `[min, max]` bound on an expected quantity.
///
/// Serialized as a two-element JSON array. Integral floats such as `3.0`
/// are accepted; negative or fractional values are rejected at
/// deserialization time. `min <= max` is checked by the response schema,
/// not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountRange(pub u64, pub u64);

impl<'de> Deserialize<'de> for CountRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [min, max] = <[Number; 2]>::deserialize(deserializer)?;
        Ok(CountRange(
            whole_count(&min).map_err(<D::Error as de::Error>::custom)?,
            whole_count(&max).map_err(<D::Error as de::Error>::custom)?,
        ))
    }
}

/// `u64` from a JSON number that is non-negative with no fractional part.
fn whole_count(n: &Number) -> Result<u64, &'static str> {
    if let Some(v) = n.as_u64() {
        return Ok(v);
    }
    match n.as_f64() {
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
            Ok(v as u64)
        }
        _ => Err("count_range values must be non-negative integers"),
    }
}

impl CountRange {
    pub const ZERO: CountRange = CountRange(0, 0);

    pub fn min(&self) -> u64 {
        self.0
    }

    pub fn max(&self) -> u64 {
        self.1
    }

    pub fn is_ordered(&self) -> bool {
        self.0 <= self.1
    }

    /// Element-wise sum, `None` on overflow.
    pub fn checked_add(&self, other: &CountRange) -> Option<CountRange> {
        Some(CountRange(
            self.0.checked_add(other.0)?,
            self.1.checked_add(other.1)?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidateItem {
    #[serde(default)]
    pub slot: Option<String>,
    pub category: String,
    pub count_range: CountRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    pub categories: Vec<String>,
    pub total_count_range: CountRange,
}

/// Scene as the provider sends it. Extra keys are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidateScene {
    pub categories: Vec<String>,
    pub total_count_range: CountRange,
}

impl From<CandidateScene> for Scene {
    fn from(scene: CandidateScene) -> Self {
        Scene {
            categories: scene.categories,
            total_count_range: scene.total_count_range,
        }
    }
}

/// The provider's structured guess, after schema checks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderCandidate {
    pub template_id: String,
    pub confidence: f64,
    pub items: Vec<CandidateItem>,
    #[serde(default)]
    pub scene: Option<CandidateScene>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationReason {
    Allowed,
    NotAllowedFallback,
    /// Reserved for a many-to-one alias table. Nothing produces it yet.
    AliasMap,
}

impl NormalizationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationReason::Allowed => "allowed",
            NormalizationReason::NotAllowedFallback => "not_allowed_fallback",
            NormalizationReason::AliasMap => "alias_map",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationResult {
    pub raw_template_id: String,
    pub normalized_template_id: String,
    pub reason: NormalizationReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseItem {
    pub slot: String,
    pub category: String,
    pub count_range: CountRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseDebug {
    pub raw_ocr_hash: String,
    pub normalized_text_hash: String,
    pub model: String,
    pub prompt_version: String,
    pub raw_template_id: String,
    pub normalized_template_id: String,
    pub normalization_reason: NormalizationReason,
}

/// The wire contract returned by `POST /extract`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractResponse {
    pub template_id: String,
    pub confidence: f64,
    pub items: Vec<ResponseItem>,
    pub scene: Scene,
    pub debug: ResponseDebug,
}
