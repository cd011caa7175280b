use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionRequest {
    pub text: String,
    pub language: String,
}

impl CorrectionRequest {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarIssue {
    #[serde(default, deserialize_with = "null_as_default")]
    pub wrong: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tense_explanation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rewrites {
    #[serde(default, deserialize_with = "null_as_default")]
    pub formal: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub informal: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub polite: String,
}

/// Structured answer from the correction service. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub original: String,
    pub corrected: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<GrammarIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrites: Option<Rewrites>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl CorrectionResult {
    /// A result with no findings, mostly useful for tests and fakes.
    pub fn unchanged(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            original: text.clone(),
            corrected: text,
            errors: Vec::new(),
            rewrites: None,
            prediction: None,
            translation: None,
        }
    }
}
