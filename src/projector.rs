// Response projector
//
// Pure mapping from a CorrectionResult plus the explanation language into a
// render tree. No I/O, no UI toolkit: front-ends materialize the tree.

use crate::correction::CorrectionResult;
use crate::language::{display_name_for_code, Language};
use serde::Serialize;

pub const NO_ERRORS_NOTICE: &str = "Looks great! No errors found.";
pub const TURN_FAILED_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";
pub const TRANSLATION_FAILED_MESSAGE: &str = "Sorry, translation failed. Please try again.";
pub const REWRITE_LABEL_PREFIX: &str = "Rewrite: ";

pub const UNRECOGNIZED_TITLE: &str = "I Didn't Understand That";
pub const UNRECOGNIZED_LEAD: &str =
    "It looks like you entered text that doesn't form a coherent sentence.";
pub const UNRECOGNIZED_TIPS_HEADING: &str = "Tips for better analysis:";
pub const UNRECOGNIZED_TIPS: [&str; 4] = [
    "Ensure your text has proper words and sentence structure",
    "Avoid random characters or keyboard smashing",
    "Use complete sentences with subjects and verbs",
    "Check for typos before submitting",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffView {
    /// Original and corrected only differ by case (or not at all).
    Unchanged { text: String },
    Changed { original: String, corrected: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorCard {
    pub wrong: String,
    pub correct: String,
    pub explanation: String,
    pub tense_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExplanationBody {
    NoErrors,
    Cards(Vec<ErrorCard>),
    /// Explanations are being fetched again in another language.
    Loading(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationBlock {
    pub label: String,
    pub text: String,
}

/// The part of a response that is swapped out when the explanation
/// language changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationRegion {
    pub language: String,
    pub body: ExplanationBody,
    pub translation: Option<TranslationBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Formal,
    Informal,
    Polite,
    Prediction,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Formal => "Formal",
            ActionKind::Informal => "Informal",
            ActionKind::Polite => "Polite",
            ActionKind::Prediction => "Suggest Next",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionButton {
    pub kind: ActionKind,
    pub text: String,
}

impl ActionButton {
    /// Text of the user turn appended when this button is selected.
    pub fn turn_label(&self) -> String {
        format!("{}{}", REWRITE_LABEL_PREFIX, self.kind.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    pub diff: DiffView,
    pub explanations: ExplanationRegion,
    pub actions: Vec<ActionButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
    pub selected: bool,
}

pub fn project(result: &CorrectionResult, language: &str) -> RenderTree {
    RenderTree {
        diff: project_diff(&result.original, &result.corrected),
        explanations: project_explanations(result, language),
        actions: project_actions(result),
    }
}

pub fn project_diff(original: &str, corrected: &str) -> DiffView {
    if original.to_lowercase() == corrected.to_lowercase() {
        DiffView::Unchanged {
            text: corrected.to_string(),
        }
    } else {
        DiffView::Changed {
            original: original.to_string(),
            corrected: corrected.to_string(),
        }
    }
}

pub fn project_explanations(result: &CorrectionResult, language: &str) -> ExplanationRegion {
    let body = if result.errors.is_empty() {
        ExplanationBody::NoErrors
    } else {
        ExplanationBody::Cards(
            result
                .errors
                .iter()
                .map(|issue| ErrorCard {
                    wrong: issue.wrong.clone(),
                    correct: issue.correct.clone(),
                    explanation: issue.explanation.clone(),
                    tense_note: non_empty(issue.tense_explanation.as_deref()),
                })
                .collect(),
        )
    };

    let translation = non_empty(result.translation.as_deref()).map(|text| TranslationBlock {
        label: format!("Full Meaning in {}", display_name_for_code(language)),
        text,
    });

    ExplanationRegion {
        language: language.to_string(),
        body,
        translation,
    }
}

/// Formal, Informal, Polite, then Suggest Next. Empty texts get no button.
pub fn project_actions(result: &CorrectionResult) -> Vec<ActionButton> {
    let mut actions = Vec::new();
    if let Some(rewrites) = &result.rewrites {
        for (kind, text) in [
            (ActionKind::Formal, &rewrites.formal),
            (ActionKind::Informal, &rewrites.informal),
            (ActionKind::Polite, &rewrites.polite),
        ] {
            if !text.trim().is_empty() {
                actions.push(ActionButton {
                    kind,
                    text: text.clone(),
                });
            }
        }
    }
    if let Some(prediction) = non_empty(result.prediction.as_deref()) {
        actions.push(ActionButton {
            kind: ActionKind::Prediction,
            text: prediction,
        });
    }
    actions
}

/// Options for a per-response language selector.
pub fn language_options(selected: &str) -> Vec<LanguageOption> {
    Language::ALL
        .iter()
        .map(|lang| LanguageOption {
            code: lang.code(),
            name: lang.display_name(),
            selected: lang.code() == selected,
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}
