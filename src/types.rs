//! Request and result types for the assist intents.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::RawError;
use crate::heuristic::{AnalysisSource, DocumentAnalysis};
use crate::mode::AssistMode;
use crate::selection::TextSelection;

// =============================================================================
// INTENT INPUTS
// =============================================================================

/// How MODIFY should rewrite the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifyKind {
    Rewrite,
    Shorten,
    Expand,
    Formalize,
    Simplify,
    FixGrammar,
    /// Uses the caller's custom prompt.
    Custom,
}

/// A recorded intent, kept so the user can retry it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Prompt { text: String, cursor: usize },
    Continue { cursor: usize, selection: Option<TextSelection>, content: String },
    Modify { text: String, kind: ModifyKind, custom_prompt: Option<String> },
    Analyze { content: String },
}

impl Intent {
    #[must_use]
    pub fn mode(&self) -> AssistMode {
        match self {
            Self::Prompt { .. } => AssistMode::Prompt,
            Self::Continue { .. } => AssistMode::Continue,
            Self::Modify { .. } => AssistMode::Modify,
            Self::Analyze { .. } => AssistMode::Analyze,
        }
    }

    /// Operation name used for classification, logging, and fallback lookup.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.mode().endpoint()
    }

    /// JSON body sent to the backend endpoint.
    #[must_use]
    pub fn request_body(&self) -> Value {
        match self {
            Self::Prompt { text, cursor } => json!({ "prompt": text, "cursor": cursor }),
            Self::Continue { cursor, selection, content } => {
                json!({ "cursor": cursor, "selection": selection, "content": content })
            }
            Self::Modify { text, kind, custom_prompt } => {
                json!({ "text": text, "kind": kind, "custom_prompt": custom_prompt })
            }
            Self::Analyze { content } => json!({ "content": content }),
        }
    }

    /// Text a local fallback would work from.
    #[must_use]
    pub fn source_text(&self) -> &str {
        match self {
            Self::Prompt { text, .. } | Self::Modify { text, .. } => text,
            Self::Continue { content, .. } | Self::Analyze { content } => content,
        }
    }

    /// Validate a backend response for this intent's shape.
    pub fn parse_response(&self, value: Value) -> Result<AssistPayload, RawError> {
        match self {
            Self::Analyze { .. } => {
                let mut analysis: DocumentAnalysis = serde_json::from_value(value)
                    .map_err(|e| RawError::MalformedResponse(format!("analysis response: {e}")))?;
                if analysis.score > 100 {
                    return Err(RawError::MalformedResponse(format!("analysis score {} out of range", analysis.score)));
                }
                analysis.source = AnalysisSource::Ai;
                Ok(AssistPayload::Analysis(analysis))
            }
            _ => {
                let generated: GeneratedText = serde_json::from_value(value)
                    .map_err(|e| RawError::MalformedResponse(format!("{} response: {e}", self.operation())))?;
                if generated.text.trim().is_empty() {
                    return Err(RawError::MalformedResponse(format!("{} response has empty text", self.operation())));
                }
                Ok(AssistPayload::Text(generated))
            }
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedText {
    pub text: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AssistPayload {
    Text(GeneratedText),
    Analysis(DocumentAnalysis),
}

/// Result of one intent, as returned to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistOutcome {
    pub mode: AssistMode,
    pub payload: AssistPayload,
    pub fallback_used: bool,
    pub success: bool,
    /// Network attempts made; zero when a fallback was forced.
    pub attempts: u32,
}

/// Result of a state-mutating call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeOutcome {
    Applied { response: Value },
    Queued { id: uuid::Uuid },
}
