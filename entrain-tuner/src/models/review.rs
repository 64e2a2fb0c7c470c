//! Human-review output wire format
//!
//! The external review system writes one JSON document per completed
//! review: the original text shown to the reviewer plus the entity spans
//! the reviewer annotated. Spans reference the original text by character
//! offset; the annotated substring is recovered here rather than trusted
//! from the client.

use serde::{Deserialize, Serialize};

/// Review-completed notification delivered to `POST /review/completed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewNotice {
    /// Identifier of the review flow that produced the output
    pub flow_id: String,
    /// Review status; only `Completed` reviews are processed
    pub status: String,
    /// Object-store key of the review output document
    pub output_location: String,
}

impl ReviewNotice {
    /// Whether this notice is a completed review
    pub fn is_completed(&self) -> bool {
        self.status == "Completed"
    }
}

/// Review output document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutput {
    pub input_content: ReviewInputContent,
    #[serde(default)]
    pub human_answers: Vec<HumanAnswer>,
}

/// Input content echoed back by the review system
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInputContent {
    /// The full text presented to the human reviewer
    pub original_text: String,
}

/// One reviewer's answer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanAnswer {
    pub answer_content: AnswerContent,
}

/// Answer payload wrapping the entity annotation tool output
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerContent {
    #[serde(rename = "crowd-entity-annotation")]
    pub entity_annotation: EntityAnnotation,
}

/// Annotated entity spans
#[derive(Debug, Clone, Deserialize)]
pub struct EntityAnnotation {
    #[serde(default)]
    pub entities: Vec<AnnotatedSpan>,
}

/// One annotated span: character offsets into the original text plus the
/// reviewer-assigned label
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedSpan {
    pub start_offset: usize,
    pub end_offset: usize,
    pub label: String,
}

impl ReviewOutput {
    /// Extract `(span text, uppercase label)` pairs from all answers
    ///
    /// Offsets are interpreted as character positions. Spans with an
    /// empty or out-of-range extent are dropped. Duplicate span texts
    /// collapse to the first-seen annotation, mirroring the dedup-by-text
    /// policy of the entity list itself.
    pub fn annotations(&self) -> Vec<(String, String)> {
        let chars: Vec<char> = self.input_content.original_text.chars().collect();
        let mut out: Vec<(String, String)> = Vec::new();

        for answer in &self.human_answers {
            for span in &answer.answer_content.entity_annotation.entities {
                if span.start_offset >= span.end_offset || span.end_offset > chars.len() {
                    tracing::debug!(
                        start = span.start_offset,
                        end = span.end_offset,
                        "Skipping annotation with invalid span"
                    );
                    continue;
                }
                let text: String = chars[span.start_offset..span.end_offset].iter().collect();
                if out.iter().any(|(t, _)| *t == text) {
                    continue;
                }
                out.push((text, span.label.to_uppercase()));
            }
        }

        out
    }
}
