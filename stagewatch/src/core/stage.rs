//! The fixed pipeline stage table.
//!
//! Stages are identified by substring matches against event labels. This
//! table is the only place the mapping from server vocabulary to stages is
//! defined.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::vocabulary::{steps, DOCUMENT_UPLOADED, RUN_COMPLETED};

/// Identifier of one of the four pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Document intake and persistence.
    Upload,
    /// Text recognition.
    Ocr,
    /// Language analysis and field extraction.
    Nlp,
    /// Business-rule decision.
    Decision,
}

impl StageId {
    /// All stages in pipeline order.
    pub const ALL: [Self; 4] = [Self::Upload, Self::Ocr, Self::Nlp, Self::Decision];

    /// Returns the position of the stage in the pipeline.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Upload => 0,
            Self::Ocr => 1,
            Self::Nlp => 2,
            Self::Decision => 3,
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::Ocr => write!(f, "ocr"),
            Self::Nlp => write!(f, "nlp"),
            Self::Decision => write!(f, "decision"),
        }
    }
}

/// Static description of a pipeline stage and how to recognize its events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageDefinition {
    /// The stage id.
    pub id: StageId,
    /// Display label.
    pub label: &'static str,
    /// Display description.
    pub description: &'static str,
    /// Substrings identifying events of this stage, in order.
    pub match_keywords: &'static [&'static str],
    /// Substrings whose presence marks the stage done.
    pub completion_keywords: &'static [&'static str],
}

impl StageDefinition {
    /// Returns true if the label belongs to this stage.
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        self.match_keywords.iter().any(|k| label.contains(k))
    }

    /// Returns true if the label marks this stage as completed.
    ///
    /// Only labels that also belong to the stage count.
    #[must_use]
    pub fn is_completion(&self, label: &str) -> bool {
        self.completion_keywords
            .iter()
            .any(|k| self.match_keywords.contains(k) && label.contains(k))
    }
}

static PIPELINE_STAGES: [StageDefinition; 4] = [
    StageDefinition {
        id: StageId::Upload,
        label: "File Upload",
        description: "Document is being uploaded",
        match_keywords: &[
            steps::RUN_STARTED,
            steps::FILE_READ,
            steps::FILE_TYPE_CHECKED,
            steps::DATABASE_RECORD,
            DOCUMENT_UPLOADED,
        ],
        completion_keywords: &[DOCUMENT_UPLOADED],
    },
    StageDefinition {
        id: StageId::Ocr,
        label: "OCR",
        description: "Text is being extracted from the document",
        match_keywords: &[steps::OCR_STARTED, steps::OCR_COMPLETED],
        completion_keywords: &[steps::OCR_COMPLETED],
    },
    StageDefinition {
        id: StageId::Nlp,
        label: "NLP Analysis",
        description: "Text is analyzed and fields are extracted",
        match_keywords: &[steps::NLP_STARTED, steps::NLP_COMPLETED],
        completion_keywords: &[steps::NLP_COMPLETED],
    },
    StageDefinition {
        id: StageId::Decision,
        label: "Decision",
        description: "Business rules are applied and a decision is made",
        match_keywords: &[steps::DECISION_STARTED, steps::DECISION_COMPLETED, RUN_COMPLETED],
        completion_keywords: &[steps::DECISION_COMPLETED, RUN_COMPLETED],
    },
];

/// Returns the four pipeline stages in order.
#[must_use]
pub fn pipeline_stages() -> &'static [StageDefinition] {
    &PIPELINE_STAGES
}
