//! Assessment plan data model
//!
//! A plan is the immutable input to a run: an ordered list of timed
//! sections, each with a fixed question set, plus the opaque hand-off
//! context that must be carried through to the completion signal. Plans are
//! loaded from a JSON file at startup and validated before the server binds.

use std::{
    collections::{BTreeSet, HashSet},
    fs,
    path::Path,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Question variants, tagged so scoring can match exhaustively instead of
/// sniffing string tags at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice {
        options: Vec<String>,
        correct: usize,
    },
    MultiChoice {
        options: Vec<String>,
        correct: BTreeSet<usize>,
    },
    /// Implicit two options; index 0 means "True".
    TrueFalse { correct: bool },
}

impl QuestionKind {
    /// Number of selectable options for bounds-checking answer submissions.
    pub fn option_count(&self) -> usize {
        match self {
            QuestionKind::SingleChoice { options, .. } => options.len(),
            QuestionKind::MultiChoice { options, .. } => options.len(),
            QuestionKind::TrueFalse { .. } => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// A named, ordered, fixed-size group of questions sharing one countdown
/// timer. Sections are traversed strictly in declared order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub time_budget_seconds: u64,
    pub questions: Vec<Question>,
}

/// Opaque identifiers from the invocation context, threaded through to the
/// completion hand-off so the caller can route to the next pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffContext {
    pub interview_id: String,
    pub tenant: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentPlan {
    pub context: HandoffContext,
    pub sections: Vec<Section>,
}

impl AssessmentPlan {
    /// Load and validate a plan from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read assessment plan {}", path.display()))?;
        let plan: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse assessment plan {}", path.display()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Reject plans the runner cannot execute: empty section lists, empty
    /// sections, zero time budgets, or correct-answer indices out of range.
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            bail!("assessment plan has no sections");
        }

        let mut names = HashSet::new();
        for section in &self.sections {
            if !names.insert(section.name.as_str()) {
                bail!("duplicate section name '{}'", section.name);
            }
            if section.questions.is_empty() {
                bail!("section '{}' has no questions", section.name);
            }
            if section.time_budget_seconds == 0 {
                bail!("section '{}' has a zero time budget", section.name);
            }

            for question in &section.questions {
                match &question.kind {
                    QuestionKind::SingleChoice { options, correct } => {
                        if options.len() < 2 {
                            bail!("question '{}' needs at least two options", question.id);
                        }
                        if *correct >= options.len() {
                            bail!(
                                "question '{}' marks option {} correct but has only {} options",
                                question.id,
                                correct,
                                options.len()
                            );
                        }
                    }
                    QuestionKind::MultiChoice { options, correct } => {
                        if options.len() < 2 {
                            bail!("question '{}' needs at least two options", question.id);
                        }
                        if correct.is_empty() {
                            bail!("question '{}' has no correct options", question.id);
                        }
                        if correct.iter().any(|c| *c >= options.len()) {
                            bail!("question '{}' marks an out-of-range option correct", question.id);
                        }
                    }
                    QuestionKind::TrueFalse { .. } => {}
                }
            }
        }

        Ok(())
    }
}
