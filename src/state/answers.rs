//! Answer bookkeeping for the active section

use std::collections::BTreeSet;

use serde::Serialize;

/// What the candidate has selected for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Unanswered,
    Single { option: usize },
    Multiple { options: BTreeSet<usize> },
}

impl Selection {
    /// An empty multi-selection counts as unanswered.
    pub fn is_answered(&self) -> bool {
        match self {
            Selection::Unanswered => false,
            Selection::Single { .. } => true,
            Selection::Multiple { options } => !options.is_empty(),
        }
    }
}

/// One selection slot per question of the active section. Replaced wholesale
/// whenever a new section starts, so entries from a completed section are
/// never reachable through the live set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSet {
    slots: Vec<Selection>,
}

impl AnswerSet {
    pub fn for_section(question_count: usize) -> Self {
        Self {
            slots: vec![Selection::Unanswered; question_count],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn selections(&self) -> &[Selection] {
        &self.slots
    }

    /// Overwrite the slot for `question`. Callers bounds-check first.
    pub fn record(&mut self, question: usize, selection: Selection) {
        self.slots[question] = selection;
    }

    /// Toggle membership of `option` in a multi-selection slot, promoting an
    /// unanswered or single slot to a set first.
    pub fn toggle(&mut self, question: usize, option: usize) {
        let mut options = match &self.slots[question] {
            Selection::Multiple { options } => options.clone(),
            Selection::Single { option } => BTreeSet::from([*option]),
            Selection::Unanswered => BTreeSet::new(),
        };
        if !options.remove(&option) {
            options.insert(option);
        }
        self.slots[question] = Selection::Multiple { options };
    }

    pub fn answered(&self) -> usize {
        self.slots.iter().filter(|s| s.is_answered()).count()
    }

    pub fn unanswered(&self) -> usize {
        self.slots.len() - self.answered()
    }

    pub fn is_complete(&self) -> bool {
        self.unanswered() == 0
    }
}
