//! Scoring of completed runs
//!
//! Pure functions over (section, answer set) pairs. Scoring never gates a
//! transition; the runner computes a report once the run finishes. A
//! multi-choice answer is correct only on an exact set match, so both a
//! missing and an extra selection make it wrong.

use serde::Serialize;

use crate::{
    model::{QuestionKind, Section},
    state::{AnswerSet, Selection},
};

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResult {
    pub id: String,
    pub answered: bool,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionScore {
    pub name: String,
    pub questions: Vec<QuestionResult>,
    pub answered: usize,
    pub correct: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub sections: Vec<SectionScore>,
    pub correct: usize,
    pub total: usize,
}

fn is_correct(kind: &QuestionKind, selection: &Selection) -> bool {
    match (kind, selection) {
        (QuestionKind::SingleChoice { correct, .. }, Selection::Single { option }) => {
            option == correct
        }
        (QuestionKind::TrueFalse { correct }, Selection::Single { option }) => {
            (*option == 0) == *correct
        }
        (QuestionKind::MultiChoice { correct, .. }, Selection::Multiple { options }) => {
            options == correct
        }
        // Unanswered, or a selection shape that does not match the question
        // kind, scores as incorrect.
        _ => false,
    }
}

pub fn score_section(section: &Section, answers: &AnswerSet) -> SectionScore {
    let questions: Vec<QuestionResult> = section
        .questions
        .iter()
        .zip(answers.selections())
        .map(|(question, selection)| QuestionResult {
            id: question.id.clone(),
            answered: selection.is_answered(),
            correct: is_correct(&question.kind, selection),
        })
        .collect();

    let answered = questions.iter().filter(|q| q.answered).count();
    let correct = questions.iter().filter(|q| q.correct).count();
    let total = section.questions.len();

    SectionScore {
        name: section.name.clone(),
        questions,
        answered,
        correct,
        total,
    }
}

/// Score every section against its recorded answer set, in declared order.
pub fn score_plan(sections: &[Section], recorded: &[AnswerSet]) -> ScoreReport {
    let section_scores: Vec<SectionScore> = sections
        .iter()
        .zip(recorded)
        .map(|(section, answers)| score_section(section, answers))
        .collect();

    let correct = section_scores.iter().map(|s| s.correct).sum();
    let total = section_scores.iter().map(|s| s.total).sum();

    ScoreReport {
        sections: section_scores,
        correct,
        total,
    }
}
