//! Assessment run coordination
//!
//! The [`Runner`] owns everything mutable about one run: the lifecycle
//! position, the active section's answer set, the archived answer sets of
//! completed sections, and the notification channels. All transition methods
//! are synchronous; the 1-second ticks that drive the countdown and the
//! section timers are delivered by the background ticker task, so tests can
//! step time by calling [`Runner::tick`] directly.

use std::{
    collections::BTreeSet,
    sync::{Mutex, MutexGuard},
    time::Instant,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::{
    error::RunnerError,
    model::{AssessmentPlan, HandoffContext, QuestionKind},
    scoring::{score_plan, ScoreReport},
};

use super::{AnswerSet, Phase, RunState, Selection, TimerView};

/// Notifications published on the runner's broadcast channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunnerEvent {
    Confirming,
    StartCancelled,
    CountdownTick {
        remaining: u32,
    },
    SectionStarted {
        section: usize,
        name: String,
        budget_seconds: u64,
    },
    AnswerRecorded {
        section: usize,
        question: usize,
    },
    /// `forced` distinguishes timer expiry from a user-initiated advance.
    SectionCompleted {
        section: usize,
        forced: bool,
    },
    TimeExpired {
        section: usize,
    },
    /// The hand-off: carries the invocation context forward so the caller
    /// can route to the next pipeline stage.
    Finished {
        interview_id: String,
        tenant: String,
        report: ScoreReport,
    },
}

/// What a delivered tick did, so the ticker task knows whether to keep
/// ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick arrived outside a timed phase and was ignored.
    Stale,
    /// Pre-start countdown stepped down, more steps remain.
    Counting { remaining: u32 },
    /// The countdown reached zero and the first section began.
    Started,
    /// The section timer stepped down, time remains.
    Running { remaining_seconds: u64 },
    /// The section timer hit zero and the section was force-completed.
    Expired { finished: bool },
}

/// Read-only view of the run for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub countdown_remaining: Option<u32>,
    pub section: Option<SectionProgress>,
    pub sections_total: usize,
    pub sections_completed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionProgress {
    pub index: usize,
    pub name: String,
    pub question_index: usize,
    pub question_count: usize,
    pub answered: usize,
    pub remaining_seconds: u64,
}

/// Drives one candidate through the plan's sections in declared order.
#[derive(Debug)]
pub struct Runner {
    plan: AssessmentPlan,
    countdown_from: u32,
    run: Mutex<RunState>,
    /// Answer set of the active section only.
    answers: Mutex<AnswerSet>,
    /// Answer sets of completed sections, in completion order. Feeds the
    /// score report; never mutated again.
    archive: Mutex<Vec<AnswerSet>>,
    report: Mutex<Option<ScoreReport>>,
    start_time: Instant,
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    event_tx: broadcast::Sender<RunnerEvent>,
    timer_tx: watch::Sender<TimerView>,
    /// Keep the receiver alive to prevent channel closure.
    _timer_rx: watch::Receiver<TimerView>,
}

impl Runner {
    /// Build a runner for a validated plan. `countdown_from` is the number
    /// of 1-second pre-start countdown steps (0 skips the countdown).
    pub fn new(plan: AssessmentPlan, countdown_from: u32) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (timer_tx, timer_rx) = watch::channel(TimerView::idle());
        let section_count = plan.sections.len();

        Self {
            plan,
            countdown_from,
            run: Mutex::new(RunState::new(section_count)),
            answers: Mutex::new(AnswerSet::for_section(0)),
            archive: Mutex::new(Vec::with_capacity(section_count)),
            report: Mutex::new(None),
            start_time: Instant::now(),
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            event_tx,
            timer_tx,
            _timer_rx: timer_rx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunnerEvent> {
        self.event_tx.subscribe()
    }

    pub fn watch_timer(&self) -> watch::Receiver<TimerView> {
        self.timer_tx.subscribe()
    }

    pub fn timer_view(&self) -> TimerView {
        self.timer_tx.borrow().clone()
    }

    pub fn context(&self) -> &HandoffContext {
        &self.plan.context
    }

    fn lock_run(&self) -> Result<MutexGuard<'_, RunState>, RunnerError> {
        self.run
            .lock()
            .map_err(|e| RunnerError::Internal(format!("run state lock poisoned: {}", e)))
    }

    fn lock_answers(&self) -> Result<MutexGuard<'_, AnswerSet>, RunnerError> {
        self.answers
            .lock()
            .map_err(|e| RunnerError::Internal(format!("answer set lock poisoned: {}", e)))
    }

    fn lock_archive(&self) -> Result<MutexGuard<'_, Vec<AnswerSet>>, RunnerError> {
        self.archive
            .lock()
            .map_err(|e| RunnerError::Internal(format!("answer archive lock poisoned: {}", e)))
    }

    fn emit(&self, event: RunnerEvent) {
        // Send only fails when nothing is subscribed, which is harmless.
        if self.event_tx.send(event).is_err() {
            warn!("runner event dropped: no subscribers");
        }
    }

    fn publish_timer(&self, view: TimerView) {
        if let Err(e) = self.timer_tx.send(view) {
            warn!("failed to publish timer view: {}", e);
        }
    }

    fn note_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// NotStarted -> Confirming.
    pub fn start(&self) -> Result<RunState, RunnerError> {
        let mut run = self.lock_run()?;
        if run.phase != Phase::NotStarted {
            return Err(RunnerError::InvalidTransition {
                action: "start the assessment",
                phase: run.phase,
            });
        }
        run.phase = Phase::Confirming;
        let snapshot = run.clone();
        drop(run);

        self.note_action("start");
        self.emit(RunnerEvent::Confirming);
        info!("assessment start requested, awaiting confirmation");
        Ok(snapshot)
    }

    /// Confirming -> CountingDown (or straight into the first section when
    /// the countdown is configured to zero steps).
    pub fn confirm_start(&self) -> Result<RunState, RunnerError> {
        let mut run = self.lock_run()?;
        if run.phase != Phase::Confirming {
            return Err(RunnerError::InvalidTransition {
                action: "confirm the start",
                phase: run.phase,
            });
        }

        if self.countdown_from == 0 {
            self.load_section(&mut run, 0)?;
        } else {
            run.phase = Phase::CountingDown;
            run.countdown_remaining = self.countdown_from;
        }
        let snapshot = run.clone();
        drop(run);

        self.note_action("confirm-start");
        if snapshot.phase == Phase::CountingDown {
            info!("start confirmed, counting down from {}", snapshot.countdown_remaining);
            self.emit(RunnerEvent::CountdownTick {
                remaining: snapshot.countdown_remaining,
            });
        }
        Ok(snapshot)
    }

    /// Confirming -> NotStarted.
    pub fn cancel_start(&self) -> Result<RunState, RunnerError> {
        let mut run = self.lock_run()?;
        if run.phase != Phase::Confirming {
            return Err(RunnerError::InvalidTransition {
                action: "cancel the start",
                phase: run.phase,
            });
        }
        run.phase = Phase::NotStarted;
        let snapshot = run.clone();
        drop(run);

        self.note_action("cancel-start");
        self.emit(RunnerEvent::StartCancelled);
        info!("assessment start cancelled");
        Ok(snapshot)
    }

    /// Record a selection for a question of the active section, overwriting
    /// any prior selection. For multi-choice questions the whole selected
    /// set is replaced with `{option}`; use [`Runner::toggle_answer`] to
    /// build up a set.
    pub fn select_answer(&self, question: usize, option: usize) -> Result<(), RunnerError> {
        let run = self.lock_run()?;
        if run.phase != Phase::InProgress {
            return Err(RunnerError::InvalidTransition {
                action: "select an answer",
                phase: run.phase,
            });
        }

        let section_index = run.section_index;
        let section = &self.plan.sections[section_index];
        if question >= section.questions.len() {
            return Err(RunnerError::IndexOutOfRange {
                what: "question",
                index: question,
                len: section.questions.len(),
            });
        }
        let kind = &section.questions[question].kind;
        if option >= kind.option_count() {
            return Err(RunnerError::IndexOutOfRange {
                what: "option",
                index: option,
                len: kind.option_count(),
            });
        }

        let selection = match kind {
            QuestionKind::MultiChoice { .. } => Selection::Multiple {
                options: BTreeSet::from([option]),
            },
            _ => Selection::Single { option },
        };
        self.lock_answers()?.record(question, selection);
        drop(run);

        self.note_action("answer");
        self.emit(RunnerEvent::AnswerRecorded {
            section: section_index,
            question,
        });
        Ok(())
    }

    /// Toggle one option of a multi-choice question in or out of the
    /// selected set. For single-answer questions this behaves like
    /// [`Runner::select_answer`].
    pub fn toggle_answer(&self, question: usize, option: usize) -> Result<(), RunnerError> {
        let run = self.lock_run()?;
        if run.phase != Phase::InProgress {
            return Err(RunnerError::InvalidTransition {
                action: "toggle an answer",
                phase: run.phase,
            });
        }

        let section_index = run.section_index;
        let section = &self.plan.sections[section_index];
        if question >= section.questions.len() {
            return Err(RunnerError::IndexOutOfRange {
                what: "question",
                index: question,
                len: section.questions.len(),
            });
        }
        let kind = &section.questions[question].kind;
        if option >= kind.option_count() {
            return Err(RunnerError::IndexOutOfRange {
                what: "option",
                index: option,
                len: kind.option_count(),
            });
        }

        {
            let mut answers = self.lock_answers()?;
            match kind {
                QuestionKind::MultiChoice { .. } => answers.toggle(question, option),
                _ => answers.record(question, Selection::Single { option }),
            }
        }
        drop(run);

        self.note_action("toggle-answer");
        self.emit(RunnerEvent::AnswerRecorded {
            section: section_index,
            question,
        });
        Ok(())
    }

    /// Move the question pointer forward, clamped to the section's last
    /// question. Never touches the answer set.
    pub fn next_question(&self) -> Result<usize, RunnerError> {
        let mut run = self.lock_run()?;
        if run.phase != Phase::InProgress {
            return Err(RunnerError::InvalidTransition {
                action: "navigate",
                phase: run.phase,
            });
        }
        let last = self.plan.sections[run.section_index].questions.len() - 1;
        run.question_index = run.question_index.saturating_add(1).min(last);
        Ok(run.question_index)
    }

    /// Move the question pointer back, clamped to the first question.
    pub fn previous_question(&self) -> Result<usize, RunnerError> {
        let mut run = self.lock_run()?;
        if run.phase != Phase::InProgress {
            return Err(RunnerError::InvalidTransition {
                action: "navigate",
                phase: run.phase,
            });
        }
        run.question_index = run.question_index.saturating_sub(1);
        Ok(run.question_index)
    }

    /// User-initiated section submission. Requires the pointer to sit on the
    /// last question and every question to be answered; timer expiry is the
    /// only path that bypasses the completeness gate.
    pub fn advance_section(&self) -> Result<RunState, RunnerError> {
        let mut run = self.lock_run()?;
        if run.phase != Phase::InProgress {
            return Err(RunnerError::InvalidTransition {
                action: "advance the section",
                phase: run.phase,
            });
        }
        let last = self.plan.sections[run.section_index].questions.len() - 1;
        if run.question_index != last {
            return Err(RunnerError::InvalidTransition {
                action: "advance before reaching the last question",
                phase: run.phase,
            });
        }

        let unanswered = self.lock_answers()?.unanswered();
        if unanswered > 0 {
            return Err(RunnerError::IncompleteSection { unanswered });
        }

        self.complete_section(&mut run, false)?;
        let snapshot = run.clone();
        drop(run);

        self.note_action("advance-section");
        Ok(snapshot)
    }

    /// Deliver one 1-second tick. Drives the pre-start countdown and the
    /// active section's timer; ticks landing in any other phase are ignored
    /// so a stale timer can never mutate a state it no longer applies to.
    pub fn tick(&self) -> Result<TickOutcome, RunnerError> {
        let mut run = self.lock_run()?;
        match run.phase {
            Phase::CountingDown => {
                run.countdown_remaining = run.countdown_remaining.saturating_sub(1);
                if run.countdown_remaining == 0 {
                    self.load_section(&mut run, 0)?;
                    Ok(TickOutcome::Started)
                } else {
                    let remaining = run.countdown_remaining;
                    drop(run);
                    self.emit(RunnerEvent::CountdownTick { remaining });
                    Ok(TickOutcome::Counting { remaining })
                }
            }
            Phase::InProgress => {
                run.remaining_seconds = run.remaining_seconds.saturating_sub(1);
                if run.remaining_seconds == 0 {
                    let section = run.section_index;
                    let unanswered = self.lock_answers()?.unanswered();
                    info!(
                        "section {} timer expired with {} unanswered question(s), forcing completion",
                        section, unanswered
                    );
                    self.emit(RunnerEvent::TimeExpired { section });
                    self.complete_section(&mut run, true)?;
                    Ok(TickOutcome::Expired {
                        finished: run.phase == Phase::Finished,
                    })
                } else {
                    let remaining = run.remaining_seconds;
                    drop(run);
                    self.publish_timer(TimerView::running(remaining));
                    Ok(TickOutcome::Running {
                        remaining_seconds: remaining,
                    })
                }
            }
            _ => Ok(TickOutcome::Stale),
        }
    }

    /// The finish transition runs automatically when the last section
    /// completes; calling this afterwards is a no-op.
    pub fn finish(&self) -> Result<(), RunnerError> {
        let run = self.lock_run()?;
        if run.phase == Phase::Finished {
            return Ok(());
        }
        Err(RunnerError::InvalidTransition {
            action: "finish",
            phase: run.phase,
        })
    }

    /// Close the current section and either load the next one or finish.
    fn complete_section(&self, run: &mut RunState, forced: bool) -> Result<(), RunnerError> {
        let index = run.section_index;
        run.completed[index] = true;
        run.phase = Phase::SectionComplete;
        run.remaining_seconds = 0;

        // Move the section's answers into the archive; the live set stays
        // empty until the next section installs a fresh one.
        {
            let mut answers = self.lock_answers()?;
            let done = std::mem::replace(&mut *answers, AnswerSet::for_section(0));
            self.lock_archive()?.push(done);
        }

        self.publish_timer(TimerView::idle());
        self.emit(RunnerEvent::SectionCompleted {
            section: index,
            forced,
        });
        info!("section {} complete (forced: {})", index, forced);

        if index + 1 < self.plan.sections.len() {
            self.load_section(run, index + 1)
        } else {
            self.finish_run(run)
        }
    }

    /// Make `index` the active section: fresh answer set, full time budget,
    /// pointer on the first question.
    fn load_section(&self, run: &mut RunState, index: usize) -> Result<(), RunnerError> {
        let section = &self.plan.sections[index];
        run.phase = Phase::InProgress;
        run.section_index = index;
        run.question_index = 0;
        run.countdown_remaining = 0;
        run.remaining_seconds = section.time_budget_seconds;

        *self.lock_answers()? = AnswerSet::for_section(section.questions.len());

        self.publish_timer(TimerView::running(section.time_budget_seconds));
        self.emit(RunnerEvent::SectionStarted {
            section: index,
            name: section.name.clone(),
            budget_seconds: section.time_budget_seconds,
        });
        info!(
            "section {} '{}' started with {}s budget",
            index, section.name, section.time_budget_seconds
        );
        Ok(())
    }

    fn finish_run(&self, run: &mut RunState) -> Result<(), RunnerError> {
        if run.phase == Phase::Finished {
            return Ok(());
        }
        run.phase = Phase::Finished;

        let report = score_plan(&self.plan.sections, &self.lock_archive()?);
        *self
            .report
            .lock()
            .map_err(|e| RunnerError::Internal(format!("report lock poisoned: {}", e)))? =
            Some(report.clone());

        self.publish_timer(TimerView::idle());
        let context = &self.plan.context;
        info!(
            "assessment finished ({}/{} correct); hand-off ready for interview {} (tenant {})",
            report.correct, report.total, context.interview_id, context.tenant
        );
        self.emit(RunnerEvent::Finished {
            interview_id: context.interview_id.clone(),
            tenant: context.tenant.clone(),
            report,
        });
        Ok(())
    }

    /// Whether the 1-second ticker should currently be running.
    pub fn in_timed_phase(&self) -> bool {
        self.lock_run().map(|run| run.is_timed()).unwrap_or(false)
    }

    pub fn snapshot(&self) -> Result<Snapshot, RunnerError> {
        let run = self.lock_run()?;
        let answers = self.lock_answers()?;

        let section = (run.phase == Phase::InProgress).then(|| {
            let section = &self.plan.sections[run.section_index];
            SectionProgress {
                index: run.section_index,
                name: section.name.clone(),
                question_index: run.question_index,
                question_count: section.questions.len(),
                answered: answers.answered(),
                remaining_seconds: run.remaining_seconds,
            }
        });

        Ok(Snapshot {
            phase: run.phase,
            countdown_remaining: (run.phase == Phase::CountingDown)
                .then_some(run.countdown_remaining),
            section,
            sections_total: self.plan.sections.len(),
            sections_completed: run.completed_count(),
        })
    }

    /// Score report of a finished run. Scoring never gates a transition, so
    /// asking before `Finished` is an invalid call, not a blocked one.
    pub fn score_report(&self) -> Result<ScoreReport, RunnerError> {
        let run = self.lock_run()?;
        if run.phase != Phase::Finished {
            return Err(RunnerError::InvalidTransition {
                action: "read the score report",
                phase: run.phase,
            });
        }
        drop(run);

        self.report
            .lock()
            .map_err(|e| RunnerError::Internal(format!("report lock poisoned: {}", e)))?
            .clone()
            .ok_or_else(|| RunnerError::Internal("finished run has no report".to_string()))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, Section};

    fn single(id: &str, correct: usize) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("prompt {id}"),
            kind: QuestionKind::SingleChoice {
                options: vec!["a".into(), "b".into(), "c".into()],
                correct,
            },
        }
    }

    /// Two sections of two questions each, 60 second budgets.
    fn plan() -> AssessmentPlan {
        AssessmentPlan {
            context: HandoffContext {
                interview_id: "ivw-3021".into(),
                tenant: "acme".into(),
            },
            sections: vec![
                Section {
                    name: "aptitude".into(),
                    time_budget_seconds: 60,
                    questions: vec![single("a1", 1), single("a2", 0)],
                },
                Section {
                    name: "technical".into(),
                    time_budget_seconds: 60,
                    questions: vec![single("t1", 2), single("t2", 1)],
                },
            ],
        }
    }

    fn runner() -> Runner {
        Runner::new(plan(), 3)
    }

    /// start -> confirm -> three countdown ticks.
    fn enter_first_section(runner: &Runner) {
        runner.start().unwrap();
        runner.confirm_start().unwrap();
        assert_eq!(runner.tick().unwrap(), TickOutcome::Counting { remaining: 2 });
        assert_eq!(runner.tick().unwrap(), TickOutcome::Counting { remaining: 1 });
        assert_eq!(runner.tick().unwrap(), TickOutcome::Started);
    }

    fn drain(rx: &mut broadcast::Receiver<RunnerEvent>) -> Vec<RunnerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn start_requires_not_started() {
        let runner = runner();
        assert!(runner.start().is_ok());
        assert_eq!(
            runner.start(),
            Err(RunnerError::InvalidTransition {
                action: "start the assessment",
                phase: Phase::Confirming,
            })
        );
    }

    #[test]
    fn cancel_returns_to_not_started() {
        let runner = runner();
        runner.start().unwrap();
        let state = runner.cancel_start().unwrap();
        assert_eq!(state.phase, Phase::NotStarted);
        // The run can be started again afterwards.
        assert!(runner.start().is_ok());
    }

    #[test]
    fn confirm_is_rejected_outside_confirming() {
        let runner = runner();
        assert!(matches!(
            runner.confirm_start(),
            Err(RunnerError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn countdown_ticks_into_the_first_section() {
        let runner = runner();
        enter_first_section(&runner);

        let snapshot = runner.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::InProgress);
        let section = snapshot.section.unwrap();
        assert_eq!(section.index, 0);
        assert_eq!(section.remaining_seconds, 60);
        assert_eq!(section.answered, 0);
        assert_eq!(section.question_index, 0);
    }

    #[test]
    fn zero_countdown_starts_immediately() {
        let runner = Runner::new(plan(), 0);
        runner.start().unwrap();
        let state = runner.confirm_start().unwrap();
        assert_eq!(state.phase, Phase::InProgress);
        assert_eq!(state.remaining_seconds, 60);
    }

    #[test]
    fn select_answer_is_rejected_before_the_run_starts() {
        let runner = runner();
        assert_eq!(
            runner.select_answer(0, 1),
            Err(RunnerError::InvalidTransition {
                action: "select an answer",
                phase: Phase::NotStarted,
            })
        );
    }

    #[test]
    fn select_answer_bounds_checks_both_indices() {
        let runner = runner();
        enter_first_section(&runner);

        assert_eq!(
            runner.select_answer(5, 0),
            Err(RunnerError::IndexOutOfRange {
                what: "question",
                index: 5,
                len: 2,
            })
        );
        assert_eq!(
            runner.select_answer(0, 9),
            Err(RunnerError::IndexOutOfRange {
                what: "option",
                index: 9,
                len: 3,
            })
        );
    }

    #[test]
    fn navigation_is_clamped_to_section_bounds() {
        let runner = runner();
        enter_first_section(&runner);

        assert_eq!(runner.previous_question().unwrap(), 0);
        assert_eq!(runner.next_question().unwrap(), 1);
        assert_eq!(runner.next_question().unwrap(), 1);
        assert_eq!(runner.previous_question().unwrap(), 0);
    }

    #[test]
    fn navigation_does_not_touch_answers() {
        let runner = runner();
        enter_first_section(&runner);
        runner.select_answer(0, 1).unwrap();

        runner.next_question().unwrap();
        runner.previous_question().unwrap();

        let section = runner.snapshot().unwrap().section.unwrap();
        assert_eq!(section.answered, 1);
    }

    #[test]
    fn advance_requires_the_last_question() {
        let runner = runner();
        enter_first_section(&runner);
        runner.select_answer(0, 1).unwrap();
        runner.select_answer(1, 0).unwrap();

        // Pointer still on question 0.
        assert!(matches!(
            runner.advance_section(),
            Err(RunnerError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn advance_with_unanswered_questions_reports_incomplete() {
        let runner = runner();
        enter_first_section(&runner);
        runner.select_answer(0, 1).unwrap();
        runner.next_question().unwrap();

        assert_eq!(
            runner.advance_section(),
            Err(RunnerError::IncompleteSection { unanswered: 1 })
        );

        // State and answers are untouched by the rejected call.
        let snapshot = runner.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::InProgress);
        let section = snapshot.section.unwrap();
        assert_eq!(section.index, 0);
        assert_eq!(section.answered, 1);
        assert_eq!(section.remaining_seconds, 60);
    }

    #[test]
    fn gated_advance_loads_the_next_section_fresh() {
        let runner = runner();
        enter_first_section(&runner);
        runner.select_answer(0, 1).unwrap();
        runner.select_answer(1, 0).unwrap();
        runner.next_question().unwrap();

        let state = runner.advance_section().unwrap();
        assert_eq!(state.phase, Phase::InProgress);
        assert_eq!(state.section_index, 1);
        assert_eq!(state.question_index, 0);
        assert_eq!(state.remaining_seconds, 60);
        assert!(state.completed[0]);
        assert!(!state.completed[1]);

        // Fresh answer set for the new section.
        let section = runner.snapshot().unwrap().section.unwrap();
        assert_eq!(section.answered, 0);
        assert_eq!(section.question_count, 2);
    }

    #[test]
    fn timer_ticks_decrement_by_one_second() {
        let runner = runner();
        enter_first_section(&runner);

        assert_eq!(
            runner.tick().unwrap(),
            TickOutcome::Running {
                remaining_seconds: 59
            }
        );
        assert_eq!(
            runner.tick().unwrap(),
            TickOutcome::Running {
                remaining_seconds: 58
            }
        );
        assert_eq!(runner.timer_view().remaining_seconds, Some(58));
    }

    #[test]
    fn timeout_forces_section_completion_without_incomplete_error() {
        let runner = runner();
        enter_first_section(&runner);
        // Leave question 1 unanswered in section 0.
        runner.select_answer(0, 1).unwrap();

        let mut outcome = TickOutcome::Stale;
        for _ in 0..60 {
            outcome = runner.tick().unwrap();
        }
        assert_eq!(outcome, TickOutcome::Expired { finished: false });

        let snapshot = runner.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::InProgress);
        let section = snapshot.section.unwrap();
        assert_eq!(section.index, 1);
        assert_eq!(section.answered, 0);
        assert_eq!(section.remaining_seconds, 60);
    }

    #[test]
    fn timeout_on_the_last_section_finishes_the_run() {
        let runner = runner();
        let mut rx = runner.subscribe();
        enter_first_section(&runner);
        runner.select_answer(0, 1).unwrap();
        runner.select_answer(1, 0).unwrap();
        runner.next_question().unwrap();
        runner.advance_section().unwrap();

        // Section 1: answer only the first question, then let time expire.
        runner.select_answer(0, 2).unwrap();
        let mut outcome = TickOutcome::Stale;
        for _ in 0..60 {
            outcome = runner.tick().unwrap();
        }
        assert_eq!(outcome, TickOutcome::Expired { finished: true });

        let snapshot = runner.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Finished);
        assert_eq!(snapshot.sections_completed, 2);

        // The hand-off event carries the invocation context forward.
        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, RunnerEvent::TimeExpired { section: 1 })));
        let finished = events
            .iter()
            .find_map(|e| match e {
                RunnerEvent::Finished {
                    interview_id,
                    tenant,
                    report,
                } => Some((interview_id.clone(), tenant.clone(), report.clone())),
                _ => None,
            })
            .expect("finished event");
        assert_eq!(finished.0, "ivw-3021");
        assert_eq!(finished.1, "acme");
        // Section 0 fully correct, section 1 has one correct answer.
        assert_eq!(finished.2.correct, 3);
        assert_eq!(finished.2.total, 4);
    }

    #[test]
    fn sections_complete_in_declared_order() {
        let runner = runner();
        let mut rx = runner.subscribe();
        enter_first_section(&runner);

        for section in 0..2 {
            runner.select_answer(0, 0).unwrap();
            runner.select_answer(1, 0).unwrap();
            runner.next_question().unwrap();
            runner.advance_section().unwrap();
            let completed: Vec<usize> = drain(&mut rx)
                .into_iter()
                .filter_map(|e| match e {
                    RunnerEvent::SectionCompleted { section, forced } => {
                        assert!(!forced);
                        Some(section)
                    }
                    _ => None,
                })
                .collect();
            assert_eq!(completed, vec![section]);
        }

        let snapshot = runner.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Finished);
        assert_eq!(snapshot.sections_completed, snapshot.sections_total);
    }

    #[test]
    fn finish_is_idempotent_once_finished() {
        let runner = runner();
        enter_first_section(&runner);
        for _ in 0..2 {
            runner.select_answer(0, 0).unwrap();
            runner.select_answer(1, 0).unwrap();
            runner.next_question().unwrap();
            runner.advance_section().unwrap();
        }

        assert_eq!(runner.finish(), Ok(()));
        assert_eq!(runner.finish(), Ok(()));
        assert_eq!(runner.snapshot().unwrap().phase, Phase::Finished);
    }

    #[test]
    fn finish_cannot_be_forced_early() {
        let runner = runner();
        enter_first_section(&runner);
        assert!(matches!(
            runner.finish(),
            Err(RunnerError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let runner = runner();
        assert_eq!(runner.tick().unwrap(), TickOutcome::Stale);

        runner.start().unwrap();
        assert_eq!(runner.tick().unwrap(), TickOutcome::Stale);
    }

    #[test]
    fn report_is_only_available_after_finish() {
        let runner = runner();
        enter_first_section(&runner);
        assert!(matches!(
            runner.score_report(),
            Err(RunnerError::InvalidTransition { .. })
        ));

        for _ in 0..2 {
            runner.select_answer(0, 0).unwrap();
            runner.select_answer(1, 0).unwrap();
            runner.next_question().unwrap();
            runner.advance_section().unwrap();
        }

        let report = runner.score_report().unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.sections.len(), 2);
    }

    #[test]
    fn timer_view_resets_per_section_and_goes_idle_at_finish() {
        let runner = runner();
        enter_first_section(&runner);
        runner.tick().unwrap();
        assert_eq!(runner.timer_view().remaining_seconds, Some(59));

        runner.select_answer(0, 0).unwrap();
        runner.select_answer(1, 0).unwrap();
        runner.next_question().unwrap();
        runner.advance_section().unwrap();
        assert_eq!(runner.timer_view().remaining_seconds, Some(60));

        runner.select_answer(0, 0).unwrap();
        runner.select_answer(1, 0).unwrap();
        runner.next_question().unwrap();
        runner.advance_section().unwrap();
        assert!(!runner.timer_view().active);
    }
}
