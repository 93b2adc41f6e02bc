use crate::attempts::{AttemptHistory, AttemptRecord, AttemptSink};
use crate::bank::{QuestionFilter, QuestionSource};
use crate::error::{QuizError, Result};
use crate::navigation::{Navigator, ViewMode};
use crate::question::{OptionKey, Question};
use crate::sampler;
use crate::scorer::ScoreSummary;
use crate::timer::{Countdown, Metronome};
use crate::tracker::{AttemptTracker, QuestionStatus, Submission};
use chrono::Local;
use rand::Rng;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub student_id: String,
    pub title: String,
    pub max_questions: usize,
    pub time_limit_secs: u32,
}

/// How the quiz came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Finished,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Running,
    /// Finish was requested and awaits confirmation. The clock keeps running.
    ConfirmFinish,
    Finished,
    Expired,
    /// Walking through solutions after the quiz ended.
    Reviewing(Ending),
}

impl SessionPhase {
    pub fn is_ticking(&self) -> bool {
        matches!(self, SessionPhase::Running | SessionPhase::ConfirmFinish)
    }

    pub fn ending(&self) -> Option<Ending> {
        match self {
            SessionPhase::Finished => Some(Ending::Finished),
            SessionPhase::Expired => Some(Ending::Expired),
            SessionPhase::Reviewing(ending) => Some(*ending),
            SessionPhase::Running | SessionPhase::ConfirmFinish => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock is not running; nothing happened.
    Idle,
    Ticked,
    /// The countdown hit zero on this tick. Reported once per session.
    Expired,
}

/// One student's quiz: fixed questions, their statuses, the clock and the
/// navigation state. Lives in memory only.
#[derive(Debug)]
pub struct QuizSession {
    config: SessionConfig,
    questions: Vec<Question>,
    tracker: AttemptTracker,
    nav: Navigator,
    countdown: Countdown,
    phase: SessionPhase,
    metronome: Option<Metronome>,
}

impl QuizSession {
    pub fn new(config: SessionConfig, questions: Vec<Question>) -> Result<Self> {
        if config.time_limit_secs == 0 {
            return Err(QuizError::Config("time limit must be at least one second".into()));
        }
        if questions.is_empty() {
            return Err(QuizError::EmptyPool);
        }
        if questions.len() > config.max_questions {
            return Err(QuizError::Config(format!(
                "{} questions exceed the maximum of {}",
                questions.len(),
                config.max_questions
            )));
        }

        let len = questions.len();
        tracing::info!(
            student = %config.student_id,
            title = %config.title,
            questions = len,
            time_limit = config.time_limit_secs,
            "quiz session started"
        );

        Ok(Self {
            countdown: Countdown::new(config.time_limit_secs),
            config,
            questions,
            tracker: AttemptTracker::new(len),
            nav: Navigator::new(len),
            phase: SessionPhase::Running,
            metronome: None,
        })
    }

    /// Filters the pool, reads prior attempts and samples the questions.
    pub fn start<S, H, R>(
        config: SessionConfig,
        filter: &QuestionFilter,
        source: &S,
        history: &H,
        rng: &mut R,
    ) -> Result<Self>
    where
        S: QuestionSource + ?Sized,
        H: AttemptHistory + ?Sized,
        R: Rng + ?Sized,
    {
        if config.max_questions == 0 {
            return Err(QuizError::Config("max questions must be at least one".into()));
        }
        let pool = source.questions(filter);
        let attempted = history.attempted_ids(&config.student_id)?;
        let questions = sampler::sample(&pool, &attempted, config.max_questions, rng)?;
        Self::new(config, questions)
    }

    /// Anchors the wall clock. Called once when the quiz screen appears.
    pub fn start_clock(&mut self, now: Instant) {
        if self.phase.is_ticking() {
            self.metronome = Some(Metronome::start(now));
        }
    }

    /// Applies every whole-second tick that came due since the last call.
    pub fn advance(&mut self, now: Instant) -> TickOutcome {
        if !self.phase.is_ticking() {
            return TickOutcome::Idle;
        }
        let due = self
            .metronome
            .get_or_insert_with(|| Metronome::start(now))
            .due(now);

        let mut outcome = TickOutcome::Idle;
        for _ in 0..due {
            outcome = self.tick();
            if outcome != TickOutcome::Ticked {
                break;
            }
        }
        outcome
    }

    /// One second of quiz time.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.phase.is_ticking() {
            return TickOutcome::Idle;
        }
        if self.countdown.tick() {
            tracing::debug!("countdown reached zero");
            self.end(Ending::Expired);
            TickOutcome::Expired
        } else {
            TickOutcome::Ticked
        }
    }

    /// Highlights an option on the current slot. Ignored once the slot has
    /// been answered or the quiz is over.
    pub fn select(&mut self, option: OptionKey) -> bool {
        if self.phase != SessionPhase::Running || self.tracker.is_attempted(self.nav.current()) {
            return false;
        }
        self.nav.select(option);
        true
    }

    /// Submits the highlighted option of the current slot, if any.
    pub fn submit_highlighted<K: AttemptSink + ?Sized>(
        &mut self,
        sink: &mut K,
    ) -> Result<Option<Submission>> {
        match self.nav.highlighted() {
            Some(option) => self.submit(self.nav.current(), option, sink).map(Some),
            None => Ok(None),
        }
    }

    /// Scores `option` for slot `index`.
    ///
    /// The attempt is written to `sink` first; the slot only changes once
    /// the write succeeded, so a failed write leaves it open for a retry.
    /// Repeated submissions on an answered slot are no-ops and are not
    /// written again.
    pub fn submit<K: AttemptSink + ?Sized>(
        &mut self,
        index: usize,
        option: OptionKey,
        sink: &mut K,
    ) -> Result<Submission> {
        if self.phase != SessionPhase::Running {
            return Err(QuizError::SessionClosed);
        }
        let question = self.questions.get(index).ok_or(QuizError::InvalidSlot(index))?;
        if self.tracker.is_attempted(index) {
            return Ok(Submission::AlreadyAttempted);
        }

        let record = AttemptRecord {
            student_id: self.config.student_id.clone(),
            question_id: question.id.clone(),
            selected: option,
            is_correct: question.is_correct(option),
            attempted_at: Local::now(),
        };

        if let Err(e) = sink.record_attempt(&record) {
            tracing::warn!(question = %record.question_id, error = %e, "attempt was not recorded");
            return Err(QuizError::Persist {
                question: record.question_id,
                source: Box::new(e),
            });
        }

        let correct_option = question.correct;
        let submission = self.tracker.submit(index, option, correct_option)?;
        tracing::debug!(slot = index, ?submission, "answer submitted");
        if index == self.nav.current() {
            self.nav.sync(self.tracker.statuses());
        }
        Ok(submission)
    }

    pub fn next(&mut self) -> bool {
        self.nav.next(self.tracker.statuses())
    }

    pub fn previous(&mut self) -> bool {
        self.nav.previous(self.tracker.statuses())
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        self.nav.go_to(index, self.tracker.statuses())
    }

    pub fn toggle_mode(&mut self) -> ViewMode {
        self.nav.toggle_mode()
    }

    /// Asks to finish. Only honoured while running.
    pub fn request_finish(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.phase = SessionPhase::ConfirmFinish;
        true
    }

    /// Dismisses the finish prompt.
    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::ConfirmFinish {
            return false;
        }
        self.phase = SessionPhase::Running;
        true
    }

    pub fn confirm_finish(&mut self) -> bool {
        if self.phase != SessionPhase::ConfirmFinish {
            return false;
        }
        self.end(Ending::Finished);
        true
    }

    /// Opens the solutions walkthrough from the results.
    pub fn review(&mut self) -> bool {
        let ending = match self.phase {
            SessionPhase::Finished => Ending::Finished,
            SessionPhase::Expired => Ending::Expired,
            _ => return false,
        };
        self.phase = SessionPhase::Reviewing(ending);
        self.nav.go_to(0, self.tracker.statuses());
        self.nav.set_mode(ViewMode::Single);
        true
    }

    pub fn back_to_results(&mut self) -> bool {
        match self.phase {
            SessionPhase::Reviewing(Ending::Finished) => self.phase = SessionPhase::Finished,
            SessionPhase::Reviewing(Ending::Expired) => self.phase = SessionPhase::Expired,
            _ => return false,
        }
        true
    }

    /// Drops the session before it was finalized. Answers already written to
    /// the attempt sink stay there.
    pub fn abandon(self) {
        tracing::info!(
            answered = self.tracker.attempted_count(),
            total = self.questions.len(),
            "quiz abandoned"
        );
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary::compute(self.tracker.statuses(), self.countdown.elapsed())
    }

    fn end(&mut self, ending: Ending) {
        self.metronome = None;
        self.phase = match ending {
            Ending::Finished => SessionPhase::Finished,
            Ending::Expired => SessionPhase::Expired,
        };
        let summary = self.summary();
        tracing::info!(
            ?ending,
            marks = summary.marks,
            max_marks = summary.max_marks,
            elapsed = summary.elapsed_secs,
            "quiz session ended"
        );
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase.ending().is_some()
    }

    pub fn has_clock(&self) -> bool {
        self.metronome.is_some()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.nav.current()
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.nav.current()]
    }

    pub fn status(&self, index: usize) -> QuestionStatus {
        self.tracker.status_of(index).unwrap_or_default()
    }

    pub fn statuses(&self) -> &[QuestionStatus] {
        self.tracker.statuses()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn highlighted(&self) -> Option<OptionKey> {
        self.nav.highlighted()
    }

    pub fn attempted_count(&self) -> usize {
        self.tracker.attempted_count()
    }

    pub fn correct_count(&self) -> usize {
        self.tracker.correct_count()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.countdown.elapsed()
    }
}
