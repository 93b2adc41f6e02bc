use crate::tracker::QuestionStatus;
use itertools::Itertools;

pub const MARKS_CORRECT: i64 = 4;
pub const MARKS_INCORRECT: i64 = -1;

/// Pace above which the results suggest speeding up, in seconds per question.
const SLOW_PACE_SECS: f64 = 90.0;
const LOW_ATTEMPT_RATE: f64 = 80.0;
const LOW_ACCURACY: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Tier {
    Outstanding,
    Excellent,
    #[strum(serialize = "Very Good")]
    VeryGood,
    Good,
    Fair,
    #[strum(serialize = "Needs Improvement")]
    NeedsImprovement,
}

impl Tier {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Tier::Outstanding
        } else if percentage >= 75.0 {
            Tier::Excellent
        } else if percentage >= 60.0 {
            Tier::VeryGood
        } else if percentage >= 45.0 {
            Tier::Good
        } else if percentage >= 30.0 {
            Tier::Fair
        } else {
            Tier::NeedsImprovement
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Success,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: &'static str,
    pub message: String,
}

/// Results of a finished quiz. Always derived from the session's statuses,
/// never stored on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unattempted: usize,
    pub marks: i64,
    pub max_marks: i64,
    pub percentage: f64,
    pub accuracy: f64,
    pub elapsed_secs: u32,
    pub avg_secs_per_attempt: f64,
    pub best_streak: usize,
    pub tier: Tier,
}

impl ScoreSummary {
    pub fn compute(statuses: &[QuestionStatus], elapsed_secs: u32) -> Self {
        let total = statuses.len();
        let correct = statuses.iter().filter(|s| s.is_correct()).count();
        let attempted = statuses.iter().filter(|s| s.is_attempted()).count();
        let incorrect = attempted - correct;

        let marks = MARKS_CORRECT * correct as i64 + MARKS_INCORRECT * incorrect as i64;
        let max_marks = MARKS_CORRECT * total as i64;

        let percentage = if max_marks > 0 {
            marks as f64 / max_marks as f64 * 100.0
        } else {
            0.0
        };
        let accuracy = if attempted > 0 {
            correct as f64 / attempted as f64 * 100.0
        } else {
            0.0
        };
        let avg_secs_per_attempt = if attempted > 0 {
            elapsed_secs as f64 / attempted as f64
        } else {
            0.0
        };

        Self {
            total,
            correct,
            incorrect,
            unattempted: total - attempted,
            marks,
            max_marks,
            percentage,
            accuracy,
            elapsed_secs,
            avg_secs_per_attempt,
            best_streak: best_streak(statuses),
            tier: Tier::from_percentage(percentage),
        }
    }

    pub fn attempted(&self) -> usize {
        self.correct + self.incorrect
    }

    pub fn attempt_rate(&self) -> f64 {
        if self.total > 0 {
            self.attempted() as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Coaching notes shown under the score.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        let mut out = vec![tier_suggestion(self.tier)];

        if self.avg_secs_per_attempt > SLOW_PACE_SECS {
            out.push(Suggestion {
                kind: SuggestionKind::Info,
                title: "Speed Up",
                message: "You're taking more than 90 seconds per question. In NEET, aim for \
                          45-60 seconds average. Practice timed quizzes regularly."
                    .to_string(),
            });
        }

        let attempt_rate = self.attempt_rate();
        if attempt_rate < LOW_ATTEMPT_RATE {
            out.push(Suggestion {
                kind: SuggestionKind::Info,
                title: "Attempt More Questions",
                message: format!(
                    "You attempted only {attempt_rate:.0}% of questions. In the actual exam, \
                     try to attempt at least 90% with accuracy."
                ),
            });
        }

        if self.attempted() > 0 && self.accuracy < LOW_ACCURACY {
            out.push(Suggestion {
                kind: SuggestionKind::Warning,
                title: "Improve Accuracy",
                message: format!(
                    "Your accuracy is {:.0}%. Focus on understanding concepts rather than \
                     guessing. Quality over quantity!",
                    self.accuracy
                ),
            });
        }

        out
    }
}

/// Longest run of correct answers in slot order. Unattempted and incorrect
/// slots both break a run.
pub fn best_streak(statuses: &[QuestionStatus]) -> usize {
    statuses
        .iter()
        .map(QuestionStatus::is_correct)
        .dedup_with_count()
        .filter(|(_, correct)| *correct)
        .map(|(run, _)| run)
        .max()
        .unwrap_or(0)
}

fn tier_suggestion(tier: Tier) -> Suggestion {
    let (kind, title, message) = match tier {
        Tier::Outstanding => (
            SuggestionKind::Success,
            "Outstanding Performance!",
            "You're performing at an elite level. Maintain this consistency and focus on \
             speed optimization.",
        ),
        Tier::Excellent => (
            SuggestionKind::Success,
            "Excellent Work!",
            "You have a strong grasp of the concepts. Keep practicing to improve accuracy \
             and reduce silly mistakes.",
        ),
        Tier::VeryGood => (
            SuggestionKind::Info,
            "Very Good Attempt",
            "You're on the right track! Focus on strengthening weak topics and practice \
             more questions daily.",
        ),
        Tier::Good => (
            SuggestionKind::Info,
            "Good Effort",
            "Review incorrect answers thoroughly. Focus on building strong fundamentals in \
             each chapter.",
        ),
        Tier::Fair => (
            SuggestionKind::Warning,
            "Room for Improvement",
            "Spend more time understanding core concepts. Consider revising NCERT \
             thoroughly and practice more questions.",
        ),
        Tier::NeedsImprovement => (
            SuggestionKind::Warning,
            "Build Your Foundation",
            "Focus on basics first. Study NCERT line-by-line, make notes, and practice easy \
             questions before attempting harder ones.",
        ),
    };
    Suggestion {
        kind,
        title,
        message: message.to_string(),
    }
}
