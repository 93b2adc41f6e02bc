use crate::question::QuestionId;

pub type Result<T> = std::result::Result<T, QuizError>;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("no questions available for the selected filters")]
    EmptyPool,

    #[error("slot {0} is out of range")]
    InvalidSlot(usize),

    #[error("session has ended; no further submissions are accepted")]
    SessionClosed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    #[error("failed to record attempt for question {question}: {source}")]
    Persist {
        question: QuestionId,
        #[source]
        source: Box<QuizError>,
    },

    #[error("attempt store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("question bank error: {0}")]
    Bank(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    /// Failures the user can retry from the quiz screen without losing the session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            QuizError::EmptyPool | QuizError::UnknownSubject(_) | QuizError::Config(_)
        )
    }
}
