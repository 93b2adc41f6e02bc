use crate::error::{QuizError, Result};
use crate::question::{Difficulty, Question};
use crate::timer::{DEFAULT_TIME_LIMIT_SECS, SHORT_PAPER_TIME_LIMIT_SECS};
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

static BANK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets/banks");

/// Name of the bank compiled into the binary.
pub const BUILTIN_BANK: &str = "sample.json";

/// Read side of the question store.
pub trait QuestionSource {
    /// Questions matching every criterion of `filter`.
    fn questions(&self, filter: &QuestionFilter) -> Vec<Question>;
}

/// Filter criteria. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionFilter {
    pub subject: Option<String>,
    pub chapters: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
}

impl QuestionFilter {
    pub fn matches(&self, q: &Question) -> bool {
        let subject_ok = match (&self.subject, &q.subject) {
            (None, _) => true,
            (Some(want), Some(have)) => want.eq_ignore_ascii_case(have),
            (Some(_), None) => false,
        };

        let chapter_ok = self.chapters.is_empty()
            || q.chapter
                .as_ref()
                .is_some_and(|ch| self.chapters.iter().any(|c| c == ch));

        let category_ok = self.categories.is_empty()
            || q.categories.iter().any(|c| self.categories.contains(c));

        // tag filter is an overlap, not a subset
        let tag_ok = self.tags.is_empty() || q.tags.iter().any(|t| self.tags.contains(t));

        let difficulty_ok = self.difficulty.map_or(true, |d| d == q.difficulty);

        subject_ok && chapter_ok && category_ok && tag_ok && difficulty_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
}

impl Subject {
    /// Explicit limit if the bank sets one, otherwise the paper default.
    pub fn time_limit(&self) -> u32 {
        self.time_limit_secs
            .unwrap_or_else(|| default_time_limit(&self.name))
    }
}

/// Botany and Zoology get 40 minutes, everything else 50.
pub fn default_time_limit(subject: &str) -> u32 {
    if subject.eq_ignore_ascii_case("botany") || subject.eq_ignore_ascii_case("zoology") {
        SHORT_PAPER_TIME_LIMIT_SECS
    } else {
        DEFAULT_TIME_LIMIT_SECS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let bank: QuestionBank = serde_json::from_slice(bytes)?;

        let duplicates = bank.questions.iter().map(|q| &q.id).duplicates().count();
        if duplicates > 0 {
            tracing::warn!(duplicates, "question bank contains repeated ids");
        }
        tracing::info!(
            questions = bank.questions.len(),
            subjects = bank.subjects.len(),
            "loaded question bank"
        );
        Ok(bank)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_json(&bytes)
    }

    /// The sample bank bundled with the binary.
    pub fn builtin() -> Result<Self> {
        let file = BANK_DIR.get_file(BUILTIN_BANK).ok_or_else(|| {
            QuizError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("bundled bank {BUILTIN_BANK} is missing"),
            ))
        })?;
        Self::from_json(file.contents())
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Time budget for a quiz on `subject` (or a mixed quiz when `None`).
    pub fn time_limit_for(&self, subject: Option<&str>) -> Result<u32> {
        match subject {
            None => Ok(DEFAULT_TIME_LIMIT_SECS),
            Some(name) => match self.subject(name) {
                Some(s) => Ok(s.time_limit()),
                None if self.subjects.is_empty() => Ok(default_time_limit(name)),
                None => Err(QuizError::UnknownSubject(name.to_string())),
            },
        }
    }

    pub fn count(&self, filter: &QuestionFilter) -> usize {
        self.questions.iter().filter(|q| filter.matches(q)).count()
    }

    /// Sorted, distinct tags, narrowed to `chapters` when any are given.
    pub fn available_tags(&self, chapters: &[String]) -> Vec<String> {
        self.questions
            .iter()
            .filter(|q| {
                chapters.is_empty() || q.chapter.as_ref().is_some_and(|c| chapters.contains(c))
            })
            .flat_map(|q| q.tags.iter().cloned())
            .sorted()
            .dedup()
            .collect()
    }

    pub fn chapters(&self, subject: Option<&str>) -> Vec<String> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .filter(|q| match (subject, &q.subject) {
                (None, _) => true,
                (Some(want), Some(have)) => want.eq_ignore_ascii_case(have),
                (Some(_), None) => false,
            })
            .filter_map(|q| q.chapter.clone())
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }
}

impl QuestionSource for QuestionBank {
    fn questions(&self, filter: &QuestionFilter) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect()
    }
}
