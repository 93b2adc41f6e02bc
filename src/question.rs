use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a question in the bank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the four answer choices.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];

    pub fn index(self) -> usize {
        match self {
            OptionKey::A => 0,
            OptionKey::B => 1,
            OptionKey::C => 2,
            OptionKey::D => 3,
        }
    }

    /// Maps a key press (`a`-`d` or `1`-`4`) to an option.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' | '1' => Some(OptionKey::A),
            'b' | '2' => Some(OptionKey::B),
            'c' | '3' => Some(OptionKey::C),
            'd' | '4' => Some(OptionKey::D),
            _ => None,
        }
    }

    /// Lowercase tag as stored in the attempts table.
    pub fn as_tag(self) -> &'static str {
        match self {
            OptionKey::A => "a",
            OptionKey::B => "b",
            OptionKey::C => "c",
            OptionKey::D => "d",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        let mut chars = tag.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Self::from_char(c),
            _ => None,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// A multiple-choice question as authored in the bank. Read-only for the
/// lifetime of a quiz session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    pub options: [String; 4],
    pub correct: OptionKey,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    pub fn option(&self, key: OptionKey) -> &str {
        &self.options[key.index()]
    }

    pub fn is_correct(&self, key: OptionKey) -> bool {
        self.correct == key
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Builds a minimal question whose correct answer is `correct`.
    pub fn question(id: &str, correct: OptionKey) -> Question {
        Question {
            id: QuestionId::from(id),
            text: format!("Question {id}"),
            image: None,
            options: [
                "first".to_string(),
                "second".to_string(),
                "third".to_string(),
                "fourth".to_string(),
            ],
            correct,
            explanation: None,
            difficulty: Difficulty::Medium,
            subject: None,
            chapter: None,
            categories: vec![],
            tags: vec![],
        }
    }

    pub fn pool(prefix: &str, n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| question(&format!("{prefix}{i}"), OptionKey::A))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_key_from_char() {
        assert_eq!(OptionKey::from_char('a'), Some(OptionKey::A));
        assert_eq!(OptionKey::from_char('D'), Some(OptionKey::D));
        assert_eq!(OptionKey::from_char('3'), Some(OptionKey::C));
        assert_eq!(OptionKey::from_char('e'), None);
        assert_eq!(OptionKey::from_char('5'), None);
    }

    #[test]
    fn option_key_tags() {
        for key in OptionKey::ALL {
            assert_eq!(OptionKey::from_tag(key.as_tag()), Some(key));
        }
        assert_eq!(OptionKey::from_tag(""), None);
        assert_eq!(OptionKey::from_tag("ab"), None);
        assert_eq!(OptionKey::from_tag("1"), None);
    }

    #[test]
    fn question_deserializes_with_defaults() {
        let json = r#"{
            "id": "bio-1",
            "text": "Powerhouse of the cell?",
            "options": ["Nucleus", "Mitochondria", "Ribosome", "Golgi body"],
            "correct": "b"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.id.as_str(), "bio-1");
        assert_eq!(q.correct, OptionKey::B);
        assert_eq!(q.option(OptionKey::B), "Mitochondria");
        assert_eq!(q.difficulty, Difficulty::Medium);
        assert!(q.tags.is_empty());
        assert!(q.is_correct(OptionKey::B));
        assert!(!q.is_correct(OptionKey::A));
    }

    #[test]
    fn difficulty_display() {
        assert_eq!(Difficulty::Hard.to_string(), "Hard");
        assert_eq!(OptionKey::C.to_string(), "C");
    }
}
