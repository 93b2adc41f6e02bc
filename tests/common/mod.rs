#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// A small two-subject bank; Botany has ten questions whose answer is always `b`.
pub fn bank_json() -> String {
    let mut questions = Vec::new();
    for i in 0..10 {
        questions.push(format!(
            r#"{{
                "id": "bot-{i}",
                "text": "Botany question {i}",
                "options": ["one", "two", "three", "four"],
                "correct": "b",
                "explanation": "Because two.",
                "subject": "Botany",
                "chapter": "{chapter}",
                "tags": ["{tag}"]
            }}"#,
            chapter = if i < 6 { "Plant Kingdom" } else { "Genetics" },
            tag = if i % 2 == 0 { "pyq" } else { "ncert" },
        ));
    }
    for i in 0..4 {
        questions.push(format!(
            r#"{{
                "id": "phy-{i}",
                "text": "Physics question {i}",
                "options": ["one", "two", "three", "four"],
                "correct": "a",
                "difficulty": "hard",
                "subject": "Physics",
                "chapter": "Optics",
                "tags": ["lenses"]
            }}"#
        ));
    }
    format!(
        r#"{{
            "subjects": [{{ "name": "Botany" }}, {{ "name": "Physics", "time_limit_secs": 1800 }}],
            "questions": [{}]
        }}"#,
        questions.join(",")
    )
}

pub fn write_bank(dir: &Path) -> PathBuf {
    let path = dir.join("bank.json");
    std::fs::write(&path, bank_json()).unwrap();
    path
}
