use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::question::{OptionKey, QuestionId};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One scored answer, written once per submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub student_id: String,
    pub question_id: QuestionId,
    pub selected: OptionKey,
    pub is_correct: bool,
    pub attempted_at: DateTime<Local>,
}

/// Durable destination for attempts.
pub trait AttemptSink {
    fn record_attempt(&mut self, record: &AttemptRecord) -> Result<()>;
}

impl<T: AttemptSink + ?Sized> AttemptSink for Box<T> {
    fn record_attempt(&mut self, record: &AttemptRecord) -> Result<()> {
        (**self).record_attempt(record)
    }
}

/// Questions a student has answered in earlier sessions.
pub trait AttemptHistory {
    fn attempted_ids(&self, student_id: &str) -> Result<HashSet<QuestionId>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistorySummary {
    pub attempts: u64,
    pub correct: u64,
    pub distinct_questions: u64,
}

impl HistorySummary {
    pub fn accuracy(&self) -> f64 {
        if self.attempts > 0 {
            self.correct as f64 / self.attempts as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// SQLite-backed attempt history
#[derive(Debug)]
pub struct SqliteAttemptStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteAttemptStore {
    /// Opens the store under the state directory, creating it if needed
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("drillq_attempts.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS student_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id TEXT NOT NULL,
                question_id TEXT NOT NULL,
                selected_option TEXT NOT NULL,
                is_correct BOOLEAN NOT NULL,
                attempted_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_student_attempts_student ON student_attempts(student_id)",
            [],
        )?;

        tracing::debug!(path = ?path, "attempt store ready");
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Totals across every session the student has taken
    pub fn summary(&self, student_id: &str) -> Result<HistorySummary> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN is_correct = 1 THEN 1 ELSE 0 END), 0),
                COUNT(DISTINCT question_id)
            FROM student_attempts
            WHERE student_id = ?1
            "#,
        )?;

        let summary = stmt.query_row([student_id], |row| {
            Ok(HistorySummary {
                attempts: row.get::<_, i64>(0)? as u64,
                correct: row.get::<_, i64>(1)? as u64,
                distinct_questions: row.get::<_, i64>(2)? as u64,
            })
        })?;
        Ok(summary)
    }

    /// Every attempt of a student, oldest first
    pub fn attempts(&self, student_id: &str) -> Result<Vec<AttemptRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT student_id, question_id, selected_option, is_correct, attempted_at
            FROM student_attempts
            WHERE student_id = ?1
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map([student_id], |row| {
            let selected: String = row.get(2)?;
            let selected = OptionKey::from_tag(&selected).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    2,
                    "selected_option".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;
            let at: String = row.get(4)?;
            let attempted_at = DateTime::parse_from_rfc3339(&at)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        4,
                        "attempted_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(AttemptRecord {
                student_id: row.get(0)?,
                question_id: QuestionId::from(row.get::<_, String>(1)?),
                selected,
                is_correct: row.get(3)?,
                attempted_at,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl AttemptSink for SqliteAttemptStore {
    fn record_attempt(&mut self, record: &AttemptRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO student_attempts
            (student_id, question_id, selected_option, is_correct, attempted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.student_id,
                record.question_id.as_str(),
                record.selected.as_tag(),
                record.is_correct,
                record.attempted_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl AttemptHistory for SqliteAttemptStore {
    fn attempted_ids(&self, student_id: &str) -> Result<HashSet<QuestionId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT question_id FROM student_attempts WHERE student_id = ?1")?;
        let rows = stmt.query_map([student_id], |row| row.get::<_, String>(0))?;

        let mut ids = HashSet::new();
        for id in rows {
            ids.insert(QuestionId::from(id?));
        }
        Ok(ids)
    }
}

/// Attempt store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryAttemptStore {
    records: Vec<AttemptRecord>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }
}

impl AttemptSink for MemoryAttemptStore {
    fn record_attempt(&mut self, record: &AttemptRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

impl AttemptHistory for MemoryAttemptStore {
    fn attempted_ids(&self, student_id: &str) -> Result<HashSet<QuestionId>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.student_id == student_id)
            .map(|r| r.question_id.clone())
            .collect())
    }
}
