mod common;

use drillq::attempts::{AttemptHistory, SqliteAttemptStore};
use drillq::bank::{QuestionBank, QuestionFilter};
use drillq::question::OptionKey;
use drillq::session::{QuizSession, SessionConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tempfile::tempdir;

fn config(max: usize) -> SessionConfig {
    SessionConfig {
        student_id: "ravi".to_string(),
        title: "Botany".to_string(),
        max_questions: max,
        time_limit_secs: 2400,
    }
}

fn botany() -> QuestionFilter {
    QuestionFilter {
        subject: Some("Botany".to_string()),
        ..Default::default()
    }
}

#[test]
fn later_sessions_prefer_questions_not_seen_before() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("attempts.db");
    let bank = QuestionBank::from_json(common::bank_json().as_bytes()).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    // first session answers all six questions it was given
    let first_ids: HashSet<_> = {
        let mut store = SqliteAttemptStore::open(&db).unwrap();
        let mut session =
            QuizSession::start(config(6), &botany(), &bank, &store, &mut rng).unwrap();
        for i in 0..session.len() {
            session.submit(i, OptionKey::B, &mut store).unwrap();
        }
        assert_eq!(session.summary().marks, 24);
        session.questions().iter().map(|q| q.id.clone()).collect()
    };

    let store = SqliteAttemptStore::open(&db).unwrap();
    assert_eq!(store.attempted_ids("ravi").unwrap(), first_ids);
    assert!(store.attempted_ids("someone-else").unwrap().is_empty());

    // four fresh questions remain; they come first and two seen ones backfill
    let session = QuizSession::start(config(6), &botany(), &bank, &store, &mut rng).unwrap();
    let ids: Vec<_> = session.questions().iter().map(|q| q.id.clone()).collect();
    assert_eq!(ids.len(), 6);
    assert!(ids[..4].iter().all(|id| !first_ids.contains(id)));
    assert!(ids[4..].iter().all(|id| first_ids.contains(id)));
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 6);

    let summary = store.summary("ravi").unwrap();
    assert_eq!(summary.attempts, 6);
    assert_eq!(summary.correct, 6);
}

#[test]
fn resubmitting_a_slot_writes_one_row() {
    let bank = QuestionBank::from_json(common::bank_json().as_bytes()).unwrap();
    let mut store = SqliteAttemptStore::in_memory().unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let mut session = QuizSession::start(config(2), &botany(), &bank, &store, &mut rng).unwrap();

    session.submit(0, OptionKey::A, &mut store).unwrap();
    session.submit(0, OptionKey::B, &mut store).unwrap();

    let attempts = store.attempts("ravi").unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].selected, OptionKey::A);
    assert!(!attempts[0].is_correct);
}
