use crate::attempts::AttemptSink;
use crate::error::QuizError;
use crate::question::OptionKey;
use crate::session::{QuizSession, SessionPhase, TickOutcome};
use crate::tracker::Submission;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

/// What the event loop should do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Which screen is on display. Derived from the session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Quiz,
    ConfirmFinish,
    Results,
    Solutions,
}

impl From<SessionPhase> for AppState {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Running => AppState::Quiz,
            SessionPhase::ConfirmFinish => AppState::ConfirmFinish,
            SessionPhase::Finished | SessionPhase::Expired => AppState::Results,
            SessionPhase::Reviewing(_) => AppState::Solutions,
        }
    }
}

/// A quiz session wired to its attempt sink, plus the inline notice line.
pub struct App<K: AttemptSink> {
    pub session: QuizSession,
    pub sink: K,
    pub notice: Option<String>,
}

impl<K: AttemptSink> App<K> {
    pub fn new(session: QuizSession, sink: K) -> Self {
        Self {
            session,
            sink,
            notice: None,
        }
    }

    pub fn state(&self) -> AppState {
        self.session.phase().into()
    }

    /// Starts the wall clock; call when the quiz is first drawn.
    pub fn start(&mut self, now: Instant) {
        self.session.start_clock(now);
    }

    pub fn on_tick(&mut self, now: Instant) -> TickOutcome {
        let outcome = self.session.advance(now);
        if outcome == TickOutcome::Expired {
            self.notice = Some("Time's up! Your answers were submitted.".to_string());
        }
        outcome
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match self.state() {
            AppState::Quiz => self.on_quiz_key(key),
            AppState::ConfirmFinish => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        self.session.confirm_finish();
                        self.notice = None;
                    }
                    KeyCode::Char('n') | KeyCode::Esc => {
                        self.session.resume();
                    }
                    _ => {}
                }
                Control::Continue
            }
            AppState::Results => match key.code {
                KeyCode::Char('s') | KeyCode::Char('v') => {
                    self.session.review();
                    Control::Continue
                }
                KeyCode::Char('q') | KeyCode::Esc => Control::Quit,
                _ => Control::Continue,
            },
            AppState::Solutions => {
                match key.code {
                    KeyCode::Left | KeyCode::Char('p') => {
                        self.session.previous();
                    }
                    KeyCode::Right | KeyCode::Char('n') => {
                        self.session.next();
                    }
                    KeyCode::Char('b') | KeyCode::Backspace => {
                        self.session.back_to_results();
                    }
                    KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                    _ => {}
                }
                Control::Continue
            }
        }
    }

    fn on_quiz_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char(c) if OptionKey::from_char(c).is_some() => {
                if let Some(option) = OptionKey::from_char(c) {
                    self.session.select(option);
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Left | KeyCode::Char('p') => {
                self.session.previous();
                self.notice = None;
            }
            KeyCode::Right | KeyCode::Char('n') => {
                self.session.next();
                self.notice = None;
            }
            KeyCode::Home => {
                self.session.go_to(0);
            }
            KeyCode::End => {
                self.session.go_to(self.session.len() - 1);
            }
            KeyCode::Tab => {
                self.session.toggle_mode();
            }
            KeyCode::Char('f') => {
                self.session.request_finish();
            }
            _ => {}
        }
        Control::Continue
    }

    fn submit(&mut self) {
        match self.session.submit_highlighted(&mut self.sink) {
            Ok(Some(Submission::Recorded { correct })) => {
                self.notice = Some(if correct { "Correct!" } else { "Incorrect" }.to_string());
            }
            Ok(Some(Submission::AlreadyAttempted)) | Ok(None) => {}
            Err(QuizError::Persist { source, .. }) => {
                self.notice = Some(format!(
                    "Could not save your answer ({source}). Press Enter to retry."
                ));
            }
            Err(e) => {
                self.notice = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempts::MemoryAttemptStore;
    use crate::question::fixtures::question;
    use crate::session::SessionConfig;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(n: usize) -> App<MemoryAttemptStore> {
        let questions = (0..n)
            .map(|i| question(&format!("q{i}"), OptionKey::B))
            .collect();
        let config = SessionConfig {
            student_id: "s".to_string(),
            title: "Botany".to_string(),
            max_questions: 45,
            time_limit_secs: 2400,
        };
        App::new(
            QuizSession::new(config, questions).unwrap(),
            MemoryAttemptStore::new(),
        )
    }

    #[test]
    fn select_and_submit_with_keys() {
        let mut app = app(2);
        app.on_key(key(KeyCode::Char('b')));
        app.on_key(key(KeyCode::Enter));

        assert_eq!(app.session.correct_count(), 1);
        assert_eq!(app.sink.records().len(), 1);
        assert_eq!(app.notice.as_deref(), Some("Correct!"));

        // a second Enter on the same slot writes nothing
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.sink.records().len(), 1);
    }

    #[test]
    fn finish_flow_through_keys() {
        let mut app = app(2);
        app.on_key(key(KeyCode::Char('f')));
        assert_eq!(app.state(), AppState::ConfirmFinish);
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.state(), AppState::Quiz);

        app.on_key(key(KeyCode::Char('f')));
        app.on_key(key(KeyCode::Char('y')));
        assert_eq!(app.state(), AppState::Results);

        app.on_key(key(KeyCode::Char('s')));
        assert_eq!(app.state(), AppState::Solutions);
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.session.current_index(), 1);
        app.on_key(key(KeyCode::Char('b')));
        assert_eq!(app.state(), AppState::Results);
        assert_eq!(app.on_key(key(KeyCode::Char('q'))), Control::Quit);
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let mut app = app(1);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.on_key(ctrl_c), Control::Quit);
    }

    #[test]
    fn navigation_keys() {
        let mut app = app(4);
        app.on_key(key(KeyCode::End));
        assert_eq!(app.session.current_index(), 3);
        app.on_key(key(KeyCode::Left));
        assert_eq!(app.session.current_index(), 2);
        app.on_key(key(KeyCode::Home));
        assert_eq!(app.session.current_index(), 0);
    }

    #[test]
    fn expiry_sets_notice_once() {
        let mut app = app(1);
        let t0 = Instant::now();
        app.start(t0);
        let outcome = app.on_tick(t0 + std::time::Duration::from_secs(2400));
        assert_eq!(outcome, TickOutcome::Expired);
        assert_eq!(app.state(), AppState::Results);
        assert!(app.notice.is_some());
    }
}
