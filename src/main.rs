use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use drillq::{
    app::{App, Control},
    attempts::{AttemptSink, MemoryAttemptStore, SqliteAttemptStore},
    bank::{QuestionBank, QuestionFilter},
    config::{Config, ConfigStore, FileConfigStore},
    error::QuizError,
    logging,
    question::Difficulty,
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    session::{QuizSession, SessionConfig},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};

/// timed multiple-choice exam practice in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Timed multiple-choice practice with NEET-style marking (+4 / -1 / 0). Questions you have not attempted before are served first."
)]
pub struct Cli {
    /// question bank (JSON) to draw from; defaults to the built-in sample bank
    #[clap(long)]
    bank: Option<PathBuf>,

    /// student whose attempt history is used and extended
    #[clap(long)]
    student: Option<String>,

    /// only questions from this subject
    #[clap(short = 's', long)]
    subject: Option<String>,

    /// only questions from these chapters
    #[clap(short = 'c', long = "chapter")]
    chapters: Vec<String>,

    /// only questions in any of these categories
    #[clap(long = "category")]
    categories: Vec<String>,

    /// only questions carrying any of these tags
    #[clap(short = 't', long = "tag")]
    tags: Vec<String>,

    /// only questions of this difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// maximum number of questions in the quiz
    #[clap(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    max_questions: Option<u64>,

    /// time limit in seconds, overriding the subject's
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    secs: Option<u32>,

    /// print the tags available for the selected chapters and exit
    #[clap(long)]
    list_tags: bool,

    /// print the chapters of the selected subject and exit
    #[clap(long)]
    list_chapters: bool,

    /// print how many questions match the filters and exit
    #[clap(long)]
    count: bool,

    /// print the student's attempt history totals and exit
    #[clap(long)]
    history: bool,

    /// do not read or write attempt history
    #[clap(long)]
    no_history: bool,
}

impl Cli {
    fn filter(&self) -> QuestionFilter {
        QuestionFilter {
            subject: self.subject.clone(),
            chapters: self.chapters.clone(),
            categories: self.categories.clone(),
            tags: self.tags.clone(),
            difficulty: self.difficulty,
        }
    }

    /// Stored defaults overridden by flags. `--secs` is left out; it only
    /// applies to the current run.
    fn merge(&self, stored: Config) -> Config {
        Config {
            max_questions: self
                .max_questions
                .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
                .unwrap_or(stored.max_questions),
            time_limit_secs: stored.time_limit_secs,
            bank_path: self.bank.clone().or(stored.bank_path),
            student_id: self.student.clone().unwrap_or(stored.student_id),
        }
    }

    fn is_informational(&self) -> bool {
        self.list_tags || self.list_chapters || self.count || self.history
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let store = FileConfigStore::new();
    let config = cli.merge(store.load());

    let bank = match &config.bank_path {
        Some(path) => QuestionBank::load(path),
        None => QuestionBank::builtin(),
    }
    .unwrap_or_else(|e| fail(ErrorKind::Io, format!("cannot load question bank: {e}")));

    if cli.is_informational() {
        return print_info(&cli, &config, &bank);
    }

    let subject_limit = bank
        .time_limit_for(cli.subject.as_deref())
        .unwrap_or_else(|e| fail(ErrorKind::InvalidValue, e.to_string()));
    let session_config = SessionConfig {
        student_id: config.student_id.clone(),
        title: cli
            .subject
            .clone()
            .unwrap_or_else(|| "Mixed practice".to_string()),
        max_questions: config.max_questions,
        time_limit_secs: cli.secs.or(config.time_limit_secs).unwrap_or(subject_limit),
    };

    let filter = cli.filter();
    let mut rng = rand::thread_rng();
    let (session, sink): (QuizSession, Box<dyn AttemptSink>) = if cli.no_history {
        let history = MemoryAttemptStore::new();
        let session = QuizSession::start(session_config, &filter, &bank, &history, &mut rng);
        (or_fail(session), Box::new(history) as Box<dyn AttemptSink>)
    } else {
        let history = SqliteAttemptStore::open_default()?;
        let session = QuizSession::start(session_config, &filter, &bank, &history, &mut rng);
        (or_fail(session), Box::new(history) as Box<dyn AttemptSink>)
    };

    // only settings that produced a session are kept
    if let Err(e) = store.save(&config) {
        tracing::warn!(path = %store.path().display(), error = %e, "could not save config");
    }

    if !stdin().is_tty() {
        fail(ErrorKind::Io, "stdin must be a tty");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, sink);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "quiz loop failed");
    }
    let summary = app.session.summary();
    tracing::info!(
        marks = summary.marks,
        max_marks = summary.max_marks,
        attempted = summary.attempted(),
        "session closed"
    );
    app.session.abandon();

    result
}

fn start_tui<B: Backend, K: AttemptSink>(
    terminal: &mut Terminal<B>,
    app: &mut App<K>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    app.start(Instant::now());

    loop {
        match runner.step() {
            QuizEvent::Tick => {
                app.on_tick(Instant::now());
            }
            QuizEvent::Resize => {}
            QuizEvent::Key(key) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
            }
        }
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}

fn print_info(cli: &Cli, config: &Config, bank: &QuestionBank) -> Result<(), Box<dyn Error>> {
    if cli.count {
        println!("{}", bank.count(&cli.filter()));
    }
    if cli.list_chapters {
        for chapter in bank.chapters(cli.subject.as_deref()) {
            println!("{chapter}");
        }
    }
    if cli.list_tags {
        for tag in bank.available_tags(&cli.chapters) {
            println!("{tag}");
        }
    }
    if cli.history {
        let store = SqliteAttemptStore::open_default()?;
        let summary = store.summary(&config.student_id)?;
        println!(
            "{}: {} attempts, {} correct ({:.1}%), {} distinct questions",
            config.student_id,
            summary.attempts,
            summary.correct,
            summary.accuracy(),
            summary.distinct_questions
        );
    }
    Ok(())
}

fn or_fail<T>(result: Result<T, QuizError>) -> T {
    result.unwrap_or_else(|e| {
        let kind = if e.is_recoverable() {
            ErrorKind::Io
        } else {
            ErrorKind::InvalidValue
        };
        fail(kind, e.to_string())
    })
}

fn fail(kind: ErrorKind, message: impl std::fmt::Display) -> ! {
    tracing::error!(%message, "exiting");
    let mut cmd = Cli::command();
    cmd.error(kind, message).exit()
}
