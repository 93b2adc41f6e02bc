use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, AppState},
    attempts::AttemptSink,
    navigation::ViewMode,
    question::{OptionKey, Question},
    scorer::SuggestionKind,
    session::{Ending, QuizSession},
    timer::format_clock,
    tracker::QuestionStatus,
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
/// Remaining time at which the clock turns red.
const LOW_TIME_SECS: u32 = 300;

impl<K: AttemptSink> Widget for &App<K> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state() {
            AppState::Quiz => render_quiz(self, area, buf, false),
            AppState::ConfirmFinish => {
                render_quiz(self, area, buf, false);
                render_confirm(&self.session, area, buf);
            }
            AppState::Results => render_results(self, area, buf),
            AppState::Solutions => render_quiz(self, area, buf, true),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn render_quiz<K: AttemptSink>(app: &App<K>, area: Rect, buf: &mut Buffer, reviewing: bool) {
    let session = &app.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(3), // status strip
            Constraint::Min(3),    // question body
            Constraint::Length(1), // notice
            Constraint::Length(1), // key legend
        ])
        .split(area);

    render_header(session, chunks[0], buf, reviewing);
    render_status_strip(session, chunks[1], buf);

    match session.navigator().mode() {
        ViewMode::Single => {
            let index = session.current_index();
            let lines = question_lines(
                session.current_question(),
                index,
                session.status(index),
                session.highlighted(),
                reviewing,
            );
            Paragraph::new(Text::from(lines))
                .wrap(Wrap { trim: false })
                .render(chunks[2], buf);
        }
        ViewMode::All => {
            let mut lines = Vec::new();
            let mut offset = 0;
            for (i, q) in session.questions().iter().enumerate() {
                if i == session.current_index() {
                    offset = lines.len() as u16;
                }
                let highlighted = if i == session.current_index() {
                    session.highlighted()
                } else {
                    None
                };
                lines.extend(question_lines(
                    q,
                    i,
                    session.status(i),
                    highlighted,
                    reviewing,
                ));
                lines.push(Line::default());
            }
            Paragraph::new(Text::from(lines))
                .wrap(Wrap { trim: false })
                .scroll((offset, 0))
                .render(chunks[2], buf);
        }
    }

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    let legend = if reviewing {
        "(←/→) navigate / (b) back to results / (q) quit"
    } else {
        "(a-d) choose / (enter) submit / (←/→) navigate / (tab) view all / (f) finish / (q) quit"
    };
    Paragraph::new(Span::styled(legend, Style::default().add_modifier(Modifier::ITALIC)))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn render_header(session: &QuizSession, area: Rect, buf: &mut Buffer, reviewing: bool) {
    let title = if reviewing {
        format!("{} - Solutions", session.config().title)
    } else {
        session.config().title.clone()
    };
    let progress = format!(
        "{}    Question {}/{}    Attempted {}/{}",
        title,
        session.current_index() + 1,
        session.len(),
        session.attempted_count(),
        session.len()
    );
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(8)])
        .split(area);
    Paragraph::new(Span::styled(progress, bold())).render(columns[0], buf);

    let remaining = session.remaining_secs();
    let clock_style = if remaining <= LOW_TIME_SECS {
        bold().fg(Color::Red)
    } else {
        bold()
    };
    Paragraph::new(Span::styled(format_clock(remaining), clock_style))
        .alignment(Alignment::Right)
        .render(columns[1], buf);
}

/// One numbered cell per slot, coloured by outcome; the current slot is
/// reversed.
fn render_status_strip(session: &QuizSession, area: Rect, buf: &mut Buffer) {
    let spans = session
        .statuses()
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let mut style = match status.correctness() {
                Some(true) => Style::default().fg(Color::Green),
                Some(false) => Style::default().fg(Color::Red),
                None => dim(),
            };
            if i == session.current_index() {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            Span::styled(format!("{:>2}", i + 1), style)
        })
        .flat_map(|cell| [cell, Span::raw(" ")])
        .collect::<Vec<_>>();

    Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn question_lines(
    question: &Question,
    index: usize,
    status: QuestionStatus,
    highlighted: Option<OptionKey>,
    reviewing: bool,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("Q{}. ", index + 1), bold()),
        Span::raw(question.text.clone()),
    ])];

    if let Some(image) = &question.image {
        lines.push(Line::from(Span::styled(
            format!("[image: {image}]"),
            dim().add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::default());

    let reveal = reviewing || status.is_attempted();
    for key in OptionKey::ALL {
        let is_answer = question.is_correct(key);
        let was_selected = status.selected() == Some(key);

        let style = if reveal && is_answer {
            bold().fg(Color::Green)
        } else if reveal && was_selected {
            bold().fg(Color::Red)
        } else if !reveal && highlighted == Some(key) {
            bold().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };

        let marker = match (reveal, is_answer, was_selected) {
            (true, true, _) => " ✓",
            (true, false, true) => " ✗",
            _ => "",
        };
        lines.push(Line::from(Span::styled(
            format!("  ({key}) {}{marker}", question.option(key)),
            style,
        )));
    }

    if reveal {
        if reviewing && !status.is_attempted() {
            lines.push(Line::from(Span::styled("  Not attempted", dim())));
        }
        if let Some(explanation) = &question.explanation {
            lines.push(Line::default());
            lines.push(Line::from(vec![
                Span::styled("Explanation: ", bold().fg(Color::Cyan)),
                Span::raw(explanation.clone()),
            ]));
        }
    }

    lines
}

fn render_confirm(session: &QuizSession, area: Rect, buf: &mut Buffer) {
    let popup = centered(area, 60, 7);
    Clear.render(popup, buf);

    let unattempted = session.len() - session.attempted_count();
    let lines = vec![
        Line::from(format!(
            "You have attempted {} of {} questions.",
            session.attempted_count(),
            session.len()
        )),
        Line::from(Span::styled(
            format!("{unattempted} unattempted questions will score 0."),
            dim(),
        )),
        Line::default(),
        Line::from(Span::styled("(y) finish / (n) keep going", bold())),
    ];

    Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Finish quiz? "),
        )
        .render(popup, buf);
}

fn render_results<K: AttemptSink>(app: &App<K>, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let summary = session.summary();

    let heading = match session.phase().ending() {
        Some(Ending::Expired) => "Time's up!",
        _ => "Quiz finished",
    };

    let tier_style = match summary.percentage {
        p if p >= 60.0 => bold().fg(Color::Green),
        p if p >= 30.0 => bold().fg(Color::Yellow),
        _ => bold().fg(Color::Red),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{heading} - {}", session.config().title),
            bold(),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(
                format!("{} / {}", summary.marks, summary.max_marks),
                bold(),
            ),
            Span::raw(format!("  ({:.2}%)  ", summary.percentage)),
            Span::styled(summary.tier.to_string(), tier_style),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled(
                format!("{} correct", summary.correct),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} incorrect", summary.incorrect),
                Style::default().fg(Color::Red),
            ),
            Span::raw("  "),
            Span::styled(format!("{} unattempted", summary.unattempted), dim()),
        ]),
        Line::from(format!(
            "accuracy {:.1}%  /  time {}  /  {:.0}s per attempt  /  best streak {}",
            summary.accuracy,
            format_clock(summary.elapsed_secs),
            summary.avg_secs_per_attempt,
            summary.best_streak
        )),
        Line::default(),
    ];

    for suggestion in summary.suggestions() {
        let color = match suggestion.kind {
            SuggestionKind::Success => Color::Green,
            SuggestionKind::Info => Color::Cyan,
            SuggestionKind::Warning => Color::Yellow,
        };
        lines.push(Line::from(Span::styled(
            suggestion.title,
            bold().fg(color),
        )));
        lines.push(Line::from(suggestion.message));
        lines.push(Line::default());
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[0], buf);

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }

    Paragraph::new(Span::styled(
        "(s) view solutions / (q) quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
