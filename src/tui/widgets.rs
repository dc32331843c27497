//! TUI widget rendering: header and key hints, notes, game menu, the four
//! game screens and the end-of-game leaderboard.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};

use crate::games::keyword::Feedback;
use crate::games::{
    Availability, CardKind, FlashcardGame, GAME_DURATION_SECS, KeywordGame, MatchUpGame,
    ShootingGame, availability,
};
use crate::leaderboard::Leaderboard;
use crate::model::{GameKind, StudyContent};
use crate::session::View;

/// Shown in place of the notes list when the model returned none.
pub const NO_NOTES: &str =
    "No notes were generated. The source document might be empty or in an unsupported format.";

/// Columns in the Match-Up Mania grid.
pub const GRID_COLUMNS: usize = 4;

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn good() -> Style {
    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
}

fn bad() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

/// Draw the header and key-hint bar; returns the body area.
pub fn render_frame(frame: &mut Frame, file_name: &str, view: View, hints: &str) -> Rect {
    let [header_area, body_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(format!(" {label} "), Style::default().fg(Color::Black).bg(Color::Yellow))
        } else {
            Span::styled(format!(" {label} "), dim())
        }
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " NoteBlaster ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {file_name} ")),
        tab("Notes", view == View::Notes),
        tab("Games", view == View::Game),
    ]));
    frame.render_widget(header, header_area);
    frame.render_widget(Paragraph::new(Span::styled(hints.to_string(), dim())), hint_area);
    body_area
}

/// Bulleted notes, or [`NO_NOTES`].
pub fn note_lines(notes: &[String]) -> Vec<Line<'static>> {
    if notes.is_empty() {
        return vec![Line::from(Span::styled(NO_NOTES, dim()))];
    }
    notes
        .iter()
        .map(|note| {
            Line::from(vec![
                Span::styled(" • ", Style::default().fg(Color::Cyan)),
                Span::raw(note.clone()),
            ])
        })
        .collect()
}

pub fn render_notes(frame: &mut Frame, area: Rect, notes: &[String], scroll: u16) {
    let widget = Paragraph::new(note_lines(notes))
        .block(Block::default().borders(Borders::ALL).title(" Study Notes "))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(widget, area);
}

/// The game picker. Unavailable games are dimmed with their reason.
pub fn render_menu(frame: &mut Frame, area: Rect, content: &StudyContent, selected: usize) {
    let mut lines = Vec::new();
    for (i, kind) in GameKind::ALL.iter().enumerate() {
        let marker = if i == selected { "▶ " } else { "  " };
        let available = availability(*kind, content);
        let title_style = match (available.is_available(), i == selected) {
            (true, true) => bold().fg(Color::Yellow),
            (true, false) => bold(),
            (false, _) => dim(),
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(kind.title(), title_style),
        ]));
        let detail = match available {
            Availability::Available => Span::raw(format!("    {}", kind.description())),
            Availability::Unavailable { reason } => {
                Span::styled(format!("    {reason}"), Style::default().fg(Color::Red))
            }
        };
        lines.push(Line::from(detail));
        lines.push(Line::default());
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Choose a Game "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

/// Style for an option once an answer is showing.
fn option_style(option: &str, answer: &str, picked: Option<&str>) -> Style {
    match picked {
        None => Style::default(),
        Some(_) if option == answer => good(),
        Some(p) if p == option => bad(),
        Some(_) => dim(),
    }
}

/// Numbered option lines; keys `1`..`9` pick them.
pub fn option_lines(options: &[String], answer: &str, picked: Option<&str>) -> Vec<Line<'static>> {
    options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            Line::from(vec![
                Span::styled(format!(" [{}] ", i + 1), Style::default().fg(Color::Cyan)),
                Span::styled(option.clone(), option_style(option, answer, picked)),
            ])
        })
        .collect()
}

pub fn render_shooting(frame: &mut Frame, area: Rect, game: &ShootingGame) {
    let Some(question) = game.current_question() else {
        return;
    };
    let (n, total) = game.progress();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("Question {n} of {total}"), dim()),
            Span::raw("   "),
            Span::styled(format!("Score: {}", game.score()), bold()),
        ]),
        Line::default(),
        Line::from(Span::styled(question.question.clone(), bold())),
        Line::default(),
    ];
    lines.extend(option_lines(game.options(), &question.answer, game.selected()));
    if let Some(picked) = game.selected() {
        lines.push(Line::default());
        lines.push(if question.is_correct(picked) {
            Line::from(Span::styled("Hit! +10", good()))
        } else {
            Line::from(Span::styled("Miss!", bad()))
        });
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Target Practice "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_timer(frame: &mut Frame, area: Rect, time_left: u32) {
    let ratio = f64::from(time_left) / f64::from(GAME_DURATION_SECS);
    let color = if ratio > 0.25 { Color::Green } else { Color::Red };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{time_left}s"));
    frame.render_widget(gauge, area);
}

pub fn render_flashcard(frame: &mut Frame, area: Rect, game: &FlashcardGame) {
    let Some(card) = game.current_card() else {
        return;
    };
    let [timer_area, card_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
    render_timer(frame, timer_area, game.time_left());

    let (n, total) = game.progress();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("Card {n} of {total}"), dim()),
            Span::raw("   "),
            Span::styled(format!("Score: {}", game.score()), bold()),
        ]),
        Line::default(),
    ];
    match game.flipped() {
        None => {
            lines.push(Line::from(Span::styled(card.question.clone(), bold())));
            lines.push(Line::default());
            lines.extend(option_lines(game.options(), &card.answer, None));
        }
        Some(true) => {
            lines.push(Line::from(Span::styled("Correct!", good())));
            lines.push(Line::from(card.answer.clone()));
        }
        Some(false) => {
            lines.push(Line::from(Span::styled("Not quite.", bad())));
            lines.push(Line::from(format!("The answer was: {}", card.answer)));
        }
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Flashcard Frenzy "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, card_area);
}

pub fn render_keyword(frame: &mut Frame, area: Rect, game: &KeywordGame, input: &str) {
    let Some(question) = game.current_question() else {
        return;
    };
    let [timer_area, prompt_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(3),
    ])
    .areas(area);
    render_timer(frame, timer_area, game.time_left());

    let (n, total) = game.progress();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("Blank {n} of {total}"), dim()),
            Span::raw("   "),
            Span::styled(format!("Score: {}", game.score()), bold()),
        ]),
        Line::default(),
        Line::from(Span::styled(question.question.clone(), bold())),
        Line::default(),
    ];
    match game.feedback() {
        Some(Feedback::Correct) => lines.push(Line::from(Span::styled("Correct!", good()))),
        Some(Feedback::Incorrect) => lines.push(Line::from(vec![
            Span::styled("Answer: ", bad()),
            Span::raw(question.answer.clone()),
        ])),
        None => {}
    }
    let prompt = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Keyword Dash "))
        .wrap(Wrap { trim: false });
    frame.render_widget(prompt, prompt_area);

    let input_widget = Paragraph::new(input.to_string())
        .block(Block::default().borders(Borders::ALL).title(" > "))
        .style(Style::default().fg(Color::White));
    frame.render_widget(input_widget, input_area);
}

pub fn render_matchup(frame: &mut Frame, area: Rect, game: &MatchUpGame, cursor: usize) {
    let [status_area, grid_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("Moves: {}", game.moves()), bold()),
            Span::raw("   "),
            Span::styled(format!("Time: {}s", game.seconds()), bold()),
        ])),
        status_area,
    );

    let cards = game.cards();
    let rows = cards.len().div_ceil(GRID_COLUMNS).max(1);
    let row_areas = Layout::vertical(vec![Constraint::Fill(1); rows]).split(grid_area);
    for (row, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::horizontal(vec![Constraint::Fill(1); GRID_COLUMNS]).split(*row_area);
        for (col, cell) in cells.iter().enumerate() {
            let index = row * GRID_COLUMNS + col;
            let Some(card) = cards.get(index) else {
                continue;
            };
            let border = if index == cursor {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let (text, style) = if card.matched {
                (card.content.clone(), good())
            } else if card.flipped {
                let color = match card.kind {
                    CardKind::Question => Color::Cyan,
                    CardKind::Answer => Color::Magenta,
                };
                (card.content.clone(), Style::default().fg(color))
            } else {
                ("?".to_string(), dim())
            };
            let widget = Paragraph::new(Span::styled(text, style))
                .block(Block::default().borders(Borders::ALL).border_style(border))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(widget, *cell);
        }
    }
}

/// Human-readable timestamp for a leaderboard row.
pub fn format_date(date: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(date)
        .map(|d| d.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Leaderboard rows, best first.
pub fn leaderboard_lines(board: &Leaderboard) -> Vec<Line<'static>> {
    if board.is_empty() {
        return vec![Line::from(Span::styled("No scores yet.", dim()))];
    }
    board
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Line::from(vec![
                Span::styled(format!(" {}. ", i + 1), dim()),
                Span::styled(format!("{:>5}", entry.score), bold()),
                Span::styled(format!("   {}", format_date(&entry.date)), dim()),
            ])
        })
        .collect()
}

pub fn render_results(
    frame: &mut Frame,
    area: Rect,
    kind: GameKind,
    score: u32,
    board: &Leaderboard,
) {
    let mut lines = vec![
        Line::from(Span::styled("Game Over!", bold().fg(Color::Yellow))),
        Line::from(format!("Final score: {score}")),
        Line::default(),
        Line::from(Span::styled("Leaderboard", bold())),
    ];
    lines.extend(leaderboard_lines(board));
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", kind.title())),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameResult;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn empty_notes_show_message() {
        let lines = note_lines(&[]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to_string(), NO_NOTES);
    }

    #[test]
    fn notes_render_as_bullets() {
        let notes = vec!["First point".to_string(), "Second point".to_string()];
        let lines = note_lines(&notes);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].to_string(), " • Second point");
    }

    #[test]
    fn options_are_numbered_from_one() {
        let options = vec!["a".to_string(), "b".to_string()];
        let lines = option_lines(&options, "a", None);
        assert_eq!(lines[0].to_string(), " [1] a");
        assert_eq!(lines[1].to_string(), " [2] b");
    }

    #[test]
    fn picked_wrong_option_is_red() {
        assert_eq!(option_style("b", "a", Some("b")), bad());
        assert_eq!(option_style("a", "a", Some("b")), good());
        assert_eq!(option_style("c", "a", Some("b")), dim());
        assert_eq!(option_style("c", "a", None), Style::default());
    }

    #[test]
    fn unparseable_date_is_shown_raw() {
        assert_eq!(format_date("yesterday"), "yesterday");
        assert_eq!(format_date("2026-01-02T03:04:05.000Z").len(), 16);
    }

    #[test]
    fn menu_shows_unavailable_reason() {
        let mut terminal = Terminal::new(TestBackend::new(160, 20)).unwrap();
        let content = StudyContent::default();
        terminal
            .draw(|frame| render_menu(frame, frame.area(), &content, 0))
            .unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Target Practice"));
        assert!(text.contains("requires at least 4 multiple-choice questions"));
    }

    #[test]
    fn results_list_leaderboard() {
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        let board = Leaderboard::from_entries(vec![
            GameResult {
                score: 30,
                date: "2026-01-02T03:04:05.000Z".into(),
            },
            GameResult {
                score: 70,
                date: "2026-01-03T03:04:05.000Z".into(),
            },
        ]);
        terminal
            .draw(|frame| render_results(frame, frame.area(), GameKind::Typing, 70, &board))
            .unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Keyword Dash"));
        assert!(text.contains("Final score: 70"));
        assert!(text.find("   70").unwrap() < text.find("   30").unwrap());
    }
}
