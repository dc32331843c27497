//! ratatui front end for a generated study set.
//!
//! Two tabs: the notes and the game menu. Games are driven from the event
//! loop: a tick every second for the timed games and a deadline for each
//! feedback delay, after which the game's `advance`/`resolve_mismatch` runs.
//! Finished games are recorded to the leaderboard store.

pub mod widgets;

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::NoteBlasterResult;
use crate::games::{
    Availability, FLASHCARD_FLIP, FlashcardGame, FlipOutcome, KeywordGame, MISMATCH_DELAY,
    MatchUpGame, Progress, SHOOTING_FEEDBACK, ShootingGame, availability,
};
use crate::leaderboard::{Leaderboard, LeaderboardStore};
use crate::model::{GameKind, StudyContent};
use crate::session::View;

const TICK: Duration = Duration::from_secs(1);
const POLL: Duration = Duration::from_millis(100);

/// A game in progress plus its input state.
#[derive(Debug)]
enum ActiveGame {
    Shooting(ShootingGame),
    Flashcard(FlashcardGame),
    Keyword { game: KeywordGame, input: String },
    Matching { game: MatchUpGame, cursor: usize },
}

impl ActiveGame {
    fn kind(&self) -> GameKind {
        match self {
            Self::Shooting(_) => GameKind::Shooting,
            Self::Flashcard(_) => GameKind::Flashcard,
            Self::Keyword { .. } => GameKind::Typing,
            Self::Matching { .. } => GameKind::Matching,
        }
    }
}

#[derive(Debug)]
enum Screen {
    Notes,
    Menu,
    Playing(ActiveGame),
    Finished {
        kind: GameKind,
        score: u32,
        board: Leaderboard,
    },
}

/// TUI application state.
pub struct NoteBlasterTui {
    file_name: String,
    content: StudyContent,
    store: LeaderboardStore,
    rng: StdRng,
    screen: Screen,
    notes_scroll: u16,
    menu_selected: usize,
    /// Status line shown under the menu, e.g. why a game cannot start.
    notice: Option<String>,
    next_tick: Option<Instant>,
    /// When the pending feedback delay ends.
    deadline: Option<Instant>,
    should_quit: bool,
}

impl NoteBlasterTui {
    pub fn new(file_name: impl Into<String>, content: StudyContent, store: LeaderboardStore) -> Self {
        Self::with_rng(file_name, content, store, StdRng::from_entropy())
    }

    /// Construct with a fixed random source.
    pub fn with_rng(
        file_name: impl Into<String>,
        content: StudyContent,
        store: LeaderboardStore,
        rng: StdRng,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            store,
            rng,
            screen: Screen::Notes,
            notes_scroll: 0,
            menu_selected: 0,
            notice: None,
            next_tick: None,
            deadline: None,
            should_quit: false,
        }
    }

    /// Run the TUI event loop until the user quits.
    pub fn run(&mut self) -> NoteBlasterResult<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut ratatui::DefaultTerminal) -> NoteBlasterResult<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            if self.should_quit {
                break;
            }

            if event::poll(POLL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers, Instant::now());
                    }
                }
            }
            self.update(Instant::now());
        }
        Ok(())
    }

    fn view(&self) -> View {
        match self.screen {
            Screen::Notes => View::Notes,
            _ => View::Game,
        }
    }

    fn hints(&self) -> &'static str {
        match &self.screen {
            Screen::Notes => " ↑/↓ scroll · Tab games · q quit",
            Screen::Menu => " ↑/↓ choose · Enter play · Tab notes · q quit",
            Screen::Playing(ActiveGame::Keyword { .. }) => " type the missing term · Enter submit · Esc menu",
            Screen::Playing(ActiveGame::Matching { .. }) => " arrows move · Enter/Space flip · Esc menu",
            Screen::Playing(_) => " 1-9 answer · Esc menu",
            Screen::Finished { .. } => " Enter play again · Esc menu · q quit",
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        let area = widgets::render_frame(frame, &self.file_name, self.view(), self.hints());
        match &self.screen {
            Screen::Notes => widgets::render_notes(frame, area, &self.content.notes, self.notes_scroll),
            Screen::Menu => {
                widgets::render_menu(frame, area, &self.content, self.menu_selected);
                if let Some(notice) = &self.notice {
                    let line = ratatui::layout::Rect {
                        y: area.bottom().saturating_sub(2),
                        height: 1,
                        x: area.x + 2,
                        width: area.width.saturating_sub(4),
                    };
                    frame.render_widget(
                        ratatui::widgets::Paragraph::new(notice.as_str())
                            .style(ratatui::style::Style::default().fg(ratatui::style::Color::Red)),
                        line,
                    );
                }
            }
            Screen::Playing(game) => match game {
                ActiveGame::Shooting(g) => widgets::render_shooting(frame, area, g),
                ActiveGame::Flashcard(g) => widgets::render_flashcard(frame, area, g),
                ActiveGame::Keyword { game, input } => {
                    widgets::render_keyword(frame, area, game, input)
                }
                ActiveGame::Matching { game, cursor } => {
                    widgets::render_matchup(frame, area, game, *cursor)
                }
            },
            Screen::Finished { kind, score, board } => {
                widgets::render_results(frame, area, *kind, *score, board)
            }
        }
    }

    /// Start a game if the content supports it.
    fn start_game(&mut self, kind: GameKind, now: Instant) {
        if let Availability::Unavailable { reason } = availability(kind, &self.content) {
            self.notice = Some(reason.to_string());
            return;
        }
        self.notice = None;
        let mut game = match kind {
            GameKind::Shooting => {
                ActiveGame::Shooting(ShootingGame::new(self.content.questions.clone()))
            }
            GameKind::Flashcard => {
                ActiveGame::Flashcard(FlashcardGame::new(self.content.questions.clone()))
            }
            GameKind::Typing => ActiveGame::Keyword {
                game: KeywordGame::new(self.content.fill_in_the_blank_questions.clone()),
                input: String::new(),
            },
            GameKind::Matching => ActiveGame::Matching {
                game: MatchUpGame::new(self.content.questions.clone()),
                cursor: 0,
            },
        };
        match &mut game {
            ActiveGame::Shooting(g) => g.start(&mut self.rng),
            ActiveGame::Flashcard(g) => g.start(&mut self.rng),
            ActiveGame::Keyword { game, .. } => game.start(&mut self.rng),
            ActiveGame::Matching { game, .. } => game.start(&mut self.rng),
        }
        tracing::info!(game = %kind, "game started");
        self.deadline = None;
        self.next_tick = Some(now + TICK);
        self.screen = Screen::Playing(game);
    }

    /// Record a finished game and show the leaderboard.
    fn finish_game(&mut self, kind: GameKind, score: u32) {
        tracing::info!(game = %kind, score, "game finished");
        let board = match self.store.record(kind, score) {
            Ok(board) => board,
            Err(e) => {
                tracing::warn!(error = %e, "could not save score");
                self.store.load(kind)
            }
        };
        self.deadline = None;
        self.next_tick = None;
        self.screen = Screen::Finished { kind, score, board };
    }

    /// Fire the per-second tick and any expired feedback delay.
    pub fn update(&mut self, now: Instant) {
        let Screen::Playing(game) = &mut self.screen else {
            return;
        };

        let mut finished = None;
        if let Some(next) = self.next_tick {
            if now >= next {
                self.next_tick = Some(next + TICK);
                let progress = match game {
                    ActiveGame::Flashcard(g) => g.tick(),
                    ActiveGame::Keyword { game, .. } => game.tick(),
                    ActiveGame::Matching { game, .. } => {
                        game.tick();
                        Progress::Continue
                    }
                    ActiveGame::Shooting(_) => Progress::Continue,
                };
                if let Progress::Finished { score } = progress {
                    finished = Some(score);
                }
            }
        }

        if finished.is_none() && self.deadline.is_some_and(|d| now >= d) {
            self.deadline = None;
            let progress = match game {
                ActiveGame::Shooting(g) => g.advance(),
                ActiveGame::Flashcard(g) => g.advance(),
                ActiveGame::Keyword { game, input } => {
                    input.clear();
                    game.advance()
                }
                ActiveGame::Matching { game, .. } => {
                    game.resolve_mismatch();
                    Progress::Continue
                }
            };
            if let Progress::Finished { score } = progress {
                finished = Some(score);
            }
        }

        if let Some(score) = finished {
            let kind = game.kind();
            self.finish_game(kind, score);
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match &mut self.screen {
            Screen::Notes => match code {
                KeyCode::Up => self.notes_scroll = self.notes_scroll.saturating_sub(1),
                KeyCode::Down => self.notes_scroll = self.notes_scroll.saturating_add(1),
                KeyCode::PageUp => self.notes_scroll = self.notes_scroll.saturating_sub(10),
                KeyCode::PageDown => self.notes_scroll = self.notes_scroll.saturating_add(10),
                KeyCode::Home => self.notes_scroll = 0,
                KeyCode::Tab | KeyCode::Right => self.screen = Screen::Menu,
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            Screen::Menu => match code {
                KeyCode::Up => self.menu_selected = self.menu_selected.saturating_sub(1),
                KeyCode::Down => {
                    self.menu_selected = (self.menu_selected + 1).min(GameKind::ALL.len() - 1)
                }
                KeyCode::Enter => self.start_game(GameKind::ALL[self.menu_selected], now),
                KeyCode::Tab | KeyCode::Left => {
                    self.notice = None;
                    self.screen = Screen::Notes;
                }
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            Screen::Finished { kind, .. } => match code {
                KeyCode::Enter => {
                    let kind = *kind;
                    self.start_game(kind, now);
                }
                KeyCode::Esc | KeyCode::Char('m') => self.screen = Screen::Menu,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Screen::Playing(_) if code == KeyCode::Esc => {
                tracing::debug!("game abandoned");
                self.deadline = None;
                self.next_tick = None;
                self.screen = Screen::Menu;
            }
            Screen::Playing(game) => {
                let outcome = play_key(game, code);
                match outcome {
                    KeyOutcome::Nothing => {}
                    KeyOutcome::Wait(delay) => self.deadline = Some(now + delay),
                    KeyOutcome::Finished(score) => {
                        let kind = game.kind();
                        self.finish_game(kind, score);
                    }
                }
            }
        }
    }

    /// Whether the loop has been asked to exit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// What a key did inside a game.
enum KeyOutcome {
    Nothing,
    /// Feedback is showing; advance after this delay.
    Wait(Duration),
    Finished(u32),
}

fn digit_choice(code: KeyCode) -> Option<usize> {
    match code {
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| d as usize - 1),
        _ => None,
    }
}

fn play_key(game: &mut ActiveGame, code: KeyCode) -> KeyOutcome {
    match game {
        ActiveGame::Shooting(g) => match digit_choice(code).and_then(|i| g.answer(i)) {
            Some(_) => KeyOutcome::Wait(SHOOTING_FEEDBACK),
            None => KeyOutcome::Nothing,
        },
        ActiveGame::Flashcard(g) => match digit_choice(code).and_then(|i| g.answer(i)) {
            Some(_) => KeyOutcome::Wait(FLASHCARD_FLIP),
            None => KeyOutcome::Nothing,
        },
        ActiveGame::Keyword { game, input } => {
            if game.feedback().is_some() {
                return KeyOutcome::Nothing;
            }
            match code {
                KeyCode::Char(c) => input.push(c),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Enter => {
                    if let Some(feedback) = game.submit(input) {
                        return KeyOutcome::Wait(feedback.delay());
                    }
                }
                _ => {}
            }
            KeyOutcome::Nothing
        }
        ActiveGame::Matching { game, cursor } => {
            let len = game.cards().len();
            let cols = widgets::GRID_COLUMNS;
            match code {
                KeyCode::Left => *cursor = cursor.saturating_sub(1),
                KeyCode::Right => *cursor = (*cursor + 1).min(len.saturating_sub(1)),
                KeyCode::Up => *cursor = cursor.saturating_sub(cols),
                KeyCode::Down if *cursor + cols < len => *cursor += cols,
                KeyCode::Enter | KeyCode::Char(' ') => {
                    return match game.flip(*cursor) {
                        FlipOutcome::Mismatch => KeyOutcome::Wait(MISMATCH_DELAY),
                        FlipOutcome::Completed { score } => KeyOutcome::Finished(score),
                        _ => KeyOutcome::Nothing,
                    };
                }
                _ => {}
            }
            KeyOutcome::Nothing
        }
    }
}

impl std::fmt::Debug for NoteBlasterTui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteBlasterTui")
            .field("file_name", &self.file_name)
            .field("screen", &self.screen)
            .finish()
    }
}
