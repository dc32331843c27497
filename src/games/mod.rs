//! The four study games as front-end-agnostic state machines.
//!
//! Each game moves `Start → Playing → End`. Nothing here sleeps or spawns
//! timers: the front end calls `tick()` once per second and calls the
//! game's `advance`/`resolve` method after the feedback delay constant has
//! elapsed. Randomness comes from a caller-supplied [`rand::Rng`] so games can
//! be replayed deterministically in tests.

pub mod flashcard;
pub mod keyword;
pub mod matchup;
pub mod shooting;

use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{GameKind, StudyContent};

pub use flashcard::FlashcardGame;
pub use keyword::KeywordGame;
pub use matchup::{Card, CardKind, FlipOutcome, MatchUpGame};
pub use shooting::ShootingGame;

/// Points for each correct answer in the quiz games.
pub const POINTS_PER_CORRECT: u32 = 10;

/// Countdown for the timed games.
pub const GAME_DURATION_SECS: u32 = 60;

/// Feedback shown after a Target Practice answer.
pub const SHOOTING_FEEDBACK: Duration = Duration::from_millis(1500);

/// Time a flashcard stays flipped.
pub const FLASHCARD_FLIP: Duration = Duration::from_millis(1200);

/// Feedback after a correct Keyword Dash answer.
pub const KEYWORD_CORRECT_FEEDBACK: Duration = Duration::from_millis(800);

/// Feedback after a wrong Keyword Dash answer; the answer is revealed meanwhile.
pub const KEYWORD_WRONG_FEEDBACK: Duration = Duration::from_millis(1500);

/// How long a mismatched pair stays face up.
pub const MISMATCH_DELAY: Duration = Duration::from_millis(1000);

/// Pairs dealt in Match-Up Mania (a 4x3 grid).
pub const MATCH_PAIRS: usize = 6;

/// Fewest multiple-choice questions Match-Up Mania needs.
pub const MIN_MATCH_QUESTIONS: usize = 4;

/// Lifecycle shared by every game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GamePhase {
    #[default]
    Start,
    Playing,
    End,
}

/// Result of a step that may finish the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    /// The game just ended with this score; record it once.
    Finished { score: u32 },
}

/// Whether a game can be played with the given content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable { reason: &'static str },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Check the minimum content each game needs.
pub fn availability(kind: GameKind, content: &StudyContent) -> Availability {
    match kind {
        GameKind::Shooting | GameKind::Flashcard if content.questions.is_empty() => {
            Availability::Unavailable {
                reason: "The AI didn't generate any multiple-choice questions for this document.",
            }
        }
        GameKind::Typing if content.fill_in_the_blank_questions.is_empty() => {
            Availability::Unavailable {
                reason: "The AI couldn't generate enough fill-in-the-blank questions from this document.",
            }
        }
        GameKind::Matching if content.questions.len() < MIN_MATCH_QUESTIONS => {
            Availability::Unavailable {
                reason: "This game requires at least 4 multiple-choice questions to play.",
            }
        }
        _ => Availability::Available,
    }
}

/// Shuffled copy of a slice.
pub(crate) fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Answer plus options without repeats, shuffled.
pub(crate) fn shuffled_options<R: Rng + ?Sized>(
    answer: &str,
    options: &[String],
    rng: &mut R,
) -> Vec<String> {
    let mut unique: Vec<String> = vec![answer.to_string()];
    for option in options {
        if !unique.contains(option) {
            unique.push(option.clone());
        }
    }
    unique.shuffle(rng);
    unique
}
