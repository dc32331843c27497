//! Keyword Dash: type the missing term before the clock runs out.

use std::time::Duration;

use rand::Rng;

use crate::games::{
    GAME_DURATION_SECS, GamePhase, KEYWORD_CORRECT_FEEDBACK, KEYWORD_WRONG_FEEDBACK,
    POINTS_PER_CORRECT, Progress, shuffled,
};
use crate::model::FillInTheBlankQuestion;

/// Feedback for the last submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}

impl Feedback {
    /// How long the feedback stays before the next question.
    pub fn delay(&self) -> Duration {
        match self {
            Self::Correct => KEYWORD_CORRECT_FEEDBACK,
            Self::Incorrect => KEYWORD_WRONG_FEEDBACK,
        }
    }
}

/// Timed fill-in-the-blank typing game.
#[derive(Debug, Clone)]
pub struct KeywordGame {
    questions: Vec<FillInTheBlankQuestion>,
    deck: Vec<FillInTheBlankQuestion>,
    phase: GamePhase,
    index: usize,
    score: u32,
    time_left: u32,
    feedback: Option<Feedback>,
}

impl KeywordGame {
    pub fn new(questions: Vec<FillInTheBlankQuestion>) -> Self {
        Self {
            questions,
            deck: Vec::new(),
            phase: GamePhase::Start,
            index: 0,
            score: 0,
            time_left: GAME_DURATION_SECS,
            feedback: None,
        }
    }

    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deck = shuffled(&self.questions, rng);
        self.index = 0;
        self.score = 0;
        self.time_left = GAME_DURATION_SECS;
        self.feedback = None;
        self.phase = if self.deck.is_empty() {
            GamePhase::End
        } else {
            GamePhase::Playing
        };
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.index + 1, self.deck.len())
    }

    pub fn current_question(&self) -> Option<&FillInTheBlankQuestion> {
        match self.phase {
            GamePhase::Playing => self.deck.get(self.index),
            _ => None,
        }
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// One second passed.
    pub fn tick(&mut self) -> Progress {
        if self.phase != GamePhase::Playing {
            return Progress::Continue;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.finish()
        } else {
            Progress::Continue
        }
    }

    /// Submit typed input. Blank input, or input while feedback is showing,
    /// is ignored and returns `None`.
    pub fn submit(&mut self, input: &str) -> Option<Feedback> {
        if input.trim().is_empty() || self.feedback.is_some() {
            return None;
        }
        let question = self.current_question()?;
        let feedback = if question.accepts(input) {
            self.score += POINTS_PER_CORRECT;
            Feedback::Correct
        } else {
            Feedback::Incorrect
        };
        self.feedback = Some(feedback);
        Some(feedback)
    }

    /// Next question once the feedback delay has passed.
    pub fn advance(&mut self) -> Progress {
        if self.phase != GamePhase::Playing || self.feedback.is_none() {
            return Progress::Continue;
        }
        self.feedback = None;
        if self.index + 1 < self.deck.len() {
            self.index += 1;
            Progress::Continue
        } else {
            self.finish()
        }
    }

    fn finish(&mut self) -> Progress {
        self.phase = GamePhase::End;
        self.feedback = None;
        Progress::Finished { score: self.score }
    }
}
