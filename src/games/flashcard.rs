//! Flashcard Frenzy: shuffled cards against a 60-second clock.

use rand::Rng;

use crate::games::{
    GAME_DURATION_SECS, GamePhase, POINTS_PER_CORRECT, Progress, shuffled, shuffled_options,
};
use crate::model::Question;

/// Timed multiple-choice flashcards.
#[derive(Debug, Clone)]
pub struct FlashcardGame {
    questions: Vec<Question>,
    deck: Vec<Question>,
    options: Vec<Vec<String>>,
    phase: GamePhase,
    index: usize,
    score: u32,
    time_left: u32,
    /// `Some(correct)` while the card is flipped.
    flipped: Option<bool>,
}

impl FlashcardGame {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            deck: Vec::new(),
            options: Vec::new(),
            phase: GamePhase::Start,
            index: 0,
            score: 0,
            time_left: GAME_DURATION_SECS,
            flipped: None,
        }
    }

    /// Shuffle the deck and start the clock.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deck = shuffled(&self.questions, rng);
        self.options = self
            .deck
            .iter()
            .map(|q| shuffled_options(&q.answer, &q.options, rng))
            .collect();
        self.index = 0;
        self.score = 0;
        self.time_left = GAME_DURATION_SECS;
        self.flipped = None;
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

    /// Remaining time as a fraction of the full round.
    pub fn time_ratio(&self) -> f64 {
        f64::from(self.time_left) / f64::from(GAME_DURATION_SECS)
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.index + 1, self.deck.len())
    }

    pub fn current_card(&self) -> Option<&Question> {
        match self.phase {
            GamePhase::Playing => self.deck.get(self.index),
            _ => None,
        }
    }

    pub fn options(&self) -> &[String] {
        match self.phase {
            GamePhase::Playing => self.options.get(self.index).map(Vec::as_slice).unwrap_or(&[]),
            _ => &[],
        }
    }

    /// `Some(correct)` while the current card is flipped.
    pub fn flipped(&self) -> Option<bool> {
        self.flipped
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

    /// Answer the current card; `None` if it is already flipped.
    pub fn answer(&mut self, choice: usize) -> Option<bool> {
        if self.flipped.is_some() {
            return None;
        }
        let option = self.options().get(choice)?;
        let correct = self.deck[self.index].is_correct(option);
        if correct {
            self.score += POINTS_PER_CORRECT;
        }
        self.flipped = Some(correct);
        Some(correct)
    }

    /// Next card after the flip delay, or the end of the deck.
    pub fn advance(&mut self) -> Progress {
        if self.phase != GamePhase::Playing || self.flipped.is_none() {
            return Progress::Continue;
        }
        self.flipped = None;
        if self.index + 1 < self.deck.len() {
            self.index += 1;
            Progress::Continue
        } else {
            self.finish()
        }
    }

    fn finish(&mut self) -> Progress {
        self.phase = GamePhase::End;
        self.flipped = None;
        Progress::Finished { score: self.score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::test_support::{questions, rng};

    fn answer_correctly(game: &mut FlashcardGame) {
        let answer = game.current_card().unwrap().answer.clone();
        let i = game.options().iter().position(|o| *o == answer).unwrap();
        assert_eq!(game.answer(i), Some(true));
    }

    #[test]
    fn clock_runs_out_after_sixty_ticks() {
        let mut game = FlashcardGame::new(questions(5));
        game.start(&mut rng());
        answer_correctly(&mut game);
        for _ in 0..59 {
            assert_eq!(game.tick(), Progress::Continue);
        }
        assert_eq!(game.time_left(), 1);
        assert_eq!(game.tick(), Progress::Finished { score: 10 });
        assert_eq!(game.phase(), GamePhase::End);
        assert_eq!(game.tick(), Progress::Continue);
    }

    #[test]
    fn deck_exhaustion_ends_game() {
        let mut game = FlashcardGame::new(questions(2));
        game.start(&mut rng());
        answer_correctly(&mut game);
        assert_eq!(game.advance(), Progress::Continue);
        answer_correctly(&mut game);
        assert_eq!(game.advance(), Progress::Finished { score: 20 });
    }

    #[test]
    fn flipped_card_ignores_answers() {
        let mut game = FlashcardGame::new(questions(2));
        game.start(&mut rng());
        answer_correctly(&mut game);
        assert_eq!(game.answer(0), None);
        assert_eq!(game.flipped(), Some(true));
    }

    #[test]
    fn deck_is_a_permutation_of_questions() {
        let qs = questions(6);
        let mut game = FlashcardGame::new(qs.clone());
        game.start(&mut rng());
        let mut seen = Vec::new();
        while let Some(card) = game.current_card() {
            seen.push(card.question.clone());
            game.answer(0);
            game.advance();
        }
        let mut expected: Vec<String> = qs.into_iter().map(|q| q.question).collect();
        seen.sort();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn time_ratio_is_full_at_start() {
        let mut game = FlashcardGame::new(questions(1));
        game.start(&mut rng());
        assert_eq!(game.time_ratio(), 1.0);
    }
}
