//! Target Practice: answer each multiple-choice question in order.

use rand::Rng;

use crate::games::{GamePhase, POINTS_PER_CORRECT, Progress, shuffled_options};
use crate::model::Question;

/// Multiple-choice shooting quiz.
#[derive(Debug, Clone)]
pub struct ShootingGame {
    questions: Vec<Question>,
    /// Shuffled options per question, dealt on start.
    options: Vec<Vec<String>>,
    phase: GamePhase,
    index: usize,
    score: u32,
    /// The option picked for the current question, while feedback shows.
    selected: Option<String>,
}

impl ShootingGame {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            options: Vec::new(),
            phase: GamePhase::Start,
            index: 0,
            score: 0,
            selected: None,
        }
    }

    /// Reset and begin. Questions keep their order; options are shuffled.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.options = self
            .questions
            .iter()
            .map(|q| shuffled_options(&q.answer, &q.options, rng))
            .collect();
        self.index = 0;
        self.score = 0;
        self.selected = None;
        self.phase = if self.questions.is_empty() {
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

    /// 1-based position and total, for "Question 3 of 10".
    pub fn progress(&self) -> (usize, usize) {
        (self.index + 1, self.questions.len())
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            GamePhase::Playing => self.questions.get(self.index),
            _ => None,
        }
    }

    /// Options for the current question in display order.
    pub fn options(&self) -> &[String] {
        match self.phase {
            GamePhase::Playing => self.options.get(self.index).map(Vec::as_slice).unwrap_or(&[]),
            _ => &[],
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Pick the option at `choice`. Returns whether it was correct, or
    /// `None` when the pick is ignored (feedback already showing, bad index).
    pub fn answer(&mut self, choice: usize) -> Option<bool> {
        if self.selected.is_some() {
            return None;
        }
        let option = self.options().get(choice)?.clone();
        let correct = self.questions[self.index].is_correct(&option);
        if correct {
            self.score += POINTS_PER_CORRECT;
        }
        self.selected = Some(option);
        Some(correct)
    }

    /// Move on after the feedback delay.
    pub fn advance(&mut self) -> Progress {
        if self.phase != GamePhase::Playing || self.selected.is_none() {
            return Progress::Continue;
        }
        self.selected = None;
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            Progress::Continue
        } else {
            self.phase = GamePhase::End;
            Progress::Finished { score: self.score }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::test_support::{questions, rng};

    fn correct_index(game: &ShootingGame) -> usize {
        let answer = &game.current_question().unwrap().answer;
        game.options().iter().position(|o| o == answer).unwrap()
    }

    #[test]
    fn full_run_scores_ten_per_correct() {
        let mut game = ShootingGame::new(questions(3));
        game.start(&mut rng());
        assert_eq!(game.phase(), GamePhase::Playing);

        let i = correct_index(&game);
        assert_eq!(game.answer(i), Some(true));
        assert_eq!(game.advance(), Progress::Continue);

        let wrong = (correct_index(&game) + 1) % game.options().len();
        assert_eq!(game.answer(wrong), Some(false));
        assert_eq!(game.advance(), Progress::Continue);

        let i = correct_index(&game);
        game.answer(i);
        assert_eq!(game.advance(), Progress::Finished { score: 20 });
        assert_eq!(game.phase(), GamePhase::End);
    }

    #[test]
    fn second_answer_is_ignored_while_feedback_shows() {
        let mut game = ShootingGame::new(questions(2));
        game.start(&mut rng());
        let i = correct_index(&game);
        game.answer(i);
        assert_eq!(game.answer(i), None);
        assert_eq!(game.score(), 10);
    }

    #[test]
    fn advance_without_answer_does_nothing() {
        let mut game = ShootingGame::new(questions(2));
        game.start(&mut rng());
        assert_eq!(game.advance(), Progress::Continue);
        assert_eq!(game.progress(), (1, 2));
    }

    #[test]
    fn options_are_a_permutation() {
        let qs = questions(1);
        let mut game = ShootingGame::new(qs.clone());
        game.start(&mut rng());
        let mut shown = game.options().to_vec();
        let mut expected = qs[0].options.clone();
        shown.sort();
        expected.sort();
        assert_eq!(shown, expected);
    }

    #[test]
    fn restart_resets_score() {
        let mut game = ShootingGame::new(questions(1));
        game.start(&mut rng());
        let i = correct_index(&game);
        game.answer(i);
        game.advance();
        game.start(&mut rng());
        assert_eq!(game.score(), 0);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn out_of_range_choice_is_ignored() {
        let mut game = ShootingGame::new(questions(1));
        game.start(&mut rng());
        assert_eq!(game.answer(99), None);
        assert!(game.selected().is_none());
    }
}
