//! Match-Up Mania: a memory game pairing questions with their answers.
//!
//! Up to [`MATCH_PAIRS`] questions are dealt as two face-down cards each. The
//! player flips two cards per move; a question and its own answer stay face
//! up, anything else is turned back after [`super::MISMATCH_DELAY`].

use rand::Rng;
use rand::seq::SliceRandom;

use crate::games::{GamePhase, MATCH_PAIRS, Progress, shuffled};
use crate::model::Question;

/// Base score before move and time penalties.
const BASE_SCORE: u32 = 1000;
const MOVE_PENALTY: u32 = 10;
const SECOND_PENALTY: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Question,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: usize,
    pub content: String,
    pub kind: CardKind,
    pub pair_id: usize,
    pub flipped: bool,
    pub matched: bool,
}

/// What a flip did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Card already face up, unknown, or two cards pending.
    Ignored,
    /// First card of a move.
    First,
    /// Second card matched the first.
    Matched,
    /// Second card did not match; call [`MatchUpGame::resolve_mismatch`] after the delay.
    Mismatch,
    /// The last pair was matched.
    Completed { score: u32 },
}

/// `max(0, 1000 - moves*10 - seconds*5)`.
pub fn match_score(moves: u32, seconds: u32) -> u32 {
    BASE_SCORE
        .saturating_sub(moves.saturating_mul(MOVE_PENALTY))
        .saturating_sub(seconds.saturating_mul(SECOND_PENALTY))
}

#[derive(Debug, Clone)]
pub struct MatchUpGame {
    questions: Vec<Question>,
    cards: Vec<Card>,
    /// Ids of face-up cards not yet matched, in flip order.
    pending: Vec<usize>,
    phase: GamePhase,
    moves: u32,
    seconds: u32,
}

impl MatchUpGame {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            cards: Vec::new(),
            pending: Vec::new(),
            phase: GamePhase::Start,
            moves: 0,
            seconds: 0,
        }
    }

    /// Deal a fresh board from a random subset of the questions.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let picked = shuffled(&self.questions, rng);
        let mut cards = Vec::with_capacity(MATCH_PAIRS * 2);
        for (pair_id, q) in picked.iter().take(MATCH_PAIRS).enumerate() {
            cards.push(Card {
                id: pair_id * 2,
                content: q.question.clone(),
                kind: CardKind::Question,
                pair_id,
                flipped: false,
                matched: false,
            });
            cards.push(Card {
                id: pair_id * 2 + 1,
                content: q.answer.clone(),
                kind: CardKind::Answer,
                pair_id,
                flipped: false,
                matched: false,
            });
        }
        cards.shuffle(rng);
        self.cards = cards;
        self.pending.clear();
        self.moves = 0;
        self.seconds = 0;
        self.phase = if self.cards.is_empty() {
            GamePhase::End
        } else {
            GamePhase::Playing
        };
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Cards in board order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Current score if the game ended now.
    pub fn score(&self) -> u32 {
        match_score(self.moves, self.seconds)
    }

    /// Whether a mismatched pair is waiting to be turned back.
    pub fn awaiting_resolve(&self) -> bool {
        self.pending.len() == 2
    }

    /// One second passed.
    pub fn tick(&mut self) {
        if self.phase == GamePhase::Playing {
            self.seconds += 1;
        }
    }

    /// Flip the card at board position `index`.
    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if self.phase != GamePhase::Playing || self.pending.len() == 2 {
            return FlipOutcome::Ignored;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return FlipOutcome::Ignored;
        };
        if card.flipped {
            return FlipOutcome::Ignored;
        }
        card.flipped = true;
        let (id, pair_id) = (card.id, card.pair_id);

        let Some(&first_id) = self.pending.first() else {
            self.moves += 1;
            self.pending.push(id);
            return FlipOutcome::First;
        };

        let first_pair = self.card_by_id(first_id).map(|c| c.pair_id);
        if first_pair == Some(pair_id) {
            for c in self.cards.iter_mut().filter(|c| c.pair_id == pair_id) {
                c.matched = true;
                c.flipped = true;
            }
            self.pending.clear();
            if self.cards.iter().all(|c| c.matched) {
                self.phase = GamePhase::End;
                return FlipOutcome::Completed {
                    score: self.score(),
                };
            }
            FlipOutcome::Matched
        } else {
            self.pending.push(id);
            FlipOutcome::Mismatch
        }
    }

    /// Turn a mismatched pair face down again.
    pub fn resolve_mismatch(&mut self) {
        if !self.awaiting_resolve() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        for c in self.cards.iter_mut().filter(|c| pending.contains(&c.id)) {
            c.flipped = false;
        }
    }

    fn card_by_id(&self, id: usize) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Final result when the game is over.
    pub fn progress(&self) -> Progress {
        match self.phase {
            GamePhase::End => Progress::Finished {
                score: self.score(),
            },
            _ => Progress::Continue,
        }
    }
}
