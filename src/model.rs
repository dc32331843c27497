//! Core study-content types.
//!
//! Every record here is a plain value created once per uploaded document and
//! dropped when the session is reset. The JSON shape matches what the content
//! generator asks the model for, so a saved study set can be reloaded as-is.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A multiple-choice question.
///
/// After sanitation `options` holds at least two distinct strings and
/// `answer` is one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl Question {
    /// Whether `option` is the correct answer.
    pub fn is_correct(&self, option: &str) -> bool {
        option == self.answer
    }
}

/// A typed-answer question, usually with a `____` blank in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillInTheBlankQuestion {
    pub question: String,
    pub answer: String,
}

impl FillInTheBlankQuestion {
    /// Case-insensitive comparison of a typed answer, ignoring surrounding whitespace.
    pub fn accepts(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.answer.to_lowercase()
    }
}

/// Notes and question sets derived from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyContent {
    pub notes: Vec<String>,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub fill_in_the_blank_questions: Vec<FillInTheBlankQuestion>,
}

impl StudyContent {
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn fill_in_the_blank_count(&self) -> usize {
        self.fill_in_the_blank_questions.len()
    }

    /// True when there is nothing to show or play.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
            && self.questions.is_empty()
            && self.fill_in_the_blank_questions.is_empty()
    }

    /// Load a study set previously written with [`StudyContent::save`].
    pub fn load(path: &Path) -> ContentFileResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| ContentFileError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&data).map_err(|e| ContentFileError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Write the study set as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> ContentFileResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ContentFileError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ContentFileError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, json).map_err(|e| ContentFileError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// One finished game: its score and when it was played (RFC 3339, UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: u32,
    pub date: String,
}

impl GameResult {
    /// A result stamped with the current time.
    pub fn now(score: u32) -> Self {
        Self {
            score,
            date: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// The four mini-games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Shooting,
    Flashcard,
    Typing,
    Matching,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Shooting,
        GameKind::Flashcard,
        GameKind::Typing,
        GameKind::Matching,
    ];

    /// Display title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Shooting => "Target Practice",
            Self::Flashcard => "Flashcard Frenzy",
            Self::Typing => "Keyword Dash",
            Self::Matching => "Match-Up Mania",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Shooting => {
                "Answer questions correctly to blast the targets. A classic test of accuracy."
            }
            Self::Flashcard => {
                "A rapid-fire quiz. How many can you answer correctly before time runs out?"
            }
            Self::Typing => {
                "Test your recall and typing speed. Fill in the blanks as fast as you can."
            }
            Self::Matching => "A memory challenge. Match the questions to their correct answers.",
        }
    }

    /// Leaderboard storage key.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Shooting => "noteBlasterLeaderboard.shooting",
            Self::Flashcard => "noteBlasterLeaderboard.flashcard",
            Self::Typing => "noteBlasterLeaderboard.typing",
            Self::Matching => "noteBlasterLeaderboard.matching",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shooting => "shooting",
            Self::Flashcard => "flashcard",
            Self::Typing => "typing",
            Self::Matching => "matching",
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shooting" | "target" | "target-practice" => Ok(Self::Shooting),
            "flashcard" | "flashcards" | "frenzy" => Ok(Self::Flashcard),
            "typing" | "keyword" | "keyword-dash" => Ok(Self::Typing),
            "matching" | "match" | "match-up" => Ok(Self::Matching),
            other => Err(format!(
                "unknown game \"{other}\" (expected shooting, flashcard, typing or matching)"
            )),
        }
    }
}

/// Errors reading or writing a saved study set.
#[derive(Debug, Error, Diagnostic)]
pub enum ContentFileError {
    #[error("failed to read study content: {path}")]
    #[diagnostic(
        code(noteblaster::content::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid study content in {path}: {message}")]
    #[diagnostic(
        code(noteblaster::content::parse),
        help(
            "The file must be a JSON object with `notes`, `questions` and \
             `fillInTheBlankQuestions`, as written by `noteblaster generate`."
        )
    )]
    Parse { path: String, message: String },

    #[error("failed to write study content: {path}")]
    #[diagnostic(
        code(noteblaster::content::write),
        help("Ensure you have write permissions to the output directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ContentFileResult<T> = std::result::Result<T, ContentFileError>;
