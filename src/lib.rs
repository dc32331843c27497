// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # noteblaster
//!
//! Turns a PDF, DOCX or plain-text document into AI-generated study notes and
//! quiz questions, then plays them back as four terminal mini-games with
//! local leaderboards.
//!
//! ## Architecture
//!
//! - **Upload** (`upload`): size and extension checks before anything is read
//! - **Extraction** (`extract`): PDF, DOCX and TXT to plain text
//! - **Generation** (`generate`): prompt a Gemini or Ollama model for JSON and
//!   sanitize the reply into [`model::StudyContent`]
//! - **Session** (`session`): the upload → processing → results/error flow
//! - **Games** (`games`): front-end-agnostic game state machines
//! - **Leaderboard** (`leaderboard`): top five scores per game, on disk
//! - **TUI** (`tui`): ratatui front end
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//! use noteblaster::config::Config;
//! use noteblaster::session::Session;
//!
//! let config = Config::load(Path::new("config.toml")).unwrap();
//! let mut session = Session::new(config.generator().unwrap(), config.limits.clone());
//! let content = session.process_file(Path::new("lecture.pdf")).unwrap();
//! println!("{} notes, {} questions", content.note_count(), content.question_count());
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod games;
pub mod generate;
pub mod leaderboard;
pub mod model;
pub mod paths;
pub mod session;
pub mod tui;
pub mod upload;
