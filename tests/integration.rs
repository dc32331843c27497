//! End-to-end tests for the study pipeline.
//!
//! A canned model stands in for the LLM so the real upload checks,
//! extractors, prompt preparation and response sanitation all run.

use std::cell::{Cell, RefCell};
use std::io::Write;
use std::net::TcpListener;
use std::rc::Rc;

use noteblaster::config::{Config, Limits, Provider};
use noteblaster::games::{
    FlipOutcome, GamePhase, KeywordGame, MatchUpGame, Progress, ShootingGame,
};
use noteblaster::generate::{GenerateResult, JsonModel, ModelGenerator};
use noteblaster::leaderboard::{LeaderboardStore, MAX_ENTRIES};
use noteblaster::model::{GameKind, StudyContent};
use noteblaster::session::{AppState, Session, SessionError, TEXT_TOO_SHORT};
use noteblaster::tui::widgets::{render_menu, render_notes};
use noteblaster::upload::UploadError;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;

const REPLY: &str = r#"```json
{
  "notes": ["Photosynthesis turns light into chemical energy.", "  ", "Chlorophyll absorbs light."],
  "questions": [
    {"question": "Where does photosynthesis happen?", "options": ["Chloroplast", "Nucleus", "Ribosome"], "answer": "Chloroplasts"},
    {"question": "What gas is released?", "options": ["Oxygen", "Nitrogen"], "answer": "Oxygen gas"},
    {"question": "Broken", "options": ["only one"], "answer": "only one"},
    {"question": "Which pigment is green?", "options": ["Chlorophyll", "Carotene"], "answer": "Chlorophyll"},
    {"question": "What is the energy source?", "options": ["Light", "Heat"], "answer": "Light"}
  ],
  "fillInTheBlankQuestions": [
    {"question": "Plants absorb ____ dioxide.", "answer": "carbon"},
    {"question": "", "answer": "missing"}
  ]
}
```"#;

/// Returns a fixed reply and counts calls.
struct CannedModel {
    reply: &'static str,
    calls: Rc<Cell<usize>>,
    last_prompt: Rc<RefCell<String>>,
}

impl JsonModel for CannedModel {
    fn complete_json(&self, prompt: &str, _schema: &Value) -> GenerateResult<String> {
        self.calls.set(self.calls.get() + 1);
        *self.last_prompt.borrow_mut() = prompt.to_string();
        Ok(self.reply.to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

struct Harness {
    session: Session,
    calls: Rc<Cell<usize>>,
    last_prompt: Rc<RefCell<String>>,
}

fn harness(reply: &'static str) -> Harness {
    let calls = Rc::new(Cell::new(0));
    let last_prompt = Rc::new(RefCell::new(String::new()));
    let model = CannedModel {
        reply,
        calls: calls.clone(),
        last_prompt: last_prompt.clone(),
    };
    let session = Session::new(
        Box::new(ModelGenerator::new(Box::new(model))),
        Limits::default(),
    );
    Harness {
        session,
        calls,
        last_prompt,
    }
}

fn lecture_text() -> String {
    "Photosynthesis is the process by which green plants use sunlight to synthesize \
     foods from carbon dioxide and water. It takes place in the chloroplasts.\n"
        .repeat(3)
}

fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    let symbols: Vec<&str> = buffer.content().iter().map(|cell| cell.symbol()).collect();
    symbols
        .chunks(width)
        .map(|row| row.concat())
        .collect::<Vec<_>>()
        .join("\n")
}

fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for p in paragraphs {
        body.push_str(&format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"));
    }
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf.into_inner()
}

#[test]
fn text_file_produces_sanitized_content() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(&dir, "biology.txt", lecture_text().as_bytes());
    let mut h = harness(REPLY);

    let content = h.session.process_file(&path).unwrap().clone();
    assert_eq!(h.calls.get(), 1);

    // Blank note dropped; single-option question dropped; bad blank dropped.
    assert_eq!(content.note_count(), 2);
    assert_eq!(content.question_count(), 4);
    assert_eq!(content.fill_in_the_blank_count(), 1);

    // Answers are resolved onto an exact option.
    assert_eq!(content.questions[0].answer, "Chloroplast");
    assert_eq!(content.questions[1].answer, "Oxygen");
    for q in &content.questions {
        assert!(q.options.contains(&q.answer));
    }

    assert!(h.last_prompt.borrow().contains("Photosynthesis is the process"));
    match h.session.state() {
        AppState::Results { file_name, .. } => assert_eq!(file_name, "biology.txt"),
        other => panic!("expected results, got {other:?}"),
    }
}

#[test]
fn docx_file_goes_through_the_pipeline() {
    let dir = tempfile::TempDir::new().unwrap();
    let text = lecture_text();
    let path = write_file(&dir, "Lecture.DOCX", &docx_bytes(&[&text, "Second paragraph."]));
    let mut h = harness(REPLY);

    h.session.process_file(&path).unwrap();
    let prompt = h.last_prompt.borrow();
    assert!(prompt.contains("chloroplasts."));
    assert!(prompt.contains("Second paragraph."));
}

#[test]
fn oversized_upload_is_rejected_before_generation() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("huge.txt");
    let file = std::fs::File::create(&path).unwrap();
    file.set_len(10 * 1024 * 1024 + 1).unwrap();
    let mut h = harness(REPLY);

    let err = h.session.process_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Upload(UploadError::FileTooLarge { .. })
    ));
    assert_eq!(err.to_string(), "File is too large. Maximum size is 10MB.");
    assert_eq!(h.calls.get(), 0);
    assert_eq!(h.session.state(), &AppState::Upload);
}

#[test]
fn wrong_extension_is_rejected_before_generation() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(&dir, "slides.pptx", lecture_text().as_bytes());
    let mut h = harness(REPLY);

    let err = h.session.process_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Upload(UploadError::InvalidFileType { .. })
    ));
    assert_eq!(h.calls.get(), 0);
}

#[test]
fn configured_provider_is_not_contacted_for_rejected_uploads() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let mut config = Config::default();
    config.provider = Provider::Ollama;
    config.ollama.base_url = format!("http://{}", listener.local_addr().unwrap());
    config.ollama.timeout_secs = 2;

    let dir = tempfile::TempDir::new().unwrap();
    let slides = write_file(&dir, "slides.pptx", lecture_text().as_bytes());
    let huge = dir.path().join("huge.txt");
    std::fs::File::create(&huge)
        .unwrap()
        .set_len(10 * 1024 * 1024 + 1)
        .unwrap();

    let mut session = Session::new(config.generator().unwrap(), config.limits.clone());
    for path in [&slides, &huge] {
        assert!(matches!(
            session.process_file(path),
            Err(SessionError::Upload(_))
        ));
    }
    assert_eq!(session.state(), &AppState::Upload);

    let accepted = listener.accept();
    assert!(
        matches!(&accepted, Err(e) if e.kind() == std::io::ErrorKind::WouldBlock),
        "provider was contacted: {accepted:?}"
    );
}

#[test]
fn saved_content_redisplays_same_notes_and_games() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(&dir, "biology.txt", lecture_text().as_bytes());
    let mut h = harness(REPLY);
    let content = h.session.process_file(&path).unwrap().clone();

    let saved = dir.path().join("biology.json");
    content.save(&saved).unwrap();
    let loaded = StudyContent::load(&saved).unwrap();
    assert_eq!(loaded, content);

    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal
        .draw(|frame| render_notes(frame, frame.area(), &loaded.notes, 0))
        .unwrap();
    let notes_screen = screen_text(&terminal);
    assert_eq!(notes_screen.matches('•').count(), content.note_count());
    for note in &content.notes {
        assert!(notes_screen.contains(note.as_str()), "missing note: {note}");
    }

    // Four questions and one blank: every game is playable.
    terminal
        .draw(|frame| render_menu(frame, frame.area(), &loaded, 0))
        .unwrap();
    let menu_screen = screen_text(&terminal);
    for kind in GameKind::ALL {
        assert!(menu_screen.contains(kind.title()), "missing game: {kind}");
    }
    assert!(!menu_screen.contains("requires at least"));
    assert!(!menu_screen.contains("generate"));
}

#[test]
fn short_text_ends_in_error_state() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(&dir, "short.txt", b"Too short to study.");
    let mut h = harness(REPLY);

    assert!(h.session.process_file(&path).is_err());
    assert_eq!(h.calls.get(), 0);
    assert_eq!(
        h.session.state(),
        &AppState::Error {
            message: format!("Failed to process file. {TEXT_TOO_SHORT}"),
        }
    );

    h.session.reset();
    assert_eq!(h.session.state(), &AppState::Upload);
}

#[test]
fn reply_without_valid_questions_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", lecture_text().as_bytes());
    let mut h = harness(r#"{"notes": ["n"], "questions": [{"question": "q", "options": ["a"], "answer": "a"}]}"#);

    h.session.process_file(&path).unwrap_err();
    let AppState::Error { message } = h.session.state() else {
        panic!("expected error state");
    };
    assert!(message.starts_with("Failed to process file. "));
    assert!(message.contains("valid multiple-choice questions"));
}

#[test]
fn games_run_on_generated_content_and_fill_leaderboard() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(&dir, "biology.txt", lecture_text().as_bytes());
    let mut h = harness(REPLY);
    let content = h.session.process_file(&path).unwrap().clone();
    let mut store = LeaderboardStore::open(&dir.path().join("leaderboard.json"));
    let mut rng = StdRng::seed_from_u64(11);

    // Seven rounds of Target Practice answering the first k questions right.
    for round in 0..7u32 {
        let mut game = ShootingGame::new(content.questions.clone());
        game.start(&mut rng);
        let mut answered = 0;
        let score = loop {
            let question = game.current_question().unwrap().clone();
            let pick = if answered < round % 5 {
                game.options().iter().position(|o| *o == question.answer).unwrap()
            } else {
                game.options().iter().position(|o| *o != question.answer).unwrap()
            };
            game.answer(pick);
            answered += 1;
            if let Progress::Finished { score } = game.advance() {
                break score;
            }
        };
        store.record(GameKind::Shooting, score).unwrap();
    }

    let board = store.load(GameKind::Shooting);
    assert_eq!(board.len(), MAX_ENTRIES);
    let scores: Vec<u32> = board.entries().iter().map(|r| r.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(scores[0], 40);

    // Typing game on the one surviving blank.
    let mut typing = KeywordGame::new(content.fill_in_the_blank_questions.clone());
    typing.start(&mut rng);
    typing.submit(" Carbon ");
    assert_eq!(typing.advance(), Progress::Finished { score: 10 });

    // Match-Up Mania needs four questions, which the reply provides.
    let mut matching = MatchUpGame::new(content.questions.clone());
    matching.start(&mut rng);
    assert_eq!(matching.cards().len(), 8);
    let mut last = FlipOutcome::Ignored;
    for pair in 0..4 {
        let first = matching.cards().iter().position(|c| c.pair_id == pair).unwrap();
        let second = matching
            .cards()
            .iter()
            .rposition(|c| c.pair_id == pair)
            .unwrap();
        matching.flip(first);
        last = matching.flip(second);
    }
    assert_eq!(last, FlipOutcome::Completed { score: 960 });
    assert_eq!(matching.phase(), GamePhase::End);
}
