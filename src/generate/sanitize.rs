//! Validation of the model's JSON before it reaches the games.
//!
//! Multiple-choice questions must end up with at least two distinct options
//! and an answer that is one of them. A claimed answer that is not an option
//! is replaced by the first option that contains it or is contained by it;
//! with no such option the question is dropped.

use serde_json::Value;

use crate::generate::{GenerateError, GenerateResult};
use crate::model::{FillInTheBlankQuestion, Question, StudyContent};

/// Turn a parsed model response into [`StudyContent`].
///
/// Fails with [`GenerateError::MissingFields`] when `notes` or `questions` is
/// absent and with [`GenerateError::NoValidQuestions`] when every question is
/// discarded. Missing fill-in-the-blank questions are not an error.
pub fn sanitize_response(value: &Value) -> GenerateResult<StudyContent> {
    let (Some(notes), Some(questions)) = (
        value.get("notes").and_then(Value::as_array),
        value.get("questions").and_then(Value::as_array),
    ) else {
        return Err(GenerateError::MissingFields);
    };

    let questions: Vec<Question> = questions.iter().filter_map(sanitize_question).collect();
    if questions.is_empty() {
        return Err(GenerateError::NoValidQuestions);
    }

    let fill_in_the_blank_questions = value
        .get("fillInTheBlankQuestions")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(sanitize_fill_in).collect())
        .unwrap_or_default();

    let notes = notes
        .iter()
        .map(stringify)
        .filter(|n| !n.trim().is_empty())
        .collect();

    Ok(StudyContent {
        notes,
        questions,
        fill_in_the_blank_questions,
    })
}

/// Validate one multiple-choice question, or `None` if it must be dropped.
pub fn sanitize_question(raw: &Value) -> Option<Question> {
    let question = raw.get("question").map(stringify).filter(|q| !q.is_empty())?;
    let options = raw.get("options")?.as_array()?;
    if options.len() < 2 {
        return None;
    }
    let answer = raw.get("answer").map(stringify).filter(|a| !a.is_empty())?;

    let options = dedup_options(options);
    if options.len() < 2 {
        return None;
    }

    let answer = resolve_answer(&answer, &options)?;
    Some(Question {
        question,
        options,
        answer,
    })
}

/// Match a claimed answer against the options.
///
/// Exact membership wins; otherwise the first option that contains the
/// answer or is contained in it.
pub fn resolve_answer(answer: &str, options: &[String]) -> Option<String> {
    if options.iter().any(|o| o == answer) {
        return Some(answer.to_string());
    }
    options
        .iter()
        .find(|o| answer.contains(o.as_str()) || o.contains(answer))
        .cloned()
}

/// Stringify options, drop blanks and repeats, keep first-seen order.
fn dedup_options(options: &[Value]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(options.len());
    for option in options.iter().map(stringify) {
        if option.trim().is_empty() || out.contains(&option) {
            continue;
        }
        out.push(option);
    }
    out
}

fn sanitize_fill_in(raw: &Value) -> Option<FillInTheBlankQuestion> {
    let question = raw.get("question")?.as_str()?.trim();
    let answer = raw.get("answer")?.as_str()?.trim();
    if question.is_empty() || answer.is_empty() {
        return None;
    }
    Some(FillInTheBlankQuestion {
        question: question.to_string(),
        answer: answer.to_string(),
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
