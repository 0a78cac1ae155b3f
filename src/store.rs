use tracing::warn;

use crate::persist::{DurableSink, PersistError, Snapshot};

/// Semantic outcomes of store operations, plus persistence failure.
///
/// All variants are recoverable; none should ever take the process down.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("missing '{0}' parameter")]
    MissingParameter(&'static str),
    #[error("question not found")]
    QuestionNotFound,
    #[error("reply not found")]
    ReplyNotFound,
    #[error("old reply not found")]
    OldReplyNotFound,
    #[error("this reply already exists for that question")]
    AlreadyExists,
    #[error("failed to persist data file: {0}")]
    Persist(#[from] PersistError),
}

/// Aggregate counts over the whole store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub question_count: usize,
    pub total_answer_count: usize,
}

/// In-memory question/answer store mirrored to a durable sink.
///
/// Keys are normalized question text (lowercased, trimmed); each key maps
/// to an ordered, duplicate-free list of answer strings. Two invariants
/// hold after every mutation:
/// - a present key always maps to a non-empty list,
/// - no list contains the same answer twice.
///
/// Every mutation saves the full snapshot before reporting success; if
/// the save fails the in-memory change is rolled back, so memory and
/// disk never diverge.
pub struct AnswerStore {
    data: Snapshot,
    sink: Box<dyn DurableSink>,
}

impl AnswerStore {
    /// Open the store, loading the last snapshot from the sink.
    ///
    /// A missing snapshot starts the store empty; an unreadable or
    /// corrupt one is logged and also degrades to empty rather than
    /// failing startup.
    pub fn open(sink: Box<dyn DurableSink>) -> Self {
        let data = match sink.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => Snapshot::default(),
            Err(e) => {
                warn!("failed to load data file, starting empty: {}", e);
                Snapshot::default()
            }
        };
        Self { data, sink }
    }

    /// Look up the answer list for a question.
    ///
    /// The caller picks one element at random; the store returns the
    /// whole list. An absent key and a key with an empty list (possible
    /// only in a hand-edited data file) both read as not found.
    pub fn lookup(&self, raw_question: &str) -> Result<&[String], StoreError> {
        let key = normalize_question(required(raw_question, "question")?);
        match self.data.questions.get(&key) {
            Some(answers) if !answers.is_empty() => Ok(answers),
            _ => Err(StoreError::QuestionNotFound),
        }
    }

    /// Add an answer to a question, creating the question if needed.
    ///
    /// The answer is trimmed but keeps its case. Teaching an answer the
    /// question already has is rejected without touching the sink.
    pub fn teach(&mut self, raw_question: &str, raw_answer: &str) -> Result<(), StoreError> {
        let key = normalize_question(required(raw_question, "question")?);
        let answer = required(raw_answer, "answer")?.to_string();

        let answers = self.data.questions.entry(key.clone()).or_default();
        if answers.contains(&answer) {
            return Err(StoreError::AlreadyExists);
        }
        answers.push(answer);

        if let Err(e) = self.sink.save(&self.data) {
            // Roll back: drop the appended answer, and the key if it was new
            let answers = self.data.questions.entry(key.clone()).or_default();
            answers.pop();
            if answers.is_empty() {
                self.data.questions.remove(&key);
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove one answer from a question.
    ///
    /// Removing the last answer removes the question entirely.
    pub fn delete(&mut self, raw_question: &str, raw_answer: &str) -> Result<(), StoreError> {
        let key = normalize_question(required(raw_question, "question")?);
        let answer = required(raw_answer, "answer")?;

        let answers = self
            .data
            .questions
            .get_mut(&key)
            .ok_or(StoreError::QuestionNotFound)?;
        let index = answers
            .iter()
            .position(|a| a == answer)
            .ok_or(StoreError::ReplyNotFound)?;

        let removed = answers.remove(index);
        if answers.is_empty() {
            self.data.questions.remove(&key);
        }

        if let Err(e) = self.sink.save(&self.data) {
            // Roll back: put the answer back where it was
            let answers = self.data.questions.entry(key).or_default();
            answers.insert(index, removed);
            return Err(e.into());
        }
        Ok(())
    }

    /// Replace one answer with another, keeping its position in the list.
    ///
    /// Replacing an answer with one the question already has elsewhere is
    /// rejected, so the no-duplicates invariant survives edits. Editing
    /// an answer to itself succeeds without a save.
    pub fn edit(
        &mut self,
        raw_question: &str,
        raw_old_answer: &str,
        raw_new_answer: &str,
    ) -> Result<(), StoreError> {
        let key = normalize_question(required(raw_question, "question")?);
        let old_answer = required(raw_old_answer, "old reply")?;
        let new_answer = required(raw_new_answer, "new reply")?.to_string();

        let answers = self
            .data
            .questions
            .get_mut(&key)
            .ok_or(StoreError::QuestionNotFound)?;
        let index = answers
            .iter()
            .position(|a| a == old_answer)
            .ok_or(StoreError::OldReplyNotFound)?;

        if answers[index] == new_answer {
            return Ok(());
        }
        if answers.contains(&new_answer) {
            return Err(StoreError::AlreadyExists);
        }

        let previous = std::mem::replace(&mut answers[index], new_answer);

        if let Err(e) = self.sink.save(&self.data) {
            // Roll back: restore the old answer in place
            if let Some(answers) = self.data.questions.get_mut(&key) {
                answers[index] = previous;
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Count questions and answers across the whole store.
    pub fn stats(&self) -> Stats {
        Stats {
            question_count: self.data.questions.len(),
            total_answer_count: self.data.questions.values().map(Vec::len).sum(),
        }
    }
}

/// Derive the lookup key: lowercase, surrounding whitespace stripped.
fn normalize_question(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trim a raw parameter, rejecting it if nothing remains.
fn required<'a>(raw: &'a str, name: &'static str) -> Result<&'a str, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::MissingParameter(name));
    }
    Ok(trimmed)
}
