use serde::{Deserialize, Serialize};
use std::fmt;

/// A value supplied by the user for one question.
///
/// Serialized untagged so it matches the backend's JSON (`"Paris"` or `false`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
}

impl AnswerValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Bool(_) => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One answer slot per question, `None` meaning "not answered yet".
///
/// The length is fixed at construction; only slot contents change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerSet {
    slots: Vec<Option<AnswerValue>>,
}

impl AnswerSet {
    /// Creates `len` unanswered slots.
    #[must_use]
    pub fn unanswered(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AnswerValue> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.len() - self.answered_count()
    }

    /// True when every slot holds an answer.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&AnswerValue>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Overwrites the slot at `index`. Returns `false` when out of range.
    pub fn set(&mut self, index: usize, value: AnswerValue) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Marks every slot unanswered again, keeping the length.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_is_an_answer() {
        let mut answers = AnswerSet::unanswered(2);
        assert!(answers.set(0, AnswerValue::Bool(false)));
        assert!(answers.is_answered(0));
        assert!(!answers.is_answered(1));
        assert_eq!(answers.answered_count(), 1);
        assert_eq!(answers.unanswered_count(), 1);
    }

    #[test]
    fn set_out_of_range_is_rejected() {
        let mut answers = AnswerSet::unanswered(1);
        assert!(!answers.set(3, "x".into()));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn clear_keeps_length() {
        let mut answers = AnswerSet::unanswered(3);
        answers.set(1, "b".into());
        answers.clear();
        assert_eq!(answers.len(), 3);
        assert_eq!(answers.answered_count(), 0);
    }

    #[test]
    fn values_serialize_untagged() {
        assert_eq!(serde_json::to_string(&AnswerValue::Bool(true)).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&AnswerValue::text("Paris")).unwrap(),
            "\"Paris\""
        );
        let parsed: AnswerValue = serde_json::from_str("false").unwrap();
        assert_eq!(parsed, AnswerValue::Bool(false));
    }
}
