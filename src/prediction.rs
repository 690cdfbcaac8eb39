use chrono::{NaiveDateTime, NaiveTime};
use std::collections::HashMap;

/// One unit of content issued to a user. Exactly one variant, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionContent {
    Phrase(String),
    /// File name inside the configured meme directory.
    Image(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub created_at: NaiveDateTime,
    pub content: PredictionContent,
}

impl Prediction {
    /// A prediction stays valid while queries land before today's cutoff,
    /// or once it was created after that cutoff. Note the asymmetry: an old
    /// prediction survives across days as long as every query arrives
    /// pre-cutoff, and only resets on the first post-cutoff query.
    pub fn is_valid_at(&self, now: NaiveDateTime, cutoff_today: NaiveDateTime) -> bool {
        now < cutoff_today || self.created_at > cutoff_today
    }
}

/// Today's reset boundary for a given evaluation time.
pub fn cutoff_for(now: NaiveDateTime, reset_at: NaiveTime) -> NaiveDateTime {
    now.date().and_time(reset_at)
}

/// In-memory map from user id to their current prediction. Lives for the
/// process lifetime only; a new entry overwrites the previous one.
#[derive(Default)]
pub struct PredictionStore {
    entries: HashMap<u64, Prediction>,
}

impl PredictionStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, user_id: u64) -> Option<&Prediction> {
        self.entries.get(&user_id)
    }

    pub fn insert(&mut self, user_id: u64, prediction: Prediction) {
        self.entries.insert(user_id, prediction);
    }
}
