use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phase::TapPoint;
use crate::ai::RecognitionResult;

/// How many tags stay on screen before the oldest is evicted.
pub const TAG_CAPACITY: usize = 10;

/// A past recognition pinned to where it was tapped. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub result: RecognitionResult,
    pub x: f64,
    pub y: f64,
    pub created_at: DateTime<Utc>,
}

/// Newest-first, capacity-bounded tag list with FIFO eviction.
#[derive(Debug, Clone, Serialize)]
pub struct TagStore {
    tags: VecDeque<Tag>,
    #[serde(skip)]
    capacity: usize,
}

impl Default for TagStore {
    fn default() -> Self {
        Self::with_capacity(TAG_CAPACITY)
    }
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            tags: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pin `result` at `point`. The new tag goes to the front; anything past
    /// capacity falls off the back.
    pub fn add(&mut self, result: RecognitionResult, point: TapPoint) -> Tag {
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            result,
            x: point.x,
            y: point.y,
            created_at: Utc::now(),
        };
        self.tags.push_front(tag.clone());
        while self.tags.len() > self.capacity {
            if let Some(evicted) = self.tags.pop_back() {
                log::debug!("Tag evicted: {} ({})", evicted.result.name, evicted.id);
            }
        }
        tag
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Tags newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
