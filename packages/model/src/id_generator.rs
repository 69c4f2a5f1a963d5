use std::fmt::Debug;
use std::sync::atomic::{AtomicU32, Ordering};

/// Source of fresh block ids.
pub trait IdGenerator: Debug + Send + Sync {
    fn new_id(&self) -> String;
}

/// Random v4 UUIDs; the default for live editing.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Sequential ids under a fixed seed, for reproducible output.
#[derive(Debug)]
pub struct SequentialIds {
    seed: String,
    count: AtomicU32,
}

impl SequentialIds {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: AtomicU32::new(0),
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl IdGenerator for SequentialIds {
    fn new_id(&self) -> String {
        let count = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.seed, count)
    }
}
