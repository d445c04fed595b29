//! Propagation wait applied after every successful mutation.
//!
//! Store watchers turn records into live networking state asynchronously,
//! with no ordering relative to the writer. A run pauses after each
//! mutation so a parent is materialized before its children are written.

use std::time::Duration;

use async_trait::async_trait;

use crate::store::EntityKind;

#[async_trait]
pub trait PropagationWait: Send + Sync {
    /// Called once after `kind`/`id` was successfully created or deleted.
    async fn settle(&self, kind: EntityKind, id: &str);
}

/// Sleeps for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl PropagationWait for FixedDelay {
    async fn settle(&self, _kind: EntityKind, _id: &str) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Does not wait at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWait;

#[async_trait]
impl PropagationWait for NoWait {
    async fn settle(&self, _kind: EntityKind, _id: &str) {}
}
