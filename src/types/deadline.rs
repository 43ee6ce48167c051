use std::time::{Duration, Instant};

use crate::error::CoreError;

/// Caller-supplied time limit for one operation.
///
/// Checked between stages, never in the middle of one: a stage that has
/// started runs to completion, and work already done is discarded rather
/// than published.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub fn unbounded() -> Self {
        Self {
            started: Instant::now(),
            limit: None,
        }
    }

    pub fn after(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit: Some(limit),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.started.elapsed() >= limit)
    }

    /// Fail with `TimedOut` naming `stage` once the limit has passed.
    pub fn check(&self, stage: &'static str) -> Result<(), CoreError> {
        match self.limit {
            Some(limit) if self.started.elapsed() >= limit => Err(CoreError::TimedOut {
                stage,
                limit_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
            _ => Ok(()),
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}
