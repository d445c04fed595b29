//! Executor that only records what it is asked to do.
//!
//! Backs dry runs, and lets tests inject a failure at a chosen call.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ExecutorError, OperationExecutor, OperationRequest};

#[derive(Default)]
pub struct RecordingExecutor {
    requests: Mutex<Vec<OperationRequest>>,
    fail_at: Option<usize>,
    fail_ids: Vec<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the `call`-th request (1-based) and accepts every other one.
    pub fn failing_at(call: usize) -> Self {
        Self {
            fail_at: Some(call),
            ..Self::default()
        }
    }

    /// Rejects every request whose identifier is in `ids`.
    pub fn failing_on<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fail_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every request received so far, including rejected ones, in call order.
    pub fn requests(&self) -> Vec<OperationRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OperationExecutor for RecordingExecutor {
    async fn execute(&self, request: OperationRequest) -> Result<(), ExecutorError> {
        let call = {
            let mut requests = self.requests.lock().map_err(|_| ExecutorError::Rejected {
                kind: request.kind(),
                id: request.id().to_string(),
                reason: "recorder lock poisoned".to_string(),
            })?;
            requests.push(request.clone());
            requests.len()
        };

        if self.fail_at == Some(call) || self.fail_ids.iter().any(|id| id == request.id()) {
            return Err(ExecutorError::Rejected {
                kind: request.kind(),
                id: request.id().to_string(),
                reason: format!("injected failure at call {}", call),
            });
        }

        Ok(())
    }
}
