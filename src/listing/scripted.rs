//! Scripted listing used by unit tests: replays a fixed sequence of batches
//! and failures and records every call it receives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::{Cursor, ListingSource, RemoteBatch};
use crate::domain::Filter;
use crate::error::FetchError;

/// One recorded listing call
#[derive(Debug, Clone)]
pub(crate) struct ListCall {
    pub filter: Filter,
    pub limit: u32,
    pub cursor: Option<Cursor>,
}

pub(crate) struct ScriptedListing {
    steps: Mutex<VecDeque<Result<RemoteBatch<u32>, String>>>,
    calls: Mutex<Vec<ListCall>>,
    next_id: Mutex<u32>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedListing {
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
            gate: None,
        }
    }

    /// Script batches of the given sizes; every batch but the last carries a
    /// cursor `c1`, `c2`, ... and the last one reports exhaustion.
    pub fn batches(sizes: &[usize]) -> Self {
        let script = Self::new();
        for (i, &size) in sizes.iter().enumerate() {
            let cursor = if i + 1 < sizes.len() {
                Cursor::new(format!("c{}", i + 1))
            } else {
                None
            };
            script.push_batch(size, cursor);
        }
        script
    }

    /// Append a batch of `size` sequentially numbered items
    pub fn push_batch(&self, size: usize, cursor: Option<Cursor>) -> &Self {
        let mut next_id = self.next_id.lock().expect("lock");
        let items: Vec<u32> = (0..size as u32).map(|i| *next_id + i).collect();
        *next_id += size as u32;
        self.steps
            .lock()
            .expect("lock")
            .push_back(Ok(RemoteBatch::new(items, cursor)));
        self
    }

    /// Insert a failure at a position of the script
    pub fn fail_at(self, index: usize, message: &str) -> Self {
        self.steps
            .lock()
            .expect("lock")
            .insert(index, Err(message.to_string()));
        self
    }

    /// Hold every call until the gate is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<ListCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }
}

impl ListingSource for ScriptedListing {
    type Item = u32;

    async fn list(
        &self,
        filter: &Filter,
        limit: u32,
        cursor: Option<&Cursor>,
    ) -> Result<RemoteBatch<u32>, FetchError> {
        self.calls.lock().expect("lock").push(ListCall {
            filter: filter.clone(),
            limit,
            cursor: cursor.cloned(),
        });

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let step = self.steps.lock().expect("lock").pop_front();
        match step {
            Some(Ok(batch)) => Ok(batch),
            Some(Err(message)) => Err(FetchError::Unavailable { message }),
            None => Err(FetchError::Unavailable {
                message: "script exhausted".to_string(),
            }),
        }
    }
}
