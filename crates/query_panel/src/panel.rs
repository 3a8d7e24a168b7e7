//! QueryPanel view-model: the query text, the last answer, and one
//! request/response exchange per submission.
//!
//! State changes go through explicit setters; after each change the
//! registered [`Renderer`] is called with a [`PanelView`] snapshot. Each
//! submission carries a sequence number and only the latest issued one may
//! write its outcome, so the answer always belongs to the most recent
//! submission regardless of the order responses arrive in.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::client::{ClientError, QueryClient};
use crate::messages::QueryResponse;

/// Where the panel is in its exchange with the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelStatus {
    Idle,
    Awaiting,
    Failed(String),
}

/// Snapshot handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub query: String,
    pub answer: String,
    pub status: PanelStatus,
}

impl PanelView {
    /// The text shown in the answer area.
    pub fn display_line(&self) -> String {
        match &self.status {
            PanelStatus::Failed(message) => format!("Error: {}", message),
            PanelStatus::Idle | PanelStatus::Awaiting => format!("Answer: {}", self.answer),
        }
    }
}

/// Rendering callback, invoked after every state change while the panel's
/// state is still locked, so views arrive in the order the changes were made.
/// It must not call back into the panel.
pub type Renderer = Arc<dyn Fn(&PanelView) + Send + Sync>;

#[derive(Debug)]
struct PanelState {
    query: String,
    answer: String,
    status: PanelStatus,
    latest_seq: u64,
}

/// The query panel. Clones share the same state.
#[derive(Clone)]
pub struct QueryPanel {
    client: QueryClient,
    state: Arc<Mutex<PanelState>>,
    renderer: Renderer,
}

impl QueryPanel {
    pub fn new(client: QueryClient, renderer: Renderer) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(PanelState {
                query: String::new(),
                answer: String::new(),
                status: PanelStatus::Idle,
                latest_seq: 0,
            })),
            renderer,
        }
    }

    /// Panel that renders nowhere.
    pub fn headless(client: QueryClient) -> Self {
        Self::new(client, Arc::new(|_: &PanelView| {}))
    }

    pub fn view(&self) -> PanelView {
        snapshot(&self.lock())
    }

    /// Replace the query text with `text` as typed.
    pub fn on_query_change(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.query = text.into();
        (self.renderer)(&snapshot(&state));
    }

    /// Send the current query text to the backend and apply the outcome if no
    /// newer submission has been issued meanwhile. The outcome is returned
    /// either way.
    pub async fn submit_query(&self) -> Result<QueryResponse, ClientError> {
        let (seq, query) = {
            let mut state = self.lock();
            state.latest_seq += 1;
            state.status = PanelStatus::Awaiting;
            (self.renderer)(&snapshot(&state));
            (state.latest_seq, state.query.clone())
        };
        tracing::info!(seq, "submitting query");

        let outcome = self.client.query(&query).await;

        {
            let mut state = self.lock();
            if seq != state.latest_seq {
                tracing::debug!(seq, latest = state.latest_seq, "discarding superseded response");
                return outcome;
            }
            match &outcome {
                Ok(response) => {
                    state.answer = response.display_text();
                    state.status = PanelStatus::Idle;
                }
                Err(e) => {
                    tracing::warn!(seq, error = %e, "query failed");
                    state.status = PanelStatus::Failed(e.to_string());
                }
            }
            (self.renderer)(&snapshot(&state));
        }
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        // State is plain data, always left consistent; recover from poisoning.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn snapshot(state: &PanelState) -> PanelView {
    PanelView {
        query: state.query.clone(),
        answer: state.answer.clone(),
        status: state.status.clone(),
    }
}
