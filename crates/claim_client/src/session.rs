//! Owns one claim form and the single request that may be in flight for it.

use std::sync::{Arc, Weak};

use shared::protocol::ClaimDecision;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::{ClaimError, SubmitRejection},
    form::{reduce_response, ClaimForm, PendingSubmission, SubmissionStatus, SubmissionTicket},
    transport::{AdjudicationService, MissingAdjudicationService},
};

#[derive(Debug, Clone)]
pub enum SessionEvent {
    SubmissionStarted {
        ticket: SubmissionTicket,
    },
    SubmissionSettled {
        ticket: SubmissionTicket,
        status: SubmissionStatus,
    },
    OutcomeDiscarded {
        ticket: SubmissionTicket,
    },
}

struct SessionState {
    form: ClaimForm,
    in_flight: Option<JoinHandle<()>>,
    closed: bool,
}

pub struct ClaimSession {
    service: Arc<dyn AdjudicationService>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl ClaimSession {
    pub fn new(service: Arc<dyn AdjudicationService>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            service,
            state: Mutex::new(SessionState {
                form: ClaimForm::new(),
                in_flight: None,
                closed: false,
            }),
            events,
        })
    }

    pub fn offline() -> Arc<Self> {
        Self::new(Arc::new(MissingAdjudicationService))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Runs a form mutation under the session lock.
    pub async fn edit<R>(&self, mutation: impl FnOnce(&mut ClaimForm) -> R) -> R {
        let mut guard = self.state.lock().await;
        mutation(&mut guard.form)
    }

    pub async fn form(&self) -> ClaimForm {
        self.state.lock().await.form.clone()
    }

    /// Validates the form and dispatches it. Returns as soon as the request
    /// task is spawned; the outcome arrives as a [`SessionEvent`].
    pub async fn submit(self: &Arc<Self>) -> Result<SubmissionTicket, SubmitRejection> {
        let mut guard = self.state.lock().await;
        if guard.closed {
            return Err(SubmitRejection::Closed);
        }
        let PendingSubmission { ticket, submission } = guard.form.begin_submission()?;

        let session = Arc::downgrade(self);
        let service = Arc::clone(&self.service);
        // Spawned while the lock is held so the task cannot settle before its
        // handle is recorded.
        guard.in_flight = Some(tokio::spawn(async move {
            let outcome = reduce_response(service.process_claim(&submission).await);
            settle(session, ticket, outcome).await;
        }));
        drop(guard);

        let _ = self.events.send(SessionEvent::SubmissionStarted { ticket });
        Ok(ticket)
    }

    /// Submits and waits for that submission to settle.
    pub async fn submit_and_wait(self: &Arc<Self>) -> Result<SubmissionStatus, SubmitRejection> {
        let mut events = self.subscribe_events();
        let ticket = self.submit().await?;
        loop {
            match events.recv().await {
                Ok(SessionEvent::SubmissionSettled { ticket: settled, status })
                    if settled == ticket =>
                {
                    return Ok(status);
                }
                Ok(SessionEvent::OutcomeDiscarded { ticket: discarded }) if discarded == ticket => {
                    return Err(SubmitRejection::Closed);
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "session event receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(SubmitRejection::Closed),
            }
        }
    }

    /// Tears the session down. An in-flight request is aborted and nothing
    /// is applied to the form afterwards.
    pub async fn close(&self) {
        let mut guard = self.state.lock().await;
        guard.closed = true;
        if let Some(handle) = guard.in_flight.take() {
            handle.abort();
            info!("claim session closed with a submission in flight; request aborted");
        }
        let pending = match guard.form.status() {
            SubmissionStatus::Submitting { ticket } => Some(*ticket),
            _ => None,
        };
        drop(guard);
        if let Some(ticket) = pending {
            let _ = self.events.send(SessionEvent::OutcomeDiscarded { ticket });
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}

impl Drop for ClaimSession {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().in_flight.take() {
            handle.abort();
        }
    }
}

async fn settle(
    session: Weak<ClaimSession>,
    ticket: SubmissionTicket,
    outcome: Result<ClaimDecision, ClaimError>,
) {
    let Some(session) = session.upgrade() else {
        debug!(%ticket, "claim session dropped before outcome arrived");
        return;
    };

    let mut guard = session.state.lock().await;
    if guard.closed {
        warn!(%ticket, "claim session closed; discarding outcome");
        drop(guard);
        let _ = session
            .events
            .send(SessionEvent::OutcomeDiscarded { ticket });
        return;
    }

    let applied = guard.form.apply_outcome(ticket, outcome);
    if applied {
        guard.in_flight = None;
    }
    let event = if applied {
        SessionEvent::SubmissionSettled {
            ticket,
            status: guard.form.status().clone(),
        }
    } else {
        SessionEvent::OutcomeDiscarded { ticket }
    };
    drop(guard);
    let _ = session.events.send(event);
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
