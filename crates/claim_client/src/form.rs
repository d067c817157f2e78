//! Claim form state and the submission state machine.
//!
//! `idle -> submitting -> {succeeded | failed}`, and any settled state goes
//! back to `submitting` on the next submit action. Outcomes are tagged with
//! the ticket of the submission that produced them and are only applied
//! while that ticket is still the one in flight.

use std::fmt;

use shared::{
    domain::{DocumentId, DocumentType},
    protocol::{AdjudicationResponse, ClaimDecision},
};
use tracing::{info, warn};

use crate::{
    error::{ClaimError, SubmitRejection, TransportError, ValidationError},
    registry::{DocumentFile, DocumentRegistry},
    submission::{ClaimSubmission, SubmittedDocument},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionTicket(u64);

impl fmt::Display for SubmissionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting {
        ticket: SubmissionTicket,
    },
    Succeeded(ClaimDecision),
    Failed(ClaimError),
}

impl SubmissionStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting { .. })
    }

    pub fn last_result(&self) -> Option<&ClaimDecision> {
        match self {
            SubmissionStatus::Succeeded(decision) => Some(decision),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&ClaimError> {
        match self {
            SubmissionStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::Submitting { .. } => "submitting",
            SubmissionStatus::Succeeded(_) => "succeeded",
            SubmissionStatus::Failed(_) => "failed",
        }
    }
}

/// A submission that passed validation and now owns the current ticket.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub ticket: SubmissionTicket,
    pub submission: ClaimSubmission,
}

#[derive(Debug, Clone, Default)]
pub struct ClaimForm {
    documents: DocumentRegistry,
    claim_date: String,
    status: SubmissionStatus,
    validation: Option<ValidationError>,
    last_ticket: u64,
}

impl ClaimForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &DocumentRegistry {
        &self.documents
    }

    pub fn claim_date(&self) -> &str {
        &self.claim_date
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn validation_error(&self) -> Option<ValidationError> {
        self.validation
    }

    pub fn add_document(&mut self) -> DocumentId {
        let id = self.documents.add();
        self.validation = None;
        id
    }

    pub fn remove_document(&mut self, id: DocumentId) -> bool {
        self.touched(|documents| documents.remove(id))
    }

    pub fn set_document_type(&mut self, id: DocumentId, kind: DocumentType) -> bool {
        self.touched(|documents| documents.set_type(id, kind))
    }

    pub fn set_document_type_raw(&mut self, id: DocumentId, raw: &str) -> bool {
        self.touched(|documents| documents.set_type_raw(id, raw))
    }

    pub fn attach_file(&mut self, id: DocumentId, file: Option<DocumentFile>) -> bool {
        self.touched(|documents| documents.set_file(id, file))
    }

    pub fn set_claim_date(&mut self, claim_date: impl Into<String>) {
        self.claim_date = claim_date.into();
        self.validation = None;
    }

    fn touched(&mut self, mutation: impl FnOnce(&mut DocumentRegistry) -> bool) -> bool {
        let changed = mutation(&mut self.documents);
        if changed {
            self.validation = None;
        }
        changed
    }

    /// Builds the submission snapshot without touching any state.
    pub fn validate(&self) -> Result<ClaimSubmission, ValidationError> {
        let documents: Vec<_> = self
            .documents
            .attached()
            .map(|(entry, file)| SubmittedDocument {
                kind: entry.kind,
                file: file.clone(),
            })
            .collect();
        if documents.is_empty() {
            return Err(ValidationError::DocumentsRequired);
        }
        if self.claim_date.trim().is_empty() {
            return Err(ValidationError::ClaimDateRequired);
        }
        Ok(ClaimSubmission::new(documents, self.claim_date.clone()))
    }

    /// Enters `submitting` and drops any previous outcome before the request
    /// is issued. A rejected submit leaves the status where it was.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, SubmitRejection> {
        if let SubmissionStatus::Submitting { ticket } = self.status {
            warn!(%ticket, "submit ignored: a submission is already in flight");
            return Err(SubmitRejection::InFlight);
        }

        let submission = match self.validate() {
            Ok(submission) => submission,
            Err(err) => {
                warn!("claim submission blocked: {err}");
                self.validation = Some(err);
                return Err(err.into());
            }
        };

        self.last_ticket += 1;
        let ticket = SubmissionTicket(self.last_ticket);
        self.validation = None;
        self.status = SubmissionStatus::Submitting { ticket };
        info!(
            %ticket,
            documents = submission.documents().len(),
            claim_date = submission.claim_date(),
            "claim submission started"
        );
        Ok(PendingSubmission { ticket, submission })
    }

    /// Applies an outcome if `ticket` is the submission currently in flight.
    /// Returns `false` for stale or unknown tickets, leaving the form as is.
    pub fn apply_outcome(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<ClaimDecision, ClaimError>,
    ) -> bool {
        match self.status {
            SubmissionStatus::Submitting { ticket: current } if current == ticket => {}
            _ => {
                warn!(%ticket, status = self.status.label(), "discarding stale claim outcome");
                return false;
            }
        }

        self.status = match outcome {
            Ok(decision) => {
                info!(%ticket, claim_id = %decision.claim_id, decision = %decision.decision, "claim adjudicated");
                SubmissionStatus::Succeeded(decision)
            }
            Err(err) => {
                warn!(%ticket, "claim submission failed: {err}");
                SubmissionStatus::Failed(err)
            }
        };
        true
    }
}

/// Maps what came back from the transport to the outcome a form applies.
pub fn reduce_response(
    response: Result<AdjudicationResponse, TransportError>,
) -> Result<ClaimDecision, ClaimError> {
    let response = response?;
    if !response.success {
        return Err(ClaimError::from_service_message(response.message));
    }
    response
        .data
        .ok_or_else(|| TransportError::MissingDecision.into())
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
