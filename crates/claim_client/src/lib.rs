//! Client side of claim intake: collect categorized documents and a claim
//! date, submit them to the adjudication service, and project the decision
//! that comes back into display sections.

pub mod error;
pub mod form;
pub mod presenter;
pub mod registry;
pub mod session;
pub mod submission;
pub mod transport;

pub use error::{
    ClaimError, ClaimErrorCategory, SubmitRejection, TransportError, ValidationError,
};
pub use form::{reduce_response, ClaimForm, PendingSubmission, SubmissionStatus, SubmissionTicket};
pub use presenter::{present, DecisionView, FormView, SeverityClass, VerdictClass};
pub use registry::{DocumentEntry, DocumentFile, DocumentRegistry};
pub use session::{ClaimSession, SessionEvent};
pub use submission::{ClaimSubmission, MultipartField, SubmittedDocument};
pub use transport::{
    AdjudicationService, HttpAdjudicationService, MissingAdjudicationService,
    DEFAULT_REQUEST_TIMEOUT,
};
