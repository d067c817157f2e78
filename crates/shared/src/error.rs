use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown document type '{0}'")]
pub struct UnknownDocumentType(pub String);
