//! Validated snapshot of a claim form and its multipart encoding.

use reqwest::multipart::{Form, Part};
use shared::{domain::DocumentType, protocol::CLAIM_DATE_FIELD};

use crate::{error::TransportError, registry::DocumentFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedDocument {
    pub kind: DocumentType,
    pub file: DocumentFile,
}

/// What actually goes over the wire for one submit action: the documents
/// that have a file, in registry order, and the claim date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSubmission {
    documents: Vec<SubmittedDocument>,
    claim_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipartField<'a> {
    File {
        name: &'static str,
        file: &'a DocumentFile,
    },
    Text {
        name: &'static str,
        value: &'a str,
    },
}

impl MultipartField<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            MultipartField::File { name, .. } | MultipartField::Text { name, .. } => name,
        }
    }
}

impl ClaimSubmission {
    pub(crate) fn new(documents: Vec<SubmittedDocument>, claim_date: String) -> Self {
        Self {
            documents,
            claim_date,
        }
    }

    pub fn documents(&self) -> &[SubmittedDocument] {
        &self.documents
    }

    pub fn claim_date(&self) -> &str {
        &self.claim_date
    }

    /// Parts in send order. Each document is keyed by its type name, so two
    /// documents of the same type produce two parts with the same name; both
    /// are sent and the service decides what to do with them.
    pub fn fields(&self) -> Vec<MultipartField<'_>> {
        let mut fields: Vec<_> = self
            .documents
            .iter()
            .map(|document| MultipartField::File {
                name: document.kind.as_str(),
                file: &document.file,
            })
            .collect();
        fields.push(MultipartField::Text {
            name: CLAIM_DATE_FIELD,
            value: &self.claim_date,
        });
        fields
    }

    pub fn to_multipart(&self) -> Result<Form, TransportError> {
        let mut form = Form::new();
        for field in self.fields() {
            form = match field {
                MultipartField::File { name, file } => {
                    let part = Part::bytes(file.bytes().to_vec())
                        .file_name(file.name().to_string())
                        .mime_str(file.mime_type())
                        .map_err(|source| TransportError::InvalidPart {
                            filename: file.name().to_string(),
                            source,
                        })?;
                    form.part(name, part)
                }
                MultipartField::Text { name, value } => form.text(name, value.to_string()),
            };
        }
        Ok(form)
    }
}
