use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownDocumentType;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(DocumentId);

/// Upload extensions the intake form offers. Advisory only; the
/// adjudication service decides what it can read.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "txt", "png", "jpg", "jpeg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    Prescription,
    MedicalBill,
    PharmacyBill,
    LabResults,
    DiagnosticReport,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::Prescription,
        DocumentType::MedicalBill,
        DocumentType::PharmacyBill,
        DocumentType::LabResults,
        DocumentType::DiagnosticReport,
    ];

    /// Wire name, used both as the multipart field name and as the key in
    /// `metadata.documents_processed`.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Prescription => "prescription",
            DocumentType::MedicalBill => "medical_bill",
            DocumentType::PharmacyBill => "pharmacy_bill",
            DocumentType::LabResults => "lab_results",
            DocumentType::DiagnosticReport => "diagnostic_report",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentType::Prescription => "Prescription",
            DocumentType::MedicalBill => "Medical Bill",
            DocumentType::PharmacyBill => "Pharmacy Bill",
            DocumentType::LabResults => "Lab Results",
            DocumentType::DiagnosticReport => "Diagnostic Report",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownDocumentType(value.to_string()))
    }
}

pub fn is_accepted_extension(extension: &str) -> bool {
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_wire_name() {
        for kind in DocumentType::ALL {
            assert_eq!(kind.as_str().parse::<DocumentType>().expect("parse"), kind);
        }
    }

    #[test]
    fn rejects_labels_and_unknown_names() {
        assert!("Medical Bill".parse::<DocumentType>().is_err());
        assert!("x_ray".parse::<DocumentType>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&DocumentType::LabResults).expect("serialize");
        assert_eq!(json, "\"lab_results\"");
    }

    #[test]
    fn accepted_extensions_are_case_insensitive() {
        assert!(is_accepted_extension("PDF"));
        assert!(is_accepted_extension("jpeg"));
        assert!(!is_accepted_extension("docx"));
    }
}
