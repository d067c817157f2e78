use std::{fmt, marker::PhantomData};

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

/// Multipart field carrying the claim date next to the document parts.
pub const CLAIM_DATE_FIELD: &str = "claim_date";

/// Envelope returned by the adjudication service for every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjudicationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ClaimDecision>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimDecision {
    pub claim_id: String,
    pub decision: String,
    pub total_claimed: f64,
    pub approved_amount: f64,
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patient_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClaimMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_issues: Option<Vec<ClaimIssue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<ClaimIssue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_breakdown: Option<Vec<ItemBreakdown>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimMetadata {
    pub total_documents: u32,
    /// Keyed by document type wire name, in the order the service sent them.
    /// Kept as a plain string so document kinds the client does not know
    /// about still render.
    #[serde(default, with = "ordered_entries")]
    pub documents_processed: Vec<(String, ProcessedDocument)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimIssue {
    pub code: String,
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBreakdown {
    pub description: String,
    pub claimed_amount: f64,
    pub approved_amount: f64,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A JSON object decoded into its entries, keeping document order.
mod ordered_entries {
    use super::*;

    pub fn serialize<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }

    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, V>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_failure_envelope_without_data() {
        let response: AdjudicationResponse =
            serde_json::from_str(r#"{"success":false,"message":"duplicate claim"}"#)
                .expect("decode");
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("duplicate claim"));
        assert!(response.data.is_none());
    }

    #[test]
    fn decodes_full_decision_payload() {
        let raw = r#"{
            "success": true,
            "data": {
                "claim_id": "CLM-0042",
                "decision": "PARTIAL",
                "total_claimed": 4500,
                "approved_amount": 3200.5,
                "confidence_score": 0.87,
                "patient_name": "Asha Rao",
                "employee_id": "EMP-77",
                "metadata": {
                    "total_documents": 2,
                    "documents_processed": {
                        "prescription": {"filename": "rx.pdf"},
                        "medical_bill": {"filename": "bill.png"}
                    }
                },
                "critical_issues": [],
                "warnings": [{"code": "W01", "message": "late submission", "severity": "warning"}],
                "item_breakdown": [{
                    "description": "Consultation",
                    "claimed_amount": 1500,
                    "approved_amount": 1500,
                    "status": "approved",
                    "reason": "covered"
                }],
                "next_steps": "Reimbursement in 5 days"
            }
        }"#;

        let response: AdjudicationResponse = serde_json::from_str(raw).expect("decode");
        let decision = response.data.expect("data");
        assert_eq!(decision.decision, "PARTIAL");
        assert_eq!(decision.total_claimed, 4500.0);
        let metadata = decision.metadata.expect("metadata");
        assert_eq!(metadata.total_documents, 2);
        let order: Vec<(&str, &str)> = metadata
            .documents_processed
            .iter()
            .map(|(kind, doc)| (kind.as_str(), doc.filename.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("prescription", "rx.pdf"), ("medical_bill", "bill.png")]
        );
        assert_eq!(decision.critical_issues, Some(Vec::new()));
        assert_eq!(decision.warnings.expect("warnings")[0].code, "W01");
    }

    #[test]
    fn optional_sections_default_to_absent() {
        let raw = r#"{
            "claim_id": "CLM-1",
            "decision": "APPROVED",
            "total_claimed": 10,
            "approved_amount": 10,
            "confidence_score": 1.0
        }"#;
        let decision: ClaimDecision = serde_json::from_str(raw).expect("decode");
        assert!(decision.metadata.is_none());
        assert!(decision.item_breakdown.is_none());
        assert!(decision.next_steps.is_none());
        assert_eq!(decision.patient_name, "");
    }

    #[test]
    fn null_identity_fields_decode_as_blank() {
        let raw = r#"{
            "claim_id": "CLM-2",
            "decision": "REJECTED",
            "total_claimed": 10,
            "approved_amount": 0,
            "confidence_score": 0.5,
            "patient_name": null,
            "employee_id": null,
            "warnings": [{"code": "W09", "message": "check", "severity": null}],
            "item_breakdown": [{
                "description": "Dressing",
                "claimed_amount": 10,
                "approved_amount": 0,
                "status": "rejected",
                "reason": null
            }]
        }"#;
        let decision: ClaimDecision = serde_json::from_str(raw).expect("decode");
        assert_eq!(decision.patient_name, "");
        assert_eq!(decision.employee_id, "");
        assert_eq!(decision.warnings.expect("warnings")[0].severity, "");
        assert_eq!(decision.item_breakdown.expect("items")[0].reason, "");
    }

    #[test]
    fn processed_documents_serialize_back_as_an_object() {
        let metadata = ClaimMetadata {
            total_documents: 2,
            documents_processed: vec![
                ("lab_results".to_string(), ProcessedDocument { filename: "lab.pdf".to_string() }),
                ("dental_xray".to_string(), ProcessedDocument { filename: "xray.png".to_string() }),
            ],
        };
        let raw = serde_json::to_string(&metadata).expect("encode");
        assert_eq!(
            raw,
            r#"{"total_documents":2,"documents_processed":{"lab_results":{"filename":"lab.pdf"},"dental_xray":{"filename":"xray.png"}}}"#
        );
    }
}
