//! Read-only projection of a claim decision (and of the form) into display
//! sections. Nothing here mutates state or touches the network.

use std::fmt;

use shared::{
    domain::DocumentType,
    protocol::{ClaimDecision, ClaimIssue, ItemBreakdown},
};

use crate::form::{ClaimForm, SubmissionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictClass {
    Approved,
    Rejected,
    Partial,
    Unknown,
}

impl VerdictClass {
    pub fn classify(verdict: &str) -> Self {
        match verdict {
            "APPROVED" => Self::Approved,
            "REJECTED" => Self::Rejected,
            "PARTIAL" => Self::Partial,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityClass {
    Critical,
    Warning,
    Medium,
    Default,
}

impl SeverityClass {
    pub fn classify(severity: &str) -> Self {
        match severity {
            "critical" => Self::Critical,
            "warning" => Self::Warning,
            "medium" => Self::Medium,
            _ => Self::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatusClass {
    Approved,
    NotApproved,
}

impl ItemStatusClass {
    pub fn classify(status: &str) -> Self {
        if status == "approved" {
            Self::Approved
        } else {
            Self::NotApproved
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarySection {
    pub claim_id: String,
    pub verdict: String,
    pub verdict_class: VerdictClass,
    pub total_claimed: f64,
    pub approved_amount: f64,
    pub confidence_percent: u32,
    pub patient_name: String,
    pub employee_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedEntry {
    pub document_type: String,
    pub label: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentsSection {
    pub total_documents: u32,
    pub entries: Vec<ProcessedEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueView {
    pub code: String,
    pub message: String,
    pub severity_class: SeverityClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub description: String,
    pub claimed_amount: f64,
    pub approved_amount: f64,
    pub status: String,
    pub status_class: ItemStatusClass,
    pub reason: String,
}

/// Optional sections are `None` when the decision has no data for them,
/// including empty lists.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionView {
    pub summary: SummarySection,
    pub documents: Option<DocumentsSection>,
    pub critical_issues: Option<Vec<IssueView>>,
    pub warnings: Option<Vec<IssueView>>,
    pub items: Option<Vec<ItemView>>,
    pub next_steps: Option<String>,
}

pub fn present(decision: &ClaimDecision) -> DecisionView {
    DecisionView {
        summary: SummarySection {
            claim_id: decision.claim_id.clone(),
            verdict: decision.decision.clone(),
            verdict_class: VerdictClass::classify(&decision.decision),
            total_claimed: decision.total_claimed,
            approved_amount: decision.approved_amount,
            confidence_percent: confidence_percent(decision.confidence_score),
            patient_name: decision.patient_name.clone(),
            employee_id: decision.employee_id.clone(),
        },
        documents: decision.metadata.as_ref().map(|metadata| DocumentsSection {
            total_documents: metadata.total_documents,
            entries: metadata
                .documents_processed
                .iter()
                .map(|(document_type, processed)| ProcessedEntry {
                    document_type: document_type.clone(),
                    label: document_type_label(document_type),
                    filename: processed.filename.clone(),
                })
                .collect(),
        }),
        critical_issues: issue_section(decision.critical_issues.as_deref()),
        warnings: issue_section(decision.warnings.as_deref()),
        items: non_empty(decision.item_breakdown.as_deref()).map(|items| {
            items.iter().map(item_view).collect()
        }),
        next_steps: decision
            .next_steps
            .as_ref()
            .filter(|steps| !steps.trim().is_empty())
            .cloned(),
    }
}

fn non_empty<T>(items: Option<&[T]>) -> Option<&[T]> {
    items.filter(|items| !items.is_empty())
}

fn issue_section(issues: Option<&[ClaimIssue]>) -> Option<Vec<IssueView>> {
    non_empty(issues).map(|issues| {
        issues
            .iter()
            .map(|issue| IssueView {
                code: issue.code.clone(),
                message: issue.message.clone(),
                severity_class: SeverityClass::classify(&issue.severity),
            })
            .collect()
    })
}

fn item_view(item: &ItemBreakdown) -> ItemView {
    ItemView {
        description: item.description.clone(),
        claimed_amount: item.claimed_amount,
        approved_amount: item.approved_amount,
        status: item.status.clone(),
        status_class: ItemStatusClass::classify(&item.status),
        reason: item.reason.clone(),
    }
}

fn document_type_label(raw: &str) -> String {
    match raw.parse::<DocumentType>() {
        Ok(kind) => kind.label().to_string(),
        Err(_) => raw.replace('_', " "),
    }
}

/// Scores are fractions in `[0, 1]`; out-of-range values are clamped.
pub fn confidence_percent(score: f64) -> u32 {
    if !score.is_finite() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Rupee amount with thousands separators and at most two decimals.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{sign}₹{grouped}"),
        f if f % 10 == 0 => format!("{sign}₹{grouped}.{}", f / 10),
        f => format!("{sign}₹{grouped}.{f:02}"),
    }
}

impl fmt::Display for DecisionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;
        writeln!(f, "Claim Results")?;
        writeln!(f, "Claim ID: {}", summary.claim_id)?;
        writeln!(f, "Decision: {}", summary.verdict)?;
        writeln!(f, "Total Claimed: {}", format_amount(summary.total_claimed))?;
        writeln!(f, "Approved Amount: {}", format_amount(summary.approved_amount))?;
        writeln!(f, "Confidence Score: {}%", summary.confidence_percent)?;
        writeln!(f, "Patient Name: {}", summary.patient_name)?;
        writeln!(f, "Employee ID: {}", summary.employee_id)?;

        if let Some(documents) = &self.documents {
            let plural = if documents.total_documents == 1 { "" } else { "s" };
            writeln!(f)?;
            writeln!(f, "Documents Processed")?;
            writeln!(f, "  Total: {} document{plural}", documents.total_documents)?;
            for entry in &documents.entries {
                writeln!(f, "  - {}: {}", entry.label, entry.filename)?;
            }
        }

        for (title, issues) in [
            ("Critical Issues", &self.critical_issues),
            ("Warnings", &self.warnings),
        ] {
            if let Some(issues) = issues {
                writeln!(f)?;
                writeln!(f, "{title}")?;
                for issue in issues {
                    writeln!(f, "  [{}] {}", issue.code, issue.message)?;
                }
            }
        }

        if let Some(items) = &self.items {
            writeln!(f)?;
            writeln!(f, "Item Breakdown")?;
            for item in items {
                writeln!(
                    f,
                    "  {} | claimed {} | approved {} | {} | {}",
                    item.description,
                    format_amount(item.claimed_amount),
                    format_amount(item.approved_amount),
                    item.status,
                    item.reason
                )?;
            }
        }

        if let Some(next_steps) = &self.next_steps {
            writeln!(f)?;
            writeln!(f, "Next Steps")?;
            writeln!(f, "  {next_steps}")?;
        }
        Ok(())
    }
}

/// Text rendering of the intake form itself.
pub struct FormView<'a>(pub &'a ClaimForm);

impl fmt::Display for FormView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let form = self.0;
        writeln!(f, "Claim Documents")?;
        if form.documents().is_empty() {
            writeln!(f, "  No documents added")?;
        }
        for (index, entry) in form.documents().entries().iter().enumerate() {
            let file = entry
                .file
                .as_ref()
                .map(|file| file.name())
                .unwrap_or("Choose file...");
            writeln!(
                f,
                "  {}. [id {}] {} - {}",
                index + 1,
                entry.id,
                entry.kind.label(),
                file
            )?;
        }

        let date = match form.claim_date() {
            "" => "(not set)",
            date => date,
        };
        writeln!(f, "Claim Date: {date}")?;

        // A validation error supersedes the last failure; one error at a time.
        let validation = form.validation_error();
        if let Some(err) = validation {
            writeln!(f, "Error: {err}")?;
        }
        match form.status() {
            SubmissionStatus::Idle => {}
            SubmissionStatus::Submitting { .. } => writeln!(f, "Processing Claim...")?,
            SubmissionStatus::Failed(_) if validation.is_some() => {}
            SubmissionStatus::Failed(err) => writeln!(f, "Error: {err}")?,
            SubmissionStatus::Succeeded(decision) => {
                writeln!(f)?;
                write!(f, "{}", present(decision))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/presenter_tests.rs"]
mod tests;
