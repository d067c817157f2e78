//! Parsing of user input into form actions.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use shared::domain::{DocumentId, DocumentType};

/// One line typed at the interactive form prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    Add,
    Remove { id: DocumentId },
    SetType { id: DocumentId, raw_type: String },
    AttachFile { id: DocumentId, path: PathBuf },
    SetDate { claim_date: String },
    Show,
    Types,
    Submit,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  add                      add a document entry
  remove <id>              remove a document entry
  type <id> <type>         set the document type (see `types`)
  file <id> <path>         attach a file to a document entry
  date <YYYY-MM-DD>        set the claim date
  show                     show the form
  types                    list document types
  submit                   process the claim
  help                     show this help
  quit                     leave the form";

pub fn parse_line(line: &str) -> Result<FormCommand> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        bail!("empty command");
    };
    let rest: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("add", []) => FormCommand::Add,
        ("remove" | "rm", [id]) => FormCommand::Remove { id: parse_id(id)? },
        ("type", [id, raw_type]) => FormCommand::SetType {
            id: parse_id(id)?,
            raw_type: raw_type.to_string(),
        },
        ("file", [id, path @ ..]) if !path.is_empty() => FormCommand::AttachFile {
            id: parse_id(id)?,
            path: PathBuf::from(path.join(" ")),
        },
        ("date", [raw]) => FormCommand::SetDate {
            claim_date: parse_claim_date(raw)?,
        },
        ("date", []) => FormCommand::SetDate {
            claim_date: String::new(),
        },
        ("show", []) => FormCommand::Show,
        ("types", []) => FormCommand::Types,
        ("submit", []) => FormCommand::Submit,
        ("help" | "?", _) => FormCommand::Help,
        ("quit" | "exit", []) => FormCommand::Quit,
        _ => bail!("unrecognised command '{}'; type `help`", line.trim()),
    };
    Ok(command)
}

fn parse_id(raw: &str) -> Result<DocumentId> {
    raw.parse::<u64>()
        .map(DocumentId)
        .with_context(|| format!("'{raw}' is not a document id"))
}

/// Accepts calendar dates only, normalised to `YYYY-MM-DD`.
pub fn parse_claim_date(raw: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("'{raw}' is not a date in YYYY-MM-DD form"))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// `<type>=<path>` as given to `submit --doc`.
pub fn parse_document_arg(raw: &str) -> Result<(DocumentType, PathBuf)> {
    let (kind, path) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected <type>=<path>, got '{raw}'"))?;
    let kind = kind.trim().parse::<DocumentType>()?;
    let path = path.trim();
    if path.is_empty() {
        bail!("missing file path for document type '{kind}'");
    }
    Ok((kind, PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_actions() {
        assert_eq!(parse_line("add").expect("add"), FormCommand::Add);
        assert_eq!(
            parse_line("remove 3").expect("remove"),
            FormCommand::Remove { id: DocumentId(3) }
        );
        assert_eq!(
            parse_line("type 2 lab_results").expect("type"),
            FormCommand::SetType {
                id: DocumentId(2),
                raw_type: "lab_results".to_string()
            }
        );
        assert_eq!(
            parse_line("file 1 scans/my bill.pdf").expect("file"),
            FormCommand::AttachFile {
                id: DocumentId(1),
                path: PathBuf::from("scans/my bill.pdf")
            }
        );
        assert_eq!(parse_line("  SUBMIT ").expect("submit"), FormCommand::Submit);
    }

    #[test]
    fn unknown_type_names_still_parse_as_commands() {
        assert!(matches!(
            parse_line("type 1 x_ray").expect("type"),
            FormCommand::SetType { .. }
        ));
    }

    #[test]
    fn date_is_normalised_and_validated() {
        assert_eq!(
            parse_line("date 2024-03-05").expect("date"),
            FormCommand::SetDate {
                claim_date: "2024-03-05".to_string()
            }
        );
        assert!(parse_line("date 15/03/2024").is_err());
        assert!(parse_line("date 2024-02-30").is_err());
        assert_eq!(
            parse_line("date").expect("clear"),
            FormCommand::SetDate {
                claim_date: String::new()
            }
        );
    }

    #[test]
    fn rejects_bad_ids_and_unknown_verbs() {
        assert!(parse_line("remove abc").is_err());
        assert!(parse_line("upload 1").is_err());
        assert!(parse_line("").is_err());
    }

    #[test]
    fn document_args_split_type_and_path() {
        let (kind, path) = parse_document_arg("medical_bill=./bill.pdf").expect("doc");
        assert_eq!(kind, DocumentType::MedicalBill);
        assert_eq!(path, PathBuf::from("./bill.pdf"));

        assert!(parse_document_arg("bill.pdf").is_err());
        assert!(parse_document_arg("x_ray=scan.png").is_err());
        assert!(parse_document_arg("prescription=").is_err());
    }
}
