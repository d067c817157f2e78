//! Line-oriented intake form. Input is read while a submission is in
//! flight; outcomes are printed when the session reports them.

use std::sync::Arc;

use anyhow::{Context, Result};
use claim_client::{ClaimSession, DocumentFile, FormView, SessionEvent, SubmitRejection};
use shared::domain::{DocumentType, ACCEPTED_EXTENSIONS};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::debug;

use crate::commands::{parse_line, FormCommand, HELP};

pub async fn run(session: Arc<ClaimSession>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut events = session.subscribe_events();
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Ok(FormCommand::Quit) => break,
                    Ok(command) => apply(&session, command).await,
                    Err(err) => println!("{err:#}"),
                }
            }
            event = events.recv() => match event {
                Ok(SessionEvent::SubmissionStarted { .. }) => println!("Processing Claim..."),
                Ok(SessionEvent::SubmissionSettled { .. }) => {
                    print!("{}", FormView(&session.form().await));
                }
                Ok(SessionEvent::OutcomeDiscarded { ticket }) => {
                    debug!(%ticket, "outcome discarded");
                }
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "form events lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    }

    session.close().await;
    Ok(())
}

async fn apply(session: &Arc<ClaimSession>, command: FormCommand) {
    match command {
        FormCommand::Add => {
            let id = session.edit(|form| form.add_document()).await;
            println!("added document {id}");
        }
        FormCommand::Remove { id } => {
            if !session.edit(|form| form.remove_document(id)).await {
                println!("no document with id {id}");
            }
        }
        FormCommand::SetType { id, raw_type } => {
            if raw_type.parse::<DocumentType>().is_err() {
                println!("unknown document type '{raw_type}'; type `types`");
                return;
            }
            if !session
                .edit(|form| form.set_document_type_raw(id, &raw_type))
                .await
            {
                println!("no document with id {id}");
            }
        }
        FormCommand::AttachFile { id, path } => {
            let file = match DocumentFile::load(&path).await {
                Ok(file) => file,
                Err(err) => {
                    println!("failed to read '{}': {err}", path.display());
                    return;
                }
            };
            if !file.has_accepted_extension() {
                println!(
                    "warning: accepted formats are {}",
                    ACCEPTED_EXTENSIONS.join(", ").to_uppercase()
                );
            }
            if !session.edit(|form| form.attach_file(id, Some(file))).await {
                println!("no document with id {id}");
            }
        }
        FormCommand::SetDate { claim_date } => {
            session.edit(|form| form.set_claim_date(claim_date)).await;
        }
        FormCommand::Show => print!("{}", FormView(&session.form().await)),
        FormCommand::Types => {
            for kind in DocumentType::ALL {
                println!("  {:<18} {}", kind.as_str(), kind.label());
            }
        }
        FormCommand::Submit => match session.submit().await {
            Ok(ticket) => debug!(%ticket, "claim dispatched"),
            Err(SubmitRejection::Invalid(err)) => println!("Error: {err}"),
            Err(err) => println!("{err}"),
        },
        FormCommand::Help => println!("{HELP}"),
        FormCommand::Quit => {}
    }
}
