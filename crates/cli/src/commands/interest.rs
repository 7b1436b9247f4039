//! Interest commands: favorites, comparisons, inquiries, classification.

use std::sync::Arc;

use stonebridge_core::InterestKind;
use stonebridge_gate::classifier::classify;
use stonebridge_gate::recorder::{InquiryContact, InterestRecorder};

use crate::console::ConsoleNotifier;

use super::{CliError, build_gate};

/// Favorite a listing. Stores the title and its project, then waits for
/// the CRM push.
///
/// # Errors
///
/// Returns an error when configuration is missing or the profile cannot be
/// persisted.
pub async fn favorite(title: &str) -> Result<(), CliError> {
    record(title, InterestKind::Favorite).await
}

/// Remove a listing from the favorites. The project stays on the profile.
///
/// # Errors
///
/// Returns an error when configuration is missing or the profile cannot be
/// persisted.
pub async fn unfavorite(title: &str) -> Result<(), CliError> {
    record(title, InterestKind::Unfavorite).await
}

/// Record a comparison, which stores the listing title and its project.
///
/// # Errors
///
/// Returns an error when configuration is missing or the profile cannot be
/// persisted.
pub async fn compare(title: &str) -> Result<(), CliError> {
    record(title, InterestKind::Compare).await
}

/// Submit an inquiry for a listing and wait for the CRM push.
///
/// Contact details given on the command line stand in for the inquiry
/// form's fields: they overwrite the stored values and can create a
/// profile when none exists yet. `project` replaces the classified project
/// in the pushed payload.
///
/// # Errors
///
/// Returns [`CliError::NoProfile`] when nothing is stored and no email was
/// given; an inquiry has nothing to identify the visitor by. An invalid
/// `--email` surfaces as [`CliError::Email`].
pub async fn inquire(
    title: &str,
    project: Option<&str>,
    email: Option<&str>,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<(), CliError> {
    let gate = build_gate(Arc::new(ConsoleNotifier))?;
    let contact = InquiryContact {
        email: email.map(str::parse).transpose()?,
        first_name: name.map(str::to_owned),
        last_name: None,
        phone: phone.map(str::to_owned),
    };
    if contact.email.is_none() && gate.store().load().await.is_none() {
        return Err(CliError::NoProfile);
    }

    let recorder = InterestRecorder::new(gate.store(), gate.sync_engine());
    if recorder.record_inquiry(title, None, &contact, project).await? {
        tracing::info!("Inquiry pushed to the CRM");
    } else {
        tracing::warn!("Inquiry was not accepted by any transport");
    }
    Ok(())
}

/// Print the project a listing title classifies to.
#[allow(clippy::print_stdout)]
pub fn classify_title(title: &str) {
    println!("{}", classify(title));
}

async fn record(title: &str, kind: InterestKind) -> Result<(), CliError> {
    let gate = build_gate(Arc::new(ConsoleNotifier))?;
    let recorder = InterestRecorder::new(gate.store(), gate.sync_engine());

    let (event, pushed) = recorder.record_interest_synced(title, None, kind).await?;
    if pushed {
        tracing::info!(project = %event.project, "Recorded {kind}; CRM updated");
    } else {
        tracing::info!(
            project = %event.project,
            "Recorded {kind}; no CRM push without a stored email address"
        );
    }
    Ok(())
}
