//! Gate commands: login, logout, profile inspection, and manual sync.

use std::sync::Arc;

use stonebridge_core::Email;
use stonebridge_gate::auth::AuthView;
use stonebridge_gate::config::GateConfig;
use stonebridge_gate::models::Profile;
use stonebridge_gate::store::ProfileStore;

use crate::console::ConsoleNotifier;

use super::{CliError, build_gate};

/// Run an email through the gate's login flow and report where it landed.
///
/// Dev bypasses and manual overrides raise their confirmations on the
/// terminal.
///
/// # Errors
///
/// Returns an error when configuration is missing or the gate cannot be
/// built. Login rejections are reported through notices, not errors.
pub async fn login(email: &str) -> Result<(), CliError> {
    let mut gate = build_gate(Arc::new(ConsoleNotifier))?;
    gate.init().await;

    if gate.view() == AuthView::Listings {
        tracing::info!("Already signed in; run `sb-cli logout` to switch accounts");
        return Ok(());
    }

    gate.show(AuthView::Login);
    gate.submit_login(email).await;

    match gate.view() {
        AuthView::Listings => tracing::info!("Signed in; the listings are unlocked"),
        AuthView::Verification => {
            tracing::info!("Verification pending; check the inbox for {email}");
        }
        AuthView::NotRegistered => tracing::warn!("{email} is not registered"),
        view => tracing::warn!(?view, "Login did not complete"),
    }
    Ok(())
}

/// Sign out. The stored profile keeps its interest lists.
///
/// # Errors
///
/// Returns an error when configuration is missing or the gate cannot be
/// built.
pub async fn logout() -> Result<(), CliError> {
    let mut gate = build_gate(Arc::new(ConsoleNotifier))?;
    gate.sign_out().await;
    Ok(())
}

/// Print the stored visitor profile.
///
/// # Errors
///
/// Returns [`CliError::NoProfile`] when nothing is stored yet.
pub async fn profile() -> Result<(), CliError> {
    let config = GateConfig::from_env()?;
    let store = ProfileStore::new(&config.data_dir);
    let Some(profile) = store.load().await else {
        return Err(CliError::NoProfile);
    };
    print_profile(&profile);
    Ok(())
}

/// Push the stored profile through the transport cascade.
///
/// A push no transport accepts is a warning, not a failure; CRM trouble
/// never breaks the caller.
///
/// # Errors
///
/// Returns [`CliError::NoProfile`] when nothing is stored yet.
pub async fn sync() -> Result<(), CliError> {
    let gate = build_gate(Arc::new(ConsoleNotifier))?;
    let Some(profile) = gate.store().load().await else {
        return Err(CliError::NoProfile);
    };

    if gate.sync_engine().sync_profile(&profile, None).await {
        tracing::info!("Profile accepted by the CRM");
    } else {
        tracing::warn!("No transport accepted the profile");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_profile(profile: &Profile) {
    let email = profile.email.as_ref().map_or("-", Email::as_str);
    let name = profile.display_name();

    println!("email:         {email}");
    println!("name:          {}", if name.is_empty() { "-" } else { name.as_str() });
    println!(
        "phone:         {}",
        if profile.phone.is_empty() {
            "-"
        } else {
            profile.phone.as_str()
        }
    );
    println!("authenticated: {}", profile.authenticated);
    if let Some(date) = profile.verification_date {
        println!("verified at:   {date}");
    }
    println!("favorites:");
    for title in &profile.listings_of_interest {
        println!("  - {title}");
    }
    println!("projects:");
    for project in &profile.projects_of_interest {
        println!("  - {project}");
    }
}
