//! Terminal implementation of the gate's notification surface.

use async_trait::async_trait;

use stonebridge_gate::app::{NoticeLevel, Notifier};

/// Notifier that logs notices and asks confirmations on the terminal.
///
/// Confirmations are the blocking dialogs the gate raises for manual
/// overrides and dev bypasses; anything but an explicit yes declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!("{message}"),
            NoticeLevel::Error => tracing::error!("{message}"),
        }
    }

    async fn confirm(&self, message: &str) -> bool {
        let prompt = format!("{message} [y/N] ");
        // Reading stdin blocks; keep it off the async workers.
        tokio::task::spawn_blocking(move || ask(&prompt))
            .await
            .unwrap_or(false)
    }
}

#[allow(clippy::print_stdout)]
fn ask(prompt: &str) -> bool {
    use std::io::{BufRead, Write};

    print!("{prompt}");
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
