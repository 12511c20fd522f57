use async_trait::async_trait;
use tracing::info;

use super::Notifier;

/// Logs notifications to the terminal
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, title: &str, message: &str) {
        info!("🔔 {}: {}", title, message);
    }
}
