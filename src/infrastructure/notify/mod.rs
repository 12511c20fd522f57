//! User notifications

use async_trait::async_trait;

mod console;
mod telegram;

pub use console::ConsoleNotifier;
pub use telegram::TelegramNotifier;

/// Notification sink. Delivery is fire-and-forget: backends log their own
/// failures and never propagate them into the refresh pipeline.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, message: &str);
}

/// Fan-out to every configured backend
#[derive(Default)]
pub struct CompositeNotifier {
    backends: Vec<Box<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, backend: Box<dyn Notifier>) {
        self.backends.push(backend);
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn notify(&self, title: &str, message: &str) {
        for backend in &self.backends {
            backend.notify(title, message).await;
        }
    }
}

/// Console backend always, Telegram when TG_TOKEN and CHAT_ID are set
pub fn from_env() -> CompositeNotifier {
    let mut composite = CompositeNotifier::new();
    composite.push(Box::new(ConsoleNotifier));
    let telegram = TelegramNotifier::from_env();
    if telegram.is_enabled() {
        composite.push(Box::new(telegram));
    }
    composite
}
