/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Toast surface for user-visible messages
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);
}

/// Notifier that writes every message to the `tracing` pipeline
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(target: "shop_realtime::notify", "{}", message)
            }
            NotificationLevel::Warning => {
                tracing::warn!(target: "shop_realtime::notify", "{}", message)
            }
            NotificationLevel::Error => {
                tracing::error!(target: "shop_realtime::notify", "{}", message)
            }
        }
    }
}
