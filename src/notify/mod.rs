//! Best-effort delivery of pipeline results to a chat channel.

pub mod webhook;

pub use webhook::{Notifier, NotifyPayload, WebhookNotifier};
