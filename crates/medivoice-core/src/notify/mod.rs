//! Outbound notifications: the appointment booking webhook and the Telegram Bot API.

mod telegram;
mod webhook;

pub use telegram::TelegramClient;
pub use webhook::{AppointmentPayload, WebhookNotifier, WEBHOOK_TIMEOUT};
