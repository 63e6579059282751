//! Threshold alerting
//!
//! Alerts are raised synchronously while a request completes. Critical ones
//! are logged at once and queued for the dispatcher, which delivers them to
//! every notification channel that accepts the severity.

mod channels;
mod dispatcher;
mod evaluator;

pub use channels::{LogChannel, NotificationChannel, WebhookChannel};
pub use dispatcher::AlertDispatcher;
pub use evaluator::AlertEvaluator;
