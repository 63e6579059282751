//! Delivery of queued alerts and reports to notification channels

use super::channels::NotificationChannel;
use crate::monitoring::bounded::BoundedPush;
use crate::monitoring::report::PerformanceReport;
use crate::monitoring::types::Alert;
use crate::utils::error::{Result, ServiceError};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fan-out to notification channels
#[derive(Debug)]
pub struct AlertDispatcher {
    channels: RwLock<Vec<Arc<dyn NotificationChannel>>>,
    pending: Mutex<VecDeque<Alert>>,
    capacity: usize,
}

impl AlertDispatcher {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(Vec::new()),
            pending: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    pub fn add_channel(&self, channel: Arc<dyn NotificationChannel>) {
        debug!(channel = channel.name(), "Registered notification channel");
        self.channels.write().push(channel);
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels.read().iter().map(|c| c.name().to_string()).collect()
    }

    /// Queue an alert for the next delivery pass
    pub fn enqueue(&self, alert: Alert) {
        if self.pending.lock().push_bounded(alert, self.capacity) {
            warn!("Alert queue full, dropped oldest undelivered alert");
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Deliver every queued alert, returning the number of successful sends
    pub async fn process_pending(&self) -> usize {
        let batch: Vec<Alert> = self.pending.lock().drain(..).collect();
        if batch.is_empty() {
            return 0;
        }

        let channels = self.channels.read().clone();
        let mut delivered = 0;
        for alert in &batch {
            for channel in channels.iter().filter(|c| c.supports_severity(alert.severity)) {
                match channel.send_alert(alert).await {
                    Ok(()) => delivered += 1,
                    Err(e) => warn!(
                        channel = channel.name(),
                        alert_id = %alert.id,
                        error = %e,
                        "Failed to deliver alert"
                    ),
                }
            }
        }
        debug!(alerts = batch.len(), delivered, "Processed pending alerts");
        delivered
    }

    /// Send a report to every channel. Fails only when every channel failed.
    pub async fn send_report(&self, report: &PerformanceReport, rendered: &str) -> Result<usize> {
        let channels = self.channels.read().clone();
        let mut delivered = 0;
        let mut last_error = None;

        for channel in &channels {
            match channel.send_report(report, rendered).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(channel = channel.name(), error = %e, "Failed to deliver report");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if delivered == 0 => Err(ServiceError::notification(format!(
                "report delivery failed on every channel: {}",
                e
            ))),
            _ => Ok(delivered),
        }
    }
}
