//! Fire-and-forget store events.
//!
//! Events are dispatched only after the transaction that produced them has committed. A failing
//! [`Notifier`] is logged and otherwise ignored.

use serde::Serialize;
use tracing::{info, warn};

/// Something other parts of the shop may want to hear about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    OrderConfirmed {
        order_id: i64,
        user_id: String,
        vendor_id: i64,
    },
    CouponCreated {
        coupon_id: i64,
        code: String,
        vendor_id: i64,
    },
    CouponDeleted {
        code: String,
        vendor_id: i64,
    },
}

/// Error reported by a notifier.
#[derive(Debug, thiserror::Error)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

/// Receiver of store events (email, webhooks, ...).
pub trait Notifier: Send + Sync {
    /// Delivers one event.
    fn notify(&self, event: &StoreEvent) -> std::result::Result<(), NotifyError>;
}

/// Default notifier that records events in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &StoreEvent) -> std::result::Result<(), NotifyError> {
        info!(?event, "Store event");
        Ok(())
    }
}

/// Sends `event`, swallowing any failure.
pub fn dispatch(notifier: &dyn Notifier, event: StoreEvent) {
    if let Err(e) = notifier.notify(&event) {
        warn!("Dropping {:?}: {}", event, e);
    }
}
