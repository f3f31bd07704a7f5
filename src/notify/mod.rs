//! Status notifications (ntfy) and liveness heartbeats.
//!
//! Delivery never fails a session: every error is returned to the caller,
//! which logs it and carries on.

mod delivery;
mod health;
mod message;
mod notifier;

pub use delivery::{Delivery, DeliveryError, RetryPolicy};
pub use health::{HealthMonitor, MonitorKind};
pub use message::{Action, Message, MessageBuilder, Priority};
pub use notifier::{
    Notifier, ENV_HOST, ENV_TOKEN, ENV_TOPIC, HEARTBEAT_DONE, HEARTBEAT_START,
};
