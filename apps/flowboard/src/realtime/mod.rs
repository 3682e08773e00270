//! Push notifications for board mutations.

pub mod sink;

pub use sink::{BoardNotification, BroadcastSink, NotificationSink, NotifyError, NullSink};
