//! Change notification for schema instances
//!
//! Every change reported by the backend connection is delivered to:
//! - the instance's single callback slot (replaced on each registration)
//! - every `broadcast` receiver obtained through `SchemaInstance::subscribe`

use crate::contract::SchemaIdentity;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Single-slot change callback, receives the changed key
pub type ValueChangedCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Event data for a changed key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChanged {
    pub app_name: String,
    pub schema_id: String,
    pub schema_path: String,
    /// Name of the changed key
    pub key: String,
    /// Timestamp of the event
    pub timestamp: DateTime<Utc>,
}

impl ValueChanged {
    pub fn new(identity: &SchemaIdentity, key: &str) -> Self {
        Self {
            app_name: identity.app_name.clone(),
            schema_id: identity.schema_id.clone(),
            schema_path: identity.schema_path.clone(),
            key: key.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Dispatch state shared between an instance and its backend subscription
pub struct ChangeNotifier {
    identity: SchemaIdentity,
    slot: RwLock<Option<ValueChangedCallback>>,
    sender: broadcast::Sender<ValueChanged>,
}

impl ChangeNotifier {
    pub fn new(identity: SchemaIdentity, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            identity,
            slot: RwLock::new(None),
            sender,
        }
    }

    /// Replace the callback slot
    pub fn set_callback(&self, callback: Option<ValueChangedCallback>) {
        *self.slot.write() = callback;
    }

    pub fn has_callback(&self) -> bool {
        self.slot.read().is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ValueChanged> {
        self.sender.subscribe()
    }

    /// Deliver a change on the calling thread
    pub fn notify(&self, key: &str) {
        // Clone out of the lock so the callback may touch the slot itself.
        let callback = self.slot.read().clone();
        if let Some(callback) = callback {
            callback(key);
        }

        if self.sender.receiver_count() > 0 {
            // Lagging or closed receivers are their own concern.
            let _ = self.sender.send(ValueChanged::new(&self.identity, key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn identity() -> SchemaIdentity {
        SchemaIdentity::new("myapp", "com.test.mytest", "/com/test/mytest/")
    }

    #[test]
    fn test_notify_without_callback_is_noop() {
        let notifier = ChangeNotifier::new(identity(), 8);
        assert!(!notifier.has_callback());
        notifier.notify("logFormat");
    }

    #[test]
    fn test_later_callback_replaces_earlier() {
        let notifier = ChangeNotifier::new(identity(), 8);
        let first = Arc::new(Mutex::new(Vec::<String>::new()));
        let second = Arc::new(Mutex::new(Vec::<String>::new()));

        let sink = first.clone();
        notifier.set_callback(Some(Arc::new(move |key: &str| sink.lock().push(key.to_string()))));
        let sink = second.clone();
        notifier.set_callback(Some(Arc::new(move |key: &str| sink.lock().push(key.to_string()))));

        notifier.notify("logFormat");

        assert!(first.lock().is_empty());
        assert_eq!(*second.lock(), vec!["logFormat".to_string()]);
    }

    #[test]
    fn test_callback_may_clear_its_own_slot() {
        let notifier = Arc::new(ChangeNotifier::new(identity(), 8));
        let inner = notifier.clone();
        notifier.set_callback(Some(Arc::new(move |_key: &str| inner.set_callback(None))));

        notifier.notify("logFormat");

        assert!(!notifier.has_callback());
    }

    #[test]
    fn test_broadcast_event_carries_identity() {
        let notifier = ChangeNotifier::new(identity(), 8);
        let mut rx = notifier.subscribe();

        notifier.notify("maxFiles");

        let event = rx.try_recv().unwrap();
        assert_eq!(event.key, "maxFiles");
        assert_eq!(event.schema_id, "com.test.mytest");
        assert_eq!(event.app_name, "myapp");
    }
}
