use std::{collections::HashMap, sync::Arc};

use crossbeam::sync::ShardedLock;

/// Name of the event emitted when an evaluation falls back to its default.
pub const ERROR_EVENT: &str = "error";

type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Named event listeners, invoked synchronously in subscription order.
pub struct EventEmitter<P> {
    listeners: ShardedLock<HashMap<String, Vec<Handler<P>>>>,
}

impl<P> EventEmitter<P> {
    pub fn new() -> Self {
        Self {
            listeners: ShardedLock::new(HashMap::new()),
        }
    }

    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let mut listeners = self
            .listeners
            .write()
            .expect("should always be able to acquire lock");
        listeners
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Calls every listener of `event` with `payload`. Returns whether any
    /// listener was called.
    pub fn emit(&self, event: &str, payload: &P) -> bool {
        // Handlers run outside the lock so they may subscribe further listeners.
        let handlers: Vec<Handler<P>> = {
            let listeners = self
                .listeners
                .read()
                .expect("should always be able to acquire lock");
            match listeners.get(event) {
                Some(handlers) => handlers.clone(),
                None => return false,
            }
        };

        for handler in &handlers {
            handler(payload);
        }
        !handlers.is_empty()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .read()
            .expect("should always be able to acquire lock")
            .get(event)
            .map_or(0, Vec::len)
    }
}

impl<P> Default for EventEmitter<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_emit_in_subscription_order() {
        let emitter = EventEmitter::<String>::new();
        let calls = Arc::new(Mutex::new(vec![]));

        for id in 0..3 {
            let calls = calls.clone();
            emitter.on("error", move |payload: &String| {
                calls.lock().unwrap().push(format!("{}:{}", id, payload));
            });
        }

        assert!(emitter.emit("error", &"boom".to_string()));
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["0:boom", "1:boom", "2:boom"]
        );
    }

    #[test]
    fn test_emit_without_listeners() {
        let emitter = EventEmitter::<u32>::new();
        emitter.on("other", |_| panic!("should not be called"));

        assert!(!emitter.emit("error", &1));
        assert_eq!(emitter.listener_count("error"), 0);
        assert_eq!(emitter.listener_count("other"), 1);
    }

    #[test]
    fn test_handler_can_subscribe() {
        let emitter = Arc::new(EventEmitter::<u32>::new());
        let inner = emitter.clone();
        emitter.on("error", move |_| inner.on("error", |_| {}));

        emitter.emit("error", &1);
        assert_eq!(emitter.listener_count("error"), 2);
    }
}
