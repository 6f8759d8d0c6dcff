//! Document-level key listeners.
//!
//! The host forwards every keydown that is not consumed elsewhere to a [`KeyboardSurface`].
//! Listeners are registered with [`KeyboardSurface::add_listener`] and stay registered for as
//! long as the returned [`ListenerGuard`] lives.

use std::sync::{Arc, Mutex, Weak};

/// A keydown event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    key: String,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default_prevented: false,
        }
    }

    /// The key value, e.g. `"q"`, `"Enter"` or `" "`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Asks the host not to run the key's default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type KeyHandler = Box<dyn FnMut(&mut KeyEvent) + Send>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, KeyHandler)>,
}

/// Registry of document-level keydown listeners.
#[derive(Clone, Default)]
pub struct KeyboardSurface {
    listeners: Arc<Mutex<Listeners>>,
}

impl KeyboardSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler`; it is removed again when the returned guard is dropped.
    pub fn add_listener(&self, handler: KeyHandler) -> ListenerGuard {
        let mut listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, handler));

        ListenerGuard {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// Listeners must not register or drop listeners on the same surface while handling.
    pub fn dispatch(&self, event: &mut KeyEvent) {
        let mut listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (_, handler) in listeners.entries.iter_mut() {
            handler(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .map(|listeners| listeners.entries.len())
            .unwrap_or(0)
    }
}

/// Keeps one listener registered. Dropping it deregisters the listener.
#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct ListenerGuard {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let mut listeners = match listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        listeners.entries.retain(|(id, _)| *id != self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_listener(count: &Arc<AtomicUsize>) -> KeyHandler {
        let count = Arc::clone(count);
        Box::new(move |_event: &mut KeyEvent| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_reaches_listener() {
        let surface = KeyboardSurface::new();
        let count = Arc::new(AtomicUsize::new(0));
        let _guard = surface.add_listener(counting_listener(&count));

        surface.dispatch(&mut KeyEvent::new("q"));
        surface.dispatch(&mut KeyEvent::new("Shift"));

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dropping_guard_removes_listener() {
        let surface = KeyboardSurface::new();
        let count = Arc::new(AtomicUsize::new(0));
        let guard = surface.add_listener(counting_listener(&count));
        assert_eq!(surface.listener_count(), 1);

        drop(guard);
        surface.dispatch(&mut KeyEvent::new("q"));

        assert_eq!(surface.listener_count(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_guards_only_remove_their_own_listener() {
        let surface = KeyboardSurface::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let first_guard = surface.add_listener(counting_listener(&first));
        let _second_guard = surface.add_listener(counting_listener(&second));

        drop(first_guard);
        surface.dispatch(&mut KeyEvent::new("w"));

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_outliving_surface() {
        let surface = KeyboardSurface::new();
        let guard = surface.add_listener(Box::new(|_: &mut KeyEvent| {}));

        drop(surface);
        drop(guard);
    }

    #[test]
    fn test_prevent_default() {
        let surface = KeyboardSurface::new();
        let _guard = surface.add_listener(Box::new(|event: &mut KeyEvent| {
            if event.key() == "Tab" {
                event.prevent_default();
            }
        }));

        let mut tab = KeyEvent::new("Tab");
        let mut other = KeyEvent::new("a");
        surface.dispatch(&mut tab);
        surface.dispatch(&mut other);

        assert!(tab.default_prevented());
        assert!(!other.default_prevented());
    }
}
