//! Lock-guarded entry lists backing an [`EventBus`](crate::EventBus).
//!
//! Handlers and processors live in two independent lists, each behind its own mutex,
//! so publishing never waits on dispatching and vice versa. Locks are held only for
//! list operations. Traversals work on a snapshot taken under the lock and invoke
//! callbacks after it has been released.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{BusTrace, HandlerEntry, ProcessorEntry};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `BusTrace` for every bus operation.
/// It must be thread-safe because a bus may be shared between threads.
pub type TraceCallback = dyn Fn(&BusTrace) + Send + Sync + 'static;

/// Ordered list of entries in registration order.
pub(crate) struct EntryList<T> {
    entries: Mutex<Vec<Arc<T>>>,
}

impl<T> EntryList<T> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    // Callbacks never run under this lock, so a poisoned list is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<T>>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub(crate) fn append(&self, entry: Arc<T>) {
        self.lock().push(entry);
    }

    /// Removes `entry` by identity. Returns `false` if it was not in the list.
    pub(crate) fn remove(&self, entry: &Arc<T>) -> bool {
        let mut entries = self.lock();
        match entries.iter().position(|other| Arc::ptr_eq(other, entry)) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every listed entry in a single critical section.
    pub(crate) fn remove_all(&self, removed: &[Arc<T>]) {
        self.lock()
            .retain(|entry| !removed.iter().any(|other| Arc::ptr_eq(entry, other)));
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
        self.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Empties the list and returns what it held.
    pub(crate) fn drain(&self) -> Vec<Arc<T>> {
        std::mem::take(&mut *self.lock())
    }
}

/// Shared state of one bus: both entry lists and the trace callback.
///
/// Subscriptions keep only a `Weak` reference to it.
pub(crate) struct Registry {
    pub(crate) handlers: EntryList<HandlerEntry>,
    pub(crate) processors: EntryList<ProcessorEntry>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            handlers: EntryList::new(),
            processors: EntryList::new(),
            trace: Mutex::new(None),
        }
    }

    pub(crate) fn set_trace_callback(&self, callback: Arc<TraceCallback>) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(callback);
    }

    pub(crate) fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Emits a trace record using the current callback.
    ///
    /// The callback is cloned out of the lock first, so it may call back into the bus,
    /// including replacing itself.
    pub(crate) fn emit_event(&self, event: &BusTrace) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[u32]) -> (EntryList<u32>, Vec<Arc<u32>>) {
        let list = EntryList::new();
        let entries: Vec<Arc<u32>> = values.iter().map(|v| Arc::new(*v)).collect();
        for entry in &entries {
            list.append(entry.clone());
        }
        (list, entries)
    }

    fn values(list: &EntryList<u32>) -> Vec<u32> {
        list.snapshot().iter().map(|v| **v).collect()
    }

    #[test]
    fn test_append_keeps_registration_order() {
        let (list, _) = list_of(&[3, 1, 2]);
        assert_eq!(values(&list), vec![3, 1, 2]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_remove_by_identity() {
        // Two entries with equal values but different allocations.
        let (list, entries) = list_of(&[5, 5, 7]);

        assert!(list.remove(&entries[1]));
        let remaining = list.snapshot();
        assert_eq!(remaining.len(), 2);
        assert!(Arc::ptr_eq(&remaining[0], &entries[0]));
        assert!(Arc::ptr_eq(&remaining[1], &entries[2]));
    }

    #[test]
    fn test_remove_absent_is_tolerated() {
        let (list, entries) = list_of(&[1, 2]);

        assert!(list.remove(&entries[0]));
        assert!(!list.remove(&entries[0]));
        assert!(!list.remove(&Arc::new(9)));
        assert_eq!(values(&list), vec![2]);
    }

    #[test]
    fn test_remove_all() {
        let (list, entries) = list_of(&[1, 2, 3, 4]);

        list.remove_all(&[entries[3].clone(), entries[1].clone()]);
        assert_eq!(values(&list), vec![1, 3]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let (list, _) = list_of(&[1, 2]);

        let snapshot = list.snapshot();
        list.append(Arc::new(3));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_drain() {
        let (list, _) = list_of(&[1, 2]);

        let drained = list.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_trace_callback_set_and_clear() {
        use std::sync::Mutex as StdMutex;

        let registry = Registry::new();
        let events = Arc::new(StdMutex::new(Vec::new()));
        let events_clone = events.clone();

        registry.set_trace_callback(Arc::new(move |e: &BusTrace| {
            events_clone.lock().unwrap().push(e.to_string());
        }));
        registry.emit_event(&BusTrace::Dispose {
            event_type: "u8",
            removed: true,
        });

        registry.clear_trace_callback();
        registry.emit_event(&BusTrace::Dispose {
            event_type: "u8",
            removed: false,
        });

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0], "dispose { event_type: u8, removed: true }");
    }
}
