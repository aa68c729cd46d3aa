//! Listener registry with RAII subscription tokens
//!
//! An occupied object listens for clicks (capture phase) and keys through
//! subscriptions held by its occupancy. Dropping the token removes the
//! listener, so release paths never leave listeners behind.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::ObjectId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Sees every click before anything else
    CaptureClick,
    KeyDown,
    KeyUp,
}

#[derive(Debug)]
struct Listener {
    kind: ListenerKind,
    owner: ObjectId,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

/// Session-local listener registry
#[derive(Clone, Debug, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        ListenerRegistry::default()
    }

    /// Register a listener for `owner`; it lives as long as the token
    pub fn subscribe(&self, kind: ListenerKind, owner: ObjectId) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Listener { kind, owner });
        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Owners listening for `kind`, in subscription order
    pub fn owners(&self, kind: ListenerKind) -> Vec<ObjectId> {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|l| l.kind == kind)
            .map(|l| l.owner)
            .collect()
    }

    /// The object capturing clicks, if any
    pub fn capture_owner(&self) -> Option<ObjectId> {
        self.owners(ListenerKind::CaptureClick).last().copied()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Token that keeps a listener registered
#[derive(Debug)]
#[must_use = "dropping a subscription removes its listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<RegistryInner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.borrow_mut().listeners.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_unsubscribes() {
        let registry = ListenerRegistry::new();
        let click = registry.subscribe(ListenerKind::CaptureClick, ObjectId(1));
        let key = registry.subscribe(ListenerKind::KeyDown, ObjectId(1));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.capture_owner(), Some(ObjectId(1)));

        drop(click);
        assert_eq!(registry.capture_owner(), None);
        assert_eq!(registry.owners(ListenerKind::KeyDown), vec![ObjectId(1)]);

        drop(key);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_repeated_cycles_do_not_leak() {
        let registry = ListenerRegistry::new();
        for _ in 0..100 {
            let _subs = [
                registry.subscribe(ListenerKind::CaptureClick, ObjectId(0)),
                registry.subscribe(ListenerKind::KeyUp, ObjectId(0)),
            ];
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_token_outliving_registry() {
        let registry = ListenerRegistry::new();
        let token = registry.subscribe(ListenerKind::KeyUp, ObjectId(3));
        drop(registry);
        drop(token);
    }
}
