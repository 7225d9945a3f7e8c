//! # Document Model
//!
//! The single structured value being edited, plus the registry of listeners
//! that observe it.
//!
//! A [`Document`] is a cheap-clone handle: the tree renderer, the sync
//! controller and the host all share one instance and address nodes by
//! [`Path`]. Everything runs on one thread, so interior mutability replaces
//! locking.
//!
//! ## Notification protocol
//!
//! ```text
//! mutate/reset ──→ value updated ──→ version += 1 ──→ listeners notified
//!                                                      (snapshot, id order)
//! ```
//!
//! - Delivery is synchronous: when `mutate`/`reset` returns, every listener
//!   subscribed at that moment has run once.
//! - Each pass walks a snapshot of the listener set. Listeners added during
//!   a pass first run on the next pass; listeners removed during a pass are
//!   skipped for the rest of it.
//! - A mutation made from inside a listener is applied immediately, but its
//!   notification is queued and delivered after the current pass.
//! - `reset(value, true)` replaces the value without notifying anyone.

use crate::{EditorError, Path, PathSegment};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// What a notification pass is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// The subtree at `path` changed
    Mutated { path: Path },

    /// The whole value was replaced
    Reset,
}

/// Payload delivered to document listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    pub kind: ChangeKind,

    /// Document version after the change
    pub version: u64,
}

struct ListenerEntry {
    id: u64,
    active: Cell<bool>,
    callback: Box<dyn Fn(&DocumentChange)>,
}

struct Inner {
    value: RefCell<Value>,
    version: Cell<u64>,
    listeners: RefCell<HashMap<u64, Rc<ListenerEntry>>>,
    next_listener_id: Cell<u64>,
    notifying: Cell<bool>,
    queued: RefCell<VecDeque<DocumentChange>>,
}

/// Editable structured document
#[derive(Clone)]
pub struct Document {
    inner: Rc<Inner>,
}

impl Document {
    pub fn new(value: Value) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                version: Cell::new(0),
                listeners: RefCell::new(HashMap::new()),
                next_listener_id: Cell::new(0),
                notifying: Cell::new(false),
                queued: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Whether both handles refer to the same document instance
    pub fn ptr_eq(a: &Document, b: &Document) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Incremented by every mutation and reset, silent or not
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Copy of the whole value
    pub fn value(&self) -> Value {
        self.inner.value.borrow().clone()
    }

    /// Borrow the value for the duration of `f`.
    ///
    /// `f` must not mutate this document.
    pub fn with_value<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Copy of the node at `path`
    pub fn get(&self, path: &Path) -> Option<Value> {
        self.with_value(|root| resolve(root, path).cloned())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.with_value(|root| resolve(root, path).is_some())
    }

    /// Apply `updater` to the node at `path` and notify listeners.
    ///
    /// Fails with [`EditorError::PathNotFound`] (and leaves the document
    /// untouched) if any segment does not resolve against the current shape.
    /// `updater` must not access this document.
    pub fn mutate<F>(&self, path: &Path, updater: F) -> Result<(), EditorError>
    where
        F: FnOnce(&mut Value),
    {
        self.update(path, path.clone(), |node| {
            updater(node);
            Ok(())
        })
    }

    /// Set the node at `path`. The parent must exist; a missing final map
    /// key is created and a list index equal to the length appends.
    pub fn set(&self, path: &Path, value: Value) -> Result<(), EditorError> {
        let Some((parent, last)) = split(path) else {
            return self.mutate(path, |node| *node = value);
        };

        self.update(&parent, path.clone(), |node| match node {
            Value::Object(map) => {
                map.insert(last.as_key(), value);
                Ok(())
            }
            Value::Array(items) => match last.as_index() {
                Some(index) if index < items.len() => {
                    items[index] = value;
                    Ok(())
                }
                Some(index) if index == items.len() => {
                    items.push(value);
                    Ok(())
                }
                _ => Err(EditorError::PathNotFound(path.clone())),
            },
            _ => Err(EditorError::PathNotFound(path.clone())),
        })
    }

    /// Remove the map entry or list item at `path`, returning it
    pub fn remove(&self, path: &Path) -> Result<Value, EditorError> {
        let Some((parent, last)) = split(path) else {
            return Err(EditorError::PathNotFound(path.clone()));
        };

        self.update(&parent, path.clone(), |node| {
            let removed = match node {
                Value::Object(map) => map.shift_remove(&last.as_key()),
                Value::Array(items) => match last.as_index() {
                    Some(index) if index < items.len() => Some(items.remove(index)),
                    _ => None,
                },
                _ => None,
            };
            removed.ok_or_else(|| EditorError::PathNotFound(path.clone()))
        })
    }

    /// Insert `value` into the list at `path` before `index`
    pub fn insert(&self, path: &Path, index: usize, value: Value) -> Result<(), EditorError> {
        self.update(path, path.clone(), |node| match node {
            Value::Array(items) if index <= items.len() => {
                items.insert(index, value);
                Ok(())
            }
            _ => Err(EditorError::PathNotFound(path.child(index))),
        })
    }

    /// Replace the whole value. With `silent` no listener is notified.
    pub fn reset(&self, value: Value, silent: bool) {
        *self.inner.value.borrow_mut() = value;

        if silent {
            let version = self.bump_version();
            debug!(version, "Document reset silently");
        } else {
            self.commit(ChangeKind::Reset);
        }
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is unsubscribed or dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DocumentChange) + 'static,
    {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);

        let entry = Rc::new(ListenerEntry {
            id,
            active: Cell::new(true),
            callback: Box::new(listener),
        });
        self.inner.listeners.borrow_mut().insert(id, entry);

        Subscription {
            document: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn update<R, F>(&self, target: &Path, changed: Path, f: F) -> Result<R, EditorError>
    where
        F: FnOnce(&mut Value) -> Result<R, EditorError>,
    {
        let result = {
            let mut root = self.inner.value.borrow_mut();
            let node = resolve_mut(&mut root, target)
                .ok_or_else(|| EditorError::PathNotFound(changed.clone()))?;
            f(node)?
        };

        self.commit(ChangeKind::Mutated { path: changed });
        Ok(result)
    }

    fn bump_version(&self) -> u64 {
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);
        version
    }

    fn commit(&self, kind: ChangeKind) {
        let version = self.bump_version();
        self.notify(DocumentChange { kind, version });
    }

    fn notify(&self, change: DocumentChange) {
        if self.inner.notifying.get() {
            debug!(version = change.version, "Queueing notification behind the current pass");
            self.inner.queued.borrow_mut().push_back(change);
            return;
        }

        let _pass = NotifyPass::enter(&self.inner);
        let mut next = Some(change);

        while let Some(change) = next {
            let snapshot = self.listener_snapshot();
            trace!(version = change.version, listeners = snapshot.len(), "Notifying listeners");

            for entry in snapshot {
                if entry.active.get() {
                    (entry.callback)(&change);
                }
            }

            next = self.inner.queued.borrow_mut().pop_front();
        }
    }

    fn listener_snapshot(&self) -> Vec<Rc<ListenerEntry>> {
        let mut snapshot: Vec<_> = self.inner.listeners.borrow().values().cloned().collect();
        snapshot.sort_by_key(|entry| entry.id);
        snapshot
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("version", &self.version())
            .field("listeners", &self.listener_count())
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

/// Marks a notification pass in progress; queued changes are dropped if a
/// listener unwinds out of the pass.
struct NotifyPass<'a>(&'a Inner);

impl<'a> NotifyPass<'a> {
    fn enter(inner: &'a Inner) -> Self {
        inner.notifying.set(true);
        Self(inner)
    }
}

impl Drop for NotifyPass<'_> {
    fn drop(&mut self) {
        self.0.notifying.set(false);
        self.0.queued.borrow_mut().clear();
    }
}

/// Lease on a document listener
///
/// Removal is idempotent and also happens on drop. A removed listener never
/// runs again, even if a notification pass is in progress.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    document: Weak<Inner>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        let Some(inner) = self.document.upgrade() else {
            return;
        };

        let removed = inner.listeners.borrow_mut().remove(&self.id);
        if let Some(entry) = removed {
            entry.active.set(false);
        }
    }

    pub fn is_active(&self) -> bool {
        self.document
            .upgrade()
            .is_some_and(|inner| inner.listeners.borrow().contains_key(&self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

fn split(path: &Path) -> Option<(Path, &PathSegment)> {
    Some((path.parent()?, path.last()?))
}

fn child<'a>(node: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(&segment.as_key()),
        Value::Array(items) => items.get(segment.as_index()?),
        _ => None,
    }
}

fn resolve<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| child(node, segment))
}

fn resolve_mut<'a>(root: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut node = root;
    for segment in path.segments() {
        node = match node {
            Value::Object(map) => map.get_mut(&segment.as_key())?,
            Value::Array(items) => items.get_mut(segment.as_index()?)?,
            _ => return None,
        };
    }
    Some(node)
}
