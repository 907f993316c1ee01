//! Client-side entity stores: the single source of truth for the lists the
//! console renders.
//!
//! Each store holds the last successful server response as a [`Snapshot`]
//! and pushes it to every live subscriber through a [`Channel`]. Mutations
//! never patch the snapshot locally; the store calls the backend, then
//! re-fetches the full list and publishes the replacement. Subscribers
//! therefore only ever observe complete server states, at the cost of one
//! extra list fetch per mutation (the managed collections are small).
//!
//! Everything here is single-threaded; the blocking client serializes loads,
//! so two overlapping reloads cannot race each other's responses.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use anyhow::Result;

use crate::api::{ProductBackend, UserBackend};
use crate::model::{CreateProductRequest, Product, UpdateProductRequest, User};

/// The store's current list value at a point in time.
///
/// A failed list load publishes `Unavailable` with the error text rather
/// than masking the failure behind an empty or substitute list; the screens
/// render it as an explicit "backend unavailable" state with a retry path.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot<T> {
    Ready(Vec<T>),
    Unavailable(String),
}

impl<T> Snapshot<T> {
    /// The entities in the snapshot; empty when unavailable.
    pub fn items(&self) -> &[T] {
        match self {
            Snapshot::Ready(items) => items,
            Snapshot::Unavailable(_) => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Snapshot::Unavailable(_))
    }
}

type Callback<T> = Box<dyn FnMut(&Snapshot<T>)>;

struct ChannelInner<T> {
    current: RefCell<Snapshot<T>>,
    subscribers: RefCell<Vec<(u64, Callback<T>)>>,
    // Unsubscribes that arrive while a publish is walking the registry are
    // deferred until the walk finishes.
    pending_removals: RefCell<Vec<u64>>,
    publishing: Cell<bool>,
    next_id: Cell<u64>,
}

impl<T> ChannelInner<T> {
    fn remove(inner: &Rc<Self>, id: u64) {
        if inner.publishing.get() {
            inner.pending_removals.borrow_mut().push(id);
        } else {
            inner.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
        }
    }
}

/// Explicit publish-subscribe cell: the current snapshot plus a registry of
/// live callbacks. New subscribers receive the latest snapshot immediately
/// (replay-latest semantics); every publish replaces the snapshot whole and
/// invokes all registered callbacks with it.
pub struct Channel<T> {
    inner: Rc<ChannelInner<T>>,
}

/// Registration handle returned by [`Channel::subscribe`]. Dropping it
/// removes the callback, so a screen that goes away stops receiving
/// snapshots; holding it is the subscriber's teardown discipline.
pub struct Subscription<T> {
    channel: Weak<ChannelInner<T>>,
    id: u64,
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.channel.upgrade() {
            ChannelInner::remove(&inner, self.id);
        }
    }
}

impl<T: Clone> Channel<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ChannelInner {
                current: RefCell::new(Snapshot::Ready(Vec::new())),
                subscribers: RefCell::new(Vec::new()),
                pending_removals: RefCell::new(Vec::new()),
                publishing: Cell::new(false),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Synchronous read of the last published snapshot.
    pub fn current(&self) -> Snapshot<T> {
        self.inner.current.borrow().clone()
    }

    /// Register a callback and deliver the current snapshot to it at once.
    ///
    /// Callbacks may subscribe or unsubscribe reentrantly but must not
    /// publish; publishing is the store's job.
    pub fn subscribe(&self, mut callback: impl FnMut(&Snapshot<T>) + 'static) -> Subscription<T> {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let snapshot = self.current();
        callback(&snapshot);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Box::new(callback)));
        Subscription {
            channel: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Replace the current snapshot and push it to every live subscriber.
    pub fn publish(&self, snapshot: Snapshot<T>) {
        *self.inner.current.borrow_mut() = snapshot;
        let snapshot = self.current();

        // Walk a detached copy of the registry so callbacks that subscribe
        // during delivery do not alias the borrow.
        self.inner.publishing.set(true);
        let mut active = std::mem::take(&mut *self.inner.subscribers.borrow_mut());
        for (_, callback) in active.iter_mut() {
            callback(&snapshot);
        }
        {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            let added = std::mem::take(&mut *subscribers);
            *subscribers = active;
            subscribers.extend(added);
        }
        self.inner.publishing.set(false);

        let removals: Vec<u64> = self.inner.pending_removals.borrow_mut().drain(..).collect();
        if !removals.is_empty() {
            self.inner
                .subscribers
                .borrow_mut()
                .retain(|(id, _)| !removals.contains(id));
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }
}

/// Authoritative in-memory list of products for the session.
///
/// Constructed once at startup; the constructor eagerly triggers the first
/// load, and the store lives until the process exits.
pub struct ProductStore {
    backend: Rc<dyn ProductBackend>,
    channel: Channel<Product>,
}

impl ProductStore {
    pub fn new(backend: Rc<dyn ProductBackend>) -> Rc<Self> {
        let store = Rc::new(Self {
            backend,
            channel: Channel::new(),
        });
        store.load();
        store
    }

    /// Fetch the full list, replace the snapshot, publish. Side effect only:
    /// a failure is published as [`Snapshot::Unavailable`], not returned.
    pub fn load(&self) {
        match self.backend.list() {
            Ok(items) => self.channel.publish(Snapshot::Ready(items)),
            Err(e) => self.channel.publish(Snapshot::Unavailable(e.to_string())),
        }
    }

    pub fn snapshot(&self) -> Snapshot<Product> {
        self.channel.current()
    }

    pub fn subscribe(
        &self,
        callback: impl FnMut(&Snapshot<Product>) + 'static,
    ) -> Subscription<Product> {
        self.channel.subscribe(callback)
    }

    /// Fetch one product by id. Detail and edit screens use this directly;
    /// it does not touch the snapshot.
    pub fn get(&self, id: u64) -> Result<Product> {
        self.backend.get(id)
    }

    /// Create a product, then reload so every subscriber sees the
    /// post-mutation list. On failure the snapshot is untouched and the
    /// error goes to the caller alone.
    pub fn create(&self, req: &CreateProductRequest) -> Result<Product> {
        let created = self.backend.create(req)?;
        self.load();
        Ok(created)
    }

    pub fn update(&self, id: u64, req: &UpdateProductRequest) -> Result<Product> {
        let updated = self.backend.update(id, req)?;
        self.load();
        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.backend.delete(id)?;
        self.load();
        Ok(())
    }
}

/// Authoritative in-memory list of users for the session. Read-mostly: the
/// only mutations in scope are status toggling and deletion.
pub struct UserStore {
    backend: Rc<dyn UserBackend>,
    channel: Channel<User>,
}

impl UserStore {
    pub fn new(backend: Rc<dyn UserBackend>) -> Rc<Self> {
        let store = Rc::new(Self {
            backend,
            channel: Channel::new(),
        });
        store.load();
        store
    }

    pub fn load(&self) {
        match self.backend.list() {
            Ok(items) => self.channel.publish(Snapshot::Ready(items)),
            Err(e) => self.channel.publish(Snapshot::Unavailable(e.to_string())),
        }
    }

    pub fn snapshot(&self) -> Snapshot<User> {
        self.channel.current()
    }

    pub fn subscribe(
        &self,
        callback: impl FnMut(&Snapshot<User>) + 'static,
    ) -> Subscription<User> {
        self.channel.subscribe(callback)
    }

    /// Fetch one user by id; does not touch the snapshot.
    pub fn get(&self, id: u64) -> Result<User> {
        self.backend.get(id)
    }

    pub fn toggle_status(&self, id: u64) -> Result<User> {
        let updated = self.backend.toggle_status(id)?;
        self.load();
        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.backend.delete(id)?;
        self.load();
        Ok(())
    }
}
