//! Cart state container.
//!
//! [`CartProvider`] is the single source of truth for the cart. It owns the
//! in-memory line items, applies every mutation, and writes the result
//! through to a [`KeyValueStore`].
//!
//! # Ordering
//!
//! All mutations take one async lock, apply to the current snapshot, and
//! persist while still holding it. Store writes therefore happen in the
//! same order as the in-memory updates, and a slow write can never replace
//! a newer persisted cart with an older one.
//!
//! # Failure policy
//!
//! The in-memory cart stays authoritative for the session. A failed write
//! is logged, the cart is marked dirty, and the write is retried on the
//! next mutation or [`CartProvider::flush`]. Unreadable persisted data is
//! treated as an empty cart.

use std::sync::Arc;

use go_marketplace_core::{Change, LineItems, LineItemsError, NewLineItem, ProductId};
use tokio::sync::{Mutex, OnceCell, watch};
use tracing::{debug, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::{CartError, Result, add_breadcrumb};
use crate::storage::KeyValueStore;

/// Immutable view of the cart at one point in time.
///
/// A new snapshot is published only when the cart actually changes, so
/// comparing snapshots with [`Arc::ptr_eq`] tells whether anything moved.
pub type Snapshot = Arc<LineItems>;

/// Result of loading the persisted cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// Persisted line items replaced the in-memory cart.
    Restored { line_items: usize },
    /// Nothing was persisted; the cart starts empty.
    Empty,
    /// The persisted value could not be decoded; the cart starts empty.
    Malformed,
    /// The store could not be read; the cart starts empty.
    Failed,
    /// The cart was mutated before loading finished; local state wins.
    Superseded,
}

/// Owner of the cart's line items.
///
/// Cheaply cloneable via `Arc`; all clones share the same cart.
#[derive(Clone)]
pub struct CartProvider {
    inner: Arc<CartInner>,
}

struct CartInner {
    store: Arc<dyn KeyValueStore>,
    key: String,
    state: Mutex<CartState>,
    snapshot: watch::Sender<Snapshot>,
    hydration: OnceCell<Hydration>,
}

struct CartState {
    items: Snapshot,
    revision: u64,
    dirty: bool,
}

impl std::fmt::Debug for CartProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartProvider")
            .field("key", &self.inner.key)
            .field("line_items", &self.products().len())
            .field("hydration", &self.inner.hydration.get())
            .finish_non_exhaustive()
    }
}

impl CartProvider {
    /// Create an empty, not yet hydrated cart persisted under `key`.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let items: Snapshot = Arc::new(LineItems::new());
        let (snapshot, _) = watch::channel(Arc::clone(&items));

        Self {
            inner: Arc::new(CartInner {
                store,
                key: key.into(),
                state: Mutex::new(CartState {
                    items,
                    revision: 0,
                    dirty: false,
                }),
                snapshot,
                hydration: OnceCell::new(),
            }),
        }
    }

    /// Create a cart using the storage key from `config`.
    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        Self::new(store, config.storage_key())
    }

    /// Create a cart and load the persisted line items.
    pub async fn mount(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let provider = Self::new(store, key);
        provider.initialize().await;
        provider
    }

    /// Load the persisted cart.
    ///
    /// Only the first call reads the store; later calls return the first
    /// outcome.
    pub async fn initialize(&self) -> Hydration {
        *self.inner.hydration.get_or_init(|| self.hydrate()).await
    }

    /// Outcome of [`initialize`](Self::initialize), if it has completed.
    #[must_use]
    pub fn hydration(&self) -> Option<Hydration> {
        self.inner.hydration.get().copied()
    }

    /// The storage key holding the serialized cart.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    /// Current line items.
    #[must_use]
    pub fn products(&self) -> Snapshot {
        Arc::clone(&self.inner.snapshot.borrow())
    }

    /// Receive every new snapshot as the cart changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Add one unit of a product, appending it if it is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidLineItem`] if a new product's price is
    /// out of range. Nothing is changed or written in that case.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add_to_cart(&self, item: NewLineItem) -> Result<Change> {
        let id = item.id.clone();
        self.try_apply(&id, |items| items.add(item)).await
    }

    /// Add one unit of a product already in the cart.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn increment(&self, id: &ProductId) -> Change {
        self.apply(id, |items| items.increment(id)).await
    }

    /// Remove one unit of a product, dropping the line item at zero.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn decrement(&self, id: &ProductId) -> Change {
        self.apply(id, |items| items.decrement(id)).await
    }

    /// Empty the cart and delete the persisted value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not delete the key. The
    /// in-memory cart is empty either way and the deletion is retried as a
    /// write on the next [`flush`](Self::flush) or mutation.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;

        if !state.items.is_empty() {
            state.items = Arc::new(LineItems::new());
            state.revision += 1;
            self.inner.snapshot.send_replace(Arc::clone(&state.items));
            add_breadcrumb("cart", "Cleared cart", None);
        }

        match self.inner.store.remove(&self.inner.key).await {
            Ok(()) => {
                state.dirty = false;
                info!("Cart cleared");
                Ok(())
            }
            Err(e) => {
                state.dirty = true;
                warn!(error = %e, "Failed to delete persisted cart");
                Err(e.into())
            }
        }
    }

    /// Retry a pending write left behind by a storage failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails again.
    pub async fn flush(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        if state.dirty {
            self.write_back(&mut state).await?;
        }
        Ok(())
    }

    /// Whether the latest cart has not reached the store yet.
    pub async fn has_pending_write(&self) -> bool {
        self.inner.state.lock().await.dirty
    }

    #[instrument(skip(self), fields(key = %self.inner.key))]
    async fn hydrate(&self) -> Hydration {
        let mut state = self.inner.state.lock().await;

        let loaded = match self.load().await {
            Ok(loaded) => loaded,
            Err(e @ CartError::Codec(_)) => {
                warn!(error = %e, "Persisted cart is malformed, starting empty");
                return Hydration::Malformed;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                return Hydration::Failed;
            }
        };

        let Some(items) = loaded else {
            info!("No persisted cart, starting empty");
            return Hydration::Empty;
        };

        if state.revision > 0 {
            warn!(
                revision = state.revision,
                "Cart changed before loading finished, keeping local state"
            );
            return Hydration::Superseded;
        }

        let line_items = items.len();
        state.items = Arc::new(items);
        self.inner.snapshot.send_replace(Arc::clone(&state.items));
        info!(line_items, "Restored persisted cart");
        Hydration::Restored { line_items }
    }

    async fn load(&self) -> Result<Option<LineItems>> {
        let Some(json) = self.inner.store.get(&self.inner.key).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn apply<F>(&self, id: &ProductId, op: F) -> Change
    where
        F: FnOnce(&mut LineItems) -> Change,
    {
        let mut state = self.inner.state.lock().await;

        let mut next = LineItems::clone(&state.items);
        let change = op(&mut next);
        self.commit(&mut state, id, next, change).await;
        change
    }

    async fn try_apply<F>(&self, id: &ProductId, op: F) -> Result<Change>
    where
        F: FnOnce(&mut LineItems) -> std::result::Result<Change, LineItemsError>,
    {
        let mut state = self.inner.state.lock().await;

        let mut next = LineItems::clone(&state.items);
        let change = op(&mut next)
            .inspect_err(|e| warn!(error = %e, "Rejected line item"))?;
        self.commit(&mut state, id, next, change).await;
        Ok(change)
    }

    async fn commit(
        &self,
        state: &mut CartState,
        id: &ProductId,
        next: LineItems,
        change: Change,
    ) {
        if !change.is_mutation() {
            debug!("Cart unchanged, skipping write");
            return;
        }

        state.items = Arc::new(next);
        state.revision += 1;
        state.dirty = true;
        self.inner.snapshot.send_replace(Arc::clone(&state.items));
        add_breadcrumb("cart", describe(change), Some(&[("product_id", id.as_str())]));
        debug!(?change, revision = state.revision, "Applied cart change");

        // Failures are logged inside write_back and retried later.
        let _ = self.write_back(state).await;
    }

    async fn write_back(&self, state: &mut CartState) -> Result<()> {
        let result = self.persist(&state.items).await;
        match &result {
            Ok(()) => state.dirty = false,
            Err(e) => warn!(
                error = %e,
                revision = state.revision,
                "Failed to persist cart, will retry on next change"
            ),
        }
        result
    }

    async fn persist(&self, items: &LineItems) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.inner.store.set(&self.inner.key, &json).await?;
        Ok(())
    }
}

const fn describe(change: Change) -> &'static str {
    match change {
        Change::Added => "Added line item",
        Change::Incremented { .. } => "Incremented line item",
        Change::Decremented { .. } => "Decremented line item",
        Change::Removed => "Removed line item",
        Change::Unchanged => "Cart unchanged",
    }
}
