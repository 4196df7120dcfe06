//! Ledger of live declared objects.
//!
//! Every declared field of a generator (param, input, option) announces
//! itself here when it is created and withdraws when it is dropped. A
//! generator later asks "which announced objects live inside my own address
//! range?" to recover its declarations without the fields holding a
//! back-reference to it.
//!
//! Addresses are plain integers handed out by [`InstanceRegistry::reserve`],
//! so the ledger never touches memory. Ranges reserved from one registry
//! never overlap; callers registering synthetic addresses are responsible
//! for keeping unrelated owners apart.

use std::sync::Arc;

use gengen_core::{Error, Result};
use indexmap::IndexMap;
use parking_lot::Mutex;

/// What kind of object a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A legacy-style scalar or buffer param.
    Param,
    /// A typed input.
    Input,
    /// A string-encoded generator option.
    Option,
    /// A generator instance owning a range of addresses.
    Owner,
}

/// Handle returned by [`InstanceRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

/// The fact that an object of some category currently exists.
#[derive(Debug, Clone)]
pub struct InstanceRecord<T> {
    pub instance: u64,
    pub owner: u64,
    /// Size of the owner's address range. Fields register with zero.
    pub owner_extent: u64,
    pub category: Category,
    /// Data the owner uses to inspect the object once found.
    pub token: T,
}

impl<T> InstanceRecord<T> {
    /// Whether this record describes an owner rather than a field of one.
    pub fn is_owner(&self) -> bool {
        self.category == Category::Owner
    }
}

#[derive(Debug)]
struct Ledger<T> {
    next_id: u64,
    next_base: u64,
    records: IndexMap<RecordId, InstanceRecord<T>>,
}

/// Registry of live instances, keyed by address.
///
/// All operations serialize on one lock. Queries copy out what they need
/// so nothing borrowed from the table outlives the call.
#[derive(Debug)]
pub struct InstanceRegistry<T> {
    inner: Mutex<Ledger<T>>,
}

impl<T> InstanceRegistry<T> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Ledger {
                next_id: 0,
                // address 0 is never handed out
                next_base: 1,
                records: IndexMap::new(),
            }),
        }
    }

    /// Create a new empty registry behind an `Arc`, ready to be shared.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Reserve a fresh address range of `extent` addresses and return its base.
    pub fn reserve(&self, extent: u64) -> u64 {
        let mut ledger = self.inner.lock();
        let base = ledger.next_base;
        ledger.next_base = base.saturating_add(extent.max(1));
        base
    }

    /// Record that an object of `category` now exists at `instance`.
    pub fn register(
        &self,
        instance: u64,
        owner_extent: u64,
        category: Category,
        owner: u64,
        token: T,
    ) -> RecordId {
        let mut ledger = self.inner.lock();
        let id = RecordId(ledger.next_id);
        ledger.next_id += 1;
        ledger.records.insert(
            id,
            InstanceRecord {
                instance,
                owner,
                owner_extent,
                category,
                token,
            },
        );
        tracing::trace!(instance, owner, ?category, "registered instance");
        id
    }

    /// Remove a record.
    ///
    /// Unknown ids are an internal error: records are only removed by the
    /// object that created them, exactly once.
    pub fn unregister(&self, id: RecordId) -> Result<InstanceRecord<T>> {
        let mut ledger = self.inner.lock();
        ledger
            .records
            .shift_remove(&id)
            .ok_or_else(|| Error::internal(format!("unregister of unknown record {:?}", id)))
    }

    /// Addresses of every live record of `category` within
    /// `[owner, owner + extent)`, in registration order.
    pub fn query(&self, owner: u64, extent: u64, category: Category) -> Vec<u64> {
        let ledger = self.inner.lock();
        ledger
            .records
            .values()
            .filter(|r| r.category == category && in_range(r.instance, owner, extent))
            .map(|r| r.instance)
            .collect()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }
}

impl<T: Clone> InstanceRegistry<T> {
    /// Like [`query`](Self::query), but returns full records with their tokens.
    pub fn query_records(
        &self,
        owner: u64,
        extent: u64,
        category: Category,
    ) -> Vec<InstanceRecord<T>> {
        let ledger = self.inner.lock();
        ledger
            .records
            .values()
            .filter(|r| r.category == category && in_range(r.instance, owner, extent))
            .cloned()
            .collect()
    }
}

impl<T> Default for InstanceRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn in_range(address: u64, base: u64, extent: u64) -> bool {
    address >= base && address - base < extent
}

/// Keeps a record alive for exactly as long as the value holding it.
///
/// Dropping the guard removes the record.
#[derive(Debug)]
pub struct Registration<T> {
    registry: Arc<InstanceRegistry<T>>,
    id: RecordId,
}

impl<T> Registration<T> {
    /// Register an object and return a guard that unregisters it on drop.
    pub fn new(
        registry: &Arc<InstanceRegistry<T>>,
        instance: u64,
        owner_extent: u64,
        category: Category,
        owner: u64,
        token: T,
    ) -> Self {
        let id = registry.register(instance, owner_extent, category, owner, token);
        Self {
            registry: Arc::clone(registry),
            id,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }
}

impl<T> Drop for Registration<T> {
    fn drop(&mut self) {
        if let Err(err) = self.registry.unregister(self.id) {
            if !std::thread::panicking() {
                panic!("{}", err);
            }
        }
    }
}
