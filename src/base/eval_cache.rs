use super::{Attribute, Error};
use russell_lab::Vector;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identifies an entity (e.g., a roll pass) owning cached attributes
pub type EntityId = usize;

/// Holds the counter used to generate entity ids
static NEXT_ENTITY_ID: AtomicUsize = AtomicUsize::new(0);

/// Returns a new unique entity id
pub fn new_entity_id() -> EntityId {
    NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identifies a cached attribute
pub type EvalKey = (EntityId, Attribute);

/// Holds the outcome of a guarded evaluation
#[derive(Clone, Debug)]
pub enum Evaluated<T> {
    /// The evaluation has been carried out (or found in the cache)
    Value(T),

    /// The key is already being evaluated; the caller must fall back to its default
    Circular,
}

impl<T> Evaluated<T> {
    /// Returns the value or the given default if the evaluation was circular
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Evaluated::Value(value) => value,
            Evaluated::Circular => default,
        }
    }

    /// Returns true if the evaluation was circular
    pub fn is_circular(&self) -> bool {
        matches!(self, Evaluated::Circular)
    }
}

/// Marks a key as being evaluated; the mark is removed on drop
pub struct CycleGuard<'a> {
    active: &'a RefCell<HashSet<EvalKey>>,
    key: EvalKey,
}

impl<'a> CycleGuard<'a> {
    /// Enters the evaluation of a key
    ///
    /// Returns None if the key is already being evaluated (reentrant request).
    pub fn enter(active: &'a RefCell<HashSet<EvalKey>>, key: EvalKey) -> Option<Self> {
        if !active.borrow_mut().insert(key) {
            return None;
        }
        Some(CycleGuard { active, key })
    }
}

impl<'a> Drop for CycleGuard<'a> {
    fn drop(&mut self) {
        self.active.borrow_mut().remove(&self.key);
    }
}

/// Implements a memoized evaluation of vector-valued attributes with a cycle detector
///
/// Values are keyed by (entity id, attribute) and stay in the cache until invalidated.
/// A request for a key whose evaluation is still in progress returns [Evaluated::Circular]
/// instead of recursing.
pub struct EvalCache {
    values: RefCell<HashMap<EvalKey, Vector>>,
    active: RefCell<HashSet<EvalKey>>,
}

impl EvalCache {
    /// Allocates a new instance
    pub fn new() -> Self {
        EvalCache {
            values: RefCell::new(HashMap::new()),
            active: RefCell::new(HashSet::new()),
        }
    }

    /// Returns the cached value or evaluates it
    pub fn evaluate<F>(&self, key: EvalKey, f: F) -> Result<Evaluated<Vector>, Error>
    where
        F: FnOnce() -> Result<Vector, Error>,
    {
        if let Some(value) = self.values.borrow().get(&key) {
            return Ok(Evaluated::Value(value.clone()));
        }
        let guard = match CycleGuard::enter(&self.active, key) {
            Some(g) => g,
            None => return Ok(Evaluated::Circular),
        };
        let value = f()?;
        drop(guard);
        self.values.borrow_mut().insert(key, value.clone());
        Ok(Evaluated::Value(value))
    }

    /// Enters the evaluation of a key without caching a value
    ///
    /// Returns None if the key is already being evaluated.
    pub fn guard(&self, key: EvalKey) -> Option<CycleGuard<'_>> {
        CycleGuard::enter(&self.active, key)
    }

    /// Returns true if the key is being evaluated
    pub fn in_progress(&self, key: EvalKey) -> bool {
        self.active.borrow().contains(&key)
    }

    /// Returns true if the key holds a cached value
    pub fn contains(&self, key: EvalKey) -> bool {
        self.values.borrow().contains_key(&key)
    }

    /// Removes the cached value of a single key
    pub fn invalidate(&self, key: EvalKey) {
        self.values.borrow_mut().remove(&key);
    }

    /// Removes all cached values of an entity
    pub fn invalidate_entity(&self, entity: EntityId) {
        self.values.borrow_mut().retain(|(id, _), _| *id != entity);
    }

    /// Removes all cached values
    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }
}

impl Default for EvalCache {
    fn default() -> Self {
        EvalCache::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
