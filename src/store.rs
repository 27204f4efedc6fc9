use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::value::Value;

/// The global key → value mapping. A key's container kind is fixed when the
/// entry is created and never changes in place; empty containers are not
/// collected.
#[derive(Default)]
pub struct Keyspace {
    entries: HashMap<String, Value>,
}

impl Keyspace {
    pub fn new() -> Self {
        Keyspace::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn insert(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
        metrics::gauge!("linekv_keys_total").set(self.entries.len() as f64);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.remove(key);
        metrics::gauge!("linekv_keys_total").set(self.entries.len() as f64);
        removed
    }
}

/// All commands run under the write lock, which serializes every engine
/// operation exactly as a single-reactor design would.
pub type SharedKeyspace = Arc<RwLock<Keyspace>>;

pub fn shared() -> SharedKeyspace {
    Arc::new(RwLock::new(Keyspace::new()))
}
