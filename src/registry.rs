// src/registry.rs
//! Name Registry
//! Binds human-readable names to network addresses and hands out stable ids.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Identifier assigned to a record at registration time.
/// Ids are handed out in increasing order and never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A name bound to an address. Callers always receive copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub address: String,
}

#[derive(Debug)]
struct Inner {
    by_name: HashMap<String, Record>,
    /// Reverse index used by `deregister` and `get`.
    by_id: HashMap<RecordId, String>,
    next_id: u64,
}

pub struct NameRegistry {
    inner: RwLock<Inner>,
}

impl NameRegistry {
    /// Create a new, empty name registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                by_name: HashMap::new(),
                by_id: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Register `address` under `name`.
    /// If the name already exists its address is overwritten and its id kept.
    pub fn register(&self, name: &str, address: &str) -> Result<Record> {
        require("name", name)?;
        require("address", address)?;

        let mut inner = self.inner.write();

        if let Some(existing) = inner.by_name.get_mut(name) {
            existing.address = address.to_owned();
            tracing::debug!(id = %existing.id, name, address, "record address updated");
            return Ok(existing.clone());
        }

        let id = RecordId(inner.next_id);
        inner.next_id += 1;

        let record = Record {
            id,
            name: name.to_owned(),
            address: address.to_owned(),
        };
        let previous = inner.by_id.insert(id, record.name.clone());
        debug_assert!(previous.is_none(), "record id {id} handed out twice");
        inner.by_name.insert(record.name.clone(), record.clone());

        tracing::debug!(%id, name, address, "record created");
        Ok(record)
    }

    /// Retrieve the record currently bound to `name`.
    pub fn lookup(&self, name: &str) -> Result<Record> {
        require("name", name)?;
        self.inner
            .read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("name '{name}'")))
    }

    /// Retrieve a record by id.
    pub fn get(&self, id: RecordId) -> Result<Record> {
        let inner = self.inner.read();
        inner
            .by_id
            .get(&id)
            .and_then(|name| inner.by_name.get(name))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("id {id}")))
    }

    /// Remove the record holding `id`, returning it.
    /// The id is retired; it will not be handed out again.
    pub fn deregister(&self, id: RecordId) -> Result<Record> {
        let mut inner = self.inner.write();
        let name = inner
            .by_id
            .remove(&id)
            .ok_or_else(|| RegistryError::NotFound(format!("id {id}")))?;
        // The two maps are only ever mutated together under the write lock.
        let Some(record) = inner.by_name.remove(&name) else {
            debug_assert!(false, "id {id} indexed without a record");
            return Err(RegistryError::NotFound(format!("id {id}")));
        };
        drop(inner);

        tracing::debug!(%id, name = %record.name, "record removed");
        Ok(record)
    }

    /// Snapshot of every live record, ordered by id.
    pub fn records(&self) -> Vec<Record> {
        let mut out: Vec<Record> = self
            .inner
            .read()
            .by_name
            .values()
            .cloned()
            .collect();
        out.sort_by_key(|r| r.id);
        out
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("NameRegistry")
            .field("records", &inner.by_name.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}
