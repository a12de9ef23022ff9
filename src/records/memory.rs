//! # In-Memory Record Store

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde_json::Value;

use super::errors::{RecordStoreError, RecordStoreResult};
use super::store::RecordStore;
use super::types::{Record, RecordId};
use crate::schema::RelationFieldDescriptor;

type Key = (String, RecordId);

/// In-memory record store for testing and embedding.
///
/// Ids are assigned from a single ascending sequence.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<Key, Record>>,
    next_id: AtomicU64,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

fn poisoned() -> RecordStoreError {
    RecordStoreError::Backend("Lock poisoned".to_string())
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records of a type, in id order
    pub fn all(&self, record_type: &str) -> RecordStoreResult<Vec<Record>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .iter()
            .filter(|((t, _), _)| t == record_type)
            .map(|(_, r)| r.clone())
            .collect())
    }

    pub fn count(&self, record_type: &str) -> usize {
        self.all(record_type).map(|r| r.len()).unwrap_or(0)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn load(&self, record_type: &str, id: &RecordId) -> RecordStoreResult<Option<Record>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(&(record_type.to_string(), id.clone())).cloned())
    }

    fn commit(&self, mut record: Record) -> RecordStoreResult<Record> {
        if record.record_type.is_empty() {
            return Err(RecordStoreError::Conflict("record_type must not be empty".into()));
        }
        let id = match &record.id {
            Some(id) => id.clone(),
            None => {
                let id = RecordId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
                record.id = Some(id.clone());
                id
            }
        };

        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert((record.record_type.clone(), id), record.clone());
        Ok(record)
    }

    fn remove(&self, record_type: &str, id: &RecordId) -> RecordStoreResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records
            .remove(&(record_type.to_string(), id.clone()))
            .map(|_| ())
            .ok_or_else(|| RecordStoreError::not_found(record_type, id))
    }

    fn related(&self, parent: &Record, relation: &RelationFieldDescriptor) -> RecordStoreResult<Vec<Record>> {
        let Some(parent_id) = &parent.id else {
            return Ok(Vec::new());
        };

        match &relation.foreign_key {
            Some(fk) => {
                let records = self.records.read().map_err(|_| poisoned())?;
                Ok(records
                    .iter()
                    .filter(|((t, _), r)| {
                        t == &relation.target && r.get(fk).map_or(false, |v| parent_id.matches(v))
                    })
                    .map(|(_, r)| r.clone())
                    .collect())
            }
            None => {
                let ids: Vec<RecordId> = match parent.get(&relation.name) {
                    Some(Value::Array(items)) => items.iter().filter_map(RecordId::from_value).collect(),
                    _ => Vec::new(),
                };
                let mut members = Vec::with_capacity(ids.len());
                for id in ids {
                    if let Some(member) = self.load(&relation.target, &id)? {
                        members.push(member);
                    }
                }
                Ok(members)
            }
        }
    }
}
