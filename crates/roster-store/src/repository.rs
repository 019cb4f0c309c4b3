//! Typed CRUD over one collection.
//!
//! Every write takes the collection lock, loads the current document,
//! applies the change, and saves it back before releasing the lock.
//! [`Repository::edit`] exposes the same cycle for multi-step changes
//! through a [`Batch`].

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::info;

use crate::entity::Entity;
use crate::error::{StoreError, ValidationError};
use crate::fields::Fields;
use crate::filter::Filters;
use crate::record_store::RecordStore;

/// Fields the repository maintains itself.
const READ_ONLY_FIELDS: [&str; 2] = ["id", "created_at"];

/// CRUD access to the collection of `E` records.
#[derive(Debug)]
pub struct Repository<E> {
    store: Arc<RecordStore>,
    _kind: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _kind: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    /// Create a repository over `store`.
    pub const fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    /// Every record, in stored order.
    pub fn all(&self) -> Result<Vec<E>, StoreError> {
        self.store.load(E::COLLECTION)
    }

    /// Records whose fields match every filter, in stored order.
    ///
    /// Filter values are first mapped to their stored form with
    /// [`Entity::canonical_value`].
    pub fn list(&self, filters: &Filters) -> Result<Vec<E>, StoreError> {
        let records = self.all()?;
        if filters.is_empty() {
            return Ok(records);
        }

        let filters = filters.map_values(E::canonical_value);
        let mut matching = Vec::new();
        for record in records {
            if filters.matches(&to_value(&self.store, &record)?) {
                matching.push(record);
            }
        }
        Ok(matching)
    }

    /// The record with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such record exists.
    pub fn get(&self, id: u64) -> Result<E, StoreError> {
        self.all()?
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| not_found::<E>(id))
    }

    /// Run `f` over the collection while holding its write lock.
    ///
    /// The collection is saved once after `f` returns, and only if `f`
    /// changed it. When `f` fails nothing is saved.
    pub fn edit<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Batch<'_, E>) -> Result<T, StoreError>,
    {
        let _guard = self.store.lock(E::COLLECTION)?;
        let mut batch = Batch {
            store: &self.store,
            records: self.all()?,
            dirty: false,
        };

        let out = f(&mut batch)?;
        if batch.dirty {
            self.store.save(E::COLLECTION, &batch.records)?;
        }
        Ok(out)
    }

    /// Validate `fields`, assign the next identifier, and append the
    /// record.
    pub fn create(&self, fields: &Map<String, Value>) -> Result<E, StoreError> {
        self.create_checked(fields, |_, _| Ok(()))
    }

    /// Like [`Repository::create`], running `check` on the new record
    /// before it is saved.
    pub fn create_checked<F>(&self, fields: &Map<String, Value>, check: F) -> Result<E, StoreError>
    where
        F: FnOnce(Option<&E>, &E) -> Result<(), StoreError>,
    {
        self.edit(|batch| batch.insert(fields, check))
    }

    /// Merge `fields` into the record `id` and save it.
    ///
    /// Fields not named in `fields` keep their stored value. A `null`
    /// clears an optional field. `id` and `created_at` may be echoed back
    /// unchanged but not modified.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record does not exist, or
    /// [`StoreError::Validation`] if the merged record is invalid.
    pub fn update(&self, id: u64, fields: &Map<String, Value>) -> Result<E, StoreError> {
        self.update_checked(id, fields, |_, _| Ok(()))
    }

    /// Like [`Repository::update`], running `check` on the stored and the
    /// merged record before it is saved.
    pub fn update_checked<F>(&self, id: u64, fields: &Map<String, Value>, check: F) -> Result<E, StoreError>
    where
        F: FnOnce(Option<&E>, &E) -> Result<(), StoreError>,
    {
        self.edit(|batch| batch.merge(id, fields, check))
    }

    /// Update the first record matching `matches`, or create one when
    /// none does. Lookup and write happen under one lock.
    ///
    /// Returns the record and whether it was created.
    pub fn upsert_by<P, F>(
        &self,
        matches: P,
        fields: &Map<String, Value>,
        check: F,
    ) -> Result<(E, bool), StoreError>
    where
        P: Fn(&E) -> bool,
        F: FnOnce(Option<&E>, &E) -> Result<(), StoreError>,
    {
        self.edit(|batch| {
            let existing = batch.records().iter().find(|&record| matches(record)).map(Entity::id);
            match existing {
                Some(id) => Ok((batch.merge(id, fields, check)?, false)),
                None => Ok((batch.insert(fields, check)?, true)),
            }
        })
    }

    /// Remove the record `id` and return it.
    ///
    /// Records in other collections that reference it are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record does not exist.
    pub fn delete(&self, id: u64) -> Result<E, StoreError> {
        self.edit(|batch| batch.remove(id))
    }
}

/// A collection loaded under its write lock by [`Repository::edit`].
///
/// Changes stay in memory until the edit returns.
#[derive(Debug)]
pub struct Batch<'a, E> {
    store: &'a RecordStore,
    records: Vec<E>,
    dirty: bool,
}

impl<E: Entity> Batch<'_, E> {
    /// The records as currently edited, in stored order.
    pub fn records(&self) -> &[E] {
        &self.records
    }

    /// Validate `fields`, assign the next identifier, and append the
    /// record. `check` sees `None` and the new record.
    pub fn insert<F>(&mut self, fields: &Map<String, Value>, check: F) -> Result<E, StoreError>
    where
        F: FnOnce(Option<&E>, &E) -> Result<(), StoreError>,
    {
        let id = self.next_id()?;
        let record = E::from_fields(id, Utc::now(), &Fields::new(fields))?;
        ensure_unique(&self.records, &record, None)?;
        check(None, &record)?;

        self.records.push(record.clone());
        self.dirty = true;

        info!(collection = %E::COLLECTION, id, "Record created");
        Ok(record)
    }

    /// Merge `fields` into the record `id`. `check` sees the stored and
    /// the merged record.
    pub fn merge<F>(&mut self, id: u64, fields: &Map<String, Value>, check: F) -> Result<E, StoreError>
    where
        F: FnOnce(Option<&E>, &E) -> Result<(), StoreError>,
    {
        let position = self.position(id)?;
        let current = self.records.get(position).ok_or_else(|| not_found::<E>(id))?;

        let mut merged = match to_value(self.store, current)? {
            Value::Object(map) => map,
            _ => {
                return Err(StoreError::storage(
                    &self.store.path(E::COLLECTION),
                    format!("record {id} is not a JSON object"),
                ));
            }
        };
        for (field, value) in fields {
            if READ_ONLY_FIELDS.contains(&field.as_str()) {
                if merged.get(field) != Some(value) {
                    return Err(ValidationError::read_only(field.as_str()).into());
                }
                continue;
            }
            merged.insert(field.clone(), value.clone());
        }

        let mut updated = E::from_fields(id, current.created_at(), &Fields::new(&merged))?;
        updated.touch(Utc::now());
        ensure_unique(&self.records, &updated, Some(id))?;
        check(Some(current), &updated)?;

        if let Some(slot) = self.records.get_mut(position) {
            *slot = updated.clone();
        }
        self.dirty = true;

        info!(collection = %E::COLLECTION, id, fields = fields.len(), "Record updated");
        Ok(updated)
    }

    /// Remove the record `id` and return it.
    pub fn remove(&mut self, id: u64) -> Result<E, StoreError> {
        let position = self.position(id)?;
        let removed = self.records.remove(position);
        self.dirty = true;

        info!(collection = %E::COLLECTION, id, "Record deleted");
        Ok(removed)
    }

    fn position(&self, id: u64) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| not_found::<E>(id))
    }

    fn next_id(&self) -> Result<u64, StoreError> {
        self.records
            .iter()
            .map(Entity::id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| {
                StoreError::storage(&self.store.path(E::COLLECTION), "identifier space exhausted")
            })
    }
}

fn to_value<E: Entity>(store: &RecordStore, record: &E) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|e| {
        StoreError::storage(&store.path(E::COLLECTION), format!("serialize record: {e}"))
    })
}

fn not_found<E: Entity>(id: u64) -> StoreError {
    StoreError::NotFound {
        collection: E::COLLECTION,
        id,
    }
}

fn ensure_unique<E: Entity>(records: &[E], candidate: &E, skip: Option<u64>) -> Result<(), ValidationError> {
    for (field, value) in candidate.unique_keys() {
        let taken = records
            .iter()
            .filter(|record| Some(record.id()) != skip)
            .any(|record| {
                record
                    .unique_keys()
                    .iter()
                    .any(|(f, v)| *f == field && *v == value)
            });
        if taken {
            return Err(ValidationError::duplicate(field, &value));
        }
    }
    Ok(())
}
