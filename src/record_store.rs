use crate::{
    entity::{self, Entity, Object},
    envelope::MutationResponse,
    error::{Error, Result},
    Store,
};
use log::{debug, info, warn};
use parking_lot::Mutex;

/// In-memory list of one entity type, mirrored to its backing collection
/// after every write.
///
/// Mutations are serialized by an internal lock and only become visible
/// once the collection was persisted, so a failed write leaves the list
/// untouched.
pub struct RecordStore<T> {
    store: Store,
    inner: Mutex<Records<T>>,
}

struct Records<T> {
    items: Vec<T>,
    last_id: u64,
}

impl<T: Entity> RecordStore<T> {
    /// Loads the `T::COLLECTION` records from `store`.
    pub fn open(store: Store) -> Result<RecordStore<T>> {
        let items: Vec<T> = store.load(T::COLLECTION)?;
        let last_id = seed_counter(&items);
        info!("Loaded {} {} from {}", items.len(), T::COLLECTION, store);
        Ok(RecordStore {
            store,
            inner: Mutex::new(Records { items, last_id }),
        })
    }

    /// All records in insertion order.
    pub fn list(&self) -> Vec<T> {
        self.inner.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First record with a matching id. Absence is not an error.
    pub fn get_by_id(&self, id: &str) -> Option<T> {
        self.find(|r| r.id() == id)
    }

    pub(crate) fn find<P>(&self, mut predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.inner.lock().items.iter().find(|r| predicate(r)).cloned()
    }

    /// Appends a record built from `input` under the next id.
    pub fn create(&self, input: Object) -> Result<MutationResponse<T>> {
        let mut records = self.inner.lock();
        let next_id = records
            .last_id
            .checked_add(1)
            .ok_or(Error::IdsExhausted { entity: T::NAME })?;
        let record: T = entity::assemble(next_id.to_string(), input)?;
        records.items.push(record.clone());
        if let Err(err) = self.store.persist(T::COLLECTION, &records.items) {
            records.items.pop();
            return Err(err);
        }
        records.last_id = next_id;
        debug!("Created {} {}", T::NAME, record.id());
        Ok(MutationResponse::created(record))
    }

    /// Shallow-merges `patch` over the record with `id`.
    pub fn update(&self, id: &str, patch: &Object) -> Result<MutationResponse<T>> {
        debug!("Updating {} {id} with {patch:?}", T::NAME);
        let mut records = self.inner.lock();
        let Some(idx) = records.items.iter().position(|r| r.id() == id) else {
            warn!("{} {id} not found", T::NAME);
            return Ok(MutationResponse::not_found());
        };
        let updated: T = entity::merge(&records.items[idx], patch)?;
        let previous = std::mem::replace(&mut records.items[idx], updated.clone());
        if let Err(err) = self.store.persist(T::COLLECTION, &records.items) {
            records.items[idx] = previous;
            return Err(err);
        }
        Ok(MutationResponse::updated(updated))
    }
}

// Highest id handed out so far. With append-only usage ids are 1..=len.
fn seed_counter<T: Entity>(items: &[T]) -> u64 {
    let len = items.len() as u64;
    items
        .iter()
        .filter_map(|r| r.id().parse::<u64>().ok())
        .fold(len, u64::max)
}
