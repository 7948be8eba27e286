// Copyright (c) 2016 - 2017 Markus Kohlhase <mail@markus-kohlhase.de>

//! JSON file backed data sources for a small federated GraphQL demo.
//!
//! A gateway ("monolith") and two subgraphs ("partners" and "products")
//! expose CRUD style queries and mutations over partners and products.
//! Each entity type lives in memory and is mirrored to a pretty printed
//! JSON file (`{ "partners": [..] }`) after every write.
//!
//! **WARNING**:
//! Every mutation rewrites the whole file.
//! Don't use it if you want to persist a large amount of records.
//!
//! # Example
//!
//! ```rust,no_run
//! use fedstore::{Context, Service};
//! use serde_json::json;
//!
//! let ctx = Context::open(Service::Monolith, "data").unwrap();
//! let created = ctx
//!     .resolve("createPartner", &json!({ "partner": { "name": "Acme" } }))
//!     .unwrap();
//! let id = created["partner"]["id"].as_str().unwrap();
//! let partner = ctx.resolve("partner", &json!({ "id": id })).unwrap();
//! let favorite = ctx.resolve_field("Partner", "favoriteProduct", &partner).unwrap();
//! ```
//!
//! The data sources can be used without the resolver layer, and can be
//! kept purely in memory:
//!
//! ```rust
//! use fedstore::{MemoryStore, ProductsDataSource, Store};
//!
//! let mem = MemoryStore::default().with_document(
//!     "products",
//!     r#"{"products":[{"id":"1","name":"Espresso","stock":0}]}"#,
//! );
//! let products = ProductsDataSource::open(Store::from(mem)).unwrap();
//! assert_eq!(products.get_product_availability("1"), Some(false));
//! ```

use log::error;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt,
    path::Path,
    sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard},
};

mod datasource;
mod entity;
mod envelope;
mod error;
mod file_store;
mod json_store;
mod memory_store;
mod record_store;
mod resolver;
mod service;

pub use crate::{
    datasource::{favorite_product_name, PartnersDataSource, ProductsDataSource, ESPRESSO_PARTNERS},
    entity::{Entity, Object, Partner, Product},
    envelope::MutationResponse,
    error::{Error, Result},
    file_store::{Config, FileStore},
    memory_store::MemoryStore,
    record_store::RecordStore,
    resolver::Operation,
    service::{Context, Service},
};

use crate::json_store::JsonStore;

/// Persistence backend shared by the record stores of one service.
#[derive(Clone, Debug)]
pub struct Store(StoreType);

#[derive(Clone, Debug)]
enum StoreType {
    File(FileStore),
    Memory(MemoryStore),
}

impl Store {
    /// Opens a file backed `Store` in the directory `path`.
    ///
    /// See `new_with_cfg(..)` for more details
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Store> {
        Store::new_with_cfg(path, Config::default())
    }

    /// Opens a file backed `Store` with the given configuration.
    ///
    /// The directory is created if it does not exist yet. Every collection
    /// is kept in `<path>/<collection>.json`.
    pub fn new_with_cfg<P: AsRef<Path>>(path: P, cfg: Config) -> Result<Store> {
        Ok(Store(StoreType::File(FileStore::new_with_cfg(path, cfg)?)))
    }

    /// Returns the data directory, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        match &self.0 {
            StoreType::File(f) => Some(f.path()),
            StoreType::Memory(_) => None,
        }
    }

    pub(crate) fn load<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        match &self.0 {
            StoreType::File(f) => f.load(collection),
            StoreType::Memory(m) => m.load(collection),
        }
    }

    pub(crate) fn persist<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<()> {
        match &self.0 {
            StoreType::File(f) => f.persist(collection, records),
            StoreType::Memory(m) => m.persist(collection, records),
        }
    }
}

impl From<MemoryStore> for Store {
    fn from(m: MemoryStore) -> Store {
        Store(StoreType::Memory(m))
    }
}

impl From<FileStore> for Store {
    fn from(f: FileStore) -> Store {
        Store(StoreType::File(f))
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            StoreType::File(s) => write!(f, "{}", s.path().display()),
            StoreType::Memory(_) => f.write_str("memory"),
        }
    }
}

fn handle_read_err<T>(err: PoisonError<RwLockReadGuard<T>>) -> RwLockReadGuard<T> {
    error!("RwLock poisoned");
    err.into_inner()
}

fn handle_write_err<T>(err: PoisonError<RwLockWriteGuard<T>>) -> RwLockWriteGuard<T> {
    error!("RwLock poisoned");
    err.into_inner()
}
