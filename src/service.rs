use crate::{
    datasource::{PartnersDataSource, ProductsDataSource},
    error::Result,
    Store,
};
use log::info;
use std::{net::SocketAddr, path::Path, sync::Arc};

/// The deployable services of the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Gateway owning both partners and products.
    Monolith,
    /// Subgraph owning partners.
    Partners,
    /// Subgraph owning products and the partner → product link.
    Products,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Monolith, Service::Partners, Service::Products];

    pub const fn name(self) -> &'static str {
        match self {
            Service::Monolith => "monolith",
            Service::Partners => "partners",
            Service::Products => "products",
        }
    }

    /// Fixed listening port. Not configurable.
    pub const fn port(self) -> u16 {
        match self {
            Service::Monolith => 4000,
            Service::Partners => 4001,
            Service::Products => 4003,
        }
    }

    pub fn address(self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port()))
    }

    pub const fn is_subgraph(self) -> bool {
        !matches!(self, Service::Monolith)
    }

    pub const fn owns_partners(self) -> bool {
        matches!(self, Service::Monolith | Service::Partners)
    }

    pub const fn owns_products(self) -> bool {
        matches!(self, Service::Monolith | Service::Products)
    }
}

/// Data sources of one running service, handed to every resolver call.
///
/// Cloning is cheap; all clones share the same record stores.
#[derive(Clone)]
pub struct Context {
    service: Service,
    partners: Option<Arc<PartnersDataSource>>,
    products: Option<Arc<ProductsDataSource>>,
}

impl Context {
    /// Opens the data sources of `service` from JSON files in `data_dir`.
    pub fn open<P: AsRef<Path>>(service: Service, data_dir: P) -> Result<Context> {
        Context::with_store(service, Store::new(data_dir)?)
    }

    pub fn with_store(service: Service, store: Store) -> Result<Context> {
        let partners = if service.owns_partners() {
            Some(Arc::new(PartnersDataSource::open(store.clone())?))
        } else {
            None
        };
        let products = if service.owns_products() {
            Some(Arc::new(ProductsDataSource::open(store)?))
        } else {
            None
        };
        if service.is_subgraph() {
            info!("Subgraph {} ready at {}", service.name(), service.address());
        } else {
            info!("Server {} ready at {}", service.name(), service.address());
        }
        Ok(Context {
            service,
            partners,
            products,
        })
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn partners(&self) -> Option<&PartnersDataSource> {
        self.partners.as_deref()
    }

    pub fn products(&self) -> Option<&ProductsDataSource> {
        self.products.as_deref()
    }
}
