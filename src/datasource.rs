use crate::{
    entity::{Object, Partner, Product},
    envelope::MutationResponse,
    error::Result,
    record_store::RecordStore,
    Store,
};

/// Partners whose favorite product is an Espresso. Everybody else gets a
/// Cold Brew.
pub const ESPRESSO_PARTNERS: [&str; 3] = ["1", "2", "3"];

pub fn favorite_product_name(partner_id: &str) -> &'static str {
    if ESPRESSO_PARTNERS.contains(&partner_id) {
        "Espresso"
    } else {
        "Cold Brew"
    }
}

pub struct PartnersDataSource {
    partners: RecordStore<Partner>,
}

impl PartnersDataSource {
    pub fn open(store: Store) -> Result<PartnersDataSource> {
        Ok(PartnersDataSource {
            partners: RecordStore::open(store)?,
        })
    }

    pub fn get_partner(&self, id: &str) -> Option<Partner> {
        self.partners.get_by_id(id)
    }

    pub fn get_partners(&self) -> Vec<Partner> {
        self.partners.list()
    }

    pub fn create_partner(&self, input: Object) -> Result<MutationResponse<Partner>> {
        self.partners.create(input)
    }

    pub fn update_partner(&self, partner_id: &str, input: &Object) -> Result<MutationResponse<Partner>> {
        self.partners.update(partner_id, input)
    }
}

pub struct ProductsDataSource {
    products: RecordStore<Product>,
}

impl ProductsDataSource {
    pub fn open(store: Store) -> Result<ProductsDataSource> {
        Ok(ProductsDataSource {
            products: RecordStore::open(store)?,
        })
    }

    pub fn get_product(&self, id: &str) -> Option<Product> {
        self.products.get_by_id(id)
    }

    pub fn get_products(&self) -> Vec<Product> {
        self.products.list()
    }

    pub fn create_product(&self, input: Object) -> Result<MutationResponse<Product>> {
        self.products.create(input)
    }

    pub fn update_product(&self, product_id: &str, input: &Object) -> Result<MutationResponse<Product>> {
        self.products.update(product_id, input)
    }

    /// The first product named after the partner's favorite, if any.
    /// Only the partner id is taken into account.
    pub fn get_favorite_product(&self, partner_id: &str) -> Option<Product> {
        let name = favorite_product_name(partner_id);
        self.products.find(|p| p.name == name)
    }

    /// `None` for an unknown product, otherwise whether it is in stock.
    pub fn get_product_availability(&self, id: &str) -> Option<bool> {
        self.get_product(id).map(|p| p.in_stock())
    }
}
