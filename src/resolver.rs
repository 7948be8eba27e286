//! Name based entry points for a GraphQL host.
//!
//! Queries and mutations map 1:1 onto data source calls. Arguments and
//! results are plain JSON so any server library can forward to them.
//! Nothing is validated beyond what is needed to read the arguments.

use crate::{
    datasource::{PartnersDataSource, ProductsDataSource},
    entity::Object,
    error::{Error, Result},
    service::Context,
};
use log::debug;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Partner,
    Partners,
    CreatePartner,
    UpdatePartner,
    Product,
    Products,
    CreateProduct,
    UpdateProduct,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Partner,
        Operation::Partners,
        Operation::CreatePartner,
        Operation::UpdatePartner,
        Operation::Product,
        Operation::Products,
        Operation::CreateProduct,
        Operation::UpdateProduct,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Operation::Partner => "partner",
            Operation::Partners => "partners",
            Operation::CreatePartner => "createPartner",
            Operation::UpdatePartner => "updatePartner",
            Operation::Product => "product",
            Operation::Products => "products",
            Operation::CreateProduct => "createProduct",
            Operation::UpdateProduct => "updateProduct",
        }
    }

    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| op.name() == name)
    }

    pub const fn is_mutation(self) -> bool {
        matches!(
            self,
            Operation::CreatePartner
                | Operation::UpdatePartner
                | Operation::CreateProduct
                | Operation::UpdateProduct
        )
    }
}

impl Context {
    /// Runs the query or mutation `operation` with its GraphQL arguments.
    pub fn resolve(&self, operation: &str, args: &Value) -> Result<Value> {
        let op = Operation::from_name(operation).ok_or_else(|| self.unknown(operation))?;
        if op.is_mutation() {
            debug!("{}: {operation} {args}", self.service().name());
        }
        match op {
            Operation::Partner => to_json(self.partners_for(op)?.get_partner(str_arg(args, op, "id")?)),
            Operation::Partners => to_json(self.partners_for(op)?.get_partners()),
            Operation::CreatePartner => {
                let input = object_arg(args, op, "partner")?.clone();
                to_json(self.partners_for(op)?.create_partner(input)?)
            }
            Operation::UpdatePartner => {
                let id = str_arg(args, op, "partnerId")?;
                let patch = object_arg(args, op, "updatePartnerInput")?;
                to_json(self.partners_for(op)?.update_partner(id, patch)?)
            }
            Operation::Product => to_json(self.products_for(op)?.get_product(str_arg(args, op, "id")?)),
            Operation::Products => to_json(self.products_for(op)?.get_products()),
            Operation::CreateProduct => {
                let input = object_arg(args, op, "product")?.clone();
                to_json(self.products_for(op)?.create_product(input)?)
            }
            Operation::UpdateProduct => {
                let id = str_arg(args, op, "productId")?;
                let patch = object_arg(args, op, "updateProductInput")?;
                to_json(self.products_for(op)?.update_product(id, patch)?)
            }
        }
    }

    /// Resolves a field of `type_name` on an already resolved `parent`.
    pub fn resolve_field(&self, type_name: &str, field: &str, parent: &Value) -> Result<Value> {
        let operation = format!("{type_name}.{field}");
        match (type_name, field, self.products()) {
            ("Partner", "favoriteProduct", Some(products)) => {
                let id = parent_id(parent, &operation)?;
                to_json(products.get_favorite_product(id))
            }
            ("Product", "availability", Some(products)) => {
                let id = parent_id(parent, &operation)?;
                to_json(products.get_product_availability(id))
            }
            _ => Err(self.unknown(&operation)),
        }
    }

    /// Fetches the full entity for a federation reference `{ id }`. Only
    /// subgraphs answer reference lookups.
    pub fn resolve_reference(&self, type_name: &str, representation: &Value) -> Result<Value> {
        let operation = format!("{type_name}.__resolveReference");
        if !self.service().is_subgraph() {
            return Err(self.unknown(&operation));
        }
        match (type_name, self.partners(), self.products()) {
            ("Partner", Some(partners), _) => {
                to_json(partners.get_partner(parent_id(representation, &operation)?))
            }
            ("Product", _, Some(products)) => {
                to_json(products.get_product(parent_id(representation, &operation)?))
            }
            _ => Err(self.unknown(&operation)),
        }
    }

    fn partners_for(&self, op: Operation) -> Result<&PartnersDataSource> {
        self.partners().ok_or_else(|| self.unknown(op.name()))
    }

    fn products_for(&self, op: Operation) -> Result<&ProductsDataSource> {
        self.products().ok_or_else(|| self.unknown(op.name()))
    }

    fn unknown(&self, operation: &str) -> Error {
        Error::UnknownOperation {
            service: self.service().name(),
            operation: operation.to_string(),
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn str_arg<'a>(args: &'a Value, op: Operation, name: &str) -> Result<&'a str> {
    args.get(name).and_then(Value::as_str).ok_or_else(|| Error::InvalidArgument {
        operation: op.name().to_string(),
        reason: format!("\"{name}\" must be a string"),
    })
}

fn object_arg<'a>(args: &'a Value, op: Operation, name: &str) -> Result<&'a Object> {
    args.get(name).and_then(Value::as_object).ok_or_else(|| Error::InvalidArgument {
        operation: op.name().to_string(),
        reason: format!("\"{name}\" must be an object"),
    })
}

fn parent_id<'a>(parent: &'a Value, operation: &str) -> Result<&'a str> {
    parent.get("id").and_then(Value::as_str).ok_or_else(|| Error::InvalidArgument {
        operation: operation.to_string(),
        reason: "parent has no string \"id\"".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{service::Service, MemoryStore, Store};
    use serde_json::json;

    fn store() -> Store {
        Store::from(
            MemoryStore::default()
                .with_document(
                    "partners",
                    r#"{"partners":[{"id":"1","name":"Bean Co"},{"id":"4","name":"Leaf Co"}]}"#,
                )
                .with_document(
                    "products",
                    r#"{"products":[{"id":"1","name":"Espresso","stock":0},{"id":"2","name":"Cold Brew","stock":5}]}"#,
                ),
        )
    }

    fn ctx(service: Service) -> Context {
        Context::with_store(service, store()).unwrap()
    }

    #[test]
    fn operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("deletePartner"), None);
        assert!(Operation::UpdateProduct.is_mutation());
        assert!(!Operation::Products.is_mutation());
    }

    #[test]
    fn queries() {
        let ctx = ctx(Service::Monolith);
        let partners = ctx.resolve("partners", &Value::Null).unwrap();
        assert_eq!(partners.as_array().unwrap().len(), 2);
        assert_eq!(
            ctx.resolve("product", &json!({ "id": "2" })).unwrap(),
            json!({ "id": "2", "name": "Cold Brew", "stock": 5 })
        );
        assert_eq!(ctx.resolve("partner", &json!({ "id": "9" })).unwrap(), Value::Null);
    }

    #[test]
    fn mutations() {
        let ctx = ctx(Service::Monolith);
        let created = ctx
            .resolve("createProduct", &json!({ "product": { "name": "Latte", "stock": 2 } }))
            .unwrap();
        assert_eq!(created["code"], 200);
        assert_eq!(created["product"]["id"], "3");

        let updated = ctx
            .resolve(
                "updatePartner",
                &json!({ "partnerId": "4", "updatePartnerInput": { "name": "Tea Co" } }),
            )
            .unwrap();
        assert_eq!(updated["success"], true);
        assert_eq!(updated["partner"], json!({ "id": "4", "name": "Tea Co" }));

        let missing = ctx
            .resolve(
                "updateProduct",
                &json!({ "productId": "42", "updateProductInput": { "stock": 1 } }),
            )
            .unwrap();
        assert_eq!(
            missing,
            json!({ "code": 404, "success": false, "message": "Product not found", "product": null })
        );
    }

    #[test]
    fn invalid_arguments() {
        let ctx = ctx(Service::Monolith);
        assert!(matches!(
            ctx.resolve("partner", &json!({ "id": 1 })),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            ctx.resolve("createPartner", &json!({})),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn operations_outside_the_service() {
        let partners = ctx(Service::Partners);
        assert!(matches!(
            partners.resolve("products", &Value::Null),
            Err(Error::UnknownOperation { service: "partners", .. })
        ));
        let products = ctx(Service::Products);
        assert!(matches!(
            products.resolve("createPartner", &json!({ "partner": { "name": "X" } })),
            Err(Error::UnknownOperation { service: "products", .. })
        ));
        assert!(products.resolve("nope", &Value::Null).is_err());
    }

    #[test]
    fn field_resolvers() {
        let ctx = ctx(Service::Products);
        let espresso = ctx
            .resolve_field("Partner", "favoriteProduct", &json!({ "id": "1" }))
            .unwrap();
        assert_eq!(espresso["name"], "Espresso");
        let cold_brew = ctx
            .resolve_field("Partner", "favoriteProduct", &json!({ "id": "4" }))
            .unwrap();
        assert_eq!(cold_brew["name"], "Cold Brew");
        assert_eq!(
            ctx.resolve_field("Product", "availability", &json!({ "id": "1" })).unwrap(),
            json!(false)
        );
        assert_eq!(
            ctx.resolve_field("Product", "availability", &json!({ "id": "9" })).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn field_resolvers_need_products() {
        let ctx = ctx(Service::Partners);
        assert!(matches!(
            ctx.resolve_field("Partner", "favoriteProduct", &json!({ "id": "1" })),
            Err(Error::UnknownOperation { .. })
        ));
    }

    #[test]
    fn reference_resolution() {
        let partners = ctx(Service::Partners);
        assert_eq!(
            partners.resolve_reference("Partner", &json!({ "id": "4" })).unwrap(),
            json!({ "id": "4", "name": "Leaf Co" })
        );
        assert_eq!(
            partners.resolve_reference("Partner", &json!({ "id": "7" })).unwrap(),
            Value::Null
        );
        assert!(partners.resolve_reference("Product", &json!({ "id": "1" })).is_err());

        let products = ctx(Service::Products);
        assert_eq!(
            products.resolve_reference("Product", &json!({ "id": "1" })).unwrap()["name"],
            "Espresso"
        );

        let monolith = ctx(Service::Monolith);
        assert!(monolith.resolve_reference("Partner", &json!({ "id": "1" })).is_err());
    }
}
