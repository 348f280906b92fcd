//! Demonstration storefront API: fluent interfaces plus their endpoints.

use chain::fluent_interface;
use transport::{Clamp, Endpoint, EndpointTable, LowerCase, TransportError};

/// Largest page size `skus` will request.
pub const MAX_SKU_PAGE: i64 = 10;

fluent_interface! {
    /// Storefront root.
    pub struct StoreApi {
        terminal fn get(id);
        fluent fn products(store_id) -> ProductApi;
        fluent fn employees(store_id) -> EmployeeApi;
    }
}

fluent_interface! {
    /// Employees of one store.
    pub struct EmployeeApi {
        terminal fn search(first, last);
    }
}

fluent_interface! {
    /// Products of one store.
    pub struct ProductApi {
        terminal fn get(product_id);
        terminal fn post(product_id, price, amount);
        fluent fn skus(product_id) -> SkuApi;
    }
}

fluent_interface! {
    /// SKUs of one product.
    pub struct SkuApi {
        terminal fn get(sku_id);
        terminal fn list(limit);
    }
}

/// HTTP mapping for every terminal operation of [`StoreApi`].
pub fn endpoints() -> Result<EndpointTable, TransportError> {
    EndpointTable::new()
        .with(
            "StoreApi",
            "get",
            Endpoint::parse("GET /api/store/{id}")?.param("id"),
        )?
        .with(
            "EmployeeApi",
            "search",
            Endpoint::parse(
                "GET /api/stores/{store_id}/employees?filter[first_name]={first}&filter[last_name]={last}",
            )?
            .param("store_id")
            .param_with("first", LowerCase)
            .param_with("last", LowerCase),
        )?
        .with(
            "ProductApi",
            "get",
            Endpoint::parse("GET /api/stores/{store_id}/products/{product_id}")?
                .param("store_id")
                .param("product_id"),
        )?
        .with(
            "ProductApi",
            "post",
            Endpoint::parse("POST /api/stores/{store_id}/products/{product_id}")?
                .param("store_id")
                .param("product_id")
                .param("price")
                .param("amount")
                .body(r#"%7B"price": "{price}", "amount": "{amount}"%7D"#)?,
        )?
        .with(
            "SkuApi",
            "get",
            Endpoint::parse("GET /api/stores/{store_id}/products/{product_id}/sku/{sku_id}")?
                .param("store_id")
                .param("product_id")
                .param("sku_id"),
        )?
        .with(
            "SkuApi",
            "list",
            Endpoint::parse("GET /api/stores/{store_id}/products/{product_id}/sku?limit={limit}")?
                .param("store_id")
                .param("product_id")
                .param_with("limit", Clamp::new(MAX_SKU_PAGE)),
        )
}
