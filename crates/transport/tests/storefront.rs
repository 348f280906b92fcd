mod support;

use std::sync::Arc;
use std::time::Duration;

use chain::{fluent_interface, ChainError, RetryPolicy};
use serde_json::Value;
use support::{closed_port_url, silent_listener, MockServer, Reply};
use transport::{
    Clamp, Endpoint, EndpointTable, HttpDispatcher, LowerCase, TransportConfig, TransportError,
};

// ---------------------------------------------------------------------------
// Storefront API
// ---------------------------------------------------------------------------

fluent_interface! {
    pub struct StoreApi {
        terminal fn get(id);
        fluent fn products(store_id) -> ProductApi;
        fluent fn employees(store_id) -> EmployeeApi;
    }
}

fluent_interface! {
    pub struct EmployeeApi {
        terminal fn search(first, last);
    }
}

fluent_interface! {
    pub struct ProductApi {
        terminal fn get(product_id);
        terminal fn post(product_id, price, amount);
        terminal fn delete(product_id);
        fluent fn skus(product_id) -> SkuApi;
    }
}

fluent_interface! {
    pub struct SkuApi {
        terminal fn get(sku_id);
        terminal fn list(limit);
    }
}

fn endpoints() -> EndpointTable {
    EndpointTable::new()
        .with(
            "StoreApi",
            "get",
            Endpoint::parse("GET /api/store/{id}").unwrap().param("id"),
        )
        .unwrap()
        .with(
            "EmployeeApi",
            "search",
            Endpoint::parse(
                "GET /api/stores/{store_id}/employees?filter[first_name]={first}&filter[last_name]={last}",
            )
            .unwrap()
            .param("store_id")
            .param_with("first", LowerCase)
            .param_with("last", LowerCase),
        )
        .unwrap()
        .with(
            "ProductApi",
            "get",
            Endpoint::parse("GET /api/stores/{store_id}/products/{product_id}")
                .unwrap()
                .param("store_id")
                .param("product_id"),
        )
        .unwrap()
        .with(
            "ProductApi",
            "post",
            Endpoint::parse("POST /api/stores/{store_id}/products/{product_id}")
                .unwrap()
                .param("store_id")
                .param("product_id")
                .param("price")
                .param("amount")
                .body(r#"%7B"price": "{price}", "amount": "{amount}"%7D"#)
                .unwrap(),
        )
        .unwrap()
        .with(
            "SkuApi",
            "get",
            Endpoint::parse("GET /api/stores/{store_id}/products/{product_id}/sku/{sku_id}")
                .unwrap()
                .param("store_id")
                .param("product_id")
                .param("sku_id")
                .header("accept", "text/plain"),
        )
        .unwrap()
        .with(
            "SkuApi",
            "list",
            Endpoint::parse("GET /api/stores/{store_id}/products/{product_id}/sku?limit={limit}")
                .unwrap()
                .param("store_id")
                .param("product_id")
                .param_with("limit", Clamp::new(10)),
        )
        .unwrap()
}

fn store_with(config: TransportConfig) -> StoreApi<HttpDispatcher> {
    let dispatcher = HttpDispatcher::new(&config, endpoints()).unwrap();
    StoreApi::target(Arc::new(dispatcher)).unwrap()
}

fn store(server: &MockServer) -> StoreApi<HttpDispatcher> {
    store_with(TransportConfig::new(server.base_url()))
}

// ---------------------------------------------------------------------------
// Fluent chains
// ---------------------------------------------------------------------------

#[tokio::test]
async fn secondary_call_renders_parent_and_child_arguments() {
    let server = MockServer::start(vec![Reply::ok("foo")]);
    let api = store(&server);

    let response = api.products("store_1").unwrap().get("product_1").await.unwrap();
    assert_eq!(response.body(), "foo");
    assert_eq!(response.status(), 200);

    let requests = server.finish();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/api/stores/store_1/products/product_1");
}

#[tokio::test]
async fn secondary_call_expands_query_parameters() {
    let server = MockServer::start(vec![Reply::ok("foo")]);
    let api = store(&server);

    let response = api
        .employees("store_1")
        .unwrap()
        .search("AnYFirsTName", "anyLastName")
        .await
        .unwrap();
    assert_eq!(response.into_body(), "foo");

    let requests = server.finish();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(
        requests[0].target,
        "/api/stores/store_1/employees?filter%5Bfirst_name%5D=anyfirstname&filter%5Blast_name%5D=anylastname"
    );
}

#[tokio::test]
async fn secondary_call_renders_request_body() {
    let server = MockServer::start(vec![Reply::ok("")]);
    let api = store(&server);

    api.products("store_1")
        .unwrap()
        .post("product_1", 42.1, 2)
        .await
        .unwrap();

    let requests = server.finish();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/api/stores/store_1/products/product_1");
    assert_eq!(requests[0].body, r#"{"price": "42.1", "amount": "2"}"#);
    assert_eq!(requests[0].header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn tertiary_call_renders_all_ancestor_arguments() {
    let server = MockServer::start(vec![Reply::ok("foo")]);
    let api = store(&server);

    let response = api
        .products("store_1")
        .unwrap()
        .skus("product_1")
        .unwrap()
        .get("sku_1")
        .await
        .unwrap();
    assert_eq!(response.body(), "foo");

    let requests = server.finish();
    assert_eq!(requests[0].target, "/api/stores/store_1/products/product_1/sku/sku_1");
    assert_eq!(requests[0].header("accept"), Some("text/plain"));
}

#[tokio::test]
async fn tertiary_call_applies_expander() {
    let server = MockServer::start(vec![Reply::ok("foo")]);
    let api = store(&server);

    api.products("store_1")
        .unwrap()
        .skus("product_1")
        .unwrap()
        .list(20)
        .await
        .unwrap();

    let requests = server.finish();
    assert_eq!(requests[0].target, "/api/stores/store_1/products/product_1/sku?limit=10");
}

#[tokio::test]
async fn null_query_argument_is_omitted() {
    let server = MockServer::start(vec![Reply::ok("[]")]);
    let api = store(&server);

    api.products("store_1")
        .unwrap()
        .skus("product_1")
        .unwrap()
        .list(Value::Null)
        .await
        .unwrap();

    let requests = server.finish();
    assert_eq!(requests[0].target, "/api/stores/store_1/products/product_1/sku");
}

#[tokio::test]
async fn sibling_chains_send_independent_requests() {
    let server = MockServer::start(vec![Reply::ok("a"), Reply::ok("b")]);
    let api = store(&server);

    let products = api.products("store_1").unwrap();
    let first = products.get("product_1").await.unwrap();
    let second = products.skus("product_2").unwrap().get("sku_9").await.unwrap();
    assert_eq!((first.body(), second.body()), ("a", "b"));

    let targets: Vec<_> = server.finish().into_iter().map(|r| r.target).collect();
    assert_eq!(
        targets,
        [
            "/api/stores/store_1/products/product_1",
            "/api/stores/store_1/products/product_2/sku/sku_9",
        ]
    );
}

#[tokio::test]
async fn default_headers_are_sent() {
    let server = MockServer::start(vec![Reply::ok("{}")]);
    let config = TransportConfig::new(server.base_url()).with_header("x-api-key", "secret");
    let api = store_with(config);

    api.get("store_1").await.unwrap();

    let requests = server.finish();
    assert_eq!(requests[0].target, "/api/store/store_1");
    assert_eq!(requests[0].header("x-api-key"), Some("secret"));
    assert!(requests[0].header("user-agent").unwrap().starts_with("catena/"));
}

#[tokio::test]
async fn response_body_decodes_as_json() {
    let server = MockServer::start(vec![Reply::ok(r#"{"id": "product_1", "price": 42.1}"#)]);
    let api = store(&server);

    let response = api.products("store_1").unwrap().get("product_1").await.unwrap();
    let product: Value = response.json().unwrap();
    assert_eq!(product["price"], 42.1);
    server.finish();
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_is_a_status_error() {
    let server = MockServer::start(vec![Reply::status(404, "no such product")]);
    let api = store(&server);

    let err = api.products("store_1").unwrap().get("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
    match err {
        TransportError::Status { body, .. } => assert_eq!(body, "no such product"),
        other => panic!("expected status error, got {other:?}"),
    }
    server.finish();
}

#[tokio::test]
async fn unavailable_is_retryable_with_delay() {
    let server = MockServer::start(vec![Reply::status(503, "busy").header("Retry-After", "3")]);
    let api = store(&server);

    let err = api.get("store_1").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(
        err.retry_policy(),
        RetryPolicy::Retryable {
            after: Some(Duration::from_secs(3))
        }
    );
    server.finish();
}

#[tokio::test]
async fn unmapped_operation_sends_nothing() {
    let server = MockServer::start(vec![]);
    let api = store(&server);

    let err = api.products("store_1").unwrap().delete("product_1").await.unwrap_err();
    assert_eq!(
        err,
        TransportError::UnmappedOperation {
            operation: "ProductApi#delete".into()
        }
    );
    assert!(server.finish().is_empty());
}

#[tokio::test]
async fn chain_errors_surface_as_transport_errors() {
    let server = MockServer::start(vec![]);
    let api = store(&server);

    let err = api.as_proxy().fluent("nope", chain::arguments![]).unwrap_err();
    assert_eq!(
        err,
        TransportError::Chain(ChainError::UnknownOperation {
            interface: "StoreApi".into(),
            operation: "nope".into(),
        })
    );
    server.finish();
}

#[tokio::test]
async fn connection_refused_is_retryable() {
    let api = store_with(TransportConfig::new(closed_port_url()));

    let err = api.get("store_1").await.unwrap_err();
    assert!(matches!(err, TransportError::Connect { .. }), "unexpected error {err:?}");
    assert!(err.retry_policy().is_retryable());
    // The refusal is only reported by the innermost source.
    assert!(err.to_string().to_lowercase().contains("refused"), "no cause in '{err}'");
}

#[tokio::test]
async fn unresponsive_server_times_out() {
    let (_listener, base_url) = silent_listener();
    let mut config = TransportConfig::new(base_url);
    config.timeout_ms = 200;
    let api = store_with(config);

    let err = api.get("store_1").await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout { .. }), "unexpected error {err:?}");
    assert!(err.retry_policy().is_retryable());
}
