use storefront_core::{FilterState, FilterUpdate};

use super::*;

fn client(base: &str) -> CatalogClient {
    CatalogClient::new(base, 5, "storefront-test/0.1", 0, 0).expect("client should build")
}

fn params(update: FilterUpdate) -> QueryParams {
    let mut state = FilterState::default();
    state.merge(update);
    state.query_params()
}

#[test]
fn products_url_without_params_has_no_query() {
    let url = client("http://localhost:5000/api").products_url(&QueryParams::default());
    assert_eq!(url.as_str(), "http://localhost:5000/api/products");
}

#[test]
fn products_url_handles_trailing_slash() {
    let url = client("http://localhost:5000/api/").products_url(&QueryParams::default());
    assert_eq!(url.as_str(), "http://localhost:5000/api/products");
}

#[test]
fn products_url_bare_host() {
    let url = client("https://shop.example.com").products_url(&QueryParams::default());
    assert_eq!(url.as_str(), "https://shop.example.com/products");
}

#[test]
fn products_url_appends_params_in_key_order() {
    let url = client("http://localhost:5000/api").products_url(&params(
        FilterUpdate::new()
            .gender("Women")
            .category_id("3")
            .price_range(0.0, 120.0),
    ));
    assert_eq!(
        url.as_str(),
        "http://localhost:5000/api/products?category_id=3&gender=women&max_price=120"
    );
}

#[test]
fn products_url_percent_encodes_values() {
    let url = client("http://localhost:5000").products_url(&params(
        FilterUpdate::new().brand("Smith & Sons").color("Navy Blue"),
    ));
    assert_eq!(
        url.as_str(),
        "http://localhost:5000/products?brand=Smith+%26+Sons&color=navy+blue"
    );
}

#[test]
fn new_rejects_unparseable_base_url() {
    let err = CatalogClient::new("not a url", 5, "ua", 0, 0).unwrap_err();
    assert!(
        matches!(err, ClientError::InvalidBaseUrl { .. }),
        "expected InvalidBaseUrl, got: {err:?}"
    );
}

#[test]
fn new_rejects_non_http_scheme() {
    let err = CatalogClient::new("ftp://files.example.com", 5, "ua", 0, 0).unwrap_err();
    assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
}

#[test]
fn debug_output_redacts_token() {
    let client = client("http://localhost:5000").with_api_token("hunter2".to_string());
    let rendered = format!("{client:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("[redacted]"));
}
