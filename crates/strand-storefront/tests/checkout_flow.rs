//! End-to-end request flows against in-memory storage and a recording
//! payment gateway.

use serde_json::json;
use std::sync::{Arc, Mutex};
use strand_commerce::checkout::CheckoutStatus;
use strand_commerce::{CheckoutId, Currency, Money, Product, ProductVariant};
use strand_payments::{
    CheckoutSession, CreateCheckout, PaymentError, PaymentGateway, PaymentCredentials,
    SessionPayment,
};
use strand_storefront::config::{NotificationSettings, StoreConfig};
use strand_storefront::{HttpRequest, HttpResponse, Method, Storefront};
use strand_store::{CheckoutStorage, MemoryStorage};

/// Gateway double: records every request, answers with a fixed session.
#[derive(Default)]
struct RecordingGateway {
    requests: Mutex<Vec<CreateCheckout>>,
    fail: bool,
}

impl PaymentGateway for RecordingGateway {
    fn create_checkout(&self, request: &CreateCheckout) -> Result<CheckoutSession, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(PaymentError::Provider("boom".to_string()));
        }
        if request.amount <= 0.0 {
            return Err(PaymentError::InvalidAmount(request.amount));
        }
        Ok(CheckoutSession {
            id: "checkout_abc".to_string(),
            redirect_url: "https://pay.example/hosted/abc".to_string(),
            status: "NEW".to_string(),
            payment: SessionPayment {
                id: "payment_xyz".to_string(),
                amount: request.amount,
                currency: "ISK".to_string(),
                status: "NEW".to_string(),
            },
        })
    }
}

struct Harness {
    storage: Arc<MemoryStorage>,
    app: Storefront<MemoryStorage, Arc<RecordingGateway>>,
    gateway: Arc<RecordingGateway>,
    product: Product,
    variant: ProductVariant,
}

fn harness() -> Harness {
    harness_with(RecordingGateway::default())
}

fn harness_with(gateway: RecordingGateway) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let product = Product::new(
        "chess-set",
        "Chess Set",
        Money::from_major(1000, Currency::ISK),
    );
    let variant = ProductVariant::new(product.id.clone(), "Standard");
    storage.insert_product(product.clone());
    storage.insert_variant(variant.clone());

    let config = StoreConfig {
        public_base_url: Some("shop.example.is".to_string()),
        payment: PaymentCredentials {
            api_base_url: "https://sandboxapi.example.com".to_string(),
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
        },
        notifications: NotificationSettings::default(),
    };

    let gateway = Arc::new(gateway);
    let app = Storefront::new(Arc::clone(&storage), Arc::clone(&gateway), config);
    Harness {
        storage,
        app,
        gateway,
        product,
        variant,
    }
}

fn add_request(h: &Harness) -> HttpRequest {
    HttpRequest::new(Method::Post, "/cart/add").with_json(&json!({
        "variantId": h.variant.id.as_str(),
        "productId": h.product.id.as_str(),
    }))
}

fn cookie_cart_id(response: &HttpResponse) -> String {
    let cookie = response.set_cookie().expect("response sets a cart cookie");
    let (name_value, _) = cookie.split_once(';').unwrap();
    let (_, value) = name_value.split_once('=').unwrap();
    value.to_string()
}

fn shipping_body(cart_id: &str) -> serde_json::Value {
    json!({
        "cartId": cart_id,
        "email": "jon@example.is",
        "firstName": "Jón",
        "lastName": "Jónsson",
        "kennitala": "0101901234",
        "address": "Laugavegur 1",
        "city": "Reykjavík",
    })
}

#[test]
fn empty_cart_view_has_zero_totals() {
    let h = harness();
    let response = h.app.handle(&HttpRequest::new(Method::Get, "/cart"));
    let body = response.json_body().unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(body["totalQuantity"], 0);
    assert_eq!(body["cost"]["subtotalAmount"]["amount"], "0.00");
    assert_eq!(body["cost"]["totalTaxAmount"]["amount"], "0.00");
    assert_eq!(body["cost"]["totalAmount"]["amount"], "0.00");
}

#[test]
fn first_add_creates_cart_and_sets_cookie() {
    let h = harness();
    let response = h.app.handle(&add_request(&h));

    assert_eq!(response.status, 200);
    assert_eq!(response.json_body().unwrap()["success"], true);
    let cart_id = cookie_cart_id(&response);
    assert!(!cart_id.is_empty());

    // Second add with the cookie reuses the cart and sets no new cookie.
    let response = h
        .app
        .handle(&add_request(&h).with_header("cookie", format!("cartId={cart_id}")));
    assert_eq!(response.status, 200);
    assert!(response.set_cookie().is_none());

    let view = h.app.handle(
        &HttpRequest::new(Method::Get, "/cart").with_header("cookie", format!("cartId={cart_id}")),
    );
    let body = view.json_body().unwrap();
    assert_eq!(body["totalQuantity"], 2);
    assert_eq!(body["lines"].as_array().unwrap().len(), 1);
    assert_eq!(body["cost"]["subtotalAmount"]["amount"], "2000.00");
    assert_eq!(body["cost"]["totalTaxAmount"]["amount"], "387.10");
}

#[test]
fn update_and_remove_require_cart_cookie() {
    let h = harness();
    let update = HttpRequest::new(Method::Post, "/cart/update")
        .with_json(&json!({"variantId": h.variant.id.as_str(), "quantity": 2}));
    let response = h.app.handle(&update);
    assert_eq!(response.status, 404);
    assert_eq!(response.json_body().unwrap()["error"], "No cart found");

    let remove = HttpRequest::new(Method::Post, "/cart/remove")
        .with_json(&json!({"variantId": h.variant.id.as_str()}));
    assert_eq!(h.app.handle(&remove).status, 404);
}

#[test]
fn update_to_zero_empties_cart() {
    let h = harness();
    let cart_id = cookie_cart_id(&h.app.handle(&add_request(&h)));
    let cookie = format!("cartId={cart_id}");

    let update = HttpRequest::new(Method::Post, "/cart/update")
        .with_header("cookie", cookie.clone())
        .with_json(&json!({"variantId": h.variant.id.as_str(), "quantity": 0}));
    assert_eq!(h.app.handle(&update).status, 200);

    let view = h
        .app
        .handle(&HttpRequest::new(Method::Get, "/cart").with_header("cookie", cookie));
    let body = view.json_body().unwrap();
    assert_eq!(body["totalQuantity"], 0);
    assert!(body["lines"].as_array().unwrap().is_empty());
}

#[test]
fn stale_cart_cookie_yields_empty_view_and_clears_cookie() {
    let h = harness();
    let view = h
        .app
        .handle(&HttpRequest::new(Method::Get, "/cart").with_header("cookie", "cartId=gone"));
    assert_eq!(view.status, 200);
    assert_eq!(view.json_body().unwrap()["totalQuantity"], 0);
    assert!(view.set_cookie().unwrap().contains("Max-Age=0"));
}

#[test]
fn invalid_kennitala_fails_validation_without_external_call() {
    let h = harness();
    let cart_id = cookie_cart_id(&h.app.handle(&add_request(&h)));

    let mut body = shipping_body(&cart_id);
    body["kennitala"] = json!("12345");
    let response = h
        .app
        .handle(&HttpRequest::new(Method::Post, "/checkout").with_json(&body));

    assert_eq!(response.status, 200);
    let errors = &response.json_body().unwrap()["errors"];
    assert_eq!(
        errors["kennitala"],
        "Kennitala verður að vera 10 tölustafir"
    );
    // No provider call, no record.
    assert!(h.gateway.requests.lock().unwrap().is_empty());
}

#[test]
fn successful_checkout_creates_pending_record_and_redirects() {
    let h = harness();
    let first = h.app.handle(&add_request(&h));
    let cart_id = cookie_cart_id(&first);
    h.app
        .handle(&add_request(&h).with_header("cookie", format!("cartId={cart_id}")));

    let response = h
        .app
        .handle(&HttpRequest::new(Method::Post, "/checkout").with_json(&shipping_body(&cart_id)));
    assert_eq!(response.status, 200);

    // The cart cookie is cleared so a new cart starts next visit.
    assert!(response.set_cookie().unwrap().contains("Max-Age=0"));

    // The redirect URL is the provider's, with our record id appended.
    let body = response.json_body().unwrap();
    let redirect_url = body["redirectUrl"].as_str().unwrap();
    assert!(redirect_url.starts_with("https://pay.example/hosted/abc?checkoutId="));
    let (_, record_id) = redirect_url.split_once("?checkoutId=").unwrap();

    // The provider saw the shared totals and HTTPS redirect targets.
    let requests = h.gateway.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount, 2000.0);
    assert_eq!(
        requests[0].complete_checkout_url,
        "https://shop.example.is/order-successful"
    );
    assert_eq!(
        requests[0].cancel_checkout_url,
        "https://shop.example.is/order-error"
    );

    // The persisted record is pending and fully linked.
    let record = h
        .storage
        .checkout(&CheckoutId::new(record_id))
        .unwrap()
        .expect("checkout record persisted");
    assert_eq!(record.status, CheckoutStatus::Pending);
    assert_eq!(record.provider_checkout_id, "checkout_abc");
    assert_eq!(record.merchant_reference_id, requests[0].merchant_reference_id);
    assert_eq!(record.cart_id.as_str(), cart_id);
    assert_eq!(record.amount, Money::from_major(2000, Currency::ISK));
    assert_eq!(record.shipping.email, "jon@example.is");
}

#[test]
fn each_checkout_attempt_gets_a_fresh_merchant_reference() {
    let h = harness();
    let cart_id = cookie_cart_id(&h.app.handle(&add_request(&h)));

    for _ in 0..2 {
        h.app
            .handle(&HttpRequest::new(Method::Post, "/checkout").with_json(&shipping_body(&cart_id)));
    }
    let requests = h.gateway.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_ne!(
        requests[0].merchant_reference_id,
        requests[1].merchant_reference_id
    );
}

#[test]
fn provider_failure_is_a_generic_error_with_no_record() {
    let h = harness_with(RecordingGateway {
        fail: true,
        ..RecordingGateway::default()
    });
    let cart_id = cookie_cart_id(&h.app.handle(&add_request(&h)));

    let response = h
        .app
        .handle(&HttpRequest::new(Method::Post, "/checkout").with_json(&shipping_body(&cart_id)));
    assert_eq!(response.status, 500);
    assert_eq!(
        response.json_body().unwrap()["error"],
        "Villa kom upp við að vista pöntunarupplýsingar"
    );
    // The cookie survives a failed checkout.
    assert!(response.set_cookie().is_none());
}

#[test]
fn checkout_of_empty_cart_fails_before_any_charge() {
    let h = harness();
    let cart_id = cookie_cart_id(&h.app.handle(&add_request(&h)));
    let cookie = format!("cartId={cart_id}");
    let remove = HttpRequest::new(Method::Post, "/cart/remove")
        .with_header("cookie", cookie)
        .with_json(&json!({"variantId": h.variant.id.as_str()}));
    h.app.handle(&remove);

    let response = h
        .app
        .handle(&HttpRequest::new(Method::Post, "/checkout").with_json(&shipping_body(&cart_id)));
    assert_eq!(response.status, 500);
    // The gateway refused the zero amount; nothing was persisted.
    let checkouts = h.gateway.requests.lock().unwrap();
    assert_eq!(checkouts.len(), 1);
    assert_eq!(checkouts[0].amount, 0.0);
}

#[test]
fn product_list_includes_variants() {
    let h = harness();
    let response = h.app.handle(&HttpRequest::new(Method::Get, "/products"));
    assert_eq!(response.status, 200);

    let body = response.json_body().unwrap();
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["product"]["handle"], "chess-set");
    assert_eq!(
        products[0]["variants"][0]["id"],
        h.variant.id.as_str()
    );
}

#[test]
fn product_detail_by_handle() {
    let h = harness();
    let response = h
        .app
        .handle(&HttpRequest::new(Method::Get, "/product/chess-set"));
    assert_eq!(response.status, 200);
    let body = response.json_body().unwrap();
    assert_eq!(body["product"]["name"], "Chess Set");

    let missing = h
        .app
        .handle(&HttpRequest::new(Method::Get, "/product/unknown"));
    assert_eq!(missing.status, 404);
}

#[test]
fn unknown_route_is_404() {
    let h = harness();
    let response = h.app.handle(&HttpRequest::new(Method::Get, "/nope"));
    assert_eq!(response.status, 404);
    let post = h.app.handle(&HttpRequest::new(Method::Post, "/nope"));
    assert_eq!(post.status, 404);
}
