//! Cart mutation endpoints.
//!
//! Thin HTTP layer over the synchronizer. Each handler resolves the cart
//! identifier from the `cartId` cookie, applies one mutation, and
//! answers `{"success": true}` or a fixed `{"error": ...}` string; the
//! structured cause goes to the log, not to the client.

use crate::checkout;
use crate::config::StoreConfig;
use crate::http::{HttpRequest, HttpResponse, Method};
use crate::notify::{LogNotifier, Notifier};
use serde::Deserialize;
use std::sync::Arc;
use strand_commerce::{Currency, ProductId, VariantId};
use strand_payments::PaymentGateway;
use strand_store::{CartStorage, CartSync, CartView, CatalogStorage, CheckoutStorage};
use tracing::error;

/// The shop sells in ISK.
pub const SHOP_CURRENCY: Currency = Currency::ISK;

const MSG_ADD_FAILED: &str = "Failed to add item to cart";
const MSG_UPDATE_FAILED: &str = "Failed to update cart item";
const MSG_REMOVE_FAILED: &str = "Failed to remove item from cart";
const MSG_LOAD_FAILED: &str = "Failed to load cart";
const MSG_NO_CART: &str = "No cart found";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody {
    variant_id: String,
    product_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateItemBody {
    variant_id: String,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveItemBody {
    variant_id: String,
}

/// The storefront application: storage, synchronizer, payment gateway,
/// configuration, and notification sink, owned explicitly and threaded
/// through the request path.
pub struct Storefront<S, P> {
    pub(crate) sync: CartSync<S>,
    pub(crate) storage: Arc<S>,
    pub(crate) gateway: P,
    pub(crate) config: StoreConfig,
    pub(crate) notifier: Box<dyn Notifier>,
}

impl<S, P> Storefront<S, P>
where
    S: CartStorage + CatalogStorage + CheckoutStorage,
    P: PaymentGateway,
{
    /// Assemble the storefront. Notifications go to the log unless a
    /// different [`Notifier`] is plugged in.
    pub fn new(storage: Arc<S>, gateway: P, config: StoreConfig) -> Self {
        Self {
            sync: CartSync::new(Arc::clone(&storage), SHOP_CURRENCY),
            storage,
            gateway,
            config,
            notifier: Box::new(LogNotifier),
        }
    }

    /// Replace the notification sink.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Route a request.
    pub fn handle(&self, req: &HttpRequest) -> HttpResponse {
        match (req.method, req.path.as_str()) {
            (Method::Post, "/cart/add") => self.cart_add(req),
            (Method::Post, "/cart/update") => self.cart_update(req),
            (Method::Post, "/cart/remove") => self.cart_remove(req),
            (Method::Get, "/cart") => self.cart_view(req),
            (Method::Post, "/checkout") => checkout::handle_checkout(self, req),
            (Method::Get, "/products") => self.product_list(),
            (Method::Get, path) => match path.strip_prefix("/product/") {
                Some(handle) if !handle.is_empty() => self.product_detail(handle),
                _ => HttpResponse::error(404, "Not found"),
            },
            _ => HttpResponse::error(404, "Not found"),
        }
    }

    /// `GET /products`: the catalog grid data, each product with its
    /// variants.
    fn product_list(&self) -> HttpResponse {
        let products = match self.storage.list_products() {
            Ok(products) => products,
            Err(e) => {
                error!("failed to list products: {e}");
                return HttpResponse::error(500, MSG_LOAD_FAILED);
            }
        };

        let mut entries = Vec::with_capacity(products.len());
        for product in products {
            match self.storage.variants_for(&product.id) {
                Ok(variants) => entries.push(serde_json::json!({
                    "product": product,
                    "variants": variants,
                })),
                Err(e) => {
                    error!("failed to load variants for {}: {e}", product.id);
                    return HttpResponse::error(500, MSG_LOAD_FAILED);
                }
            }
        }
        HttpResponse::json(200, &serde_json::json!({ "products": entries }))
    }

    /// `GET /product/{handle}`: one product by URL handle.
    fn product_detail(&self, handle: &str) -> HttpResponse {
        match self.storage.product_by_handle(handle) {
            Ok(Some(product)) => match self.storage.variants_for(&product.id) {
                Ok(variants) => HttpResponse::json(
                    200,
                    &serde_json::json!({ "product": product, "variants": variants }),
                ),
                Err(e) => {
                    error!("failed to load variants for {}: {e}", product.id);
                    HttpResponse::error(500, MSG_LOAD_FAILED)
                }
            },
            Ok(None) => HttpResponse::error(404, "Not found"),
            Err(e) => {
                error!("failed to load product {handle}: {e}");
                HttpResponse::error(500, MSG_LOAD_FAILED)
            }
        }
    }

    /// `POST /cart/add {variantId, productId}`.
    ///
    /// Creates a durable cart on first use and hands its identifier back
    /// in the `cartId` cookie.
    fn cart_add(&self, req: &HttpRequest) -> HttpResponse {
        let body: AddItemBody = match req.json() {
            Ok(body) => body,
            Err(e) => {
                error!("bad add-to-cart body: {e}");
                return HttpResponse::error(500, MSG_ADD_FAILED);
            }
        };

        let existing = req.cart_id();
        let cart_id = match self.sync.get_or_create_cart(existing.as_ref(), None) {
            Ok(id) => id,
            Err(e) => {
                error!("failed to create cart: {e}");
                return HttpResponse::error(500, MSG_ADD_FAILED);
            }
        };

        match self.sync.add_to_cart(
            &cart_id,
            &ProductId::new(body.product_id),
            &VariantId::new(body.variant_id),
            1,
        ) {
            Ok(_) => {
                let response = HttpResponse::success();
                if existing.as_ref() == Some(&cart_id) {
                    response
                } else {
                    response.with_cart_cookie(&cart_id)
                }
            }
            Err(e) => {
                error!("failed to add item to cart {cart_id}: {e}");
                HttpResponse::error(500, MSG_ADD_FAILED)
            }
        }
    }

    /// `POST /cart/update {variantId, quantity}`. Quantity is absolute;
    /// zero or less removes the line.
    fn cart_update(&self, req: &HttpRequest) -> HttpResponse {
        let Some(cart_id) = req.cart_id() else {
            return HttpResponse::error(404, MSG_NO_CART);
        };
        let body: UpdateItemBody = match req.json() {
            Ok(body) => body,
            Err(e) => {
                error!("bad update-cart body: {e}");
                return HttpResponse::error(500, MSG_UPDATE_FAILED);
            }
        };

        match self
            .sync
            .update_quantity(&cart_id, &VariantId::new(body.variant_id), body.quantity)
        {
            Ok(_) => HttpResponse::success(),
            Err(e) => {
                error!("failed to update cart {cart_id}: {e}");
                HttpResponse::error(500, MSG_UPDATE_FAILED)
            }
        }
    }

    /// `POST /cart/remove {variantId}`.
    fn cart_remove(&self, req: &HttpRequest) -> HttpResponse {
        let Some(cart_id) = req.cart_id() else {
            return HttpResponse::error(404, MSG_NO_CART);
        };
        let body: RemoveItemBody = match req.json() {
            Ok(body) => body,
            Err(e) => {
                error!("bad remove-from-cart body: {e}");
                return HttpResponse::error(500, MSG_REMOVE_FAILED);
            }
        };

        match self
            .sync
            .remove_from_cart(&cart_id, &VariantId::new(body.variant_id))
        {
            Ok(_) => HttpResponse::success(),
            Err(e) => {
                error!("failed to remove item from cart {cart_id}: {e}");
                HttpResponse::error(500, MSG_REMOVE_FAILED)
            }
        }
    }

    /// `GET /cart`: the hydrated view with live totals. A missing or
    /// stale cart identifier yields the empty cart; the stale cookie is
    /// discarded on the way out.
    fn cart_view(&self, req: &HttpRequest) -> HttpResponse {
        let Some(cart_id) = req.cart_id() else {
            return HttpResponse::json(200, &CartView::empty(SHOP_CURRENCY));
        };

        match self.sync.cart_exists(&cart_id) {
            Ok(false) => HttpResponse::json(200, &CartView::empty(SHOP_CURRENCY))
                .with_cleared_cart_cookie(),
            Ok(true) => match self.sync.cart_state(&cart_id) {
                Ok(view) => HttpResponse::json(200, &view),
                Err(e) => {
                    error!("failed to load cart {cart_id}: {e}");
                    HttpResponse::error(500, MSG_LOAD_FAILED)
                }
            },
            Err(e) => {
                error!("failed to look up cart {cart_id}: {e}");
                HttpResponse::error(500, MSG_LOAD_FAILED)
            }
        }
    }
}
