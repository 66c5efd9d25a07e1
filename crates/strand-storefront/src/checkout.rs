//! Checkout initiation.
//!
//! `POST /checkout` validates the shipping form, prices the cart with
//! the same totals computation the cart view uses, registers a hosted
//! checkout session with the payment provider, persists the checkout
//! record, and hands the client the provider's redirect URL with the
//! local record id appended for correlation on return. The cart cookie
//! is cleared so a fresh cart starts on the next visit.

use crate::handlers::Storefront;
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::{OrderLine, OrderSummary};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use strand_commerce::checkout::{
    generate_merchant_reference, validate_shipping, CheckoutRecord, ShippingDetails,
};
use strand_commerce::CartId;
use strand_payments::{CreateCheckout, PaymentGateway};
use strand_store::{CartStorage, CatalogStorage, CheckoutStorage};
use tracing::{error, warn};

const MSG_CHECKOUT_FAILED: &str = "Villa kom upp við að vista pöntunarupplýsingar";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutBody {
    #[serde(default)]
    cart_id: Option<String>,
    #[serde(flatten)]
    form: strand_commerce::checkout::ShippingForm,
}

/// Handle `POST /checkout`.
pub(crate) fn handle_checkout<S, P>(app: &Storefront<S, P>, req: &HttpRequest) -> HttpResponse
where
    S: CartStorage + CatalogStorage + CheckoutStorage,
    P: PaymentGateway,
{
    let body: CheckoutBody = match req.json() {
        Ok(body) => body,
        Err(e) => {
            error!("bad checkout body: {e}");
            return HttpResponse::error(500, MSG_CHECKOUT_FAILED);
        }
    };

    // Validation failures stay local: field-keyed messages, no external
    // call, no record.
    let shipping = match validate_shipping(&body.form) {
        Ok(shipping) => shipping,
        Err(errors) => return HttpResponse::json(200, &json!({ "errors": errors.0 })),
    };

    let Some(cart_id) = body.cart_id.map(CartId::new).or_else(|| req.cart_id()) else {
        error!("checkout without a cart identifier");
        return HttpResponse::error(500, MSG_CHECKOUT_FAILED);
    };

    match initiate(app, &cart_id, shipping) {
        Ok(redirect_url) => HttpResponse::json(200, &json!({ "redirectUrl": redirect_url }))
            .with_cleared_cart_cookie(),
        Err(e) => {
            error!("checkout failed for cart {cart_id}: {e:#}");
            HttpResponse::error(500, MSG_CHECKOUT_FAILED)
        }
    }
}

fn initiate<S, P>(
    app: &Storefront<S, P>,
    cart_id: &CartId,
    shipping: ShippingDetails,
) -> Result<String>
where
    S: CartStorage + CatalogStorage + CheckoutStorage,
    P: PaymentGateway,
{
    let view = app
        .sync
        .cart_state(cart_id)
        .context("failed to load cart for checkout")?;
    let amount = view.totals.total;

    let merchant_reference_id = generate_merchant_reference();
    let base = app.config.checkout_redirect_base()?;

    let metadata = json!({
        "orderDetails": {
            "merchantReferenceId": merchant_reference_id,
            "totalAmount": amount.display_amount(),
            "items": view
                .lines
                .iter()
                .map(|line| json!({
                    "product": line.product.name,
                    "variant": line.variant.name,
                    "quantity": line.quantity,
                }))
                .collect::<Vec<_>>(),
        }
    });

    let session = app
        .gateway
        .create_checkout(&CreateCheckout {
            amount: amount.to_decimal(),
            merchant_reference_id: merchant_reference_id.clone(),
            complete_checkout_url: format!("{base}/order-successful"),
            cancel_checkout_url: format!("{base}/order-error"),
            description: Some("Cart".to_string()),
            metadata: Some(metadata),
        })
        .context("payment provider rejected checkout")?;

    let record = CheckoutRecord::new(
        cart_id.clone(),
        merchant_reference_id,
        session.id.clone(),
        amount,
        shipping.clone(),
    );
    app.storage
        .insert_checkout(&record)
        .context("failed to persist checkout record")?;

    // Best-effort only: a lost notification must not lose the order.
    let summary = OrderSummary {
        merchant_reference_id: record.merchant_reference_id.clone(),
        checkout_id: session.id.clone(),
        total: amount,
        lines: view
            .lines
            .iter()
            .map(|line| OrderLine {
                name: line.product.name.clone(),
                variant: line.variant.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price(),
            })
            .collect(),
        shipping,
    };
    if let Err(e) = app.notifier.order_placed(&summary) {
        warn!("order notification failed: {e}");
    }

    Ok(format!("{}?checkoutId={}", session.redirect_url, record.id))
}
