//! Spin HTTP adapter.
//!
//! Converts between Spin's request/response types and the storefront's
//! host-independent ones, and assembles the application from the
//! environment on each request.

use crate::config::StoreConfig;
use crate::handlers::{Storefront, SHOP_CURRENCY};
use crate::http::{HttpRequest, HttpResponse, Method};
use spin_sdk::http::{IntoResponse, Request, Response};
use spin_sdk::http_component;
use std::sync::Arc;
use strand_db::Db;
use strand_payments::PaymentClient;
use strand_store::DbStorage;
use tracing::error;

#[http_component]
fn handle(req: Request) -> impl IntoResponse {
    let request = to_request(&req);
    match build_storefront() {
        Ok(app) => to_response(app.handle(&request)),
        Err(e) => {
            error!("storefront is misconfigured: {e:#}");
            to_response(HttpResponse::error(500, "Server error"))
        }
    }
}

fn build_storefront() -> anyhow::Result<Storefront<DbStorage, PaymentClient>> {
    let config = StoreConfig::from_env()?;
    let db = Db::open_default()?;
    let storage = DbStorage::new(db, SHOP_CURRENCY);
    storage.ensure_schema()?;
    let gateway = PaymentClient::new(config.payment.clone());
    Ok(Storefront::new(Arc::new(storage), gateway, config))
}

fn to_request(req: &Request) -> HttpRequest {
    let method = match req.method() {
        spin_sdk::http::Method::Get => Method::Get,
        spin_sdk::http::Method::Post => Method::Post,
        _ => Method::Other,
    };
    let mut request = HttpRequest::new(method, req.path().to_string());
    for (name, value) in req.headers() {
        if let Some(value) = value.as_str() {
            request = request.with_header(name.to_string(), value.to_string());
        }
    }
    request.body = req.body().to_vec();
    request
}

fn to_response(response: HttpResponse) -> Response {
    let mut builder = Response::builder();
    builder.status(response.status);
    for (name, value) in &response.headers {
        builder.header(name.as_str(), value.as_str());
    }
    builder.body(response.body).build()
}
