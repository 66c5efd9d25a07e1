//! The Strand storefront application.
//!
//! Wires the domain, storage, and payments crates into the HTTP surface
//! the client talks to:
//!
//! - `POST /cart/add`, `POST /cart/update`, `POST /cart/remove` — cart
//!   mutations, keyed by the `cartId` cookie
//! - `GET /cart` — the hydrated cart view with live totals
//! - `POST /checkout` — shipping validation and the payment-provider
//!   handoff
//!
//! Handlers are host-independent functions over [`http::HttpRequest`];
//! the Spin adapter in [`server`] converts at the edge of the runtime.

pub mod checkout;
pub mod config;
pub mod handlers;
pub mod http;
pub mod notify;
#[cfg(target_arch = "wasm32")]
pub mod server;

pub use config::StoreConfig;
pub use handlers::{Storefront, SHOP_CURRENCY};
pub use http::{HttpRequest, HttpResponse, Method, CART_COOKIE};
pub use notify::{LogNotifier, Notifier, OrderLine, OrderSummary};
