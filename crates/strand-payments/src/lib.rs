//! Payment-provider client.
//!
//! The storefront does not touch card data; it registers a hosted
//! checkout session with the provider and redirects the customer to the
//! returned URL. This crate builds the create-checkout request for the
//! shop's locale (Iceland, ISK, Icelandic card schemes) and parses the
//! provider's response envelope.

mod client;
mod error;

pub use client::{
    CheckoutSession, CreateCheckout, PaymentClient, PaymentCredentials, PaymentGateway,
    SessionPayment,
};
pub use error::PaymentError;
