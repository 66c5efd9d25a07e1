//! Create-checkout client.

use crate::PaymentError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strand_data::FetchClient;
use tracing::info;

/// Card schemes offered at checkout. Icelandic issuers only.
const PAYMENT_METHOD_TYPES: [&str; 2] = ["is_visa_card", "is_mastercard_card"];

const COUNTRY: &str = "IS";
const CURRENCY: &str = "ISK";

const CHECKOUT_PATH: &str = "/v1/checkout";

/// API credentials for the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentCredentials {
    /// Provider API base URL.
    pub api_base_url: String,
    /// Public access key, sent as a header.
    pub access_key: String,
    /// Secret key, used only for request signing.
    pub secret_key: String,
}

/// Parameters for registering a hosted checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCheckout {
    /// Amount to charge, in main currency units.
    pub amount: f64,
    /// Fresh merchant reference for this attempt.
    pub merchant_reference_id: String,
    /// Where the provider sends the customer on success.
    pub complete_checkout_url: String,
    /// Where the provider sends the customer on cancel.
    pub cancel_checkout_url: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Opaque metadata echoed back by the provider.
    pub metadata: Option<serde_json::Value>,
}

/// Wire body of the create-checkout call.
#[derive(Debug, Serialize)]
struct CheckoutBody<'a> {
    amount: f64,
    merchant_reference_id: &'a str,
    complete_checkout_url: &'a str,
    cancel_checkout_url: &'a str,
    country: &'static str,
    currency: &'static str,
    payment_method_types_include: [&'static str; 2],
    custom_elements: CustomElements,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CustomElements {
    billing_address_collect: bool,
}

/// A hosted checkout session registered with the provider.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CheckoutSession {
    /// Provider's checkout identifier.
    pub id: String,
    /// Hosted page the customer is redirected to.
    pub redirect_url: String,
    /// Provider-side session status.
    pub status: String,
    /// The payment attached to the session.
    pub payment: SessionPayment,
}

/// Payment details inside a checkout session.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionPayment {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: CheckoutSession,
}

/// The seam the checkout flow talks through. Lets tests run the full
/// flow without an outbound call.
pub trait PaymentGateway {
    /// Register a hosted checkout session.
    fn create_checkout(&self, request: &CreateCheckout) -> Result<CheckoutSession, PaymentError>;
}

impl<T: PaymentGateway + ?Sized> PaymentGateway for std::sync::Arc<T> {
    fn create_checkout(&self, request: &CreateCheckout) -> Result<CheckoutSession, PaymentError> {
        (**self).create_checkout(request)
    }
}

/// HTTP client for the provider's checkout API.
pub struct PaymentClient {
    credentials: PaymentCredentials,
    client: FetchClient,
}

impl PaymentClient {
    /// Create a client from credentials.
    pub fn new(credentials: PaymentCredentials) -> Self {
        let client = FetchClient::new().with_base_url(credentials.api_base_url.clone());
        Self {
            credentials,
            client,
        }
    }

    /// Signature over the canonical request string. The provider rejects
    /// requests whose signature does not match the salt/timestamp pair in
    /// the headers.
    fn sign(&self, path: &str, salt: &str, timestamp: i64, body: &str) -> String {
        let canonical = format!(
            "post{}{}{}{}{}{}",
            path, salt, timestamp, self.credentials.access_key, self.credentials.secret_key, body
        );
        let digest = Sha256::digest(canonical.as_bytes());
        hex::encode(digest)
    }
}

impl PaymentGateway for PaymentClient {
    fn create_checkout(&self, request: &CreateCheckout) -> Result<CheckoutSession, PaymentError> {
        if !(request.amount > 0.0) {
            return Err(PaymentError::InvalidAmount(request.amount));
        }

        let body = CheckoutBody {
            amount: request.amount,
            merchant_reference_id: &request.merchant_reference_id,
            complete_checkout_url: &request.complete_checkout_url,
            cancel_checkout_url: &request.cancel_checkout_url,
            country: COUNTRY,
            currency: CURRENCY,
            payment_method_types_include: PAYMENT_METHOD_TYPES,
            custom_elements: CustomElements {
                billing_address_collect: true,
            },
            metadata: request.metadata.as_ref(),
            description: request.description.as_deref(),
        };
        let body_json =
            serde_json::to_string(&body).map_err(|e| PaymentError::BadResponse(e.to_string()))?;

        let salt: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        let timestamp = current_timestamp();
        let signature = self.sign(CHECKOUT_PATH, &salt, timestamp, &body_json);

        let response = self
            .client
            .post(CHECKOUT_PATH)
            .header("Content-Type", "application/json")
            .header("access_key", self.credentials.access_key.clone())
            .header("salt", salt)
            .header("timestamp", timestamp.to_string())
            .header("signature", signature)
            .body(body_json.into_bytes())
            .send()?
            .error_for_status()?;

        let envelope: Envelope = response
            .json()
            .map_err(|e| PaymentError::BadResponse(e.to_string()))?;

        info!(
            checkout_id = %envelope.data.id,
            merchant_reference_id = %request.merchant_reference_id,
            "registered hosted checkout session"
        );
        Ok(envelope.data)
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
