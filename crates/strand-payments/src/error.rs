//! Payment error types.

use thiserror::Error;

/// Errors from the payment provider integration.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// The provider could not be reached or answered with an error.
    #[error("Payment provider request failed: {0}")]
    Provider(String),

    /// The provider's response could not be interpreted.
    #[error("Unexpected payment provider response: {0}")]
    BadResponse(String),

    /// The checkout amount is not chargeable.
    #[error("Invalid checkout amount: {0}")]
    InvalidAmount(f64),
}

impl From<strand_data::FetchError> for PaymentError {
    fn from(e: strand_data::FetchError) -> Self {
        PaymentError::Provider(e.to_string())
    }
}
