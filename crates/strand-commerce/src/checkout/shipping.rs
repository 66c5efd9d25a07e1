//! Shipping-details validation.
//!
//! The checkout form is validated against a fixed schema before anything
//! external is contacted. Failures come back as a field-keyed message
//! map; messages are the shop's Icelandic copy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MSG_EMAIL: &str = "Vinsamlegast sláðu inn gilt netfang";
const MSG_FIRST_NAME: &str = "Fornafn er nauðsynlegt";
const MSG_LAST_NAME: &str = "Eftirnafn er nauðsynlegt";
const MSG_KENNITALA_LENGTH: &str = "Kennitala verður að vera 10 tölustafir";
const MSG_KENNITALA_DIGITS: &str = "Kennitala verður að vera tölustafir eingöngu";
const MSG_ADDRESS: &str = "Heimilisfang er nauðsynlegt";
const MSG_CITY: &str = "Sveitarfélag er nauðsynlegt";

/// Raw shipping form input, as posted by the checkout page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Icelandic national identifier, exactly 10 digits.
    pub kennitala: String,
    pub address: String,
    pub apartment: Option<String>,
    pub city: String,
    pub save_info: bool,
    pub marketing_opt_in: bool,
}

/// Validated shipping details, persisted with the checkout record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub kennitala: String,
    pub address: String,
    pub apartment: Option<String>,
    pub city: String,
    pub save_info: bool,
    pub marketing_opt_in: bool,
}

impl ShippingDetails {
    /// Full name for notifications and labels.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Field-keyed validation errors. Keys match the form's JSON field names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShippingErrors(pub BTreeMap<String, String>);

impl ShippingErrors {
    /// Check whether any field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message for a field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }
}

/// Validate a shipping form.
///
/// Returns the validated details, or a map of field name to message with
/// an entry per failing field. The last failing rule of a field wins,
/// matching the original schema's issue ordering.
pub fn validate_shipping(form: &ShippingForm) -> Result<ShippingDetails, ShippingErrors> {
    let mut errors = ShippingErrors::default();

    if !is_valid_email(&form.email) {
        errors.insert("email", MSG_EMAIL);
    }
    if form.first_name.trim().is_empty() {
        errors.insert("firstName", MSG_FIRST_NAME);
    }
    if form.last_name.trim().is_empty() {
        errors.insert("lastName", MSG_LAST_NAME);
    }
    if form.kennitala.chars().count() != 10 {
        errors.insert("kennitala", MSG_KENNITALA_LENGTH);
    }
    if !form.kennitala.chars().all(|c| c.is_ascii_digit()) {
        errors.insert("kennitala", MSG_KENNITALA_DIGITS);
    }
    if form.address.trim().is_empty() {
        errors.insert("address", MSG_ADDRESS);
    }
    if form.city.trim().is_empty() {
        errors.insert("city", MSG_CITY);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ShippingDetails {
        email: form.email.clone(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        kennitala: form.kennitala.clone(),
        address: form.address.clone(),
        apartment: form.apartment.clone(),
        city: form.city.clone(),
        save_info: form.save_info,
        marketing_opt_in: form.marketing_opt_in,
    })
}

/// RFC-shape email check: one '@', non-empty local part, and a dot in a
/// non-empty domain. Deliverability is the mail system's problem.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}
