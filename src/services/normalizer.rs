//! Maps a Stripe payment object (PaymentIntent, Charge or Invoice) onto a
//! [`FailedPaymentRecord`].
//!
//! Every field is resolved from an ordered list of JSON pointers; the first one
//! that yields a usable value wins. The order decides what a human reads in the
//! alert, so changes here are behavior changes.

use {
    crate::domain::{
        money::{Currency, Money, MoneyAmount},
        payment::{FailedPaymentRecord, UNKNOWN_PAYMENT_ID, UNKNOWN_REASON},
    },
    chrono::{DateTime, Utc},
    serde_json::{Map, Value},
};

pub const PAYMENT_ID_SOURCES: &[&str] = &["/id"];
pub const EMAIL_SOURCES: &[&str] = &["/customer_email", "/receipt_email"];
pub const AMOUNT_SOURCES: &[&str] = &["/amount", "/amount_due"];
pub const CURRENCY_SOURCES: &[&str] = &["/currency"];
pub const REASON_SOURCES: &[&str] = &[
    "/failure_message",
    "/outcome/seller_message",
    "/last_payment_error/message",
];

pub fn normalize(object: &Map<String, Value>) -> FailedPaymentRecord {
    normalize_at(object, Utc::now())
}

/// Pure variant with an explicit capture time.
pub fn normalize_at(object: &Map<String, Value>, captured_at: DateTime<Utc>) -> FailedPaymentRecord {
    let payment_id = first_text(object, PAYMENT_ID_SOURCES).unwrap_or_else(|| {
        tracing::warn!("payment object has no id, using placeholder");
        UNKNOWN_PAYMENT_ID.to_string()
    });

    let customer_email = first_text(object, EMAIL_SOURCES);

    let amount = first_amount(object, AMOUNT_SOURCES).unwrap_or(MoneyAmount::ZERO);

    let currency = first_text(object, CURRENCY_SOURCES)
        .map(|c| Currency::new(&c))
        .unwrap_or_default();

    let failure_reason =
        first_text(object, REASON_SOURCES).unwrap_or_else(|| UNKNOWN_REASON.to_string());

    FailedPaymentRecord::new(
        payment_id,
        customer_email,
        Money::new(amount, currency),
        failure_reason,
        captured_at,
    )
}

fn lookup<'a>(object: &'a Map<String, Value>, pointer: &str) -> Option<&'a Value> {
    let mut segments = pointer.trim_start_matches('/').split('/');
    let head = object.get(segments.next()?)?;
    segments.try_fold(head, |value, key| value.get(key))
}

/// First non-empty string among `sources`.
fn first_text(object: &Map<String, Value>, sources: &[&str]) -> Option<String> {
    sources.iter().find_map(|pointer| {
        lookup(object, pointer)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First usable minor-unit amount among `sources`. Fractions are floored,
/// negatives are skipped.
fn first_amount(object: &Map<String, Value>, sources: &[&str]) -> Option<MoneyAmount> {
    sources.iter().find_map(|pointer| {
        let value = lookup(object, pointer)?;
        let cents = match value.as_i64() {
            Some(cents) => cents,
            None => {
                let f = value.as_f64()?;
                if !f.is_finite() || f > i64::MAX as f64 {
                    return None;
                }
                f.floor() as i64
            }
        };
        match MoneyAmount::new(cents) {
            Ok(amount) => Some(amount),
            Err(e) => {
                tracing::warn!(pointer, "ignoring amount: {e}");
                None
            }
        }
    })
}
