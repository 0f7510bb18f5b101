use {
    super::money::{Currency, Money, MoneyAmount},
    chrono::{DateTime, SecondsFormat, Utc},
};

pub const UNKNOWN_PAYMENT_ID: &str = "unknown";
pub const UNKNOWN_REASON: &str = "Unknown reason";

/// Placeholders for a missing customer email, one per rendering.
pub const EMAIL_SUBJECT_PLACEHOLDER: &str = "Unknown Customer";
pub const EMAIL_BODY_PLACEHOLDER: &str = "Not available";
pub const EMAIL_RECORD_PLACEHOLDER: &str = "Unknown";

/// Canonical failed payment, built once per qualifying event.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPaymentRecord {
    payment_id: String,
    customer_email: Option<String>,
    money: Money,
    failure_reason: String,
    captured_at: DateTime<Utc>,
}

impl FailedPaymentRecord {
    pub fn new(
        payment_id: String,
        customer_email: Option<String>,
        money: Money,
        failure_reason: String,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            payment_id,
            customer_email,
            money,
            failure_reason,
            captured_at,
        }
    }

    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_email.as_deref()
    }

    pub fn money(&self) -> &Money {
        &self.money
    }

    pub fn amount(&self) -> MoneyAmount {
        self.money.amount()
    }

    pub fn currency(&self) -> &Currency {
        self.money.currency()
    }

    pub fn failure_reason(&self) -> &str {
        &self.failure_reason
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// ISO-8601 with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
    pub fn timestamp(&self) -> String {
        self.captured_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "payment_id": self.payment_id,
            "customer_email": self.customer_email.as_deref().unwrap_or(EMAIL_RECORD_PLACEHOLDER),
            "amount": self.amount().major_units(),
            "currency": self.currency().display_code(),
            "failure_reason": self.failure_reason,
            "timestamp": self.timestamp(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn summary_uses_major_units_and_upper_currency() {
        let record = FailedPaymentRecord::new(
            "pi_1".into(),
            None,
            Money::new(MoneyAmount::new(2500).unwrap(), Currency::new("usd")),
            "card_declined".into(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        );
        let s = record.summary();
        assert_eq!(s["amount"], 25.0);
        assert_eq!(s["currency"], "USD");
        assert_eq!(s["customer_email"], "Unknown");
        assert_eq!(s["timestamp"], "2024-05-01T12:00:00.000Z");
    }
}
