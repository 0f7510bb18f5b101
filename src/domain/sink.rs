use {
    super::error::SinkError,
    serde::Serialize,
    std::{future::Future, pin::Pin},
};

pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;

/// Plain-text alert ready to hand to an email transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

/// One row of the failed-payments table. Field names are the column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow {
    #[serde(rename = "Payment ID")]
    pub payment_id: String,
    #[serde(rename = "Customer Email")]
    pub customer_email: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Failure Reason")]
    pub failure_reason: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Status")]
    pub status: &'static str,
}

pub trait AlertSink: Send + Sync {
    fn send_alert<'a>(&'a self, alert: &'a AlertMessage) -> SinkFuture<'a>;
}

pub trait RecordSink: Send + Sync {
    fn write_record<'a>(&'a self, row: &'a RecordRow) -> SinkFuture<'a>;
}
