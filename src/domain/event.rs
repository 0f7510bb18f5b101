use {
    super::{error::PipelineError, id::EventId},
    derive_more::Display,
    serde::Deserialize,
    serde_json::{Map, Value},
};

/// The part of a Stripe event this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub id: Option<String>, // evt_xxx
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Map<String, Value>,
}

impl WebhookEnvelope {
    pub fn parse(body: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(body).map_err(|e| PipelineError::MalformedPayload(e.to_string()))
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_type(&self.event_type)
    }

    /// `None` when the id is absent or not a Stripe event id.
    pub fn event_id(&self) -> Option<EventId> {
        self.id.as_deref().and_then(|id| EventId::new(id).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EventKind {
    #[display("payment_intent.payment_failed")]
    PaymentIntentFailed,

    #[display("charge.failed")]
    ChargeFailed,

    #[display("invoice.payment_failed")]
    InvoicePaymentFailed,

    #[display("other")]
    Other,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            "charge.failed" => Self::ChargeFailed,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            _ => Self::Other,
        }
    }

    pub fn is_payment_failure(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Returns the embedded payment object for failure events, `None` for everything else.
pub fn classify(envelope: &WebhookEnvelope) -> Option<&Map<String, Value>> {
    envelope
        .kind()
        .is_payment_failure()
        .then_some(&envelope.data.object)
}
