use {
    crate::{
        AppState,
        domain::{
            event::{WebhookEnvelope, classify},
            payment::FailedPaymentRecord,
        },
        infra::activity_log::ActivityLog,
        services::{
            normalizer::normalize,
            notifier::{DispatchReport, Notifier},
        },
    },
    serde_json::{Map, Value},
};

#[derive(Debug)]
pub enum WebhookOutcome {
    Dispatched {
        record: FailedPaymentRecord,
        report: DispatchReport,
    },
    Ignored,
    Duplicate,
}

/// Runs a verified event through de-duplication, classification,
/// normalization and dispatch. Never fails: sink errors are logged by the
/// notifier and reported in the outcome.
pub async fn process_webhook(state: &AppState, envelope: &WebhookEnvelope) -> WebhookOutcome {
    state
        .activity
        .info(format!("Received webhook event: {}", envelope.event_type));

    match envelope.event_id() {
        Some(event_id) => {
            if !state.deliveries.first_delivery(&event_id) {
                state
                    .activity
                    .info(format!("Duplicate delivery of {event_id}, skipped"));
                return WebhookOutcome::Duplicate;
            }
        }
        None => tracing::warn!("event without a valid id, de-duplication skipped"),
    }

    let Some(object) = classify(envelope) else {
        tracing::debug!(event_type = %envelope.event_type, "not a payment failure, ignored");
        return WebhookOutcome::Ignored;
    };

    let (record, report) = process_failed_payment(&state.notifier, &state.activity, object).await;
    WebhookOutcome::Dispatched { record, report }
}

pub async fn process_failed_payment(
    notifier: &Notifier,
    activity: &ActivityLog,
    object: &Map<String, Value>,
) -> (FailedPaymentRecord, DispatchReport) {
    let record = normalize(object);
    activity.info(format!(
        "Processing failed payment: {} ({})",
        record.payment_id(),
        record.money()
    ));

    let report = notifier.dispatch(&record).await;
    if !report.all_succeeded() {
        tracing::warn!(payment_id = %record.payment_id(), "failed payment relayed with sink errors");
    }
    (record, report)
}

/// Fixed synthetic payment object used by `POST /test`.
pub fn sample_failed_payment(now_millis: i64) -> Map<String, Value> {
    serde_json::json!({
        "id": format!("test_payment_{now_millis}"),
        "customer_email": "test@example.com",
        "amount": 2500,
        "currency": "usd",
        "failure_message": "Test failed payment - insufficient funds",
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}
