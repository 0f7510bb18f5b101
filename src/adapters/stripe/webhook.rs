use {
    crate::{
        AppState,
        adapters::stripe::signature::{self, SIGNATURE_HEADER, SignatureError},
        domain::{error::PipelineError, event::WebhookEnvelope},
        services::payment_pipeline::{WebhookOutcome, process_webhook},
        transport::http::errors::ApiError,
    },
    axum::{Json, body::Bytes, extract::State, http::HeaderMap},
};

/// Verifies the signature and parses the envelope. No side effects.
pub fn verify_and_parse(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<WebhookEnvelope, PipelineError> {
    let body = std::str::from_utf8(body)
        .map_err(|e| PipelineError::MalformedPayload(format!("body is not valid UTF-8: {e}")))?;

    let sig = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PipelineError::WebhookSignature(SignatureError::MissingHeader.to_string()))?;

    signature::verify(
        body,
        sig,
        &state.webhook_secret,
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| PipelineError::WebhookSignature(e.to_string()))?;

    WebhookEnvelope::parse(body)
}

#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event_id = tracing::field::Empty, event_type = tracing::field::Empty)
)]
pub async fn wh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let envelope = match verify_and_parse(&state, &headers, &body) {
        Ok(envelope) => envelope,
        Err(e) => {
            state.activity.error(format!("Webhook rejected: {e}"));
            return Err(e.into());
        }
    };

    tracing::Span::current()
        .record(
            "event_id",
            tracing::field::display(envelope.id.as_deref().unwrap_or("-")),
        )
        .record("event_type", tracing::field::display(&envelope.event_type));

    match process_webhook(&state, &envelope).await {
        WebhookOutcome::Dispatched { record, report } => {
            tracing::info!(
                payment_id = %record.payment_id(),
                alert_ok = report.alert.is_ok(),
                record_ok = report.record.is_ok(),
                "failed payment relayed"
            );
        }
        WebhookOutcome::Ignored => tracing::debug!("event acknowledged without action"),
        WebhookOutcome::Duplicate => tracing::info!("duplicate event, already processed"),
    }

    Ok(Json(serde_json::json!({"received": true})))
}
