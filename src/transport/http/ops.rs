use {
    crate::{
        AppState,
        services::payment_pipeline::{process_failed_payment, sample_failed_payment},
    },
    axum::{Json, extract::State},
    chrono::{SecondsFormat, Utc},
};

pub const LOGS_PAGE: usize = 50;

pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Failed payment alert service",
        "status": "running",
        "endpoints": {
            "health": "GET /health",
            "logs": "GET /logs",
            "webhook": "POST /webhook",
            "test": "POST /test",
        },
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "services": state.services,
    }))
}

pub async fn logs(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "logs": state.activity.recent(LOGS_PAGE) }))
}

/// Pushes a fixed synthetic failed payment through normalization and both sinks.
pub async fn test_payment(State(state): State<AppState>) -> Json<serde_json::Value> {
    let payment = sample_failed_payment(Utc::now().timestamp_millis());
    state.activity.info("Running test failed payment");

    let (record, report) = process_failed_payment(&state.notifier, &state.activity, &payment).await;

    Json(serde_json::json!({
        "success": true,
        "message": "Test failed payment processed",
        "payment": payment,
        "record": record.summary(),
        "sinks": report.summary(),
    }))
}
