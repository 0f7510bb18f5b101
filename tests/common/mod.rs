#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use payment_alerts::{
    AppState,
    config::ServiceStatus,
    domain::{
        error::SinkError,
        sink::{AlertMessage, AlertSink, RecordRow, RecordSink, SinkFuture},
    },
    infra::{
        activity_log::{ACTIVITY_LOG_CAPACITY, ActivityLog, LogLevel},
        delivery_ledger::DeliveryLedger,
    },
    services::notifier::Notifier,
    transport,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const SECRET: &str = "whsec_test123secret456";

/// Alert sink that remembers what it was asked to send.
#[derive(Default)]
pub struct RecordingAlerts {
    pub sent: Mutex<Vec<AlertMessage>>,
    pub fail: bool,
}

impl RecordingAlerts {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> AlertMessage {
        self.sent.lock().unwrap().last().cloned().expect("no alert sent")
    }
}

impl AlertSink for RecordingAlerts {
    fn send_alert<'a>(&'a self, alert: &'a AlertMessage) -> SinkFuture<'a> {
        self.sent.lock().unwrap().push(alert.clone());
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(SinkError::Other("smtp is down".into()))
            } else {
                Ok(())
            }
        })
    }
}

/// Record sink that remembers the rows it was given.
#[derive(Default)]
pub struct RecordingRecords {
    pub rows: Mutex<Vec<RecordRow>>,
    pub fail: bool,
}

impl RecordingRecords {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn last(&self) -> RecordRow {
        self.rows.lock().unwrap().last().cloned().expect("no row written")
    }
}

impl RecordSink for RecordingRecords {
    fn write_record<'a>(&'a self, row: &'a RecordRow) -> SinkFuture<'a> {
        self.rows.lock().unwrap().push(row.clone());
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(SinkError::Rejected {
                    status: 422,
                    body: "INVALID_VALUE".into(),
                })
            } else {
                Ok(())
            }
        })
    }
}

pub struct Harness {
    pub state: AppState,
    pub alerts: Arc<RecordingAlerts>,
    pub records: Arc<RecordingRecords>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_sinks(RecordingAlerts::default(), RecordingRecords::default())
    }

    pub fn with_sinks(alerts: RecordingAlerts, records: RecordingRecords) -> Self {
        let alerts = Arc::new(alerts);
        let records = Arc::new(records);
        let activity = ActivityLog::new(ACTIVITY_LOG_CAPACITY);
        let notifier = Notifier::new(alerts.clone(), records.clone(), activity.clone());

        let state = AppState {
            webhook_secret: SECRET.into(),
            notifier: Arc::new(notifier),
            activity,
            deliveries: Arc::new(DeliveryLedger::default()),
            services: ServiceStatus {
                payment: true,
                email: true,
                store: false,
            },
        };

        Self {
            state,
            alerts,
            records,
        }
    }

    pub fn app(&self) -> Router {
        transport::http::router(self.state.clone())
    }

    pub fn error_entries(&self) -> usize {
        self.state
            .activity
            .recent(usize::MAX)
            .iter()
            .filter(|e| e.level == LogLevel::Error)
            .count()
    }
}

pub fn event(id: &str, event_type: &str, object: serde_json::Value) -> String {
    serde_json::json!({
        "id": id,
        "object": "event",
        "type": event_type,
        "created": 1_700_000_000,
        "livemode": false,
        "data": { "object": object },
    })
    .to_string()
}

/// `Stripe-Signature` value as Stripe computes it.
pub fn sign(body: &str, secret: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.{body}").as_bytes());
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

pub fn signed_header(body: &str) -> String {
    sign(body, SECRET, chrono::Utc::now().timestamp())
}

pub fn webhook_request(body: impl Into<Body>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("stripe-signature", sig);
    }
    builder.body(body.into()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
