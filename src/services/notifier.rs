use {
    crate::{
        domain::{
            error::SinkError,
            payment::{
                EMAIL_BODY_PLACEHOLDER, EMAIL_RECORD_PLACEHOLDER, EMAIL_SUBJECT_PLACEHOLDER,
                FailedPaymentRecord,
            },
            sink::{AlertMessage, AlertSink, RecordRow, RecordSink},
        },
        infra::activity_log::ActivityLog,
    },
    std::sync::Arc,
};

pub const RECORD_STATUS: &str = "Failed";

pub fn alert_for(record: &FailedPaymentRecord) -> AlertMessage {
    let subject = format!(
        "Payment Failed Alert - {}",
        record.customer_email().unwrap_or(EMAIL_SUBJECT_PLACEHOLDER)
    );
    let body = format!(
        "A payment has failed and requires attention.\n\
         \n\
         Payment ID: {}\n\
         Customer Email: {}\n\
         Amount: {}\n\
         Failure Reason: {}\n\
         Timestamp: {}\n",
        record.payment_id(),
        record.customer_email().unwrap_or(EMAIL_BODY_PLACEHOLDER),
        record.money(),
        record.failure_reason(),
        record.timestamp(),
    );
    AlertMessage { subject, body }
}

pub fn row_for(record: &FailedPaymentRecord) -> RecordRow {
    RecordRow {
        payment_id: record.payment_id().to_string(),
        customer_email: record
            .customer_email()
            .unwrap_or(EMAIL_RECORD_PLACEHOLDER)
            .to_string(),
        amount: record.amount().major_units(),
        currency: record.currency().display_code(),
        failure_reason: record.failure_reason().to_string(),
        timestamp: record.timestamp(),
        status: RECORD_STATUS,
    }
}

/// Outcome of both side effects for one record.
#[derive(Debug)]
pub struct DispatchReport {
    pub alert: Result<(), SinkError>,
    pub record: Result<(), SinkError>,
}

impl DispatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.alert.is_ok() && self.record.is_ok()
    }

    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "alert": self.alert.is_ok(),
            "record": self.record.is_ok(),
        })
    }
}

pub struct Notifier {
    alerts: Arc<dyn AlertSink>,
    records: Arc<dyn RecordSink>,
    activity: ActivityLog,
}

impl Notifier {
    pub fn new(alerts: Arc<dyn AlertSink>, records: Arc<dyn RecordSink>, activity: ActivityLog) -> Self {
        Self {
            alerts,
            records,
            activity,
        }
    }

    /// Sends the alert, then writes the record. Neither result gates the other
    /// and failures end up in the activity log, not in the return path.
    pub async fn dispatch(&self, record: &FailedPaymentRecord) -> DispatchReport {
        let payment_id = record.payment_id();

        let alert = self.alerts.send_alert(&alert_for(record)).await;
        match &alert {
            Ok(()) => self
                .activity
                .info(format!("Alert email sent for payment {payment_id}")),
            Err(e) => self
                .activity
                .error(format!("Failed to send alert email for payment {payment_id}: {e}")),
        }

        let written = self.records.write_record(&row_for(record)).await;
        match &written {
            Ok(()) => self
                .activity
                .info(format!("Record saved for payment {payment_id}")),
            Err(e) => self
                .activity
                .error(format!("Failed to save record for payment {payment_id}: {e}")),
        }

        DispatchReport {
            alert,
            record: written,
        }
    }
}
