use crate::domain::{
    error::SinkError,
    sink::{AlertMessage, AlertSink, RecordRow, RecordSink, SinkFuture},
};

/// Stands in for a sink whose credentials are missing. Every call fails.
#[derive(Debug, Clone, Copy)]
pub struct DisabledSink(pub &'static str);

impl AlertSink for DisabledSink {
    fn send_alert<'a>(&'a self, _alert: &'a AlertMessage) -> SinkFuture<'a> {
        let name = self.0;
        Box::pin(async move { Err(SinkError::NotConfigured(name)) })
    }
}

impl RecordSink for DisabledSink {
    fn write_record<'a>(&'a self, _row: &'a RecordRow) -> SinkFuture<'a> {
        let name = self.0;
        Box::pin(async move { Err(SinkError::NotConfigured(name)) })
    }
}
