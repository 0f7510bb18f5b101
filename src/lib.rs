pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;
pub mod transport;

use {
    config::ServiceStatus,
    infra::{activity_log::ActivityLog, delivery_ledger::DeliveryLedger},
    services::notifier::Notifier,
    std::sync::Arc,
};

#[derive(Clone)]
pub struct AppState {
    pub webhook_secret: Arc<str>,
    pub notifier: Arc<Notifier>,
    pub activity: ActivityLog,
    pub deliveries: Arc<DeliveryLedger>,
    pub services: ServiceStatus,
}
