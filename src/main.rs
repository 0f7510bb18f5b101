use {
    payment_alerts::{
        AppState,
        adapters::{
            airtable::AirtableStore,
            disabled::DisabledSink,
            gmail::GmailMailer,
        },
        config::Config,
        domain::sink::{AlertSink, RecordSink},
        infra::{
            activity_log::{ACTIVITY_LOG_CAPACITY, ActivityLog},
            delivery_ledger::DeliveryLedger,
        },
        services::notifier::Notifier,
        transport,
    },
    std::{sync::Arc, time::Duration},
    tokio::signal,
    tracing_subscriber::EnvFilter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let activity = ActivityLog::new(ACTIVITY_LOG_CAPACITY);
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let alerts = alert_sink(&config, http.clone(), &activity).await;
    let records = record_sink(&config, http, &activity);

    let state = AppState {
        webhook_secret: config.webhook_secret.as_str().into(),
        notifier: Arc::new(Notifier::new(alerts, records, activity.clone())),
        activity,
        deliveries: Arc::new(DeliveryLedger::default()),
        services: config.service_status(),
    };

    let app = transport::http::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn alert_sink(config: &Config, http: reqwest::Client, activity: &ActivityLog) -> Arc<dyn AlertSink> {
    let (Some(credentials), Some(recipient)) = (&config.gmail, &config.alert_recipient) else {
        tracing::warn!("email credentials or ALERT_EMAIL_TO missing, alerts disabled");
        return Arc::new(DisabledSink("email"));
    };

    let mailer = GmailMailer::new(
        http,
        credentials.clone(),
        recipient.clone(),
        config.alert_sender.clone(),
    );
    if let Err(e) = mailer.authorize().await {
        activity.error(format!(
            "Email service authorization failed, retrying on next alert: {e}"
        ));
    }
    Arc::new(mailer)
}

fn record_sink(config: &Config, http: reqwest::Client, activity: &ActivityLog) -> Arc<dyn RecordSink> {
    let Some(settings) = &config.airtable else {
        tracing::warn!("AIRTABLE_API_KEY missing, record store disabled");
        return Arc::new(DisabledSink("store"));
    };

    match AirtableStore::new(http, settings) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            activity.error(format!("Record store setup failed: {e}"));
            Arc::new(DisabledSink("store"))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
