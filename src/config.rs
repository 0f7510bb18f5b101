use {
    crate::adapters::{airtable::AirtableSettings, gmail::GmailCredentials},
    serde::Serialize,
    thiserror::Error,
};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TABLE_NAME: &str = "Failed Payments";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
}

/// Which downstream credentials are present. Reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub payment: bool,
    pub email: bool,
    pub store: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub webhook_secret: String,
    pub stripe_secret_key: Option<String>,
    pub gmail: Option<GmailCredentials>,
    pub alert_recipient: Option<String>,
    pub alert_sender: Option<String>,
    pub airtable: Option<AirtableSettings>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        // No placeholder fallback for the signing secret.
        let webhook_secret =
            get("STRIPE_WEBHOOK_SECRET").ok_or(ConfigError::Missing("STRIPE_WEBHOOK_SECRET"))?;

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: v,
            })?,
            None => DEFAULT_PORT,
        };

        let gmail = match (
            get("GMAIL_CLIENT_ID"),
            get("GMAIL_CLIENT_SECRET"),
            get("GMAIL_REFRESH_TOKEN"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Some(GmailCredentials {
                client_id,
                client_secret,
                refresh_token,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::Incomplete(
                    "GMAIL_CLIENT_ID",
                    "GMAIL_CLIENT_SECRET and GMAIL_REFRESH_TOKEN",
                ));
            }
        };

        let airtable = match (get("AIRTABLE_API_KEY"), get("AIRTABLE_BASE_ID")) {
            (Some(api_key), Some(base_id)) => Some(AirtableSettings {
                api_key,
                base_id,
                table_name: get("AIRTABLE_TABLE_NAME")
                    .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            }),
            (None, _) => None,
            (Some(_), None) => {
                return Err(ConfigError::Incomplete("AIRTABLE_API_KEY", "AIRTABLE_BASE_ID"));
            }
        };

        Ok(Self {
            port,
            webhook_secret,
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            gmail,
            alert_recipient: get("ALERT_EMAIL_TO"),
            alert_sender: get("ALERT_EMAIL_FROM"),
            airtable,
        })
    }

    pub fn service_status(&self) -> ServiceStatus {
        ServiceStatus {
            payment: self.stripe_secret_key.is_some(),
            email: self.gmail.is_some() && self.alert_recipient.is_some(),
            store: self.airtable.is_some(),
        }
    }
}
