//! Alert delivery through the Gmail API.
//!
//! The mailer holds the OAuth refresh token and caches the short-lived access
//! token it yields. The cached token is reused until it is close to expiry
//! (or the API rejects it) and then exchanged again before the next send.

use {
    crate::domain::{
        error::SinkError,
        sink::{AlertMessage, AlertSink, SinkFuture},
    },
    base64::{Engine, engine::general_purpose::URL_SAFE},
    chrono::{DateTime, TimeDelta, Utc},
    lettre::{
        Message,
        message::{Mailbox, header::ContentType},
    },
    reqwest::StatusCode,
    serde::Deserialize,
    tokio::sync::Mutex,
};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

/// Tokens are refreshed this long before their reported expiry.
const REFRESH_MARGIN_SECS: i64 = 60;
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;
const MAX_EXPIRES_IN_SECS: i64 = 86_400;

#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    DEFAULT_EXPIRES_IN_SECS
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn issued_at(value: String, expires_in: i64, now: DateTime<Utc>) -> Self {
        let lifetime = TimeDelta::seconds(expires_in.clamp(0, MAX_EXPIRES_IN_SECS));
        Self {
            value,
            expires_at: now + lifetime,
        }
    }

    fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

pub struct GmailMailer {
    client: reqwest::Client,
    credentials: GmailCredentials,
    recipient: String,
    sender: Option<String>,
    token_url: String,
    send_url: String,
    token: Mutex<Option<AccessToken>>,
}

impl GmailMailer {
    pub fn new(
        client: reqwest::Client,
        credentials: GmailCredentials,
        recipient: String,
        sender: Option<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            recipient,
            sender,
            token_url: TOKEN_URL.to_string(),
            send_url: SEND_URL.to_string(),
            token: Mutex::new(None),
        }
    }

    pub fn with_endpoints(mut self, token_url: impl Into<String>, send_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.send_url = send_url.into();
        self
    }

    /// Obtains an access token now. A failure leaves the mailer usable; the
    /// exchange is retried on the next send.
    pub async fn authorize(&self) -> Result<(), SinkError> {
        self.access_token().await.map(drop)
    }

    async fn access_token(&self) -> Result<String, SinkError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_usable_at(Utc::now())) {
            return Ok(token.value.clone());
        }

        let token = self.exchange_refresh_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn exchange_refresh_token(&self) -> Result<AccessToken, SinkError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];

        let response = self.client.post(&self.token_url).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Authorization(format!(
                "token refresh failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SinkError::Authorization(e.to_string()))?;

        tracing::info!(expires_in = token.expires_in, "gmail access token acquired");
        Ok(AccessToken::issued_at(token.access_token, token.expires_in, Utc::now()))
    }

    async fn send(&self, alert: &AlertMessage) -> Result<(), SinkError> {
        let raw = encode_message(&self.recipient, self.sender.as_deref(), alert)?;
        let token = self.access_token().await?;

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
        }
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

impl AlertSink for GmailMailer {
    fn send_alert<'a>(&'a self, alert: &'a AlertMessage) -> SinkFuture<'a> {
        Box::pin(self.send(alert))
    }
}

// Header values come partly from webhook payloads.
fn header_value(value: &str) -> String {
    value.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// RFC 2822 message, base64url-encoded as the `raw` field expects.
/// Without an explicit sender the recipient is used as `From`.
pub fn encode_message(to: &str, from: Option<&str>, alert: &AlertMessage) -> Result<String, SinkError> {
    let to: Mailbox = header_value(to).parse()?;
    let from: Mailbox = match from {
        Some(from) => header_value(from).parse()?,
        None => to.clone(),
    };

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(header_value(&alert.subject))
        .header(ContentType::TEXT_PLAIN)
        .body(alert.body.clone())?;

    Ok(URL_SAFE.encode(message.formatted()))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::{
            Json, Router,
            extract::State,
            http::{HeaderMap, header::AUTHORIZATION},
            response::{IntoResponse, Response},
            routing::post,
        },
        std::sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    fn decode(raw: &str) -> String {
        String::from_utf8(URL_SAFE.decode(raw).unwrap()).unwrap()
    }

    fn headers_of(message: &str) -> &str {
        message.split("\r\n\r\n").next().unwrap()
    }

    fn alert() -> AlertMessage {
        AlertMessage {
            subject: "Payment Failed Alert - a@example.com".into(),
            body: "Payment ID: pi_1\n".into(),
        }
    }

    #[test]
    fn encodes_headers_and_body() {
        let message = decode(&encode_message("ops@example.com", Some("bot@example.com"), &alert()).unwrap());
        let headers = headers_of(&message);

        assert!(headers.contains("From: bot@example.com"));
        assert!(headers.contains("To: ops@example.com"));
        assert!(headers.contains("Subject: Payment Failed Alert - a@example.com"));
        assert!(headers.contains("text/plain"));
        assert!(message.contains("Payment ID: pi_1"));
    }

    #[test]
    fn recipient_doubles_as_sender() {
        let message = decode(&encode_message("ops@example.com", None, &alert()).unwrap());
        assert!(headers_of(&message).contains("From: ops@example.com"));
    }

    #[test]
    fn non_ascii_subject_is_encoded() {
        let alert = AlertMessage {
            subject: "Payment Failed Alert - zoë@exämple.com".into(),
            body: "Amount: 5.00 EUR".into(),
        };
        let message = decode(&encode_message("ops@example.com", None, &alert).unwrap());

        assert!(headers_of(&message).is_ascii());
        assert!(!headers_of(&message).contains("zoë"));
    }

    #[test]
    fn strips_line_breaks_from_headers() {
        let alert = AlertMessage {
            subject: "Payment Failed Alert - x@example.com\r\nBcc: evil@example.com".into(),
            body: String::new(),
        };
        let message = decode(&encode_message("ops@example.com", None, &alert).unwrap());

        assert!(!headers_of(&message).contains("\r\nBcc:"));
    }

    #[test]
    fn invalid_recipient_is_a_sink_error() {
        assert!(matches!(
            encode_message("not an address", None, &alert()),
            Err(SinkError::Address(_))
        ));
    }

    #[test]
    fn token_is_usable_until_the_refresh_margin() {
        let issued = Utc::now();
        let token = AccessToken::issued_at("t".into(), 3600, issued);

        assert!(token.is_usable_at(issued));
        assert!(token.is_usable_at(issued + TimeDelta::seconds(3600 - REFRESH_MARGIN_SECS - 1)));
        assert!(!token.is_usable_at(issued + TimeDelta::seconds(3600 - REFRESH_MARGIN_SECS)));
        assert!(!token.is_usable_at(issued + TimeDelta::seconds(7200)));
    }

    #[test]
    fn odd_lifetimes_are_clamped() {
        let now = Utc::now();
        assert!(!AccessToken::issued_at("t".into(), -5, now).is_usable_at(now));
        assert_eq!(
            AccessToken::issued_at("t".into(), i64::MAX, now).expires_at,
            now + TimeDelta::seconds(MAX_EXPIRES_IN_SECS)
        );
    }

    // ── mailer against a local OAuth + send endpoint ────────────────────────

    #[derive(Clone, Default)]
    struct FakeGoogle {
        expires_in: i64,
        fail_first_exchange: bool,
        revoked: Option<&'static str>,
        exchanges: Arc<AtomicUsize>,
        bearers: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl FakeGoogle {
        fn exchanges(&self) -> usize {
            self.exchanges.load(Ordering::SeqCst)
        }

        fn bearers(&self) -> Vec<String> {
            self.bearers.lock().unwrap().clone()
        }
    }

    async fn token(State(fake): State<FakeGoogle>) -> Response {
        let n = fake.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        if fake.fail_first_exchange && n == 1 {
            return (axum::http::StatusCode::SERVICE_UNAVAILABLE, "try later").into_response();
        }
        Json(serde_json::json!({
            "access_token": format!("token-{n}"),
            "expires_in": fake.expires_in,
            "token_type": "Bearer",
        }))
        .into_response()
    }

    async fn send_message(State(fake): State<FakeGoogle>, headers: HeaderMap) -> axum::http::StatusCode {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .trim_start_matches("Bearer ")
            .to_string();
        fake.bearers.lock().unwrap().push(bearer.clone());

        if fake.revoked == Some(bearer.as_str()) {
            axum::http::StatusCode::UNAUTHORIZED
        } else {
            axum::http::StatusCode::OK
        }
    }

    async fn mailer_for(fake: &FakeGoogle) -> GmailMailer {
        let app = Router::new()
            .route("/token", post(token))
            .route("/send", post(send_message))
            .with_state(fake.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let credentials = GmailCredentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: "refresh".into(),
        };
        GmailMailer::new(reqwest::Client::new(), credentials, "ops@example.com".into(), None)
            .with_endpoints(format!("{base}/token"), format!("{base}/send"))
    }

    #[tokio::test]
    async fn cached_token_is_reused() {
        let fake = FakeGoogle {
            expires_in: 3600,
            ..FakeGoogle::default()
        };
        let mailer = mailer_for(&fake).await;

        mailer.authorize().await.unwrap();
        mailer.send_alert(&alert()).await.unwrap();
        mailer.send_alert(&alert()).await.unwrap();

        assert_eq!(fake.exchanges(), 1);
        assert_eq!(fake.bearers(), vec!["token-1", "token-1"]);
    }

    #[tokio::test]
    async fn token_near_expiry_is_refreshed_before_sending() {
        let fake = FakeGoogle {
            expires_in: REFRESH_MARGIN_SECS / 2,
            ..FakeGoogle::default()
        };
        let mailer = mailer_for(&fake).await;

        mailer.send_alert(&alert()).await.unwrap();
        mailer.send_alert(&alert()).await.unwrap();

        assert_eq!(fake.exchanges(), 2);
        assert_eq!(fake.bearers(), vec!["token-1", "token-2"]);
    }

    #[tokio::test]
    async fn failed_startup_exchange_is_retried_on_send() {
        let fake = FakeGoogle {
            expires_in: 3600,
            fail_first_exchange: true,
            ..FakeGoogle::default()
        };
        let mailer = mailer_for(&fake).await;

        assert!(matches!(mailer.authorize().await, Err(SinkError::Authorization(_))));
        mailer.send_alert(&alert()).await.unwrap();

        assert_eq!(fake.exchanges(), 2);
        assert_eq!(fake.bearers(), vec!["token-2"]);
    }

    #[tokio::test]
    async fn rejected_token_is_dropped_from_the_cache() {
        let fake = FakeGoogle {
            expires_in: 3600,
            revoked: Some("token-1"),
            ..FakeGoogle::default()
        };
        let mailer = mailer_for(&fake).await;

        assert!(matches!(
            mailer.send_alert(&alert()).await,
            Err(SinkError::Rejected { status: 401, .. })
        ));
        mailer.send_alert(&alert()).await.unwrap();

        assert_eq!(fake.exchanges(), 2);
        assert_eq!(fake.bearers(), vec!["token-1", "token-2"]);
    }
}
