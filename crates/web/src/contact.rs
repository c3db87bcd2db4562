//! Contact form delivery

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use storefront_common::render::escape;

use crate::config::ContactConfig;

/// Contact form submission errors
#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Service timeout, please try again later")]
    Timeout,

    #[error("Failed to send message: {0}")]
    Delivery(String),
}

/// Raw form fields as posted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// A complete submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// All three fields must be present and non-blank.
    pub fn validate(self) -> Result<ContactMessage, ContactError> {
        fn field(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }

        match (field(self.name), field(self.email), field(self.message)) {
            (Some(name), Some(email), Some(message)) => Ok(ContactMessage {
                name,
                email,
                message,
            }),
            _ => Err(ContactError::MissingFields),
        }
    }
}

impl ContactMessage {
    /// Notification body in Telegram's HTML subset.
    pub fn to_html(&self) -> String {
        format!(
            "<b>📩 New Contact Form Submission</b>\n\n\
             Here's a new inquiry from your website contact page:\n\n\
             👤 <b>Name:</b> {}\n\
             📧 <b>Email:</b> {}\n\
             💬 <b>Message:</b>\n{}\n\n\
             ---------------------------------------\n\
             <i>Sent automatically from your website contact form.</i>",
            escape(&self.name),
            escape(&self.email),
            escape(&self.message),
        )
    }
}

/// Somewhere to deliver contact messages
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &ContactMessage) -> Result<(), ContactError>;

    fn name(&self) -> &'static str;
}

/// Posts to the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Telegram Bot")
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: message.to_html(),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let result = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_timeout() => Err(ContactError::Timeout),
            // Strip the URL: it carries the bot token.
            Err(e) => Err(ContactError::Delivery(e.without_url().to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// Logs submissions only. Used when no bot credentials are configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
        info!(
            name = %message.name,
            email = %message.email,
            "Contact message received ({} chars)",
            message.message.len()
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Build the notifier the configuration asks for.
pub fn notifier_from_config(cfg: &ContactConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    match (&cfg.telegram_token, &cfg.telegram_chat_id) {
        (Some(token), Some(chat_id)) => Ok(Arc::new(TelegramNotifier::new(
            cfg.telegram_api_base.clone(),
            token.clone(),
            chat_id.clone(),
            Duration::from_secs(cfg.timeout_secs),
        )?)),
        _ => {
            warn!("No Telegram credentials configured; contact messages will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::net::SocketAddr;
    use test_case::test_case;
    use tokio::sync::Mutex;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        let opt = |s: &str| Some(s.to_string());
        ContactForm {
            name: opt(name),
            email: opt(email),
            message: opt(message),
        }
    }

    #[test_case("", "a@b.c", "hi" ; "blank name")]
    #[test_case("Ann", "  ", "hi" ; "whitespace email")]
    #[test_case("Ann", "a@b.c", "" ; "empty message")]
    fn test_validate_rejects_missing(name: &str, email: &str, message: &str) {
        assert!(matches!(
            form(name, email, message).validate(),
            Err(ContactError::MissingFields)
        ));
    }

    #[test]
    fn test_validate_rejects_absent_field() {
        let f = ContactForm {
            name: Some("Ann".to_string()),
            ..ContactForm::default()
        };
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_html_escapes_user_input() {
        let msg = form("<b>Ann</b>", "a@b.c", "5 > 3 & done").validate().unwrap();
        let html = msg.to_html();
        assert!(html.contains("&lt;b&gt;Ann&lt;/b&gt;"));
        assert!(html.contains("5 &gt; 3 &amp; done"));
        assert!(html.starts_with("<b>"));
    }

    #[test]
    fn test_without_credentials_logs_only() {
        let notifier = notifier_from_config(&ContactConfig::default()).unwrap();
        assert_eq!(notifier.name(), "log");
    }

    type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn spawn_bot(status: StatusCode) -> (SocketAddr, Captured) {
        let captured: Captured = Arc::default();
        let router = Router::new()
            .route(
                "/bottest-token/sendMessage",
                post(
                    move |State(c): State<Captured>, Json(body): Json<serde_json::Value>| async move {
                        c.lock().await.push(body);
                        status
                    },
                ),
            )
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (addr, captured)
    }

    #[tokio::test]
    async fn test_telegram_payload() {
        let (addr, captured) = spawn_bot(StatusCode::OK).await;
        let notifier = TelegramNotifier::new(
            format!("http://{}", addr),
            "test-token",
            "@support",
            Duration::from_secs(5),
        )
        .unwrap();

        let msg = form("Ann", "ann@example.com", "Do you ship abroad?")
            .validate()
            .unwrap();
        notifier.send(&msg).await.unwrap();

        let bodies = captured.lock().await;
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["chat_id"], "@support");
        assert_eq!(bodies[0]["parse_mode"], "HTML");
        assert_eq!(bodies[0]["disable_web_page_preview"], true);
        assert!(bodies[0]["text"]
            .as_str()
            .unwrap()
            .contains("Do you ship abroad?"));
    }

    #[tokio::test]
    async fn test_telegram_rejection_is_delivery_error() {
        let (addr, _) = spawn_bot(StatusCode::UNAUTHORIZED).await;
        let notifier = TelegramNotifier::new(
            format!("http://{}", addr),
            "test-token",
            "@support",
            Duration::from_secs(5),
        )
        .unwrap();

        let msg = form("Ann", "ann@example.com", "hello").validate().unwrap();
        let err = notifier.send(&msg).await.unwrap_err();
        assert!(matches!(err, ContactError::Delivery(_)));
        assert!(!err.to_string().contains("test-token"));
    }
}
