use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{debug, info};
use std::env;

/// SMTP configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl EmailConfig {
    /// Load email configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let smtp_username = env::var("SMTP_USERNAME").map_err(|_| "SMTP_USERNAME is required")?;
        Ok(Self {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "465".to_string())
                .parse()
                .map_err(|_| "SMTP_PORT must be a valid number")?,
            smtp_password: env::var("SMTP_PASSWORD").map_err(|_| "SMTP_PASSWORD is required")?,
            from_email: env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| smtp_username.clone()),
            smtp_username,
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "ScholarFlow".to_string()),
        })
    }
}

/// Outbound mail used by the account flows.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(
        &self,
        to_email: &str,
        name: &str,
        otp_code: &str,
    ) -> Result<(), String>;

    async fn send_password_reset_email(
        &self,
        to_email: &str,
        name: &str,
        reset_token: &str,
        reset_url: &str,
    ) -> Result<(), String>;
}

/// Email service sending through a pooled SMTP transport
pub struct EmailService {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        // implicit TLS (SMTPS) relay
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
            .credentials(creds)
            .port(config.smtp_port)
            .build();

        info!(
            "Email transport ready via {}:{}",
            config.smtp_host, config.smtp_port
        );

        Ok(Self { config, transport })
    }

    /// Send a multipart (plain text + HTML) email
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), String> {
        let from_address = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from_address
                    .parse()
                    .map_err(|e| format!("Invalid from address: {}", e))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| format!("Invalid to address: {}", e))?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text_body, html_body))
            .map_err(|e| format!("Failed to build email: {}", e))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| format!("Failed to send email: {}", e))?;

        debug!("Sent '{}' to {}", subject, to_email);
        Ok(())
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send_verification_email(
        &self,
        to_email: &str,
        name: &str,
        otp_code: &str,
    ) -> Result<(), String> {
        let (text, html) = verification_bodies(name, otp_code);
        self.send_email(to_email, "Email Verification - ScholarFlow", text, html)
            .await
    }

    async fn send_password_reset_email(
        &self,
        to_email: &str,
        name: &str,
        reset_token: &str,
        reset_url: &str,
    ) -> Result<(), String> {
        let (text, html) = reset_bodies(name, reset_token, reset_url);
        self.send_email(to_email, "Password Reset - ScholarFlow", text, html)
            .await
    }
}

fn verification_bodies(name: &str, otp_code: &str) -> (String, String) {
    let text = format!(
        "Hello {name},\n\n\
        Welcome to ScholarFlow! To complete your registration, please verify your email address.\n\n\
        Your verification code is: {otp_code}\n\n\
        This code is valid for 10 minutes only. Never share it with anyone.\n\n\
        If you didn't request this, please ignore this email.\n\n\
        ScholarFlow Team"
    );
    let html = format!(
        "<!DOCTYPE html><html><body style=\"font-family: Arial, sans-serif; color: #333;\">\
        <h1 style=\"color: #667eea;\">Verify Your Email</h1>\
        <p>Hello <strong>{name}</strong>,</p>\
        <p>Welcome to <strong>ScholarFlow</strong>! Enter the code below to complete your registration:</p>\
        <p style=\"font-size: 40px; font-weight: bold; letter-spacing: 10px; font-family: 'Courier New', monospace;\">{otp_code}</p>\
        <p><strong>This code is valid for 10 minutes only.</strong></p>\
        <p>If you didn't create an account with ScholarFlow, you can safely ignore this email.</p>\
        </body></html>",
        name = html_escape(name),
    );
    (text, html)
}

fn reset_bodies(name: &str, reset_token: &str, reset_url: &str) -> (String, String) {
    let text = format!(
        "Hello {name},\n\n\
        We received a request to reset your ScholarFlow password.\n\n\
        Open this link to choose a new password: {reset_url}\n\
        Or use this reset token: {reset_token}\n\n\
        The link expires in 10 minutes. If you didn't request a reset, you can ignore this email.\n\n\
        ScholarFlow Team"
    );
    let html = format!(
        "<!DOCTYPE html><html><body style=\"font-family: Arial, sans-serif; color: #333;\">\
        <h1 style=\"color: #667eea;\">Password Reset</h1>\
        <p>Hello <strong>{name}</strong>,</p>\
        <p>We received a request to reset your ScholarFlow password.</p>\
        <p><a href=\"{reset_url}\" style=\"padding: 12px 30px; background: #667eea; color: white; text-decoration: none; border-radius: 5px;\">Choose a new password</a></p>\
        <p>Reset token: <code>{reset_token}</code></p>\
        <p>The link expires in 10 minutes. If you didn't request a reset, you can ignore this email.</p>\
        </body></html>",
        name = html_escape(name),
    );
    (text, html)
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
pub use recording::{RecordingMailer, SentEmail};

#[cfg(test)]
mod recording {
    use super::Mailer;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SentEmail {
        Verification { to: String, otp: String },
        PasswordReset { to: String, token: String },
    }

    /// Keeps every message in memory; can be told to fail.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<SentEmail>>,
        failing: AtomicBool,
    }

    impl RecordingMailer {
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn sent(&self) -> Vec<SentEmail> {
            self.sent.lock().unwrap().clone()
        }

        pub fn last_otp_for(&self, email: &str) -> Option<String> {
            self.sent().into_iter().rev().find_map(|m| match m {
                SentEmail::Verification { to, otp } if to == email => Some(otp),
                _ => None,
            })
        }

        pub fn last_reset_token_for(&self, email: &str) -> Option<String> {
            self.sent().into_iter().rev().find_map(|m| match m {
                SentEmail::PasswordReset { to, token } if to == email => Some(token),
                _ => None,
            })
        }

        fn record(&self, email: SentEmail) -> Result<(), String> {
            if self.failing.load(Ordering::SeqCst) {
                return Err("smtp unavailable".to_string());
            }
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_verification_email(
            &self,
            to_email: &str,
            _name: &str,
            otp_code: &str,
        ) -> Result<(), String> {
            self.record(SentEmail::Verification {
                to: to_email.to_string(),
                otp: otp_code.to_string(),
            })
        }

        async fn send_password_reset_email(
            &self,
            to_email: &str,
            _name: &str,
            reset_token: &str,
            _reset_url: &str,
        ) -> Result<(), String> {
            self.record(SentEmail::PasswordReset {
                to: to_email.to_string(),
                token: reset_token.to_string(),
            })
        }
    }
}
