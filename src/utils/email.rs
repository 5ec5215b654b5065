//! Outbound mail.
//!
//! The auth service only ever talks to the [`Mailer`] trait. [`SmtpMailer`]
//! delivers through `lettre`; [`LogMailer`] is used when SMTP is switched off
//! and just records that a message would have been sent. Token plaintexts are
//! never logged by either.

use std::fmt;

use async_trait::async_trait;
use athenaeum_config::EmailConfig;
use athenaeum_models::User;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("smtp transport failed: {0}")]
    Transport(String),
    #[error("mail task failed: {0}")]
    Task(String),
}

/// Which message a dispatch carries; used for logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MailKind {
    Verification,
    PasswordReset,
    PasswordResetConfirmation,
}

impl MailKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MailKind::Verification => "verification",
            MailKind::PasswordReset => "password_reset",
            MailKind::PasswordResetConfirmation => "password_reset_confirmation",
        }
    }
}

impl fmt::Display for MailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub first_name: String,
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(&self, to: &Recipient, token: &str)
    -> Result<(), MailError>;

    async fn send_password_reset_email(
        &self,
        to: &Recipient,
        token: &str,
    ) -> Result<(), MailError>;

    async fn send_password_reset_confirmation(&self, to: &Recipient) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn link(&self, page: &str, token: &str) -> String {
        format!("{}/{}?token={}", self.config.frontend_url, page, token)
    }

    #[instrument(skip(self, text_body, html_body), fields(to = %to.email))]
    async fn send_email(
        &self,
        to: &Recipient,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), MailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(from.parse().map_err(|e| MailError::Address(format!("from: {}", e)))?)
            .to(to
                .email
                .parse()
                .map_err(|e| MailError::Address(format!("to: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| MailError::Build(e.to_string()))?;

        let transport = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| MailError::Transport(e.to_string()))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| MailError::Task(e.to_string()))?
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_email(
        &self,
        to: &Recipient,
        token: &str,
    ) -> Result<(), MailError> {
        let link = self.link("verify-email", token);
        let text_body = format!(
            "Hi {},\n\n\
             Welcome to the UEW Digital Library. Please confirm your email address:\n\
             {}\n\n\
             This link will expire in 24 hours.\n\n\
             If you didn't create an account, you can ignore this email.\n\n\
             UEW Digital Library",
            to.first_name, link
        );
        let html_body = templates::verification(&to.first_name, &link);

        self.send_email(to, "Verify your email address", text_body, html_body)
            .await
    }

    async fn send_password_reset_email(
        &self,
        to: &Recipient,
        token: &str,
    ) -> Result<(), MailError> {
        let link = self.link("reset-password", token);
        let text_body = format!(
            "Hi {},\n\n\
             You requested to reset your password.\n\n\
             Click the link below to choose a new one:\n\
             {}\n\n\
             This link will expire in 1 hour.\n\n\
             If you didn't request this, please ignore this email.\n\n\
             UEW Digital Library",
            to.first_name, link
        );
        let html_body = templates::password_reset(&to.first_name, &link);

        self.send_email(to, "Password Reset Request", text_body, html_body)
            .await
    }

    async fn send_password_reset_confirmation(&self, to: &Recipient) -> Result<(), MailError> {
        let text_body = format!(
            "Hi {},\n\n\
             Your password has been successfully reset.\n\n\
             If you didn't make this change, please contact the library immediately.\n\n\
             UEW Digital Library",
            to.first_name
        );
        let html_body = templates::password_reset_confirmation(&to.first_name);

        self.send_email(to, "Password Reset Successful", text_body, html_body)
            .await
    }
}

/// Stands in for SMTP when delivery is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_email(
        &self,
        to: &Recipient,
        _token: &str,
    ) -> Result<(), MailError> {
        info!(to = %to.email, kind = %MailKind::Verification, "SMTP disabled, email not sent");
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        to: &Recipient,
        _token: &str,
    ) -> Result<(), MailError> {
        info!(to = %to.email, kind = %MailKind::PasswordReset, "SMTP disabled, email not sent");
        Ok(())
    }

    async fn send_password_reset_confirmation(&self, to: &Recipient) -> Result<(), MailError> {
        info!(
            to = %to.email,
            kind = %MailKind::PasswordResetConfirmation,
            "SMTP disabled, email not sent"
        );
        Ok(())
    }
}

mod templates {
    const BRAND: &str = "UEW Digital Library";

    fn layout(accent: &str, title: &str, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
                    <tr>
                        <td style="background-color: {accent}; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">{BRAND}</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <h2 style="margin: 0 0 20px 0; color: #333333; font-size: 24px;">{title}</h2>
                            {content}
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; border-top: 1px solid #e9ecef;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated email from the {BRAND}. Please do not reply.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#
        )
    }

    fn paragraph(text: &str) -> String {
        format!(
            r#"<p style="margin: 0 0 20px 0; color: #666666; font-size: 16px; line-height: 1.5;">{text}</p>"#
        )
    }

    /// Names come from user input.
    fn escape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }

    fn greeting(name: &str) -> String {
        paragraph(&format!("Hi <strong>{}</strong>,", escape(name)))
    }

    fn button(accent: &str, label: &str, link: &str) -> String {
        format!(
            r#"<table width="100%" cellpadding="0" cellspacing="0" style="margin: 30px 0;">
                                <tr>
                                    <td align="center">
                                        <a href="{link}" style="display: inline-block; padding: 14px 40px; background-color: {accent}; color: #ffffff; text-decoration: none; border-radius: 6px; font-size: 16px; font-weight: bold;">{label}</a>
                                    </td>
                                </tr>
                            </table>
                            <p style="margin: 0 0 10px 0; color: #666666; font-size: 14px;">Or copy and paste this link into your browser:</p>
                            <p style="margin: 0 0 20px 0; color: {accent}; font-size: 14px; word-break: break-all;">{link}</p>"#
        )
    }

    pub fn verification(name: &str, link: &str) -> String {
        let accent = "#1E3A8A";
        let content = [
            greeting(name),
            paragraph("Thanks for registering. Please confirm your email address to finish setting up your account:"),
            button(accent, "Verify Email", link),
            paragraph("<strong>This link will expire in 24 hours.</strong>"),
        ]
        .concat();
        layout(accent, "Verify your email address", &content)
    }

    pub fn password_reset(name: &str, link: &str) -> String {
        let accent = "#1E3A8A";
        let content = [
            greeting(name),
            paragraph("We received a request to reset your password. Click the button below to choose a new one:"),
            button(accent, "Reset Password", link),
            paragraph("<strong>This link will expire in 1 hour.</strong>"),
            paragraph("If you didn't request this password reset, please ignore this email."),
        ]
        .concat();
        layout(accent, "Password Reset Request", &content)
    }

    pub fn password_reset_confirmation(name: &str) -> String {
        let content = [
            greeting(name),
            paragraph("Your password has been successfully reset. You can now log in with your new password."),
            paragraph("<strong>Security Notice:</strong> If you didn't make this change, please contact the library immediately."),
        ]
        .concat();
        layout("#10B981", "Password Reset Successful", &content)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use testing::{FailingMailer, MailInbox, RecordingMailer, SentMail};

#[cfg(any(test, feature = "test-utils"))]
mod testing {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::{MailError, MailKind, Mailer, Recipient};

    /// A message captured by [`RecordingMailer`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentMail {
        pub kind: MailKind,
        pub to: String,
        pub token: Option<String>,
    }

    /// Hands every message to a [`MailInbox`] instead of delivering it.
    #[derive(Debug, Clone)]
    pub struct RecordingMailer {
        tx: mpsc::UnboundedSender<SentMail>,
    }

    #[derive(Debug)]
    pub struct MailInbox {
        rx: mpsc::UnboundedReceiver<SentMail>,
    }

    impl RecordingMailer {
        pub fn channel() -> (Self, MailInbox) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Self { tx }, MailInbox { rx })
        }

        fn record(&self, kind: MailKind, to: &Recipient, token: Option<&str>) {
            let _ = self.tx.send(SentMail {
                kind,
                to: to.email.clone(),
                token: token.map(str::to_string),
            });
        }
    }

    impl MailInbox {
        /// Waits up to two seconds for the next message.
        pub async fn next(&mut self) -> Option<SentMail> {
            tokio::time::timeout(Duration::from_secs(2), self.rx.recv())
                .await
                .ok()
                .flatten()
        }

        /// Waits for the next message of `kind`, skipping others.
        pub async fn next_of(&mut self, kind: MailKind) -> Option<SentMail> {
            while let Some(mail) = self.next().await {
                if mail.kind == kind {
                    return Some(mail);
                }
            }
            None
        }

        /// Returns a message only if one is already queued.
        pub fn try_next(&mut self) -> Option<SentMail> {
            self.rx.try_recv().ok()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_verification_email(
            &self,
            to: &Recipient,
            token: &str,
        ) -> Result<(), MailError> {
            self.record(MailKind::Verification, to, Some(token));
            Ok(())
        }

        async fn send_password_reset_email(
            &self,
            to: &Recipient,
            token: &str,
        ) -> Result<(), MailError> {
            self.record(MailKind::PasswordReset, to, Some(token));
            Ok(())
        }

        async fn send_password_reset_confirmation(
            &self,
            to: &Recipient,
        ) -> Result<(), MailError> {
            self.record(MailKind::PasswordResetConfirmation, to, None);
            Ok(())
        }
    }

    /// Fails every delivery, as an unreachable SMTP server would.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send_verification_email(
            &self,
            _to: &Recipient,
            _token: &str,
        ) -> Result<(), MailError> {
            Err(MailError::Transport("connection refused".into()))
        }

        async fn send_password_reset_email(
            &self,
            _to: &Recipient,
            _token: &str,
        ) -> Result<(), MailError> {
            Err(MailError::Transport("connection refused".into()))
        }

        async fn send_password_reset_confirmation(
            &self,
            _to: &Recipient,
        ) -> Result<(), MailError> {
            Err(MailError::Transport("connection refused".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            smtp_host: "localhost".into(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@library.uew.edu.gh".into(),
            from_name: "UEW Digital Library".into(),
            frontend_url: "https://library.uew.edu.gh".into(),
        }
    }

    #[test]
    fn links_point_at_frontend_pages() {
        let mailer = SmtpMailer::new(config());
        assert_eq!(
            mailer.link("verify-email", "abc"),
            "https://library.uew.edu.gh/verify-email?token=abc"
        );
        assert_eq!(
            mailer.link("reset-password", "abc"),
            "https://library.uew.edu.gh/reset-password?token=abc"
        );
    }

    #[test]
    fn templates_carry_name_and_link() {
        let html = templates::password_reset("Ama", "https://x.test/reset-password?token=t");
        assert!(html.contains("Ama"));
        assert_eq!(html.matches("https://x.test/reset-password?token=t").count(), 2);
        assert!(templates::verification("Kofi", "l").contains("24 hours"));
    }

    #[test]
    fn templates_escape_names() {
        let name = r#"<script>alert("x")</script> & Co"#;
        for html in [
            templates::verification(name, "l"),
            templates::password_reset(name, "l"),
            templates::password_reset_confirmation(name),
        ] {
            assert!(!html.contains("<script>"));
            assert!(html.contains(
                "Hi <strong>&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; Co</strong>,"
            ));
        }
    }

    #[tokio::test]
    async fn recording_mailer_captures_tokens() {
        let (mailer, mut inbox) = RecordingMailer::channel();
        let to = Recipient {
            email: "ama@st.uew.edu.gh".into(),
            first_name: "Ama".into(),
        };

        mailer.send_password_reset_email(&to, "tok").await.unwrap();
        let mail = inbox.next().await.unwrap();
        assert_eq!(mail.kind, MailKind::PasswordReset);
        assert_eq!(mail.token.as_deref(), Some("tok"));
        assert!(inbox.try_next().is_none());
    }

    #[tokio::test]
    async fn failing_mailer_reports_transport_error() {
        let to = Recipient {
            email: "ama@st.uew.edu.gh".into(),
            first_name: "Ama".into(),
        };
        let err = FailingMailer.send_verification_email(&to, "t").await.unwrap_err();
        assert!(matches!(err, MailError::Transport(_)));
    }
}
