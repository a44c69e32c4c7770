//! Outgoing mail. The only message the site sends is the password-reset link.

pub mod templates;

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// A rendered reset email, ready to be addressed.
#[derive(Debug, Clone)]
pub struct ResetEmail {
    pub subject: &'static str,
    pub text: String,
    pub html: String,
}

impl ResetEmail {
    pub fn new(member_name: &str, reset_url: &str) -> Self {
        Self {
            subject: "Reset your gym account password",
            text: templates::password_reset_text(member_name, reset_url),
            html: templates::password_reset_html(member_name, reset_url),
        }
    }
}

/// SMTP mailer configured from `GYMSITE_SMTP_*`.
pub struct ResetMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl ResetMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let sender: Mailbox = config
            .from
            .parse()
            .map_err(|e| format!("GYMSITE_SMTP_FROM is not a valid mailbox: {e}"))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("Cannot use SMTP relay {}: {e}", config.host))?
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        Ok(Self { transport, sender })
    }

    pub async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: &str,
        reset_url: &str,
    ) -> Result<(), String> {
        let message = build_message(
            &self.sender,
            to_email,
            to_name,
            &ResetEmail::new(to_name, reset_url),
        )?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("SMTP delivery of reset email failed: {e}"))?;

        tracing::debug!("Password reset email handed to SMTP relay");
        Ok(())
    }
}

/// Address a reset email as a plain-text + HTML alternative.
pub fn build_message(
    sender: &Mailbox,
    to_email: &str,
    to_name: &str,
    email: &ResetEmail,
) -> Result<Message, String> {
    let address: Address = to_email
        .parse()
        .map_err(|e| format!("Member email {to_email:?} is not deliverable: {e}"))?;
    let name = Some(to_name.to_string()).filter(|n| !n.trim().is_empty());

    Message::builder()
        .from(sender.clone())
        .to(Mailbox::new(name, address))
        .subject(email.subject)
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
        .map_err(|e| format!("Failed to assemble reset email: {e}"))
}
