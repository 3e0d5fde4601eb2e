use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::MailConfig;

pub const VERIFICATION_SUBJECT: &str = "Confirm Your Email";

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers the email-verification link to `to`.
    async fn send_verification(&self, to: &str, link: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let builder = if cfg.ssl_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.server)
                .with_context(|| format!("smtp relay {}", cfg.server))?
        } else if cfg.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.server)
                .with_context(|| format!("smtp starttls relay {}", cfg.server))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.server)
        };
        let transport = builder
            .port(cfg.port)
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();

        let address: Address = cfg
            .from
            .parse()
            .with_context(|| format!("MAIL_FROM is not an address: {}", cfg.from))?;
        let from = Mailbox::new(Some(cfg.from_name.clone()), address);

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification(&self, to: &str, link: &str) -> anyhow::Result<()> {
        let recipient: Mailbox = to
            .parse()
            .with_context(|| format!("invalid recipient {to}"))?;
        let (plain, html) = verification_body(link);
        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(VERIFICATION_SUBJECT)
            .multipart(MultiPart::alternative_plain_html(plain, html))
            .context("build verification message")?;

        self.transport
            .send(message)
            .await
            .context("smtp send")?;
        info!(to = %to, "verification email sent");
        Ok(())
    }
}

/// Plain-text and HTML bodies for the verification message.
pub fn verification_body(link: &str) -> (String, String) {
    let plain = format!(
        "Thanks for signing up!\n\nConfirm your email address by opening this link:\n{link}\n\nIf you did not register, ignore this message."
    );
    let html = format!(
        "<p>Thanks for signing up!</p>\
         <p><a href=\"{link}\">Confirm your email address</a></p>\
         <p>If the button does not work, paste this link into your browser:<br>{link}</p>\
         <p>If you did not register, ignore this message.</p>"
    );
    (plain, html)
}
