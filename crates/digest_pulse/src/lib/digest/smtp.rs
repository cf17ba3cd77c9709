use chrono::{Duration, Utc};
use chrono_tz::Tz;
use digest_datastore::{Summary, SummaryStatus};
use lettre::{
    address::AddressError,
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{template::render_digest, DigestMailer};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SUBJECT_TEMPLATE: &str = "YouTube Summary - {date}";

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Invalid mailbox address: {0}")]
    Address(#[from] AddressError),
    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Defaults to the SMTP username, i.e. the digest is sent to self
    pub recipient: Option<String>,
    pub subject_template: String,
    pub timezone: Tz,
}

impl SmtpSettings {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            username: username.into(),
            password: password.into(),
            recipient: None,
            subject_template: DEFAULT_SUBJECT_TEMPLATE.to_string(),
            timezone: Tz::UTC,
        }
    }
}

/// Sends the digest as a single HTML email over a STARTTLS relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    subject_template: String,
    timezone: Tz,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Result<Self, MailerError> {
        let from: Mailbox = settings.username.parse()?;
        let to: Mailbox = match &settings.recipient {
            Some(recipient) => recipient.parse()?,
            None => from.clone(),
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            subject_template: settings.subject_template,
            timezone: settings.timezone,
        })
    }

    fn digest_date(&self) -> String {
        Utc::now()
            .with_timezone(&self.timezone)
            .format("%B %-d, %Y")
            .to_string()
    }

    pub fn render_subject(&self, date: &str) -> String {
        self.subject_template.replace("{date}", date)
    }

    /// Sends a digest holding one sample summary to check the SMTP settings
    pub async fn send_test_email(&self) -> Result<(), MailerError> {
        tracing::info!(to = %self.to, "Sending test email");
        self.send_digest(&[sample_summary()]).await
    }
}

impl DigestMailer for SmtpMailer {
    type Error = MailerError;

    #[tracing::instrument(skip_all, fields(summary_count = summaries.len()))]
    async fn send_digest(&self, summaries: &[Summary]) -> Result<(), Self::Error> {
        if summaries.is_empty() {
            tracing::info!("No summaries to send, skipping email digest");
            return Ok(());
        }

        let date = self.digest_date();
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.render_subject(&date))
            .header(ContentType::TEXT_HTML)
            .body(render_digest(&date, summaries))?;

        self.transport
            .send(email)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to send email via SMTP"))?;

        tracing::info!("Successfully sent email digest");
        Ok(())
    }
}

fn sample_summary() -> Summary {
    Summary {
        id: "test-001".into(),
        video_id: "dQw4w9WgXcQ".into(),
        video_title: "Test Video Title".into(),
        channel_name: "Test Channel".into(),
        summary: "This is a test summary to verify that the email system is working correctly. \
                  If you receive this email, your digest configuration is properly set up."
            .into(),
        created_at: Utc::now(),
        status: SummaryStatus::New,
        video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
        published_at: Utc::now() - Duration::days(1),
        thumbnail_url: "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg".into(),
        duration: "3:33".into(),
        view_count: 1_234_567_890,
    }
}
