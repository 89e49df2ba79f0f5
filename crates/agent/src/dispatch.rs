use anyhow::Context;
use models::Report;
use notifications::{scheduled_event_card, MessageCard, NotificationEmail, Renderer};

pub trait EmailSender: std::fmt::Debug + Send + Sync + 'static {
    fn send<'s>(
        &'s self,
        email: NotificationEmail,
    ) -> impl std::future::Future<Output = anyhow::Result<()>> + Send + 's;
}

/// Sends emails through SES.
#[derive(Debug)]
pub struct SesSender {
    client: aws_sdk_sesv2::Client,
    from_address: String,
}

impl SesSender {
    async fn send(&self, email: NotificationEmail) -> anyhow::Result<()> {
        use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

        let subject = Content::builder()
            .data(&email.subject)
            .charset("UTF-8")
            .build()
            .context("building email subject")?;
        let html = Content::builder()
            .data(&email.html)
            .charset("UTF-8")
            .build()
            .context("building email body")?;
        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().html(html).build())
            .build()
            .context("building email message")?;

        let response = self
            .client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(
                Destination::builder()
                    .to_addresses(email.recipient.as_str())
                    .build(),
            )
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .context("calling SES send_email")?;

        tracing::debug!(
            to = %email.recipient,
            message_id = response.message_id().unwrap_or_default(),
            "sent scheduled-event email"
        );
        Ok(())
    }
}

#[derive(Debug)]
pub enum Emailer {
    Disabled,
    Ses(SesSender),
}

impl Emailer {
    pub fn ses(config: &aws_config::SdkConfig, from_address: String) -> Emailer {
        Emailer::Ses(SesSender {
            client: aws_sdk_sesv2::Client::new(config),
            from_address,
        })
    }
}

impl EmailSender for Emailer {
    async fn send<'s>(&'s self, email: NotificationEmail) -> anyhow::Result<()> {
        match self {
            Emailer::Disabled => {
                tracing::warn!(
                    to = %email.recipient,
                    subject = %email.subject,
                    "skipping event email (email sending disabled)"
                );
                Ok(())
            }
            Emailer::Ses(ses) => ses.send(email).await,
        }
    }
}

pub trait ChatPoster: std::fmt::Debug + Send + Sync + 'static {
    fn post<'s>(
        &'s self,
        card: &'s MessageCard,
    ) -> impl std::future::Future<Output = anyhow::Result<()>> + Send + 's;
}

/// Posts MessageCards to a Teams incoming webhook.
#[derive(Debug)]
pub struct WebhookPoster {
    client: reqwest::Client,
    url: url::Url,
}

impl WebhookPoster {
    async fn post(&self, card: &MessageCard) -> anyhow::Result<()> {
        self.client
            .post(self.url.clone())
            .json(card)
            .send()
            .await
            .context("posting chat webhook")?
            .error_for_status()
            .context("chat webhook returned an error status")?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum Chat {
    Disabled,
    Webhook(WebhookPoster),
}

impl Chat {
    pub fn webhook(url: url::Url) -> Chat {
        Chat::Webhook(WebhookPoster {
            client: reqwest::Client::new(),
            url,
        })
    }
}

impl ChatPoster for Chat {
    async fn post<'s>(&'s self, card: &'s MessageCard) -> anyhow::Result<()> {
        match self {
            Chat::Disabled => {
                tracing::debug!(title = %card.title, "skipping chat card (no webhook configured)");
                Ok(())
            }
            Chat::Webhook(webhook) => webhook.post(card).await,
        }
    }
}

/// Formats and delivers both notification surfaces for a routed report.
/// Delivery is best-effort: failures are logged and never propagate, and
/// they never roll back the marker write that preceded them.
pub struct Dispatcher<E, C> {
    renderer: Renderer,
    emailer: E,
    chat: C,
    account_label: String,
}

impl<E: EmailSender, C: ChatPoster> Dispatcher<E, C> {
    pub fn new(renderer: Renderer, emailer: E, chat: C, account_label: String) -> Dispatcher<E, C> {
        Dispatcher {
            renderer,
            emailer,
            chat,
            account_label,
        }
    }

    pub async fn dispatch(&self, report: &Report) {
        match self.renderer.render_email(report) {
            Ok(email) => {
                if let Err(error) = self.emailer.send(email).await {
                    tracing::warn!(
                        error = format!("{error:#}"),
                        recipient = %report.recipient,
                        "failed to send event email"
                    );
                }
            }
            Err(error) => {
                tracing::warn!(error = format!("{error:#}"), "failed to render event email");
            }
        }

        let card = scheduled_event_card(report, &self.account_label);
        if let Err(error) = self.chat.post(&card).await {
            tracing::warn!(error = format!("{error:#}"), "failed to post chat card");
        }
    }
}
