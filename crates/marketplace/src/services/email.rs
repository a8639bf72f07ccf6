//! Email service for account activation and vendor notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the account activation email.
#[derive(Template)]
#[template(path = "email/account_activation.html")]
struct ActivationEmailHtml<'a> {
    user_name: &'a str,
    activation_url: &'a str,
}

/// Plain text template for the account activation email.
#[derive(Template)]
#[template(path = "email/account_activation.txt")]
struct ActivationEmailText<'a> {
    user_name: &'a str,
    activation_url: &'a str,
}

/// HTML template for the vendor approval notification.
#[derive(Template)]
#[template(path = "email/vendor_approval.html")]
struct VendorApprovalHtml<'a> {
    user_name: &'a str,
    vendor_name: &'a str,
    approved: bool,
}

/// Plain text template for the vendor approval notification.
#[derive(Template)]
#[template(path = "email/vendor_approval.txt")]
struct VendorApprovalText<'a> {
    user_name: &'a str,
    vendor_name: &'a str,
    approved: bool,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// One or many recipient addresses.
///
/// Callers hand over whatever shape they have; dispatch normalizes to a
/// list before sending.
#[derive(Debug, Clone)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    fn into_addresses(self) -> Vec<String> {
        match self {
            Self::One(address) => vec![address],
            Self::Many(addresses) => addresses,
        }
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Self::One(address)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Self::Many(addresses)
    }
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if SMTP connection fails.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the activation link to a freshly registered account.
    ///
    /// The link embeds the encoded user id and a signed token; both are
    /// produced by the auth service.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_activation_email(
        &self,
        to: &str,
        user_name: &str,
        activation_url: &str,
    ) -> Result<(), EmailError> {
        let html = ActivationEmailHtml {
            user_name,
            activation_url,
        }
        .render()?;
        let text = ActivationEmailText {
            user_name,
            activation_url,
        }
        .render()?;

        self.send_multipart_email(
            Recipients::One(to.to_owned()),
            "Please activate your Plateful account",
            &text,
            &html,
        )
        .await
    }

    /// Notify a vendor that their approval status changed.
    ///
    /// Only called when the flag actually transitioned; repeated saves with
    /// the same value stay silent.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_approval_notice(
        &self,
        to: impl Into<Recipients> + Send,
        user_name: &str,
        vendor_name: &str,
        approved: bool,
    ) -> Result<(), EmailError> {
        let html = VendorApprovalHtml {
            user_name,
            vendor_name,
            approved,
        }
        .render()?;
        let text = VendorApprovalText {
            user_name,
            vendor_name,
            approved,
        }
        .render()?;

        let subject = if approved {
            "Congratulations! Your restaurant has been approved"
        } else {
            "Your restaurant listing is no longer published"
        };

        self.send_multipart_email(to.into(), subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions to
    /// every recipient.
    async fn send_multipart_email(
        &self,
        to: Recipients,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        for address in to.into_addresses() {
            let email = Message::builder()
                .from(
                    self.from_address
                        .parse()
                        .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
                )
                .to(address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(address.clone()))?)
                .subject(subject)
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(text_body.to_string()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html_body.to_string()),
                        ),
                )?;

            self.mailer.send(email).await?;

            tracing::info!(to = %address, subject = %subject, "Email sent successfully");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipients_one_normalizes_to_single_address() {
        let addresses = Recipients::from("chef@example.com".to_owned()).into_addresses();
        assert_eq!(addresses, vec!["chef@example.com".to_owned()]);
    }

    #[test]
    fn test_recipients_many_keeps_order() {
        let addresses = Recipients::from(vec![
            "a@example.com".to_owned(),
            "b@example.com".to_owned(),
        ])
        .into_addresses();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[0], "a@example.com");
    }

    #[test]
    fn test_activation_template_renders_link() {
        let html = ActivationEmailHtml {
            user_name: "Asha",
            activation_url: "https://plateful.test/auth/activate/MQ/abc123",
        }
        .render()
        .expect("template renders");
        assert!(html.contains("https://plateful.test/auth/activate/MQ/abc123"));
        assert!(html.contains("Asha"));
    }

    #[test]
    fn test_approval_template_distinguishes_outcomes() {
        let approved = VendorApprovalText {
            user_name: "Asha",
            vendor_name: "Spice Route",
            approved: true,
        }
        .render()
        .expect("template renders");
        let rejected = VendorApprovalText {
            user_name: "Asha",
            vendor_name: "Spice Route",
            approved: false,
        }
        .render()
        .expect("template renders");
        assert_ne!(approved, rejected);
        assert!(approved.contains("Spice Route"));
    }
}
