use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

use crate::config::email::EmailConfig;
use crate::utils::errors::AppError;

/// Outbound mail for the verification and recovery flows.
///
/// When `SMTP_ENABLED` is off the service logs the link instead of sending,
/// so the flows stay exercisable without a mail relay. Callers treat send
/// failures as fire-and-forget: they log and move on, never failing the
/// request over a mail outage.
#[derive(Clone, Debug)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, token))]
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        to_username: &str,
        token: &str,
    ) -> Result<(), AppError> {
        let link = format!("{}/verify-email?token={}", self.config.frontend_url, token);

        if !self.config.enabled {
            info!(email = %to_email, link = %link, "mail disabled, logging verification link");
            return Ok(());
        }

        let text_body = format!(
            "Hi {},\n\n\
             Welcome to Stead! Confirm your email address to finish creating\n\
             your account:\n\
             {}\n\n\
             If you didn't sign up, you can ignore this email.\n\n\
             The Stead Team",
            to_username, link
        );
        let html_body = self.layout(
            "Confirm your email",
            &format!(
                "Hi <strong>{}</strong>, welcome to Stead! Click the button below \
                 to confirm your email address and finish creating your account.",
                to_username
            ),
            &link,
            "Confirm email",
        );

        self.send(to_email, "Confirm your Stead account", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn send_recovery_email(
        &self,
        to_email: &str,
        to_username: &str,
        token: &str,
    ) -> Result<(), AppError> {
        let link = format!(
            "{}/recover-password?token={}",
            self.config.frontend_url, token
        );

        if !self.config.enabled {
            info!(email = %to_email, link = %link, "mail disabled, logging recovery link");
            return Ok(());
        }

        let text_body = format!(
            "Hi {},\n\n\
             We received a request to reset your Stead password. Use the link\n\
             below within 5 minutes:\n\
             {}\n\n\
             If you didn't request this, you can ignore this email.\n\n\
             The Stead Team",
            to_username, link
        );
        let html_body = self.layout(
            "Reset your password",
            &format!(
                "Hi <strong>{}</strong>, we received a request to reset your \
                 password. The link below expires in <strong>5 minutes</strong>.",
                to_username
            ),
            &link,
            "Reset password",
        );

        self.send(to_email, "Reset your Stead password", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, text_body, html_body))]
    async fn send(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(from.parse().map_err(|e| {
                AppError::internal(anyhow::anyhow!("Invalid from address: {e}"))
            })?)
            .to(to_email.parse().map_err(|e| {
                AppError::internal(anyhow::anyhow!("Invalid to address: {e}"))
            })?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to build email: {e}")))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create SMTP relay: {e}")))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("Task join error: {e}")))?
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to send email: {e}")))?;

        Ok(())
    }

    fn layout(&self, heading: &str, intro_html: &str, link: &str, button_label: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: #0F766E; padding: 24px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 26px;">Stead</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 32px;">
                            <h2 style="margin: 0 0 16px 0; color: #333333;">{heading}</h2>
                            <p style="margin: 0 0 24px 0; color: #666666; font-size: 16px; line-height: 1.5;">{intro_html}</p>
                            <p style="text-align: center; margin: 0 0 24px 0;">
                                <a href="{link}" style="display: inline-block; padding: 12px 36px; background-color: #0F766E; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: bold;">{button_label}</a>
                            </p>
                            <p style="margin: 0; color: #999999; font-size: 13px; word-break: break-all;">
                                Or paste this link into your browser: {link}
                            </p>
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 16px; text-align: center;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated email from Stead. Please do not reply.
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
}
