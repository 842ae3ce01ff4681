use coursebook_config::EmailConfig;
use coursebook_core::AppError;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

/// Sends account emails over SMTP. Bodies are inline text and HTML.
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, reset_token))]
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        reset_token: &str,
    ) -> Result<(), AppError> {
        let reset_link = self.config.reset_link(reset_token);

        if !self.config.enabled {
            info!(to = %to_email, reset_link = %reset_link, "Email disabled, password reset link not sent");
            return Ok(());
        }

        let text_body = format!(
            "Hi {},\n\n\
             We received a request to reset your Coursebook password.\n\n\
             Open the link below to choose a new password:\n\
             {}\n\n\
             The link expires in 1 hour and can be used once.\n\n\
             If you didn't request this, you can ignore this email.",
            to_name, reset_link
        );
        let html_body = reset_request_html(to_name, &reset_link);

        self.send_email(to_email, "Reset your Coursebook password", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self))]
    pub async fn send_password_reset_confirmation(
        &self,
        to_email: &str,
        to_name: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(to = %to_email, "Email disabled, reset confirmation not sent");
            return Ok(());
        }

        let text_body = format!(
            "Hi {},\n\n\
             Your Coursebook password has been changed and you have been signed out everywhere.\n\n\
             If you didn't make this change, contact support immediately.",
            to_name
        );
        let html_body = format!(
            "<p>Hi {},</p>\
             <p>Your Coursebook password has been changed and you have been signed out everywhere.</p>\
             <p>If you didn't make this change, contact support immediately.</p>",
            to_name
        );

        self.send_email(to_email, "Your password was reset", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, html_body, text_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
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
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::internal_error(format!("Failed to create SMTP relay: {}", e)))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

fn reset_request_html(name: &str, reset_link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: Arial, sans-serif; color: #1f2937;">
    <h2 style="color: #2563eb;">Coursebook</h2>
    <p>Hi {name},</p>
    <p>We received a request to reset your password.</p>
    <p>
        <a href="{link}" style="display: inline-block; padding: 10px 20px; background-color: #2563eb; color: #ffffff; text-decoration: none; border-radius: 4px;">Reset password</a>
    </p>
    <p>Or paste this link into your browser:<br><a href="{link}">{link}</a></p>
    <p style="color: #6b7280; font-size: 13px;">The link expires in 1 hour and can be used once. If you didn't request this, you can ignore this email.</p>
</body>
</html>"#,
        name = name,
        link = reset_link
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_contains_link() {
        let html = reset_request_html("Julia", "http://localhost:5173/reset-password?token=abc");
        assert!(html.contains("Hi Julia"));
        assert!(html.contains("href=\"http://localhost:5173/reset-password?token=abc\""));
    }

    #[tokio::test]
    async fn disabled_email_is_a_no_op() {
        let service = EmailService::new(EmailConfig {
            enabled: false,
            ..EmailConfig::default()
        });

        assert!(
            service
                .send_password_reset_email("a@example.com", "A", "token")
                .await
                .is_ok()
        );
        assert!(
            service
                .send_password_reset_confirmation("a@example.com", "A")
                .await
                .is_ok()
        );
    }
}
