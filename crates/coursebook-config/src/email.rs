#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@coursebook.local".to_string(),
            from_name: "Coursebook".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(crate::env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let smtp_host = lookup("SMTP_HOST").filter(|h| !h.trim().is_empty());

        // Sending is on whenever a host is configured unless explicitly disabled.
        let enabled = lookup("EMAIL_ENABLED")
            .and_then(|v| crate::parse_bool(&v))
            .unwrap_or(smtp_host.is_some());

        Self {
            enabled,
            smtp_host: smtp_host.unwrap_or(defaults.smtp_host),
            smtp_port: crate::parse_or(&lookup, "SMTP_PORT", defaults.smtp_port),
            smtp_username: lookup("SMTP_USER").unwrap_or_default(),
            smtp_password: lookup("SMTP_PASSWORD").unwrap_or_default(),
            from_email: lookup("SMTP_FROM").unwrap_or(defaults.from_email),
            from_name: lookup("SMTP_FROM_NAME").unwrap_or(defaults.from_name),
            frontend_url: lookup("FRONTEND_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
        }
    }

    /// Link the frontend uses to complete a password reset.
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup_from;

    #[test]
    fn disabled_without_host() {
        let config = EmailConfig::from_lookup(lookup_from(&[]));
        assert!(!config.enabled);
        assert_eq!(config.smtp_port, 587);
    }

    #[test]
    fn enabled_by_host_unless_overridden() {
        let config = EmailConfig::from_lookup(lookup_from(&[("SMTP_HOST", "smtp.example.com")]));
        assert!(config.enabled);

        let config = EmailConfig::from_lookup(lookup_from(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("EMAIL_ENABLED", "false"),
        ]));
        assert!(!config.enabled);
    }

    #[test]
    fn reset_link_uses_frontend_url() {
        let config =
            EmailConfig::from_lookup(lookup_from(&[("FRONTEND_URL", "https://app.example.com/")]));
        assert_eq!(
            config.reset_link("abc"),
            "https://app.example.com/reset-password?token=abc"
        );
    }
}
