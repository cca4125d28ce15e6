use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::notify::NotifySettings;

/// Application configuration loaded from environment variables.
/// Everything has a default, so a bare start comes up listening on 3000 with
/// local `data/` and `uploads/` directories and email disabled.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Public base URL, used for dashboard links in notification emails.
    pub app_url: String,
    pub email_enabled: bool,
    pub admin_email: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub from_email: Option<String>,
}

/// Everything the SMTP transport needs; only built when email is fully
/// configured.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            app_url: env_or("APP_URL", "http://localhost:3000"),
            email_enabled: env_flag("EMAIL_ENABLED"),
            admin_email: env_opt("ADMIN_EMAIL"),
            smtp_host: env_opt("SMTP_HOST"),
            smtp_port: env_or("SMTP_PORT", "587")
                .parse::<u16>()
                .context("SMTP_PORT must be a valid port number")?,
            smtp_secure: env_flag("SMTP_SECURE"),
            smtp_user: env_opt("SMTP_USER"),
            smtp_pass: env_opt("SMTP_PASS"),
            from_email: env_opt("FROM_EMAIL"),
        })
    }

    pub fn store_file(&self) -> PathBuf {
        self.data_dir.join("applications.json")
    }

    /// SMTP settings when email is enabled and fully configured; `None`
    /// installs the no-op transport. The sender address falls back to the
    /// SMTP user.
    pub fn mail(&self) -> Option<MailSettings> {
        if !self.email_enabled {
            return None;
        }
        let host = self.smtp_host.clone()?;
        let user = self.smtp_user.clone()?;
        let pass = self.smtp_pass.clone()?;
        self.admin_email.as_deref()?;
        let from = self.from_email.clone().unwrap_or_else(|| user.clone());
        Some(MailSettings {
            host,
            port: self.smtp_port,
            secure: self.smtp_secure,
            user,
            pass,
            from,
        })
    }

    pub fn notify_settings(&self) -> NotifySettings {
        NotifySettings {
            admin_email: self.admin_email.clone().unwrap_or_default(),
            app_url: self.app_url.clone(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_flag(key: &str) -> bool {
    matches!(
        std::env::var(key).unwrap_or_default().to_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> Config {
        Config {
            port: 3000,
            rust_log: "info".to_string(),
            data_dir: PathBuf::from("data"),
            upload_dir: PathBuf::from("uploads"),
            app_url: "http://localhost:3000".to_string(),
            email_enabled: true,
            admin_email: Some("admin@example.com".to_string()),
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_port: 587,
            smtp_secure: false,
            smtp_user: Some("mailer@example.com".to_string()),
            smtp_pass: Some("secret".to_string()),
            from_email: None,
        }
    }

    #[test]
    fn test_mail_requires_every_smtp_setting() {
        let config = full_config();
        let mail = config.mail().unwrap();
        assert_eq!(mail.host, "smtp.example.com");
        // FROM_EMAIL unset falls back to the SMTP user.
        assert_eq!(mail.from, "mailer@example.com");

        let mut disabled = full_config();
        disabled.email_enabled = false;
        assert!(disabled.mail().is_none());

        let mut missing_host = full_config();
        missing_host.smtp_host = None;
        assert!(missing_host.mail().is_none());

        let mut missing_admin = full_config();
        missing_admin.admin_email = None;
        assert!(missing_admin.mail().is_none());
    }

    #[test]
    fn test_explicit_from_address_wins() {
        let mut config = full_config();
        config.from_email = Some("Applications <apply@example.com>".to_string());
        assert_eq!(config.mail().unwrap().from, "Applications <apply@example.com>");
    }

    #[test]
    fn test_store_file_lives_under_data_dir() {
        let config = full_config();
        assert_eq!(config.store_file(), PathBuf::from("data/applications.json"));
    }
}
