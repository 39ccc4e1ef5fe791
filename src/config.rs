use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data_dir: String,
    pub mail: Option<MailConfig>,
    pub outreach: OutreachConfig,
    pub throttle: ThrottleConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub user: String,
    pub app_password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutreachConfig {
    pub attachment_path: String,
    pub subject: String,
    pub template_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ThrottleConfig {
    pub max_per_window: u32,
    pub window_ms: u64,
}

impl ThrottleConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub addr: String,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn new() -> Result<Self> {
        Ok(Config {
            data_dir: env_or("DATA_DIR", "./data"),
            mail: match (std::env::var("GMAIL_USER"), std::env::var("GMAIL_APP_PASSWORD")) {
                (Ok(user), Ok(app_password)) => Some(MailConfig {
                    user,
                    app_password,
                    smtp_host: env_or("SMTP_HOST", "smtp.gmail.com"),
                    smtp_port: env_or("SMTP_PORT", "587").parse().unwrap_or(587),
                }),
                _ => {
                    log::debug!("GMAIL_USER or GMAIL_APP_PASSWORD not set - sending disabled");
                    None
                }
            },
            outreach: OutreachConfig {
                attachment_path: env_or("ATTACHMENT_PATH", "./data/attachment.pdf"),
                subject: env_or("MAIL_SUBJECT", "Introduction | REF {name}"),
                template_path: std::env::var("MAIL_TEMPLATE_PATH").ok(),
            },
            throttle: ThrottleConfig {
                max_per_window: env_or("SEND_MAX_PER_WINDOW", "1").parse().unwrap_or(1),
                window_ms: env_or("SEND_WINDOW_MS", "1000").parse().unwrap_or(1000),
            },
            server: ServerConfig {
                addr: env_or("SERVER_ADDR", "127.0.0.1:8080"),
            },
        })
    }

    /// Mail settings, or an explanation of which variables are missing
    pub fn require_mail(&self) -> Result<&MailConfig> {
        if let Some(mail) = &self.mail {
            return Ok(mail);
        }

        let missing_vars: Vec<&str> = ["GMAIL_USER", "GMAIL_APP_PASSWORD"]
            .into_iter()
            .filter(|var| std::env::var(var).is_err())
            .collect();

        anyhow::bail!(
            "Missing environment variables: {}\n\
             \n\
             💡 Solutions:\n\
             1. Create a .env file with your credentials:\n\
                GMAIL_USER=you@gmail.com\n\
                GMAIL_APP_PASSWORD=<app password>\n\
             \n\
             2. Or export them manually before running:\n\
                export GMAIL_USER=you@gmail.com\n\
                export GMAIL_APP_PASSWORD=<app password>\n\
                linkscrape send --dry-run",
            missing_vars.join(", ")
        );
    }
}
