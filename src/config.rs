use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub log_level: String,
    pub admin: Option<AdminBootstrap>,
    pub smtp: Option<SmtpConfig>,
}

/// Credentials for the admin account created on first start.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let session_secret = env_required("SESSION_SECRET")?;

        let host: IpAddr = env_or("GYMSITE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid GYMSITE_HOST: {e}"))?;

        let port: u16 = env_or("GYMSITE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid GYMSITE_PORT: {e}"))?;

        let base_url = env_or("GYMSITE_BASE_URL", &format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let upload_dir = PathBuf::from(env_or("GYMSITE_UPLOAD_DIR", "uploads"));

        let max_upload_size: usize = env_or("GYMSITE_MAX_UPLOAD_SIZE", "5242880")
            .parse()
            .map_err(|e| format!("Invalid GYMSITE_MAX_UPLOAD_SIZE: {e}"))?;

        let log_level = env_or("GYMSITE_LOG_LEVEL", "info");

        let admin = match (
            std::env::var("GYMSITE_ADMIN_EMAIL").ok(),
            std::env::var("GYMSITE_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap { email, password })
            }
            _ => None,
        };

        let smtp = match (
            std::env::var("GYMSITE_SMTP_HOST").ok(),
            std::env::var("GYMSITE_SMTP_PORT").ok(),
            std::env::var("GYMSITE_SMTP_USER").ok(),
            std::env::var("GYMSITE_SMTP_PASS").ok(),
            std::env::var("GYMSITE_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid GYMSITE_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            session_secret,
            host,
            port,
            base_url,
            upload_dir,
            max_upload_size,
            log_level,
            admin,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
