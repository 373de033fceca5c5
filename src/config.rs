use crate::errors::ClientError;
use crate::push::Permission;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use std::{env, time::Duration};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_REFRESH_SECS: u64 = 5 * 60;
pub const DEFAULT_NOTIFICATION_TITLE: &str = "Grøn strøm";

/// Public half of the VAPID key pair; the private half lives with the push sender.
pub const DEFAULT_SERVER_KEY: &str =
    "BOFZVXkRrNpjIDfHbm_nV5NU9lun39l18wVH85KtHKLT85z9067-zh7DmgKUjhrvPZu0dx65waSZsJAajZ6480I";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationServerKey(Vec<u8>);

impl ApplicationServerKey {
    pub fn parse(encoded: &str) -> Result<Self, ClientError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim().trim_end_matches('='))
            .map_err(|err| ClientError::config(format!("server key is not base64url: {err}")))?;
        if bytes.len() != 65 || bytes[0] != 0x04 {
            return Err(ClientError::config(
                "server key must be an uncompressed P-256 point (65 bytes, 0x04 prefix)",
            ));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn encoded(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub title: String,
    pub icon: String,
    pub badge: String,
    pub open_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            icon: "/plug-512.png".to_string(),
            badge: "/badge.png".to_string(),
            open_url: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub refresh_interval: Duration,
    pub server_key: ApplicationServerKey,
    pub notification: NotificationConfig,
    pub push_permission: Permission,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("DASHBOARD_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let refresh_secs = match lookup("DASHBOARD_REFRESH_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ClientError::config(format!("DASHBOARD_REFRESH_SECS must be a positive integer, got {value:?}"))
                })?,
            None => DEFAULT_REFRESH_SECS,
        };

        let server_key = ApplicationServerKey::parse(
            &lookup("DASHBOARD_SERVER_KEY").unwrap_or_else(|| DEFAULT_SERVER_KEY.to_string()),
        )?;

        let mut notification = NotificationConfig::default();
        if let Some(title) = lookup("DASHBOARD_NOTIFICATION_TITLE") {
            notification.title = title;
        }

        let push_permission = match lookup("DASHBOARD_PUSH_PERMISSION").as_deref() {
            None | Some("granted") => Permission::Granted,
            Some("denied") => Permission::Denied,
            Some("default") => Permission::Default,
            Some(other) => {
                return Err(ClientError::config(format!(
                    "DASHBOARD_PUSH_PERMISSION must be granted, denied or default, got {other:?}"
                )));
            }
        };

        Ok(Self {
            api_base_url,
            refresh_interval: Duration::from_secs(refresh_secs),
            server_key,
            notification,
            push_permission,
        })
    }
}
