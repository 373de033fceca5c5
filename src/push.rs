//! Push-subscription lifecycle: one subscription per platform, mirrored to the server.

use crate::api::DashboardApi;
use crate::config::ApplicationServerKey;
use crate::errors::ClientError;
use crate::models::{PushSubscription, SubscriptionKeys};
use crate::state::AppState;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

#[derive(Debug, Clone)]
pub struct SubscribeOptions {
    pub user_visible_only: bool,
    pub application_server_key: ApplicationServerKey,
}

/// The browser's worker registration and push manager.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Errors when the worker registration itself failed.
    async fn push_supported(&self) -> Result<bool, ClientError>;
    async fn request_permission(&self) -> Permission;
    async fn get_subscription(&self) -> Result<Option<PushSubscription>, ClientError>;
    async fn subscribe(&self, options: &SubscribeOptions) -> Result<PushSubscription, ClientError>;
    /// Ok(false) means the platform declined without raising.
    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool, ClientError>;
}

/// Single-slot platform kept in process memory.
pub struct MemoryPushPlatform {
    permission: Permission,
    endpoint_base: String,
    slot: Mutex<Option<PushSubscription>>,
}

impl MemoryPushPlatform {
    pub fn new(permission: Permission, endpoint_base: impl Into<String>) -> Self {
        Self {
            permission,
            endpoint_base: endpoint_base.into(),
            slot: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PushPlatform for MemoryPushPlatform {
    async fn push_supported(&self) -> Result<bool, ClientError> {
        Ok(true)
    }

    async fn request_permission(&self) -> Permission {
        self.permission
    }

    async fn get_subscription(&self) -> Result<Option<PushSubscription>, ClientError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn subscribe(&self, options: &SubscribeOptions) -> Result<PushSubscription, ClientError> {
        if self.permission != Permission::Granted {
            return Err(ClientError::platform("permission not granted"));
        }
        if !options.user_visible_only {
            return Err(ClientError::platform("only user-visible subscriptions are allowed"));
        }
        let mut slot = self.slot.lock().await;
        if let Some(existing) = slot.as_ref() {
            return Ok(existing.clone());
        }
        let id: [u8; 16] = rand::random();
        let auth: [u8; 16] = rand::random();
        let mut p256dh = [0u8; 65];
        p256dh[0] = 0x04;
        for byte in p256dh.iter_mut().skip(1) {
            *byte = rand::random();
        }
        let subscription = PushSubscription {
            endpoint: format!("{}/{}", self.endpoint_base, URL_SAFE_NO_PAD.encode(id)),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: URL_SAFE_NO_PAD.encode(p256dh),
                auth: URL_SAFE_NO_PAD.encode(auth),
            },
        };
        *slot = Some(subscription.clone());
        Ok(subscription)
    }

    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool, ClientError> {
        let mut slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(existing) if existing.endpoint == subscription.endpoint => {
                *slot = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Subscribed(PushSubscription),
    AlreadySubscribed,
    PermissionDenied(Permission),
    Unsubscribed,
    UnsubscribeFailed(String),
    /// The platform subscription is gone but the server still holds its record.
    RemoveFailed(String),
    NothingToRemove,
}

/// Owns the notification toggle and keeps the platform and server records in step.
pub struct SubscriptionManager {
    platform: Arc<dyn PushPlatform>,
    api: Arc<dyn DashboardApi>,
    state: AppState,
    server_key: ApplicationServerKey,
}

impl SubscriptionManager {
    pub fn new(
        platform: Arc<dyn PushPlatform>,
        api: Arc<dyn DashboardApi>,
        state: AppState,
        server_key: ApplicationServerKey,
    ) -> Self {
        Self {
            platform,
            api,
            state,
            server_key,
        }
    }

    /// Shows the notification section only when push is available, then reconciles the toggle.
    pub async fn init(&self) -> bool {
        let supported = match self.platform.push_supported().await {
            Ok(supported) => supported,
            Err(err) => {
                warn!("worker registration failed, hiding notifications: {err}");
                false
            }
        };
        self.state.page.lock().await.notifications.visible = supported;
        if !supported {
            return false;
        }
        if let Err(err) = self.reconcile_toggle_on_load().await {
            warn!("could not reconcile notification toggle: {err}");
        }
        true
    }

    pub async fn reconcile_toggle_on_load(&self) -> Result<(), ClientError> {
        let existing = self.platform.get_subscription().await?;
        let subscribed = existing.is_some();
        self.set_checked(subscribed).await;
        if !subscribed {
            self.on_toggle_changed(false).await?;
        }
        Ok(())
    }

    pub async fn on_toggle_changed(&self, checked: bool) -> Result<ToggleOutcome, ClientError> {
        if checked {
            self.enable().await
        } else {
            let outcome = self.disable().await;
            self.set_checked(false).await;
            outcome
        }
    }

    async fn enable(&self) -> Result<ToggleOutcome, ClientError> {
        let permission = self.platform.request_permission().await;
        if permission != Permission::Granted {
            info!(?permission, "notification permission not granted");
            self.set_checked(false).await;
            return Ok(ToggleOutcome::PermissionDenied(permission));
        }

        if self.platform.get_subscription().await?.is_some() {
            self.set_checked(true).await;
            return Ok(ToggleOutcome::AlreadySubscribed);
        }

        let options = SubscribeOptions {
            user_visible_only: true,
            application_server_key: self.server_key.clone(),
        };
        let subscription = match self.platform.subscribe(&options).await {
            Ok(subscription) => subscription,
            Err(err) => {
                self.set_checked(false).await;
                return Err(err);
            }
        };

        if let Err(err) = self.api.save_subscription(&subscription).await {
            warn!("saving subscription failed, rolling back: {err}");
            if let Err(rollback) = self.platform.unsubscribe(&subscription).await {
                warn!("rollback unsubscribe failed: {rollback}");
            }
            self.set_checked(false).await;
            return Err(err);
        }

        info!(endpoint = %subscription.endpoint, "subscribed to push notifications");
        self.set_checked(true).await;
        Ok(ToggleOutcome::Subscribed(subscription))
    }

    async fn disable(&self) -> Result<ToggleOutcome, ClientError> {
        let Some(subscription) = self.platform.get_subscription().await? else {
            return Ok(ToggleOutcome::NothingToRemove);
        };

        let reason = match self.platform.unsubscribe(&subscription).await {
            Ok(true) => None,
            Ok(false) => Some("platform declined to unsubscribe".to_string()),
            Err(err) => Some(err.to_string()),
        };
        if let Some(reason) = reason {
            warn!("unsubscribe failed, leaving server record in place: {reason}");
            return Ok(ToggleOutcome::UnsubscribeFailed(reason));
        }

        if let Err(err) = self.api.remove_subscription(&subscription).await {
            warn!(
                endpoint = %subscription.endpoint,
                "unsubscribed, but removing the server record failed: {err}"
            );
            return Ok(ToggleOutcome::RemoveFailed(err.to_string()));
        }
        info!(endpoint = %subscription.endpoint, "unsubscribed from push notifications");
        Ok(ToggleOutcome::Unsubscribed)
    }

    async fn set_checked(&self, checked: bool) {
        self.state.page.lock().await.notifications.checked = checked;
    }
}
