use crate::errors::ClientError;
use crate::models::{
    GreenestPeriodResponse, IntensityResponse, PushSubscription, SelectionState, SubscriptionAck,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn current_intensity(&self) -> Result<IntensityResponse, ClientError>;
    async fn greenest_period(
        &self,
        selection: SelectionState,
    ) -> Result<GreenestPeriodResponse, ClientError>;
    async fn save_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<SubscriptionAck, ClientError>;
    async fn remove_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<SubscriptionAck, ClientError>;
}

pub struct HttpApi {
    client: reqwest::Client,
    base: String,
}

impl HttpApi {
    pub fn new(base: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("co2_dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base))
    }

    pub fn with_client(client: reqwest::Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client, base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base))
            .send()
            .await?
            .error_for_status()?;
        decode(resp.json().await?)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        subscription: &PushSubscription,
    ) -> Result<T, ClientError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base))
            .json(subscription)
            .send()
            .await?
            .error_for_status()?;
        decode(resp.json().await?)
    }
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn current_intensity(&self) -> Result<IntensityResponse, ClientError> {
        self.get("/api/v1/current-emission-intensity").await
    }

    async fn greenest_period(
        &self,
        selection: SelectionState,
    ) -> Result<GreenestPeriodResponse, ClientError> {
        self.get(&format!(
            "/api/v1/greenest-period/{}/{}",
            selection.period, selection.horizon
        ))
        .await
    }

    async fn save_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<SubscriptionAck, ClientError> {
        self.post("/api/v1/save-subscription", subscription).await
    }

    async fn remove_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<SubscriptionAck, ClientError> {
        self.post("/api/v1/remove-subscription", subscription).await
    }
}

/// The server reports bad input and storage failures as `200` with `"success": false`.
fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("no reason given");
        return Err(ClientError::rejected(message));
    }
    Ok(serde_json::from_value(value)?)
}
