#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// What the fake API has been asked and how it should answer.
#[derive(Default)]
pub struct FakeApi {
    pub forecast_length_hours: u32,
    pub intensity_status: Option<StatusCode>,
    pub intensity_calls: usize,
    pub greenest_requests: Vec<(u8, u8)>,
    pub saved: Vec<Value>,
    pub removed: Vec<Value>,
    pub reject_save: bool,
    pub reject_remove: bool,
}

pub type SharedApi = Arc<Mutex<FakeApi>>;

pub fn fake_api(forecast_length_hours: u32) -> SharedApi {
    Arc::new(Mutex::new(FakeApi {
        forecast_length_hours,
        ..FakeApi::default()
    }))
}

pub async fn spawn_api(state: SharedApi) -> String {
    let app = Router::new()
        .route("/api/v1/current-emission-intensity", get(intensity))
        .route("/api/v1/greenest-period/:period/:horizon", get(greenest))
        .route("/api/v1/save-subscription", post(save))
        .route("/api/v1/remove-subscription", post(remove))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind random port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn intensity(State(state): State<SharedApi>) -> Result<Json<Value>, StatusCode> {
    let mut api = state.lock().await;
    api.intensity_calls += 1;
    if let Some(status) = api.intensity_status {
        return Err(status);
    }
    Ok(Json(json!({
        "success": true,
        "current-intensity": 212,
        "intensity-level": "PRIMÆRT SORT",
        "intensity-level-bgcolor": "rgba(0, 32, 0, 0.9)",
        "intensity-level-fgcolor": "#EEE",
        "intensity-level-border-color": "rgba(0, 96, 0, 0.9)",
        "latest-data": "2026-10-18 11:40",
        "forecast-length-hours": api.forecast_length_hours,
        "plot-data": { "vconcat": [{ "mark": "line" }] }
    })))
}

async fn greenest(
    State(state): State<SharedApi>,
    Path((period, horizon)): Path<(u8, u8)>,
) -> Json<Value> {
    state.lock().await.greenest_requests.push((period, horizon));
    if period > 6 {
        return Json(json!({ "success": false, "error": "Period must be between 1 and 6." }));
    }
    Json(json!({
        "success": true,
        "current-intensity": 212,
        "improvement": "41 %",
        "best-period-start": format!("{:02}:00", period),
        "best-period-end": format!("{:02}:00", period + 1),
        "best-period-intensity": 125
    }))
}

async fn save(State(state): State<SharedApi>, body: String) -> Json<Value> {
    let mut api = state.lock().await;
    if api.reject_save {
        return Json(json!({ "success": false }));
    }
    match serde_json::from_str(&body) {
        Ok(subscription) => {
            api.saved.push(subscription);
            Json(json!({ "success": true }))
        }
        Err(_) => Json(json!({ "success": false })),
    }
}

async fn remove(State(state): State<SharedApi>, body: String) -> Json<Value> {
    let mut api = state.lock().await;
    if api.reject_remove {
        return Json(json!({ "success": false }));
    }
    match serde_json::from_str(&body) {
        Ok(subscription) => {
            api.removed.push(subscription);
            Json(json!({ "success": true }))
        }
        Err(_) => Json(json!({ "success": false })),
    }
}
