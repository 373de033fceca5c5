pub mod api;
pub mod config;
pub mod controller;
pub mod errors;
pub mod models;
pub mod push;
pub mod state;
pub mod trigger;
pub mod ui;
pub mod worker;

pub use api::{DashboardApi, HttpApi};
pub use config::Config;
pub use controller::PageController;
pub use errors::ClientError;
pub use push::{MemoryPushPlatform, PushPlatform, SubscriptionManager};
pub use state::AppState;
pub use worker::BackgroundWorker;
