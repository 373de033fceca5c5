//! Background worker reacting to push, notification-click and fetch events.

use crate::config::NotificationConfig;
use crate::errors::ClientError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Notifying,
}

#[derive(Debug, Clone, Default)]
pub struct PushEvent {
    pub data: Option<Vec<u8>>,
}

impl PushEvent {
    pub fn with_text(text: &str) -> Self {
        Self {
            data: Some(text.as_bytes().to_vec()),
        }
    }

    /// Human-readable text carried by the event, if any.
    pub fn message(&self) -> Option<String> {
        let data = self.data.as_deref().filter(|data| !data.is_empty())?;
        match serde_json::from_slice::<Value>(data) {
            Ok(Value::Object(map)) => match map.get("message") {
                Some(Value::String(message)) => Some(message.clone()),
                _ => Some(String::from_utf8_lossy(data).into_owned()),
            },
            Ok(Value::String(message)) => Some(message),
            _ => Some(String::from_utf8_lossy(data).into_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
}

#[derive(Debug, Clone)]
pub struct NotificationClick {
    pub notification: Notification,
}

#[derive(Debug, Clone)]
pub struct FetchEvent {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDisposition {
    Passthrough,
}

/// What the hosting platform lets the worker do.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    async fn show_notification(&self, notification: &Notification) -> Result<(), ClientError>;
    async fn close_notification(&self, notification: &Notification) -> Result<(), ClientError>;
    async fn open_window(&self, url: &str) -> Result<(), ClientError>;
}

/// Host that only writes what would have been shown to the log.
pub struct LogHost;

#[async_trait]
impl WorkerHost for LogHost {
    async fn show_notification(&self, notification: &Notification) -> Result<(), ClientError> {
        info!(title = %notification.title, body = %notification.body, "notification shown");
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> Result<(), ClientError> {
        info!(title = %notification.title, "notification closed");
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<(), ClientError> {
        info!(url, "opening app window");
        Ok(())
    }
}

pub struct BackgroundWorker {
    host: Arc<dyn WorkerHost>,
    config: NotificationConfig,
    notifying: AtomicUsize,
}

/// Counts one notification in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl BackgroundWorker {
    pub fn new(host: Arc<dyn WorkerHost>, config: NotificationConfig) -> Self {
        Self {
            host,
            config,
            notifying: AtomicUsize::new(0),
        }
    }

    /// `Notifying` while any push is still being displayed.
    pub fn state(&self) -> WorkerState {
        match self.notifying.load(Ordering::SeqCst) {
            0 => WorkerState::Idle,
            _ => WorkerState::Notifying,
        }
    }

    /// Returns the notification that was displayed, if the event carried a message.
    pub async fn on_push(&self, event: PushEvent) -> Result<Option<Notification>, ClientError> {
        let Some(body) = event.message() else {
            debug!("push without payload ignored");
            return Ok(None);
        };

        let notification = Notification {
            title: self.config.title.clone(),
            body,
            icon: self.config.icon.clone(),
            badge: self.config.badge.clone(),
        };
        let _in_flight = InFlight::enter(&self.notifying);
        self.host.show_notification(&notification).await?;
        Ok(Some(notification))
    }

    /// Completes only once the window has been opened.
    pub async fn on_notification_click(&self, click: NotificationClick) -> Result<(), ClientError> {
        self.host.close_notification(&click.notification).await?;
        self.host.open_window(&self.config.open_url).await
    }

    pub fn on_fetch(&self, event: &FetchEvent) -> FetchDisposition {
        debug!(url = %event.url, "fetch passed through");
        FetchDisposition::Passthrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::{Mutex as AsyncMutex, Notify};

    #[derive(Default)]
    struct RecordingHost {
        events: AsyncMutex<Vec<String>>,
        shown: AsyncMutex<Vec<Notification>>,
        /// Notifications with this body wait for `release` before showing.
        slow_body: Option<String>,
        release: Notify,
    }

    #[async_trait]
    impl WorkerHost for RecordingHost {
        async fn show_notification(&self, notification: &Notification) -> Result<(), ClientError> {
            self.events.lock().await.push(format!("begin {}", notification.body));
            if self.slow_body.as_deref() == Some(notification.body.as_str()) {
                self.release.notified().await;
            }
            self.shown.lock().await.push(notification.clone());
            self.events.lock().await.push("show".to_string());
            Ok(())
        }

        async fn close_notification(&self, _notification: &Notification) -> Result<(), ClientError> {
            self.events.lock().await.push("close".to_string());
            Ok(())
        }

        async fn open_window(&self, url: &str) -> Result<(), ClientError> {
            self.events.lock().await.push(format!("open {url}"));
            Ok(())
        }
    }

    fn worker(host: Arc<RecordingHost>) -> BackgroundWorker {
        BackgroundWorker::new(host, NotificationConfig::default())
    }

    #[tokio::test]
    async fn push_with_text_shows_fixed_title() {
        let host = Arc::new(RecordingHost::default());
        let worker = worker(host.clone());

        let notification = worker.on_push(PushEvent::with_text("Text A")).await.unwrap();

        let shown = host.shown.lock().await;
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, NotificationConfig::default().title);
        assert_eq!(shown[0].body, "Text A");
        assert_eq!(shown[0].icon, "/plug-512.png");
        assert_eq!(notification.as_ref(), Some(&shown[0]));
        assert_eq!(worker.state(), WorkerState::Idle);
    }

    #[tokio::test]
    async fn push_without_payload_is_silent() {
        let host = Arc::new(RecordingHost::default());
        let worker = worker(host.clone());

        assert_eq!(worker.on_push(PushEvent::default()).await.unwrap(), None);
        assert_eq!(
            worker.on_push(PushEvent { data: Some(Vec::new()) }).await.unwrap(),
            None
        );
        assert!(host.shown.lock().await.is_empty());
    }

    #[test]
    fn json_payload_message_is_extracted() {
        let event = PushEvent::with_text(r#"{"title":"ignored","message":"Grøn strøm kl. 14"}"#);
        assert_eq!(event.message().as_deref(), Some("Grøn strøm kl. 14"));
        let event = PushEvent::with_text(r#""quoted""#);
        assert_eq!(event.message().as_deref(), Some("quoted"));
    }

    #[tokio::test]
    async fn displayed_notification_carries_extracted_message() {
        let host = Arc::new(RecordingHost::default());
        let worker = worker(host.clone());

        let notification = worker
            .on_push(PushEvent::with_text(r#"{"message":"x"}"#))
            .await
            .unwrap()
            .expect("notification shown");

        assert_eq!(notification.body, "x");
        assert_eq!(host.shown.lock().await[0], notification);
    }

    #[tokio::test]
    async fn overlapping_pushes_stay_notifying_until_all_shown() {
        let host = Arc::new(RecordingHost {
            slow_body: Some("slow".to_string()),
            ..RecordingHost::default()
        });
        let worker = Arc::new(worker(host.clone()));

        let slow = tokio::spawn({
            let worker = Arc::clone(&worker);
            async move { worker.on_push(PushEvent::with_text("slow")).await }
        });
        while host.events.lock().await.is_empty() {
            tokio::task::yield_now().await;
        }
        assert_eq!(worker.state(), WorkerState::Notifying);

        worker.on_push(PushEvent::with_text("fast")).await.unwrap();
        assert_eq!(worker.state(), WorkerState::Notifying);

        host.release.notify_one();
        slow.await.unwrap().unwrap();
        assert_eq!(worker.state(), WorkerState::Idle);
    }

    #[tokio::test]
    async fn click_closes_then_opens_root() {
        let host = Arc::new(RecordingHost::default());
        let worker = worker(host.clone());
        let notification = Notification {
            title: "t".to_string(),
            body: "b".to_string(),
            icon: "/plug-512.png".to_string(),
            badge: "/badge.png".to_string(),
        };

        worker
            .on_notification_click(NotificationClick { notification })
            .await
            .unwrap();
        assert_eq!(*host.events.lock().await, vec!["close", "open /"]);
    }

    #[test]
    fn fetch_is_never_intercepted() {
        let worker = worker(Arc::new(RecordingHost::default()));
        let event = FetchEvent {
            url: "/api/v1/current-emission-intensity".to_string(),
        };
        assert_eq!(worker.on_fetch(&event), FetchDisposition::Passthrough);
    }
}
