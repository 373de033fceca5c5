use co2_dashboard::{
    models::{Horizon, Period, SelectionChange},
    trigger,
    ui::{BEST_PERIOD_END, BEST_PERIOD_START, INTENSITY_LEVEL},
    worker::{LogHost, Notification, NotificationClick, PushEvent},
    AppState, BackgroundWorker, ClientError, Config, HttpApi, MemoryPushPlatform,
    PageController, SubscriptionManager,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const HELP: &str = "commands: focus | period N | horizon N | notify on|off | push TEXT | click | status | quit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Focus,
    Select(SelectionChange),
    Notify(bool),
    Push(String),
    Click,
    Status,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, ClientError> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let hours = || {
            rest.parse::<u8>()
                .map_err(|_| ClientError::invalid(format!("expected a number of hours, got {rest:?}")))
        };
        match word {
            "focus" => Ok(Self::Focus),
            "period" => Ok(Self::Select(SelectionChange::Period(Period::new(hours()?)?))),
            "horizon" => Ok(Self::Select(SelectionChange::Horizon(Horizon::new(hours()?)?))),
            "notify" => match rest {
                "on" => Ok(Self::Notify(true)),
                "off" => Ok(Self::Notify(false)),
                other => Err(ClientError::invalid(format!("notify takes on or off, got {other:?}"))),
            },
            "push" => Ok(Self::Push(rest.to_string())),
            "click" => Ok(Self::Click),
            "status" => Ok(Self::Status),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ClientError::invalid(format!("unknown command {other:?}; {HELP}"))),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let api = Arc::new(HttpApi::new(config.api_base_url.clone())?);
    let state = AppState::default();
    let controller = Arc::new(PageController::new(api.clone(), state.clone()));

    let platform = Arc::new(MemoryPushPlatform::new(
        config.push_permission,
        format!("{}/push", config.api_base_url),
    ));
    let subscriptions =
        SubscriptionManager::new(platform, api, state.clone(), config.server_key.clone());
    subscriptions.init().await;
    let worker = BackgroundWorker::new(Arc::new(LogHost), config.notification.clone());

    let (focus, focus_rx) = trigger::focus_channel(1);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let scheduler = tokio::spawn(trigger::run(
        Arc::clone(&controller),
        config.refresh_interval,
        focus_rx,
        async move {
            let _ = stop_rx.await;
        },
    ));

    info!(
        api = %config.api_base_url,
        interval_secs = config.refresh_interval.as_secs(),
        "dashboard client running; {HELP}"
    );

    let mut last_notification: Option<Notification> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => line,
                None => break,
            },
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };

        match command {
            Command::Focus => {
                if !focus.notify() {
                    info!("focus refresh already queued");
                }
            }
            Command::Select(change) => {
                if let Err(err) = controller.on_selection_change(change).await {
                    warn!("selection applied but greenest period not refreshed: {err}");
                }
            }
            Command::Notify(checked) => match subscriptions.on_toggle_changed(checked).await {
                Ok(outcome) => info!(?outcome, "notification toggle changed"),
                Err(err) => warn!("notification toggle failed: {err}"),
            },
            Command::Push(text) => {
                match worker.on_push(PushEvent::with_text(&text)).await {
                    Ok(Some(notification)) => last_notification = Some(notification),
                    Ok(None) => info!("empty push ignored"),
                    Err(err) => warn!("push handling failed: {err}"),
                }
            }
            Command::Click => match last_notification.take() {
                Some(notification) => {
                    if let Err(err) = worker
                        .on_notification_click(NotificationClick { notification })
                        .await
                    {
                        warn!("notification click failed: {err}");
                    }
                }
                None => info!("no notification to click"),
            },
            Command::Status => {
                let page = state.snapshot().await;
                info!(
                    intensity_level = page.label(INTENSITY_LEVEL).unwrap_or("-"),
                    best_start = page.label(BEST_PERIOD_START).unwrap_or("-"),
                    best_end = page.label(BEST_PERIOD_END).unwrap_or("-"),
                    period = %page.period_toggle_label,
                    horizon = %page.horizon.toggle_label,
                    notifications = page.notifications.checked,
                    "page status"
                );
            }
            Command::Quit => break,
        }
    }

    let _ = stop_tx.send(());
    let started = scheduler.await?;
    info!(started, "shutting down");
    Ok(())
}
