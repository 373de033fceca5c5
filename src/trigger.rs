//! One refresh path fed by two producers: the clock and window focus.

use crate::controller::PageController;
use std::{future::Future, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    Tick,
    Focus,
}

/// Producer handle for focus events.
#[derive(Clone)]
pub struct FocusSignal(mpsc::Sender<()>);

impl FocusSignal {
    /// Returns false when a focus refresh is already queued or the loop is gone.
    pub fn notify(&self) -> bool {
        self.0.try_send(()).is_ok()
    }
}

pub fn focus_channel(capacity: usize) -> (FocusSignal, mpsc::Receiver<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (FocusSignal(tx), rx)
}

/// Drives `refresh_all` until `shutdown` resolves and returns how many refreshes it started.
///
/// Each refresh runs on its own task so a slow response never holds back the next trigger.
pub async fn run<F>(
    controller: Arc<PageController>,
    period: Duration,
    mut focus: mpsc::Receiver<()>,
    shutdown: F,
) -> usize
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut started = 0usize;
    loop {
        let trigger = tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                if started == 0 { RefreshTrigger::Startup } else { RefreshTrigger::Tick }
            }
            Some(()) = focus.recv() => RefreshTrigger::Focus,
        };
        started += 1;
        debug!(?trigger, "refresh triggered");

        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            let report = controller.refresh_all().await;
            if report.is_complete() {
                debug!(?trigger, at = %report.completed_at, "refresh complete");
            }
        });
    }

    info!(started, "refresh loop stopped");
    started
}
