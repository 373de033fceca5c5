use crate::api::DashboardApi;
use crate::errors::ClientError;
use crate::models::{DisplayState, GreenestPeriod, SelectionChange, SelectionState};
use crate::state::AppState;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    Applied,
    /// The selection changed while the request was in flight.
    Superseded,
}

#[derive(Debug)]
pub struct RefreshReport {
    pub intensity: Result<RefreshStatus, ClientError>,
    pub greenest: Result<RefreshStatus, ClientError>,
    pub completed_at: DateTime<Local>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.intensity.is_ok() && self.greenest.is_ok()
    }
}

/// Keeps the page model in step with the API and the user's selection.
///
/// Responses are applied in the order they arrive; nothing in flight is cancelled.
pub struct PageController {
    api: Arc<dyn DashboardApi>,
    state: AppState,
}

impl PageController {
    pub fn new(api: Arc<dyn DashboardApi>, state: AppState) -> Self {
        Self { api, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn refresh_intensity(&self) -> Result<RefreshStatus, ClientError> {
        let next = DisplayState::from(self.api.current_intensity().await?);
        let selection = self.state.selection.lock().await;
        let mut page = self.state.page.lock().await;
        info!(
            intensity_level = %next.level,
            intensity = next.current_intensity,
            forecast_hours = next.forecast_length_hours,
            "intensity refreshed"
        );
        page.apply_intensity(next, selection.horizon);
        Ok(RefreshStatus::Applied)
    }

    pub async fn refresh_greenest_period(&self) -> Result<RefreshStatus, ClientError> {
        let requested = *self.state.selection.lock().await;
        let greenest = GreenestPeriod::from(self.api.greenest_period(requested).await?);

        let current = self.state.selection.lock().await;
        if *current != requested {
            debug!(
                period = %requested.period,
                horizon = %requested.horizon,
                "dropping greenest period for an outdated selection"
            );
            return Ok(RefreshStatus::Superseded);
        }
        let mut page = self.state.page.lock().await;
        info!(
            period = %requested.period,
            horizon = %requested.horizon,
            start = %greenest.start,
            end = %greenest.end,
            "greenest period refreshed"
        );
        page.apply_greenest(greenest);
        Ok(RefreshStatus::Applied)
    }

    pub async fn refresh_all(&self) -> RefreshReport {
        let (intensity, greenest) =
            tokio::join!(self.refresh_intensity(), self.refresh_greenest_period());
        if let Err(err) = &intensity {
            warn!("intensity refresh failed, keeping previous data: {err}");
        }
        if let Err(err) = &greenest {
            warn!("greenest period refresh failed, keeping previous data: {err}");
        }
        RefreshReport {
            intensity,
            greenest,
            completed_at: Local::now(),
        }
    }

    pub async fn on_selection_change(
        &self,
        change: SelectionChange,
    ) -> Result<RefreshStatus, ClientError> {
        let selection: SelectionState = {
            let mut selection = self.state.selection.lock().await;
            *selection = selection.with(change);
            self.state.page.lock().await.apply_selection(*selection);
            *selection
        };
        info!(period = %selection.period, horizon = %selection.horizon, "selection changed");
        let result = self.refresh_greenest_period().await;
        if let Err(err) = &result {
            warn!("greenest period refresh failed after selection change: {err}");
        }
        result
    }
}
