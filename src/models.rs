use crate::errors::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IntensityResponse {
    pub current_intensity: i64,
    pub intensity_level: String,
    pub intensity_level_bgcolor: String,
    pub intensity_level_fgcolor: String,
    pub intensity_level_border_color: String,
    pub latest_data: String,
    pub forecast_length_hours: u32,
    pub plot_data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GreenestPeriodResponse {
    pub current_intensity: i64,
    pub improvement: String,
    pub best_period_start: String,
    pub best_period_end: String,
    pub best_period_intensity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionAck {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTriad {
    pub background: String,
    pub foreground: String,
    pub border: String,
}

/// Everything the page shows about "now", rebuilt from each intensity response.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub level: String,
    pub current_intensity: i64,
    pub colors: ColorTriad,
    pub latest_data: String,
    pub forecast_length_hours: u32,
    pub plot: Value,
}

impl From<IntensityResponse> for DisplayState {
    fn from(response: IntensityResponse) -> Self {
        Self {
            level: response.intensity_level,
            current_intensity: response.current_intensity,
            colors: ColorTriad {
                background: response.intensity_level_bgcolor,
                foreground: response.intensity_level_fgcolor,
                border: response.intensity_level_border_color,
            },
            latest_data: response.latest_data,
            forecast_length_hours: response.forecast_length_hours,
            plot: response.plot_data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenestPeriod {
    pub current_intensity: i64,
    pub improvement: String,
    pub start: String,
    pub end: String,
    pub intensity: i64,
}

impl From<GreenestPeriodResponse> for GreenestPeriod {
    fn from(response: GreenestPeriodResponse) -> Self {
        Self {
            current_intensity: response.current_intensity,
            improvement: response.improvement,
            start: response.best_period_start,
            end: response.best_period_end,
            intensity: response.best_period_intensity,
        }
    }
}

/// Length in hours of the window searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period(u8);

impl Period {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(hours: u8) -> Result<Self, ClientError> {
        if (Self::MIN..=Self::MAX).contains(&hours) {
            Ok(Self(hours))
        } else {
            Err(ClientError::invalid(format!(
                "period must be between {} and {} hours, got {hours}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn hours(self) -> u8 {
        self.0
    }

    pub fn is_singular(self) -> bool {
        self.0 == 1
    }
}

impl Default for Period {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How far ahead the greenest-period search looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Horizon(u8);

impl Horizon {
    pub const OPTIONS: [u8; 3] = [6, 12, 24];

    pub fn new(hours: u8) -> Result<Self, ClientError> {
        if Self::OPTIONS.contains(&hours) {
            Ok(Self(hours))
        } else {
            Err(ClientError::invalid(format!(
                "horizon must be one of {:?} hours, got {hours}",
                Self::OPTIONS
            )))
        }
    }

    pub fn hours(self) -> u8 {
        self.0
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(12)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub period: Period,
    pub horizon: Horizon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Period(Period),
    Horizon(Horizon),
}

impl SelectionState {
    pub fn with(self, change: SelectionChange) -> Self {
        match change {
            SelectionChange::Period(period) => Self { period, ..self },
            SelectionChange::Horizon(horizon) => Self { horizon, ..self },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Platform-issued push credential, serialized the way browsers emit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    pub expiration_time: Option<i64>,
    pub keys: SubscriptionKeys,
}
