//! In-memory model of the dashboard page and the rules that render into it.
//!
//! Every render starts from the nominal markup values and derives the result
//! from the response at hand, so applying the same response twice is a no-op.

use crate::models::{DisplayState, GreenestPeriod, Horizon, SelectionState};
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const INTENSITY_LEVEL: &str = "intensity-level";
pub const CURRENT_INTENSITY: &str = "current-intensity";
pub const LATEST_DATA: &str = "latest-data";
pub const BEST_PERIOD_START: &str = "best-period-start";
pub const BEST_PERIOD_END: &str = "best-period-end";
pub const BEST_PERIOD_INTENSITY: &str = "best-period-intensity";
pub const PERIOD_INTENSITY: &str = "current-period-intensity";
pub const IMPROVEMENT: &str = "improvement";
pub const DE_DEN: &str = "de-den";
pub const DE_DEN_LOWER: &str = "de-den-lower";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStyles {
    pub jumbotron_background: Option<String>,
    pub jumbotron_color: Option<String>,
    pub info_link_color: Option<String>,
    pub button_border_color: Option<String>,
    pub button_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotEmbed {
    pub spec: Value,
    pub options: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: u8,
    pub label: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorizonDropdown {
    pub options: Vec<DropdownOption>,
    pub toggle_label: String,
}

impl HorizonDropdown {
    pub fn option(&self, value: u8) -> Option<&DropdownOption> {
        self.options.iter().find(|option| option.value == value)
    }

    fn relabel_toggle(&mut self, selected: Horizon) {
        if let Some(option) = self.option(selected.hours()) {
            self.toggle_label = option.label.clone();
        }
    }
}

impl Default for HorizonDropdown {
    fn default() -> Self {
        Self {
            options: horizon_options(None),
            toggle_label: hours_label(u32::from(Horizon::default().hours())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationToggle {
    pub visible: bool,
    pub checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub display: Option<DisplayState>,
    pub greenest: Option<GreenestPeriod>,
    pub styles: PageStyles,
    pub labels: BTreeMap<&'static str, String>,
    pub body_visible: bool,
    pub plot: Option<PlotEmbed>,
    pub horizon: HorizonDropdown,
    pub period_toggle_label: String,
    pub notifications: NotificationToggle,
}

impl Page {
    pub fn label(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn apply_intensity(&mut self, display: DisplayState, selected: Horizon) {
        let colors = &display.colors;
        self.styles = PageStyles {
            jumbotron_background: Some(colors.background.clone()),
            jumbotron_color: Some(colors.foreground.clone()),
            info_link_color: Some(colors.foreground.clone()),
            button_border_color: Some(colors.border.clone()),
            button_color: Some(colors.foreground.clone()),
        };
        self.labels.insert(INTENSITY_LEVEL, display.level.clone());
        self.labels
            .insert(CURRENT_INTENSITY, display.current_intensity.to_string());
        self.labels.insert(LATEST_DATA, display.latest_data.clone());
        self.body_visible = true;
        self.plot = Some(PlotEmbed {
            spec: display.plot.clone(),
            options: json!({ "renderer": "canvas", "actions": false }),
        });
        self.horizon.options = horizon_options(Some(display.forecast_length_hours));
        self.horizon.relabel_toggle(selected);
        self.display = Some(display);
    }

    pub fn apply_greenest(&mut self, greenest: GreenestPeriod) {
        self.labels.insert(BEST_PERIOD_START, greenest.start.clone());
        self.labels.insert(BEST_PERIOD_END, greenest.end.clone());
        self.labels
            .insert(BEST_PERIOD_INTENSITY, greenest.intensity.to_string());
        self.labels
            .insert(PERIOD_INTENSITY, greenest.current_intensity.to_string());
        self.labels.insert(IMPROVEMENT, greenest.improvement.clone());
        self.greenest = Some(greenest);
    }

    /// Updates dropdown toggles and the singular/plural wording for a selection.
    pub fn apply_selection(&mut self, selection: SelectionState) {
        self.period_toggle_label = hours_label(u32::from(selection.period.hours()));
        self.horizon.relabel_toggle(selection.horizon);
        let (upper, lower) = if selection.period.is_singular() {
            ("Den", "den")
        } else {
            ("De", "de")
        };
        self.labels.insert(DE_DEN, upper.to_string());
        self.labels.insert(DE_DEN_LOWER, lower.to_string());
    }
}

pub fn hours_label(hours: u32) -> String {
    if hours == 1 {
        "1 time".to_string()
    } else {
        format!("{hours} timer")
    }
}

/// Horizon options adjusted to how many hours of forecast the server has.
pub fn horizon_options(forecast_length_hours: Option<u32>) -> Vec<DropdownOption> {
    let mut options: Vec<DropdownOption> = Horizon::OPTIONS
        .iter()
        .map(|&value| DropdownOption {
            value,
            label: hours_label(u32::from(value)),
            hidden: false,
        })
        .collect();

    let Some(length) = forecast_length_hours else {
        return options;
    };

    for option in &mut options {
        match (option.value, length) {
            (12, l) if l <= 12 => option.label = hours_label(l),
            (24, l) if l <= 12 => option.hidden = true,
            (24, l) if l < 24 => option.label = hours_label(l),
            _ => {}
        }
    }
    options
}
