use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shortest month length. A grace window wider than this would reach
/// into the neighbouring cycle.
pub const MAX_WINDOW_DAYS: u32 = 27;

/// Thresholds that shape the grace window around each cutoff date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertOptions {
    /// Days before the cutoff at which the "upcoming" window opens.
    #[serde(default = "default_upcoming_horizon_days")]
    pub upcoming_horizon_days: u32,
    /// Days after the cutoff that are still inside grace.
    #[serde(default = "default_overdue_confirm_days")]
    pub overdue_confirm_days: u32,
}

fn default_upcoming_horizon_days() -> u32 { 3 }
fn default_overdue_confirm_days() -> u32 { 5 }

impl Default for AlertOptions {
    fn default() -> Self {
        Self {
            upcoming_horizon_days: default_upcoming_horizon_days(),
            overdue_confirm_days:  default_overdue_confirm_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub alerts: AlertOptions,
    /// Roster status strings that mean "withdrawn". Matched case-insensitively.
    #[serde(default = "default_inactive_statuses")]
    pub inactive_statuses: Vec<String>,
}

fn default_inactive_statuses() -> Vec<String> {
    ["baja", "inactive", "inactivo", "withdrawn"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alerts: AlertOptions::default(),
            inactive_statuses: default_inactive_statuses(),
        }
    }
}

impl EngineConfig {
    /// Load `{data_dir}/billing.json`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/billing.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        log::debug!("Loaded engine config from {path}");
        Ok(config)
    }

    /// Like `load`, but `Ok(None)` when `{data_dir}/billing.json` does not
    /// exist. A file that exists but fails to parse or validate is an error.
    pub fn load_if_present(data_dir: &str) -> anyhow::Result<Option<Self>> {
        if !Path::new(data_dir).join("billing.json").exists() {
            return Ok(None);
        }
        Self::load(data_dir).map(Some)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let a = &self.alerts;
        if a.upcoming_horizon_days > MAX_WINDOW_DAYS {
            anyhow::bail!(
                "upcoming_horizon_days must be <= {MAX_WINDOW_DAYS}, got {}",
                a.upcoming_horizon_days
            );
        }
        if a.overdue_confirm_days > MAX_WINDOW_DAYS {
            anyhow::bail!(
                "overdue_confirm_days must be <= {MAX_WINDOW_DAYS}, got {}",
                a.overdue_confirm_days
            );
        }
        Ok(())
    }

    /// Map a roster status string onto the active flag.
    pub fn is_active_status(&self, status: &str) -> bool {
        let status = status.trim();
        !self
            .inactive_statuses
            .iter()
            .any(|s| s.eq_ignore_ascii_case(status))
    }
}
