// ── Container domain types ──

use serde::{Deserialize, Serialize};

/// Engine API container lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[non_exhaustive]
pub enum ContainerState {
    Running,
    Exited,
    Paused,
    Restarting,
    Dead,
    Created,
    #[strum(default)]
    Unknown(String),
}

/// Health as inferred from the free-text status line when the upstream
/// carries no structured health field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ContainerHealth {
    Healthy,
    Unhealthy,
}

/// One container, normalized from the Engine API or Portainer proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub id: String,
    /// Leading slash from the Engine API stripped.
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    /// Free-text status line, e.g. `"Up 2 hours (healthy)"`.
    pub status: String,
    pub uptime_seconds: Option<i64>,
    /// Published host ports.
    pub ports: Vec<u16>,
    pub health: Option<ContainerHealth>,
}

impl ContainerSummary {
    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn state_parses_case_insensitively() {
        assert_eq!(ContainerState::from_str("Running").unwrap(), ContainerState::Running);
        assert_eq!(ContainerState::from_str("exited").unwrap(), ContainerState::Exited);
    }

    #[test]
    fn unknown_state_is_preserved() {
        let state = ContainerState::from_str("removing").unwrap();
        assert_eq!(state, ContainerState::Unknown("removing".into()));
    }
}
