// ── Container adapter (Docker / Portainer) ──
//
// Both upstreams return the same Engine API wire shape; Portainer just
// proxies it per endpoint. When no endpoint id is configured the first
// registered endpoint is used, with a warning on first resolution.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use homedash_api::docker::{ContainerJson, DockerClient, PortainerClient};

use super::{Adapter, SourceData, SourceId, SourceKind};
use crate::model::{ContainerHealth, ContainerState, ContainerSummary};

enum Backend {
    Direct(DockerClient),
    Portainer {
        client: PortainerClient,
        endpoint_id: Option<i64>,
    },
}

pub struct ContainerAdapter {
    id: SourceId,
    interval: Duration,
    backend: Backend,
    resolved_endpoint: OnceCell<i64>,
}

impl ContainerAdapter {
    /// Talk to a Docker Engine API directly.
    pub fn direct(id: SourceId, client: DockerClient, interval: Duration) -> Self {
        Self {
            id,
            interval,
            backend: Backend::Direct(client),
            resolved_endpoint: OnceCell::new(),
        }
    }

    /// Talk to the Engine API through a Portainer instance.
    pub fn portainer(
        id: SourceId,
        client: PortainerClient,
        endpoint_id: Option<i64>,
        interval: Duration,
    ) -> Self {
        Self {
            id,
            interval,
            backend: Backend::Portainer {
                client,
                endpoint_id,
            },
            resolved_endpoint: OnceCell::new(),
        }
    }

    async fn endpoint_id(&self, client: &PortainerClient) -> Result<i64, homedash_api::Error> {
        if let Backend::Portainer {
            endpoint_id: Some(id),
            ..
        } = self.backend
        {
            return Ok(id);
        }

        self.resolved_endpoint
            .get_or_try_init(|| async {
                let endpoints = client.list_endpoints().await?;
                let first = endpoints.first().ok_or(homedash_api::Error::Config {
                    service: "portainer",
                    message: "no endpoints registered".into(),
                })?;
                warn!(
                    source = %self.id,
                    endpoint = %first.name,
                    "no endpoint configured, falling back to the first registered one"
                );
                Ok(first.id)
            })
            .await
            .copied()
    }
}

#[async_trait]
impl Adapter for ContainerAdapter {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Containers
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error> {
        let raw = match &self.backend {
            Backend::Direct(client) => client.list_containers().await?,
            Backend::Portainer { client, .. } => {
                let endpoint = self.endpoint_id(client).await?;
                client.list_containers(endpoint).await?
            }
        };
        debug!(source = %self.id, count = raw.len(), "fetched containers");

        let mut containers: Vec<ContainerSummary> = raw.iter().map(normalize).collect();
        sort_containers(&mut containers);
        Ok(SourceData::Containers(containers))
    }
}

fn normalize(raw: &ContainerJson) -> ContainerSummary {
    let name = raw
        .names
        .first()
        .map_or_else(|| raw.id.clone(), |n| n.trim_start_matches('/').to_owned());

    let state = ContainerState::from_str(&raw.state).unwrap_or_else(|_| {
        ContainerState::Unknown(raw.state.clone())
    });

    let uptime_seconds = if state == ContainerState::Running {
        Some((Utc::now().timestamp() - raw.created).max(0))
    } else {
        None
    };

    let mut ports: Vec<u16> = raw.ports.iter().filter_map(|p| p.public_port).collect();
    ports.sort_unstable();
    ports.dedup();

    ContainerSummary {
        id: raw.id.clone(),
        name,
        image: raw.image.clone(),
        state,
        status: raw.status.clone(),
        uptime_seconds,
        ports,
        health: infer_health(&raw.status),
    }
}

/// Health from the free-text status line; the list endpoint has no
/// structured health field.
fn infer_health(status: &str) -> Option<ContainerHealth> {
    let lower = status.to_lowercase();
    if lower.contains("unhealthy") {
        Some(ContainerHealth::Unhealthy)
    } else if lower.contains("healthy") {
        Some(ContainerHealth::Healthy)
    } else {
        None
    }
}

/// Running first, then alphabetical by name.
fn sort_containers(containers: &mut [ContainerSummary]) {
    containers.sort_by(|a, b| {
        b.is_running()
            .cmp(&a.is_running())
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn container(name: &str, state: &str, status: &str) -> ContainerJson {
        serde_json::from_value(serde_json::json!({
            "Id": format!("id-{name}"),
            "Names": [format!("/{name}")],
            "Image": "img:latest",
            "State": state,
            "Status": status,
            "Created": 1_714_000_000,
            "Ports": [ { "PrivatePort": 80, "PublicPort": 8080, "Type": "tcp" } ]
        }))
        .unwrap()
    }

    #[test]
    fn names_lose_their_leading_slash() {
        let summary = normalize(&container("jellyfin", "running", "Up 2 hours"));
        assert_eq!(summary.name, "jellyfin");
        assert_eq!(summary.ports, vec![8080]);
    }

    #[test]
    fn health_is_inferred_from_status_text() {
        assert_eq!(
            normalize(&container("a", "running", "Up 2 hours (healthy)")).health,
            Some(ContainerHealth::Healthy)
        );
        assert_eq!(
            normalize(&container("a", "running", "Up 2 hours (unhealthy)")).health,
            Some(ContainerHealth::Unhealthy)
        );
        assert_eq!(normalize(&container("a", "running", "Up 2 hours")).health, None);
    }

    #[test]
    fn running_containers_sort_before_stopped_then_alphabetical() {
        let mut list = vec![
            normalize(&container("zebra", "running", "Up 1 hour")),
            normalize(&container("apple", "exited", "Exited (0) 2 days ago")),
            normalize(&container("mango", "running", "Up 3 hours")),
        ];
        sort_containers(&mut list);

        let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["mango", "zebra", "apple"]);
    }

    #[test]
    fn stopped_containers_report_no_uptime() {
        let summary = normalize(&container("a", "exited", "Exited (0) 2 days ago"));
        assert_eq!(summary.uptime_seconds, None);
    }
}
