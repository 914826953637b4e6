// Path: crates/gateway/src/remote.rs
//! The HTTP transport to remote perspectives.

use async_trait::async_trait;
use mpic_coordinator::RemotePerspectiveCall;
use mpic_types::check::{CheckRequest, CheckType};
use mpic_types::error::RemoteCallError;
use mpic_types::perspective::RemotePerspective;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

/// Calls each perspective's gateway over HTTPS: `POST <base>/caa-check` or
/// `POST <base>/dcv-check` with the serialized check request as the body,
/// expecting the serialized `CheckResponse` back.
pub struct HttpPerspectiveClient {
    client: Client,
    endpoints: BTreeMap<String, String>,
}

impl HttpPerspectiveClient {
    /// Builds the client with a per-call timeout. `endpoints` maps each
    /// perspective wire code to its base URL.
    pub fn new(endpoints: BTreeMap<String, String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl RemotePerspectiveCall for HttpPerspectiveClient {
    async fn call_remote_perspective(
        &self,
        perspective: &RemotePerspective,
        check_type: CheckType,
        check_request: &CheckRequest,
    ) -> Result<String, RemoteCallError> {
        let base = self
            .endpoints
            .get(&perspective.to_rir_code())
            .ok_or_else(|| {
                RemoteCallError::Transport(format!("no endpoint configured for {perspective}"))
            })?;
        let path = match check_type {
            CheckType::Caa => "caa-check",
            CheckType::Dcv | CheckType::DcvWithCaa => "dcv-check",
        };
        let url = format!("{}/{}", base.trim_end_matches('/'), path);

        let response = self
            .client
            .post(&url)
            .json(check_request)
            .send()
            .await
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteCallError::Status(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| RemoteCallError::Transport(e.to_string()))
    }
}
