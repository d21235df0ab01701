//! Guacamole REST API Client
//!
//! Implements every remote port against Apache Guacamole:
//!
//! - `POST {api}/tokens` - form login, yields `authToken` and `dataSource`
//! - `GET  {api}/session/data/{ds}/connectionGroups` - groups keyed by identifier
//! - `GET  {api}/session/data/{ds}/connections` - connections keyed by identifier
//! - `POST {api}/session/data/{ds}/connectionGroups` - create a group
//! - `POST {api}/session/data/{ds}/connections` - create a connection
//!
//! Session calls pass the token as the `token` query parameter.

use super::{
    Authenticator, GroupCreationPort, GroupLister, LeafCreationPort, LeafLister, RemoteError,
};
use crate::config::GuacamoleConfig;
use crate::models::{Attributes, LeafSpec, SnapshotRecord, ORGANIZATIONAL};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Token and data source obtained by `authenticate()`
#[derive(Debug, Clone)]
struct Session {
    token: String,
    data_source: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    auth_token: String,
    data_source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupEntry {
    identifier: String,
    name: String,
    parent_identifier: Option<String>,
    #[serde(rename = "type")]
    group_type: Option<String>,
    #[serde(default)]
    attributes: HashMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionEntry {
    identifier: String,
    name: String,
    parent_identifier: Option<String>,
    protocol: String,
    #[serde(default)]
    attributes: HashMap<String, Option<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewGroup<'a> {
    parent_identifier: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    group_type: &'a str,
    attributes: &'a Attributes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewConnection<'a> {
    parent_identifier: &'a str,
    name: &'a str,
    protocol: &'a str,
    parameters: &'a Attributes,
    attributes: &'a Attributes,
}

#[derive(Debug, Deserialize)]
struct Created {
    identifier: Option<String>,
}

/// Drop null attribute values; they carry no information for reconciliation
fn present(attributes: HashMap<String, Option<String>>) -> Attributes {
    attributes
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

impl From<GroupEntry> for SnapshotRecord {
    fn from(entry: GroupEntry) -> Self {
        Self {
            id: entry.identifier,
            name: entry.name,
            parent_id: entry.parent_identifier,
            kind: entry.group_type.unwrap_or_else(|| ORGANIZATIONAL.to_string()),
            attributes: present(entry.attributes),
        }
    }
}

impl From<ConnectionEntry> for SnapshotRecord {
    fn from(entry: ConnectionEntry) -> Self {
        Self {
            id: entry.identifier,
            name: entry.name,
            parent_id: entry.parent_identifier,
            kind: entry.protocol,
            attributes: present(entry.attributes),
        }
    }
}

/// HTTP client for one Guacamole installation
pub struct GuacamoleClient {
    http: Client,
    config: GuacamoleConfig,
    session: RwLock<Option<Session>>,
}

impl GuacamoleClient {
    /// Create an unauthenticated client
    pub fn new(config: GuacamoleConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            session: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &GuacamoleConfig {
        &self.config
    }

    /// Data source of the current session, if authenticated
    pub async fn data_source(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.data_source.clone())
    }

    async fn session(&self) -> Result<Session, RemoteError> {
        self.session
            .read()
            .await
            .clone()
            .ok_or(RemoteError::NotAuthenticated)
    }

    fn data_url(&self, session: &Session, resource: &str) -> String {
        format!(
            "{}/session/data/{}/{}",
            self.config.base_url(),
            session.data_source,
            resource
        )
    }

    async fn get_collection<T>(&self, resource: &str) -> Result<Vec<T>, RemoteError>
    where
        T: serde::de::DeserializeOwned,
    {
        let session = self.session().await?;
        let response = self
            .http
            .get(self.data_url(&session, resource))
            .query(&[("token", session.token.as_str())])
            .send()
            .await?;
        let entries: HashMap<String, T> = ensure_success(response).await?.json().await?;
        Ok(entries.into_values().collect())
    }

    async fn post_created<B>(&self, resource: &str, body: &B) -> Result<String, RemoteError>
    where
        B: Serialize + Sync,
    {
        let session = self.session().await?;
        let response = self
            .http
            .post(self.data_url(&session, resource))
            .query(&[("token", session.token.as_str())])
            .json(body)
            .send()
            .await?;
        let created: Created = ensure_success(response).await?.json().await?;
        created
            .identifier
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RemoteError::invalid_response(format!("no identifier in {resource} response")))
    }
}

/// Turn a non-success status into `RemoteError::Api` carrying the body text
async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(RemoteError::api(status.as_u16(), message))
}

#[async_trait]
impl Authenticator for GuacamoleClient {
    async fn authenticate(&self) -> Result<(), RemoteError> {
        let url = format!("{}/tokens", self.config.base_url());
        let response = self
            .http
            .post(url)
            .form(&[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::authentication_rejected(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response.json().await?;
        let data_source = self
            .config
            .data_source
            .clone()
            .or(token.data_source)
            .ok_or_else(|| RemoteError::invalid_response("token response has no dataSource"))?;

        tracing::info!(
            "Authenticated with Guacamole as '{}' (data source: {})",
            self.config.username,
            data_source
        );
        *self.session.write().await = Some(Session {
            token: token.auth_token,
            data_source,
        });
        Ok(())
    }
}

#[async_trait]
impl GroupLister for GuacamoleClient {
    async fn list_groups(&self) -> Result<Vec<SnapshotRecord>, RemoteError> {
        let entries: Vec<GroupEntry> = self.get_collection("connectionGroups").await?;
        tracing::debug!("Listed {} existing connection groups", entries.len());
        Ok(entries.into_iter().map(SnapshotRecord::from).collect())
    }
}

#[async_trait]
impl LeafLister for GuacamoleClient {
    async fn list_leaves(&self) -> Result<Vec<SnapshotRecord>, RemoteError> {
        let entries: Vec<ConnectionEntry> = self.get_collection("connections").await?;
        tracing::debug!("Listed {} existing connections", entries.len());
        Ok(entries.into_iter().map(SnapshotRecord::from).collect())
    }
}

#[async_trait]
impl GroupCreationPort for GuacamoleClient {
    async fn create_group(&self, name: &str, parent_id: &str) -> Result<String, RemoteError> {
        let body = NewGroup {
            parent_identifier: parent_id,
            name,
            group_type: ORGANIZATIONAL,
            attributes: &self.config.group_attributes,
        };
        let id = self.post_created("connectionGroups", &body).await?;
        tracing::info!("Created connection group '{}' with ID {}", name, id);
        Ok(id)
    }
}

#[async_trait]
impl LeafCreationPort for GuacamoleClient {
    async fn create_leaf(&self, spec: &LeafSpec, parent_id: &str) -> Result<String, RemoteError> {
        let body = NewConnection {
            parent_identifier: parent_id,
            name: &spec.name,
            protocol: &spec.kind,
            parameters: &spec.attributes,
            attributes: &self.config.connection_attributes,
        };
        let id = self.post_created("connections", &body).await?;
        tracing::info!("Created connection '{}' with ID {}", spec.name, id);
        Ok(id)
    }
}
