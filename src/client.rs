// src/client.rs
//! HTTP client for a remote registry service.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::message::{
    DeregisterRequest, DeregisterResponse, ErrorResponse, HealthResponse, LookupRequest,
    RegisterRequest,
};
use crate::registry::{Record, RecordId};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client for the service at `base_url`, e.g. `http://localhost:4214`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub async fn register(&self, name: &str, address: &str) -> Result<Record, ClientError> {
        let req = RegisterRequest {
            name: name.to_owned(),
            address: address.to_owned(),
        };
        self.post("register", &req).await
    }

    pub async fn lookup(&self, name: &str) -> Result<Record, ClientError> {
        let req = LookupRequest {
            name: name.to_owned(),
        };
        self.post("lookup", &req).await
    }

    pub async fn deregister(&self, id: RecordId) -> Result<DeregisterResponse, ClientError> {
        self.post("deregister", &DeregisterRequest { id }).await
    }

    pub async fn records(&self) -> Result<Vec<Record>, ClientError> {
        let response = self.client.get(self.url("records")).send().await?;
        decode(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.client.get(self.url("health")).send().await?;
        decode(response).await
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{route}", self.base_url)
    }

    async fn post<B, T>(&self, route: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(route))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

/// A service's own entry in the registry.
///
/// Holds the name and address the service announces, remembers the id the
/// registry handed back and deregisters by that id.
#[derive(Debug, Clone)]
pub struct Registration {
    client: RegistryClient,
    name: String,
    address: String,
    id: Option<RecordId>,
}

impl Registration {
    pub fn new(
        client: RegistryClient,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            client,
            name: name.into(),
            address: address.into(),
            id: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Id assigned by the registry, if currently registered.
    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn is_registered(&self) -> bool {
        self.id.is_some()
    }

    /// Announce this service. Fails if this handle is already registered.
    pub async fn register(&mut self) -> Result<Record, ClientError> {
        if let Some(id) = self.id {
            return Err(ClientError::AlreadyRegistered(id));
        }
        let record = self.client.register(&self.name, &self.address).await?;
        tracing::debug!(id = %record.id, name = %record.name, "registered with registry");
        self.id = Some(record.id);
        Ok(record)
    }

    /// Withdraw this service using the stored id.
    ///
    /// The stored id is cleared on success and when the registry no longer
    /// knows it.
    pub async fn deregister(&mut self) -> Result<DeregisterResponse, ClientError> {
        let id = self.id.ok_or(ClientError::NotRegistered)?;
        match self.client.deregister(id).await {
            Ok(ack) => {
                self.id = None;
                Ok(ack)
            }
            Err(e) if e.is_not_found() => {
                self.id = None;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    // Bodies from something other than the registry (a proxy, an older
    // server) are not `ErrorResponse`s.
    match response.json::<ErrorResponse>().await {
        Ok(err) => Err(ClientError::Registry {
            kind: err.error,
            message: err.message,
        }),
        Err(_) => Err(ClientError::UnexpectedStatus(status.as_u16())),
    }
}
