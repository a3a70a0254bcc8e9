// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session-authenticated HTTP transport for the iBMC Redfish service.
//!
//! [`Connector::open`] reads the service root once to learn the
//! `Systems`/`Managers`/`SessionService` links, creates a Redfish session
//! and derives the resource id (`1` on rack servers, `BladeN` on
//! high-density ones) from the first member of the Managers collection.
//!
//! Every mutation goes through [`Connector::request`], which:
//! - attaches the cached `X-Auth-Token`,
//! - for PATCH/PUT first GETs the target and copies its `ETag` into
//!   `If-Match` (the iBMC rejects unconditional writes),
//! - on a 401 renews the session exactly once and replays the request.

use crate::error::Error;
use crate::odata::ODataETag;
use crate::odata::ODataId;
use crate::odata::ODataRef;
use http::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use tracing::warn;

pub use reqwest::Method;
pub use reqwest::StatusCode;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Configuration parameters for the underlying reqwest client.
#[derive(Debug, Clone)]
pub struct ClientParams {
    /// HTTP request timeout
    pub timeout: Option<Duration>,
    /// TCP connection timeout
    pub connect_timeout: Option<Duration>,
    /// User-Agent header value
    pub user_agent: Option<String>,
    /// Whether to accept invalid TLS certificates
    pub accept_invalid_certs: bool,
    /// Maximum number of HTTP redirects to follow
    pub max_redirects: Option<usize>,
    /// TCP keep-alive timeout
    pub tcp_keepalive: Option<Duration>,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: Option<usize>,
    /// Forces use of rust TLS, enabled by default
    pub use_rust_tls: bool,
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(60)),
            connect_timeout: Some(Duration::from_secs(5)),
            user_agent: Some(concat!("ibmc-redfish/v", env!("CARGO_PKG_VERSION")).to_string()),
            accept_invalid_certs: false,
            max_redirects: Some(10),
            tcp_keepalive: Some(Duration::from_secs(60)),
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: Some(1),
            use_rust_tls: true,
        }
    }
}

impl ClientParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    #[must_use]
    pub const fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = Some(max);
        self
    }

    #[must_use]
    pub const fn tcp_keepalive(mut self, keepalive: Duration) -> Self {
        self.tcp_keepalive = Some(keepalive);
        self
    }

    #[must_use]
    pub const fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    fn build(self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();

        if self.use_rust_tls {
            builder = builder.use_rustls_tls();
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(max_redirects) = self.max_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(max_redirects));
        }

        if let Some(keepalive) = self.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            builder = builder.pool_idle_timeout(idle_timeout);
        }

        if let Some(max_idle) = self.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max_idle);
        }

        builder.build()
    }
}

/// A decoded iBMC response: status, the captured `ETag` and the JSON body.
#[derive(Debug)]
pub struct Response {
    url: String,
    status: StatusCode,
    etag: Option<ODataETag>,
    location: Option<String>,
    auth_token: Option<String>,
    body: Value,
}

impl Response {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn etag(&self) -> Option<&ODataETag> {
        self.etag.as_ref()
    }

    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Deserialize the body.
    ///
    /// The response `ETag` header (if any) is injected into the body as
    /// `@odata.etag` first, so resource models capture it for later
    /// conditional writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] with the failing JSON path when the body
    /// does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let mut value = self.body.clone();
        if let Some(etag) = &self.etag {
            if let Some(obj) = value.as_object_mut() {
                let etag_value = Value::String(etag.to_string());

                // Handles both absent and null values
                obj.entry("@odata.etag")
                    .and_modify(|v| *v = etag_value.clone())
                    .or_insert(etag_value);
            }
        }
        serde_path_to_error::deserialize(value).map_err(|source| Error::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ServiceRootDocument {
    #[serde(rename = "Systems")]
    systems: ODataRef,
    #[serde(rename = "Managers")]
    managers: ODataRef,
    #[serde(rename = "SessionService")]
    session_service: ODataRef,
    #[serde(rename = "Chassis")]
    chassis: Option<ODataRef>,
    #[serde(rename = "Tasks")]
    tasks: Option<ODataRef>,
    #[serde(rename = "RedfishVersion")]
    redfish_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ManagerCollection {
    #[serde(rename = "Members")]
    members: Vec<ODataRef>,
}

#[derive(Debug)]
struct Session {
    token: String,
    location: String,
}

/// The iBMC API connector.
pub struct Connector {
    address: String,
    base_url: String,
    client: reqwest::Client,
    username: String,
    password: String,
    root: ServiceRootDocument,
    resource_id: String,
    session: Mutex<Option<Session>>,
}

impl Connector {
    /// Open a session against `address` (e.g. `https://192.168.1.100`).
    ///
    /// # Errors
    ///
    /// Returns an error when the service root is unreachable, credentials
    /// are rejected, or the session response lacks an `X-Auth-Token`.
    pub async fn open(
        address: &str,
        username: &str,
        password: &str,
        verify_tls: bool,
    ) -> Result<Self, Error> {
        let params = ClientParams::new().accept_invalid_certs(!verify_tls);
        Self::open_with_params(address, username, password, params).await
    }

    /// Open a session with explicit HTTP client parameters.
    ///
    /// # Errors
    ///
    /// See [`Connector::open`].
    pub async fn open_with_params(
        address: &str,
        username: &str,
        password: &str,
        params: ClientParams,
    ) -> Result<Self, Error> {
        let address = address.trim_end_matches('/').to_string();
        let client = params.build().map_err(|source| Error::Connection {
            url: address.clone(),
            source,
        })?;
        let base_url = format!("{}/redfish/v1", address);

        // The service root is readable without authentication.
        let response = Self::send(&client, Method::GET, &base_url, None, &[]).await?;
        let root: ServiceRootDocument = response.json()?;

        let mut connector = Self {
            address,
            base_url,
            client,
            username: username.to_string(),
            password: password.to_string(),
            root,
            resource_id: String::new(),
            session: Mutex::new(None),
        };
        connector.fetch_session().await?;
        connector.resource_id = connector.fetch_resource_id().await?;
        Ok(connector)
    }

    /// Redfish protocol version reported by the service root.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.root.redfish_version.as_deref()
    }

    /// `…/Systems/{resource_id}`
    #[must_use]
    pub fn system_base_url(&self) -> String {
        format!(
            "{}{}/{}",
            self.address, self.root.systems.odata_id, self.resource_id
        )
    }

    /// `…/Managers/{resource_id}`
    #[must_use]
    pub fn manager_base_url(&self) -> String {
        format!(
            "{}{}/{}",
            self.address, self.root.managers.odata_id, self.resource_id
        )
    }

    /// `…/Chassis/{resource_id}`
    #[must_use]
    pub fn chassis_base_url(&self) -> String {
        match &self.root.chassis {
            Some(chassis) => format!(
                "{}{}/{}",
                self.address, chassis.odata_id, self.resource_id
            ),
            None => format!("{}/Chassis/{}", self.base_url, self.resource_id),
        }
    }

    /// `…/SessionService`
    #[must_use]
    pub fn session_service_base_url(&self) -> String {
        format!("{}{}", self.address, self.root.session_service.odata_id)
    }

    /// `…/TaskService`
    #[must_use]
    pub fn task_service_base_url(&self) -> String {
        match &self.root.tasks {
            Some(tasks) => format!("{}{}", self.address, tasks.odata_id),
            None => format!("{}/TaskService", self.base_url),
        }
    }

    /// Absolute URL for an oData resource path.
    ///
    /// Paths already anchored at `/redfish/v1` resolve against the server
    /// address, anything else against the Redfish root.
    #[must_use]
    pub fn get_url(&self, id: &ODataId) -> String {
        let path = id.as_str();
        if path.starts_with("/redfish/v1") {
            format!("{}{}", self.address, path)
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Perform an authenticated request.
    ///
    /// # Errors
    ///
    /// Classified per [`crate::error::HttpErrorKind`]; a second 401 after
    /// the transparent session renewal propagates as `AccessDenied`.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, Error> {
        let first = self.authorized_request(&method, url, body).await;
        match first {
            Err(Error::Http(http)) if http.is_unauthorized() => {
                // Session expired: renew it and replay the request once.
                debug!("session expired, renewing and retrying {} {}", method, url);
                self.fetch_session().await?;
                self.authorized_request(&method, url, body).await
            }
            other => other,
        }
    }

    /// Close the session. Failures are swallowed: the session expires on
    /// its own server-side.
    pub async fn close(&self) {
        let session = self.session.lock().expect("not poisoned").take();
        if let Some(session) = session {
            let url = self.absolute(&session.location);
            let headers = [(AUTH_TOKEN_HEADER, session.token)];
            if let Err(error) = Self::send(&self.client, Method::DELETE, &url, None, &headers).await
            {
                warn!("failed to delete session: {}", error);
            }
        }
    }

    async fn authorized_request(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, Error> {
        let mut headers: Vec<(&str, String)> = Vec::new();
        if let Some(token) = self.token() {
            headers.push((AUTH_TOKEN_HEADER, token));
        }

        // "If-Match" is required by the iBMC redfish API on PATCH/PUT.
        if *method == Method::PATCH || *method == Method::PUT {
            let probe = Self::send(&self.client, Method::GET, url, None, &headers).await?;
            if let Some(etag) = probe.etag() {
                headers.push((header::IF_MATCH.as_str(), etag.to_string()));
            }
        }

        debug!("iBMC request -> {} {}", method, url);
        Self::send(&self.client, method.clone(), url, body, &headers).await
    }

    async fn send(
        client: &reqwest::Client,
        method: Method,
        url: &str,
        body: Option<&Value>,
        headers: &[(&str, String)],
    ) -> Result<Response, Error> {
        let mut request = client.request(method.clone(), url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|source| Error::Connection {
            url: url.to_string(),
            source,
        })?;
        Self::handle_response(&method, url, response).await
    }

    async fn handle_response(
        method: &Method,
        url: &str,
        response: reqwest::Response,
    ) -> Result<Response, Error> {
        let status = response.status();
        let etag = Self::header_string(&response, header::ETAG.as_str());
        let location = Self::header_string(&response, header::LOCATION.as_str());
        let auth_token = Self::header_string(&response, AUTH_TOKEN_HEADER);

        let bytes = response
            .bytes()
            .await
            .map_err(|source| Error::Connection {
                url: url.to_string(),
                source,
            })?;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        if !status.is_success() {
            let body_for_error = if body.is_null() { None } else { Some(&body) };
            return Err(Error::http(
                method.as_str(),
                url,
                status.as_u16(),
                body_for_error,
            ));
        }

        debug!(
            "iBMC response -> {} {}, code: {}",
            method,
            url,
            status.as_u16()
        );
        Ok(Response {
            url: url.to_string(),
            status,
            etag: etag.map(ODataETag::from),
            location,
            auth_token,
            body,
        })
    }

    fn header_string(response: &reqwest::Response, name: &str) -> Option<String> {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    fn token(&self) -> Option<String> {
        self.session
            .lock()
            .expect("not poisoned")
            .as_ref()
            .map(|session| session.token.clone())
    }

    fn absolute(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.address, path)
        }
    }

    /// Fetch and cache a new session.
    async fn fetch_session(&self) -> Result<(), Error> {
        let url = format!("{}/Sessions", self.session_service_base_url());
        let payload = serde_json::json!({
            "UserName": self.username,
            "Password": self.password,
        });
        let response = Self::send(&self.client, Method::POST, &url, Some(&payload), &[]).await?;

        let token = response.auth_token.clone().ok_or(Error::MissingAuthToken)?;
        let location = response.location.clone().unwrap_or_default();
        *self.session.lock().expect("not poisoned") = Some(Session { token, location });
        Ok(())
    }

    /// Derive the resource id used when addressing `Systems/{id}` and
    /// `Managers/{id}` from the single member of the Managers collection.
    async fn fetch_resource_id(&self) -> Result<String, Error> {
        let url = format!("{}{}", self.address, self.root.managers.odata_id);
        let response = self.request(Method::GET, &url, None).await?;
        let managers: ManagerCollection = response.json()?;
        let manager = managers.members.first().ok_or_else(|| Error::Malformed {
            url: url.clone(),
            reason: "Managers collection has no members".to_string(),
        })?;
        Ok(manager.odata_id.last_segment().to_string())
    }
}
