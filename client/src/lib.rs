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

//! Rust client for HUAWEI iBMC out-of-band RAID management over Redfish.
//!
//! The entry point is [`connect`]:
//!
//! ```rust,no_run
//! use ibmc_redfish::{connect, LogicalDiskSpec};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = connect("https://192.168.1.100", "admin", "password", true).await?;
//!
//! let disks: Vec<LogicalDiskSpec> = serde_json::from_value(serde_json::json!([
//!     { "raid_level": "1", "size_gb": 100, "volume_name": "os" },
//!     { "raid_level": "5", "size_gb": "MAX", "is_root_volume": true }
//! ]))?;
//! client.storage().apply_raid_configuration(&disks).await?;
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod chassis;
pub mod error;
pub mod raid;
pub mod resources;
pub mod system;
pub mod task;

#[doc(inline)]
pub use chassis::DriveClient;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use system::storage::LogicalDiskSpec;
#[doc(inline)]
pub use system::storage::SizeGb;
#[doc(inline)]
pub use system::storage::StorageClient;
#[doc(inline)]
pub use system::volume::CreateVolumeRequest;
#[doc(inline)]
pub use system::volume::VolumeClient;
#[doc(inline)]
pub use system::SystemClient;
#[doc(inline)]
pub use task::TaskClient;

pub use ibmc_redfish_core::ClientParams;

use ibmc_redfish_core::Connector;
use ibmc_redfish_core::Method;
use ibmc_redfish_core::ODataId;
use ibmc_redfish_core::Response;
use resources::Collection;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Polling and settle intervals of the long-running operations.
///
/// The defaults match the cadence the iBMC needs in practice; tests run
/// with zero durations.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Delay between task state polls.
    pub task_poll_interval: Duration,
    /// Delay between `StorageConfigReady` polls.
    pub storage_ready_interval: Duration,
    /// Settle time after RAID mutations, before the next one is issued.
    pub raid_settle_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            task_poll_interval: Duration::from_secs(3),
            storage_ready_interval: Duration::from_secs(30),
            raid_settle_interval: Duration::from_secs(20),
        }
    }
}

/// Connect to an iBMC and open a Redfish session.
///
/// `verify_tls: false` accepts the self-signed certificates most BMCs
/// ship with.
///
/// # Errors
///
/// Returns a transport error when the session cannot be established.
pub async fn connect(
    address: &str,
    username: &str,
    password: &str,
    verify_tls: bool,
) -> Result<Client, Error> {
    let params = ClientParams::new().accept_invalid_certs(!verify_tls);
    connect_with(address, username, password, params, ClientConfig::default()).await
}

/// Connect with explicit HTTP parameters and intervals.
///
/// # Errors
///
/// See [`connect`].
pub async fn connect_with(
    address: &str,
    username: &str,
    password: &str,
    params: ClientParams,
    config: ClientConfig,
) -> Result<Client, Error> {
    let connector = Connector::open_with_params(address, username, password, params).await?;
    Ok(Client { connector, config })
}

/// iBMC API client: one Redfish session plus the typed sub-clients.
pub struct Client {
    connector: Connector,
    config: ClientConfig,
}

impl Client {
    pub(crate) fn connector(&self) -> &Connector {
        &self.connector
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Redfish protocol version reported by the service root.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.connector.version()
    }

    /// System resource client.
    #[must_use]
    pub fn system(&self) -> SystemClient<'_> {
        SystemClient::new(self)
    }

    /// Storage (RAID planner/applier) client.
    #[must_use]
    pub fn storage(&self) -> StorageClient<'_> {
        StorageClient::new(self)
    }

    /// Volume client.
    #[must_use]
    pub fn volume(&self) -> VolumeClient<'_> {
        VolumeClient::new(self)
    }

    /// Task-service client.
    #[must_use]
    pub fn task(&self) -> TaskClient<'_> {
        TaskClient::new(self)
    }

    /// Chassis drive client.
    #[must_use]
    pub fn drive(&self) -> DriveClient<'_> {
        DriveClient::new(self)
    }

    /// Load an oData resource into a typed model.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the resource cannot be fetched or
    /// decoded.
    pub async fn load<T: DeserializeOwned>(&self, odata_id: &ODataId) -> Result<T, Error> {
        let url = self.connector.get_url(odata_id);
        let response = self.connector.request(Method::GET, &url, None).await?;
        Ok(response.json()?)
    }

    /// Load an oData collection resource.
    ///
    /// # Errors
    ///
    /// See [`Client::load`].
    pub async fn load_collection(&self, odata_id: &ODataId) -> Result<Collection, Error> {
        self.load(odata_id).await
    }

    /// Load every member of an oData collection.
    ///
    /// # Errors
    ///
    /// See [`Client::load`].
    pub async fn load_members<T: DeserializeOwned>(
        &self,
        odata_id: &ODataId,
    ) -> Result<Vec<T>, Error> {
        let collection = self.load_collection(odata_id).await?;
        let mut members = Vec::with_capacity(collection.resources().len());
        for member in collection.resources() {
            members.push(self.load(&member.odata_id).await?);
        }
        Ok(members)
    }

    /// Delete an oData resource.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the DELETE fails.
    pub async fn delete(&self, odata_id: &ODataId) -> Result<Response, Error> {
        let url = self.connector.get_url(odata_id);
        Ok(self.connector.request(Method::DELETE, &url, None).await?)
    }

    /// Close the Redfish session, best-effort.
    pub async fn close(&self) {
        self.connector.close().await;
    }
}
