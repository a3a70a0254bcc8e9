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

//! Chassis drive sub-client.

use crate::error::Error;
use crate::resources::drive::Drive;
use crate::resources::drive::FM_STATE_HOTSPARE;
use crate::resources::drive::FM_STATE_JBOD;
use crate::resources::drive::FM_STATE_UNCONFIG_GOOD;
use crate::resources::drive::HOT_SPARE_NONE;
use crate::resources::storage::Storage;
use crate::Client;
use ibmc_redfish_core::Method;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use tracing::info;

/// iBMC drive API client.
pub struct DriveClient<'a> {
    client: &'a Client,
}

impl<'a> DriveClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Get a drive by id.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the drive cannot be fetched.
    pub async fn get(&self, drive_id: &str) -> Result<Drive, Error> {
        let url = format!(
            "{}/Drives/{}",
            self.client.connector().chassis_base_url(),
            drive_id
        );
        let response = self
            .client
            .connector()
            .request(Method::GET, &url, None)
            .await?;
        Ok(response.json()?)
    }

    /// Load all drives attached to a storage controller.
    ///
    /// # Errors
    ///
    /// Returns a transport error when any drive cannot be fetched.
    pub async fn list(&self, storage: &Storage) -> Result<Vec<Drive>, Error> {
        let mut drives = Vec::with_capacity(storage.drives.len());
        for drive_ref in &storage.drives {
            drives.push(self.client.load(&drive_ref.odata_id).await?);
        }
        Ok(drives)
    }

    /// Update drive settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToApply`] when neither property is given, or
    /// a transport error when the PATCH fails.
    pub async fn set(
        &self,
        drive: &Drive,
        firmware_state: Option<&str>,
        hotspare_type: Option<&str>,
    ) -> Result<(), Error> {
        let mut payload = Map::new();
        if let Some(hotspare_type) = hotspare_type {
            payload.insert(
                "HotspareType".to_string(),
                Value::String(hotspare_type.to_string()),
            );
        }
        if let Some(firmware_state) = firmware_state {
            payload.insert(
                "Oem".to_string(),
                json!({"Huawei": {"FirmwareStatus": firmware_state}}),
            );
        }
        if payload.is_empty() {
            return Err(Error::NothingToApply);
        }

        let url = self.client.connector().get_url(&drive.odata_id);
        self.client
            .connector()
            .request(Method::PATCH, &url, Some(&Value::Object(payload)))
            .await?;
        Ok(())
    }

    /// Restore a drive to its unallocated state:
    /// - hot-spare type back to None when it is a hot spare
    /// - firmware state back to UnconfiguredGood when it is pass-through
    ///
    /// # Errors
    ///
    /// Returns a transport error when the PATCH fails.
    pub async fn restore(&self, drive: &Drive) -> Result<(), Error> {
        info!("Start to restore drive {}.", drive.id);
        let mut firmware_state = None;
        let mut hotspare_type = None;
        if drive.has_fm_state(FM_STATE_HOTSPARE) {
            hotspare_type = Some(HOT_SPARE_NONE);
        }
        if drive.has_fm_state(FM_STATE_JBOD) {
            firmware_state = Some(FM_STATE_UNCONFIG_GOOD);
        }

        if firmware_state.is_none() && hotspare_type.is_none() {
            info!("Drive {} has nothing to restore.", drive.id);
            return Ok(());
        }
        self.set(drive, firmware_state, hotspare_type).await?;
        info!("Drive {} has been restored.", drive.id);
        Ok(())
    }
}
