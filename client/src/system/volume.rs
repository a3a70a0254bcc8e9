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

//! Volume sub-client.
//!
//! Volume mutations are asynchronous on the iBMC: creation and deletion
//! both answer with a Task, which this client polls to completion through
//! [`crate::task::TaskClient`].

use crate::error::Error;
use crate::resources::storage::Volume;
use crate::resources::task::Task;
use crate::resources::Collection;
use crate::Client;
use ibmc_redfish_core::Method;
use ibmc_redfish_core::ODataId;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;

/// Perform quick initialization. No task will be created.
pub const INIT_QUICK: &str = "QuickInit";
/// Perform complete initialization. A task will be created.
pub const INIT_FULL: &str = "FullInit";
/// Cancel the initialization. No task will be created.
pub const INIT_CANCEL: &str = "CancelInit";

/// What to create: the wire shape is assembled in
/// [`CreateVolumeRequest::payload`], omitting empty fields the way the
/// iBMC expects.
#[derive(Debug, Clone)]
pub struct CreateVolumeRequest {
    pub storage_id: String,
    pub volume_name: Option<String>,
    /// Canonical RAID level name; `None` when carving the volume out of an
    /// existing disk group.
    pub raid_level: Option<&'static str>,
    /// OEM numeric drive ids.
    pub drives: Vec<i64>,
    /// `None` means "MAX": let the controller size the volume.
    pub capacity_bytes: Option<i64>,
    pub span: Option<usize>,
    pub bootable: bool,
}

impl CreateVolumeRequest {
    pub(crate) fn payload(&self) -> Value {
        let mut oem = Map::new();
        if let Some(volume_name) = &self.volume_name {
            oem.insert(
                "VolumeName".to_string(),
                Value::String(volume_name.clone()),
            );
        }
        if let Some(raid_level) = self.raid_level {
            oem.insert(
                "VolumeRaidLevel".to_string(),
                Value::String(raid_level.to_string()),
            );
        }
        if !self.drives.is_empty() {
            oem.insert("Drives".to_string(), json!(self.drives));
        }
        if let Some(span) = self.span {
            if span > 1 {
                oem.insert("SpanNumber".to_string(), json!(span));
            }
        }

        let mut payload = Map::new();
        if let Some(capacity_bytes) = self.capacity_bytes {
            payload.insert("CapacityBytes".to_string(), json!(capacity_bytes));
        }
        payload.insert("Oem".to_string(), json!({ "Huawei": oem }));
        Value::Object(payload)
    }
}

/// iBMC volume API client.
pub struct VolumeClient<'a> {
    client: &'a Client,
}

impl<'a> VolumeClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn collection_url(&self, storage_id: &str) -> String {
        format!(
            "{}/Storages/{}/Volumes",
            self.client.connector().system_base_url(),
            storage_id
        )
    }

    fn volume_url(&self, storage_id: &str, volume_id: &str) -> String {
        format!(
            "{}/Storages/{}/Volumes/{}",
            self.client.connector().system_base_url(),
            storage_id,
            volume_id
        )
    }

    /// Get a volume by id.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the volume cannot be fetched.
    pub async fn get(&self, storage_id: &str, volume_id: &str) -> Result<Volume, Error> {
        let url = self.volume_url(storage_id, volume_id);
        let response = self
            .client
            .connector()
            .request(Method::GET, &url, None)
            .await?;
        Ok(response.json()?)
    }

    /// List all volumes of a storage controller.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the collection or a member cannot be
    /// fetched.
    pub async fn list(&self, storage_id: &str) -> Result<Vec<Volume>, Error> {
        let url = self.collection_url(storage_id);
        let response = self
            .client
            .connector()
            .request(Method::GET, &url, None)
            .await?;
        let collection: Collection = response.json()?;
        let mut volumes = Vec::with_capacity(collection.resources().len());
        for member in collection.resources() {
            volumes.push(self.client.load(&member.odata_id).await?);
        }
        Ok(volumes)
    }

    /// Create a volume and wait for the creation task.
    ///
    /// Returns the created volume id. When the request is bootable the new
    /// volume is additionally patched with `BootEnable`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskFailed`] when the BMC rejects the creation, or
    /// a transport error.
    pub async fn create(&self, request: &CreateVolumeRequest) -> Result<String, Error> {
        let url = self.collection_url(&request.storage_id);
        let payload = request.payload();
        let response = self
            .client
            .connector()
            .request(Method::POST, &url, Some(&payload))
            .await?;
        let task: Task = response.json()?;
        let task = self.client.task().wait_task(task).await?;
        task.raise_if_failed()?;

        let created_volume_odata_id = task
            .message_args()
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingAttribute {
                attribute: "Messages/MessageArgs".to_string(),
                resource: format!("task {}", task.id),
            })?;
        let created_volume_odata_id = ODataId::from(created_volume_odata_id);

        if request.bootable {
            self.set_bootable(&created_volume_odata_id, true).await?;
        }

        Ok(created_volume_odata_id.last_segment().to_string())
    }

    /// Set or clear the bootable flag of a volume.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the PATCH fails.
    pub async fn set_bootable(
        &self,
        volume_odata_id: &ODataId,
        bootable: bool,
    ) -> Result<(), Error> {
        let payload = json!({
            "Oem": {
                "Huawei": {
                    "BootEnable": bootable
                }
            }
        });
        let url = self.client.connector().get_url(volume_odata_id);
        self.client
            .connector()
            .request(Method::PATCH, &url, Some(&payload))
            .await?;
        Ok(())
    }

    /// Start a volume initialization action.
    ///
    /// `init_type` is one of [`INIT_QUICK`], [`INIT_FULL`], [`INIT_CANCEL`].
    ///
    /// # Errors
    ///
    /// Returns a transport error when the action is rejected.
    pub async fn init(
        &self,
        storage_id: &str,
        volume_id: &str,
        init_type: &str,
    ) -> Result<(), Error> {
        let url = format!(
            "{}/Actions/Volume.Initialize",
            self.volume_url(storage_id, volume_id)
        );
        let payload = json!({ "Type": init_type });
        self.client
            .connector()
            .request(Method::POST, &url, Some(&payload))
            .await?;
        Ok(())
    }

    /// Delete a volume and wait for the deletion task.
    ///
    /// Returns the final task; the caller decides whether a failure is
    /// fatal.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the DELETE or the task reload fails.
    pub async fn delete(&self, storage_id: &str, volume_id: &str) -> Result<Task, Error> {
        let url = self.volume_url(storage_id, volume_id);
        self.delete_by_odata_id(&ODataId::from(url)).await
    }

    /// Delete a volume by its oData id and wait for the deletion task.
    ///
    /// # Errors
    ///
    /// See [`VolumeClient::delete`].
    pub async fn delete_by_odata_id(&self, odata_id: &ODataId) -> Result<Task, Error> {
        let url = self.client.connector().get_url(odata_id);
        let response = self
            .client
            .connector()
            .request(Method::DELETE, &url, None)
            .await?;
        let task: Task = response.json()?;
        self.client.task().wait_task(task).await
    }
}
