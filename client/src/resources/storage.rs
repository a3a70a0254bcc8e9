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

//! Storage controller and volume resources.

use crate::resources::Oem;
use crate::resources::Status;
use ibmc_redfish_core::ODataETag;
use ibmc_redfish_core::ODataId;
use ibmc_redfish_core::ODataRef;
use serde_json::Value;

use serde::Deserialize;

/// iBMC system storage controller resource model.
///
/// The iBMC exposes exactly one controller per storage resource; the
/// controller-level attributes live in `StorageControllers[0]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    #[serde(rename = "@odata.id")]
    pub odata_id: ODataId,
    #[serde(rename = "@odata.etag")]
    pub odata_etag: Option<ODataETag>,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "StorageControllers", default)]
    pub storage_controllers: Vec<StorageController>,
    /// Physical drives attached to this controller.
    #[serde(rename = "Drives", default)]
    pub drives: Vec<ODataRef>,
    /// Link to the volume collection.
    #[serde(rename = "Volumes")]
    pub volumes: Option<ODataRef>,
    #[serde(rename = "Actions")]
    pub actions: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageController {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Model")]
    pub model: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<Status>,
    #[serde(rename = "Oem")]
    pub oem: Option<Oem<StorageControllerOem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageControllerOem {
    #[serde(rename = "SupportedRAIDLevels", default)]
    pub supported_raid_levels: Vec<String>,
    #[serde(rename = "OOBSupport")]
    pub oob_support: Option<bool>,
    #[serde(rename = "JBODState")]
    pub jbod_state: Option<bool>,
}

impl Storage {
    fn controller(&self) -> Option<&StorageController> {
        self.storage_controllers.first()
    }

    fn controller_oem(&self) -> Option<&StorageControllerOem> {
        self.controller()
            .and_then(|controller| controller.oem.as_ref())
            .and_then(|oem| oem.huawei.as_ref())
    }

    #[must_use]
    pub fn controller_name(&self) -> Option<&str> {
        self.controller().and_then(|controller| controller.name.as_deref())
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.controller().and_then(|controller| controller.model.as_deref())
    }

    #[must_use]
    pub fn supported_raid_levels(&self) -> &[String] {
        self.controller_oem()
            .map(|oem| oem.supported_raid_levels.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn support_oob(&self) -> bool {
        self.controller_oem()
            .and_then(|oem| oem.oob_support)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn is_jbod_mode(&self) -> bool {
        self.controller_oem()
            .and_then(|oem| oem.jbod_state)
            .unwrap_or(false)
    }

    /// Whether this storage matches a user-supplied controller hint.
    ///
    /// An empty hint matches nothing; the caller decides the
    /// single-controller default.
    #[must_use]
    pub fn matches(&self, hint: &str) -> bool {
        if hint.is_empty() {
            return false;
        }
        hint == self.id
            || self.name.as_deref() == Some(hint)
            || self.controller_name() == Some(hint)
    }

    /// Target URI of a named action, looked up both at the top level and
    /// under the OEM envelope.
    #[must_use]
    pub fn action_target(&self, action_name: &str) -> Option<&str> {
        let actions = self.actions.as_ref()?;
        let key = format!("#{}", action_name);
        if let Some(action) = actions.get(&key) {
            return action.get("target").and_then(Value::as_str);
        }
        actions
            .get("Oem")
            .and_then(|oem| oem.get("Huawei"))
            .and_then(|oem| oem.get(&key))
            .and_then(|action| action.get("target"))
            .and_then(Value::as_str)
    }
}

/// iBMC system volume resource model.
#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    #[serde(rename = "@odata.id")]
    pub odata_id: ODataId,
    #[serde(rename = "@odata.etag")]
    pub odata_etag: Option<ODataETag>,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<Status>,
    #[serde(rename = "CapacityBytes")]
    pub capacity_bytes: Option<i64>,
    #[serde(rename = "Links")]
    pub links: Option<VolumeLinks>,
    #[serde(rename = "Oem")]
    pub oem: Option<Oem<VolumeOem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeLinks {
    #[serde(rename = "Drives", default)]
    pub drives: Vec<ODataRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeOem {
    #[serde(rename = "VolumeName")]
    pub volume_name: Option<String>,
    #[serde(rename = "VolumeRaidLevel")]
    pub raid_level: Option<String>,
    #[serde(rename = "SpanNumber")]
    pub span_number: Option<usize>,
    #[serde(rename = "NumDrivePerSpan")]
    pub drive_number_per_span: Option<usize>,
    #[serde(rename = "BootEnable")]
    pub boot_enable: Option<bool>,
}

impl Volume {
    fn volume_oem(&self) -> Option<&VolumeOem> {
        self.oem.as_ref().and_then(|oem| oem.huawei.as_ref())
    }

    #[must_use]
    pub fn capacity_bytes(&self) -> i64 {
        self.capacity_bytes.unwrap_or(0)
    }

    #[must_use]
    pub fn volume_oem_name(&self) -> Option<&str> {
        self.volume_oem().and_then(|oem| oem.volume_name.as_deref())
    }

    #[must_use]
    pub fn raid_level(&self) -> Option<&str> {
        self.volume_oem().and_then(|oem| oem.raid_level.as_deref())
    }

    #[must_use]
    pub fn span_number(&self) -> Option<usize> {
        self.volume_oem().and_then(|oem| oem.span_number)
    }

    #[must_use]
    pub fn bootable(&self) -> Option<bool> {
        self.volume_oem().and_then(|oem| oem.boot_enable)
    }

    /// Links to the drives this volume is built on.
    #[must_use]
    pub fn drive_refs(&self) -> &[ODataRef] {
        self.links
            .as_ref()
            .map(|links| links.drives.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_storage() -> Storage {
        serde_json::from_value(json!({
            "@odata.id": "/redfish/v1/Systems/1/Storages/RAIDStorage0",
            "Id": "RAIDStorage0",
            "Name": "RAIDStorage0",
            "StorageControllers": [{
                "Name": "RAID Card1 Controller",
                "Model": "SAS3508",
                "Oem": {"Huawei": {
                    "SupportedRAIDLevels": ["RAID0", "RAID1", "RAID5"],
                    "OOBSupport": true,
                    "JBODState": false
                }}
            }],
            "Drives": [{"@odata.id": "/redfish/v1/Chassis/1/Drives/HDDPlaneDisk0"}],
            "Volumes": {"@odata.id": "/redfish/v1/Systems/1/Storages/RAIDStorage0/Volumes"},
            "Actions": {
                "Oem": {"Huawei": {
                    "#Storage.RestoreStorageControllerDefaultSettings": {
                        "target": "/redfish/v1/Systems/1/Storages/RAIDStorage0/Actions/Oem/Huawei/Storage.RestoreStorageControllerDefaultSettings"
                    }
                }}
            }
        }))
        .expect("valid storage")
    }

    #[test]
    fn test_matches_hint() {
        let storage = sample_storage();
        assert!(storage.matches("RAIDStorage0"));
        assert!(storage.matches("RAID Card1 Controller"));
        assert!(!storage.matches("RAIDStorage1"));
        assert!(!storage.matches(""));
    }

    #[test]
    fn test_controller_attributes() {
        let storage = sample_storage();
        assert!(storage.support_oob());
        assert!(!storage.is_jbod_mode());
        assert_eq!(storage.model(), Some("SAS3508"));
        assert_eq!(storage.supported_raid_levels().len(), 3);
    }

    #[test]
    fn test_oem_action_lookup() {
        let storage = sample_storage();
        let target = storage
            .action_target("Storage.RestoreStorageControllerDefaultSettings")
            .expect("restore action");
        assert!(target.ends_with("Storage.RestoreStorageControllerDefaultSettings"));
        assert!(storage.action_target("Storage.Nonexistent").is_none());
    }

    #[test]
    fn test_volume_oem_fields() {
        let volume: Volume = serde_json::from_value(json!({
            "@odata.id": "/redfish/v1/Systems/1/Storages/RAIDStorage0/Volumes/LogicalDrive0",
            "Id": "LogicalDrive0",
            "CapacityBytes": 429496729600_i64,
            "Links": {"Drives": [
                {"@odata.id": "/redfish/v1/Chassis/1/Drives/HDDPlaneDisk0"},
                {"@odata.id": "/redfish/v1/Chassis/1/Drives/HDDPlaneDisk1"}
            ]},
            "Oem": {"Huawei": {
                "VolumeRaidLevel": "RAID1",
                "SpanNumber": 1,
                "BootEnable": true
            }}
        }))
        .expect("valid volume");
        assert_eq!(volume.raid_level(), Some("RAID1"));
        assert_eq!(volume.span_number(), Some(1));
        assert_eq!(volume.bootable(), Some(true));
        assert_eq!(volume.drive_refs().len(), 2);
    }
}
