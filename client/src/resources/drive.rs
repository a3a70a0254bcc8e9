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

//! Chassis drive resource.

use crate::resources::Oem;
use crate::resources::Status;
use ibmc_redfish_core::ODataETag;
use ibmc_redfish_core::ODataId;
use ibmc_redfish_core::ODataRef;
use serde::Deserialize;

/// Firmware state of an unallocated drive.
pub const FM_STATE_UNCONFIG_GOOD: &str = "UnconfiguredGood";
/// Firmware state of a drive exposed directly as JBOD.
pub const FM_STATE_JBOD: &str = "JBOD";
/// Firmware state of a drive reserved as hot spare.
pub const FM_STATE_HOTSPARE: &str = "HotSpareDrive";
/// Hot-spare role reset value.
pub const HOT_SPARE_NONE: &str = "None";

/// iBMC chassis drive resource model.
#[derive(Debug, Clone, Deserialize)]
pub struct Drive {
    #[serde(rename = "@odata.id")]
    pub odata_id: ODataId,
    #[serde(rename = "@odata.etag")]
    pub odata_etag: Option<ODataETag>,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Model")]
    pub model: Option<String>,
    #[serde(rename = "SerialNumber")]
    pub serial_number: Option<String>,
    /// Typical protocols: SATA, SAS, SCSI.
    #[serde(rename = "Protocol")]
    pub protocol: Option<String>,
    /// Typical media types: HDD, SSD.
    #[serde(rename = "MediaType")]
    pub media_type: Option<String>,
    #[serde(rename = "CapacityBytes")]
    pub capacity_bytes: Option<i64>,
    #[serde(rename = "HotspareType")]
    pub hotspare_type: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<Status>,
    #[serde(rename = "Links")]
    pub links: Option<DriveLinks>,
    #[serde(rename = "Oem")]
    pub oem: Option<Oem<DriveOem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveLinks {
    /// Volumes this drive is a member of.
    #[serde(rename = "Volumes", default)]
    pub volumes: Vec<ODataRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveOem {
    /// Numeric drive id used by create-volume payloads.
    #[serde(rename = "DriveID")]
    pub drive_id: Option<i64>,
    #[serde(rename = "FirmwareStatus")]
    pub firmware_status: Option<String>,
}

impl Drive {
    /// OEM numeric drive id.
    #[must_use]
    pub fn drive_id(&self) -> Option<i64> {
        self.oem
            .as_ref()
            .and_then(|oem| oem.huawei.as_ref())
            .and_then(|oem| oem.drive_id)
    }

    #[must_use]
    pub fn firmware_state(&self) -> Option<&str> {
        self.oem
            .as_ref()
            .and_then(|oem| oem.huawei.as_ref())
            .and_then(|oem| oem.firmware_status.as_deref())
    }

    #[must_use]
    pub fn capacity_bytes(&self) -> i64 {
        self.capacity_bytes.unwrap_or(0)
    }

    #[must_use]
    pub fn has_fm_state(&self, state: &str) -> bool {
        self.firmware_state() == Some(state)
    }

    #[must_use]
    pub fn is_unconfig_good(&self) -> bool {
        self.has_fm_state(FM_STATE_UNCONFIG_GOOD)
    }

    /// Whether this drive is the one a user hint refers to.
    ///
    /// The hint may be the drive id, the drive name, the serial number or
    /// the decimal OEM drive id; media type and protocol filters are
    /// optional and compared case-insensitively.
    #[must_use]
    pub fn matches(&self, hint: &str, media_type: Option<&str>, protocol: Option<&str>) -> bool {
        if hint.is_empty() {
            return false;
        }
        let hint_matches = hint == self.id
            || self.name.as_deref() == Some(hint)
            || self.serial_number.as_deref() == Some(hint)
            || self
                .drive_id()
                .map_or(false, |drive_id| drive_id.to_string() == hint);

        let media_matches = media_type.map_or(true, |wanted| {
            self.media_type
                .as_deref()
                .map_or(false, |mine| mine.eq_ignore_ascii_case(wanted))
        });
        let protocol_matches = protocol.map_or(true, |wanted| {
            self.protocol
                .as_deref()
                .map_or(false, |mine| mine.eq_ignore_ascii_case(wanted))
        });

        hint_matches && media_matches && protocol_matches
    }

    /// Whether the drive satisfies the optional media/protocol filters.
    #[must_use]
    pub fn matches_filters(&self, media_type: Option<&str>, protocol: Option<&str>) -> bool {
        self.matches(&self.id, media_type, protocol)
    }
}
