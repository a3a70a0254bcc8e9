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

//! Computer system resource (the slice the storage path reads).

use crate::error::Error;
use crate::resources::Oem;
use serde::Deserialize;

/// iBMC system resource model.
#[derive(Debug, Clone, Deserialize)]
pub struct System {
    #[serde(rename = "Id")]
    pub id: Option<String>,
    #[serde(rename = "PowerState")]
    pub power_state: Option<String>,
    #[serde(rename = "Oem")]
    pub oem: Option<Oem<SystemOem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemOem {
    /// 1 once the controllers have published their post-boot state.
    /// Absent on firmware that predates the feature.
    #[serde(rename = "StorageConfigReady")]
    pub storage_config_ready: Option<i64>,
    #[serde(rename = "BootupSequence")]
    pub bootup_sequence: Option<Vec<String>>,
}

impl System {
    /// Whether the storage subsystem is ready for configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureNotSupported`] when the firmware does not
    /// publish `StorageConfigReady` at all; callers treat that as ready.
    pub fn is_storage_ready(&self) -> Result<bool, Error> {
        let ready = self
            .oem
            .as_ref()
            .and_then(|oem| oem.huawei.as_ref())
            .and_then(|oem| oem.storage_config_ready);
        match ready {
            Some(value) => Ok(value == 1),
            None => Err(Error::FeatureNotSupported {
                feature: "Query `StorageConfigReady`".to_string(),
            }),
        }
    }
}
