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

//! Typed views over iBMC Redfish documents.
//!
//! Every model is a pure value: a serde struct over the fields this client
//! reads, tolerant of unknown fields for forward compatibility. Nested
//! resources are reached through the facade's explicit `load` operations;
//! no model keeps a reference back to the client.

pub mod drive;
pub mod storage;
pub mod system;
pub mod task;

use ibmc_redfish_core::ODataRef;
use serde::Deserialize;

/// The vendor extension envelope: `{"Oem": {"Huawei": …}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Oem<T> {
    #[serde(rename = "Huawei")]
    pub huawei: Option<T>,
}

/// Resource status block.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "Health")]
    pub health: Option<String>,
}

/// A Redfish collection resource: member links in document order.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    #[serde(rename = "Members@odata.count")]
    pub count: Option<usize>,
    #[serde(rename = "Members", default)]
    pub members: Vec<ODataRef>,
}

impl Collection {
    /// Member oData ids in document order.
    #[must_use]
    pub fn resources(&self) -> &[ODataRef] {
        &self.members
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
