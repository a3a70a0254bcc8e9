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

//! System sub-clients: the system resource itself, storage controllers
//! and volumes.

pub mod storage;
pub mod volume;

use crate::error::Error;
use crate::resources::system::System;
use crate::Client;
use ibmc_redfish_core::Method;

/// iBMC system API client.
pub struct SystemClient<'a> {
    client: &'a Client,
}

impl<'a> SystemClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Get the computer system resource.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the resource cannot be fetched.
    pub async fn get(&self) -> Result<System, Error> {
        let url = self.client.connector().system_base_url();
        let response = self
            .client
            .connector()
            .request(Method::GET, &url, None)
            .await?;
        Ok(response.json()?)
    }
}
