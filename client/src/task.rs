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

//! Task-service sub-client: polls asynchronous BMC jobs to completion.

use crate::error::Error;
use crate::resources::task::Task;
use crate::Client;
use ibmc_redfish_core::Method;
use tokio::time::sleep;
use tracing::debug;
use tracing::info;

/// iBMC TaskService API client.
pub struct TaskClient<'a> {
    client: &'a Client,
}

impl<'a> TaskClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Get a task by id.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the task cannot be fetched.
    pub async fn get(&self, task_id: &str) -> Result<Task, Error> {
        let url = format!(
            "{}/Tasks/{}",
            self.client.connector().task_service_base_url(),
            task_id
        );
        let response = self
            .client
            .connector()
            .request(Method::GET, &url, None)
            .await?;
        Ok(response.json()?)
    }

    /// Wait for a task (by id) until it becomes stable.
    ///
    /// # Errors
    ///
    /// Returns a transport error when reloading the task fails.
    pub async fn wait_task_by_id(&self, task_id: &str) -> Result<Task, Error> {
        let task = self.get(task_id).await?;
        self.wait_task(task).await
    }

    /// Wait for a task until it becomes stable and return the final state.
    ///
    /// The task itself is not judged here; use
    /// [`Task::raise_if_failed`](crate::resources::task::Task::raise_if_failed)
    /// on the result.
    ///
    /// # Errors
    ///
    /// Returns a transport error when reloading the task fails.
    pub async fn wait_task(&self, mut task: Task) -> Result<Task, Error> {
        info!("Wait task until processed, task: {}.", task.id);
        loop {
            if task.state().is_terminal() {
                info!("Task {} has been processed.", task.id);
                return Ok(task);
            }
            debug!(
                "Task {} is still processing, will reload {:?} later.",
                task.id,
                self.client.config().task_poll_interval
            );
            sleep(self.client.config().task_poll_interval).await;
            task = self.get(&task.id).await?;
        }
    }
}
