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

//! Task service resource.

use crate::error::Error;
use crate::resources::Oem;
use ibmc_redfish_core::ODataId;
use serde::Deserialize;
use serde_json::Value;

/// Life-cycle state of a Redfish task.
///
/// The state machine is monotone: in-flight states only ever move to a
/// terminal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    New,
    Starting,
    Running,
    Suspended,
    Pending,
    Stopping,
    Interrupted,
    Killed,
    Exception,
    Completed,
    /// A state string this client does not know; treated as in-flight.
    Unknown,
}

impl TaskState {
    fn parse(state: Option<&str>) -> Self {
        match state {
            Some("New") => Self::New,
            Some("Starting") => Self::Starting,
            Some("Running") => Self::Running,
            Some("Suspended") => Self::Suspended,
            Some("Pending") => Self::Pending,
            Some("Stopping") => Self::Stopping,
            Some("Interrupted") => Self::Interrupted,
            Some("Killed") => Self::Killed,
            Some("Exception") => Self::Exception,
            Some("Completed") => Self::Completed,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Interrupted | Self::Killed | Self::Exception | Self::Completed
        )
    }

    #[must_use]
    pub fn is_failed(self) -> bool {
        matches!(self, Self::Interrupted | Self::Killed | Self::Exception)
    }
}

/// iBMC task resource model.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<ODataId>,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "TaskState")]
    pub task_state: Option<String>,
    #[serde(rename = "StartTime")]
    pub start_time: Option<String>,
    #[serde(rename = "EndTime")]
    pub end_time: Option<String>,
    /// When the task has no result yet the iBMC sends `[]` here instead of
    /// an object, so this stays an untyped value.
    #[serde(rename = "Messages")]
    pub messages: Option<Value>,
    #[serde(rename = "Oem")]
    pub oem: Option<Oem<TaskOem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskOem {
    #[serde(rename = "TaskPercentage")]
    pub task_percentage: Option<String>,
}

impl Task {
    #[must_use]
    pub fn state(&self) -> TaskState {
        TaskState::parse(self.task_state.as_deref())
    }

    fn message_field(&self, name: &str) -> Option<&Value> {
        self.messages
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|messages| messages.get(name))
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message_field("Message").and_then(Value::as_str)
    }

    #[must_use]
    pub fn message_args(&self) -> Vec<String> {
        self.message_field("MessageArgs")
            .and_then(Value::as_array)
            .map(|args| {
                args.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn resolution(&self) -> Option<&str> {
        self.message_field("Resolution").and_then(Value::as_str)
    }

    #[must_use]
    pub fn severity(&self) -> Option<&str> {
        self.message_field("Severity").and_then(Value::as_str)
    }

    /// Human-readable description of a failed task.
    #[must_use]
    pub fn friendly_failed_message(&self) -> String {
        format!(
            "[{}] Task({})'s final state is {}. Reason:: '{}' Resolution:: '{}'",
            self.severity().unwrap_or("Unknown"),
            self.name.as_deref().unwrap_or("unknown"),
            self.task_state.as_deref().unwrap_or("Unknown"),
            self.message().unwrap_or(""),
            self.resolution().unwrap_or("")
        )
    }

    /// Fail with [`Error::TaskFailed`] when the task ended badly.
    ///
    /// # Errors
    ///
    /// Returns `TaskFailed` iff the state is Interrupted, Killed or
    /// Exception.
    pub fn raise_if_failed(&self) -> Result<(), Error> {
        if self.state().is_failed() {
            return Err(Error::TaskFailed {
                message: self.friendly_failed_message(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_parsing() {
        assert_eq!(TaskState::parse(Some("Running")), TaskState::Running);
        assert_eq!(TaskState::parse(Some("Completed")), TaskState::Completed);
        assert_eq!(TaskState::parse(Some("Later")), TaskState::Unknown);
        assert_eq!(TaskState::parse(None), TaskState::Unknown);
        assert!(TaskState::Completed.is_terminal());
        assert!(!TaskState::Completed.is_failed());
        assert!(TaskState::Exception.is_failed());
        assert!(!TaskState::Unknown.is_terminal());
    }

    #[test]
    fn test_empty_messages_list_is_tolerated() {
        let task: Task = serde_json::from_value(json!({
            "Id": "1",
            "TaskState": "Running",
            "Messages": []
        }))
        .expect("valid task");
        assert_eq!(task.message(), None);
        assert!(task.message_args().is_empty());
    }

    #[test]
    fn test_failed_task_message() {
        let task: Task = serde_json::from_value(json!({
            "Id": "2",
            "Name": "volume creation task",
            "TaskState": "Exception",
            "Messages": {
                "Severity": "Warning",
                "Message": "The RAID controller is busy.",
                "Resolution": "Retry later."
            }
        }))
        .expect("valid task");
        let error = task.raise_if_failed().expect_err("failed task");
        let message = error.to_string();
        assert!(message.contains("[Warning]"));
        assert!(message.contains("volume creation task"));
        assert!(message.contains("Exception"));
        assert!(message.contains("The RAID controller is busy."));
    }

    #[test]
    fn test_message_args_carry_created_volume() {
        let task: Task = serde_json::from_value(json!({
            "Id": "3",
            "TaskState": "Completed",
            "Messages": {
                "MessageArgs": ["/redfish/v1/Systems/1/Storages/RAIDStorage0/Volumes/LogicalDrive0"]
            }
        }))
        .expect("valid task");
        task.raise_if_failed().expect("completed");
        assert_eq!(
            task.message_args(),
            vec!["/redfish/v1/Systems/1/Storages/RAIDStorage0/Volumes/LogicalDrive0".to_string()]
        );
    }
}
