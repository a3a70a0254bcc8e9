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

//! Mock-BMC plumbing shared by the integration tests.

#![allow(dead_code)]

use ibmc_redfish::{connect_with, Client, ClientConfig, ClientParams};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "password";
pub const TOKEN: &str = "token-1";

pub const STORAGE_ID: &str = "RAIDStorage0";
pub const STORAGE_PATH: &str = "/redfish/v1/Systems/1/Storages/RAIDStorage0";

pub const GB: i64 = 1024 * 1024 * 1024;

pub const ALL_RAID_LEVELS: &[&str] = &[
    "RAID0", "RAID1", "RAID5", "RAID6", "RAID10", "RAID50", "RAID60",
];

pub fn drive_path(id: i64) -> String {
    format!("/redfish/v1/Chassis/1/Drives/HDDPlaneDisk{}", id)
}

pub fn volume_path(volume_id: &str) -> String {
    format!("{}/Volumes/{}", STORAGE_PATH, volume_id)
}

pub fn drive_json(id: i64, capacity_gb: i64, media: &str, firmware: &str) -> Value {
    json!({
        "@odata.id": drive_path(id),
        "Id": format!("HDDPlaneDisk{}", id),
        "Name": format!("Disk{}", id),
        "SerialNumber": format!("SN{:04}", id),
        "Protocol": "SATA",
        "MediaType": media,
        "CapacityBytes": capacity_gb * GB,
        "Status": {"State": "Enabled", "Health": "OK"},
        "Oem": {"Huawei": {"DriveID": id, "FirmwareStatus": firmware}}
    })
}

pub fn storage_json(drive_ids: &[i64]) -> Value {
    let drives: Vec<Value> = drive_ids
        .iter()
        .map(|id| json!({"@odata.id": drive_path(*id)}))
        .collect();
    json!({
        "@odata.id": STORAGE_PATH,
        "Id": STORAGE_ID,
        "Name": STORAGE_ID,
        "StorageControllers": [{
            "Name": "RAID Card1 Controller",
            "Model": "SAS3508",
            "Status": {"State": "Enabled", "Health": "OK"},
            "Oem": {"Huawei": {
                "SupportedRAIDLevels": ALL_RAID_LEVELS,
                "OOBSupport": true,
                "JBODState": false
            }}
        }],
        "Drives": drives,
        "Volumes": {"@odata.id": format!("{}/Volumes", STORAGE_PATH)}
    })
}

pub fn volumes_collection_json(volume_ids: &[&str]) -> Value {
    let members: Vec<Value> = volume_ids
        .iter()
        .map(|id| json!({"@odata.id": volume_path(id)}))
        .collect();
    json!({
        "@odata.id": format!("{}/Volumes", STORAGE_PATH),
        "Members@odata.count": members.len(),
        "Members": members
    })
}

pub fn volume_json(
    volume_id: &str,
    raid_level: &str,
    capacity_gb: i64,
    drive_ids: &[i64],
    span: usize,
) -> Value {
    let links: Vec<Value> = drive_ids
        .iter()
        .map(|id| json!({"@odata.id": drive_path(*id)}))
        .collect();
    json!({
        "@odata.id": volume_path(volume_id),
        "Id": volume_id,
        "Name": volume_id,
        "CapacityBytes": capacity_gb * GB,
        "Links": {"Drives": links},
        "Oem": {"Huawei": {
            "VolumeRaidLevel": raid_level,
            "SpanNumber": span
        }}
    })
}

pub fn task_json(task_id: &str, state: &str, message_args: Option<&str>) -> Value {
    let messages = match message_args {
        Some(arg) => json!({
            "MessageId": "iBMC.1.0.TaskMessage",
            "MessageArgs": [arg]
        }),
        None => json!([]),
    };
    json!({
        "@odata.id": format!("/redfish/v1/TaskService/Tasks/{}", task_id),
        "Id": task_id,
        "Name": format!("task {}", task_id),
        "TaskState": state,
        "Messages": messages
    })
}

pub fn failed_task_json(task_id: &str) -> Value {
    json!({
        "@odata.id": format!("/redfish/v1/TaskService/Tasks/{}", task_id),
        "Id": task_id,
        "Name": format!("task {}", task_id),
        "TaskState": "Exception",
        "Messages": {
            "Severity": "Warning",
            "Message": "The RAID controller is busy.",
            "Resolution": "Retry later."
        }
    })
}

pub async fn mount_service_root(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/redfish/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Systems": {"@odata.id": "/redfish/v1/Systems"},
            "Managers": {"@odata.id": "/redfish/v1/Managers"},
            "Chassis": {"@odata.id": "/redfish/v1/Chassis"},
            "SessionService": {"@odata.id": "/redfish/v1/SessionService"},
            "Tasks": {"@odata.id": "/redfish/v1/TaskService"},
            "RedfishVersion": "1.0.2"
        })))
        .mount(server)
        .await;
}

pub async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/redfish/v1/SessionService/Sessions"))
        .and(body_json(json!({"UserName": USERNAME, "Password": PASSWORD})))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("X-Auth-Token", TOKEN)
                .insert_header("Location", "/redfish/v1/SessionService/Sessions/1")
                .set_body_json(json!({"Id": "1"})),
        )
        .mount(server)
        .await;
}

pub async fn mount_managers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Managers"))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Members": [{"@odata.id": "/redfish/v1/Managers/1"}]
        })))
        .mount(server)
        .await;
}

pub async fn mount_system(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn system_ready_json() -> Value {
    json!({
        "Id": "1",
        "PowerState": "On",
        "Oem": {"Huawei": {"StorageConfigReady": 1}}
    })
}

/// Root + session + managers + a storage-ready system.
pub async fn mount_bmc(server: &MockServer) {
    mount_service_root(server).await;
    mount_session(server).await;
    mount_managers(server).await;
    mount_system(server, system_ready_json()).await;
}

pub async fn mount_storage_collection(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/redfish/v1/Systems/1/Storages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Members@odata.count": 1,
            "Members": [{"@odata.id": STORAGE_PATH}]
        })))
        .mount(server)
        .await;
}

pub async fn mount_storage(server: &MockServer, drive_ids: &[i64]) {
    Mock::given(method("GET"))
        .and(path(STORAGE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "W/\"storage-0\"")
                .set_body_json(storage_json(drive_ids)),
        )
        .mount(server)
        .await;
}

pub async fn mount_drive(server: &MockServer, body: Value) {
    let drive_path = body["@odata.id"].as_str().expect("drive has id").to_string();
    Mock::given(method("GET"))
        .and(path(drive_path.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "W/\"drive-0\"")
                .set_body_json(body),
        )
        .mount(server)
        .await;
}

pub async fn mount_uniform_drives(server: &MockServer, count: i64, capacity_gb: i64) {
    for id in 0..count {
        mount_drive(server, drive_json(id, capacity_gb, "HDD", "UnconfiguredGood")).await;
    }
}

pub fn zero_wait_config() -> ClientConfig {
    ClientConfig {
        task_poll_interval: Duration::ZERO,
        storage_ready_interval: Duration::ZERO,
        raid_settle_interval: Duration::ZERO,
    }
}

pub async fn connect(server: &MockServer) -> Client {
    connect_with(
        &server.uri(),
        USERNAME,
        PASSWORD,
        ClientParams::new(),
        zero_wait_config(),
    )
    .await
    .expect("session opens")
}
