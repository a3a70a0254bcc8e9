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

//! Storage sub-client: the RAID configuration planner and applier.
//!
//! [`StorageClient::apply_raid_configuration`] turns a declarative list of
//! [`LogicalDiskSpec`]s into hardware state: it resolves a controller per
//! request, picks physical drives through the RAID algebra, orders the
//! work so the free pool shrinks predictably, and drives the create-volume
//! requests (and their tasks) one by one. All planning state (disk
//! exclusivity, disk-group pending capacities) lives within a single
//! apply call.

use crate::chassis::DriveClient;
use crate::error::Error;
use crate::raid::build_disk_groups;
use crate::raid::PhysicalDisk;
use crate::raid::PhysicalDiskGroup;
use crate::raid::Raid;
use crate::raid::RaidSolution;
use crate::raid::JBOD;
use crate::raid::MAX_CAPACITY;
use crate::resources::storage::Storage;
use crate::resources::Collection;
use crate::system::volume::CreateVolumeRequest;
use crate::Client;
use ibmc_redfish_core::Method;
use ibmc_redfish_core::ODataId;
use serde::Deserialize;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::time::sleep;
use tracing::info;
use tracing::warn;

const GB: i64 = 1024 * 1024 * 1024;

const ACTION_RESTORE: &str = "Storage.RestoreStorageControllerDefaultSettings";

/// Requested size of a logical disk: a positive number of GiB or the
/// literal `"MAX"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SizeGb {
    Gb(u64),
    Literal(String),
}

/// One logical disk the caller wants to exist.
///
/// This matches the JSON shape of OpenStack Ironic's `target_raid_config`
/// logical disks, e.g.:
///
/// ```json
/// {
///   "size_gb": 50,
///   "raid_level": "1+0",
///   "controller": "RAID.Integrated.1-1",
///   "volume_name": "root_volume",
///   "is_root_volume": true,
///   "physical_disks": ["Disk0", "Disk1", "Disk2", "Disk3"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LogicalDiskSpec {
    pub volume_name: Option<String>,
    /// RAID level key: `"0"`, `"1"`, `"5"`, `"6"`, `"1+0"`, `"5+0"`,
    /// `"6+0"` or `"JBOD"`.
    pub raid_level: String,
    /// Absent means `"MAX"`.
    pub size_gb: Option<SizeGb>,
    /// Controller hint: storage id, storage name or controller name.
    pub controller: Option<String>,
    /// Media type filter (HDD/SSD).
    pub disk_type: Option<String>,
    /// Protocol filter (SAS/SATA/…).
    pub interface_type: Option<String>,
    /// Physical disk hints, in order.
    #[serde(default)]
    pub physical_disks: Vec<String>,
    #[serde(default)]
    pub share_physical_disks: bool,
    #[serde(default)]
    pub is_root_volume: bool,
    pub number_of_physical_disks: Option<usize>,
}

/// A logical-disk request on its way through the planner: normalised
/// capacity, the resolved RAID setting, and (after `init_disks`) the
/// drives and span that will carry it.
#[derive(Debug)]
pub(crate) struct PendingVolume {
    spec: LogicalDiskSpec,
    raid: &'static Raid,
    capacity_bytes: i64,
    bootable: bool,
    drives: Vec<i64>,
    span_number: Option<usize>,
    use_shareable_disk_group: bool,
}

impl PendingVolume {
    pub(crate) fn new(spec: &LogicalDiskSpec) -> Result<Self, Error> {
        let raid = Raid::lookup(&spec.raid_level).ok_or_else(|| Error::NotSupportedRaidLevel {
            raid_level: spec.raid_level.clone(),
            controller: None,
        })?;

        let capacity_bytes = match &spec.size_gb {
            None => MAX_CAPACITY,
            Some(SizeGb::Gb(size)) if *size > 0 => *size as i64 * GB,
            Some(SizeGb::Gb(_)) => {
                return Err(Error::InvalidLogicalDiskConfig {
                    config: format!("{:?}", spec),
                    reason: "size_gb must be a positive integer or \"MAX\"".to_string(),
                })
            }
            Some(SizeGb::Literal(literal)) if literal.eq_ignore_ascii_case("max") => MAX_CAPACITY,
            Some(SizeGb::Literal(_)) => {
                return Err(Error::InvalidLogicalDiskConfig {
                    config: format!("{:?}", spec),
                    reason: "size_gb must be a positive integer or \"MAX\"".to_string(),
                })
            }
        };

        if let Some(number) = spec.number_of_physical_disks {
            let min_disk_count = raid.min_disks_required();
            if number < min_disk_count {
                return Err(Error::InvalidLogicalDiskConfig {
                    config: format!("{:?}", spec),
                    reason: format!(
                        "number_of_physical_disks is small than min-disk-count({}) \
                         required by raid level {}",
                        min_disk_count, raid.key
                    ),
                });
            }
        }

        Ok(Self {
            bootable: spec.is_root_volume,
            spec: spec.clone(),
            raid,
            capacity_bytes,
            drives: Vec::new(),
            span_number: None,
            use_shareable_disk_group: false,
        })
    }

    fn is_jbod_mode(&self) -> bool {
        self.raid.name == JBOD
    }

    /// Whether this volume uses as much free space as possible (size "MAX").
    fn auto_scale(&self) -> bool {
        self.capacity_bytes == MAX_CAPACITY
    }

    fn use_specified_disks(&self) -> bool {
        !self.spec.physical_disks.is_empty()
    }

    fn share(&self) -> bool {
        self.spec.share_physical_disks
    }

    fn size_display(&self) -> String {
        match &self.spec.size_gb {
            Some(SizeGb::Gb(size)) => size.to_string(),
            _ => "MAX".to_string(),
        }
    }

    fn invalid_config(&self, reason: String) -> Error {
        Error::InvalidLogicalDiskConfig {
            config: format!("{:?}", self.spec),
            reason,
        }
    }

    /// Resolve the storage controller this volume targets and return its
    /// id.
    pub(crate) fn init_ctrl(&self, controllers: &[Storage]) -> Result<String, Error> {
        if controllers.is_empty() {
            return Err(Error::NoRaidControllerFound);
        }

        let hint = self
            .spec
            .controller
            .as_deref()
            .filter(|hint| !hint.is_empty());
        let controller = match hint {
            None => {
                if controllers.len() != 1 {
                    return Err(Error::ControllerHintRequired);
                }
                &controllers[0]
            }
            Some(hint) => controllers
                .iter()
                .find(|controller| controller.matches(hint))
                .ok_or_else(|| Error::NoControllerMatchesHint {
                    hint: hint.to_string(),
                })?,
        };

        if !controller.support_oob() {
            let name = hint
                .or_else(|| controller.controller_name())
                .unwrap_or(&controller.id);
            return Err(Error::ControllerNotSupportOob {
                controller: name.to_string(),
            });
        }

        if self.raid.name != JBOD
            && !controller
                .supported_raid_levels()
                .iter()
                .any(|level| level == self.raid.name)
        {
            return Err(Error::NotSupportedRaidLevel {
                raid_level: self.raid.key.to_string(),
                controller: hint.map(str::to_string),
            });
        }

        Ok(controller.id.clone())
    }

    /// Resolve the physical drives backing this volume.
    ///
    /// Disks claimed here become invisible to every later request of the
    /// same apply call; shareable requests instead accumulate pending
    /// capacity on a disk group (an existing one, or one freshly planned
    /// by an earlier request).
    pub(crate) fn init_disks(
        &mut self,
        physical_disks: &[PhysicalDisk],
        disk_groups: &mut Vec<PhysicalDiskGroup>,
    ) -> Result<(), Error> {
        // Disks that are excludable and match the requested media type and
        // protocol.
        let excludable_disks: Vec<&PhysicalDisk> = physical_disks
            .iter()
            .filter(|disk| {
                disk.drive().matches_filters(
                    self.spec.disk_type.as_deref(),
                    self.spec.interface_type.as_deref(),
                ) && disk.is_excludable()
            })
            .collect();

        if !self.share() && self.use_specified_disks() {
            // Both fixed and MAX sizes: the hinted disks, and only them.
            let mut specified_disks = Vec::with_capacity(self.spec.physical_disks.len());
            for hint in &self.spec.physical_disks {
                let disk = self.get_specified_disk(physical_disks, hint)?;
                if !disk.is_excludable() {
                    return Err(self.invalid_config(format!(
                        "Disk `{}` may has been used by other logical disk.",
                        hint
                    )));
                }
                specified_disks.push(disk);
            }

            let count = specified_disks.len();
            let solution = self
                .raid
                .best_matched_disks(self.capacity_bytes, &specified_disks, Some(count))
                .map_err(|error| self.invalid_config(error.to_string()))?;
            match solution {
                Some(solution) => self.take_solution(&solution),
                None => {
                    return Err(Error::SpecifiedDisksHasNotEnoughSpace {
                        size_gb: self.size_display(),
                        raid: self.raid.key,
                    })
                }
            }
        } else if !self.share() && !self.use_specified_disks() {
            let solution = self
                .raid
                .best_matched_disks(
                    self.capacity_bytes,
                    &excludable_disks,
                    self.spec.number_of_physical_disks,
                )
                .map_err(|error| self.invalid_config(error.to_string()))?;
            match solution {
                Some(solution) => self.take_solution(&solution),
                None => return Err(Error::LackOfDiskSpace),
            }
        } else if self.share() && self.use_specified_disks() {
            // An existing disk group owning every hinted disk wins over
            // building a new one.
            let specified_disks = self
                .spec
                .physical_disks
                .iter()
                .map(|hint| self.get_specified_disk(physical_disks, hint))
                .collect::<Result<Vec<_>, Error>>()?;
            if let Some(index) = self.find_disk_group_owns_disks(disk_groups, &specified_disks)? {
                self.use_disk_group(&mut disk_groups[index]);
                return Ok(());
            }

            for (position, disk) in specified_disks.iter().enumerate() {
                if !disk.is_excludable() {
                    return Err(self.invalid_config(format!(
                        "Disk `{}` may has been used by other logical disk.",
                        self.spec.physical_disks[position]
                    )));
                }
            }

            let count = specified_disks.len();
            let solution = self
                .raid
                .best_matched_disks(self.capacity_bytes, &specified_disks, Some(count))
                .map_err(|error| self.invalid_config(error.to_string()))?;
            match solution {
                Some(solution) => self.use_shareable_solution(&solution, disk_groups),
                None => return Err(Error::LackOfDiskSpace),
            }
        } else {
            // share && !use_specified_disks
            if self.auto_scale() {
                warn!(
                    "logical disk {:?} is shareable, size \"MAX\" and names no \
                     disks; it will consume whatever capacity remains",
                    self.spec.volume_name
                );
            }
            if let Some(index) = self
                .raid
                .best_matched_disk_group(self.capacity_bytes, disk_groups)
            {
                self.use_disk_group(&mut disk_groups[index]);
                return Ok(());
            }

            let solution = self
                .raid
                .best_matched_disks(
                    self.capacity_bytes,
                    &excludable_disks,
                    self.spec.number_of_physical_disks,
                )
                .map_err(|error| self.invalid_config(error.to_string()))?;
            match solution {
                Some(solution) => self.use_shareable_solution(&solution, disk_groups),
                None => return Err(Error::LackOfDiskSpace),
            }
        }

        Ok(())
    }

    /// Claim the solution's disks outright.
    fn take_solution(&mut self, solution: &RaidSolution<'_>) {
        self.span_number = Some(solution.span);
        self.drives = solution.drive_ids();
        for disk in &solution.disks {
            disk.mark_as_exclusive();
        }
    }

    /// Claim the solution's disks and publish them as a disk group, so
    /// later shareable requests of this apply call can carve volumes out
    /// of it.
    fn use_shareable_solution(
        &mut self,
        solution: &RaidSolution<'_>,
        disk_groups: &mut Vec<PhysicalDiskGroup>,
    ) {
        self.span_number = Some(solution.span);
        self.drives = solution.drive_ids();
        let drives = solution
            .disks
            .iter()
            .map(|disk| disk.drive().clone())
            .collect();
        let mut disk_group = PhysicalDiskGroup::new(drives, self.raid, solution.span);
        disk_group.add_used_capacity_bytes(self.capacity_bytes);
        disk_groups.push(disk_group);
        for disk in &solution.disks {
            disk.mark_as_exclusive();
        }
    }

    /// Create inside an existing group: the payload names only the group's
    /// first drive, which tells the BMC which group to grow.
    fn use_disk_group(&mut self, disk_group: &mut PhysicalDiskGroup) {
        disk_group.add_pending_capacity_bytes(self.capacity_bytes);
        self.drives = disk_group.first_drive_id().into_iter().collect();
        self.use_shareable_disk_group = true;
    }

    /// Find a disk group which owns all the hinted physical disks. A group
    /// owning only some of them is no match.
    fn find_disk_group_owns_disks(
        &self,
        disk_groups: &[PhysicalDiskGroup],
        specified_disks: &[&PhysicalDisk],
    ) -> Result<Option<usize>, Error> {
        let index = disk_groups.iter().position(|group| {
            specified_disks
                .iter()
                .all(|disk| group.contains_drive(disk.drive()))
        });
        match index {
            Some(index) => {
                let disk_group = &disk_groups[index];
                disk_group
                    .validate_if_suitable_for(self.capacity_bytes, self.raid)
                    .map_err(|error| self.invalid_config(error.to_string()))?;
                info!("Find a matched disk-group:: {}. Use it.", disk_group);
                Ok(Some(index))
            }
            None => {
                info!("Could not find any disk-group owns the specified disks.");
                Ok(None)
            }
        }
    }

    fn get_specified_disk<'p>(
        &self,
        physical_disks: &'p [PhysicalDisk],
        disk_hint: &str,
    ) -> Result<&'p PhysicalDisk, Error> {
        physical_disks
            .iter()
            .find(|disk| {
                disk.drive().matches(
                    disk_hint,
                    self.spec.disk_type.as_deref(),
                    self.spec.interface_type.as_deref(),
                )
            })
            .ok_or_else(|| Error::NoDriveMatchesHint {
                hint: disk_hint.to_string(),
                media_type: self.spec.disk_type.clone(),
                protocol: self.spec.interface_type.clone(),
            })
    }

    pub(crate) fn to_create_volume_request(&self, storage_id: &str) -> CreateVolumeRequest {
        let capacity_bytes = if self.capacity_bytes == MAX_CAPACITY {
            None
        } else {
            Some(self.capacity_bytes)
        };
        if self.use_shareable_disk_group {
            CreateVolumeRequest {
                storage_id: storage_id.to_string(),
                volume_name: self.spec.volume_name.clone(),
                raid_level: None,
                drives: self.drives.clone(),
                capacity_bytes,
                span: None,
                bootable: self.bootable,
            }
        } else {
            CreateVolumeRequest {
                storage_id: storage_id.to_string(),
                volume_name: self.spec.volume_name.clone(),
                raid_level: Some(self.raid.name),
                drives: self.drives.clone(),
                capacity_bytes,
                span: self.span_number,
                bootable: self.bootable,
            }
        }
    }
}

/// Order pending volumes into the seven processing cohorts: take disks
/// from the free pool in the most predictable direction first, and defer
/// MAX-sized and shareable work so it can absorb whatever remains. Within
/// a cohort the caller-supplied order is kept.
pub(crate) fn order_pending_volumes(pending: Vec<PendingVolume>) -> Vec<PendingVolume> {
    let steps: [fn(&PendingVolume) -> bool; 7] = [
        |v| !v.share() && v.use_specified_disks(),
        |v| !v.share() && !v.use_specified_disks() && !v.auto_scale(),
        |v| v.share() && v.use_specified_disks() && !v.auto_scale(),
        |v| v.share() && v.use_specified_disks() && v.auto_scale(),
        |v| v.share() && !v.use_specified_disks() && !v.auto_scale(),
        |v| v.share() && !v.use_specified_disks() && v.auto_scale(),
        |v| !v.share() && !v.use_specified_disks() && v.auto_scale(),
    ];

    let mut ordered = Vec::with_capacity(pending.len());
    let mut remaining = pending;
    for step in &steps {
        let mut rest = Vec::new();
        for volume in remaining {
            if step(&volume) {
                ordered.push(volume);
            } else {
                rest.push(volume);
            }
        }
        remaining = rest;
    }
    ordered.extend(remaining);
    ordered
}

/// iBMC storage API client.
pub struct StorageClient<'a> {
    client: &'a Client,
}

impl<'a> StorageClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn drive_client(&self) -> DriveClient<'a> {
        DriveClient::new(self.client)
    }

    /// Get all storage controllers of this iBMC.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the collection or a member cannot be
    /// fetched.
    pub async fn list(&self) -> Result<Vec<Storage>, Error> {
        let url = format!("{}/Storages", self.client.connector().system_base_url());
        let response = self
            .client
            .connector()
            .request(Method::GET, &url, None)
            .await?;
        let collection: Collection = response.json()?;
        let mut storages = Vec::with_capacity(collection.resources().len());
        for member in collection.resources() {
            storages.push(self.client.load(&member.odata_id).await?);
        }
        Ok(storages)
    }

    /// Get a storage controller by id.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the resource cannot be fetched.
    pub async fn get(&self, storage_id: &str) -> Result<Storage, Error> {
        let url = format!(
            "{}/Storages/{}",
            self.client.connector().system_base_url(),
            storage_id
        );
        let response = self
            .client
            .connector()
            .request(Method::GET, &url, None)
            .await?;
        Ok(response.json()?)
    }

    /// Apply controller settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToApply`] when no property is given, or a
    /// transport error when the PATCH fails.
    pub async fn set(
        &self,
        storage: &Storage,
        copy_back: Option<bool>,
        smarter_copy_back: Option<bool>,
        jbod: Option<bool>,
    ) -> Result<(), Error> {
        let mut settings = Map::new();
        if let Some(copy_back) = copy_back {
            settings.insert("CopyBackState".to_string(), Value::Bool(copy_back));
        }
        if let Some(smarter_copy_back) = smarter_copy_back {
            settings.insert(
                "SmarterCopyBackState".to_string(),
                Value::Bool(smarter_copy_back),
            );
        }
        if let Some(jbod) = jbod {
            settings.insert("JBODState".to_string(), Value::Bool(jbod));
        }
        if settings.is_empty() {
            return Err(Error::NothingToApply);
        }

        let payload = json!({
            "StorageControllers": [
                {"Oem": {"Huawei": Value::Object(settings)}}
            ]
        });
        let url = self.client.connector().get_url(&storage.odata_id);
        self.client
            .connector()
            .request(Method::PATCH, &url, Some(&payload))
            .await?;
        Ok(())
    }

    /// Restore the controller's default settings through the OEM action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAction`] when the controller does not
    /// expose the action, or a transport error.
    pub async fn restore(&self, storage: &Storage) -> Result<(), Error> {
        let target = storage
            .action_target(ACTION_RESTORE)
            .ok_or_else(|| Error::MissingAction {
                action: ACTION_RESTORE.to_string(),
                resource: storage.odata_id.to_string(),
            })?;
        let url = self.client.connector().get_url(&ODataId::from(target));
        self.client
            .connector()
            .request(Method::POST, &url, Some(&json!({})))
            .await?;
        Ok(())
    }

    /// Delete all RAID configuration.
    ///
    /// Every volume of every controller is deleted (waiting for each
    /// deletion task), then hot-spare and pass-through drives are restored
    /// to UnconfiguredGood.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControllerNotSupportOob`] when any controller
    /// lacks OOB management, [`Error::TaskFailed`] when a deletion task
    /// fails, or a transport error.
    pub async fn delete_all_raid_configuration(&self) -> Result<(), Error> {
        info!("Start delete all RAID configuration.");

        self.waiting_storage_ready().await?;

        let storage_collection = self.list().await?;
        for storage in &storage_collection {
            if !storage.support_oob() {
                return Err(Error::ControllerNotSupportOob {
                    controller: storage
                        .controller_name()
                        .unwrap_or(&storage.id)
                        .to_string(),
                });
            }
            info!("Start delete RAID configuration for {}.", storage.id);

            self.delete_volume_collection(storage).await?;

            for drive in self.drive_client().list(storage).await? {
                self.drive_client().restore(&drive).await?;
            }

            info!("Delete RAID configuration for {} done.", storage.id);
        }

        if storage_collection.is_empty() {
            info!("No Storage present in this server.");
        }

        info!("Delete all RAID configuration done.");
        Ok(())
    }

    async fn delete_volume_collection(&self, storage: &Storage) -> Result<(), Error> {
        info!("Start delete volumes for storage:: {}.", storage.id);
        let volumes_ref = storage
            .volumes
            .as_ref()
            .ok_or_else(|| Error::MissingAttribute {
                attribute: "Volumes".to_string(),
                resource: storage.odata_id.to_string(),
            })?;
        let collection = self.client.load_collection(&volumes_ref.odata_id).await?;

        for member in collection.resources() {
            info!("Start delete volume:: {}.", member.odata_id);
            let task = self
                .client
                .volume()
                .delete_by_odata_id(&member.odata_id)
                .await?;
            task.raise_if_failed()?;
            info!("Delete volume:: {} done.", member.odata_id);
        }

        if collection.is_empty() {
            info!("No volume present in this storage:: {}", storage.id);
        } else {
            // Let the deletions fully take effect before touching drives.
            sleep(self.client.config().raid_settle_interval).await;
            info!("Delete volumes for storage:: {} done.", storage.id);
        }
        Ok(())
    }

    /// Apply a RAID configuration.
    ///
    /// # Errors
    ///
    /// Validation and selection failures abort immediately with the
    /// relevant variant; nothing submitted earlier is rolled back.
    pub async fn apply_raid_configuration(
        &self,
        logical_disks: &[LogicalDiskSpec],
    ) -> Result<(), Error> {
        info!("Start apply RAID configuration:: {:?}", logical_disks);

        self.waiting_storage_ready().await?;

        let controllers = self.list().await?;

        // Normalise, resolve controllers, group per controller id.
        let mut grouped: BTreeMap<String, Vec<PendingVolume>> = BTreeMap::new();
        for logical_disk in logical_disks {
            let pending_volume = PendingVolume::new(logical_disk)?;
            let ctrl_id = pending_volume.init_ctrl(&controllers)?;
            grouped.entry(ctrl_id).or_insert_with(Vec::new).push(pending_volume);
        }

        validate_pending_volumes(&grouped)?;

        for (ctrl_id, pending_volumes) in grouped {
            let ctrl = controllers
                .iter()
                .find(|controller| controller.id == ctrl_id)
                .ok_or_else(|| Error::NoControllerMatchesHint {
                    hint: ctrl_id.clone(),
                })?;

            // JBOD is a controller mode, not a volume: flip it and move on.
            if pending_volumes.iter().any(PendingVolume::is_jbod_mode) {
                self.set(ctrl, None, None, Some(true)).await?;
                continue;
            }

            let drives = self.drive_client().list(ctrl).await?;
            let share_disk_enabled = pending_volumes.iter().any(PendingVolume::share);
            let volumes = if share_disk_enabled {
                self.client.volume().list(&ctrl.id).await?
            } else {
                Vec::new()
            };

            // Planning is synchronous: all drive assignments are fixed
            // before the first create request goes out.
            let requests: Vec<CreateVolumeRequest> = {
                let mut disk_groups = build_disk_groups(&volumes, &drives);
                let physical_disks: Vec<PhysicalDisk> =
                    drives.iter().map(PhysicalDisk::new).collect();

                let mut ordered = order_pending_volumes(pending_volumes);
                for pending_volume in &mut ordered {
                    pending_volume.init_disks(&physical_disks, &mut disk_groups)?;
                }
                ordered
                    .iter()
                    .map(|pending_volume| pending_volume.to_create_volume_request(&ctrl.id))
                    .collect()
            };

            for request in &requests {
                self.client.volume().create(request).await?;
                // Let the BMC publish the new state before the next one.
                sleep(self.client.config().raid_settle_interval).await;
            }
        }

        Ok(())
    }

    /// Block until the controllers have published their post-boot state.
    ///
    /// Firmware without the `StorageConfigReady` attribute is treated as
    /// ready immediately.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the system resource cannot be
    /// fetched.
    pub async fn waiting_storage_ready(&self) -> Result<(), Error> {
        info!("Waiting until storage ready.");
        loop {
            let system = self.client.system().get().await?;
            match system.is_storage_ready() {
                Ok(true) => {
                    info!("Storage is ready.");
                    return Ok(());
                }
                Ok(false) => info!("Storage is not ready. waiting..."),
                Err(Error::FeatureNotSupported { .. }) => {
                    info!(
                        "Query `StorageConfigReady` feature is not supported, \
                         will treat it as ready now."
                    );
                    return Ok(());
                }
                Err(error) => return Err(error),
            }
            sleep(self.client.config().storage_ready_interval).await;
        }
    }
}

fn validate_pending_volumes(grouped: &BTreeMap<String, Vec<PendingVolume>>) -> Result<(), Error> {
    for pending_volumes in grouped.values() {
        let jbod_volumes: Vec<&PendingVolume> = pending_volumes
            .iter()
            .filter(|volume| volume.is_jbod_mode())
            .collect();
        if !jbod_volumes.is_empty() && jbod_volumes.len() != pending_volumes.len() {
            return Err(jbod_volumes[0]
                .invalid_config("JBOD mode could not work with other RAID level.".to_string()));
        }
    }
    Ok(())
}
