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

//! Physical disks and disk groups as the planner sees them.
//!
//! Both types live only for the duration of one apply pass: exclusivity
//! flags and pending capacities are planning state, never hardware state.

use crate::error::Error;
use crate::raid::Raid;
use crate::raid::MAX_CAPACITY;
use crate::resources::drive::Drive;
use crate::resources::storage::Volume;
use std::cell::Cell;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// A real physical disk (known as drive in iBMC) plus its planning state.
#[derive(Debug)]
pub struct PhysicalDisk {
    drive: Drive,
    /// Set once the disk is allocated to a pending volume; an exclusive
    /// disk is never returned by selection again.
    exclusive: Cell<bool>,
}

impl PhysicalDisk {
    #[must_use]
    pub fn new(drive: &Drive) -> Self {
        Self {
            drive: drive.clone(),
            exclusive: Cell::new(false),
        }
    }

    #[must_use]
    pub fn drive(&self) -> &Drive {
        &self.drive
    }

    /// OEM numeric drive id used on create-volume payloads.
    #[must_use]
    pub fn drive_id(&self) -> Option<i64> {
        self.drive.drive_id()
    }

    #[must_use]
    pub fn capacity_bytes(&self) -> i64 {
        self.drive.capacity_bytes()
    }

    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        self.drive.media_type.as_deref()
    }

    /// Whether this disk may still be picked:
    /// - not claimed by an earlier pending volume
    /// - firmware state is UnconfiguredGood
    #[must_use]
    pub fn is_excludable(&self) -> bool {
        !self.exclusive.get() && self.drive.is_unconfig_good()
    }

    pub fn mark_as_exclusive(&self) {
        self.exclusive.set(true);
    }
}

impl Display for PhysicalDisk {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Disk{}({})",
            self.drive_id().unwrap_or(-1),
            self.media_type().unwrap_or("?")
        )
    }
}

/// A physical-disk group: the drives behind one or more logical disks.
///
/// `capacity_bytes` is fixed by the smallest drive; used and pending
/// capacities accumulate as existing volumes are discovered and new ones
/// planned.
#[derive(Debug)]
pub struct PhysicalDiskGroup {
    drives: Vec<Drive>,
    raid: &'static Raid,
    span_number: usize,
    overhead: usize,
    capacity_bytes: i64,
    used_capacity_bytes: Vec<i64>,
    pending_capacity_bytes: Vec<i64>,
}

impl PhysicalDiskGroup {
    #[must_use]
    pub fn new(mut drives: Vec<Drive>, raid: &'static Raid, span_number: usize) -> Self {
        drives.sort_by_key(Drive::capacity_bytes);
        let overhead = raid.overhead_per_span() * span_number;
        let capacity_bytes = drives.first().map_or(0, |smallest| {
            smallest.capacity_bytes() * drives.len().saturating_sub(overhead) as i64
        });
        Self {
            drives,
            raid,
            span_number,
            overhead,
            capacity_bytes,
            used_capacity_bytes: Vec::new(),
            pending_capacity_bytes: Vec::new(),
        }
    }

    /// Rebuild the group an existing volume lives on, seeded with that
    /// volume's capacity as used bytes. Returns `None` when the volume's
    /// RAID level is unknown or none of its drive links resolve.
    #[must_use]
    pub fn from_volume(volume: &Volume, all_drives: &[Drive]) -> Option<Self> {
        let raid = Raid::lookup(volume.raid_level()?)?;
        let drives: Vec<Drive> = all_drives
            .iter()
            .filter(|drive| {
                volume
                    .drive_refs()
                    .iter()
                    .any(|link| link.odata_id == drive.odata_id)
            })
            .cloned()
            .collect();
        if drives.is_empty() {
            return None;
        }
        let span_number = volume.span_number().unwrap_or(1);
        let mut group = Self::new(drives, raid, span_number);
        group.add_used_capacity_bytes(volume.capacity_bytes());
        Some(group)
    }

    #[must_use]
    pub fn raid(&self) -> &'static Raid {
        self.raid
    }

    #[must_use]
    pub fn span_number(&self) -> usize {
        self.span_number
    }

    #[must_use]
    pub fn overhead(&self) -> usize {
        self.overhead
    }

    #[must_use]
    pub fn capacity_bytes(&self) -> i64 {
        self.capacity_bytes
    }

    #[must_use]
    pub fn used_capacity_bytes(&self) -> i64 {
        self.used_capacity_bytes.iter().sum()
    }

    #[must_use]
    pub fn pending_capacity_bytes(&self) -> i64 {
        self.pending_capacity_bytes.iter().sum()
    }

    #[must_use]
    pub fn left_capacity_bytes(&self) -> i64 {
        self.capacity_bytes - self.used_capacity_bytes() - self.pending_capacity_bytes()
    }

    /// Whether the group has room for `target_capacity` (−1 meaning "MAX").
    #[must_use]
    pub fn has_capacity_for(&self, target_capacity: i64) -> bool {
        if target_capacity == MAX_CAPACITY {
            return self.left_capacity_bytes() > 0;
        }
        self.left_capacity_bytes() >= target_capacity
    }

    pub fn add_used_capacity_bytes(&mut self, used_capacity_bytes: i64) {
        self.used_capacity_bytes.push(used_capacity_bytes);
    }

    pub fn add_pending_capacity_bytes(&mut self, target_capacity: i64) {
        if self.has_capacity_for(target_capacity) {
            if target_capacity == MAX_CAPACITY {
                let left = self.left_capacity_bytes();
                self.pending_capacity_bytes.push(left);
            } else {
                self.pending_capacity_bytes.push(target_capacity);
            }
        }
    }

    /// Whether this group owns a volume, based on the volume's first drive.
    #[must_use]
    pub fn owns_volume(&self, volume: &Volume) -> bool {
        match volume.drive_refs().first() {
            Some(link) => self.drives.iter().any(|drive| drive.odata_id == link.odata_id),
            None => false,
        }
    }

    /// Whether this group contains the given drive.
    #[must_use]
    pub fn contains_drive(&self, drive: &Drive) -> bool {
        self.drives.iter().any(|member| member.id == drive.id)
    }

    /// Validate this group against a required capacity and raid setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSuitablePhysicalDiskGroup`] when the group has
    /// not enough left capacity or a different RAID level.
    pub fn validate_if_suitable_for(
        &self,
        target_capacity: i64,
        raid: &Raid,
    ) -> Result<(), Error> {
        if !self.has_capacity_for(target_capacity) {
            return Err(Error::NotSuitablePhysicalDiskGroup {
                message: "Those physical disks does not have enough capacity.".to_string(),
            });
        }
        if self.raid.name != raid.name {
            return Err(Error::NotSuitablePhysicalDiskGroup {
                message: format!(
                    "Those shareable physical disks has raid-level {}, could \
                     not be used for required raid-level {}.",
                    self.raid.key, raid.key
                ),
            });
        }
        Ok(())
    }

    /// Compare to another group for the same target capacity: fixed sizes
    /// prefer wasting less (smaller left capacity), MAX prefers keeping
    /// more. Ties are not better.
    #[must_use]
    pub fn is_better_than(&self, target_capacity: i64, other: Option<&Self>) -> bool {
        let other = match other {
            None => return true,
            Some(other) => other,
        };
        if target_capacity > 0 {
            self.left_capacity_bytes() < other.left_capacity_bytes()
        } else {
            self.left_capacity_bytes() > other.left_capacity_bytes()
        }
    }

    #[must_use]
    pub fn first_drive_id(&self) -> Option<i64> {
        self.drives.first().and_then(Drive::drive_id)
    }

    #[must_use]
    pub fn drives(&self) -> &[Drive] {
        &self.drives
    }
}

impl Display for PhysicalDiskGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let ids: Vec<&str> = self.drives.iter().map(|drive| drive.id.as_str()).collect();
        write!(f, "PhysicalDiskGroup({}-{})", self.raid.name, ids.join(","))
    }
}
