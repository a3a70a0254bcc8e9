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

//! Candidate drive sets for one logical disk.

use crate::raid::disk::PhysicalDisk;

/// One candidate drive set: which disks, how they span, and what the
/// resulting volume and waste look like.
///
/// `raid_total_bytes = disks_min_bytes × (len − overhead)` and
/// `disks_waste_bytes = Σcapacity − disks_min_bytes × len`: a RAID volume
/// is limited by its smallest member, anything above that per disk is
/// wasted.
#[derive(Debug)]
pub struct RaidSolution<'a> {
    pub span: usize,
    /// Chosen disks, sorted ascending by capacity.
    pub disks: Vec<&'a PhysicalDisk>,
    pub disks_count: usize,
    pub disks_total_bytes: i64,
    pub disks_min_bytes: i64,
    pub disks_waste_bytes: i64,
    pub raid_total_bytes: i64,
}

impl<'a> RaidSolution<'a> {
    #[must_use]
    pub fn new(span: usize, mut disks: Vec<&'a PhysicalDisk>, overhead: usize) -> Self {
        disks.sort_by_key(|disk| disk.capacity_bytes());
        let disks_total_bytes: i64 = disks.iter().map(|disk| disk.capacity_bytes()).sum();
        let disks_min_bytes = disks.first().map_or(0, |disk| disk.capacity_bytes());
        let disks_count = disks.len();
        let effect_disk_count = (disks_count - overhead) as i64;
        let raid_total_bytes = disks_min_bytes * effect_disk_count;
        let disks_waste_bytes = disks_total_bytes - disks_min_bytes * disks_count as i64;
        Self {
            span,
            disks,
            disks_count,
            disks_total_bytes,
            disks_min_bytes,
            disks_waste_bytes,
            raid_total_bytes,
        }
    }

    /// Compare against the best solution so far.
    ///
    /// Fixed-size targets prefer the set wasting less capacity; MAX
    /// targets prefer the larger volume. Ties fall through to the
    /// secondary orderings; an exact tie is not better.
    #[must_use]
    pub fn is_better_than(&self, target_capacity: i64, other: Option<&Self>) -> bool {
        if target_capacity > 0 {
            self.waste_less_than(other)
        } else {
            self.raid_capacity_great_than(other)
        }
    }

    fn waste_less_than(&self, other: Option<&Self>) -> bool {
        let other = match other {
            None => return true,
            Some(other) => other,
        };
        if self.disks_waste_bytes != other.disks_waste_bytes {
            return self.disks_waste_bytes < other.disks_waste_bytes;
        }
        if self.disks_total_bytes != other.disks_total_bytes {
            return self.disks_total_bytes < other.disks_total_bytes;
        }
        if self.disks_count != other.disks_count {
            return self.disks_count < other.disks_count;
        }
        false
    }

    fn raid_capacity_great_than(&self, other: Option<&Self>) -> bool {
        let other = match other {
            None => return true,
            Some(other) => other,
        };
        if self.raid_total_bytes != other.raid_total_bytes {
            return self.raid_total_bytes > other.raid_total_bytes;
        }
        self.waste_less_than(Some(other))
    }

    /// OEM drive ids of the chosen disks.
    #[must_use]
    pub fn drive_ids(&self) -> Vec<i64> {
        self.disks
            .iter()
            .filter_map(|disk| disk.drive_id())
            .collect()
    }
}
