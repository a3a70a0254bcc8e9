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

//! RAID level descriptors and the disk-selection algebra.
//!
//! [`Raid::best_matched_disks`] answers the central planning question:
//! given the free physical disks and a target capacity, which drive set
//! hosts the volume with the least waste (or, for "MAX" volumes, the most
//! usable bytes)? [`Raid::best_matched_disk_group`] is the shared-disk
//! counterpart that carves new volumes out of existing groups.

pub mod disk;
pub mod solution;

#[doc(inline)]
pub use disk::PhysicalDisk;
#[doc(inline)]
pub use disk::PhysicalDiskGroup;
#[doc(inline)]
pub use solution::RaidSolution;

use crate::error::Error;
use crate::resources::drive::Drive;
use crate::resources::storage::Volume;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Capacity sentinel for size "MAX": consume whatever is left.
pub const MAX_CAPACITY: i64 = -1;

/// No RAID, JBOD mode.
pub const JBOD: &str = "JBOD";
/// RAID Level 0, at least 1 drive is required.
pub const RAID0: &str = "RAID0";
/// RAID Level 1, at least 2 drives are required.
pub const RAID1: &str = "RAID1";
/// RAID Level 5, at least 3 drives are required. (N-1)
pub const RAID5: &str = "RAID5";
/// RAID Level 6, at least 3 drives are required. (N-2)
pub const RAID6: &str = "RAID6";
/// RAID Level 10, alias of RAID 1+0, at least 4 drives are required.
pub const RAID10: &str = "RAID10";
/// RAID Level 50.
pub const RAID50: &str = "RAID50";
/// RAID Level 60.
pub const RAID60: &str = "RAID60";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaidType {
    NonRedundant,
    Mirrored,
    StripedWithParity,
    Spanned,
    RawDevice,
}

/// Descriptor of one supported RAID level.
#[derive(Debug)]
pub struct Raid {
    /// User-facing key, e.g. `"5+0"`.
    pub key: &'static str,
    /// Canonical name, e.g. `"RAID50"`.
    pub name: &'static str,
    pub raid_type: RaidType,
    min_disks: usize,
    max_disks: usize,
    overhead: usize,
    /// Key of the sub-level when spanned.
    sub_level: Option<&'static str>,
}

pub static RAID_SETTINGS: &[Raid] = &[
    Raid {
        key: "JBOD",
        name: JBOD,
        raid_type: RaidType::RawDevice,
        min_disks: 1,
        max_disks: 1024,
        overhead: 0,
        sub_level: None,
    },
    Raid {
        key: "0",
        name: RAID0,
        raid_type: RaidType::NonRedundant,
        min_disks: 1,
        max_disks: 1024,
        overhead: 0,
        sub_level: None,
    },
    Raid {
        key: "1",
        name: RAID1,
        raid_type: RaidType::Mirrored,
        min_disks: 2,
        max_disks: 2,
        overhead: 1,
        sub_level: None,
    },
    Raid {
        key: "5",
        name: RAID5,
        raid_type: RaidType::StripedWithParity,
        min_disks: 3,
        max_disks: 1024,
        overhead: 1,
        sub_level: None,
    },
    Raid {
        key: "6",
        name: RAID6,
        raid_type: RaidType::StripedWithParity,
        min_disks: 3,
        max_disks: 1024,
        overhead: 2,
        sub_level: None,
    },
    Raid {
        key: "1+0",
        name: RAID10,
        raid_type: RaidType::Spanned,
        min_disks: 0,
        max_disks: 0,
        overhead: 0,
        sub_level: Some("1"),
    },
    Raid {
        key: "5+0",
        name: RAID50,
        raid_type: RaidType::Spanned,
        min_disks: 0,
        max_disks: 0,
        overhead: 0,
        sub_level: Some("5"),
    },
    Raid {
        key: "6+0",
        name: RAID60,
        raid_type: RaidType::Spanned,
        min_disks: 0,
        max_disks: 0,
        overhead: 0,
        sub_level: Some("6"),
    },
];

fn required_capacity_per_disk(target_capacity: i64, effective_disks: i64) -> i64 {
    if target_capacity <= 0 || effective_disks <= 0 {
        return 0;
    }
    (target_capacity + effective_disks - 1) / effective_disks
}

impl Raid {
    /// Look a level up by user key (`"1+0"`) or canonical name (`"RAID10"`).
    #[must_use]
    pub fn lookup(key: &str) -> Option<&'static Raid> {
        RAID_SETTINGS
            .iter()
            .find(|raid| raid.key == key || raid.name == key)
    }

    #[must_use]
    pub fn is_spanned(&self) -> bool {
        self.raid_type == RaidType::Spanned
    }

    fn sub_raid(&self) -> Option<&'static Raid> {
        self.sub_level.and_then(Raid::lookup)
    }

    /// Min required disks for all possible situations. Spanned levels need
    /// at least two spans of their sub-level.
    #[must_use]
    pub fn min_disks_required(&self) -> usize {
        match self.sub_raid() {
            Some(sub) => sub.min_disks * 2,
            None => self.min_disks,
        }
    }

    /// Parity/mirror disks that contribute no capacity, per span.
    #[must_use]
    pub fn overhead_per_span(&self) -> usize {
        match self.sub_raid() {
            Some(sub) => sub.overhead,
            None => self.overhead,
        }
    }

    /// Best existing disk group for the target capacity, by the same
    /// waste-least strategy. Returns an index into `groups`.
    #[must_use]
    pub fn best_matched_disk_group(
        &self,
        target_capacity: i64,
        groups: &[PhysicalDiskGroup],
    ) -> Option<usize> {
        info!(
            "Try to get best matched disk-group for volume({}) with target \
             capacity {} using waste least strategy",
            self.name, target_capacity
        );

        let mut best_choice: Option<usize> = None;
        for (index, group) in groups.iter().enumerate() {
            match group.validate_if_suitable_for(target_capacity, self) {
                Err(reason) => {
                    debug!("{} is not a choice:: {}", group, reason);
                }
                Ok(()) => {
                    let better = group
                        .is_better_than(target_capacity, best_choice.map(|best| &groups[best]));
                    debug!(
                        "{} choice:: disk-group->{}, left-capacity-bytes: {}",
                        if better { "Find a better" } else { "Not a better" },
                        group,
                        group.left_capacity_bytes()
                    );
                    if better {
                        best_choice = Some(index);
                    }
                }
            }
        }
        best_choice
    }

    /// Best matched disks for the target capacity with this RAID level.
    ///
    /// `disk_count_to_use` forces the total disk count when set; otherwise
    /// the count is chosen freely within the level's bounds. JBOD needs no
    /// selection and yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPhysicalDiskNumber`] when a forced disk
    /// count fits no legal span of this level.
    pub fn best_matched_disks<'a>(
        &'static self,
        target_capacity: i64,
        available_disks: &[&'a PhysicalDisk],
        disk_count_to_use: Option<usize>,
    ) -> Result<Option<RaidSolution<'a>>, Error> {
        if self.name == JBOD {
            return Ok(None);
        }

        info!(
            "Calculate waste least disks for volume({}) with target capacity \
             {}, {} available disks.",
            self.name,
            target_capacity,
            available_disks.len()
        );

        let raid = self.sub_raid().unwrap_or(self);
        let spans: Vec<usize> = if self.is_spanned() {
            (2..9).collect()
        } else {
            vec![1]
        };

        // Never mix media types in one volume: partition first, keep the
        // first-seen order stable.
        let mut grouped: Vec<(Option<String>, Vec<&'a PhysicalDisk>)> = Vec::new();
        for &disk in available_disks {
            let media = disk.media_type().map(str::to_string);
            match grouped.iter_mut().find(|(existing, _)| *existing == media) {
                Some((_, disks)) => disks.push(disk),
                None => grouped.push((media, vec![disk])),
            }
        }

        let mut specified_count_legal = disk_count_to_use.is_none();
        let mut best_solution: Option<RaidSolution<'a>> = None;

        for (media_type, disks_by_media) in &grouped {
            debug!("Try to calculate for media type `{:?}` now.", media_type);
            for &span in &spans {
                if let Some(count) = disk_count_to_use {
                    if count % span != 0 {
                        debug!(
                            "Specified disk count number `{}` does not match \
                             span number {}, continue.",
                            count, span
                        );
                        continue;
                    }
                    let count_per_span = count / span;
                    if count_per_span < raid.min_disks || count_per_span > raid.max_disks {
                        debug!(
                            "Specified disk count number `{}` does not match \
                             raid-level {} with span {}, continue.",
                            count, self.key, span
                        );
                        continue;
                    }
                    specified_count_legal = true;
                }

                let min_disks = disk_count_to_use.unwrap_or(raid.min_disks * span);
                let max_disks = disk_count_to_use.unwrap_or(raid.max_disks * span);
                let overhead = raid.overhead * span;

                if min_disks > disks_by_media.len() {
                    debug!(
                        "Disk count({}) is less than min-disks({}), break \
                         current branch.",
                        disks_by_media.len(),
                        min_disks
                    );
                    break;
                }

                let max_disk_count = max_disks.min(disks_by_media.len());
                for disk_count in (min_disks..=max_disk_count).step_by(span) {
                    debug!("Calculate for span:: {}, disk-count:: {}.", span, disk_count);

                    let effective_disks = disk_count as i64 - overhead as i64;
                    if effective_disks <= 0 {
                        continue;
                    }
                    let required_capacity =
                        required_capacity_per_disk(target_capacity, effective_disks);
                    let mut matched_disks: Vec<&'a PhysicalDisk> = disks_by_media
                        .iter()
                        .copied()
                        .filter(|disk| disk.capacity_bytes() >= required_capacity)
                        .collect();
                    if matched_disks.len() < disk_count {
                        debug!(
                            "Not enough disks has required capacity {}, \
                             required {} actual {}.",
                            required_capacity,
                            disk_count,
                            matched_disks.len()
                        );
                        continue;
                    }

                    matched_disks.sort_by_key(|disk| disk.capacity_bytes());
                    let cases = matched_disks.len() - disk_count + 1;
                    for start in 0..cases {
                        let window = matched_disks[start..start + disk_count].to_vec();
                        let candidate = RaidSolution::new(span, window, overhead);
                        let better = candidate.is_better_than(target_capacity, best_solution.as_ref());
                        debug!(
                            "{} choice:: span->{}, total-waste-bytes->{}, \
                             used-disks-total-bytes->{}, raid-volume-bytes->{}",
                            if better { "Find a better" } else { "Not a better" },
                            candidate.span,
                            candidate.disks_waste_bytes,
                            candidate.disks_total_bytes,
                            candidate.raid_total_bytes
                        );
                        if better {
                            best_solution = Some(candidate);
                        }
                    }

                    // When every disk of this media type already qualified,
                    // a larger disk count can only waste more for a fixed
                    // size, so stop growing it.
                    if matched_disks.len() == disks_by_media.len() && target_capacity > 0 {
                        break;
                    }
                }
            }
        }

        if !specified_count_legal {
            return Err(Error::InvalidPhysicalDiskNumber {
                number: disk_count_to_use.unwrap_or(0),
                raid: self.key,
            });
        }

        Ok(best_solution)
    }
}

/// Fold a controller's current volumes into the disk groups they live on:
/// a volume whose first drive is already owned by a group adds its
/// capacity there, anything else seeds a fresh group.
#[must_use]
pub fn build_disk_groups(volumes: &[Volume], all_drives: &[Drive]) -> Vec<PhysicalDiskGroup> {
    let mut disk_groups: Vec<PhysicalDiskGroup> = Vec::new();
    for volume in volumes {
        match disk_groups
            .iter_mut()
            .find(|group| group.owns_volume(volume))
        {
            Some(group) => group.add_used_capacity_bytes(volume.capacity_bytes()),
            None => match PhysicalDiskGroup::from_volume(volume, all_drives) {
                Some(group) => disk_groups.push(group),
                None => warn!(
                    "volume {} has no recognisable raid level or drives, skipped",
                    volume.id
                ),
            },
        }
    }
    disk_groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const GB: i64 = 1024 * 1024 * 1024;

    fn drive(id: i64, capacity_gb: i64, media: &str) -> Drive {
        serde_json::from_value(serde_json::json!({
            "@odata.id": format!("/redfish/v1/Chassis/1/Drives/HDDPlaneDisk{}", id),
            "Id": format!("HDDPlaneDisk{}", id),
            "Name": format!("Disk{}", id),
            "Protocol": "SATA",
            "MediaType": media,
            "CapacityBytes": capacity_gb * GB,
            "Oem": {"Huawei": {"DriveID": id, "FirmwareStatus": "UnconfiguredGood"}}
        }))
        .expect("valid drive")
    }

    fn drives(specs: &[(i64, i64, &str)]) -> Vec<Drive> {
        specs
            .iter()
            .map(|(id, capacity, media)| drive(*id, *capacity, *media))
            .collect()
    }

    fn pool(all: &[Drive]) -> Vec<PhysicalDisk> {
        all.iter().map(PhysicalDisk::new).collect()
    }

    fn excludable(disks: &[PhysicalDisk]) -> Vec<&PhysicalDisk> {
        disks.iter().filter(|disk| disk.is_excludable()).collect()
    }

    fn raid(key: &str) -> &'static Raid {
        Raid::lookup(key).expect("known level")
    }

    fn volume_on(drive_ids: &[i64], raid_level: &str, capacity_gb: i64) -> Volume {
        let links: Vec<serde_json::Value> = drive_ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "@odata.id": format!("/redfish/v1/Chassis/1/Drives/HDDPlaneDisk{}", id)
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "@odata.id": "/redfish/v1/Systems/1/Storages/RAIDStorage0/Volumes/LogicalDrive0",
            "Id": "LogicalDrive0",
            "CapacityBytes": capacity_gb * GB,
            "Links": {"Drives": links},
            "Oem": {"Huawei": {"VolumeRaidLevel": raid_level, "SpanNumber": 1}}
        }))
        .expect("valid volume")
    }

    #[test]
    fn test_lookup_by_key_and_name() {
        assert_eq!(raid("1+0").name, RAID10);
        assert_eq!(raid("RAID10").key, "1+0");
        assert_eq!(raid("5").name, RAID5);
        assert!(Raid::lookup("7").is_none());
    }

    #[test]
    fn test_min_disks_and_overhead() {
        assert_eq!(raid("0").min_disks_required(), 1);
        assert_eq!(raid("1").min_disks_required(), 2);
        assert_eq!(raid("5").min_disks_required(), 3);
        assert_eq!(raid("1+0").min_disks_required(), 4);
        assert_eq!(raid("5+0").min_disks_required(), 6);
        assert_eq!(raid("6+0").min_disks_required(), 6);

        assert_eq!(raid("6").overhead_per_span(), 2);
        assert_eq!(raid("5+0").overhead_per_span(), 1);
        assert_eq!(raid("1+0").overhead_per_span(), 1);
    }

    #[test]
    fn test_jbod_needs_no_selection() {
        let all = drives(&[(0, 100, "HDD"), (1, 100, "HDD")]);
        let disks = pool(&all);
        let solution = raid("JBOD")
            .best_matched_disks(100 * GB, &excludable(&disks), None)
            .expect("no selection error");
        assert!(solution.is_none());
    }

    #[test]
    fn test_waste_less_prefers_smaller_pair() {
        // 6 x 100G then 10 x 200G: the fixed-size volume takes the cheap
        // pair, MAX takes the large one.
        let mut specs: Vec<(i64, i64, &str)> = Vec::new();
        for id in 0..6 {
            specs.push((id, 100, "HDD"));
        }
        for id in 6..16 {
            specs.push((id, 200, "HDD"));
        }
        let all = drives(&specs);
        let disks = pool(&all);

        let fixed = raid("1")
            .best_matched_disks(100 * GB, &excludable(&disks), None)
            .expect("selection runs")
            .expect("solution found");
        assert_eq!(fixed.drive_ids(), vec![0, 1]);
        assert_eq!(fixed.span, 1);
        for chosen in &fixed.disks {
            chosen.mark_as_exclusive();
        }

        let max = raid("1")
            .best_matched_disks(MAX_CAPACITY, &excludable(&disks), None)
            .expect("selection runs")
            .expect("solution found");
        assert_eq!(max.drive_ids(), vec![6, 7]);
        assert_eq!(max.raid_total_bytes, 200 * GB);
    }

    #[test]
    fn test_odd_leading_disk_cannot_pair() {
        // A lone 100G drive pairs only at a 100G tier; the waste-less rule
        // skips it in favour of an equal-size 200G pair.
        let mut specs: Vec<(i64, i64, &str)> = vec![(0, 100, "HDD")];
        for id in 1..16 {
            specs.push((id, 200, "HDD"));
        }
        let all = drives(&specs);
        let disks = pool(&all);

        let fixed = raid("1")
            .best_matched_disks(100 * GB, &excludable(&disks), None)
            .expect("selection runs")
            .expect("solution found");
        assert_eq!(fixed.drive_ids(), vec![1, 2]);
        for chosen in &fixed.disks {
            chosen.mark_as_exclusive();
        }

        let max = raid("1")
            .best_matched_disks(MAX_CAPACITY, &excludable(&disks), None)
            .expect("selection runs")
            .expect("solution found");
        assert_eq!(max.drive_ids(), vec![3, 4]);
    }

    #[test]
    fn test_never_mixes_media_types() {
        let mut specs: Vec<(i64, i64, &str)> = Vec::new();
        for id in 0..6 {
            specs.push((id, 100, "SSD"));
        }
        for id in 6..13 {
            specs.push((id, 100, "HDD"));
        }
        for id in 13..21 {
            specs.push((id, 200, "HDD"));
        }
        let all = drives(&specs);
        let disks = pool(&all);

        let fixed = raid("5")
            .best_matched_disks(600 * GB, &excludable(&disks), None)
            .expect("selection runs")
            .expect("solution found");
        assert_eq!(fixed.drive_ids(), vec![6, 7, 8, 9, 10, 11, 12]);
        let media: Vec<&str> = fixed
            .disks
            .iter()
            .filter_map(|disk| disk.media_type())
            .collect();
        assert!(media.iter().all(|m| *m == "HDD"));
        for chosen in &fixed.disks {
            chosen.mark_as_exclusive();
        }

        let max = raid("5")
            .best_matched_disks(MAX_CAPACITY, &excludable(&disks), None)
            .expect("selection runs")
            .expect("solution found");
        assert_eq!(max.drive_ids(), vec![13, 14, 15, 16, 17, 18, 19, 20]);
        assert_eq!(max.raid_total_bytes, 7 * 200 * GB);
    }

    #[test]
    fn test_span_inference_for_raid50() {
        let specs: Vec<(i64, i64, &str)> = (0..9).map(|id| (id, 200, "HDD")).collect();
        let all = drives(&specs);
        let disks = pool(&all);

        let solution = raid("5+0")
            .best_matched_disks(100 * GB, &excludable(&disks), Some(9))
            .expect("selection runs")
            .expect("solution found");
        assert_eq!(solution.span, 3);
        assert_eq!(solution.disks_count, 9);
        assert_eq!(solution.drive_ids(), (0..9).collect::<Vec<i64>>());
    }

    #[test]
    fn test_solution_shape_invariants() {
        let specs: Vec<(i64, i64, &str)> = (0..12).map(|id| (id, 200, "HDD")).collect();
        let all = drives(&specs);
        let disks = pool(&all);

        let level = raid("1+0");
        let solution = level
            .best_matched_disks(300 * GB, &excludable(&disks), None)
            .expect("selection runs")
            .expect("solution found");
        assert_eq!(solution.disks_count % solution.span, 0);
        assert_eq!(solution.disks_count / solution.span, 2);
        assert!(solution.raid_total_bytes >= 300 * GB);
    }

    #[test]
    fn test_illegal_disk_count_is_reported() {
        let specs: Vec<(i64, i64, &str)> = (0..8).map(|id| (id, 200, "HDD")).collect();
        let all = drives(&specs);
        let disks = pool(&all);

        // 7 disks fit no span of RAID50: indivisible by 2..6, and a span
        // of 7 leaves one disk per span.
        let error = raid("5+0")
            .best_matched_disks(100 * GB, &excludable(&disks), Some(7))
            .expect_err("illegal count");
        assert!(matches!(
            error,
            Error::InvalidPhysicalDiskNumber { number: 7, raid: "5+0" }
        ));

        // RAID1 takes exactly two disks.
        let error = raid("1")
            .best_matched_disks(100 * GB, &excludable(&disks), Some(4))
            .expect_err("illegal count");
        assert!(matches!(
            error,
            Error::InvalidPhysicalDiskNumber { number: 4, raid: "1" }
        ));
    }

    #[test]
    fn test_not_enough_disks_yields_none() {
        let all = drives(&[(0, 200, "HDD"), (1, 200, "HDD")]);
        let disks = pool(&all);
        let solution = raid("5")
            .best_matched_disks(100 * GB, &excludable(&disks), None)
            .expect("selection runs");
        assert!(solution.is_none());
    }

    #[test]
    fn test_specified_disks_without_enough_space_yield_none() {
        let all = drives(&[(0, 100, "HDD"), (1, 100, "HDD")]);
        let disks = pool(&all);
        let solution = raid("1")
            .best_matched_disks(500 * GB, &excludable(&disks), Some(2))
            .expect("count is legal");
        assert!(solution.is_none());
    }

    #[test]
    fn test_disk_group_capacity_accounting() {
        let all = drives(&[(8, 200, "HDD"), (9, 200, "HDD"), (10, 200, "HDD"), (11, 200, "HDD")]);
        let volume = volume_on(&[8, 9, 10, 11], RAID5, 200);
        let mut group = PhysicalDiskGroup::from_volume(&volume, &all).expect("group builds");

        assert_eq!(group.capacity_bytes(), 600 * GB);
        assert_eq!(group.used_capacity_bytes(), 200 * GB);
        assert_eq!(group.left_capacity_bytes(), 400 * GB);
        assert!(group.has_capacity_for(400 * GB));
        assert!(!group.has_capacity_for(401 * GB));
        assert!(group.has_capacity_for(MAX_CAPACITY));

        group.add_pending_capacity_bytes(300 * GB);
        assert_eq!(group.left_capacity_bytes(), 100 * GB);

        // MAX consumes whatever is left, and a full group refuses more.
        group.add_pending_capacity_bytes(MAX_CAPACITY);
        assert_eq!(group.left_capacity_bytes(), 0);
        assert!(!group.has_capacity_for(MAX_CAPACITY));
        group.add_pending_capacity_bytes(MAX_CAPACITY);
        assert_eq!(group.left_capacity_bytes(), 0);
    }

    #[test]
    fn test_disk_group_validation() {
        let all = drives(&[(0, 200, "HDD"), (1, 200, "HDD"), (2, 200, "HDD")]);
        let volume = volume_on(&[0, 1, 2], RAID5, 100);
        let group = PhysicalDiskGroup::from_volume(&volume, &all).expect("group builds");

        group
            .validate_if_suitable_for(100 * GB, raid("5"))
            .expect("capacity and level match");

        let error = group
            .validate_if_suitable_for(100 * GB, raid("0"))
            .expect_err("level mismatch");
        assert!(error.to_string().contains("raid-level RAID5"));

        let error = group
            .validate_if_suitable_for(10_000 * GB, raid("5"))
            .expect_err("too large");
        assert!(error.to_string().contains("does not have enough capacity"));
    }

    #[test]
    fn test_best_matched_disk_group_prefers_waste_less() {
        let small = drives(&[(0, 200, "HDD"), (1, 200, "HDD"), (2, 200, "HDD")]);
        let large = drives(&[(3, 500, "HDD"), (4, 500, "HDD"), (5, 500, "HDD")]);
        let groups = vec![
            PhysicalDiskGroup::from_volume(&volume_on(&[0, 1, 2], RAID5, 100), &small)
                .expect("group builds"),
            {
                let mut group = PhysicalDiskGroup::new(large, raid("5"), 1);
                group.add_used_capacity_bytes(100 * GB);
                group
            },
        ];

        // Fixed size: the fuller (smaller-left) group wins.
        let best = raid("5")
            .best_matched_disk_group(200 * GB, &groups)
            .expect("a group qualifies");
        assert_eq!(best, 0);

        // MAX: the roomier group wins.
        let best = raid("5")
            .best_matched_disk_group(MAX_CAPACITY, &groups)
            .expect("a group qualifies");
        assert_eq!(best, 1);

        // A different level disqualifies both.
        assert!(raid("1").best_matched_disk_group(50 * GB, &groups).is_none());
    }

    #[test]
    fn test_build_disk_groups_folds_shared_volumes() {
        let all = drives(&[
            (0, 200, "HDD"),
            (1, 200, "HDD"),
            (2, 200, "HDD"),
            (3, 500, "HDD"),
            (4, 500, "HDD"),
        ]);
        let volumes = vec![
            volume_on(&[0, 1, 2], RAID5, 100),
            volume_on(&[0, 1, 2], RAID5, 150),
            volume_on(&[3, 4], RAID1, 200),
        ];
        let groups = build_disk_groups(&volumes, &all);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].used_capacity_bytes(), 250 * GB);
        assert_eq!(groups[1].used_capacity_bytes(), 200 * GB);
        assert_eq!(groups[1].raid().name, RAID1);
    }

    #[test]
    fn test_exclusive_disks_never_come_back() {
        let all = drives(&[(0, 100, "HDD"), (1, 100, "HDD"), (2, 100, "HDD")]);
        let disks = pool(&all);
        disks[0].mark_as_exclusive();
        assert!(!disks[0].is_excludable());
        let free = excludable(&disks);
        assert_eq!(free.len(), 2);
    }
}
