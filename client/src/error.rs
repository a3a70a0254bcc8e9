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

//! Client error taxonomy.
//!
//! Transport failures are wrapped in [`Error::Transport`]; everything else
//! is a validation, selection or task failure raised while planning or
//! applying a RAID configuration. All variants carry a human-readable
//! message; callers that need to branch can match on the variant.

use ibmc_redfish_core::Error as TransportError;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

#[derive(Debug)]
pub enum Error {
    /// HTTP/session level failure, already classified by the transport.
    Transport(TransportError),
    /// A required attribute is absent from a Redfish document.
    MissingAttribute { attribute: String, resource: String },
    /// An attribute is present but unusable.
    MalformedAttribute {
        attribute: String,
        resource: String,
        error: String,
    },
    /// A Redfish action is not exposed by the resource.
    MissingAction { action: String, resource: String },
    /// The iBMC firmware does not implement the queried feature.
    FeatureNotSupported { feature: String },
    /// A settings call carried no properties.
    NothingToApply,
    NotSupportedRaidLevel {
        raid_level: String,
        controller: Option<String>,
    },
    InvalidPhysicalDiskNumber {
        number: usize,
        raid: &'static str,
    },
    InvalidLogicalDiskConfig {
        config: String,
        reason: String,
    },
    NoRaidControllerFound,
    ControllerHintRequired,
    NoControllerMatchesHint {
        hint: String,
    },
    NoDriveMatchesHint {
        hint: String,
        media_type: Option<String>,
        protocol: Option<String>,
    },
    ControllerNotSupportOob {
        controller: String,
    },
    LackOfDiskSpace,
    SpecifiedDisksHasNotEnoughSpace {
        size_gb: String,
        raid: &'static str,
    },
    NotSuitablePhysicalDiskGroup {
        message: String,
    },
    TaskFailed {
        message: String,
    },
}

impl From<TransportError> for Error {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Transport(source) => source.fmt(f),
            Self::MissingAttribute {
                attribute,
                resource,
            } => write!(
                f,
                "The attribute {} is missing from the resource {}",
                attribute, resource
            ),
            Self::MalformedAttribute {
                attribute,
                resource,
                error,
            } => write!(
                f,
                "The attribute {} is malformed in the resource {}: {}",
                attribute, resource, error
            ),
            Self::MissingAction { action, resource } => write!(
                f,
                "The action {} is missing from the resource {}",
                action, resource
            ),
            Self::FeatureNotSupported { feature } => write!(
                f,
                "Feature is not supported by this iBMC server: {}, please \
                 check the version of this iBMC server.",
                feature
            ),
            Self::NothingToApply => write!(
                f,
                "Nothing to apply, at least one property should be specified."
            ),
            Self::NotSupportedRaidLevel {
                raid_level,
                controller,
            } => match controller {
                Some(controller) => write!(
                    f,
                    "RAID level {} is not supported by controller {}.",
                    raid_level, controller
                ),
                None => write!(f, "RAID level {} is not supported.", raid_level),
            },
            Self::InvalidPhysicalDiskNumber { number, raid } => write!(
                f,
                "Invalid number_of_physical_disks option value {}, it could \
                 not work with raid-level {}.",
                number, raid
            ),
            Self::InvalidLogicalDiskConfig { config, reason } => write!(
                f,
                "Logical-disk config `{}` is invalid, reason: {}",
                config, reason
            ),
            Self::NoRaidControllerFound => write!(f, "No RAID storage controller found."),
            Self::ControllerHintRequired => write!(
                f,
                "Option `controller` is required because more than one RAID \
                 storage controller exists. Please review target-raid-config."
            ),
            Self::NoControllerMatchesHint { hint } => write!(
                f,
                "No RAID storage controller matches hint {}. Please using \
                 storage-id, storage-name or storage-controller-name as \
                 controller hint.",
                hint
            ),
            Self::NoDriveMatchesHint {
                hint,
                media_type,
                protocol,
            } => write!(
                f,
                "No available physical disk matches hint: {}, media-type: {}, \
                 protocol: {}. Please using HUAWEI drive-id, drive id, drive \
                 name or drive serial-number as physical disk hint.",
                hint,
                media_type.as_deref().unwrap_or("any"),
                protocol.as_deref().unwrap_or("any")
            ),
            Self::ControllerNotSupportOob { controller } => write!(
                f,
                "RAID controller `{}` does not support OOB management. \
                 Currently, ibmc RAID interface can only manage RAID \
                 controller which support OOB management.",
                controller
            ),
            Self::LackOfDiskSpace => write!(
                f,
                "There are not enough available disk space to create this \
                 logical disk."
            ),
            Self::SpecifiedDisksHasNotEnoughSpace { size_gb, raid } => write!(
                f,
                "The specified physical disks do not have enough space to \
                 create a {}G logical-disk(raid-level {}).",
                size_gb, raid
            ),
            Self::NotSuitablePhysicalDiskGroup { message } => message.fmt(f),
            Self::TaskFailed { message } => message.fmt(f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Transport(source) => Some(source),
            _ => None,
        }
    }
}
