//! Supported S3 regions and region name resolution.
//!
//! Region names are matched after normalization: ASCII uppercase with `-`
//! folded into `_`, so `ap-northeast-1`, `AP_NORTHEAST_1` and `Ap-Northeast_1`
//! all name the same region. Legacy location aliases (`TOKYO`, `IRELAND`, ...)
//! are accepted as well.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Region used when none is configured or the configured one is unknown.
pub const DEFAULT_REGION: Region = Region::ApNortheast1;

/// An S3 region this crate knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    UsEast1,
    UsEast2,
    UsWest1,
    UsWest2,
    CaCentral1,
    EuWest1,
    EuWest2,
    EuWest3,
    EuCentral1,
    EuNorth1,
    ApSoutheast1,
    ApSoutheast2,
    ApNortheast1,
    ApNortheast2,
    ApNortheast3,
    ApSouth1,
    SaEast1,
    UsGovWest1,
    CnNorth1,
}

/// Normalized name -> region. Canonical names come first for each region so
/// that `list_regions` preserves this order after deduplication.
const REGION_NAMES: &[(&str, Region)] = &[
    ("US_EAST_1", Region::UsEast1),
    ("NORTHERN_VIRGINIA", Region::UsEast1),
    ("US_STANDARD", Region::UsEast1),
    ("US_EAST_2", Region::UsEast2),
    ("OHIO", Region::UsEast2),
    ("US_WEST_1", Region::UsWest1),
    ("NORTHERN_CALIFORNIA", Region::UsWest1),
    ("US_WEST_2", Region::UsWest2),
    ("OREGON", Region::UsWest2),
    ("CA_CENTRAL_1", Region::CaCentral1),
    ("EU_WEST_1", Region::EuWest1),
    ("IRELAND", Region::EuWest1),
    ("EU_WEST_2", Region::EuWest2),
    ("LONDON", Region::EuWest2),
    ("EU_WEST_3", Region::EuWest3),
    ("PARIS", Region::EuWest3),
    ("EU_CENTRAL_1", Region::EuCentral1),
    ("FRANKFURT", Region::EuCentral1),
    ("EU_NORTH_1", Region::EuNorth1),
    ("STOCKHOLM", Region::EuNorth1),
    ("AP_SOUTHEAST_1", Region::ApSoutheast1),
    ("SINGAPORE", Region::ApSoutheast1),
    ("AP_SOUTHEAST_2", Region::ApSoutheast2),
    ("SYDNEY", Region::ApSoutheast2),
    ("AP_NORTHEAST_1", Region::ApNortheast1),
    ("TOKYO", Region::ApNortheast1),
    ("AP_NORTHEAST_2", Region::ApNortheast2),
    ("SEOUL", Region::ApNortheast2),
    ("AP_NORTHEAST_3", Region::ApNortheast3),
    ("OSAKA", Region::ApNortheast3),
    ("AP_SOUTH_1", Region::ApSouth1),
    ("MUMBAI", Region::ApSouth1),
    ("SA_EAST_1", Region::SaEast1),
    ("SAO_PAULO", Region::SaEast1),
    ("US_GOV_WEST_1", Region::UsGovWest1),
    ("GOV_CLOUD_US", Region::UsGovWest1),
    ("CN_NORTH_1", Region::CnNorth1),
    ("BEIJING", Region::CnNorth1),
];

impl Region {
    /// AWS region code, e.g. `ap-northeast-1`.
    pub fn code(self) -> &'static str {
        match self {
            Self::UsEast1 => "us-east-1",
            Self::UsEast2 => "us-east-2",
            Self::UsWest1 => "us-west-1",
            Self::UsWest2 => "us-west-2",
            Self::CaCentral1 => "ca-central-1",
            Self::EuWest1 => "eu-west-1",
            Self::EuWest2 => "eu-west-2",
            Self::EuWest3 => "eu-west-3",
            Self::EuCentral1 => "eu-central-1",
            Self::EuNorth1 => "eu-north-1",
            Self::ApSoutheast1 => "ap-southeast-1",
            Self::ApSoutheast2 => "ap-southeast-2",
            Self::ApNortheast1 => "ap-northeast-1",
            Self::ApNortheast2 => "ap-northeast-2",
            Self::ApNortheast3 => "ap-northeast-3",
            Self::ApSouth1 => "ap-south-1",
            Self::SaEast1 => "sa-east-1",
            Self::UsGovWest1 => "us-gov-west-1",
            Self::CnNorth1 => "cn-north-1",
        }
    }

    /// Normalized identifier, e.g. `AP_NORTHEAST_1`.
    pub fn identifier(self) -> String {
        normalize(self.code())
    }
}

impl Default for Region {
    fn default() -> Self {
        DEFAULT_REGION
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve_region(s)
    }
}

impl TryFrom<String> for Region {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        resolve_region(&value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.code().to_string()
    }
}

impl From<Region> for aws_types::region::Region {
    fn from(region: Region) -> Self {
        aws_types::region::Region::from_static(region.code())
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase().replace('-', "_")
}

/// Returns every supported region once, in table order.
pub fn list_regions() -> Vec<Region> {
    let mut regions: Vec<Region> = Vec::new();
    for (_, region) in REGION_NAMES {
        if !regions.contains(region) {
            regions.push(*region);
        }
    }
    regions
}

/// Resolves a region name, ignoring case and `-`/`_` differences.
pub fn resolve_region(name: &str) -> StoreResult<Region> {
    let wanted = normalize(name);
    REGION_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == wanted)
        .map(|(_, region)| *region)
        .ok_or_else(|| StoreError::not_found(format!("region {name:?}")))
}

/// Resolves `name`, falling back to [`DEFAULT_REGION`] when it is absent,
/// blank or unknown.
pub fn region_or_default(name: Option<&str>) -> Region {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => resolve_region(n).unwrap_or(DEFAULT_REGION),
        None => DEFAULT_REGION,
    }
}
