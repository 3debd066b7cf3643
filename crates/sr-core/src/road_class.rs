//! Functional road classification shared by the graph loaders and the risk
//! feature encoder.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Functional class of a road segment.
///
/// Mirrors the OSM `highway` hierarchy for drivable roads.  Anything the
/// loaders cannot place is [`RoadClass::Unknown`], which the feature encoder
/// treats as the residential tier.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    #[default]
    Unknown,
}

impl RoadClass {
    /// Ordinal capacity rank fed to the risk oracle as `road_type`.
    ///
    /// | Class       | Rank |
    /// |-------------|------|
    /// | motorway    | 5    |
    /// | trunk       | 4    |
    /// | primary     | 3    |
    /// | secondary   | 2    |
    /// | tertiary    | 1.5  |
    /// | residential | 1    |
    /// | service     | 0.5  |
    /// | unknown     | 1    |
    pub fn capacity_rank(self) -> f64 {
        match self {
            RoadClass::Motorway    => 5.0,
            RoadClass::Trunk       => 4.0,
            RoadClass::Primary     => 3.0,
            RoadClass::Secondary   => 2.0,
            RoadClass::Tertiary    => 1.5,
            RoadClass::Residential => 1.0,
            RoadClass::Service     => 0.5,
            RoadClass::Unknown     => RoadClass::Residential.capacity_rank(),
        }
    }

    /// Classify an OSM `highway` tag value.
    ///
    /// Multi-valued tags (`"primary;secondary"`) use the first value.
    /// `_link` ramps take the class of the road they serve.
    pub fn from_highway(tag: &str) -> RoadClass {
        let first = tag.split(';').next().unwrap_or("").trim();
        match first {
            "motorway"  | "motorway_link"       => RoadClass::Motorway,
            "trunk"     | "trunk_link"          => RoadClass::Trunk,
            "primary"   | "primary_link"        => RoadClass::Primary,
            "secondary" | "secondary_link"      => RoadClass::Secondary,
            "tertiary"  | "tertiary_link"       => RoadClass::Tertiary,
            "residential" | "living_street"     => RoadClass::Residential,
            "service"                           => RoadClass::Service,
            _                                   => RoadClass::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Motorway    => "motorway",
            RoadClass::Trunk       => "trunk",
            RoadClass::Primary     => "primary",
            RoadClass::Secondary   => "secondary",
            RoadClass::Tertiary    => "tertiary",
            RoadClass::Residential => "residential",
            RoadClass::Service     => "service",
            RoadClass::Unknown     => "unknown",
        }
    }
}

impl FromStr for RoadClass {
    type Err = std::convert::Infallible;

    /// Never fails: unrecognised values map to [`RoadClass::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RoadClass::from_highway(&s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for RoadClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
