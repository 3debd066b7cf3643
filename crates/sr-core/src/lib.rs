//! `sr-core` — foundational types for the saferoute dual routing engine.
//!
//! This crate is a dependency of every other `sr-*` crate.  It has no `sr-*`
//! dependencies and few external ones (`rand`, `serde`, `thiserror`).
//!
//! # What lives here
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`ids`]        | `NodeId`, `EdgeId`, `EdgeKey`                            |
//! | [`geo`]        | `GeoPoint`, haversine distance                           |
//! | [`road_class`] | `RoadClass` and its capacity rank                        |
//! | [`context`]    | `Context`, `ContextInput`, defaults and validation       |
//! | [`source`]     | `ContextSource`, `FixedContextSource`, `SyntheticContextSource` |
//! | [`error`]      | `CoreError`, `CoreResult`                                |

pub mod context;
pub mod error;
pub mod geo;
pub mod ids;
pub mod road_class;
pub mod source;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use context::{Context, ContextInput, Flag};
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, EdgeKey, NodeId};
pub use road_class::RoadClass;
pub use source::{ContextSource, FixedContextSource, SyntheticContextSource};
