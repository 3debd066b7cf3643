//! `sr-graph` — immutable road multigraph, coordinate resolution, and loaders.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                      |
//! |------------|---------------------------------------------------------------|
//! | [`graph`]  | `RoadGraph` (CSR multigraph + R-tree), `RoadGraphBuilder`     |
//! | [`loader`] | `load_graph_csv`, `load_graph_readers`                        |
//! | [`osm`]    | `load_from_pbf` (feature = `"osm"` only)                      |
//! | [`error`]  | `GraphError`, `GraphResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag  | Effect                                          |
//! |-------|-------------------------------------------------|
//! | `osm` | Enables OSM PBF loading via the `osmpbf` crate. |

pub mod error;
pub mod graph;
pub mod loader;

#[cfg(feature = "osm")]
pub mod osm;


pub use error::{GraphError, GraphResult};
pub use graph::{DEFAULT_EDGE_LENGTH_M, MAX_EDGE_LENGTH_M, RoadGraph, RoadGraphBuilder};
pub use loader::{load_graph_csv, load_graph_readers};
