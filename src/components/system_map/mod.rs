//! Interactive system map of evidence elements and the forces between them.
//!
//! The map is split into a pure layout/interaction core and a thin canvas
//! front end:
//! - [`graph`] turns raw JSON into an arena graph, dropping what cannot be drawn
//! - [`simulation`] runs a seeded force-directed layout one tick at a time
//! - [`routing`] and [`geometry`] trim links to node rims and bend curved ones
//! - [`interaction`] tracks hover, selection and drag
//! - [`frame`] combines all of the above into per-frame render output
//!
//! # Example
//!
//! ```ignore
//! use evidence_map::{RawGraph, SystemMapCanvas};
//!
//! let raw = RawGraph::from_json(text)?;
//! view! { <SystemMapCanvas data=Signal::derive(move || raw.clone()) fullscreen=true /> }
//! ```

pub mod category;
mod component;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod graph;
pub mod interaction;
mod render;
pub mod routing;
pub mod scheduler;
pub mod simulation;
pub mod state;
pub mod theme;
pub mod types;

pub use component::SystemMapCanvas;
pub use config::MapConfig;
pub use error::GraphError;
pub use graph::{BuildDiagnostics, Graph, GraphBuilder};
pub use simulation::{ForceSimulation, SimulationConfig, Snapshot};
pub use state::SystemMapState;
pub use theme::Theme;
pub use types::RawGraph;
