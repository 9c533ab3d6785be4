//! UI components.

pub mod system_map;
