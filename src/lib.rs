//! evidence-map: interactive system map of evidence and the forces between them.
//!
//! This crate provides a WASM canvas component that lays out evidence elements
//! with a force-directed simulation and supports hover focus, link selection,
//! node dragging, pan and zoom.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::system_map::{
	GraphError, MapConfig, RawGraph, SimulationConfig, SystemMapCanvas, SystemMapState,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("evidence-map: logging initialized");
}

/// Text content of the `<script id="...">` element, if present.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { elements: [...], connections: [...] }
fn load_graph_data() -> Result<RawGraph, GraphError> {
	let Some(text) = script_text("graph-data") else {
		warn!("evidence-map: no #graph-data element, showing an empty map");
		return Ok(RawGraph::default());
	};
	let data = RawGraph::from_json(&text)?;
	info!(
		"evidence-map: loaded {} elements, {} connections",
		data.elements.len(),
		data.connections.len()
	);
	Ok(data)
}

/// Load optional overrides from a script element with id="graph-config".
fn load_config() -> MapConfig {
	let Some(text) = script_text("graph-config") else {
		return MapConfig::default();
	};
	MapConfig::from_json(&text).unwrap_or_else(|e| {
		warn!("evidence-map: ignoring invalid graph config: {e}");
		MapConfig::default()
	})
}

/// Main application component.
/// Loads graph data from the DOM and renders the system map.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let (graph_data, error) = match load_graph_data() {
		Ok(data) => (data, None),
		Err(e) => {
			warn!("evidence-map: failed to load graph data: {e}");
			(RawGraph::default(), Some(e.to_string()))
		}
	};
	let graph_signal = Signal::derive(move || graph_data.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Evidence Map" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<SystemMapCanvas data=graph_signal config=config fullscreen=true />
			<div class="graph-overlay">
				<h1>"Evidence Map"</h1>
				<p class="subtitle">"Hover to focus. Click a connection to select it. Drag nodes, drag the background to pan, scroll to zoom."</p>
				{error.map(|message| view! { <p class="graph-error">{message}</p> })}
			</div>
		</div>
	}
}
