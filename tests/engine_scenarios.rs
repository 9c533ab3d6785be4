//! End-to-end scenarios driving the map core without a browser.

#![allow(unused_crate_dependencies)]

use evidence_map::components::system_map::geometry::Point;
use evidence_map::components::system_map::interaction::{FocusState, HoverTarget};
use evidence_map::{GraphError, MapConfig, RawGraph, SimulationConfig, SystemMapState};
use serde_json::json;

fn chain() -> RawGraph {
	RawGraph::from_value(json!({
		"elements": [
			{ "id": "A", "attributes": { "label": "Polarization", "element type": "Core Story" } },
			{ "id": "B", "attributes": { "label": "Ad revenue", "element type": "Journalism" } },
			{ "id": "C", "attributes": { "label": "Trust", "element type": "Democracy" } }
		],
		"connections": [
			{ "id": "ab", "from": "A", "to": "B", "attributes": { "connection type": "++" } },
			{ "id": "bc", "from": "B", "to": "C", "attributes": { "connection type": "-" } }
		]
	}))
	.unwrap()
}

fn map() -> SystemMapState {
	SystemMapState::new(&chain(), &MapConfig::default(), 800.0, 600.0)
}

#[test]
fn hovering_the_middle_of_a_chain_activates_everything() {
	let mut state = map();
	assert!(state.hover_node("B"));

	let graph = state.graph();
	let ctl = state.interaction();
	for id in ["A", "B", "C"] {
		let index = graph.node_index(id).unwrap();
		assert!(ctl.is_connected(index), "{id}");
		assert_ne!(ctl.node_state(index), FocusState::Dimmed);
	}
	for id in ["ab", "bc"] {
		assert_eq!(ctl.link_state(graph, graph.link_index(id).unwrap()), FocusState::Active);
	}
}

#[test]
fn hovering_a_link_dims_the_rest_of_the_chain() {
	let mut state = map();
	assert!(state.hover_link("ab"));

	let graph = state.graph();
	let ctl = state.interaction();
	assert_eq!(ctl.hovered(), Some(HoverTarget::Link(graph.link_index("ab").unwrap())));
	assert_eq!(ctl.node_state(graph.node_index("C").unwrap()), FocusState::Dimmed);
	assert_eq!(ctl.link_state(graph, graph.link_index("bc").unwrap()), FocusState::Dimmed);
	assert_eq!(ctl.link_state(graph, graph.link_index("ab").unwrap()), FocusState::Active);

	state.clear_hover();
	let ctl = state.interaction();
	for index in 0..3 {
		assert_eq!(ctl.node_state(index), FocusState::Normal);
	}
}

#[test]
fn dragging_a_node_reheats_then_cools() {
	let mut state = map();
	let a = state.graph().node_index("A").unwrap();

	assert!(state.drag_start("A"));
	assert!(state.simulation().alpha() > 0.0);
	assert!(state.drag_move("A", 500.0, 500.0));
	assert_eq!(state.simulation().position(a), Some(Point::new(500.0, 500.0)));

	for _ in 0..60 {
		state.advance(0.016);
		assert_eq!(state.simulation().position(a), Some(Point::new(500.0, 500.0)));
	}
	assert!(state.simulation().alpha() > 0.1);

	assert!(state.drag_end("A"));
	assert_eq!(state.simulation().pinned(a), None);

	let mut previous = state.simulation().alpha();
	while state.advance(0.016) {
		let alpha = state.simulation().alpha();
		assert!(alpha <= previous);
		assert!(alpha >= 0.0);
		previous = alpha;
	}
	assert!(state.simulation().is_settled());
}

#[test]
fn selection_survives_hover_changes() {
	let mut state = map();
	assert!(state.select_link("bc"));
	state.hover_node("A");
	state.hover_link("ab");
	state.clear_hover();

	let selected = state.interaction().selected();
	assert_eq!(selected, state.graph().link_index("bc"));
	let frame = state.frame();
	assert_eq!(frame.link("bc").unwrap().stroke_width, 2.0);
	assert_eq!(frame.link("ab").unwrap().stroke_width, 2.0);
}

#[test]
fn identical_seeds_give_identical_maps() {
	let config = MapConfig {
		simulation: SimulationConfig {
			seed: 1234,
			..Default::default()
		},
		..Default::default()
	};
	let first = SystemMapState::new(&chain(), &config, 800.0, 600.0);
	let second = SystemMapState::new(&chain(), &config, 800.0, 600.0);
	assert_eq!(first.simulation().snapshot(), second.simulation().snapshot());

	let other = SystemMapState::new(&chain(), &MapConfig::default(), 800.0, 600.0);
	assert_ne!(
		first.simulation().snapshot().positions,
		other.simulation().snapshot().positions
	);
}

#[test]
fn rebuilding_resets_alpha_and_interaction() {
	let mut state = map();
	state.hover_node("A");
	state.select_link("ab");
	state.drag_start("B");
	let before = state.generation();

	let mut bigger = chain();
	bigger.connections.push(
		serde_json::from_value(json!({ "id": "ca", "from": "C", "to": "A" })).unwrap(),
	);
	state.replace_data(&bigger);

	assert!(state.generation() > before);
	assert_eq!(state.graph().links.len(), 3);
	assert_eq!(state.interaction().hovered(), None);
	assert_eq!(state.interaction().selected(), None);
	assert_eq!(state.interaction().dragging(), None);
	assert!(!state.drag_end("B"));
	assert_eq!(state.simulation().tick_count(), 300);
	assert!(state.simulation().pinned(0).is_none());
}

#[test]
fn malformed_documents_are_rejected_with_a_reason() {
	let missing = RawGraph::from_json(r#"{ "elements": [] }"#).unwrap_err();
	assert!(matches!(missing, GraphError::MissingField { field: "connections" }));
	assert!(missing.to_string().contains("connections"));

	let wrong = RawGraph::from_json(r#"{ "elements": {}, "connections": [] }"#).unwrap_err();
	assert!(matches!(wrong, GraphError::NotAnArray { field: "elements", .. }));

	let entry = RawGraph::from_json(r#"{ "elements": [], "connections": [ { "from": "a" } ] }"#)
		.unwrap_err();
	assert!(matches!(
		entry,
		GraphError::InvalidEntry {
			field: "connections",
			index: 0,
			..
		}
	));
}
