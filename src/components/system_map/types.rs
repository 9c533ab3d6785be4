//! Raw graph data as delivered by the external data source.
//!
//! The shape follows the Kumu export format: a list of `elements` and a list of
//! `connections`, each carrying a free-form `attributes` object. Only the
//! fields the map actually uses are modelled; unknown attributes are ignored.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{GraphError, Result};

/// A raw element (future node). Elements without connections never become nodes.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawElement {
	/// Unique identifier. Kumu exports call this `_id`.
	#[serde(alias = "_id")]
	pub id: String,
	#[serde(default)]
	pub attributes: ElementAttributes,
}

/// Free-form element attributes.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ElementAttributes {
	pub label: Option<String>,
	/// Category tag, e.g. `"Core Story"`. Unknown values fall back to the default style.
	#[serde(rename = "element type")]
	pub element_type: Option<String>,
	pub description: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
}

/// A raw connection (future link) between two element ids.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawConnection {
	/// Optional identifier; a positional id is synthesized when absent.
	#[serde(default, alias = "_id")]
	pub id: Option<String>,
	pub from: String,
	pub to: String,
	#[serde(default)]
	pub attributes: ConnectionAttributes,
	/// `"directed"`, `"undirected"` or `"mutual"`.
	#[serde(default)]
	pub direction: Option<String>,
	#[serde(default)]
	pub delayed: bool,
	#[serde(default)]
	pub reversed: bool,
}

/// Free-form connection attributes.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ConnectionAttributes {
	/// Polarity tag such as `"++"` or `"-"`.
	#[serde(rename = "connection type")]
	pub connection_type: Option<String>,
	pub label: Option<String>,
	/// Bend of the drawn connection, in `[-40, 40]` (clamped when used).
	pub curvature: Option<f64>,
	#[serde(default)]
	pub tags: Vec<String>,
}

/// Complete raw graph document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawGraph {
	pub elements: Vec<RawElement>,
	pub connections: Vec<RawConnection>,
}

impl RawGraph {
	/// Parse a JSON document, failing fast when either top-level array is
	/// missing or malformed.
	pub fn from_json(text: &str) -> Result<Self> {
		let value: Value = serde_json::from_str(text).map_err(GraphError::InvalidJson)?;
		Self::from_value(value)
	}

	/// Same as [`RawGraph::from_json`] for an already parsed value.
	pub fn from_value(value: Value) -> Result<Self> {
		let Value::Object(mut root) = value else {
			return Err(GraphError::NotAnObject);
		};

		let elements = take_array(&mut root, "elements")?;
		let connections = take_array(&mut root, "connections")?;

		Ok(Self {
			elements: parse_entries(elements, "elements")?,
			connections: parse_entries(connections, "connections")?,
		})
	}
}

fn take_array(root: &mut Map<String, Value>, field: &'static str) -> Result<Vec<Value>> {
	match root.remove(field) {
		None | Some(Value::Null) => Err(GraphError::MissingField { field }),
		Some(Value::Array(items)) => Ok(items),
		Some(other) => Err(GraphError::NotAnArray {
			field,
			found: json_kind(&other),
		}),
	}
}

fn parse_entries<T: DeserializeOwned>(items: Vec<Value>, field: &'static str) -> Result<Vec<T>> {
	items
		.into_iter()
		.enumerate()
		.map(|(index, item)| {
			serde_json::from_value(item).map_err(|source| GraphError::InvalidEntry {
				field,
				index,
				source,
			})
		})
		.collect()
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
