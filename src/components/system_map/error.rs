//! Errors raised while reading raw graph data.

/// Reasons a raw graph document is rejected before any graph is built.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
	/// The text could not be parsed as JSON at all.
	#[error("graph data is not valid JSON: {0}")]
	InvalidJson(#[source] serde_json::Error),
	/// The top-level JSON value is not an object.
	#[error("graph data must be a JSON object with `elements` and `connections` arrays")]
	NotAnObject,
	/// A required top-level array is absent (or `null`).
	#[error("graph data is missing the `{field}` array")]
	MissingField { field: &'static str },
	/// A required top-level field is present but is not an array.
	#[error("graph data field `{field}` must be an array, found {found}")]
	NotAnArray {
		field: &'static str,
		found: &'static str,
	},
	/// One entry of `elements` or `connections` does not match the contract.
	#[error("{field}[{index}] is malformed: {source}")]
	InvalidEntry {
		field: &'static str,
		index: usize,
		#[source]
		source: serde_json::Error,
	},
}

/// Shorthand result type for graph loading.
pub type Result<T> = std::result::Result<T, GraphError>;
