//! Element and connection categories and their visual mapping.
//!
//! Categories are closed enums with an explicit fallback variant, so every
//! tag found in the data maps to a style.

use super::theme::Color;

/// Category of an element, taken from its `"element type"` attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementCategory {
	CoreStory,
	AuthoritarianismPopulism,
	Democracy,
	InformationConfusion,
	Journalism,
	MediaGrowth,
	/// Missing or unrecognized element type.
	#[default]
	Other,
}

/// Visual attributes derived from an [`ElementCategory`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryStyle {
	pub fill: Color,
	/// Visual radius in world units, always positive.
	pub radius: f64,
	/// Node label font size in world units.
	pub font_size: f64,
	/// Horizontal distance from the node center to the label start.
	pub label_offset: f64,
}

const CORE_STYLE: CategoryStyle = CategoryStyle {
	fill: Color::rgb(0xff, 0x00, 0x64),
	radius: 15.0,
	font_size: 12.0,
	label_offset: 20.0,
};

const fn regular(fill: Color) -> CategoryStyle {
	CategoryStyle {
		fill,
		radius: 10.0,
		font_size: 10.0,
		label_offset: 15.0,
	}
}

/// Style table indexed by [`ElementCategory::index`].
const CATEGORY_STYLES: [CategoryStyle; ElementCategory::ALL.len()] = [
	CORE_STYLE,
	regular(Color::rgb(0x37, 0x37, 0x37)),
	regular(Color::rgb(0x14, 0x3c, 0xff)),
	regular(Color::rgb(0x50, 0xf5, 0xc8)),
	regular(Color::rgb(0xdc, 0xf5, 0x00)),
	regular(Color::rgb(0xe1, 0xe1, 0xe1)),
	regular(Color::rgb(0xde, 0xde, 0xde)),
];

impl ElementCategory {
	/// Every category, in table order.
	pub const ALL: [ElementCategory; 7] = [
		Self::CoreStory,
		Self::AuthoritarianismPopulism,
		Self::Democracy,
		Self::InformationConfusion,
		Self::Journalism,
		Self::MediaGrowth,
		Self::Other,
	];

	/// Map a raw `"element type"` tag to a category.
	pub fn from_tag(tag: Option<&str>) -> Self {
		match tag.map(str::trim) {
			Some("Core Story") => Self::CoreStory,
			Some("Authoritarianism/Populism") => Self::AuthoritarianismPopulism,
			Some("Democracy") => Self::Democracy,
			Some("Information Confusion") => Self::InformationConfusion,
			Some("Journalism") => Self::Journalism,
			Some("Media Growth") => Self::MediaGrowth,
			_ => Self::Other,
		}
	}

	/// Human readable tag, as used in the source data.
	pub fn tag(self) -> &'static str {
		match self {
			Self::CoreStory => "Core Story",
			Self::AuthoritarianismPopulism => "Authoritarianism/Populism",
			Self::Democracy => "Democracy",
			Self::InformationConfusion => "Information Confusion",
			Self::Journalism => "Journalism",
			Self::MediaGrowth => "Media Growth",
			Self::Other => "Other",
		}
	}

	const fn index(self) -> usize {
		self as usize
	}

	pub fn style(self) -> CategoryStyle {
		CATEGORY_STYLES[self.index()]
	}

	pub fn radius(self) -> f64 {
		self.style().radius
	}

	pub fn fill(self) -> Color {
		self.style().fill
	}
}

/// Polarity of a connection, taken from its `"connection type"` attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionCategory {
	/// `++`
	StrongPositive,
	/// `+`
	Positive,
	/// `-`
	Negative,
	/// `--`
	StrongNegative,
	#[default]
	Other,
}

impl ConnectionCategory {
	pub fn from_tag(tag: Option<&str>) -> Self {
		match tag.map(str::trim) {
			Some("++") => Self::StrongPositive,
			Some("+") => Self::Positive,
			Some("-") => Self::Negative,
			Some("--") => Self::StrongNegative,
			_ => Self::Other,
		}
	}

	/// Base stroke width. `++` is the only heavy connection.
	pub fn stroke_width(self) -> f64 {
		match self {
			Self::StrongPositive => 2.0,
			_ => 1.0,
		}
	}
}

/// How arrowheads are drawn on a connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkDirection {
	#[default]
	Directed,
	Undirected,
	Mutual,
}

impl LinkDirection {
	pub fn from_tag(tag: Option<&str>) -> Self {
		match tag.map(str::trim) {
			Some("undirected") => Self::Undirected,
			Some("mutual") => Self::Mutual,
			_ => Self::Directed,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_category_has_a_positive_radius() {
		for category in ElementCategory::ALL {
			assert!(category.radius() > 0.0, "{category:?}");
			assert_eq!(ElementCategory::from_tag(Some(category.tag())), category);
		}
	}

	#[test]
	fn core_story_is_larger_and_unknown_is_gray() {
		assert!(ElementCategory::CoreStory.radius() > ElementCategory::Democracy.radius());
		assert_eq!(ElementCategory::CoreStory.fill().to_css(), "#ff0064");

		let unknown = ElementCategory::from_tag(Some("Something New"));
		assert_eq!(unknown, ElementCategory::Other);
		assert_eq!(unknown.fill().to_css(), "#dedede");
		assert_eq!(ElementCategory::from_tag(None), ElementCategory::Other);
	}

	#[test]
	fn double_plus_is_heaviest_stroke() {
		let heavy = ConnectionCategory::from_tag(Some("++")).stroke_width();
		for tag in [Some("+"), Some("-"), Some("--"), Some("?"), None] {
			assert!(heavy > ConnectionCategory::from_tag(tag).stroke_width());
		}
	}

	#[test]
	fn direction_defaults_to_directed() {
		assert_eq!(LinkDirection::from_tag(None), LinkDirection::Directed);
		assert_eq!(LinkDirection::from_tag(Some("mutual")), LinkDirection::Mutual);
		assert_eq!(
			LinkDirection::from_tag(Some("undirected")),
			LinkDirection::Undirected
		);
	}
}
