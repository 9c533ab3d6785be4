//! Visual theming for the system map.
//!
//! Colors, stroke weights and opacities shared by the frame builder and the
//! canvas renderer. Category colors live in [`super::category`].

use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Link stroke and opacity style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub color: Color,
	/// Stroke color of the selected link.
	pub selected_color: Color,
	/// Opacity of links while nothing is hovered.
	pub base_opacity: f64,
	/// Opacity of links inside the hovered connected set.
	pub active_opacity: f64,
	/// Opacity of links outside the hovered connected set.
	pub dimmed_opacity: f64,
	/// Extra stroke width for a hovered or selected link.
	pub emphasis_width: f64,
	/// Arrowhead length in world units.
	pub arrow_size: f64,
	/// Dash pattern (dash, gap) used for delayed connections.
	pub delayed_dash: (f64, f64),
}

/// Node fill, stroke and label style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub stroke_color: Color,
	pub stroke_width: f64,
	pub hovered_stroke_color: Color,
	pub hovered_stroke_width: f64,
	/// Radius multiplier for the hovered node.
	pub hovered_radius_scale: f64,
	/// Opacity of nodes outside the hovered connected set.
	pub dimmed_opacity: f64,
}

/// Text style for node and link labels.
#[derive(Clone, Debug)]
pub struct LabelStyle {
	pub color: Color,
	/// Halo drawn behind node labels for readability.
	pub halo_color: Color,
	pub halo_width: f64,
	/// Link label box fill and border.
	pub box_fill: Color,
	pub box_stroke: Color,
	pub box_width: f64,
	pub box_height: f64,
	pub font_size: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: Color,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub label: LabelStyle,
}

impl Theme {
	/// White paper look of the published evidence map (default)
	pub fn light() -> Self {
		Self {
			name: "light",
			background: Color::rgb(255, 255, 255),
			edge: EdgeStyle {
				color: Color::rgb(153, 153, 153),
				selected_color: Color::rgb(0, 122, 255),
				base_opacity: 0.4,
				active_opacity: 0.8,
				dimmed_opacity: 0.1,
				emphasis_width: 1.0,
				arrow_size: 6.0,
				delayed_dash: (6.0, 4.0),
			},
			node: NodeStyle {
				stroke_color: Color::rgb(255, 255, 255),
				stroke_width: 1.5,
				hovered_stroke_color: Color::rgb(0, 0, 0),
				hovered_stroke_width: 2.0,
				hovered_radius_scale: 1.2,
				dimmed_opacity: 0.1,
			},
			label: LabelStyle {
				color: Color::rgb(0, 0, 0),
				halo_color: Color::rgb(255, 255, 255),
				halo_width: 4.0,
				box_fill: Color::rgb(255, 255, 255),
				box_stroke: Color::rgb(102, 102, 102),
				box_width: 80.0,
				box_height: 20.0,
				font_size: 12.0,
			},
		}
	}

	/// Dark variant for embedding in dark pages
	pub fn dark() -> Self {
		let light = Self::light();
		Self {
			name: "dark",
			background: Color::rgb(22, 27, 34),
			edge: EdgeStyle {
				color: Color::rgb(140, 160, 180),
				..light.edge
			},
			node: NodeStyle {
				stroke_color: Color::rgb(22, 27, 34),
				hovered_stroke_color: Color::rgb(255, 255, 255),
				..light.node
			},
			label: LabelStyle {
				color: Color::rgb(230, 235, 240),
				halo_color: Color::rgb(22, 27, 34),
				box_fill: Color::rgb(30, 35, 42),
				box_stroke: Color::rgb(140, 160, 180),
				..light.label
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}

/// Theme selection as it appears in the optional page configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
	#[default]
	Light,
	Dark,
}

impl From<ThemeName> for Theme {
	fn from(name: ThemeName) -> Self {
		match name {
			ThemeName::Light => Theme::light(),
			ThemeName::Dark => Theme::dark(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn css_output_switches_on_alpha() {
		assert_eq!(Color::rgb(255, 0, 100).to_css(), "#ff0064");
		assert_eq!(
			Color::rgb(153, 153, 153).with_alpha(0.4).to_css(),
			"rgba(153, 153, 153, 0.4)"
		);
	}

	#[test]
	fn theme_names_map_to_themes() {
		assert_eq!(Theme::from(ThemeName::default()).name, "light");
		assert_eq!(Theme::from(ThemeName::Dark).name, "dark");
	}
}
