//! Canvas painting of a [`RenderFrame`].
//!
//! Drawing happens in passes for z-ordering:
//! 1. Background (screen space)
//! 2. Links, then arrowheads (world space)
//! 3. Nodes and their labels, the hovered node last so it sits on top
//! 4. Link labels in their boxes

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::frame::{LabelGeometry, LinkVisual, NodeVisual, RenderFrame, StrokeEmphasis};
use super::geometry::Point;
use super::routing::EdgePath;
use super::state::ViewTransform;
use super::theme::Theme;

/// Paint `frame` onto a `width`×`height` canvas.
pub fn render(
	frame: &RenderFrame,
	ctx: &CanvasRenderingContext2d,
	transform: &ViewTransform,
	theme: &Theme,
	width: f64,
	height: f64,
) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, width, height);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	for link in &frame.links {
		draw_link(ctx, theme, link);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	let (hovered, rest): (Vec<&NodeVisual>, Vec<&NodeVisual>) = frame
		.nodes
		.iter()
		.partition(|node| node.emphasis == StrokeEmphasis::Hovered);
	for node in rest.into_iter().chain(hovered) {
		draw_node(ctx, theme, node);
	}

	for label in &frame.labels {
		draw_link_label(ctx, theme, label);
	}

	ctx.restore();
}

fn trace_path(ctx: &CanvasRenderingContext2d, path: &EdgePath) -> bool {
	match path {
		EdgePath::Empty => return false,
		EdgePath::Straight { start, end } => {
			ctx.begin_path();
			ctx.move_to(start.x, start.y);
			ctx.line_to(end.x, end.y);
		}
		EdgePath::Curved(curve) => {
			let [c1, c2] = curve.controls;
			ctx.begin_path();
			ctx.move_to(curve.start.x, curve.start.y);
			ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, curve.end.x, curve.end.y);
		}
	}
	true
}

fn draw_link(ctx: &CanvasRenderingContext2d, theme: &Theme, link: &LinkVisual) {
	if !trace_path(ctx, &link.path) {
		return;
	}

	let color = link.color.with_alpha(link.opacity).to_css();
	ctx.set_stroke_style_str(&color);
	ctx.set_line_width(link.stroke_width);
	if link.dashed {
		let (dash, gap) = theme.edge.delayed_dash;
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
	ctx.stroke();

	let Some((start, end)) = link.path.endpoints() else {
		return;
	};
	ctx.set_fill_style_str(&color);
	let size = theme.edge.arrow_size + link.stroke_width;
	if link.arrow_at_end {
		if let Some(angle) = link.path.end_angle() {
			draw_arrowhead(ctx, end, angle, size);
		}
	}
	if link.arrow_at_start {
		if let Some(angle) = link.path.start_angle() {
			draw_arrowhead(ctx, start, angle + PI, size);
		}
	}
}

/// Filled triangle with its tip at `tip`, pointing along `angle`.
fn draw_arrowhead(ctx: &CanvasRenderingContext2d, tip: Point, angle: f64, size: f64) {
	let direction = Point::from_angle(angle);
	let back = tip - direction * size;
	let side = direction.perp() * (size * 0.5);

	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(back.x + side.x, back.y + side.y);
	ctx.line_to(back.x - side.x, back.y - side.y);
	ctx.close_path();
	ctx.fill();
}

fn draw_node(ctx: &CanvasRenderingContext2d, theme: &Theme, node: &NodeVisual) {
	let Point { x, y } = node.position;
	ctx.set_global_alpha(node.opacity);

	ctx.begin_path();
	let _ = ctx.arc(x, y, node.radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&node.fill.to_css());
	ctx.fill();

	let (stroke, width) = if node.emphasis == StrokeEmphasis::Hovered {
		(theme.node.hovered_stroke_color, theme.node.hovered_stroke_width)
	} else {
		(theme.node.stroke_color, theme.node.stroke_width)
	};
	ctx.set_stroke_style_str(&stroke.to_css());
	ctx.set_line_width(width);
	ctx.stroke();

	if !node.label.is_empty() {
		ctx.set_font(&format!("{}px sans-serif", node.font_size));
		ctx.set_text_baseline("middle");
		ctx.set_text_align("left");
		let label_x = x + node.label_offset;

		// halo keeps labels legible over links
		ctx.set_line_width(theme.label.halo_width);
		ctx.set_stroke_style_str(&theme.label.halo_color.to_css());
		let _ = ctx.stroke_text(&node.label, label_x, y);
		ctx.set_fill_style_str(&theme.label.color.to_css());
		let _ = ctx.fill_text(&node.label, label_x, y);
	}

	ctx.set_global_alpha(1.0);
}

fn draw_link_label(ctx: &CanvasRenderingContext2d, theme: &Theme, label: &LabelGeometry) {
	let style = &theme.label;
	ctx.save();
	ctx.set_global_alpha(label.opacity);
	let _ = ctx.translate(label.anchor.x, label.anchor.y);
	let _ = ctx.rotate(label.rotation_degrees.to_radians());

	ctx.set_font(&format!("{}px sans-serif", style.font_size));
	let width = ctx
		.measure_text(&label.text)
		.map(|metrics| metrics.width())
		.unwrap_or(0.0)
		.max(style.box_width - 8.0)
		+ 8.0;
	let height = style.box_height;

	ctx.set_fill_style_str(&style.box_fill.to_css());
	ctx.fill_rect(-width / 2.0, -height / 2.0, width, height);
	ctx.set_stroke_style_str(&style.box_stroke.to_css());
	ctx.set_line_width(1.0);
	ctx.stroke_rect(-width / 2.0, -height / 2.0, width, height);

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(&style.color.to_css());
	let _ = ctx.fill_text(&label.text, 0.0, 0.0);

	ctx.restore();
}
