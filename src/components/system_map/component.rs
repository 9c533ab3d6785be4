//! Leptos component wrapping the system map canvas.
//!
//! The component creates an HTML canvas, wires mouse and wheel events to
//! [`SystemMapState`] and paints it from a [`FrameLoop`]. When the `data`
//! signal changes the state is rebuilt in place and the loop restarted. On
//! unmount the loop is dropped and the window resize listener removed.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::config::MapConfig;
use super::render;
use super::scheduler::FrameLoop;
use super::state::SystemMapState;
use super::types::RawGraph;

/// Longest frame gap fed to the hover fade, in seconds.
const MAX_FRAME_DT: f64 = 0.1;

fn viewport_size() -> Option<(f64, f64)> {
	let window = web_sys::window()?;
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn canvas_size(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		if let Some(size) = viewport_size() {
			return size;
		}
	}
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_height() as f64)
				.filter(|h| *h > 0.0)
				.unwrap_or(600.0)
		}),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

/// Pointer position relative to the canvas.
fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders the interactive system map on a canvas element.
///
/// Pass raw graph data via the reactive `data` signal. The component sizes
/// itself to its parent container by default; `fullscreen = true` fills the
/// viewport and follows window resizes. Explicit `width`/`height` override
/// automatic sizing.
#[component]
pub fn SystemMapCanvas(
	#[prop(into)] data: Signal<RawGraph>,
	#[prop(optional)] config: MapConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<SystemMapState>>> = Rc::new(RefCell::new(None));
	let frame_loop: Rc<RefCell<Option<FrameLoop>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, loop_init, resize_init) =
		(state.clone(), frame_loop.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let raw = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(ctx) = context_2d(&canvas) else {
			warn!("evidence-map: canvas has no 2d context");
			return;
		};

		// Stop the old loop before the graph it paints is replaced.
		loop_init.borrow_mut().take();

		let existing = state_init.borrow_mut().as_mut().map(|s| s.replace_data(&raw));
		if existing.is_none() {
			let (w, h) = canvas_size(&canvas, fullscreen, width, height);
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);
			*state_init.borrow_mut() = Some(SystemMapState::new(&raw, &config, w, h));
		}

		if fullscreen && resize_init.borrow().is_none() {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			let cb = Closure::<dyn FnMut()>::new(move || {
				let Some((w, h)) = viewport_size() else {
					return;
				};
				canvas_resize.set_width(w as u32);
				canvas_resize.set_height(h as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(w, h);
				}
			});
			if let Some(window) = web_sys::window() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			*resize_init.borrow_mut() = Some(cb);
		}

		let Some(token) = state_init.borrow().as_ref().map(SystemMapState::token) else {
			return;
		};
		let state_anim = state_init.clone();
		let mut last_timestamp: Option<f64> = None;
		*loop_init.borrow_mut() = FrameLoop::start(move |timestamp| {
			if !token.is_live() || !canvas.is_connected() {
				return false;
			}
			let dt = last_timestamp
				.map_or(0.016, |last| (timestamp - last) / 1000.0)
				.clamp(0.0, MAX_FRAME_DT);
			last_timestamp = Some(timestamp);

			let Ok(mut guard) = state_anim.try_borrow_mut() else {
				return true;
			};
			let Some(ref mut s) = *guard else {
				return false;
			};
			s.advance(dt);
			render::render(&s.frame(), &ctx, &s.transform, &s.theme, s.width, s.height);
			true
		});
	});

	let handles = SendWrapper::new((state.clone(), frame_loop, resize_cb));
	on_cleanup(move || {
		let (state, frame_loop, resize_cb) = handles.take();
		frame_loop.borrow_mut().take();
		if let Some(cb) = resize_cb.borrow_mut().take() {
			if let Some(window) = web_sys::window() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		if let Ok(mut state) = state.try_borrow_mut() {
			state.take();
		}
		debug!("evidence-map: canvas unmounted");
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y, ev.button());
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_click = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_click.borrow_mut() {
			s.click(x, y);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="system-map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
