//! Tick scheduling.
//!
//! [`TickGuard`] hands out [`TickToken`]s tied to a generation counter. Bumping
//! the generation (explicitly, or by dropping the guard) makes every token
//! issued before it dead, so a callback that outlives the state it was created
//! for can tell and bail out. [`FrameLoop`] drives a callback from
//! `requestAnimationFrame` and owns such a guard.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;

/// Owner side of the generation counter.
#[derive(Debug, Default)]
pub struct TickGuard {
	generation: Rc<Cell<u64>>,
}

impl TickGuard {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn token(&self) -> TickToken {
		TickToken {
			generation: self.generation.clone(),
			issued: self.generation.get(),
		}
	}

	/// Kill every token issued so far.
	pub fn invalidate(&self) {
		self.generation.set(self.generation.get() + 1);
	}

	pub fn generation(&self) -> u64 {
		self.generation.get()
	}
}

impl Drop for TickGuard {
	fn drop(&mut self) {
		self.invalidate();
	}
}

/// Liveness handle checked by scheduled callbacks before touching state.
#[derive(Clone, Debug)]
pub struct TickToken {
	generation: Rc<Cell<u64>>,
	issued: u64,
}

impl TickToken {
	pub fn is_live(&self) -> bool {
		self.generation.get() == self.issued
	}
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// A running `requestAnimationFrame` loop.
///
/// The callback receives the frame timestamp in milliseconds and returns
/// whether the loop should continue. Dropping the loop cancels the pending
/// frame; no callback runs after that.
pub struct FrameLoop {
	guard: TickGuard,
	pending: Rc<Cell<Option<i32>>>,
	callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameLoop {
	pub fn start(mut on_frame: impl FnMut(f64) -> bool + 'static) -> Option<Self> {
		let guard = TickGuard::new();
		let token = guard.token();
		let pending = Rc::new(Cell::new(None));
		let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

		let (pending_inner, callback_inner) = (pending.clone(), Rc::downgrade(&callback));
		*callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			pending_inner.set(None);
			if !token.is_live() {
				return;
			}
			if !on_frame(timestamp) {
				debug!("evidence-map: frame loop finished");
				return;
			}
			// The loop may have been dropped by `on_frame`.
			if !token.is_live() {
				return;
			}
			if let Some(callback) = callback_inner.upgrade() {
				if let Some(ref cb) = *callback.borrow() {
					pending_inner.set(request_frame(cb));
				}
			}
		}));

		let first = callback.borrow().as_ref().and_then(request_frame);
		if first.is_none() {
			warn!("evidence-map: requestAnimationFrame is unavailable");
			return None;
		}
		pending.set(first);

		Some(Self {
			guard,
			pending,
			callback,
		})
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		self.guard.invalidate();
		if let Some(handle) = self.pending.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(handle);
			}
		}
		self.callback.borrow_mut().take();
	}
}

fn request_frame(callback: &FrameCallback) -> Option<i32> {
	web_sys::window()?
		.request_animation_frame(callback.as_ref().unchecked_ref())
		.ok()
}
