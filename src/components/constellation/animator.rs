//! Frame loop with explicit start/stop.
//!
//! An [`Animator`] runs a frame closure once per scheduler frame until it is
//! stopped or dropped. The scheduler is a trait so the loop can be driven by
//! `requestAnimationFrame` in the browser and stepped by hand in tests.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::Window;

/// Opaque id of a scheduled frame, used for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Something that can run a callback on the next display frame.
pub trait FrameScheduler {
	/// Arranges for `callback` to run once. Returns `None` if the frame could
	/// not be scheduled.
	fn schedule(&self, callback: Box<dyn FnOnce()>) -> Option<FrameHandle>;
	/// Drops a pending frame. Unknown or already-fired handles are ignored.
	fn cancel(&self, handle: FrameHandle);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Rc<S> {
	fn schedule(&self, callback: Box<dyn FnOnce()>) -> Option<FrameHandle> {
		(**self).schedule(callback)
	}

	fn cancel(&self, handle: FrameHandle) {
		(**self).cancel(handle)
	}
}

/// `requestAnimationFrame`-backed scheduler.
///
/// One JS closure is created up front and reused for every frame; it runs
/// whatever callback is pending at the time it fires.
pub struct BrowserScheduler {
	window: Window,
	pending: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
	trampoline: Closure<dyn FnMut()>,
}

impl BrowserScheduler {
	/// Scheduler bound to the current window. `None` outside a browser.
	pub fn new() -> Option<Self> {
		let window = web_sys::window()?;
		let pending: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::default();
		let slot = pending.clone();
		let trampoline = Closure::new(move || {
			let callback = slot.borrow_mut().take();
			if let Some(callback) = callback {
				callback();
			}
		});
		Some(Self {
			window,
			pending,
			trampoline,
		})
	}
}

impl FrameScheduler for BrowserScheduler {
	fn schedule(&self, callback: Box<dyn FnOnce()>) -> Option<FrameHandle> {
		*self.pending.borrow_mut() = Some(callback);
		self.window
			.request_animation_frame(self.trampoline.as_ref().unchecked_ref())
			.ok()
			.map(FrameHandle)
	}

	fn cancel(&self, handle: FrameHandle) {
		self.pending.borrow_mut().take();
		let _ = self.window.cancel_animation_frame(handle.0);
	}
}

struct Shared<S> {
	scheduler: S,
	frame: RefCell<Box<dyn FnMut()>>,
	running: Cell<bool>,
	pending: Cell<Option<FrameHandle>>,
	frames: Cell<u64>,
}

/// Runs a frame closure on every scheduler frame while started.
pub struct Animator<S: FrameScheduler + 'static> {
	shared: Rc<Shared<S>>,
}

impl<S: FrameScheduler + 'static> Animator<S> {
	/// Wraps `frame` in a stopped loop driven by `scheduler`.
	pub fn new(scheduler: S, frame: impl FnMut() + 'static) -> Self {
		Self {
			shared: Rc::new(Shared {
				scheduler,
				frame: RefCell::new(Box::new(frame)),
				running: Cell::new(false),
				pending: Cell::new(None),
				frames: Cell::new(0),
			}),
		}
	}

	/// Starts the loop. Does nothing if it is already running.
	pub fn start(&self) {
		if self.shared.running.replace(true) {
			return;
		}
		Self::schedule_next(&self.shared);
	}

	/// Stops the loop and cancels the pending frame, if any.
	pub fn stop(&self) {
		self.shared.running.set(false);
		if let Some(handle) = self.shared.pending.take() {
			self.shared.scheduler.cancel(handle);
		}
	}

	/// Whether the loop is started.
	pub fn is_running(&self) -> bool {
		self.shared.running.get()
	}

	/// Number of frames run since creation.
	pub fn frames(&self) -> u64 {
		self.shared.frames.get()
	}

	fn schedule_next(shared: &Rc<Shared<S>>) {
		let weak: Weak<Shared<S>> = Rc::downgrade(shared);
		let handle = shared.scheduler.schedule(Box::new(move || {
			if let Some(shared) = weak.upgrade() {
				Self::run_frame(&shared);
			}
		}));
		shared.pending.set(handle);
		if handle.is_none() {
			shared.running.set(false);
		}
	}

	fn run_frame(shared: &Rc<Shared<S>>) {
		shared.pending.set(None);
		if !shared.running.get() {
			return;
		}
		(&mut *shared.frame.borrow_mut())();
		shared.frames.set(shared.frames.get() + 1);
		if shared.running.get() {
			Self::schedule_next(shared);
		}
	}
}

impl<S: FrameScheduler + 'static> Drop for Animator<S> {
	fn drop(&mut self) {
		self.stop();
	}
}
