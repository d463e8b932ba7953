//! Browser wiring for the particle field.
//!
//! [`Constellation`] binds a field to a canvas: it sizes the canvas, drives
//! the field from `requestAnimationFrame`, and rebuilds it on window resize.
//! [`ConstellationCanvas`] is the Leptos component that renders a canvas and
//! mounts a `Constellation` onto it.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::animator::{Animator, BrowserScheduler};
use super::field::ParticleField;
use super::style::FieldStyle;

/// How a mounted canvas picks its size.
#[derive(Clone, Copy, Debug)]
pub enum Sizing {
	/// Fill the window and follow it on resize.
	Viewport,
	/// Explicit size; missing axes fall back to the parent element, then to
	/// 800x600.
	Fixed {
		/// Width in px.
		width: Option<f64>,
		/// Height in px.
		height: Option<f64>,
	},
}

impl Sizing {
	fn measure(self, window: &Window, canvas: &HtmlCanvasElement) -> Option<(f64, f64)> {
		match self {
			Sizing::Viewport => viewport_size(window),
			Sizing::Fixed { width, height } => Some((
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)),
		}
	}
}

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Rebuilds the field whenever the window is resized. Unregisters on drop.
struct ResizeListener {
	window: Window,
	callback: Closure<dyn FnMut()>,
}

impl ResizeListener {
	fn install(
		window: &Window,
		canvas: HtmlCanvasElement,
		field: Rc<RefCell<ParticleField>>,
	) -> Option<Self> {
		let win = window.clone();
		let callback: Closure<dyn FnMut()> = Closure::new(move || {
			let Some((w, h)) = viewport_size(&win) else {
				return;
			};
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);
			let mut field = field.borrow_mut();
			field.on_resize(w, h);
			debug!(
				"constellation: resized to {}x{}, {} particles",
				w,
				h,
				field.particles().len()
			);
		});
		window
			.add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
			.ok()?;
		Some(Self {
			window: window.clone(),
			callback,
		})
	}
}

impl Drop for ResizeListener {
	fn drop(&mut self) {
		let _ = self
			.window
			.remove_event_listener_with_callback("resize", self.callback.as_ref().unchecked_ref());
	}
}

/// A running particle field bound to a canvas.
///
/// Dropping it stops the animation and detaches the resize listener.
pub struct Constellation {
	field: Rc<RefCell<ParticleField>>,
	animator: Animator<BrowserScheduler>,
	_resize: Option<ResizeListener>,
}

impl Constellation {
	/// Sizes `canvas`, fills it with a field and starts animating.
	///
	/// Returns `None` when there is no window or the canvas has no 2D context.
	pub fn mount(canvas: HtmlCanvasElement, style: FieldStyle, sizing: Sizing) -> Option<Self> {
		let window = web_sys::window()?;
		let (w, h) = sizing.measure(&window, &canvas)?;
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			debug!("constellation: canvas has no 2d context");
			return None;
		};

		let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
		let field = Rc::new(RefCell::new(ParticleField::with_seed(style, w, h, seed)));
		info!(
			"constellation: {} particles on {}x{}",
			field.borrow().particles().len(),
			w,
			h
		);

		let frame_field = field.clone();
		let Some(scheduler) = BrowserScheduler::new() else {
			debug!("constellation: no animation frame scheduler");
			return None;
		};
		let animator = Animator::new(scheduler, move || {
			frame_field.borrow_mut().tick(&ctx);
		});

		let resize = match sizing {
			Sizing::Viewport => ResizeListener::install(&window, canvas, field.clone()),
			Sizing::Fixed { .. } => None,
		};

		animator.start();
		Some(Self {
			field,
			animator,
			_resize: resize,
		})
	}

	/// Resumes the animation loop.
	pub fn start(&self) {
		self.animator.start();
	}

	/// Pauses the animation loop.
	pub fn stop(&self) {
		self.animator.stop();
	}

	/// Whether the animation loop is running.
	pub fn is_running(&self) -> bool {
		self.animator.is_running()
	}

	/// Swaps the style; the field is rebuilt with it immediately.
	pub fn set_style(&self, style: FieldStyle) {
		self.field.borrow_mut().set_style(style);
	}

	/// Leaves the animation running for the lifetime of the page.
	pub fn run_forever(self) {
		std::mem::forget(self);
	}
}

impl Drop for Constellation {
	fn drop(&mut self) {
		debug!(
			"constellation: torn down after {} frames",
			self.animator.frames()
		);
	}
}

/// Renders a canvas with an animated particle constellation.
///
/// By default the canvas fills the viewport and follows window resizes. Set
/// `fullscreen = false` to size it from `width`/`height` or its parent
/// instead. Without an explicit `style`, the page's inline style document is
/// used if present.
#[component]
pub fn ConstellationCanvas(
	/// Fill the viewport and follow window resizes.
	#[prop(default = true)]
	fullscreen: bool,
	/// Width in px when not fullscreen.
	#[prop(default = None)]
	width: Option<f64>,
	/// Height in px when not fullscreen.
	#[prop(default = None)]
	height: Option<f64>,
	/// Style to use instead of the page's inline style document.
	#[prop(optional)]
	style: Option<FieldStyle>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let host: Rc<RefCell<Option<Constellation>>> = Rc::new(RefCell::new(None));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let sizing = if fullscreen {
			Sizing::Viewport
		} else {
			Sizing::Fixed { width, height }
		};
		let style = style.clone().unwrap_or_else(crate::load_style);
		host.borrow_mut().take();
		*host.borrow_mut() = Constellation::mount(canvas, style, sizing);
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="constellation-canvas"
			style="display: block; pointer-events: none;"
		/>
	}
}
