//! constellation-bg: animated particle constellation backgrounds for web pages.
//!
//! This crate provides a WASM canvas background of drifting, pulsing particles
//! joined by fading lines, either as a Leptos component or attached to an
//! existing `<canvas>` in the page.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlScriptElement, Window};

pub mod components;

pub use components::constellation::{
	Constellation, ConstellationCanvas, FieldStyle, ParticleField, Sizing,
};

/// Id of the canvas the binary entry point looks for.
pub const DEFAULT_CANVAS_ID: &str = "constellation-bg";

/// Id of the optional inline script holding a JSON style document.
pub const STYLE_ELEMENT_ID: &str = "constellation-style";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("constellation: logging initialized");
}

/// Load the field style from a script element with id="constellation-style".
/// Falls back to the default style when the element is missing or invalid.
pub fn load_style() -> FieldStyle {
	let Some(json_text) = style_document() else {
		return FieldStyle::default();
	};

	match components::constellation::parse_style(&json_text) {
		Ok(style) => {
			info!("constellation: loaded style from #{}", STYLE_ELEMENT_ID);
			style
		}
		Err(e) => {
			warn!("constellation: failed to parse style: {}", e);
			FieldStyle::default()
		}
	}
}

fn style_document() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(STYLE_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Starts a full-viewport constellation on an existing canvas element.
///
/// Returns `None`, leaving the page untouched, when no canvas with that id
/// exists.
pub fn attach(canvas_id: &str) -> Option<Constellation> {
	let document = web_sys::window()?.document()?;
	let Some(element) = document.get_element_by_id(canvas_id) else {
		debug!("constellation: no #{} element, background disabled", canvas_id);
		return None;
	};
	let Ok(canvas) = element.dyn_into::<HtmlCanvasElement>() else {
		debug!("constellation: #{} is not a canvas, background disabled", canvas_id);
		return None;
	};
	Constellation::mount(canvas, load_style(), Sizing::Viewport)
}

/// Main application component.
/// Renders a full-viewport constellation behind a short heading.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Constellation" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-background">
			<ConstellationCanvas fullscreen=true />
			<div class="background-overlay">
				<h1>"Constellation"</h1>
				<p class="subtitle">"Resize the window to regenerate the field."</p>
			</div>
		</div>
	}
}
