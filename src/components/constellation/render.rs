//! Canvas drawing for the particle field.
//!
//! The field only needs a handful of 2D-context operations. They are
//! collected in [`Surface`] so the simulation can draw into a real
//! `CanvasRenderingContext2d` in the browser and into a recorder in tests.

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use super::field::{Connection, Particle};
use super::style::FieldStyle;

/// The subset of the canvas 2D API the field draws with.
pub trait Surface {
	/// Erases a rectangle to transparent.
	fn clear_rect(&self, x: f64, y: f64, width: f64, height: f64);
	/// Starts a new path.
	fn begin_path(&self);
	/// Adds a full circle to the current path.
	fn arc(&self, x: f64, y: f64, radius: f64);
	/// Starts a subpath at a point.
	fn move_to(&self, x: f64, y: f64);
	/// Adds a straight segment to a point.
	fn line_to(&self, x: f64, y: f64);
	/// Fills the current path.
	fn fill(&self);
	/// Strokes the current path.
	fn stroke(&self);
	/// Sets the fill color from a CSS string.
	fn set_fill_style(&self, css: &str);
	/// Sets the stroke color from a CSS string.
	fn set_stroke_style(&self, css: &str);
	/// Sets the stroke width in px.
	fn set_line_width(&self, width: f64);
}

impl Surface for CanvasRenderingContext2d {
	fn clear_rect(&self, x: f64, y: f64, width: f64, height: f64) {
		CanvasRenderingContext2d::clear_rect(self, x, y, width, height);
	}

	fn begin_path(&self) {
		CanvasRenderingContext2d::begin_path(self);
	}

	fn arc(&self, x: f64, y: f64, radius: f64) {
		// Only fails for a negative radius, which the field never produces.
		let _ = CanvasRenderingContext2d::arc(self, x, y, radius, 0.0, TAU);
	}

	fn move_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::move_to(self, x, y);
	}

	fn line_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::line_to(self, x, y);
	}

	fn fill(&self) {
		CanvasRenderingContext2d::fill(self);
	}

	fn stroke(&self) {
		CanvasRenderingContext2d::stroke(self);
	}

	fn set_fill_style(&self, css: &str) {
		self.set_fill_style_str(css);
	}

	fn set_stroke_style(&self, css: &str) {
		self.set_stroke_style_str(css);
	}

	fn set_line_width(&self, width: f64) {
		CanvasRenderingContext2d::set_line_width(self, width);
	}
}

/// Draws one particle as a filled circle at its current display size.
pub fn draw_particle<S: Surface + ?Sized>(surface: &S, particle: &Particle, fill: &str) {
	surface.begin_path();
	surface.arc(particle.x, particle.y, particle.size);
	surface.set_fill_style(fill);
	surface.fill();
}

/// Draws one connection as a line in the style color at its opacity.
pub fn draw_connection<S: Surface + ?Sized>(
	surface: &S,
	style: &FieldStyle,
	from: &Particle,
	to: &Particle,
	connection: &Connection,
) {
	surface.set_stroke_style(&style.color.to_css_with_alpha(connection.opacity));
	surface.set_line_width(style.line_width);
	surface.begin_path();
	surface.move_to(from.x, from.y);
	surface.line_to(to.x, to.y);
	surface.stroke();
}
