//! Visual and behavioral tuning for the particle field.
//!
//! Every constant the field uses lives here so presets can be swapped and
//! pages can override individual values from inline JSON.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `[0, 1]`; defaults to opaque.
	#[serde(default = "opaque")]
	pub a: f64,
}

fn opaque() -> f64 {
	1.0
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with an explicit alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// `rgba(..)` string with the color's own alpha.
	pub fn to_css(self) -> String {
		self.to_css_with_alpha(self.a)
	}

	/// Same channels with an explicit alpha. The alpha is written as-is, so
	/// out-of-range values are left for the canvas to clamp.
	pub fn to_css_with_alpha(self, alpha: f64) -> String {
		format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
	}
}

/// Complete tuning for a [`ParticleField`](super::field::ParticleField).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldStyle {
	/// Canvas area (px²) per particle.
	pub density: f64,
	/// Lower bound of the random base radius (inclusive).
	pub size_min: f64,
	/// Upper bound of the random base radius (exclusive).
	pub size_max: f64,
	/// Per-axis velocity is drawn from `[-max_speed, max_speed)`.
	pub max_speed: f64,
	/// Phase increment per frame, in radians.
	pub phase_step: f64,
	/// How far the displayed radius swings around the base radius.
	pub pulse_amplitude: f64,
	/// Displayed radius never drops below this.
	pub min_size: f64,
	/// Connection threshold is `(width / d) * (height / d)` in squared px.
	pub connect_divisor: f64,
	/// Squared distance at which a connection line reaches zero opacity.
	pub opacity_falloff: f64,
	/// Stroke width of connection lines, in px.
	pub line_width: f64,
	/// Shared color of particles and lines.
	pub color: Color,
	/// Particle count from which connections are found with a neighbor grid
	/// instead of testing every pair.
	pub grid_min_particles: usize,
}

impl FieldStyle {
	/// Pulsing violet constellation (default).
	pub fn heartbeat() -> Self {
		Self {
			density: 9000.0,
			size_min: 1.0,
			size_max: 3.0,
			max_speed: 0.5,
			phase_step: 0.05,
			pulse_amplitude: 1.5,
			min_size: 0.1,
			connect_divisor: 7.0,
			opacity_falloff: 20000.0,
			line_width: 1.0,
			color: Color::rgb(199, 112, 240),
			grid_min_particles: 400,
		}
	}

	/// Sparse, slow, pale blue.
	pub fn frost() -> Self {
		Self {
			density: 14000.0,
			max_speed: 0.3,
			phase_step: 0.03,
			pulse_amplitude: 0.8,
			color: Color::rgb(150, 200, 235),
			..Self::heartbeat()
		}
	}

	/// Dense and restless, warm orange.
	pub fn ember() -> Self {
		Self {
			density: 6000.0,
			size_max: 2.5,
			max_speed: 0.8,
			phase_step: 0.08,
			connect_divisor: 9.0,
			color: Color::rgb(240, 140, 80),
			..Self::heartbeat()
		}
	}

	/// Looks up a preset by name.
	pub fn preset(name: &str) -> Option<Self> {
		match name {
			"heartbeat" => Some(Self::heartbeat()),
			"frost" => Some(Self::frost()),
			"ember" => Some(Self::ember()),
			_ => None,
		}
	}

	/// Squared-distance threshold below which two particles are connected.
	pub fn connect_threshold(&self, width: f64, height: f64) -> f64 {
		(width / self.connect_divisor) * (height / self.connect_divisor)
	}

	/// Opacity of a connection line for a given squared distance.
	pub fn connection_opacity(&self, distance_sq: f64) -> f64 {
		1.0 - distance_sq / self.opacity_falloff
	}
}

impl Default for FieldStyle {
	fn default() -> Self {
		Self::heartbeat()
	}
}

/// Parses a style document.
///
/// The document is a JSON object with any subset of the [`FieldStyle`]
/// fields. An optional `"preset"` key picks the base the other keys
/// override; without it the base is [`FieldStyle::heartbeat`].
pub fn parse_style(json: &str) -> Result<FieldStyle, serde_json::Error> {
	let mut doc: Value = serde_json::from_str(json)?;
	let Some(overrides) = doc.as_object_mut() else {
		return serde_json::from_value(doc);
	};
	let base = match overrides.remove("preset") {
		Some(Value::String(name)) => FieldStyle::preset(&name)
			.ok_or_else(|| serde_json::Error::custom(format!("unknown preset `{name}`")))?,
		Some(other) => {
			return Err(serde_json::Error::custom(format!(
				"preset must be a string, got {other}"
			)));
		}
		None => FieldStyle::default(),
	};

	let mut merged = serde_json::to_value(base)?;
	if let Some(fields) = merged.as_object_mut() {
		for (key, value) in overrides.iter() {
			fields.insert(key.clone(), value.clone());
		}
	}
	serde_json::from_value(merged)
}
