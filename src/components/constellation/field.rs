//! The particle field: a set of drifting, pulsing particles joined by lines
//! when they come close to each other.
//!
//! The field owns its particles and its random source. It knows nothing about
//! the browser; it draws through a [`Surface`] and is advanced by whoever
//! owns it, one frame at a time.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::grid::NeighborGrid;
use super::render::{self, Surface};
use super::style::FieldStyle;

/// Upper bound (exclusive) of a particle's starting phase.
const PHASE_SPREAD: f64 = 6.2;

/// A single floating particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	/// Horizontal step per frame.
	pub vx: f64,
	/// Vertical step per frame.
	pub vy: f64,
	/// Radius picked at spawn time.
	pub base_size: f64,
	/// Radius drawn this frame.
	pub size: f64,
	/// Pulse phase in radians.
	pub phase: f64,
}

impl Particle {
	fn spawn(rng: &mut SmallRng, style: &FieldStyle, width: f64, height: f64) -> Self {
		let size = uniform(rng, style.size_min, style.size_max);
		let inset = size * 2.0;
		Self {
			x: uniform(rng, inset, width - inset),
			y: uniform(rng, inset, height - inset),
			vx: uniform(rng, -style.max_speed, style.max_speed),
			vy: uniform(rng, -style.max_speed, style.max_speed),
			base_size: size,
			size,
			phase: uniform(rng, 0.0, PHASE_SPREAD),
		}
	}

	/// Bounces off the canvas edges, moves, and recomputes the pulsing radius.
	/// Direction is inverted before moving, so overshoot is at most one step.
	pub fn update(&mut self, width: f64, height: f64, style: &FieldStyle) {
		if self.x > width || self.x < 0.0 {
			self.vx = -self.vx;
		}
		if self.y > height || self.y < 0.0 {
			self.vy = -self.vy;
		}
		self.x += self.vx;
		self.y += self.vy;

		self.phase += style.phase_step;
		let floor = style.min_size.max(f64::MIN_POSITIVE);
		self.size = (self.base_size + style.pulse_amplitude * self.phase.sin()).max(floor);
	}
}

/// Uniform sample from `[lo, hi)`, or the midpoint when the range is empty.
fn uniform(rng: &mut SmallRng, lo: f64, hi: f64) -> f64 {
	if hi > lo {
		rng.gen_range(lo..hi)
	} else {
		(lo + hi) / 2.0
	}
}

/// Number of particles a canvas of the given size holds.
pub fn particle_count(width: f64, height: f64, density: f64) -> usize {
	if width.is_nan() || height.is_nan() || width <= 0.0 || height <= 0.0 || density <= 0.0 {
		return 0;
	}
	(width * height / density).floor() as usize
}

/// A line to be drawn between particles `a` and `b` (`a < b`).
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
	/// Index of the first particle.
	pub a: usize,
	/// Index of the second particle.
	pub b: usize,
	/// Squared distance between the two.
	pub distance_sq: f64,
	/// `1 - distance_sq / falloff`; deliberately unclamped.
	pub opacity: f64,
}

/// Owns and animates the particles for one canvas.
pub struct ParticleField {
	particles: Vec<Particle>,
	width: f64,
	height: f64,
	style: FieldStyle,
	fill: String,
	rng: SmallRng,
}

impl ParticleField {
	/// Creates a field sized to `width` x `height`, drawing all randomness
	/// from `seed`.
	pub fn with_seed(style: FieldStyle, width: f64, height: f64, seed: u64) -> Self {
		let mut field = Self {
			particles: Vec::new(),
			width,
			height,
			fill: style.color.to_css(),
			style,
			rng: SmallRng::seed_from_u64(seed),
		};
		field.initialize(width, height);
		field
	}

	/// Discards every particle and spawns a fresh set for the given size.
	pub fn initialize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		let count = particle_count(width, height, self.style.density);
		let (rng, style) = (&mut self.rng, &self.style);
		self.particles = (0..count)
			.map(|_| Particle::spawn(rng, style, width, height))
			.collect();
	}

	/// Adopts the new canvas size and respawns every particle.
	pub fn on_resize(&mut self, width: f64, height: f64) {
		self.initialize(width, height);
	}

	/// Replaces the style and rebuilds the field with it.
	pub fn set_style(&mut self, style: FieldStyle) {
		self.fill = style.color.to_css();
		self.style = style;
		self.initialize(self.width, self.height);
	}

	/// Moves every particle one step and draws it.
	pub fn advance_frame<S: Surface + ?Sized>(&mut self, surface: &S) {
		for p in &mut self.particles {
			p.update(self.width, self.height, &self.style);
			render::draw_particle(surface, p, &self.fill);
		}
	}

	/// Strokes a line for every pair of particles closer than the threshold.
	pub fn draw_connections<S: Surface + ?Sized>(&self, surface: &S) {
		for c in self.connections() {
			render::draw_connection(
				surface,
				&self.style,
				&self.particles[c.a],
				&self.particles[c.b],
				&c,
			);
		}
	}

	/// One full frame: clear, move and draw particles, then draw connections.
	pub fn tick<S: Surface + ?Sized>(&mut self, surface: &S) {
		surface.clear_rect(0.0, 0.0, self.width, self.height);
		self.advance_frame(surface);
		self.draw_connections(surface);
	}

	/// Connections for the current positions, ordered by `(a, b)`.
	pub fn connections(&self) -> Vec<Connection> {
		if self.particles.len() >= self.style.grid_min_particles {
			self.connections_grid()
		} else {
			self.connections_all_pairs()
		}
	}

	fn connections_all_pairs(&self) -> Vec<Connection> {
		let threshold = self.threshold();
		let mut out = Vec::new();
		for a in 0..self.particles.len() {
			for b in a + 1..self.particles.len() {
				if let Some(c) = self.connection(a, b, threshold) {
					out.push(c);
				}
			}
		}
		out
	}

	fn connections_grid(&self) -> Vec<Connection> {
		let threshold = self.threshold();
		let Some(grid) = NeighborGrid::build(&self.particles, self.width, self.height, threshold)
		else {
			return Vec::new();
		};
		let mut out = Vec::new();
		grid.candidate_pairs(|a, b| {
			if let Some(c) = self.connection(a, b, threshold) {
				out.push(c);
			}
		});
		out.sort_unstable_by_key(|c| (c.a, c.b));
		out
	}

	fn connection(&self, a: usize, b: usize, threshold: f64) -> Option<Connection> {
		let (pa, pb) = (&self.particles[a], &self.particles[b]);
		let distance_sq = (pa.x - pb.x).powi(2) + (pa.y - pb.y).powi(2);
		(distance_sq < threshold).then(|| Connection {
			a,
			b,
			distance_sq,
			opacity: self.style.connection_opacity(distance_sq),
		})
	}

	fn threshold(&self) -> f64 {
		self.style.connect_threshold(self.width, self.height)
	}

	/// Current particles, in spawn order.
	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Canvas width in px.
	pub fn width(&self) -> f64 {
		self.width
	}

	/// Canvas height in px.
	pub fn height(&self) -> f64 {
		self.height
	}

	/// Active style.
	pub fn style(&self) -> &FieldStyle {
		&self.style
	}
}

#[cfg(test)]
mod tests {
	use super::super::render::recording::{Op, RecordingSurface};
	use super::*;

	fn field(width: f64, height: f64) -> ParticleField {
		ParticleField::with_seed(FieldStyle::default(), width, height, 7)
	}

	fn still(x: f64, y: f64) -> Particle {
		Particle {
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			base_size: 2.0,
			size: 2.0,
			phase: 0.0,
		}
	}

	#[test]
	fn count_follows_area() {
		assert_eq!(field(900.0, 900.0).particles().len(), 90);
		assert_eq!(particle_count(1920.0, 1080.0, 9000.0), 230);
		assert_eq!(particle_count(0.0, 1080.0, 9000.0), 0);
		assert_eq!(particle_count(-10.0, -10.0, 9000.0), 0);
		assert_eq!(particle_count(94.0, 95.0, 9000.0), 0);
	}

	#[test]
	fn resize_rebuilds_for_new_size() {
		let mut f = field(900.0, 900.0);
		let before = f.particles().to_vec();
		for (w, h) in [(1280.0, 720.0), (320.0, 480.0), (900.0, 900.0)] {
			f.on_resize(w, h);
			assert_eq!(f.particles().len(), particle_count(w, h, 9000.0));
			assert_eq!((f.width(), f.height()), (w, h));
		}
		assert_ne!(f.particles(), &before[..]);
	}

	#[test]
	fn reinitialize_keeps_count_but_not_positions() {
		let mut f = field(800.0, 600.0);
		let first = f.particles().to_vec();
		f.initialize(800.0, 600.0);
		assert_eq!(f.particles().len(), first.len());
		assert_ne!(f.particles(), &first[..]);
	}

	#[test]
	fn same_seed_same_field() {
		let a = field(640.0, 480.0);
		let b = field(640.0, 480.0);
		assert_eq!(a.particles(), b.particles());
	}

	#[test]
	fn spawn_ranges() {
		let f = field(1600.0, 1200.0);
		for p in f.particles() {
			assert!((1.0..3.0).contains(&p.base_size));
			assert_eq!(p.size, p.base_size);
			assert!(p.x >= p.base_size * 2.0 && p.x < 1600.0 - p.base_size * 2.0);
			assert!(p.y >= p.base_size * 2.0 && p.y < 1200.0 - p.base_size * 2.0);
			assert!((-0.5..0.5).contains(&p.vx));
			assert!((-0.5..0.5).contains(&p.vy));
			assert!((0.0..PHASE_SPREAD).contains(&p.phase));
		}
	}

	#[test]
	fn narrow_canvas_spawns_on_centre_line() {
		let f = field(4.0, 90000.0);
		assert_eq!(f.particles().len(), 40);
		for p in f.particles() {
			assert_eq!(p.x, 2.0);
		}
	}

	#[test]
	fn size_stays_positive_and_particles_stay_near_bounds() {
		let mut f = field(500.0, 400.0);
		let surface = RecordingSurface::default();
		for _ in 0..2000 {
			f.advance_frame(&surface);
			surface.clear();
			for p in f.particles() {
				assert!(p.size > 0.0);
				assert!(p.x >= -0.5 - 1e-9 && p.x <= 500.0 + 0.5 + 1e-9);
				assert!(p.y >= -0.5 - 1e-9 && p.y <= 400.0 + 0.5 + 1e-9);
			}
		}
	}

	#[test]
	fn pulse_below_zero_is_floored() {
		let style = FieldStyle::default();
		let mut p = Particle {
			phase: 3.0 * std::f64::consts::FRAC_PI_2 - style.phase_step,
			base_size: 1.0,
			..still(50.0, 50.0)
		};
		p.update(100.0, 100.0, &style);
		assert_eq!(p.size, style.min_size);
	}

	#[test]
	fn direction_flips_before_moving() {
		let mut f = field(100.0, 100.0);
		f.particles = vec![Particle {
			vx: 0.3,
			..still(-1.0, 50.0)
		}];
		f.advance_frame(&RecordingSurface::default());
		let p = &f.particles()[0];
		assert_eq!(p.vx, -0.3);
		assert!((p.x - -1.3).abs() < 1e-12);
		assert_eq!(p.y, 50.0);
	}

	#[test]
	fn phase_advances_each_frame() {
		let mut f = field(300.0, 300.0);
		let before: Vec<f64> = f.particles().iter().map(|p| p.phase).collect();
		f.advance_frame(&RecordingSurface::default());
		for (p, phase) in f.particles().iter().zip(before) {
			assert!((p.phase - (phase + 0.05)).abs() < 1e-12);
		}
	}

	#[test]
	fn threshold_is_exclusive() {
		let mut f = field(700.0, 700.0);
		f.particles = vec![still(0.0, 0.0), still(100.0, 0.0), still(0.0, 99.0)];
		let found = f.connections();
		assert_eq!(found.len(), 1);
		assert_eq!((found[0].a, found[0].b), (0, 2));
		assert_eq!(found[0].distance_sq, 9801.0);
		assert_eq!(found[0].opacity, 1.0 - 9801.0 / 20000.0);
	}

	#[test]
	fn coincident_particles_connect_once() {
		let mut f = field(700.0, 700.0);
		f.particles = vec![still(10.0, 10.0), still(10.0, 10.0)];
		let found = f.connections();
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].opacity, 1.0);
	}

	#[test]
	fn grid_matches_all_pairs() {
		let mut brute = ParticleField::with_seed(
			FieldStyle {
				grid_min_particles: usize::MAX,
				..FieldStyle::default()
			},
			1200.0,
			800.0,
			42,
		);
		let mut gridded = ParticleField::with_seed(
			FieldStyle {
				grid_min_particles: 0,
				..FieldStyle::default()
			},
			1200.0,
			800.0,
			42,
		);
		let surface = RecordingSurface::default();
		for _ in 0..50 {
			brute.advance_frame(&surface);
			gridded.advance_frame(&surface);
			surface.clear();
			assert_eq!(brute.connections(), gridded.connections_grid());
			assert_eq!(gridded.connections(), gridded.connections_all_pairs());
		}
	}

	#[test]
	fn grid_handles_a_tiny_threshold() {
		let style = FieldStyle {
			connect_divisor: 2000.0,
			density: 2500.0,
			grid_min_particles: 0,
			..FieldStyle::default()
		};
		let mut f = ParticleField::with_seed(style, 1000.0, 1000.0, 11);
		assert_eq!(f.particles().len(), 400);
		assert_eq!(f.threshold(), 0.25);
		f.particles[0].x = 500.0;
		f.particles[0].y = 500.0;
		f.particles[1].x = 500.2;
		f.particles[1].y = 500.2;

		let gridded = f.connections_grid();
		assert_eq!(gridded, f.connections_all_pairs());
		assert!(gridded.iter().any(|c| (c.a, c.b) == (0, 1)));
		assert_eq!(f.connections(), gridded);
	}

	#[test]
	fn tick_clears_then_draws_particles_then_lines() {
		let mut f = field(600.0, 450.0);
		let surface = RecordingSurface::default();
		f.tick(&surface);
		let ops = surface.ops();
		assert_eq!(ops[0], Op::ClearRect(0.0, 0.0, 600.0, 450.0));

		let n = f.particles().len();
		assert_eq!(surface.count(|op| matches!(op, Op::Fill)), n);
		assert_eq!(
			surface.count(|op| matches!(op, Op::Stroke)),
			f.connections().len()
		);

		let last_fill = ops.iter().rposition(|op| matches!(op, Op::Fill));
		let first_stroke = ops.iter().position(|op| matches!(op, Op::Stroke));
		if let (Some(fill), Some(stroke)) = (last_fill, first_stroke) {
			assert!(fill < stroke);
		}
	}

	#[test]
	fn lines_use_style_color_and_width() {
		let mut f = field(700.0, 700.0);
		f.particles = vec![still(0.0, 0.0), still(0.0, 50.0)];
		let surface = RecordingSurface::default();
		f.draw_connections(&surface);
		assert!(
			surface
				.ops()
				.contains(&Op::StrokeStyle("rgba(199, 112, 240, 0.875)".into()))
		);
		assert!(surface.ops().contains(&Op::LineWidth(1.0)));
	}

	#[test]
	fn set_style_rebuilds() {
		let mut f = field(900.0, 900.0);
		f.set_style(FieldStyle::ember());
		assert_eq!(f.particles().len(), particle_count(900.0, 900.0, 6000.0));
		assert_eq!(f.style(), &FieldStyle::ember());

		let surface = RecordingSurface::default();
		f.advance_frame(&surface);
		assert!(
			surface
				.ops()
				.contains(&Op::FillStyle("rgba(240, 140, 80, 1)".into()))
		);
	}
}
