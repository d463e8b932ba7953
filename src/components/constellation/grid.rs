//! Uniform bucket grid for the connection pass.
//!
//! Cells are square with a side of at least the connection radius, so every
//! pair closer than the threshold lies in the same or an adjacent cell. Cells
//! also grow with the average area per particle, which keeps the bucket count
//! near the particle count however small the threshold is. Points that
//! have overshot the canvas are clamped into the border cells, which never
//! separates two points that would otherwise be neighbors.

use super::field::Particle;

pub struct NeighborGrid {
	cell: f64,
	cols: usize,
	rows: usize,
	/// Particle indices per cell, row-major. Indices within a cell ascend.
	buckets: Vec<Vec<usize>>,
}

impl NeighborGrid {
	/// Buckets `particles` for a squared-distance threshold. Returns `None`
	/// when the threshold admits no pair at all.
	pub fn build(particles: &[Particle], width: f64, height: f64, threshold: f64) -> Option<Self> {
		if threshold.is_nan() || threshold <= 0.0 || width <= 0.0 || height <= 0.0 {
			return None;
		}
		let per_particle = (width * height / particles.len().max(1) as f64).sqrt();
		let cell = threshold.sqrt().max(per_particle);
		let cols = ((width / cell).ceil() as usize).max(1);
		let rows = ((height / cell).ceil() as usize).max(1);
		let mut grid = Self {
			cell,
			cols,
			rows,
			buckets: vec![Vec::new(); cols * rows],
		};
		for (i, p) in particles.iter().enumerate() {
			let (c, r) = grid.cell_of(p.x, p.y);
			grid.buckets[r * cols + c].push(i);
		}
		Some(grid)
	}

	fn cell_of(&self, x: f64, y: f64) -> (usize, usize) {
		let c = (x / self.cell).floor().clamp(0.0, (self.cols - 1) as f64) as usize;
		let r = (y / self.cell).floor().clamp(0.0, (self.rows - 1) as f64) as usize;
		(c, r)
	}

	/// Calls `visit(a, b)` once for every unordered pair of distinct particles
	/// sharing a cell or sitting in adjacent cells, with `a < b`.
	pub fn candidate_pairs(&self, mut visit: impl FnMut(usize, usize)) {
		for r in 0..self.rows {
			for c in 0..self.cols {
				let here = &self.buckets[r * self.cols + c];
				if here.is_empty() {
					continue;
				}
				for dr in -1isize..=1 {
					for dc in -1isize..=1 {
						let (nr, nc) = (r as isize + dr, c as isize + dc);
						if nr < 0 || nc < 0 || nr >= self.rows as isize || nc >= self.cols as isize {
							continue;
						}
						let there = &self.buckets[nr as usize * self.cols + nc as usize];
						for &a in here {
							for &b in there {
								if a < b {
									visit(a, b);
								}
							}
						}
					}
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn at(x: f64, y: f64) -> Particle {
		Particle {
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			base_size: 1.0,
			size: 1.0,
			phase: 0.0,
		}
	}

	fn pairs(grid: &NeighborGrid) -> Vec<(usize, usize)> {
		let mut out = Vec::new();
		grid.candidate_pairs(|a, b| out.push((a, b)));
		out.sort_unstable();
		out
	}

	#[test]
	fn no_grid_without_threshold() {
		assert!(NeighborGrid::build(&[at(0.0, 0.0)], 0.0, 100.0, 0.0).is_none());
		assert!(NeighborGrid::build(&[at(0.0, 0.0)], 100.0, 100.0, f64::NAN).is_none());
	}

	#[test]
	fn pairs_are_unique_and_ordered() {
		let particles = [at(5.0, 5.0), at(6.0, 6.0), at(15.0, 5.0), at(95.0, 95.0)];
		let grid = NeighborGrid::build(&particles, 100.0, 100.0, 100.0).unwrap();
		let found = pairs(&grid);
		assert_eq!(found, vec![(0, 1), (0, 2), (1, 2)]);
	}

	#[test]
	fn tiny_threshold_keeps_bucket_count_near_particle_count() {
		let particles: Vec<Particle> = (0..400)
			.map(|i| at((i % 20) as f64 * 50.0, (i / 20) as f64 * 50.0))
			.collect();
		let grid = NeighborGrid::build(&particles, 1000.0, 1000.0, 0.25).unwrap();
		assert_eq!(grid.cols * grid.rows, 400);
		assert!(pairs(&grid).len() < 400 * 9);
	}

	#[test]
	fn overshooting_points_land_in_border_cells() {
		let particles = [at(-0.4, 50.0), at(3.0, 50.0), at(100.4, 50.0), at(97.0, 50.0)];
		let grid = NeighborGrid::build(&particles, 100.0, 100.0, 100.0).unwrap();
		let found = pairs(&grid);
		assert!(found.contains(&(0, 1)));
		assert!(found.contains(&(2, 3)));
		assert!(!found.contains(&(0, 2)));
	}
}
