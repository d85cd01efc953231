//! Diffusion-reaction update.
//!
//! Every cell's next state depends only on the front grid, so a pass
//! writes the back grid row-parallel with no coordination between rows.

use crate::grid::{Cell, Grid};
use crate::params::SimulationParameters;
use rayon::prelude::*;

// 9-point Laplacian stencil weights (sum to 0).
pub const W_CENTER: f32 = -1.0;
pub const W_ORTHO: f32 = 0.2;
pub const W_DIAG: f32 = 0.05;

/// Mask values above this raise the local kill rate.
const MASK_THRESHOLD: f32 = 0.5;

/// A cell and its 8 Moore neighbors, indexed `[dy + 1][dx + 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighborhood {
    pub cells: [[Cell; 3]; 3],
}

impl Neighborhood {
    /// Sample around `(x, y)`; out-of-bounds lookups clamp to the border.
    #[inline]
    pub fn gather(grid: &Grid, x: usize, y: usize) -> Self {
        let (xc, yc) = (x as isize, y as isize);
        let mut cells = [[Cell::EMPTY; 3]; 3];
        for (dy, row) in cells.iter_mut().enumerate() {
            for (dx, cell) in row.iter_mut().enumerate() {
                *cell = grid.get_clamped(xc + dx as isize - 1, yc + dy as isize - 1);
            }
        }
        Self { cells }
    }

    /// Uniform neighborhood, handy for probing the update rule.
    pub fn uniform(cell: Cell) -> Self {
        Self {
            cells: [[cell; 3]; 3],
        }
    }

    #[inline]
    pub fn center(&self) -> Cell {
        self.cells[1][1]
    }

    /// Discrete Laplacian of (A, B).
    ///
    /// Summed as weighted differences from the center, which equals the
    /// weighted stencil because the weights sum to zero, and yields an
    /// exact 0.0 on flat regions.
    #[inline]
    pub fn laplacian(&self) -> (f32, f32) {
        let c = self.center();
        let n = &self.cells;

        let ortho = [n[0][1], n[1][0], n[1][2], n[2][1]];
        let diag = [n[0][0], n[0][2], n[2][0], n[2][2]];

        let mut ortho_a = 0.0;
        let mut ortho_b = 0.0;
        for o in ortho {
            ortho_a += o.a - c.a;
            ortho_b += o.b - c.b;
        }
        let mut diag_a = 0.0;
        let mut diag_b = 0.0;
        for d in diag {
            diag_a += d.a - c.a;
            diag_b += d.b - c.b;
        }

        (
            W_ORTHO * ortho_a + W_DIAG * diag_a,
            W_ORTHO * ortho_b + W_DIAG * diag_b,
        )
    }
}

/// Laplacian of (A, B) at `(x, y)` in `grid`.
pub fn laplacian(grid: &Grid, x: usize, y: usize) -> (f32, f32) {
    Neighborhood::gather(grid, x, y).laplacian()
}

/// Kill-rate multiplier for a mask value.
#[inline]
pub fn kill_multiplier(m: f32) -> f32 {
    if m > MASK_THRESHOLD {
        0.5 + m
    } else {
        1.0
    }
}

/// Clamp into [0, 1]; NaN from degenerate parameters collapses to 0.
#[inline]
fn clamp01(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Next state of the center cell of `hood`. M passes through untouched.
#[inline]
pub fn update_cell(hood: &Neighborhood, params: &SimulationParameters) -> Cell {
    let Cell { a, b, m } = hood.center();
    let (lap_a, lap_b) = hood.laplacian();
    let reaction = a * b * b;
    let kill = params.kill_rate * kill_multiplier(m);
    let feed = params.feed_rate;

    let next_a = a + params.effective_diffusion_a() * lap_a - reaction + feed * (1.0 - a);
    let next_b = b + params.effective_diffusion_b() * lap_b + reaction - (kill + feed) * b;

    Cell {
        a: clamp01(next_a),
        b: clamp01(next_b),
        m,
    }
}

/// One full kernel pass: read `front`, write every cell of `back`.
pub fn pass(front: &Grid, back: &mut Grid, params: &SimulationParameters) {
    debug_assert_eq!(front.dimensions(), back.dimensions());
    let w = front.width();

    back.cells_mut()
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                *out = update_cell(&Neighborhood::gather(front, x, y), params);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_grid(w: usize, h: usize, seed: u64) -> Grid {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut g = Grid::clear(w, h).unwrap();
        for c in g.cells_mut() {
            *c = Cell::new(rng.gen(), rng.gen(), rng.gen());
        }
        g
    }

    #[test]
    fn stencil_weights_sum_to_zero() {
        assert_abs_diff_eq!(W_CENTER + 4.0 * W_ORTHO + 4.0 * W_DIAG, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn uniform_field_has_exactly_zero_laplacian() {
        for v in [0.0, 0.1, 0.37, 0.5, 0.999, 1.0] {
            let g = Grid::filled(7, 5, Cell::new(v, 1.0 - v, 0.0)).unwrap();
            for y in 0..5 {
                for x in 0..7 {
                    assert_eq!(laplacian(&g, x, y), (0.0, 0.0), "v={v} at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn laplacian_matches_weighted_stencil() {
        let g = random_grid(6, 6, 7);
        let (x, y) = (3, 2);
        let v = |dx: isize, dy: isize| g.get_clamped(x as isize + dx, y as isize + dy);
        let expect_a = W_CENTER * v(0, 0).a
            + W_ORTHO * (v(1, 0).a + v(-1, 0).a + v(0, 1).a + v(0, -1).a)
            + W_DIAG * (v(1, 1).a + v(-1, -1).a + v(1, -1).a + v(-1, 1).a);
        let expect_b = W_CENTER * v(0, 0).b
            + W_ORTHO * (v(1, 0).b + v(-1, 0).b + v(0, 1).b + v(0, -1).b)
            + W_DIAG * (v(1, 1).b + v(-1, -1).b + v(1, -1).b + v(-1, 1).b);
        let (la, lb) = laplacian(&g, x, y);
        assert_abs_diff_eq!(la, expect_a, epsilon = 1e-6);
        assert_abs_diff_eq!(lb, expect_b, epsilon = 1e-6);
    }

    #[test]
    fn corner_lookups_clamp_to_edge() {
        let mut g = Grid::filled(4, 4, Cell::new(0.5, 0.5, 0.0)).unwrap();
        g.set(1, 0, Cell::new(1.0, 0.5, 0.0));
        let hood = Neighborhood::gather(&g, 0, 0);
        // (1,0) is seen to the right of the corner, and again down-right
        // because row -1 clamps to row 0
        assert_eq!(hood.cells[1][2].a, 1.0);
        assert_eq!(hood.cells[0][2].a, 1.0);
        assert_eq!(hood.cells[0][0].a, 0.5);
        let (la, _) = hood.laplacian();
        assert_abs_diff_eq!(la, W_ORTHO * 0.5 + W_DIAG * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn kill_multiplier_only_above_threshold() {
        assert_eq!(kill_multiplier(0.0), 1.0);
        assert_eq!(kill_multiplier(0.5), 1.0);
        assert_eq!(kill_multiplier(0.75), 1.25);
        assert_eq!(kill_multiplier(1.0), 1.5);
    }

    #[test]
    fn reaction_terms_on_flat_field() {
        let params = SimulationParameters::default();
        let cell = Cell::new(0.6, 0.3, 0.0);
        let next = update_cell(&Neighborhood::uniform(cell), &params);
        let r = 0.6 * 0.3 * 0.3;
        assert_abs_diff_eq!(next.a, 0.6 - r + params.feed_rate * 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(
            next.b,
            0.3 + r - (params.kill_rate + params.feed_rate) * 0.3,
            epsilon = 1e-6
        );
    }

    #[test]
    fn mask_raises_kill_rate() {
        let params = SimulationParameters::default();
        let plain = update_cell(&Neighborhood::uniform(Cell::new(0.2, 0.5, 0.0)), &params);
        let masked = update_cell(&Neighborhood::uniform(Cell::new(0.2, 0.5, 0.9)), &params);
        assert!(masked.b < plain.b);
        assert_eq!(masked.a, plain.a);
        assert_eq!(masked.m, 0.9);
    }

    #[test]
    fn configured_rate_for_a_drives_b() {
        // bump in B only; zeroing diffusion_rate_b must leave A's diffusion at 0
        let mut g = Grid::filled(3, 3, Cell::new(0.5, 0.2, 0.0)).unwrap();
        g.set(1, 1, Cell::new(0.9, 0.8, 0.0));
        let hood = Neighborhood::gather(&g, 1, 1);

        let base = SimulationParameters {
            feed_rate: 0.0,
            kill_rate: 0.0,
            ..Default::default()
        };
        let only_a = SimulationParameters {
            diffusion_rate_a: 1.0,
            diffusion_rate_b: 0.0,
            ..base
        };
        let next = update_cell(&hood, &only_a);
        let r = 0.9 * 0.8 * 0.8;
        let (_, lap_b) = hood.laplacian();
        assert_abs_diff_eq!(next.a, 0.9 - r, epsilon = 1e-6);
        assert_abs_diff_eq!(next.b, 0.8 + lap_b + r, epsilon = 1e-6);
    }

    #[test]
    fn pass_clamps_under_extreme_parameters() {
        let front = random_grid(24, 16, 99);
        let mut back = Grid::clear(24, 16).unwrap();
        for (feed, kill, d) in [
            (10.0, 10.0, 50.0),
            (-5.0, -5.0, -50.0),
            (1e30, 1e30, 1e30),
            (f32::MAX, f32::MAX, f32::MAX),
        ] {
            let params = SimulationParameters {
                diffusion_rate_a: d,
                diffusion_rate_b: d,
                feed_rate: feed,
                kill_rate: kill,
                ..Default::default()
            };
            pass(&front, &mut back, &params);
            for c in back.cells() {
                assert!((0.0..=1.0).contains(&c.a), "a={} feed={feed}", c.a);
                assert!((0.0..=1.0).contains(&c.b), "b={} feed={feed}", c.b);
            }
        }
    }

    #[test]
    fn pass_matches_serial_update() {
        let front = random_grid(13, 9, 3);
        let mut back = Grid::clear(13, 9).unwrap();
        let params = SimulationParameters::default();
        pass(&front, &mut back, &params);
        for y in 0..9 {
            for x in 0..13 {
                let expect = update_cell(&Neighborhood::gather(&front, x, y), &params);
                assert_eq!(back.get(x, y), expect);
            }
        }
    }

    #[test]
    fn pass_preserves_mask_channel() {
        let front = random_grid(10, 10, 11);
        let mut back = Grid::clear(10, 10).unwrap();
        pass(&front, &mut back, &SimulationParameters::default());
        for (f, b) in front.cells().iter().zip(back.cells()) {
            assert_eq!(f.m, b.m);
        }
    }
}
