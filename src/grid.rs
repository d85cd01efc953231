use crate::error::SimError;

/// Fraction of each surface side covered by the seed rectangle.
const SEED_FRACTION: f64 = 0.04;

/// One grid position: species A, species B and the kill-rate mask M.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub a: f32,
    pub b: f32,
    pub m: f32,
}

impl Cell {
    /// Background of a seeded grid: B-dominant.
    pub const BACKGROUND: Cell = Cell {
        a: 0.0,
        b: 1.0,
        m: 0.0,
    };
    /// Inside the seed rectangle: A-dominant.
    pub const SEED: Cell = Cell {
        a: 1.0,
        b: 0.0,
        m: 0.0,
    };
    pub const EMPTY: Cell = Cell {
        a: 0.0,
        b: 0.0,
        m: 0.0,
    };

    pub fn new(a: f32, b: f32, m: f32) -> Self {
        Self { a, b, m }
    }
}

/// Row-major 2D array of cells, row 0 at the top of the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    w: usize,
    h: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Uniform grid filled with `cell`.
    pub fn filled(width: usize, height: usize, cell: Cell) -> Result<Self, SimError> {
        SimError::check_dimensions(width, height)?;
        Ok(Self {
            w: width,
            h: height,
            cells: vec![cell; width * height],
        })
    }

    /// B-dominant grid with a centered A-dominant rectangle covering 4% of
    /// each side (rounded down independently).
    pub fn seed(width: usize, height: usize) -> Result<Self, SimError> {
        let mut grid = Self::filled(width, height, Cell::BACKGROUND)?;

        let rw = (width as f64 * SEED_FRACTION).floor() as usize;
        let rh = (height as f64 * SEED_FRACTION).floor() as usize;
        let x0 = (width - rw) / 2;
        let y0 = (height - rh) / 2;

        for y in y0..y0 + rh {
            for x in x0..x0 + rw {
                let i = grid.idx(x, y);
                grid.cells[i] = Cell::SEED;
            }
        }
        Ok(grid)
    }

    /// All channels zero, no seed rectangle.
    pub fn clear(width: usize, height: usize) -> Result<Self, SimError> {
        Self::filled(width, height, Cell::EMPTY)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[self.idx(x, y)]
    }

    /// Lookup with coordinates clamped to the nearest in-bounds cell.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> Cell {
        let xx = x.clamp(0, self.w as isize - 1) as usize;
        let yy = y.clamp(0, self.h as isize - 1) as usize;
        self.get(xx, yy)
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        let i = self.idx(x, y);
        self.cells[i] = cell;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

/// Ping-pong store: exactly two same-shaped grids and the index of the
/// readable one.
#[derive(Clone, Debug)]
pub struct GridPair {
    grids: [Grid; 2],
    front: usize,
}

impl GridPair {
    /// Both grids seeded at the given size.
    pub fn new(width: usize, height: usize) -> Result<Self, SimError> {
        let seeded = Grid::seed(width, height)?;
        Ok(Self::from_grid(seeded))
    }

    fn from_grid(grid: Grid) -> Self {
        Self {
            grids: [grid.clone(), grid],
            front: 0,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.grids[0].dimensions()
    }

    /// Reallocate both grids at the new size and reseed. Prior state is
    /// dropped, never resampled. On error the current grids are kept.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), SimError> {
        let seeded = Grid::seed(width, height)?;
        *self = Self::from_grid(seeded);
        Ok(())
    }

    /// Reseed both grids at the current size.
    pub fn reseed(&mut self) {
        let (w, h) = self.dimensions();
        self.replace_both(Grid::seed(w, h));
    }

    /// Zero both grids at the current size.
    pub fn clear(&mut self) {
        let (w, h) = self.dimensions();
        self.replace_both(Grid::clear(w, h));
    }

    fn replace_both(&mut self, grid: Result<Grid, SimError>) {
        // current dimensions were validated when the pair was built
        if let Ok(grid) = grid {
            *self = Self::from_grid(grid);
        }
    }

    pub fn front(&self) -> &Grid {
        &self.grids[self.front]
    }

    pub fn front_mut(&mut self) -> &mut Grid {
        &mut self.grids[self.front]
    }

    pub fn back(&self) -> &Grid {
        &self.grids[1 - self.front]
    }

    /// Front for reading and back for writing, borrowed disjointly.
    pub fn split(&mut self) -> (&Grid, &mut Grid) {
        let (first, second) = self.grids.split_at_mut(1);
        if self.front == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    /// Exchange front and back roles.
    #[inline]
    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }
}
