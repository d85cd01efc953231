use crate::color::{self, DisplayColors, Rgb};
use crate::error::SimError;
use crate::grid::{Grid, GridPair};
use crate::inject;
use crate::kernel;
use crate::params::SimulationParameters;
use crate::pointer::PointerState;
use image::RgbImage;
use log::{debug, info, trace, warn};
use std::time::Instant;

/// Frame driver: owns the ping-pong grids, the parameters, the display
/// colors and the last rendered image.
pub struct Simulation {
    grids: GridPair,
    params: SimulationParameters,
    colors: DisplayColors,
    image: RgbImage,
    steps: u64,
}

impl Simulation {
    pub fn new(
        width: usize,
        height: usize,
        params: SimulationParameters,
        colors: DisplayColors,
    ) -> Result<Self, SimError> {
        let grids = GridPair::new(width, height)?;
        let image = color::render(grids.front(), &colors);
        info!("simulation started at {width}x{height}");
        Ok(Self {
            grids,
            params,
            colors,
            image,
            steps: 0,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.grids.dimensions()
    }

    /// Current readable grid.
    pub fn grid(&self) -> &Grid {
        self.grids.front()
    }

    /// Mutable access to the readable grid, e.g. to paint a kill-rate mask.
    pub fn grid_mut(&mut self) -> &mut Grid {
        self.grids.front_mut()
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Parameters are read at the start of each step, never mid-step.
    pub fn params_mut(&mut self) -> &mut SimulationParameters {
        &mut self.params
    }

    pub fn set_params(&mut self, params: SimulationParameters) {
        debug!("parameters updated: {params:?}");
        self.params = params;
    }

    pub fn colors(&self) -> &DisplayColors {
        &self.colors
    }

    /// Change the display ramp. Simulation state is untouched.
    pub fn update_colors(&mut self, low: Rgb, high: Rgb) {
        self.colors = DisplayColors::new(low, high);
        debug!("colors updated: low={} high={}", low.to_hex(), high.to_hex());
    }

    pub fn update_colors_hex(&mut self, low: &str, high: &str) -> Result<(), SimError> {
        let colors = DisplayColors::from_hex(low, high)?;
        self.update_colors(colors.low, colors.high);
        Ok(())
    }

    /// Total kernel steps since the grids were last (re)built.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// One step: kernel pass front to back, brush override on back, swap.
    pub fn step(&mut self, pointer: &PointerState) {
        let params = self.params;
        let (front, back) = self.grids.split();
        kernel::pass(front, back, &params);
        inject::apply(back, pointer, params.brush_radius);
        self.grids.swap();
        self.steps += 1;
    }

    /// Run `steps_per_frame` steps with the same pointer snapshot.
    pub fn step_frame(&mut self, pointer: &PointerState) {
        let started = Instant::now();
        let n = self.params.steps_per_frame;
        for _ in 0..n {
            self.step(pointer);
        }
        trace!("{n} steps in {:?}", started.elapsed());
    }

    /// Map the current grid through the display colors.
    pub fn render(&mut self) -> &RgbImage {
        color::render_into(self.grids.front(), &self.colors, &mut self.image);
        &self.image
    }

    /// Last rendered image, without re-rendering.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Step a full frame, then render it.
    pub fn step_and_render(&mut self, pointer: &PointerState) -> &RgbImage {
        self.step_frame(pointer);
        self.render()
    }

    /// Reallocate at a new surface size and reseed. A rejected size leaves
    /// the current simulation running unchanged.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), SimError> {
        if let Err(e) = self.grids.resize(width, height) {
            warn!("resize rejected: {e}");
            return Err(e);
        }
        self.steps = 0;
        self.render();
        info!("resized to {width}x{height}");
        Ok(())
    }

    /// Reseed both grids with the seed rectangle at the current size.
    pub fn reset_simulation(&mut self) {
        self.grids.reseed();
        self.steps = 0;
        self.render();
        info!("simulation reset");
    }

    /// Zero both grids at the current size.
    pub fn clear_simulation(&mut self) {
        self.grids.clear();
        self.steps = 0;
        self.render();
        info!("simulation cleared");
    }
}
