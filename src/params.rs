use serde::{Deserialize, Serialize};

/// Tunable inputs of the diffusion-reaction kernel and the frame driver.
///
/// Read at the start of every step, so a change made between frames takes
/// effect on the next step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Configured "rate for A". The kernel applies it to B's Laplacian.
    pub diffusion_rate_a: f32,
    /// Configured "rate for B". The kernel applies it to A's Laplacian.
    pub diffusion_rate_b: f32,
    pub feed_rate: f32,
    pub kill_rate: f32,
    /// Brush radius as a fraction of the shorter surface side.
    pub brush_radius: f32,
    pub steps_per_frame: usize,
}

impl SimulationParameters {
    /// Diffusion coefficient applied to species A's Laplacian.
    #[inline]
    pub fn effective_diffusion_a(&self) -> f32 {
        self.diffusion_rate_b
    }

    /// Diffusion coefficient applied to species B's Laplacian.
    #[inline]
    pub fn effective_diffusion_b(&self) -> f32 {
        self.diffusion_rate_a
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Preset::Desktop.params()
    }
}

/// Starting profiles: a precise pointer gets a small brush, a finger gets
/// a wide one and a faster simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Desktop,
    Touch,
}

impl Preset {
    pub fn params(self) -> SimulationParameters {
        let (brush_radius, steps_per_frame) = match self {
            Preset::Desktop => (0.015, 40),
            Preset::Touch => (0.07, 75),
        };
        SimulationParameters {
            diffusion_rate_a: 0.45,
            diffusion_rate_b: 1.1,
            feed_rate: 0.0544,
            kill_rate: 0.0645,
            brush_radius,
            steps_per_frame,
        }
    }
}
