//! Real-time Gray-Scott style reaction-diffusion painted with a pointer.

pub mod color;
pub mod config;
pub mod error;
pub mod grid;
pub mod inject;
pub mod kernel;
pub mod params;
pub mod pointer;
pub mod sim;

pub use color::{DisplayColors, Rgb};
pub use error::SimError;
pub use grid::{Cell, Grid, GridPair};
pub use params::{Preset, SimulationParameters};
pub use pointer::{PointerState, SharedPointer};
pub use sim::Simulation;
