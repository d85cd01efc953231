use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// A surface with a zero-length side cannot hold a grid.
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// A display color string that is not `#RRGGBB`.
    #[error("invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
}

impl SimError {
    pub(crate) fn check_dimensions(width: usize, height: usize) -> Result<(), SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        Ok(())
    }
}
