use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Latest pointer position in surface pixels plus the two press flags.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    /// Injects species A, erasing B.
    pub primary_pressed: bool,
    /// Injects species B.
    pub secondary_pressed: bool,
}

impl PointerState {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn with_primary(mut self, pressed: bool) -> Self {
        self.primary_pressed = pressed;
        self
    }

    pub fn with_secondary(mut self, pressed: bool) -> Self {
        self.secondary_pressed = pressed;
        self
    }

    pub fn is_pressed(&self) -> bool {
        self.primary_pressed || self.secondary_pressed
    }
}

/// Pointer state shared between an input producer and the frame driver.
///
/// Each field is an independent relaxed atomic. A snapshot may mix fields
/// from two consecutive events; that is at most one event stale and never
/// blocks the driver.
#[derive(Debug, Default)]
pub struct SharedPointer {
    x: AtomicU32,
    y: AtomicU32,
    primary: AtomicBool,
    secondary: AtomicBool,
}

impl SharedPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&self, x: f32, y: f32) {
        self.x.store(x.to_bits(), Ordering::Relaxed);
        self.y.store(y.to_bits(), Ordering::Relaxed);
    }

    pub fn set_primary(&self, pressed: bool) {
        self.primary.store(pressed, Ordering::Relaxed);
    }

    pub fn set_secondary(&self, pressed: bool) {
        self.secondary.store(pressed, Ordering::Relaxed);
    }

    /// Drop both press flags, e.g. when the pointer leaves the surface.
    pub fn release_all(&self) {
        self.set_primary(false);
        self.set_secondary(false);
    }

    pub fn snapshot(&self) -> PointerState {
        PointerState {
            x: f32::from_bits(self.x.load(Ordering::Relaxed)),
            y: f32::from_bits(self.y.load(Ordering::Relaxed)),
            primary_pressed: self.primary.load(Ordering::Relaxed),
            secondary_pressed: self.secondary.load(Ordering::Relaxed),
        }
    }
}
