//! Cyclic frame cursor

use crate::error::{PetError, Result};

/// Endless cursor over a fixed, non-empty sequence of frames
///
/// Starts at the first element and wraps back to it after the last one.
#[derive(Debug, Clone)]
pub struct Spinner<T> {
    data: Vec<T>,
    current: usize,
}

impl<T: Clone> Spinner<T> {
    /// Fails when `data` is empty
    pub fn new(data: Vec<T>) -> Result<Self> {
        if data.is_empty() {
            return Err(PetError::config(
                "frame sequence has to contain at least one element",
            ));
        }
        Ok(Self { data, current: 0 })
    }

    /// Return the frame under the cursor and advance
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> T {
        let item = self.data[self.current].clone();
        self.current = (self.current + 1) % self.data.len();
        item
    }

    /// First frame, without moving the cursor
    pub fn first(&self) -> T {
        self.data[0].clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn frames(&self) -> &[T] {
        &self.data
    }
}
