//! Row-major 2D grid shared by every stage of the pipeline

use rayon::prelude::*;

use crate::error::{Result, TerrainError};

/// A 2D grid of `width × height` cells indexed `[x, z]`, stored row by row
/// (`z * width + x`). Edges do not wrap.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Like [`Tilemap::new_with`], but reports allocation failure instead of
    /// aborting.
    pub fn try_new_with(width: usize, height: usize, value: T) -> Result<Self> {
        let cells = width
            .checked_mul(height)
            .ok_or(TerrainError::OutOfMemory { cells: usize::MAX })?;
        let mut data = Vec::new();
        data.try_reserve_exact(cells)
            .map_err(|_| TerrainError::OutOfMemory { cells })?;
        data.resize(cells, value);
        Ok(Self { width, height, data })
    }

    fn index(&self, x: usize, z: usize) -> usize {
        debug_assert!(
            x < self.width && z < self.height,
            "({x}, {z}) outside {}x{}",
            self.width,
            self.height
        );
        z * self.width + x
    }

    pub fn get(&self, x: usize, z: usize) -> &T {
        &self.data[self.index(x, z)]
    }

    pub fn set(&mut self, x: usize, z: usize, value: T) {
        let idx = self.index(x, z);
        self.data[idx] = value;
    }

    /// True for cells on the outer ring.
    pub fn is_boundary(&self, x: usize, z: usize) -> bool {
        x == 0 || z == 0 || x + 1 == self.width || z + 1 == self.height
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Rows as `(z, row)` pairs.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (usize, &mut [T])> {
        self.data.chunks_mut(self.width).enumerate()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Clone + Send + Sync> Tilemap<T> {
    /// Rows as `(z, row)` pairs, processed in parallel.
    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = (usize, &mut [T])> {
        self.data.par_chunks_mut(self.width).enumerate()
    }
}

impl Tilemap<f32> {
    /// Smallest and largest value in the map.
    pub fn value_range(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::MAX, f32::MIN), |(min_h, max_h), &h| (min_h.min(h), max_h.max(h)))
    }

    /// Mean of the 4-connected neighbors of an interior cell.
    pub fn neighbor_average(&self, x: usize, z: usize) -> f32 {
        let sum = *self.get(x - 1, z)
            + *self.get(x + 1, z)
            + *self.get(x, z - 1)
            + *self.get(x, z + 1);
        sum / 4.0
    }
}
