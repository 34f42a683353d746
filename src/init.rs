//! Host-side t=0 field construction.
//!
//! Every function here produces (or edits) a plain `Vec<f32>` laid out with x
//! fastest, then y, then z — the same linearization the kernels use. Nothing
//! in this module touches the GPU; the simulation uploads the results through
//! `FieldBuffers`.

use rayon::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("failed to open heightmap: {0}")]
    Io(#[from] std::io::Error),
    #[error("heightmap is empty")]
    Empty,
    #[error("heightmap row {0} has {1} values, expected {2}")]
    Ragged(usize, usize, usize),
    #[error("heightmap row {0}: invalid value {1:?}")]
    Parse(usize, String),
}

/// A 2D height field parsed from whitespace-separated rows of floats.
/// `size_x` is the row count, `size_y` the per-row value count.
#[derive(Debug, Clone)]
pub struct Heightmap {
    pub values: Vec<f32>,
    pub size_x: usize,
    pub size_y: usize,
}

pub fn parse_heightmap(path: &Path) -> Result<Heightmap, TerrainError> {
    let text = std::fs::read_to_string(path)?;
    let mut values = Vec::new();
    let mut size_x = 0;
    let mut size_y = 0;

    for (row, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut count = 0;
        for token in line.split_whitespace() {
            let value: f32 = token
                .parse()
                .map_err(|_| TerrainError::Parse(row, token.to_string()))?;
            values.push(value);
            count += 1;
        }
        if size_x == 0 {
            size_y = count;
        } else if count != size_y {
            return Err(TerrainError::Ragged(row, count, size_y));
        }
        size_x += 1;
    }

    if values.is_empty() {
        return Err(TerrainError::Empty);
    }

    Ok(Heightmap {
        values,
        size_x,
        size_y,
    })
}

pub fn uniform_fill(value: f32, len: usize) -> Vec<f32> {
    vec![value; len]
}

/// Constant inflow planted on the two x-boundary faces; interior zero. Used
/// to inject the domain's inlet/outlet velocity component.
pub fn wall_inflow(value: f32, size_x: usize, size_y: usize, size_z: usize) -> Vec<f32> {
    let mut field = vec![0.0f32; size_x * size_y * size_z];
    field.par_chunks_mut(size_x).for_each(|row| {
        row[0] = value;
        row[size_x - 1] = value;
    });
    field
}

/// Carves a cylindrical hole (value 0) around the grid's horizontal center,
/// `base_value` elsewhere. Center coordinates truncate: `(size - 1) / 2`.
pub fn cylinder_mask(
    base_value: f32,
    size_x: usize,
    size_y: usize,
    size_z: usize,
    radius: i32,
) -> Vec<f32> {
    let cx = (size_x as i32 - 1) / 2;
    let cy = (size_y as i32 - 1) / 2;
    let mut field = vec![0.0f32; size_x * size_y * size_z];
    field
        .par_chunks_mut(size_x)
        .enumerate()
        .for_each(|(chunk, row)| {
            let y = (chunk % size_y) as i32;
            for (x, cell) in row.iter_mut().enumerate() {
                let dx = x as i32 - cx;
                let dy = y - cy;
                *cell = if dx * dx + dy * dy < radius * radius {
                    0.0
                } else {
                    base_value
                };
            }
        });
    field
}

/// Closed-box boundary mask: every cell on one of the six outer faces of the
/// padded grid is solid (0), the interior fluid (1).
pub fn boundary_shell(size: usize) -> Vec<f32> {
    let mut mask = vec![1.0f32; size * size * size];
    mask.par_chunks_mut(size)
        .enumerate()
        .for_each(|(chunk, row)| {
            let y = chunk % size;
            let z = chunk / size;
            if y == 0 || y == size - 1 || z == 0 || z == size - 1 {
                row.fill(0.0);
            } else {
                row[0] = 0.0;
                row[size - 1] = 0.0;
            }
        });
    mask
}

/// Imposes terrain geometry on a fresh shell: each interior (x, y) column
/// samples the heightmap by nearest-neighbor index scaling and marks interior
/// cells at or above `height * boundary_size` as fluid, below as solid. The
/// ghost shell stays solid.
pub fn terrain_boundary(map: &Heightmap, grid_size: usize) -> Vec<f32> {
    let boundary_size = grid_size + 2;
    let mut mask = boundary_shell(boundary_size);

    let step_x = map.size_x as f32 / grid_size as f32;
    let step_y = map.size_y as f32 / grid_size as f32;

    mask.par_chunks_mut(boundary_size)
        .enumerate()
        .for_each(|(chunk, row)| {
            let y = chunk % boundary_size;
            let z = chunk / boundary_size;
            if y == 0 || y >= grid_size + 1 || z == 0 || z >= grid_size + 1 {
                return;
            }
            for x in 1..=grid_size {
                let tx = ((x - 1) as f32 * step_x) as usize;
                let ty = ((y - 1) as f32 * step_y) as usize;
                let idx = (tx + ty * map.size_x).min(map.values.len() - 1);
                let height = map.values[idx];
                row[x] = if z as f32 >= height * boundary_size as f32 {
                    1.0
                } else {
                    0.0
                };
            }
        });

    mask
}

/// In-place punch-through of a centered cylinder on an existing mask. Never
/// restores previously-zeroed cells.
pub fn add_obstacle_cylinder(
    mask: &mut [f32],
    size: usize,
    radius: i32,
    offset_x: i32,
    offset_y: i32,
) {
    let center = (size as i32 - 1) / 2;
    mask.par_chunks_mut(size)
        .enumerate()
        .for_each(|(chunk, row)| {
            let y = (chunk % size) as i32;
            let dy = y - 1 - offset_y - center;
            for (x, cell) in row.iter_mut().enumerate() {
                let dx = x as i32 - 1 - offset_x - center;
                if dx * dx + dy * dy < radius * radius {
                    *cell = 0.0;
                }
            }
        });
}

/// Re-opens the mid-height inflow vent: one full vertical line of cells at
/// `[z = G/2 + 1][all y][x = 1]`. Every boundary construction path applies
/// this last so the shell and terrain rules never overwrite it.
pub fn open_inflow_vent(mask: &mut [f32], grid_size: usize) {
    let b = grid_size + 2;
    let z = grid_size / 2 + 1;
    for y in 0..b {
        mask[b * b * z + b * y + 1] = 0.0;
    }
}

/// Seeds `n_streams` density points along the inlet face on the mid-height
/// plane, evenly spaced in y.
pub fn seed_density_streams(density: &mut [f32], grid_size: usize, n_streams: usize, value: f32) {
    if n_streams == 0 {
        return;
    }
    let stream_spacing = grid_size / n_streams;
    for i in 0..n_streams {
        let y = i * stream_spacing;
        if y < grid_size {
            density[grid_size * grid_size * (grid_size / 2) + grid_size * y] = value;
        }
    }
}
