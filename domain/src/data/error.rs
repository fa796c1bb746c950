//! Data container validation errors

use thiserror::Error;

/// Structural problems found while building a data container
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("Row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Image {index} has {found} pixel values, expected {expected} ({height}x{width}x{channels})")]
    ImageShape {
        index: usize,
        height: usize,
        width: usize,
        channels: usize,
        expected: usize,
        found: usize,
    },

    #[error("Instance {instance} timestep {timestep} has {found} values, expected {expected}")]
    RaggedTimestep {
        instance: usize,
        timestep: usize,
        expected: usize,
        found: usize,
    },
}
