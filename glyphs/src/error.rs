//! Error taxonomy: user-input contradictions ([`ComposeError`]),
//! dataset-integrity violations ([`DataError`]) and cache I/O failures
//! ([`StorageError`]). Nothing is retried internally.

use std::path::PathBuf;

use thiserror::Error;

use crate::idx::{IdxError, Partition};

/// A glyph sample with no foreground column; the cropper cannot place
/// either bound on it.
#[derive(Debug, Error)]
#[error("glyph contains no foreground pixels")]
pub struct EmptyGlyphError;

/// Dataset-integrity violations. Fatal to the current operation: the
/// condition will not change until the underlying dataset is fixed.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("sample {index} in the {partition} partition is entirely background")]
    EmptyGlyph { partition: Partition, index: usize },

    #[error("no glyphs indexed for digit {digit}")]
    EmptyGlyphSet { digit: u8 },

    #[error("{partition} partition has {images} images but {labels} labels")]
    CountMismatch {
        partition: Partition,
        images: usize,
        labels: usize,
    },

    #[error("label {label} at sample {index} in the {partition} partition is not a digit")]
    LabelOutOfRange {
        partition: Partition,
        index: usize,
        label: u8,
    },

    #[error("{}: {source}", path.display())]
    Idx {
        path: PathBuf,
        #[source]
        source: IdxError,
    },
}

/// Glyph-index cache read/write failures. The caller decides whether to
/// rebuild from raw data or abort.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("glyph cache is corrupt: {0}")]
    Codec(#[from] postcard::Error),
}

/// Anything `GlyphIndex::load_or_build` can fail with.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Request validation and sampling failures during composition.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("max spacing must be at least min spacing (min: {min}, max: {max})")]
    SpacingContradiction { min: u32, max: u32 },

    #[error("image width {requested} is too small, must be at least {required}")]
    WidthTooSmall { requested: u32, required: u32 },

    #[error("number must contain at least one digit")]
    EmptyNumber,

    #[error("'{ch}' is not a decimal digit")]
    NotADigit { ch: char },

    #[error(transparent)]
    Data(#[from] DataError),
}
