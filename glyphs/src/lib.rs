//! Digit-glyph preprocessing and sequence composition for synthetic OCR
//! training data.
//!
//! Pipeline: decode the raw handwritten-digit dataset ([`idx`]), trim
//! background columns from each sample ([`crop`]), group glyphs by
//! digit into a cached [`GlyphIndex`], assemble arbitrary digit strings
//! into row images ([`compose`]) and optionally rotate them
//! ([`augment`]). The index is read-only after construction; every
//! composition call takes its own RNG, so batches parallelize without
//! shared state.

pub mod augment;
pub mod compose;
pub mod crop;
pub mod error;
pub mod grid;
pub mod idx;
pub mod index;

pub use augment::augment;
pub use compose::{SequenceRequest, compose};
pub use crop::crop;
pub use error::{ComposeError, DataError, EmptyGlyphError, IndexError, StorageError};
pub use grid::{ComposedImage, GLYPH_HEIGHT, GLYPH_WIDTH, PixelGrid};
pub use idx::{Partition, RawDataset, RawPartition};
pub use index::GlyphIndex;
