//! The digit → glyph-sequence lookup table, built once from the raw
//! dataset and cached to disk. Read-only after construction, so shared
//! references can be handed to any number of concurrent composition
//! calls.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::crop::crop;
use crate::error::{DataError, IndexError, StorageError};
use crate::grid::PixelGrid;
use crate::idx::{Partition, RawDataset};

/// Fixed table indexed by digit 0-9, each slot an ordered arena of
/// cropped glyphs. Encounter order is train partition then test
/// partition, stable across rebuilds of the same raw input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphIndex {
    slots: [Vec<PixelGrid>; 10],
    // derived, recomputed after deserialization
    #[serde(skip)]
    max_widths: [u32; 10],
}

impl GlyphIndex {
    /// Crops every sample of both partitions in original order and
    /// groups them by label. Any blank sample aborts the whole build;
    /// partial indexes are never produced.
    pub fn build(raw: &RawDataset) -> Result<Self, DataError> {
        let mut slots: [Vec<PixelGrid>; 10] = Default::default();

        for (partition, part) in [
            (Partition::Train, &raw.train),
            (Partition::Test, &raw.test),
        ] {
            info!(%partition, samples = part.images.len(), "cropping glyphs");
            for (index, (image, &label)) in part.images.iter().zip(&part.labels).enumerate() {
                // partitions can be built by hand, not only by the IDX
                // loader, so the digit-range invariant is enforced here
                if label > 9 {
                    return Err(DataError::LabelOutOfRange {
                        partition,
                        index,
                        label,
                    });
                }
                let glyph =
                    crop(image).map_err(|_| DataError::EmptyGlyph { partition, index })?;
                slots[label as usize].push(glyph);
            }
        }

        Ok(Self::from_slots(slots))
    }

    fn from_slots(slots: [Vec<PixelGrid>; 10]) -> Self {
        let mut index = Self {
            slots,
            max_widths: [0; 10],
        };
        index.refresh_max_widths();
        index
    }

    fn refresh_max_widths(&mut self) {
        for (digit, glyphs) in self.slots.iter().enumerate() {
            self.max_widths[digit] = glyphs.iter().map(PixelGrid::width).max().unwrap_or(0);
        }
    }

    pub fn glyphs(&self, digit: u8) -> &[PixelGrid] {
        &self.slots[digit as usize]
    }

    /// Widest glyph available for `digit`; 0 when the slot is empty.
    pub fn max_width(&self, digit: u8) -> u32 {
        self.max_widths[digit as usize]
    }

    pub fn glyph_count(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    /// Uniform random draw from the slot for `digit`. An empty slot is
    /// a dataset-integrity violation, not user error.
    pub fn sample<R: Rng + ?Sized>(&self, digit: u8, rng: &mut R) -> Result<&PixelGrid, DataError> {
        let glyphs = self.glyphs(digit);
        if glyphs.is_empty() {
            return Err(DataError::EmptyGlyphSet { digit });
        }
        Ok(&glyphs[rng.random_range(0..glyphs.len())])
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let bytes = fs::read(path)?;
        let mut index: Self = postcard::from_bytes(&bytes)?;
        index.refresh_max_widths();
        Ok(index)
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = postcard::to_stdvec(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Returns the cached index when `cache` exists (trusted as-is, no
    /// revalidation against the raw source); otherwise decodes the raw
    /// dataset from `data_dir`, builds, writes the cache and returns.
    pub fn load_or_build(cache: &Path, data_dir: &Path) -> Result<Self, IndexError> {
        if cache.exists() {
            info!(cache = %cache.display(), "loading glyph index from cache");
            return Ok(Self::load(cache)?);
        }

        info!(data_dir = %data_dir.display(), "building glyph index from raw dataset");
        let raw = RawDataset::load(data_dir)?;
        let index = Self::build(&raw)?;
        index.save(cache)?;
        info!(glyphs = index.glyph_count(), "glyph index written to cache");
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idx::RawPartition;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::ops::Range;
    use std::path::PathBuf;

    // 6-wide, 2-high image with foreground `level` in the given columns
    fn raw_image(fg: Range<u32>, level: f32) -> PixelGrid {
        let mut data = vec![0.0; 12];
        for col in fg {
            data[col as usize] = level;
        }
        PixelGrid::from_vec(6, 2, data)
    }

    fn partition(samples: &[(u8, Range<u32>, f32)]) -> RawPartition {
        RawPartition {
            images: samples
                .iter()
                .map(|(_, fg, level)| raw_image(fg.clone(), *level))
                .collect(),
            labels: samples.iter().map(|(label, _, _)| *label).collect(),
        }
    }

    fn dataset() -> RawDataset {
        RawDataset {
            train: partition(&[
                (3, 0..4, 0.5),
                (7, 1..3, 0.6),
                (3, 2..5, 0.7),
            ]),
            test: partition(&[(3, 0..2, 0.9)]),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("glyphs_{}_{}", std::process::id(), name))
    }

    #[test]
    fn groups_by_label_in_encounter_order() {
        let index = GlyphIndex::build(&dataset()).unwrap();
        let threes = index.glyphs(3);
        // two train glyphs first, then the test glyph
        assert_eq!(threes.len(), 3);
        assert_eq!(threes[0].get(0, 0), 0.5);
        assert_eq!(threes[1].get(0, 0), 0.7);
        assert_eq!(threes[2].get(0, 0), 0.9);
        assert_eq!(index.glyphs(7).len(), 1);
        assert_eq!(index.glyphs(0).len(), 0);
    }

    #[test]
    fn max_width_tracks_the_widest_cropped_glyph() {
        let index = GlyphIndex::build(&dataset()).unwrap();
        // crop keeps [left, right): fg 0..4 -> width 3
        assert_eq!(index.max_width(3), 3);
        assert_eq!(index.max_width(7), 1);
        assert_eq!(index.max_width(0), 0);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let a = GlyphIndex::build(&dataset()).unwrap();
        let b = GlyphIndex::build(&dataset()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn blank_sample_aborts_the_build() {
        let mut raw = dataset();
        raw.test.images.push(PixelGrid::zeros(6, 2));
        raw.test.labels.push(1);
        let err = GlyphIndex::build(&raw).unwrap_err();
        assert!(matches!(
            err,
            DataError::EmptyGlyph {
                partition: Partition::Test,
                index: 1
            }
        ));
    }

    #[test]
    fn out_of_range_label_aborts_the_build() {
        let mut raw = dataset();
        raw.train.images.push(raw_image(0..4, 0.5));
        raw.train.labels.push(12);
        let err = GlyphIndex::build(&raw).unwrap_err();
        assert!(matches!(
            err,
            DataError::LabelOutOfRange {
                partition: Partition::Train,
                index: 3,
                label: 12
            }
        ));
    }

    #[test]
    fn sampling_an_empty_slot_fails() {
        let index = GlyphIndex::build(&dataset()).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(matches!(
            index.sample(4, &mut rng),
            Err(DataError::EmptyGlyphSet { digit: 4 })
        ));
        assert!(index.sample(3, &mut rng).is_ok());
    }

    #[test]
    fn cache_round_trips_losslessly() {
        let path = temp_path("cache_round_trip.bin");
        let index = GlyphIndex::build(&dataset()).unwrap();
        index.save(&path).unwrap();
        let loaded = GlyphIndex::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, index);
    }

    #[test]
    fn load_or_build_trusts_an_existing_cache() {
        let path = temp_path("cache_hit.bin");
        let index = GlyphIndex::build(&dataset()).unwrap();
        index.save(&path).unwrap();
        // data dir does not exist; the cache must be served without
        // touching the raw source
        let loaded = GlyphIndex::load_or_build(&path, Path::new("/nonexistent")).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, index);
    }

    #[test]
    fn corrupt_cache_surfaces_as_storage_error() {
        let path = temp_path("corrupt_cache.bin");
        fs::write(&path, b"not a glyph index").unwrap();
        let err = GlyphIndex::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, StorageError::Codec(_)));
    }
}
