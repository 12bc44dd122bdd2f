//! Decoding of the conventional digit-dataset binary layout (IDX): a
//! big-endian header followed by one unsigned byte per pixel or label.
//! Files are consumed already decompressed; acquisition is someone
//! else's job.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::error::DataError;
use crate::grid::PixelGrid;

const IMAGE_MAGIC: u32 = 0x0000_0803;
const LABEL_MAGIC: u32 = 0x0000_0801;

const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Which half of the raw dataset a sample came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    Train,
    Test,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Train => f.write_str("train"),
            Partition::Test => f.write_str("test"),
        }
    }
}

#[derive(Debug, Error)]
pub enum IdxError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("bad magic {found:#010x}, expected {expected:#010x}")]
    BadMagic { found: u32, expected: u32 },
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Reads an IDX image file: magic, count, rows, cols, then
/// `rows * cols` bytes per sample. Intensities are normalized to
/// `[0.0, 1.0]` on the way in.
pub fn read_images<R: Read>(r: &mut R) -> Result<Vec<PixelGrid>, IdxError> {
    let magic = read_u32(r)?;
    if magic != IMAGE_MAGIC {
        return Err(IdxError::BadMagic {
            found: magic,
            expected: IMAGE_MAGIC,
        });
    }

    let count = read_u32(r)?;
    let rows = read_u32(r)?;
    let cols = read_u32(r)?;

    let mut images = Vec::with_capacity(count as usize);
    let mut pixels = vec![0u8; (rows * cols) as usize];
    for _ in 0..count {
        r.read_exact(&mut pixels)?;
        images.push(PixelGrid::from_bytes(cols, rows, &pixels));
    }
    Ok(images)
}

/// Reads an IDX label file: magic, count, then one byte per sample.
pub fn read_labels<R: Read>(r: &mut R) -> Result<Vec<u8>, IdxError> {
    let magic = read_u32(r)?;
    if magic != LABEL_MAGIC {
        return Err(IdxError::BadMagic {
            found: magic,
            expected: LABEL_MAGIC,
        });
    }

    let count = read_u32(r)?;
    let mut labels = vec![0u8; count as usize];
    r.read_exact(&mut labels)?;
    Ok(labels)
}

/// Parallel arrays of images and digit labels for one partition.
#[derive(Clone, Debug)]
pub struct RawPartition {
    pub images: Vec<PixelGrid>,
    pub labels: Vec<u8>,
}

impl RawPartition {
    fn load(dir: &Path, partition: Partition) -> Result<Self, DataError> {
        let (image_file, label_file) = match partition {
            Partition::Train => (TRAIN_IMAGES, TRAIN_LABELS),
            Partition::Test => (TEST_IMAGES, TEST_LABELS),
        };

        let images = read_file(&dir.join(image_file), read_images)?;
        let labels = read_file(&dir.join(label_file), read_labels)?;

        if images.len() != labels.len() {
            return Err(DataError::CountMismatch {
                partition,
                images: images.len(),
                labels: labels.len(),
            });
        }
        if let Some((index, &label)) = labels.iter().enumerate().find(|&(_, &l)| l > 9) {
            return Err(DataError::LabelOutOfRange {
                partition,
                index,
                label,
            });
        }

        Ok(Self { images, labels })
    }
}

fn read_file<T>(
    path: &Path,
    parse: impl FnOnce(&mut BufReader<File>) -> Result<T, IdxError>,
) -> Result<T, DataError> {
    let wrap = |source| DataError::Idx {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|e| wrap(IdxError::Io(e)))?;
    parse(&mut BufReader::new(file)).map_err(wrap)
}

/// The full raw dataset: train partition then test partition.
#[derive(Clone, Debug)]
pub struct RawDataset {
    pub train: RawPartition,
    pub test: RawPartition,
}

impl RawDataset {
    /// Loads both partitions from decompressed IDX files in `dir`.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        Ok(Self {
            train: RawPartition::load(dir, Partition::Train)?,
            test: RawPartition::load(dir, Partition::Test)?,
        })
    }
}
