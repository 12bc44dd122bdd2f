use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use glyphs::{GlyphIndex, SequenceRequest, augment, compose};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::SplitMix64;
use tracing::{info, warn};

use crate::io::OutputWriter;
use crate::record::JsonRecord;

mod io;
mod record;

/// Handwritten-digit sequence image generator.
///
/// Samples glyphs from the reference dataset and renders the given
/// number as labeled grayscale PNGs for OCR training.
#[derive(Parser, Debug)]
#[command(name = "seqgen")]
struct Args {
    /// Number to render, e.g. "14543"
    #[arg(long)]
    number: String,

    /// Canvas width in pixels; 0 leaves the width unbounded
    #[arg(long, default_value_t = 0)]
    image_width: u32,

    /// Minimum spacing between digits in pixels
    #[arg(long, default_value_t = 0)]
    min_spacing: u32,

    /// Maximum spacing between digits in pixels
    #[arg(long, default_value_t = 0)]
    max_spacing: u32,

    /// Maximum rotation in degrees; 0 disables augmentation
    #[arg(long, default_value_t = 0)]
    max_rotation: i32,

    /// Number of images to generate
    #[arg(long, default_value_t = 1)]
    samples: u32,

    /// Directory holding the decompressed IDX dataset files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Glyph index cache file
    #[arg(long, default_value = "data/glyphs.bin")]
    cache: PathBuf,

    /// Output directory for images/ and labels.jsonl
    #[arg(long, default_value = "dataset")]
    out_dir: PathBuf,

    /// Master seed; each sample derives its own RNG from it
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    if args.samples == 0 {
        bail!("sample count must be at least 1");
    }
    if args.max_rotation.abs() > 10 {
        warn!(
            max_rotation = args.max_rotation,
            "rotation beyond 10 degrees may distort digits heavily"
        );
    }

    let request = SequenceRequest {
        number: args.number.clone(),
        width: (args.image_width > 0).then_some(args.image_width),
        min_spacing: args.min_spacing,
        max_spacing: args.max_spacing,
    };
    // reject contradictory requests before the expensive index work
    request.validate()?;

    let index = GlyphIndex::load_or_build(&args.cache, &args.data_dir)?;
    info!(glyphs = index.glyph_count(), "glyph index ready");

    let mut out = OutputWriter::new(&args.out_dir)?;
    let mut master = SplitMix64::seed_from_u64(args.seed);

    for id in 0..args.samples {
        let seed = master.next_u64();
        let mut rng = SmallRng::seed_from_u64(seed);

        let image = compose(&request, &index, &mut rng)?;
        let image = augment(image, args.max_rotation, &mut rng);

        out.save_png(&image, id)?;
        out.write_record(&JsonRecord {
            schema: "v1",
            image: OutputWriter::image_rel(id),
            digits: &args.number,
            width: image.width(),
            height: image.height(),
            seed,
        })?;
    }

    out.finalize()?;
    info!(
        samples = args.samples,
        out_dir = %args.out_dir.display(),
        "generation complete"
    );
    Ok(())
}
