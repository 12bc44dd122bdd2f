//! Assembly of one digit string into a row image: sampled glyphs,
//! randomized spacer blocks, optional center-padding to a fixed canvas
//! width, then rescaling into the output intensity domain.

use rand::Rng;

use crate::error::ComposeError;
use crate::grid::{ComposedImage, PixelGrid};
use crate::index::GlyphIndex;

/// One generation request. `width: None` means unbounded: the output
/// keeps its natural concatenated width.
#[derive(Clone, Debug)]
pub struct SequenceRequest {
    pub number: String,
    pub width: Option<u32>,
    pub min_spacing: u32,
    pub max_spacing: u32,
}

impl SequenceRequest {
    /// Checks the request's own invariants — spacing order, digit
    /// characters — and returns the parsed digits. Needs no glyph
    /// index, so callers can fail fast before any dataset work.
    pub fn validate(&self) -> Result<Vec<u8>, ComposeError> {
        if self.min_spacing > self.max_spacing {
            return Err(ComposeError::SpacingContradiction {
                min: self.min_spacing,
                max: self.max_spacing,
            });
        }
        parse_number(&self.number)
    }
}

fn parse_number(number: &str) -> Result<Vec<u8>, ComposeError> {
    if number.is_empty() {
        return Err(ComposeError::EmptyNumber);
    }
    number
        .chars()
        .map(|ch| {
            ch.to_digit(10)
                .map(|d| d as u8)
                .ok_or(ComposeError::NotADigit { ch })
        })
        .collect()
}

/// Worst-case row width for this digit string: the widest available
/// glyph per digit plus maximum spacing between every pair. Computed
/// in u64 — spacing is only bounded by its type, so the worst case
/// does not have to fit u32.
fn required_width(digits: &[u8], index: &GlyphIndex, max_spacing: u32) -> u64 {
    let glyphs: u64 = digits.iter().map(|&d| u64::from(index.max_width(d))).sum();
    glyphs + u64::from(max_spacing) * (digits.len() as u64 - 1)
}

fn pad_center(row: PixelGrid, width: u32) -> PixelGrid {
    let remaining = width - row.width();
    let left = remaining / 2;
    let right = remaining - left;
    let height = row.height();

    let padded = PixelGrid::hconcat(&[
        PixelGrid::zeros(left, height),
        row,
        PixelGrid::zeros(right, height),
    ]);
    debug_assert_eq!(padded.width(), width);
    padded
}

/// Composes the requested digit string into one image.
///
/// Glyphs are drawn uniformly from the index, spacings uniformly from
/// `[min_spacing, max_spacing]` inclusive; no spacer follows the last
/// digit. The width check uses the widest glyph per digit, so a request
/// that passes it can always be padded to the exact canvas width.
/// Randomness comes only from the injected `rng`: a fixed seed gives a
/// fixed image.
pub fn compose<R: Rng + ?Sized>(
    request: &SequenceRequest,
    index: &GlyphIndex,
    rng: &mut R,
) -> Result<ComposedImage, ComposeError> {
    let digits = request.validate()?;

    let required = required_width(&digits, index, request.max_spacing);
    if let Some(requested) = request.width {
        if u64::from(requested) < required {
            return Err(ComposeError::WidthTooSmall {
                requested,
                // saturates when the true minimum exceeds any
                // representable canvas
                required: u32::try_from(required).unwrap_or(u32::MAX),
            });
        }
    }

    // glyph, spacer, glyph, ..., glyph
    let mut parts: Vec<PixelGrid> = Vec::with_capacity(digits.len() * 2 - 1);
    for (i, &digit) in digits.iter().enumerate() {
        let glyph = index.sample(digit, rng)?;
        let height = glyph.height();
        parts.push(glyph.clone());

        if i + 1 < digits.len() {
            let spacing = rng.random_range(request.min_spacing..=request.max_spacing);
            parts.push(PixelGrid::zeros(spacing, height));
        }
    }

    let row = PixelGrid::hconcat(&parts);
    let row = match request.width {
        Some(width) => pad_center(row, width),
        None => row,
    };

    Ok(row.quantize())
}
