use crate::error::EmptyGlyphError;
use crate::grid::PixelGrid;

/// Trims uniform background columns from both edges of a glyph.
///
/// The left bound is the first column holding a foreground pixel, the
/// right bound the last. The returned grid spans `[left, right)`:
/// the right-most foreground column is excluded, reproducing the
/// behavior of the reference generator this dataset pipeline was
/// trained against (see DESIGN.md). Fails when the glyph has no
/// foreground at all, or when the trim would leave nothing.
pub fn crop(glyph: &PixelGrid) -> Result<PixelGrid, EmptyGlyphError> {
    let left = (0..glyph.width())
        .find(|&c| glyph.column_has_foreground(c))
        .ok_or(EmptyGlyphError)?;

    let right = (0..glyph.width())
        .rev()
        .find(|&c| glyph.column_has_foreground(c))
        .ok_or(EmptyGlyphError)?;

    // A single foreground column would crop to zero width; treat it as
    // a blank sample rather than returning an empty grid.
    if left >= right {
        return Err(EmptyGlyphError);
    }

    Ok(glyph.columns(left, right))
}
