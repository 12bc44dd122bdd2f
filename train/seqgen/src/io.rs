use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use glyphs::ComposedImage;

use crate::record::JsonRecord;

/// Writes `images/{id:06}.png` files and one labels.jsonl alongside.
pub struct OutputWriter {
    out_dir: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl OutputWriter {
    pub fn new(out_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(out_dir.join("images"))?;
        let file = File::create(out_dir.join("labels.jsonl"))?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            writer: Some(BufWriter::with_capacity(8 << 20, file)),
        })
    }

    pub fn image_rel(id: u32) -> String {
        format!("images/{id:06}.png")
    }

    pub fn save_png(&self, image: &ComposedImage, id: u32) -> Result<()> {
        let path = self.out_dir.join(Self::image_rel(id));
        image.to_gray().save(path)?;
        Ok(())
    }

    pub fn write_record(&mut self, record: &JsonRecord<'_>) -> Result<()> {
        let json = serde_json::to_string(record)?;
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{json}")?;
        }
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.into_inner()?.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        let _ = self.finalize();
    }
}
