use crate::{CaptionRow, CaptioningResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const HEADER: [&str; 2] = ["Image Name", "Caption"];

/// Write the caption table as CSV. The header is written even when there are no rows.
pub fn write_caption_table(path: &Path, rows: &[CaptionRow], with_bom: bool) -> CaptioningResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = BufWriter::new(File::create(path)?);
    if with_bom {
        file.write_all(UTF8_BOM)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a table written by [`write_caption_table`].
pub fn read_caption_table(path: &Path) -> CaptioningResult<Vec<CaptionRow>> {
    let text = fs::read_to_string(path)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows = reader.deserialize().collect::<Result<Vec<CaptionRow>, _>>()?;
    Ok(rows)
}
