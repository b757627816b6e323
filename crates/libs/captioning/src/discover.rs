use crate::{CaptioningResult, ImageItem};
use app_state::IngestSettings;
use walkdir::WalkDir;

/// Eligible source images directly inside the image folder, sorted by name.
pub fn find_source_images(ingest: &IngestSettings) -> CaptioningResult<Vec<ImageItem>> {
    let mut items = Vec::new();
    for entry in WalkDir::new(&ingest.image_folder)
        .min_depth(1)
        .max_depth(1)
    {
        let entry = entry?;
        if entry.file_type().is_file() && ingest.is_source_file(entry.path()) {
            items.push(ImageItem::new(entry.path()));
        }
    }
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(items)
}
