use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use blackbook_catalog::db::Catalog;
use blackbook_catalog::models::{PhotoId, PhotoOptions};
use blackbook_metadata::exif::PhotoMetadata;

/// Inserts photo records for every file named in the listing, reading
/// capture time, resolution, and rotation from each file's metadata.
///
/// Files the catalogue already knows by filename are refreshed in place
/// instead of re-inserted: their display rotation is updated when the
/// metadata disagrees, and left alone otherwise. Resolution is fixed at
/// record creation and never revised.
pub fn run(database: &Path, file_list: &Path) -> Result<()> {
    let mut catalog = Catalog::open(database)?;

    let listing = fs::read_to_string(file_list)
        .with_context(|| format!("failed to read file list {}", file_list.display()))?;
    let mut files: Vec<&str> = listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    files.sort_unstable();

    let known: HashMap<String, PhotoId> = catalog
        .photos()
        .iter()
        .map(|photo| (photo.filename().to_string(), photo.id()))
        .collect();

    let mut inserted = 0usize;
    let mut updated = 0usize;
    for file in files {
        let metadata = PhotoMetadata::from_file(Path::new(file));
        if metadata.resolution == (0, 0) {
            warn!(file, "no resolution in metadata, recording as unknown");
        }

        match known.get(file) {
            Some(&id) => {
                let mut changed = false;
                if let Some(photo) = catalog.photo_mut(id) {
                    if photo.rotation() != metadata.rotation {
                        photo.set_rotation(metadata.rotation);
                        photo.touch();
                        changed = true;
                    }
                }
                if changed {
                    catalog.mark_dirty();
                    updated += 1;
                    info!(file, photo = id, "refreshed rotation");
                }
            }
            None => {
                let options = PhotoOptions {
                    rotation: metadata.rotation,
                    created_time: (metadata.timestamp > 0.0).then_some(metadata.timestamp),
                    ..Default::default()
                };
                let photo = catalog.new_photo(file, metadata.resolution, options);
                info!(file, photo = photo.id(), "added photo record");
                inserted += 1;
            }
        }
    }

    if catalog.is_dirty() {
        catalog.save()?;
        info!(inserted, updated, "catalogue saved");
    } else {
        info!("catalogue unchanged, not saving");
    }
    Ok(())
}
