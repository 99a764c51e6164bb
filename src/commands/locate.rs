use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::info;

use blackbook_catalog::db::Catalog;
use blackbook_catalog::models::PhotoId;
use blackbook_tracks::track::Track;

/// Interpolates every photo's location from the supplied GPS tracks,
/// using each record's capture time as the lookup target. Existing
/// locations are overwritten.
pub fn run(database: &Path, tracks: &[PathBuf], dry_run: bool) -> Result<()> {
    let mut catalog = Catalog::open(database)?;

    let track = Track::from_files(tracks)?;
    if track.is_empty() {
        bail!("no track samples loaded");
    }

    let targets: Vec<(PhotoId, f64)> = catalog
        .photos()
        .iter()
        .map(|photo| (photo.id(), photo.created_time()))
        .collect();

    let mut located = 0usize;
    for (id, timestamp) in targets {
        let Some((latitude, longitude)) = track.locate(timestamp) else {
            continue;
        };
        info!(photo = id, timestamp, latitude, longitude, "interpolated location");

        if dry_run {
            continue;
        }
        if let Some(photo) = catalog.photo_mut(id) {
            photo.set_location(Some((latitude, longitude)));
            photo.touch();
            located += 1;
        }
    }
    if located > 0 {
        catalog.mark_dirty();
    }

    if catalog.is_dirty() {
        catalog.save()?;
        info!(located, "catalogue saved");
    } else {
        info!("catalogue unchanged, not saving");
    }
    Ok(())
}
