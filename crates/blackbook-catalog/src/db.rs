use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::codec::{self, Document};
use crate::error::{CatalogError, ValidationError};
use crate::models::{
    ArtId, ArtOptions, ArtRecord, DEFAULT_ART_TYPE, PhotoId, PhotoOptions, PhotoRecord,
};

/// Vocabularies of valid art attribute values, stored alongside the
/// records they describe.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArtFields {
    pub types: Vec<String>,
    pub sizes: Vec<String>,
    pub qualities: Vec<String>,
    pub artists: Vec<String>,
}

/// The full record set: field vocabularies, photo records, art records,
/// and a dirty flag gating persistence.
///
/// Record identifiers are allocated from a per-class watermark that only
/// moves forward, so deleting the highest record never lets its id be
/// handed out again within the same session. In-place edits obtained
/// through `photo_mut`/`art_mut` do not notify the catalogue — callers
/// mark it dirty themselves after committing.
#[derive(Debug)]
pub struct Catalog {
    path: Option<PathBuf>,
    fields: ArtFields,
    states: Vec<String>,
    photos: Vec<PhotoRecord>,
    arts: Vec<ArtRecord>,
    next_photo_id: PhotoId,
    next_art_id: ArtId,
    dirty: bool,
}

impl Catalog {
    /// Loads a catalogue from its backing store, validating the whole
    /// record set before anything is handed back.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let text = fs::read_to_string(&path)?;
        let document = codec::decode(&text)?;
        validate(&document)?;

        info!(
            path = %path.display(),
            photos = document.photos.len(),
            arts = document.arts.len(),
            "loaded catalogue"
        );
        Ok(Self::assemble(Some(path), document))
    }

    /// Builds a catalogue with no backing file, for callers that seed
    /// records directly. Saving such a catalogue is a recognized no-op.
    pub fn from_parts(
        fields: ArtFields,
        states: Vec<String>,
        photos: Vec<PhotoRecord>,
        arts: Vec<ArtRecord>,
    ) -> Result<Self, ValidationError> {
        let document = Document {
            fields,
            states,
            photos,
            arts,
        };
        validate(&document)?;
        Ok(Self::assemble(None, document))
    }

    fn assemble(path: Option<PathBuf>, document: Document) -> Self {
        let mut catalog = Self {
            path,
            fields: ArtFields::default(),
            states: Vec::new(),
            photos: Vec::new(),
            arts: Vec::new(),
            next_photo_id: 1,
            next_art_id: 1,
            dirty: false,
        };
        catalog.install(document);
        catalog
    }

    fn install(&mut self, document: Document) {
        self.next_photo_id = document
            .photos
            .iter()
            .map(PhotoRecord::id)
            .max()
            .unwrap_or(0)
            + 1;
        self.next_art_id = document.arts.iter().map(ArtRecord::id).max().unwrap_or(0) + 1;
        self.fields = document.fields;
        self.states = document.states;
        self.photos = document.photos;
        self.arts = document.arts;
        self.dirty = false;
    }

    /// Re-reads the backing store, discarding unsaved edits. Any failure
    /// leaves the current state untouched.
    pub fn reload(&mut self) -> Result<(), CatalogError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let text = fs::read_to_string(&path)?;
        let document = codec::decode(&text)?;
        validate(&document)?;
        self.install(document);
        Ok(())
    }

    /// Writes the full state back to the load path and clears the dirty
    /// flag. A catalogue with no backing file skips the write but still
    /// clears the flag.
    pub fn save(&mut self) -> Result<(), CatalogError> {
        match self.path.clone() {
            Some(path) => self.write_to(&path),
            None => {
                info!("catalogue has no backing file, skipping write");
                self.dirty = false;
                Ok(())
            }
        }
    }

    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        self.write_to(path.as_ref())
    }

    fn write_to(&mut self, path: &Path) -> Result<(), CatalogError> {
        let text = codec::encode(&self.fields, &self.states, &self.photos, &self.arts);
        fs::write(path, text)?;
        self.dirty = false;
        info!(
            path = %path.display(),
            photos = self.photos.len(),
            arts = self.arts.len(),
            "saved catalogue"
        );
        Ok(())
    }

    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    pub fn photo(&self, id: PhotoId) -> Option<&PhotoRecord> {
        self.photos.iter().find(|photo| photo.id() == id)
    }

    pub fn photo_mut(&mut self, id: PhotoId) -> Option<&mut PhotoRecord> {
        self.photos.iter_mut().find(|photo| photo.id() == id)
    }

    /// The matching subset of photo records, in storage order.
    pub fn photos_by_ids(&self, ids: &[PhotoId]) -> Vec<&PhotoRecord> {
        self.photos
            .iter()
            .filter(|photo| ids.contains(&photo.id()))
            .collect()
    }

    pub fn photo_by_filename(&self, filename: &str) -> Option<&PhotoRecord> {
        self.photos.iter().find(|photo| photo.filename() == filename)
    }

    pub fn arts(&self) -> &[ArtRecord] {
        &self.arts
    }

    pub fn art(&self, id: ArtId) -> Option<&ArtRecord> {
        self.arts.iter().find(|art| art.id() == id)
    }

    pub fn art_mut(&mut self, id: ArtId) -> Option<&mut ArtRecord> {
        self.arts.iter_mut().find(|art| art.id() == id)
    }

    /// Art documented within one photograph, in storage order.
    pub fn arts_for_photo(&self, photo_id: PhotoId) -> Vec<&ArtRecord> {
        self.arts
            .iter()
            .filter(|art| art.photo_id() == photo_id)
            .collect()
    }

    pub fn arts_for_photos(&self, photo_ids: &[PhotoId]) -> Vec<&ArtRecord> {
        self.arts
            .iter()
            .filter(|art| photo_ids.contains(&art.photo_id()))
            .collect()
    }

    /// Appends a photo record with schema defaults under a fresh id and
    /// marks the catalogue dirty.
    pub fn new_photo(
        &mut self,
        filename: impl Into<String>,
        resolution: (u32, u32),
        options: PhotoOptions,
    ) -> &PhotoRecord {
        let id = self.next_photo_id;
        self.next_photo_id += 1;
        self.photos
            .push(PhotoRecord::new(id, filename, resolution, options));
        self.dirty = true;
        &self.photos[self.photos.len() - 1]
    }

    /// Appends an art record with schema defaults under a fresh id and
    /// marks the catalogue dirty. The parent photo must exist; orphaned
    /// art is never created.
    pub fn new_art(&mut self, photo_id: PhotoId) -> Result<&ArtRecord, ValidationError> {
        if self.photo(photo_id).is_none() {
            return Err(ValidationError::new(vec![format!(
                "no photo record with id {photo_id} to attach art to"
            )]));
        }

        let id = self.next_art_id;
        self.next_art_id += 1;
        self.arts
            .push(ArtRecord::new(id, photo_id, DEFAULT_ART_TYPE, ArtOptions::default()));
        self.dirty = true;
        Ok(&self.arts[self.arts.len() - 1])
    }

    /// Removes an art record by id, reporting whether anything was
    /// removed. Removing an absent id is a no-op and does not dirty the
    /// catalogue.
    pub fn delete_art(&mut self, art_id: ArtId) -> bool {
        let before = self.arts.len();
        self.arts.retain(|art| art.id() != art_id);
        let removed = self.arts.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn art_types(&self) -> &[String] {
        &self.fields.types
    }

    pub fn art_sizes(&self) -> &[String] {
        &self.fields.sizes
    }

    pub fn art_qualities(&self) -> &[String] {
        &self.fields.qualities
    }

    pub fn artists(&self) -> &[String] {
        &self.fields.artists
    }

    pub fn processing_states(&self) -> &[String] {
        &self.states
    }

    /// Adds artist names the vocabulary doesn't know yet, returning how
    /// many were new. Editors call this when a commit introduces names.
    pub fn add_artists(&mut self, names: impl IntoIterator<Item = String>) -> usize {
        let mut added = 0;
        for name in names {
            if !self.fields.artists.iter().any(|known| *known == name) {
                self.fields.artists.push(name);
                added += 1;
            }
        }
        if added > 0 {
            self.dirty = true;
        }
        added
    }
}

/// Runs every integrity check in one pass and reports all the problems
/// found, one message per category.
fn validate(document: &Document) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    let vocabularies = [
        ("art types", &document.fields.types),
        ("art sizes", &document.fields.sizes),
        ("art qualities", &document.fields.qualities),
        ("artists", &document.fields.artists),
        ("processing states", &document.states),
    ];
    for (label, values) in vocabularies {
        let duplicates = duplicate_strings(values);
        if !duplicates.is_empty() {
            problems.push(format!("duplicate {label}: {}", duplicates.join(", ")));
        }
        if values.is_empty() {
            problems.push(format!("no {label} defined"));
        }
    }

    let duplicate_photos = duplicate_ids(document.photos.iter().map(|photo| photo.id()));
    if !duplicate_photos.is_empty() {
        problems.push(format!(
            "duplicate photo ids: {}",
            join_ids(&duplicate_photos)
        ));
    }

    let duplicate_arts = duplicate_ids(document.arts.iter().map(|art| art.id()));
    if !duplicate_arts.is_empty() {
        problems.push(format!("duplicate art ids: {}", join_ids(&duplicate_arts)));
    }

    let photo_ids: HashSet<PhotoId> = document.photos.iter().map(|photo| photo.id()).collect();
    let orphans: Vec<ArtId> = document
        .arts
        .iter()
        .filter(|art| !photo_ids.contains(&art.photo_id()))
        .map(|art| art.id())
        .collect();
    if !orphans.is_empty() {
        problems.push(format!("orphaned art records: {}", join_ids(&orphans)));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(problems))
    }
}

fn duplicate_strings(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for value in values {
        if !seen.insert(value.as_str()) && !duplicates.contains(value) {
            duplicates.push(value.clone());
        }
    }
    duplicates
}

fn duplicate_ids(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for id in ids {
        if !seen.insert(id) && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    duplicates
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessingState;
    use crate::region::Region;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn fields() -> ArtFields {
        ArtFields {
            types: strings(&["tag", "throwup", "wild_style", "mural", "sticker", "text", "other"]),
            sizes: strings(&["tiny", "small", "medium", "large", "huge"]),
            qualities: strings(&["bad", "poor", "fair", "good", "excellent"]),
            artists: strings(&["Unknown", "Amoz", "Daru", "EWO"]),
        }
    }

    fn states() -> Vec<String> {
        strings(&["unreviewed", "needs_review", "reviewed"])
    }

    fn photo(id: PhotoId) -> PhotoRecord {
        PhotoRecord::new(
            id,
            format!("images/P940{id:04}.JPG"),
            (4112, 3884),
            PhotoOptions {
                created_time: Some(1_468_507_707.0 + id as f64),
                ..Default::default()
            },
        )
    }

    fn art(id: ArtId, photo_id: PhotoId) -> ArtRecord {
        ArtRecord::new(
            id,
            photo_id,
            "throwup",
            ArtOptions {
                artists: strings(&["Daru"]),
                size: "large".to_string(),
                quality: "good".to_string(),
                state: ProcessingState::Reviewed,
                region: Some(Region::new(0.2, 0.139, 0.714, 0.329)),
                created_time: Some(1234.0),
                modified_time: Some(1234.0),
                ..Default::default()
            },
        )
    }

    /// Two photos, one art record on the first photo, no backing file.
    fn fixture() -> Catalog {
        Catalog::from_parts(
            fields(),
            states(),
            vec![photo(1), photo(2)],
            vec![art(1, 1)],
        )
        .unwrap()
    }

    #[test]
    fn queries_return_records_in_storage_order() {
        let catalog = fixture();

        assert_eq!(catalog.photos().len(), 2);
        assert_eq!(catalog.photo(1).unwrap().id(), 1);
        assert!(catalog.photo(99).is_none());

        let subset = catalog.photos_by_ids(&[2, 1]);
        assert_eq!(subset.iter().map(|p| p.id()).collect::<Vec<_>>(), [1, 2]);

        assert_eq!(catalog.arts_for_photo(1).len(), 1);
        assert!(catalog.arts_for_photo(2).is_empty());
        assert_eq!(catalog.arts_for_photos(&[1, 2]).len(), 1);

        assert_eq!(
            catalog.photo_by_filename("images/P9400001.JPG").unwrap().id(),
            1
        );
    }

    #[test]
    fn new_art_applies_schema_defaults_and_marks_dirty() {
        let mut catalog =
            Catalog::from_parts(fields(), states(), vec![photo(1)], Vec::new()).unwrap();
        assert!(!catalog.is_dirty());

        let art = catalog.new_art(1).unwrap();
        assert_eq!(art.id(), 1);
        assert_eq!(art.art_type(), "throwup");
        assert_eq!(art.state(), ProcessingState::Unreviewed);
        assert!(art.region().is_none());
        assert!(catalog.is_dirty());
    }

    #[test]
    fn new_art_refuses_an_unknown_parent_photo() {
        let mut catalog = fixture();
        let err = catalog.new_art(99).unwrap_err();
        assert!(err.to_string().contains("99"));
        assert!(catalog.arts_for_photos(&[99]).is_empty());
    }

    #[test]
    fn deleted_high_ids_are_never_reallocated() {
        let mut catalog = fixture();

        let id = catalog.new_art(1).unwrap().id();
        assert_eq!(id, 2);

        assert!(catalog.delete_art(2));
        assert_eq!(catalog.new_art(1).unwrap().id(), 3);

        let photo_id = catalog.new_photo("images/extra.JPG", (800, 600), PhotoOptions::default());
        assert_eq!(photo_id.id(), 3);
    }

    #[test]
    fn delete_art_of_absent_id_is_a_noop() {
        let mut catalog = fixture();
        assert!(!catalog.delete_art(42));
        assert!(!catalog.is_dirty());

        assert!(catalog.delete_art(1));
        assert!(catalog.is_dirty());
        assert!(catalog.art(1).is_none());
    }

    #[test]
    fn in_place_edits_do_not_raise_the_dirty_flag_themselves() {
        let mut catalog = fixture();
        catalog
            .photo_mut(1)
            .unwrap()
            .set_state(ProcessingState::NeedsReview);
        assert!(!catalog.is_dirty());

        catalog.mark_dirty();
        assert!(catalog.is_dirty());
    }

    #[test]
    fn duplicate_photo_ids_fail_validation() {
        let err = Catalog::from_parts(
            fields(),
            states(),
            vec![photo(1), photo(1)],
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err.problems, ["duplicate photo ids: 1"]);
    }

    #[test]
    fn orphaned_art_fails_validation() {
        let err = Catalog::from_parts(fields(), states(), vec![photo(1)], vec![art(1, 9)])
            .unwrap_err();
        assert_eq!(err.problems, ["orphaned art records: 1"]);
    }

    #[test]
    fn validation_reports_every_problem_category_at_once() {
        let mut bad_fields = fields();
        bad_fields.types.push("tag".to_string());
        bad_fields.sizes.clear();

        let err = Catalog::from_parts(
            bad_fields,
            states(),
            vec![photo(1), photo(1)],
            vec![art(1, 1), art(1, 9), art(2, 9)],
        )
        .unwrap_err();

        assert_eq!(
            err.problems,
            [
                "duplicate art types: tag",
                "no art sizes defined",
                "duplicate photo ids: 1",
                "duplicate art ids: 1",
                "orphaned art records: 1, 2",
            ]
        );
    }

    #[test]
    fn save_and_reopen_round_trips_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.json");

        let mut catalog = fixture();
        catalog.mark_dirty();
        catalog.save_as(&path).unwrap();
        assert!(!catalog.is_dirty());

        let reopened = Catalog::open(&path).unwrap();
        assert_eq!(reopened.photos(), catalog.photos());
        assert_eq!(reopened.arts(), catalog.arts());
        assert_eq!(reopened.artists(), catalog.artists());
        assert_eq!(reopened.processing_states(), catalog.processing_states());
    }

    #[test]
    fn saving_without_a_backing_file_is_a_noop_that_clears_dirty() {
        let mut catalog = fixture();
        catalog.mark_dirty();
        catalog.save().unwrap();
        assert!(!catalog.is_dirty());
    }

    #[test]
    fn failed_reload_leaves_previous_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.json");

        let mut seed = fixture();
        seed.save_as(&path).unwrap();
        let mut catalog = Catalog::open(&path).unwrap();

        catalog
            .photo_mut(1)
            .unwrap()
            .set_state(ProcessingState::NeedsReview);
        catalog.mark_dirty();

        std::fs::write(&path, "scribbles").unwrap();
        assert!(catalog.reload().is_err());

        // Unsaved edits survive the failed reload.
        assert_eq!(
            catalog.photo(1).unwrap().state(),
            ProcessingState::NeedsReview
        );
        assert!(catalog.is_dirty());
    }

    #[test]
    fn successful_reload_discards_unsaved_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.json");

        let mut seed = fixture();
        seed.save_as(&path).unwrap();
        let mut catalog = Catalog::open(&path).unwrap();

        catalog
            .photo_mut(1)
            .unwrap()
            .set_state(ProcessingState::NeedsReview);
        catalog.mark_dirty();

        catalog.reload().unwrap();
        assert_eq!(
            catalog.photo(1).unwrap().state(),
            ProcessingState::Unreviewed
        );
        assert!(!catalog.is_dirty());
    }

    #[test]
    fn id_watermarks_continue_past_loaded_records_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.json");

        let mut catalog = fixture();
        catalog.save_as(&path).unwrap();

        let mut reopened = Catalog::open(&path).unwrap();
        assert_eq!(reopened.new_art(1).unwrap().id(), 2);
        assert_eq!(
            reopened
                .new_photo("images/next.JPG", (800, 600), PhotoOptions::default())
                .id(),
            3
        );
    }

    #[test]
    fn add_artists_extends_the_vocabulary_once() {
        let mut catalog = fixture();
        let added = catalog.add_artists(strings(&["Daru", "Zebra", "Zebra"]));
        assert_eq!(added, 1);
        assert!(catalog.artists().contains(&"Zebra".to_string()));
        assert!(catalog.is_dirty());
    }
}
