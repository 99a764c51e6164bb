use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use blackbook_catalog::db::Catalog;
use blackbook_catalog::models::{
    ArtId, ArtRecord, PhotoId, PhotoRecord, ProcessingState, Rotation,
};
use blackbook_catalog::region::Region;

use crate::coordinator::{
    EditorHandle, EditorLink, OpenOutcome, SessionCoordinator, SessionObserver,
};

/// The full staged state of a photo editor, applied wholesale on each
/// commit.
#[derive(Clone, Debug)]
pub struct PhotoEdits {
    pub filename: String,
    pub state: ProcessingState,
    pub location: Option<(f64, f64)>,
    pub rotation: Rotation,
    pub tags: Vec<String>,
}

impl PhotoEdits {
    /// Snapshot of a record's current mutable fields, for an editor to
    /// stage its changes against.
    pub fn from_record(photo: &PhotoRecord) -> Self {
        Self {
            filename: photo.filename().to_string(),
            state: photo.state(),
            location: photo.location(),
            rotation: photo.rotation(),
            tags: photo.tags().to_vec(),
        }
    }
}

/// The full staged state of an art editor.
#[derive(Clone, Debug)]
pub struct ArtEdits {
    pub art_type: String,
    pub size: String,
    pub quality: String,
    pub state: ProcessingState,
    pub region: Option<Region>,
    pub artists: Vec<String>,
    pub associates: Vec<String>,
    pub vandals: Vec<String>,
    pub date: Option<String>,
}

impl ArtEdits {
    pub fn from_record(art: &ArtRecord) -> Self {
        Self {
            art_type: art.art_type().to_string(),
            size: art.size().to_string(),
            quality: art.quality().to_string(),
            state: art.state(),
            region: art.region(),
            artists: art.artists().to_vec(),
            associates: art.associates().to_vec(),
            vandals: art.vandals().to_vec(),
            date: art.date().map(str::to_string),
        }
    }
}

/// An open editor bound to one art record.
///
/// Commits write the staged fields through the record's setters, add
/// any newly entered artist names to the vocabulary, refresh the
/// record's modified time, and mark the catalogue dirty — all before
/// the `Committed` event goes out, so a refresh driven by the event
/// sees the finished state.
pub struct ArtEditorSession {
    catalog: Rc<RefCell<Catalog>>,
    link: EditorLink,
}

impl ArtEditorSession {
    pub fn new(catalog: Rc<RefCell<Catalog>>, link: EditorLink) -> Self {
        Self { catalog, link }
    }

    pub fn art_id(&self) -> ArtId {
        self.link.record_id()
    }

    /// The record's current mutable fields, or `None` if it has been
    /// deleted out from under the editor.
    pub fn staged(&self) -> Option<ArtEdits> {
        self.catalog
            .borrow()
            .art(self.art_id())
            .map(ArtEdits::from_record)
    }

    pub fn commit(&mut self, edits: ArtEdits) {
        {
            let mut catalog = self.catalog.borrow_mut();
            if catalog.art(self.art_id()).is_none() {
                debug!(record = self.art_id(), "art record gone, dropping commit");
                return;
            }

            catalog.add_artists(edits.artists.iter().cloned());
            if let Some(art) = catalog.art_mut(self.art_id()) {
                art.set_art_type(edits.art_type);
                art.set_size(edits.size);
                art.set_quality(edits.quality);
                art.set_state(edits.state);
                art.set_region(edits.region);
                art.set_artists(edits.artists);
                art.set_associates(edits.associates);
                art.set_vandals(edits.vandals);
                art.set_date(edits.date);
                art.touch();
            }
            catalog.mark_dirty();
        }
        self.link.committed();
    }

    /// Announce the editor closing; the owning coordinator drops it on
    /// the next pump.
    pub fn close(&self) {
        self.link.closed();
    }
}

impl EditorHandle for ArtEditorSession {
    fn activate(&mut self) {
        debug!(record = self.art_id(), "surfacing open art editor");
    }
}

/// An open editor bound to one photo record, owning the coordinator for
/// the art editors spawned beneath it.
pub struct PhotoEditorSession<A> {
    catalog: Rc<RefCell<Catalog>>,
    link: EditorLink,
    art_editors: SessionCoordinator<A>,
}

impl<A: EditorHandle> PhotoEditorSession<A> {
    pub fn new(catalog: Rc<RefCell<Catalog>>, link: EditorLink) -> Self {
        Self {
            catalog,
            link,
            art_editors: SessionCoordinator::new(),
        }
    }

    pub fn photo_id(&self) -> PhotoId {
        self.link.record_id()
    }

    pub fn staged(&self) -> Option<PhotoEdits> {
        self.catalog
            .borrow()
            .photo(self.photo_id())
            .map(PhotoEdits::from_record)
    }

    pub fn commit(&mut self, edits: PhotoEdits) {
        {
            let mut catalog = self.catalog.borrow_mut();
            let Some(photo) = catalog.photo_mut(self.photo_id()) else {
                debug!(record = self.photo_id(), "photo record gone, dropping commit");
                return;
            };
            photo.set_filename(edits.filename);
            photo.set_state(edits.state);
            photo.set_location(edits.location);
            photo.set_rotation(edits.rotation);
            photo.set_tags(edits.tags);
            photo.touch();
            catalog.mark_dirty();
        }
        self.link.committed();
    }

    /// Opens an editor for one of this photo's art records, or surfaces
    /// the editor already open for it.
    pub fn open_art_editor(
        &mut self,
        art_id: ArtId,
        spawn: impl FnOnce(EditorLink) -> A,
    ) -> OpenOutcome {
        self.art_editors.open(art_id, spawn)
    }

    pub fn art_editor(&self, art_id: ArtId) -> Option<&A> {
        self.art_editors.editor(art_id)
    }

    pub fn art_editor_mut(&mut self, art_id: ArtId) -> Option<&mut A> {
        self.art_editors.editor_mut(art_id)
    }

    pub fn open_art_editor_count(&self) -> usize {
        self.art_editors.open_count()
    }

    /// Relays pending art editor notifications to the observer.
    pub fn pump_art_events(&mut self, observer: &mut dyn SessionObserver) -> usize {
        self.art_editors.pump(observer)
    }

    /// Whether this editor may close right now. Closing cascades
    /// downward only, so it refuses while any art editor is open.
    pub fn can_close(&self) -> bool {
        self.art_editors.can_close()
    }

    /// Announce the editor closing, unless art editors are still open,
    /// in which case the close is refused.
    pub fn try_close(&self) -> bool {
        if !self.can_close() {
            debug!(
                record = self.photo_id(),
                open = self.art_editors.open_count(),
                "refusing to close with art editors open"
            );
            return false;
        }
        self.link.closed();
        true
    }
}

impl<A: EditorHandle> EditorHandle for PhotoEditorSession<A> {
    fn activate(&mut self) {
        debug!(record = self.photo_id(), "surfacing open photo editor");
    }
}
