use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::SchemaError;
use crate::record::{Record, Value};
use crate::region::Region;

pub type PhotoId = i64;
pub type ArtId = i64;

/// Placeholder credited when nobody has identified the artist.
pub const DEFAULT_ARTIST: &str = "Unknown";

/// Schema defaults applied when a record is allocated without explicit
/// values.
pub const DEFAULT_ART_TYPE: &str = "throwup";
pub const DEFAULT_ART_SIZE: &str = "medium";
pub const DEFAULT_ART_QUALITY: &str = "fair";

/// Review lifecycle attached to both photo and art records, ordered from
/// least to most processed.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ProcessingState {
    #[default]
    Unreviewed,
    NeedsReview,
    Reviewed,
}

impl ProcessingState {
    pub const ALL: [ProcessingState; 3] = [
        ProcessingState::Unreviewed,
        ProcessingState::NeedsReview,
        ProcessingState::Reviewed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingState::Unreviewed => "unreviewed",
            ProcessingState::NeedsReview => "needs_review",
            ProcessingState::Reviewed => "reviewed",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "unreviewed" => Some(ProcessingState::Unreviewed),
            "needs_review" => Some(ProcessingState::NeedsReview),
            "reviewed" => Some(ProcessingState::Reviewed),
            _ => None,
        }
    }
}

/// Degrees of clockwise rotation needed to display a photograph upright.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

/// Fractional seconds since the Epoch.
pub(crate) fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

/// Optional values for [`PhotoRecord::new`]. List fields are constructed
/// fresh per call; nothing is shared between records.
#[derive(Clone, Debug, Default)]
pub struct PhotoOptions {
    pub state: ProcessingState,
    pub location: Option<(f64, f64)>,
    pub rotation: Rotation,
    /// Defaults to the current time when omitted.
    pub created_time: Option<f64>,
    /// Defaults to the created time when omitted.
    pub modified_time: Option<f64>,
    pub tags: Vec<String>,
}

/// One photograph documenting pieces of street art.
///
/// `id`, `created_time`, and `resolution` are fixed at construction;
/// everything else may be rewritten through the setters or the dynamic
/// [`Record`] interface.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoRecord {
    id: PhotoId,
    created_time: f64,
    resolution: (u32, u32),
    filename: String,
    modified_time: f64,
    state: ProcessingState,
    location: Option<(f64, f64)>,
    rotation: Rotation,
    tags: Vec<String>,
}

const PHOTO_KEYS: &[&str] = &[
    "created_time",
    "filename",
    "id",
    "location",
    "modified_time",
    "resolution",
    "rotation",
    "state",
    "tags",
];

const PHOTO_MUTABLE_KEYS: &[&str] = &[
    "filename",
    "location",
    "modified_time",
    "rotation",
    "state",
    "tags",
];

impl PhotoRecord {
    pub fn new(
        id: PhotoId,
        filename: impl Into<String>,
        resolution: (u32, u32),
        options: PhotoOptions,
    ) -> Self {
        let created_time = options.created_time.unwrap_or_else(now_epoch);
        let modified_time = options.modified_time.unwrap_or(created_time);

        Self {
            id,
            created_time,
            resolution,
            filename: filename.into(),
            modified_time,
            state: options.state,
            location: options.location,
            rotation: options.rotation,
            tags: options.tags,
        }
    }

    pub fn id(&self) -> PhotoId {
        self.id
    }

    pub fn created_time(&self) -> f64 {
        self.created_time
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn modified_time(&self) -> f64 {
        self.modified_time
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    pub fn set_modified_time(&mut self, modified_time: f64) {
        self.modified_time = modified_time;
    }

    pub fn set_state(&mut self, state: ProcessingState) {
        self.state = state;
    }

    pub fn set_location(&mut self, location: Option<(f64, f64)>) {
        self.location = location;
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    /// Stamp the record as modified right now.
    pub fn touch(&mut self) {
        self.modified_time = now_epoch();
    }
}

impl Record for PhotoRecord {
    fn keys(&self) -> &'static [&'static str] {
        PHOTO_KEYS
    }

    fn mutable_keys(&self) -> &'static [&'static str] {
        PHOTO_MUTABLE_KEYS
    }

    fn get(&self, key: &str) -> Result<Value, SchemaError> {
        match key {
            "created_time" => Ok(Value::Float(self.created_time)),
            "filename" => Ok(Value::Text(self.filename.clone())),
            "id" => Ok(Value::Int(self.id)),
            "location" => Ok(match self.location {
                Some((latitude, longitude)) => Value::Location(latitude, longitude),
                None => Value::Empty,
            }),
            "modified_time" => Ok(Value::Float(self.modified_time)),
            "resolution" => Ok(Value::Resolution(self.resolution.0, self.resolution.1)),
            "rotation" => Ok(Value::Int(self.rotation.degrees() as i64)),
            "state" => Ok(Value::State(self.state)),
            "tags" => Ok(Value::List(self.tags.clone())),
            _ => Err(SchemaError::UnknownKey(key.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SchemaError> {
        match key {
            "filename" => match value {
                Value::Text(filename) => {
                    self.filename = filename;
                    Ok(())
                }
                other => Err(wrong_type(key, "a string", &other)),
            },
            "location" => match value {
                Value::Location(latitude, longitude) => {
                    self.location = Some((latitude, longitude));
                    Ok(())
                }
                Value::Empty => {
                    self.location = None;
                    Ok(())
                }
                other => Err(wrong_type(key, "a location pair or nothing", &other)),
            },
            "modified_time" => match value {
                Value::Float(modified_time) => {
                    self.modified_time = modified_time;
                    Ok(())
                }
                other => Err(wrong_type(key, "a float", &other)),
            },
            "rotation" => match value {
                Value::Int(degrees) => match Rotation::from_degrees(degrees) {
                    Some(rotation) => {
                        self.rotation = rotation;
                        Ok(())
                    }
                    None => Err(SchemaError::WrongType {
                        key: key.to_string(),
                        expected: "0, 90, 180, or 270 degrees",
                        got: "an integer",
                    }),
                },
                other => Err(wrong_type(key, "0, 90, 180, or 270 degrees", &other)),
            },
            "state" => match value {
                Value::State(state) => {
                    self.state = state;
                    Ok(())
                }
                other => Err(wrong_type(key, "a processing state", &other)),
            },
            "tags" => match value {
                Value::List(tags) => {
                    self.tags = tags;
                    Ok(())
                }
                other => Err(wrong_type(key, "a string list", &other)),
            },
            _ => Err(SchemaError::ImmutableKey(key.to_string())),
        }
    }
}

/// Optional values for [`ArtRecord::new`]. List fields are constructed
/// fresh per call; an empty artist list falls back to
/// [`DEFAULT_ARTIST`].
#[derive(Clone, Debug)]
pub struct ArtOptions {
    pub artists: Vec<String>,
    pub associates: Vec<String>,
    pub vandals: Vec<String>,
    pub size: String,
    pub quality: String,
    pub state: ProcessingState,
    pub region: Option<Region>,
    pub date: Option<String>,
    pub created_time: Option<f64>,
    pub modified_time: Option<f64>,
}

impl Default for ArtOptions {
    fn default() -> Self {
        Self {
            artists: Vec::new(),
            associates: Vec::new(),
            vandals: Vec::new(),
            size: DEFAULT_ART_SIZE.to_string(),
            quality: DEFAULT_ART_QUALITY.to_string(),
            state: ProcessingState::default(),
            region: None,
            date: None,
            created_time: None,
            modified_time: None,
        }
    }
}

/// One piece of art documented within a parent photograph.
///
/// `id`, `photo_id`, and `created_time` are fixed at construction. The
/// artist list is never empty; committing an empty list records the
/// placeholder [`DEFAULT_ARTIST`] instead.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtRecord {
    id: ArtId,
    photo_id: PhotoId,
    created_time: f64,
    art_type: String,
    size: String,
    quality: String,
    state: ProcessingState,
    region: Option<Region>,
    artists: Vec<String>,
    associates: Vec<String>,
    vandals: Vec<String>,
    date: Option<String>,
    modified_time: f64,
}

const ART_KEYS: &[&str] = &[
    "artists",
    "associates",
    "created_time",
    "date",
    "id",
    "modified_time",
    "photo_id",
    "quality",
    "region",
    "size",
    "state",
    "type",
    "vandals",
];

const ART_MUTABLE_KEYS: &[&str] = &[
    "artists",
    "associates",
    "date",
    "modified_time",
    "quality",
    "region",
    "size",
    "state",
    "type",
    "vandals",
];

impl ArtRecord {
    pub fn new(
        id: ArtId,
        photo_id: PhotoId,
        art_type: impl Into<String>,
        options: ArtOptions,
    ) -> Self {
        let created_time = options.created_time.unwrap_or_else(now_epoch);
        let modified_time = options.modified_time.unwrap_or(created_time);

        Self {
            id,
            photo_id,
            created_time,
            art_type: art_type.into(),
            size: options.size,
            quality: options.quality,
            state: options.state,
            region: options.region,
            artists: normalize_artists(options.artists),
            associates: options.associates,
            vandals: options.vandals,
            date: options.date,
            modified_time,
        }
    }

    pub fn id(&self) -> ArtId {
        self.id
    }

    pub fn photo_id(&self) -> PhotoId {
        self.photo_id
    }

    pub fn created_time(&self) -> f64 {
        self.created_time
    }

    pub fn art_type(&self) -> &str {
        &self.art_type
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn quality(&self) -> &str {
        &self.quality
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    pub fn associates(&self) -> &[String] {
        &self.associates
    }

    pub fn vandals(&self) -> &[String] {
        &self.vandals
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn modified_time(&self) -> f64 {
        self.modified_time
    }

    pub fn set_art_type(&mut self, art_type: impl Into<String>) {
        self.art_type = art_type.into();
    }

    pub fn set_size(&mut self, size: impl Into<String>) {
        self.size = size.into();
    }

    pub fn set_quality(&mut self, quality: impl Into<String>) {
        self.quality = quality.into();
    }

    pub fn set_state(&mut self, state: ProcessingState) {
        self.state = state;
    }

    pub fn set_region(&mut self, region: Option<Region>) {
        self.region = region;
    }

    pub fn set_artists(&mut self, artists: Vec<String>) {
        self.artists = normalize_artists(artists);
    }

    pub fn set_associates(&mut self, associates: Vec<String>) {
        self.associates = associates;
    }

    pub fn set_vandals(&mut self, vandals: Vec<String>) {
        self.vandals = vandals;
    }

    pub fn set_date(&mut self, date: Option<String>) {
        self.date = date;
    }

    pub fn set_modified_time(&mut self, modified_time: f64) {
        self.modified_time = modified_time;
    }

    /// Stamp the record as modified right now.
    pub fn touch(&mut self) {
        self.modified_time = now_epoch();
    }
}

fn normalize_artists(artists: Vec<String>) -> Vec<String> {
    if artists.is_empty() {
        vec![DEFAULT_ARTIST.to_string()]
    } else {
        artists
    }
}

fn wrong_type(key: &str, expected: &'static str, got: &Value) -> SchemaError {
    SchemaError::WrongType {
        key: key.to_string(),
        expected,
        got: got.kind(),
    }
}

impl Record for ArtRecord {
    fn keys(&self) -> &'static [&'static str] {
        ART_KEYS
    }

    fn mutable_keys(&self) -> &'static [&'static str] {
        ART_MUTABLE_KEYS
    }

    fn get(&self, key: &str) -> Result<Value, SchemaError> {
        match key {
            "artists" => Ok(Value::List(self.artists.clone())),
            "associates" => Ok(Value::List(self.associates.clone())),
            "created_time" => Ok(Value::Float(self.created_time)),
            "date" => Ok(match &self.date {
                Some(date) => Value::Text(date.clone()),
                None => Value::Empty,
            }),
            "id" => Ok(Value::Int(self.id)),
            "modified_time" => Ok(Value::Float(self.modified_time)),
            "photo_id" => Ok(Value::Int(self.photo_id)),
            "quality" => Ok(Value::Text(self.quality.clone())),
            "region" => Ok(match self.region {
                Some(region) => Value::Region(region),
                None => Value::Empty,
            }),
            "size" => Ok(Value::Text(self.size.clone())),
            "state" => Ok(Value::State(self.state)),
            "type" => Ok(Value::Text(self.art_type.clone())),
            "vandals" => Ok(Value::List(self.vandals.clone())),
            _ => Err(SchemaError::UnknownKey(key.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SchemaError> {
        match key {
            "artists" => match value {
                Value::List(artists) => {
                    self.artists = normalize_artists(artists);
                    Ok(())
                }
                other => Err(wrong_type(key, "a string list", &other)),
            },
            "associates" => match value {
                Value::List(associates) => {
                    self.associates = associates;
                    Ok(())
                }
                other => Err(wrong_type(key, "a string list", &other)),
            },
            "date" => match value {
                Value::Text(date) => {
                    self.date = Some(date);
                    Ok(())
                }
                Value::Empty => {
                    self.date = None;
                    Ok(())
                }
                other => Err(wrong_type(key, "a string or nothing", &other)),
            },
            "modified_time" => match value {
                Value::Float(modified_time) => {
                    self.modified_time = modified_time;
                    Ok(())
                }
                other => Err(wrong_type(key, "a float", &other)),
            },
            "quality" => match value {
                Value::Text(quality) => {
                    self.quality = quality;
                    Ok(())
                }
                other => Err(wrong_type(key, "a string", &other)),
            },
            "region" => match value {
                Value::Region(region) => {
                    self.region = Some(region);
                    Ok(())
                }
                Value::Empty => {
                    self.region = None;
                    Ok(())
                }
                other => Err(wrong_type(key, "a region or nothing", &other)),
            },
            "size" => match value {
                Value::Text(size) => {
                    self.size = size;
                    Ok(())
                }
                other => Err(wrong_type(key, "a string", &other)),
            },
            "state" => match value {
                Value::State(state) => {
                    self.state = state;
                    Ok(())
                }
                other => Err(wrong_type(key, "a processing state", &other)),
            },
            "type" => match value {
                Value::Text(art_type) => {
                    self.art_type = art_type;
                    Ok(())
                }
                other => Err(wrong_type(key, "a string", &other)),
            },
            "vandals" => match value {
                Value::List(vandals) => {
                    self.vandals = vandals;
                    Ok(())
                }
                other => Err(wrong_type(key, "a string list", &other)),
            },
            _ => Err(SchemaError::ImmutableKey(key.to_string())),
        }
    }
}
