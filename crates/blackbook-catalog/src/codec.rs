//! Bidirectional mapping between the in-memory catalogue and its backing
//! store, a JSON document with three sections in fixed order: field
//! vocabularies, photo records, art records.
//!
//! Every record attribute travels as a string. Pairs use fixed
//! separators (`4112x3884`, `44.04, -123.09`), list attributes are
//! comma-with-space delimited, and absent optionals are written as the
//! empty string — the wire has no null. `decode` checks the document
//! shape positionally and is all-or-nothing: nothing is handed back
//! unless the whole store parsed.

use serde_json::{Map, Value as Json};

use crate::db::ArtFields;
use crate::error::FormatError;
use crate::models::{
    ArtOptions, ArtRecord, PhotoOptions, PhotoRecord, ProcessingState, Rotation,
};
use crate::region::Region;

/// Everything one backing store holds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub fields: ArtFields,
    pub states: Vec<String>,
    pub photos: Vec<PhotoRecord>,
    pub arts: Vec<ArtRecord>,
}

pub fn encode(
    fields: &ArtFields,
    states: &[String],
    photos: &[PhotoRecord],
    arts: &[ArtRecord],
) -> String {
    let mut fields_node = Map::new();
    fields_node.insert("types".to_string(), vocabulary_node(&fields.types));
    fields_node.insert("sizes".to_string(), vocabulary_node(&fields.sizes));
    fields_node.insert("qualities".to_string(), vocabulary_node(&fields.qualities));
    fields_node.insert("states".to_string(), vocabulary_node(states));
    fields_node.insert("artists".to_string(), vocabulary_node(&fields.artists));

    let mut root = Map::new();
    root.insert("fields".to_string(), Json::Object(fields_node));
    root.insert(
        "photos".to_string(),
        Json::Array(photos.iter().map(photo_node).collect()),
    );
    root.insert(
        "arts".to_string(),
        Json::Array(arts.iter().map(art_node).collect()),
    );

    // Serializing a Value built purely from maps, arrays, and strings
    // cannot fail.
    let mut text = serde_json::to_string_pretty(&Json::Object(root))
        .expect("document serialization is infallible");
    text.push('\n');
    text
}

pub fn decode(text: &str) -> Result<Document, FormatError> {
    let root: Json = serde_json::from_str(text).map_err(|err| FormatError::Syntax(err.to_string()))?;
    let root = match root {
        Json::Object(members) => members,
        other => {
            return Err(FormatError::Kind {
                container: "document",
                expected: "an object",
                kind: kind_of(&other),
            });
        }
    };
    if root.len() != 3 {
        return Err(FormatError::ChildCount {
            container: "document",
            expected: 3,
            actual: root.len(),
        });
    }

    let (fields, states) = parse_fields(section(&root, "document", 0, "fields")?)?;
    let photos = parse_photos(section(&root, "document", 1, "photos")?)?;
    let arts = parse_arts(section(&root, "document", 2, "arts")?)?;

    Ok(Document {
        fields,
        states,
        photos,
        arts,
    })
}

fn vocabulary_node(values: &[String]) -> Json {
    Json::Array(values.iter().map(|value| Json::String(value.clone())).collect())
}

fn photo_node(photo: &PhotoRecord) -> Json {
    let mut attrs = Map::new();
    attrs.insert("id".to_string(), Json::String(photo.id().to_string()));
    attrs.insert(
        "filename".to_string(),
        Json::String(photo.filename().to_string()),
    );
    let (width, height) = photo.resolution();
    attrs.insert(
        "resolution".to_string(),
        Json::String(format!("{width}x{height}")),
    );
    attrs.insert(
        "processing_state".to_string(),
        Json::String(photo.state().as_str().to_string()),
    );
    attrs.insert(
        "location".to_string(),
        Json::String(match photo.location() {
            Some((latitude, longitude)) => format!("{latitude}, {longitude}"),
            None => String::new(),
        }),
    );
    attrs.insert(
        "rotation".to_string(),
        Json::String(photo.rotation().degrees().to_string()),
    );
    attrs.insert("tags".to_string(), Json::String(photo.tags().join(", ")));
    attrs.insert(
        "created_time".to_string(),
        Json::String(photo.created_time().to_string()),
    );
    attrs.insert(
        "modified_time".to_string(),
        Json::String(photo.modified_time().to_string()),
    );
    Json::Object(attrs)
}

fn art_node(art: &ArtRecord) -> Json {
    let mut attrs = Map::new();
    attrs.insert("id".to_string(), Json::String(art.id().to_string()));
    attrs.insert(
        "photo_id".to_string(),
        Json::String(art.photo_id().to_string()),
    );
    attrs.insert("type".to_string(), Json::String(art.art_type().to_string()));
    attrs.insert("artists".to_string(), Json::String(art.artists().join(", ")));
    attrs.insert(
        "associates".to_string(),
        Json::String(art.associates().join(", ")),
    );
    attrs.insert("vandals".to_string(), Json::String(art.vandals().join(", ")));
    attrs.insert("size".to_string(), Json::String(art.size().to_string()));
    attrs.insert(
        "quality".to_string(),
        Json::String(art.quality().to_string()),
    );
    attrs.insert(
        "date".to_string(),
        Json::String(art.date().unwrap_or_default().to_string()),
    );
    attrs.insert(
        "processing_state".to_string(),
        Json::String(art.state().as_str().to_string()),
    );
    attrs.insert(
        "region".to_string(),
        Json::String(match art.region() {
            Some(region) => format!(
                "{}, {}, {}, {}",
                region.x, region.y, region.width, region.height
            ),
            None => String::new(),
        }),
    );
    attrs.insert(
        "created_time".to_string(),
        Json::String(art.created_time().to_string()),
    );
    attrs.insert(
        "modified_time".to_string(),
        Json::String(art.modified_time().to_string()),
    );
    Json::Object(attrs)
}

fn kind_of(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Looks up the section expected at `index`, by position.
fn section<'a>(
    root: &'a Map<String, Json>,
    container: &'static str,
    index: usize,
    expected: &'static str,
) -> Result<&'a Json, FormatError> {
    match root.iter().nth(index) {
        Some((name, node)) if name == expected => Ok(node),
        Some((name, _)) => Err(FormatError::Child {
            container,
            index,
            expected,
            actual: name.clone(),
        }),
        None => Err(FormatError::ChildCount {
            container,
            expected: index + 1,
            actual: root.len(),
        }),
    }
}

fn parse_fields(node: &Json) -> Result<(ArtFields, Vec<String>), FormatError> {
    let Json::Object(members) = node else {
        return Err(FormatError::Kind {
            container: "fields",
            expected: "an object",
            kind: kind_of(node),
        });
    };
    if members.len() != 5 {
        return Err(FormatError::ChildCount {
            container: "fields",
            expected: 5,
            actual: members.len(),
        });
    }

    let types = parse_vocabulary(section(members, "fields", 0, "types")?, "types")?;
    let sizes = parse_vocabulary(section(members, "fields", 1, "sizes")?, "sizes")?;
    let qualities = parse_vocabulary(section(members, "fields", 2, "qualities")?, "qualities")?;
    let states = parse_vocabulary(section(members, "fields", 3, "states")?, "states")?;
    let artists = parse_vocabulary(section(members, "fields", 4, "artists")?, "artists")?;

    Ok((
        ArtFields {
            types,
            sizes,
            qualities,
            artists,
        },
        states,
    ))
}

fn parse_vocabulary(node: &Json, container: &'static str) -> Result<Vec<String>, FormatError> {
    let Json::Array(items) = node else {
        return Err(FormatError::Kind {
            container,
            expected: "an array",
            kind: kind_of(node),
        });
    };

    let mut values = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Json::String(value) = item else {
            return Err(FormatError::Child {
                container,
                index,
                expected: "a string",
                actual: kind_of(item).to_string(),
            });
        };
        values.push(value.clone());
    }
    Ok(values)
}

fn parse_photos(node: &Json) -> Result<Vec<PhotoRecord>, FormatError> {
    let Json::Array(items) = node else {
        return Err(FormatError::Kind {
            container: "photos",
            expected: "an array",
            kind: kind_of(node),
        });
    };

    let mut photos = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let mut attrs = Attrs::new(item, "photos", index)?;

        let id = attrs.int("id")?;
        let filename = attrs.text("filename")?.to_string();
        let resolution = attrs.resolution("resolution")?;
        let state = attrs.state("processing_state")?;
        let location = attrs.location("location")?;
        let rotation = attrs.rotation("rotation")?;
        let tags = attrs.list("tags")?;
        let created_time = attrs.float("created_time")?;
        let modified_time = attrs.float("modified_time")?;
        attrs.finish()?;

        photos.push(PhotoRecord::new(
            id,
            filename,
            resolution,
            PhotoOptions {
                state,
                location,
                rotation,
                created_time: Some(created_time),
                modified_time: Some(modified_time),
                tags,
            },
        ));
    }
    Ok(photos)
}

fn parse_arts(node: &Json) -> Result<Vec<ArtRecord>, FormatError> {
    let Json::Array(items) = node else {
        return Err(FormatError::Kind {
            container: "arts",
            expected: "an array",
            kind: kind_of(node),
        });
    };

    let mut arts = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let mut attrs = Attrs::new(item, "arts", index)?;

        let id = attrs.int("id")?;
        let photo_id = attrs.int("photo_id")?;
        let art_type = attrs.text("type")?.to_string();
        let artists = attrs.list("artists")?;
        let associates = attrs.list("associates")?;
        let vandals = attrs.list("vandals")?;
        let size = attrs.text("size")?.to_string();
        let quality = attrs.text("quality")?.to_string();
        let date = attrs.optional_text("date")?;
        let state = attrs.state("processing_state")?;
        let region = attrs.region("region")?;
        let created_time = attrs.float("created_time")?;
        let modified_time = attrs.float("modified_time")?;
        attrs.finish()?;

        arts.push(ArtRecord::new(
            id,
            photo_id,
            art_type,
            ArtOptions {
                artists,
                associates,
                vandals,
                size,
                quality,
                state,
                region,
                date,
                created_time: Some(created_time),
                modified_time: Some(modified_time),
            },
        ));
    }
    Ok(arts)
}

/// Reads a record node's attributes, tracking which were consumed so
/// leftovers can be reported.
struct Attrs<'a> {
    container: &'static str,
    index: usize,
    map: &'a Map<String, Json>,
    taken: Vec<&'static str>,
}

impl<'a> Attrs<'a> {
    fn new(node: &'a Json, container: &'static str, index: usize) -> Result<Self, FormatError> {
        let Json::Object(map) = node else {
            return Err(FormatError::Child {
                container,
                index,
                expected: "an object",
                actual: kind_of(node).to_string(),
            });
        };
        Ok(Self {
            container,
            index,
            map,
            taken: Vec::new(),
        })
    }

    fn text(&mut self, attribute: &'static str) -> Result<&'a str, FormatError> {
        self.taken.push(attribute);
        match self.map.get(attribute) {
            Some(Json::String(value)) => Ok(value),
            Some(other) => Err(FormatError::MalformedValue {
                container: self.container,
                index: self.index,
                attribute,
                value: kind_of(other).to_string(),
            }),
            None => Err(FormatError::MissingAttribute {
                container: self.container,
                index: self.index,
                attribute,
            }),
        }
    }

    fn malformed(&self, attribute: &'static str, value: &str) -> FormatError {
        FormatError::MalformedValue {
            container: self.container,
            index: self.index,
            attribute,
            value: value.to_string(),
        }
    }

    fn int(&mut self, attribute: &'static str) -> Result<i64, FormatError> {
        let text = self.text(attribute)?;
        text.trim()
            .parse()
            .map_err(|_| self.malformed(attribute, text))
    }

    fn float(&mut self, attribute: &'static str) -> Result<f64, FormatError> {
        let text = self.text(attribute)?;
        text.trim()
            .parse()
            .map_err(|_| self.malformed(attribute, text))
    }

    fn resolution(&mut self, attribute: &'static str) -> Result<(u32, u32), FormatError> {
        let text = self.text(attribute)?;
        let parsed = text.split_once('x').and_then(|(width, height)| {
            Some((
                width.trim().parse().ok()?,
                height.trim().parse().ok()?,
            ))
        });
        parsed.ok_or_else(|| self.malformed(attribute, text))
    }

    fn location(&mut self, attribute: &'static str) -> Result<Option<(f64, f64)>, FormatError> {
        let text = self.text(attribute)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        match parse_floats(text).as_slice() {
            [latitude, longitude] => Ok(Some((*latitude, *longitude))),
            _ => Err(self.malformed(attribute, text)),
        }
    }

    fn region(&mut self, attribute: &'static str) -> Result<Option<Region>, FormatError> {
        let text = self.text(attribute)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        match parse_floats(text).as_slice() {
            [x, y, width, height] => Ok(Some(Region::new(*x, *y, *width, *height))),
            _ => Err(self.malformed(attribute, text)),
        }
    }

    fn list(&mut self, attribute: &'static str) -> Result<Vec<String>, FormatError> {
        let text = self.text(attribute)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(text
            .split(',')
            .map(|element| element.trim().to_string())
            .collect())
    }

    fn optional_text(&mut self, attribute: &'static str) -> Result<Option<String>, FormatError> {
        let text = self.text(attribute)?;
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.to_string()))
        }
    }

    fn state(&mut self, attribute: &'static str) -> Result<ProcessingState, FormatError> {
        let text = self.text(attribute)?;
        ProcessingState::parse(text.trim()).ok_or_else(|| self.malformed(attribute, text))
    }

    fn rotation(&mut self, attribute: &'static str) -> Result<Rotation, FormatError> {
        let degrees = self.int(attribute)?;
        Rotation::from_degrees(degrees)
            .ok_or_else(|| self.malformed(attribute, &degrees.to_string()))
    }

    fn finish(self) -> Result<(), FormatError> {
        for name in self.map.keys() {
            if !self.taken.iter().any(|taken| taken == name) {
                return Err(FormatError::UnknownAttribute {
                    container: self.container,
                    index: self.index,
                    attribute: name.clone(),
                });
            }
        }
        Ok(())
    }
}

fn parse_floats(text: &str) -> Vec<f64> {
    text.split(',')
        .filter_map(|element| element.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> Document {
        let fields = ArtFields {
            types: vec!["tag".to_string(), "throwup".to_string(), "mural".to_string()],
            sizes: vec!["tiny".to_string(), "medium".to_string(), "huge".to_string()],
            qualities: vec!["bad".to_string(), "fair".to_string(), "excellent".to_string()],
            artists: vec!["Unknown".to_string(), "Daru".to_string(), "EWO".to_string()],
        };
        let states = vec![
            "unreviewed".to_string(),
            "needs_review".to_string(),
            "reviewed".to_string(),
        ];

        let photos = vec![
            PhotoRecord::new(
                1,
                "images/P9400741.JPG",
                (4112, 3884),
                PhotoOptions {
                    state: ProcessingState::Reviewed,
                    location: Some((44.0462, -123.0236)),
                    rotation: Rotation::Deg90,
                    created_time: Some(1_468_507_707.0),
                    modified_time: Some(1_468_509_000.5),
                    tags: vec!["alley".to_string(), "brick wall".to_string()],
                },
            ),
            PhotoRecord::new(
                2,
                "images/P9400919.JPG",
                (4112, 3884),
                PhotoOptions {
                    created_time: Some(1_468_507_608.0),
                    ..Default::default()
                },
            ),
        ];

        let arts = vec![
            ArtRecord::new(
                1,
                1,
                "throwup",
                ArtOptions {
                    artists: vec!["Daru".to_string()],
                    associates: vec!["EWO".to_string(), "PBR".to_string()],
                    size: "large".to_string(),
                    quality: "good".to_string(),
                    state: ProcessingState::Reviewed,
                    region: Some(Region::new(0.2, 0.13924050632911392, 0.7142857142857143, 0.3291139240506329)),
                    date: Some("2016".to_string()),
                    created_time: Some(1234.0),
                    modified_time: Some(1234.0),
                    ..Default::default()
                },
            ),
            ArtRecord::new(
                2,
                2,
                "tag",
                ArtOptions {
                    created_time: Some(1234.0),
                    modified_time: Some(1234.0),
                    ..Default::default()
                },
            ),
        ];

        Document {
            fields,
            states,
            photos,
            arts,
        }
    }

    #[test]
    fn encode_decode_round_trips_every_field() {
        let document = sample_document();
        let text = encode(
            &document.fields,
            &document.states,
            &document.photos,
            &document.arts,
        );
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded, document);
    }

    #[test]
    fn absent_optionals_encode_as_empty_and_decode_to_none() {
        let document = sample_document();
        let text = encode(
            &document.fields,
            &document.states,
            &document.photos,
            &document.arts,
        );

        assert!(text.contains(r#""location": """#));
        assert!(text.contains(r#""region": """#));
        assert!(text.contains(r#""date": """#));

        let decoded = decode(&text).unwrap();
        assert_eq!(decoded.photos[1].location(), None);
        assert_eq!(decoded.arts[1].region(), None);
        assert_eq!(decoded.arts[1].date(), None);
    }

    #[test]
    fn list_elements_are_trimmed_on_decode() {
        let document = sample_document();
        let mut text = encode(
            &document.fields,
            &document.states,
            &document.photos,
            &document.arts,
        );
        text = text.replace("EWO, PBR", "EWO ,  PBR");

        let decoded = decode(&text).unwrap();
        assert_eq!(decoded.arts[0].associates(), ["EWO", "PBR"]);
    }

    #[test]
    fn wrong_section_count_is_rejected() {
        let text = json!({"fields": {}, "photos": []}).to_string();
        assert_eq!(
            decode(&text),
            Err(FormatError::ChildCount {
                container: "document",
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn misnamed_section_is_rejected_by_position() {
        let text = json!({
            "fields": {"types": [], "sizes": [], "qualities": [], "states": [], "artists": []},
            "pics": [],
            "arts": []
        })
        .to_string();
        assert_eq!(
            decode(&text),
            Err(FormatError::Child {
                container: "document",
                index: 1,
                expected: "photos",
                actual: "pics".to_string(),
            })
        );
    }

    #[test]
    fn non_string_vocabulary_entry_is_rejected_with_its_position() {
        let text = json!({
            "fields": {"types": ["tag", 7], "sizes": [], "qualities": [], "states": [], "artists": []},
            "photos": [],
            "arts": []
        })
        .to_string();
        assert_eq!(
            decode(&text),
            Err(FormatError::Child {
                container: "types",
                index: 1,
                expected: "a string",
                actual: "a number".to_string(),
            })
        );
    }

    #[test]
    fn non_object_photo_is_rejected_with_its_position() {
        let text = json!({
            "fields": {"types": ["tag"], "sizes": ["tiny"], "qualities": ["fair"],
                        "states": ["unreviewed"], "artists": ["Unknown"]},
            "photos": ["oops"],
            "arts": []
        })
        .to_string();
        assert_eq!(
            decode(&text),
            Err(FormatError::Child {
                container: "photos",
                index: 0,
                expected: "an object",
                actual: "a string".to_string(),
            })
        );
    }

    #[test]
    fn missing_and_unknown_attributes_are_rejected() {
        let document = sample_document();
        let text = encode(
            &document.fields,
            &document.states,
            &document.photos,
            &document.arts,
        );

        let missing = text.replacen(r#""rotation": "90","#, "", 1);
        assert_eq!(
            decode(&missing),
            Err(FormatError::MissingAttribute {
                container: "photos",
                index: 0,
                attribute: "rotation",
            })
        );

        let unknown = text.replacen(
            r#""rotation": "90","#,
            r#""rotation": "90", "flavor": "mint","#,
            1,
        );
        assert_eq!(
            decode(&unknown),
            Err(FormatError::UnknownAttribute {
                container: "photos",
                index: 0,
                attribute: "flavor".to_string(),
            })
        );
    }

    #[test]
    fn malformed_pair_attributes_are_rejected() {
        let document = sample_document();
        let text = encode(
            &document.fields,
            &document.states,
            &document.photos,
            &document.arts,
        );

        let bad_resolution = text.replacen("4112x3884", "4112by3884", 1);
        assert!(matches!(
            decode(&bad_resolution),
            Err(FormatError::MalformedValue {
                attribute: "resolution",
                ..
            })
        ));

        let bad_region = text.replacen("0.2, 0.13924050632911392, ", "0.2, ", 1);
        assert!(matches!(
            decode(&bad_region),
            Err(FormatError::MalformedValue {
                attribute: "region",
                ..
            })
        ));
    }

    #[test]
    fn unparseable_text_is_a_syntax_error() {
        assert!(matches!(
            decode("not a document"),
            Err(FormatError::Syntax(_))
        ));
    }
}
