//! Image-metadata collaborator: pulls capture time, pixel resolution,
//! and display rotation out of a photograph's EXIF block. Unreadable or
//! missing metadata degrades to zero/empty defaults — ingesting a photo
//! never fails over its metadata.

pub mod exif;
