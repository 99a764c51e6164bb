//! Track-interpolation collaborator: turns timestamped GPS samples into
//! photo locations. The catalogue supplies capture timestamps and
//! consumes the interpolated (latitude, longitude) pairs; where the
//! samples come from is this crate's problem alone.

pub mod track;
