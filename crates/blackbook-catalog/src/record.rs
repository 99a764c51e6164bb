use crate::error::SchemaError;
use crate::models::ProcessingState;
use crate::region::Region;

/// A single field value passing through the dynamic record interface.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    Resolution(u32, u32),
    Location(f64, f64),
    Region(Region),
    State(ProcessingState),
    /// An optional field with nothing in it.
    Empty,
}

impl Value {
    /// Short description of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "an integer",
            Value::Float(_) => "a float",
            Value::Text(_) => "a string",
            Value::List(_) => "a string list",
            Value::Resolution(..) => "a resolution pair",
            Value::Location(..) => "a location pair",
            Value::Region(_) => "a region",
            Value::State(_) => "a processing state",
            Value::Empty => "nothing",
        }
    }
}

/// Dictionary-style access to a record with a fixed key set.
///
/// Concrete schemas expose typed accessors as well; this trait is the
/// uniform surface an editor binds its widgets against. Keys split into
/// an immutable set, fixed at construction, and a mutable set that may
/// be rewritten any number of times.
pub trait Record {
    /// Every key the record declares, immutable ones included.
    fn keys(&self) -> &'static [&'static str];

    /// The subset of keys that may be rewritten after construction.
    fn mutable_keys(&self) -> &'static [&'static str];

    /// Look up a declared key.
    fn get(&self, key: &str) -> Result<Value, SchemaError>;

    /// Rewrite a mutable key. Writes to immutable or undeclared keys
    /// are rejected and leave the record untouched.
    fn set(&mut self, key: &str, value: Value) -> Result<(), SchemaError>;
}
