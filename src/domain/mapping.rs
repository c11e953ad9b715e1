use serde_json::Value;

use super::place::Place;
use crate::error::MappingError;

/// How one output field is produced from a result item
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Copy a source field. A missing field maps to `null`.
    Copy(String),
    /// Compute the value from the whole item. `None` leaves the field out.
    Transform(fn(&Place) -> Option<Value>),
    /// Copy a source field that must exist.
    Member(String),
}

impl FieldRule {
    pub fn copy(source: impl Into<String>) -> Self {
        FieldRule::Copy(source.into())
    }

    pub fn member(source: impl Into<String>) -> Self {
        FieldRule::Member(source.into())
    }

    fn resolve(&self, place: &Place) -> Result<Option<Value>, MappingError> {
        match self {
            FieldRule::Copy(source) => Ok(Some(place.get(source).cloned().unwrap_or(Value::Null))),
            FieldRule::Transform(f) => Ok(f(place)),
            FieldRule::Member(source) => place
                .get(source)
                .cloned()
                .map(Some)
                .ok_or_else(|| MappingError::MissingField(source.clone())),
        }
    }
}

/// Ordered table of output field name -> rule
pub type FieldMap = Vec<(String, FieldRule)>;

/// Reduced field set returned when raw output is not requested
pub fn summary_fields() -> FieldMap {
    [
        ("woeid", "woeid"),
        ("city", "city"),
        ("zip", "uzip"),
        ("country", "country"),
        ("countrycode", "countrycode"),
    ]
    .into_iter()
    .map(|(key, source)| (key.to_string(), FieldRule::copy(source)))
    .collect()
}

/// Remap every item through `map`.
///
/// Inputs are left untouched. Items whose mapping comes out empty are
/// dropped from the result.
pub fn map_places(places: &[Place], map: &[(String, FieldRule)]) -> Result<Vec<Place>, MappingError> {
    let mut mapped = Vec::with_capacity(places.len());
    for place in places {
        let out = map_place(place, map)?;
        if !out.is_empty() {
            mapped.push(out);
        }
    }
    Ok(mapped)
}

fn map_place(place: &Place, map: &[(String, FieldRule)]) -> Result<Place, MappingError> {
    let mut out = Place::new();
    for (key, rule) in map {
        if let Some(value) = rule.resolve(place)? {
            out.insert(key.clone(), value);
        }
    }
    Ok(out)
}
