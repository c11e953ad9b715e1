use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the service's match precision score
pub const QUALITY_FIELD: &str = "quality";

/// One matched location as returned by the geocoding service.
///
/// Keys and values are kept as the service sent them. The service encodes
/// most numbers (including coordinates) as JSON strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Place(Map<String, Value>);

impl Place {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of a field, if it is a JSON string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the entry carries a non-empty `quality` score.
    ///
    /// `null`, `false`, `""` and empty containers count as empty. Any number,
    /// including 0, counts as present.
    pub fn has_quality(&self) -> bool {
        match self.0.get(QUALITY_FIELD) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(_) => true,
        }
    }

    /// (lat, lon) of the match, when the service included both
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.number("latitude")?, self.number("longitude")?))
    }

    fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Place {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Outcome of a geocode call.
///
/// `First` is produced when only the best match was requested, `All` when
/// every match was. Neither variant is an error when empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Matches {
    First(Option<Place>),
    All(Vec<Place>),
}

impl Matches {
    /// Keep the whole list, or only its first element
    pub fn select(places: Vec<Place>, all: bool) -> Self {
        if all {
            Matches::All(places)
        } else {
            Matches::First(places.into_iter().next())
        }
    }

    pub fn first(&self) -> Option<&Place> {
        match self {
            Matches::First(place) => place.as_ref(),
            Matches::All(places) => places.first(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Matches::First(place) => usize::from(place.is_some()),
            Matches::All(places) => places.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<Place> {
        match self {
            Matches::First(place) => place.into_iter().collect(),
            Matches::All(places) => places,
        }
    }
}
