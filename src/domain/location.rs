/// Query term sent as the `location` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Free-form name, address, or "lat,lon" pair
    Name(String),
    /// Several names, sent as `location[0]`, `location[1]`, ...
    Names(Vec<String>),
}

impl Location {
    /// Build the unlabeled "lat,lon" term used for reverse geocoding
    pub fn from_coordinates(lat: f64, lon: f64) -> Self {
        Location::Name(format!("{lat},{lon}"))
    }

    /// Query pairs for this term
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match self {
            Location::Name(name) => vec![("location".to_string(), name.clone())],
            Location::Names(names) => names
                .iter()
                .enumerate()
                .map(|(i, name)| (format!("location[{i}]"), name.clone()))
                .collect(),
        }
    }
}

impl From<&str> for Location {
    fn from(name: &str) -> Self {
        Location::Name(name.to_string())
    }
}

impl From<String> for Location {
    fn from(name: String) -> Self {
        Location::Name(name)
    }
}

impl From<Vec<String>> for Location {
    fn from(names: Vec<String>) -> Self {
        Location::Names(names)
    }
}

impl From<&[&str]> for Location {
    fn from(names: &[&str]) -> Self {
        Location::Names(names.iter().map(|s| s.to_string()).collect())
    }
}
