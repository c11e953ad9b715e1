pub mod options;
pub mod placefinder;

pub use options::{QueryOptions, QueryParams};
pub use placefinder::{PlacefinderClient, parse_places};
