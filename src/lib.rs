//! placefinder - Geocode place names and coordinates through the PlaceFinder web service

pub mod api;
pub mod config;
pub mod domain;
pub mod error;

pub use api::{PlacefinderClient, QueryOptions, QueryParams};
pub use config::{FileConfig, ServiceConfig};
pub use domain::{FieldRule, Location, Matches, Place};
pub use error::{ConfigError, GeocodeError, MappingError};
