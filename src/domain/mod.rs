pub mod location;
pub mod mapping;
pub mod place;

pub use location::Location;
pub use mapping::{FieldMap, FieldRule, map_places, summary_fields};
pub use place::{Matches, Place};
