//! Client for the PlaceFinder `/geocode` endpoint.
//!
//! Every call is one blocking GET followed by a JSON decode. Entries under
//! `ResultSet.Results` without a `quality` score are discarded before the
//! caller sees them.

use serde_json::Value;
use tracing::{debug, warn};

use super::options::{FIND_GFLAGS, LOOKUP_GFLAGS, QueryOptions};
use crate::config::ServiceConfig;
use crate::domain::{Location, Matches, Place, map_places, summary_fields};
use crate::error::GeocodeError;

const USER_AGENT: &str = concat!("placefinder/", env!("CARGO_PKG_VERSION"));

/// Blocking geocoding client.
///
/// Holds no per-call state and can be shared across threads.
#[derive(Debug, Clone)]
pub struct PlacefinderClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    app_id: String,
}

impl PlacefinderClient {
    /// Build a client for the host, app id and timeout in `config`.
    ///
    /// # Errors
    /// * `GeocodeError::Transport` if the HTTP client cannot be constructed
    pub fn new(config: &ServiceConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            app_id: config.app_id.clone(),
        })
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Find coordinates for one location name or several.
    ///
    /// Defaults: first match only, service-native fields, `gflags=L`.
    pub fn find(
        &self,
        name: impl Into<Location>,
        options: QueryOptions,
    ) -> Result<Matches, GeocodeError> {
        let defaults = QueryOptions::service_defaults(&self.app_id, FIND_GFLAGS);
        self.geocode_with(name.into(), options.merged_over(&defaults))
    }

    /// Reverse-geocode a coordinate pair.
    ///
    /// The pair is sent unlabeled as `location=<lat>,<lon>` with `gflags=LR`.
    /// Coordinates are formatted from `f64`, so caller-side padding is not
    /// kept: `48.1370` goes out as `48.137`.
    pub fn lookup(&self, lat: f64, lon: f64, options: QueryOptions) -> Result<Matches, GeocodeError> {
        let defaults = QueryOptions::service_defaults(&self.app_id, LOOKUP_GFLAGS);
        self.geocode_with(
            Location::from_coordinates(lat, lon),
            options.merged_over(&defaults),
        )
    }

    /// Query the service and shape the matches according to `options`.
    ///
    /// # Returns
    /// * `Matches::First` when `all` is false (the default), `Matches::All` otherwise
    ///
    /// # Errors
    /// * `GeocodeError::Transport` on connection failure or timeout
    /// * `GeocodeError::EmptyResponse` if the body is empty
    /// * `GeocodeError::Json` / `GeocodeError::UnexpectedShape` on malformed bodies
    pub fn geocode(
        &self,
        location: impl Into<Location>,
        options: QueryOptions,
    ) -> Result<Matches, GeocodeError> {
        let defaults = QueryOptions::service_defaults(&self.app_id, FIND_GFLAGS);
        self.geocode_with(location.into(), options.merged_over(&defaults))
    }

    /// Send one request with options that already carry their defaults
    fn geocode_with(
        &self,
        location: Location,
        options: QueryOptions,
    ) -> Result<Matches, GeocodeError> {
        let mut query = options.params.query_pairs();
        query.extend(location.query_pairs());

        debug!(endpoint = %self.endpoint, ?location, "sending geocode request");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .inspect_err(|e| warn!(error = %e, "geocode request failed"))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "geocoding service returned non-success status");
        }

        let body = response.text()?;
        let places = parse_places(&body)
            .inspect_err(|e| warn!(error = %e, "discarding geocoding response"))?;

        let places = if options.raw_or_default() {
            places
        } else {
            map_places(&places, &summary_fields())?
        };

        debug!(count = places.len(), "geocode matches kept");
        Ok(Matches::select(places, options.all_or_default()))
    }
}

/// Decode a response body into the quality-bearing result entries.
pub fn parse_places(body: &str) -> Result<Vec<Place>, GeocodeError> {
    if body.trim().is_empty() {
        return Err(GeocodeError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(body)?;
    match value {
        Value::Object(_) | Value::Array(_) => Ok(extract_results(&value)),
        other => Err(GeocodeError::UnexpectedShape(json_kind(&other))),
    }
}

/// Entries under `ResultSet.Results` that carry a quality score, in order
fn extract_results(value: &Value) -> Vec<Place> {
    let entries: Vec<&Value> = match value.get("ResultSet").and_then(|rs| rs.get("Results")) {
        Some(Value::Array(items)) => items.iter().collect(),
        // Some service versions key results by index instead of using an array
        Some(Value::Object(map)) if !map.is_empty() && map.values().all(Value::is_object) => {
            map.values().collect()
        }
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(Value::as_object)
        .map(|fields| Place::from(fields.clone()))
        .filter(Place::has_quality)
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_places_filters_by_quality() {
        let json = r#"{
            "ResultSet": {
                "Error": 0,
                "Found": 2,
                "Results": [
                    {"quality": 87, "woeid": "12832361", "city": "Munich"},
                    {"woeid": "676757", "city": "Munich"}
                ]
            }
        }"#;

        let places = parse_places(json).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].get_str("woeid"), Some("12832361"));
    }

    #[test]
    fn test_parse_places_keeps_service_order() {
        let json = r#"{"ResultSet": {"Results": [
            {"quality": 40, "woeid": "a"},
            {"quality": 99, "woeid": "b"},
            {"quality": "", "woeid": "c"},
            {"quality": 10, "woeid": "d"}
        ]}}"#;

        let places = parse_places(json).unwrap();
        let woeids: Vec<&str> = places.iter().filter_map(|p| p.get_str("woeid")).collect();
        assert_eq!(woeids, vec!["a", "b", "d"]);
    }

    #[test]
    fn test_parse_places_indexed_results_object() {
        let json = r#"{"ResultSet": {"Results": {
            "0": {"quality": 72, "city": "Bonn"},
            "1": {"city": "Köln"}
        }}}"#;

        let places = parse_places(json).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].get_str("city"), Some("Bonn"));
    }

    #[test]
    fn test_parse_places_single_result_object() {
        let json = r#"{"ResultSet": {"Results": {"quality": 72, "city": "Bonn"}}}"#;
        let places = parse_places(json).unwrap();
        assert_eq!(places.len(), 1);
    }

    #[test]
    fn test_parse_places_without_results() {
        assert!(parse_places(r#"{"ResultSet": {"Error": 100}}"#).unwrap().is_empty());
        assert!(parse_places("[]").unwrap().is_empty());
        assert!(parse_places(r#"{"ResultSet": {"Results": []}}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_places_failures() {
        assert!(matches!(parse_places(""), Err(GeocodeError::EmptyResponse)));
        assert!(matches!(parse_places("  \n"), Err(GeocodeError::EmptyResponse)));
        assert!(matches!(parse_places("<html>"), Err(GeocodeError::Json(_))));
        assert!(matches!(
            parse_places("\"oops\""),
            Err(GeocodeError::UnexpectedShape("string"))
        ));
        assert!(matches!(
            parse_places("42"),
            Err(GeocodeError::UnexpectedShape("number"))
        ));
    }

    #[test]
    fn test_client_endpoint_from_config() {
        let config = ServiceConfig::default();
        let client = PlacefinderClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://where.yahooapis.com/geocode");
    }
}
