use std::collections::BTreeMap;

pub const DEFAULT_LOCALE: &str = "de_DE";
pub const DEFAULT_FLAGS: &str = "JXTR";
/// Forward geocoding: locale-aware names
pub const FIND_GFLAGS: &str = "L";
/// Reverse geocoding: locale-aware names, coordinate input
pub const LOOKUP_GFLAGS: &str = "LR";

/// Service query parameters. `None` fields inherit from the defaults on merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub locale: Option<String>,
    pub flags: Option<String>,
    pub gflags: Option<String>,
    pub appid: Option<String>,
    /// Any other parameter the service understands
    pub extra: BTreeMap<String, String>,
}

impl QueryParams {
    /// Set a parameter by its wire name
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            "locale" => self.locale = Some(value),
            "flags" => self.flags = Some(value),
            "gflags" => self.gflags = Some(value),
            "appid" => self.appid = Some(value),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// Fill unset fields from `defaults`. Values already set win.
    pub fn merged_over(self, defaults: &QueryParams) -> QueryParams {
        let mut extra = defaults.extra.clone();
        extra.extend(self.extra);
        QueryParams {
            locale: self.locale.or_else(|| defaults.locale.clone()),
            flags: self.flags.or_else(|| defaults.flags.clone()),
            gflags: self.gflags.or_else(|| defaults.gflags.clone()),
            appid: self.appid.or_else(|| defaults.appid.clone()),
            extra,
        }
    }

    /// Wire pairs in a stable order: the four named params, then extras.
    ///
    /// `location` is owned by the client and never taken from `extra`.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let named = [
            ("locale", &self.locale),
            ("flags", &self.flags),
            ("gflags", &self.gflags),
            ("appid", &self.appid),
        ];

        let mut pairs: Vec<(String, String)> = named
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
            .collect();

        pairs.extend(
            self.extra
                .iter()
                .filter(|(key, _)| key.as_str() != "location" && !key.starts_with("location["))
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs
    }
}

/// Per-call options for `find`, `lookup` and `geocode`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Return every match instead of only the first
    pub all: Option<bool>,
    /// Return service-native fields instead of the summary field set
    pub raw: Option<bool>,
    pub params: QueryParams,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_all(mut self, all: bool) -> Self {
        self.all = Some(all);
        self
    }

    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.params.locale = Some(locale.into());
        self
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.params.flags = Some(flags.into());
        self
    }

    pub fn with_gflags(mut self, gflags: impl Into<String>) -> Self {
        self.params.gflags = Some(gflags.into());
        self
    }

    pub fn with_appid(mut self, appid: impl Into<String>) -> Self {
        self.params.appid = Some(appid.into());
        self
    }

    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.set(key, value);
        self
    }

    /// Fill unset options from `defaults`. Values already set win.
    pub fn merged_over(self, defaults: &QueryOptions) -> QueryOptions {
        QueryOptions {
            all: self.all.or(defaults.all),
            raw: self.raw.or(defaults.raw),
            params: self.params.merged_over(&defaults.params),
        }
    }

    /// Base defaults shared by every entry point
    pub(crate) fn service_defaults(app_id: &str, gflags: &str) -> QueryOptions {
        QueryOptions {
            all: Some(false),
            raw: None,
            params: QueryParams {
                locale: Some(DEFAULT_LOCALE.to_string()),
                flags: Some(DEFAULT_FLAGS.to_string()),
                gflags: Some(gflags.to_string()),
                appid: Some(app_id.to_string()),
                extra: BTreeMap::new(),
            },
        }
    }

    pub(crate) fn all_or_default(&self) -> bool {
        self.all.unwrap_or(false)
    }

    pub(crate) fn raw_or_default(&self) -> bool {
        self.raw.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_values_win_over_defaults() {
        let defaults = QueryOptions::service_defaults("app", FIND_GFLAGS);
        let merged = QueryOptions::new()
            .with_all(true)
            .with_locale("en_US")
            .merged_over(&defaults);

        assert_eq!(merged.all, Some(true));
        assert_eq!(merged.params.locale.as_deref(), Some("en_US"));
        assert_eq!(merged.params.flags.as_deref(), Some(DEFAULT_FLAGS));
        assert_eq!(merged.params.gflags.as_deref(), Some("L"));
        assert_eq!(merged.params.appid.as_deref(), Some("app"));
    }

    #[test]
    fn test_merge_leaves_defaults_untouched() {
        let defaults = QueryOptions::service_defaults("app", LOOKUP_GFLAGS);
        let snapshot = defaults.clone();
        let _ = QueryOptions::new()
            .with_gflags("X")
            .with_param("count", "5")
            .merged_over(&defaults);
        assert_eq!(defaults, snapshot);
    }

    #[test]
    fn test_set_routes_named_params() {
        let mut params = QueryParams::default();
        params.set("gflags", "AC");
        params.set("count", "3");
        assert_eq!(params.gflags.as_deref(), Some("AC"));
        assert_eq!(params.extra.get("count").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_query_pairs_order_and_location_guard() {
        let opts = QueryOptions::new()
            .with_param("start", "0")
            .with_param("location", "ignored")
            .with_param("location[0]", "ignored")
            .with_param("locationtype", "city")
            .merged_over(&QueryOptions::service_defaults("id", FIND_GFLAGS));

        let keys: Vec<String> = opts.params.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["locale", "flags", "gflags", "appid", "locationtype", "start"]
        );
    }

    #[test]
    fn test_unset_flags_fall_back() {
        let opts = QueryOptions::new();
        assert!(!opts.all_or_default());
        assert!(opts.raw_or_default());
    }
}
