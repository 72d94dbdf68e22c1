//! Active note filters and their two-way sync with the URL query.

use std::collections::BTreeMap;
use std::fmt;

/// Path whose query string carries the filters.
pub const NOTES_PATH: &str = "/notes";

/// Query keys the note list endpoint understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Creator,
    Country,
    Tag,
    Skip,
    Limit,
}

impl FilterKey {
    pub const ALL: [FilterKey; 5] = [
        FilterKey::Creator,
        FilterKey::Country,
        FilterKey::Tag,
        FilterKey::Skip,
        FilterKey::Limit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::Creator => "creator",
            FilterKey::Country => "country",
            FilterKey::Tag => "tag",
            FilterKey::Skip => "skip",
            FilterKey::Limit => "limit",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized filter keys mapped to their values. Keys are unique and iterate
/// in a fixed order, so two equal sets always serialize identically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSet(BTreeMap<FilterKey, String>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the recognized keys of `pairs`; a later duplicate wins.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (k, v) in pairs {
            if let Some(key) = FilterKey::parse(k.as_ref()) {
                set.0.insert(key, v.into());
            }
        }
        set
    }

    /// Parse `a=1&b=2` (a leading `?` is allowed).
    pub fn parse_query(query: &str) -> Self {
        Self::from_pairs(parse_query_pairs(query))
    }

    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", k.as_str(), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn insert(&mut self, key: FilterKey, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }

    pub fn remove(&mut self, key: FilterKey) -> Option<String> {
        self.0.remove(&key)
    }

    /// Union with `other`; `other`'s values win on shared keys.
    pub fn merge(&mut self, other: &FilterSet) {
        for (k, v) in &other.0 {
            self.0.insert(*k, v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

pub(crate) fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (k, v) = part.split_once('=').unwrap_or((part, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|c| c.into_owned())
        .unwrap_or(spaced)
}

/// A router location: path plus raw query pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Route {
    pub fn new(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// Split `"/notes?creator=x"` into path and query.
    pub fn parse(href: &str) -> Self {
        let (path, query) = href.split_once('?').unwrap_or((href, ""));
        Self::new(path, parse_query_pairs(query))
    }

    pub fn filters(&self) -> FilterSet {
        FilterSet::from_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }
}

/// Canonical form of a route used by the duplicate guard.
pub fn route_key(path: &str, filters: &FilterSet) -> String {
    format!("{path}?{}", filters.to_query_string())
}

/// `"/notes?creator=x"` for the given filters.
pub fn notes_href(filters: &FilterSet) -> String {
    if filters.is_empty() {
        NOTES_PATH.to_string()
    } else {
        format!("{NOTES_PATH}?{}", filters.to_query_string())
    }
}

/// Link to the notes filtered by a single key.
pub fn filter_href(key: FilterKey, value: &str) -> String {
    let mut f = FilterSet::new();
    f.insert(key, value);
    notes_href(&f)
}

/// Result of feeding a route change into the [`FilterRouter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reconcile {
    /// Nothing changed; do not fetch.
    Skip,
    /// Fetch with these filters and write them back to the URL.
    Apply(FilterSet),
}

/// Owns the canonical filter set.
///
/// Inbound queries are merged, never replacing the whole set, so filters the
/// user added earlier survive navigation that only touches one key.
#[derive(Clone, Debug, Default)]
pub struct FilterRouter {
    active: FilterSet,
    /// Key of the last route handed to `reconcile`.
    last_route: Option<String>,
    /// Key of the URL this router last wrote; its echo is ignored.
    written: Option<String>,
}

impl FilterRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &FilterSet {
        &self.active
    }

    pub fn reconcile(&mut self, route: &Route) -> Reconcile {
        let incoming = route.filters();
        let key = route_key(&route.path, &incoming);

        if self.last_route.as_deref() == Some(key.as_str()) {
            return Reconcile::Skip;
        }
        self.last_route = Some(key.clone());

        if self.written.take().as_deref() == Some(key.as_str()) {
            return Reconcile::Skip;
        }
        if route.path != NOTES_PATH {
            return Reconcile::Skip;
        }

        self.active.merge(&incoming);
        self.written = Some(route_key(NOTES_PATH, &self.active));
        Reconcile::Apply(self.active.clone())
    }

    /// Drop `key`; `None` when it was not active.
    pub fn remove(&mut self, key: FilterKey) -> Option<FilterSet> {
        self.active.remove(key)?;
        let canonical = route_key(NOTES_PATH, &self.active);
        self.written = Some(canonical.clone());
        self.last_route = Some(canonical);
        Some(self.active.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn notes(query: &str) -> Route {
        Route::parse(&format!("{NOTES_PATH}?{query}"))
    }

    #[test]
    fn test_unrecognized_keys_are_dropped() {
        let f = FilterSet::parse_query("?creator=ali&page=2&tag=food");
        assert_eq!(f.len(), 2);
        assert_eq!(f.get(FilterKey::Creator), Some("ali"));
        assert_eq!(f.get(FilterKey::Tag), Some("food"));
    }

    #[test]
    fn test_query_decoding() {
        let f = FilterSet::parse_query("country=New+Zealand&tag=caf%C3%A9");
        assert_eq!(f.get(FilterKey::Country), Some("New Zealand"));
        assert_eq!(f.get(FilterKey::Tag), Some("café"));
    }

    #[test]
    fn test_query_encoding_is_stable() {
        let mut a = FilterSet::new();
        a.insert(FilterKey::Tag, "x y");
        a.insert(FilterKey::Creator, "u");
        let mut b = FilterSet::new();
        b.insert(FilterKey::Creator, "u");
        b.insert(FilterKey::Tag, "x y");
        assert_eq!(a.to_query_string(), "creator=u&tag=x%20y");
        assert_eq!(a.to_query_string(), b.to_query_string());
    }

    #[test]
    fn test_merge_keeps_existing_and_overrides_shared() {
        let mut r = FilterRouter::new();
        assert_eq!(
            r.reconcile(&notes("country=Iran")),
            Reconcile::Apply(FilterSet::parse_query("country=Iran"))
        );
        let out = r.reconcile(&notes("creator=ali"));
        assert_eq!(
            out,
            Reconcile::Apply(FilterSet::parse_query("country=Iran&creator=ali"))
        );
        let out = r.reconcile(&notes("creator=sara"));
        assert_eq!(
            out,
            Reconcile::Apply(FilterSet::parse_query("country=Iran&creator=sara"))
        );
    }

    #[test]
    fn test_same_route_twice_applies_once() {
        let mut r = FilterRouter::new();
        r.reconcile(&notes("country=Iran"));
        // The prior filter makes the canonical URL differ from the route.
        assert!(matches!(r.reconcile(&notes("creator=ali")), Reconcile::Apply(_)));
        assert_eq!(r.reconcile(&notes("creator=ali")), Reconcile::Skip);
    }

    #[test]
    fn test_echo_of_written_url_is_skipped() {
        let mut r = FilterRouter::new();
        r.reconcile(&notes("country=Iran"));
        r.reconcile(&notes("creator=ali"));
        assert_eq!(r.reconcile(&notes("country=Iran&creator=ali")), Reconcile::Skip);
        // A later click on the same link is a fresh navigation.
        assert!(matches!(r.reconcile(&notes("creator=ali")), Reconcile::Apply(_)));
    }

    #[test]
    fn test_other_paths_are_ignored() {
        let mut r = FilterRouter::new();
        assert_eq!(r.reconcile(&Route::parse("/about?creator=x")), Reconcile::Skip);
        assert!(r.active().is_empty());
    }

    #[test]
    fn test_remove_filter() {
        let mut r = FilterRouter::new();
        r.reconcile(&notes("country=Iran&tag=food"));
        let left = r.remove(FilterKey::Tag).expect("tag was active");
        assert_eq!(left, FilterSet::parse_query("country=Iran"));
        assert_eq!(r.remove(FilterKey::Tag), None);
        // The router's own write comes back as a route change.
        assert_eq!(r.reconcile(&notes("country=Iran")), Reconcile::Skip);
    }

    #[test]
    fn test_notes_href() {
        assert_eq!(notes_href(&FilterSet::new()), "/notes");
        assert_eq!(
            notes_href(&FilterSet::parse_query("tag=a")),
            "/notes?tag=a"
        );
    }

    #[test]
    fn test_filter_href() {
        assert_eq!(filter_href(FilterKey::Creator, "ali"), "/notes?creator=ali");
        assert_eq!(
            filter_href(FilterKey::Country, "New Zealand"),
            "/notes?country=New%20Zealand"
        );
    }

    fn filter_set() -> impl Strategy<Value = FilterSet> {
        proptest::collection::btree_map(0usize..5, "\\PC{0,12}", 0..5).prop_map(|m| {
            let mut set = FilterSet::new();
            for (i, v) in m {
                set.insert(FilterKey::ALL[i], v);
            }
            set
        })
    }

    proptest! {
        #[test]
        fn prop_query_round_trip(set in filter_set()) {
            let parsed = FilterSet::parse_query(&set.to_query_string());
            prop_assert_eq!(parsed, set);
        }
    }
}
