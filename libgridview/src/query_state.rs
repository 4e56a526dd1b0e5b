//! Persisting the filter state in the host's navigable query state.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::warn;
use url::form_urlencoded;

use crate::config::GridConfig;
use crate::table::{FilterState, RowFilter};

/// Key-value state that survives reloads, such as the query part of a URL.
pub trait QueryState {
    fn get(&self, key: &str) -> Option<String>;
    /// Sets `key`, or removes it when `value` is `None`.
    fn set(&mut self, key: &str, value: Option<&str>);
}

/// Query parameters in `application/x-www-form-urlencoded` form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, String>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string. A leading `?` is ignored.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        Self {
            params: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.params)
            .finish()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl QueryState for QueryParams {
    fn get(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                self.params.insert(key.to_string(), value.to_string());
            }
            None => {
                self.params.remove(key);
            }
        }
    }
}

/// Shared parameters, so the host can read them back while the table writes them.
impl<Q: QueryState> QueryState for Rc<RefCell<Q>> {
    fn get(&self, key: &str) -> Option<String> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: Option<&str>) {
        self.borrow_mut().set(key, value);
    }
}

impl FilterState {
    /// Reads the filter state persisted by [`FilterState::store`].
    ///
    /// A row filter that does not parse is dropped.
    #[must_use]
    pub fn load(state: &dyn QueryState, config: &GridConfig) -> Self {
        let text = state.get(&config.filter_param).unwrap_or_default();
        let row_filter = state
            .get(&config.row_filter_param())
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match serde_json::from_str::<RowFilter>(&raw) {
                Ok(row_filter) => Some(row_filter),
                Err(e) => {
                    warn!("Ignoring persisted row filter '{raw}': {e}");
                    None
                }
            });
        Self { text, row_filter }
    }

    /// Writes the filter state. Empty parts are removed from the state.
    pub fn store(&self, state: &mut dyn QueryState, config: &GridConfig) {
        let text = Some(self.text.as_str()).filter(|text| !text.is_empty());
        state.set(&config.filter_param, text);

        let row_filter = self
            .row_filter
            .as_ref()
            .and_then(|row_filter| match serde_json::to_string(row_filter) {
                Ok(json) => Some(json),
                Err(e) => {
                    warn!("Failed to serialize row filter: {e}");
                    None
                }
            });
        state.set(&config.row_filter_param(), row_filter.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RowFilterOperator;
    use test_log::test;

    #[test]
    fn query_string_round_trip() {
        let mut params = QueryParams::parse("?page=2&filter=a%20b");
        assert_eq!(params.get("filter").as_deref(), Some("a b"));
        params.set("filter", Some("x&y=z"));
        params.set("page", None);

        let reparsed = QueryParams::parse(&params.to_query_string());
        assert_eq!(reparsed.get("filter").as_deref(), Some("x&y=z"));
        assert_eq!(reparsed.get("page"), None);
    }

    #[test]
    fn filter_state_round_trip() {
        let config = GridConfig::default();
        let filter = FilterState {
            text: "anna".to_string(),
            row_filter: Some(RowFilter::new("email", RowFilterOperator::IsEmpty, "1")),
        };
        let mut params = QueryParams::new();
        filter.store(&mut params, &config);

        let reparsed = QueryParams::parse(&params.to_query_string());
        let restored = FilterState::load(&reparsed, &config);
        assert_eq!(restored, filter);
    }

    #[test]
    fn missing_state_loads_empty() {
        let restored = FilterState::load(&QueryParams::new(), &GridConfig::default());
        assert_eq!(restored, FilterState::default());
    }

    #[test]
    fn malformed_row_filter_is_dropped() {
        let params = QueryParams::parse("filter=x&filter_row=%7Bnot%20json");
        let restored = FilterState::load(&params, &GridConfig::default());
        assert_eq!(restored.text, "x");
        assert_eq!(restored.row_filter, None);
    }

    #[test]
    fn legacy_operator_name_is_accepted() {
        let params = QueryParams::parse(
            "filter_row=%7B%22field%22%3A%22name%22%2C%22operator%22%3A%22isequal%22%2C%22operand%22%3A%22b%22%7D",
        );
        let restored = FilterState::load(&params, &GridConfig::default());
        assert_eq!(
            restored.row_filter,
            Some(RowFilter::new("name", RowFilterOperator::Equals, "b"))
        );
    }

    #[test]
    fn empty_filters_remove_their_keys() {
        let config = GridConfig::default();
        let mut params = QueryParams::parse("filter=old&filter_row=%7B%7D&keep=1");
        FilterState::default().store(&mut params, &config);
        assert_eq!(params.to_query_string(), "keep=1");
    }
}
