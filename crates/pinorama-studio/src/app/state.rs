use indexmap::IndexMap;
use pinorama_types::{
    build_payload, created_at, FacetRequest, FacetResult, Introspection, SearchParams, WhereClause,
};
use ratatui::widgets::TableState;
use serde_json::Value;

use super::filters::FilterSelection;
use crate::format::TimeZoneMode;
use crate::messages::{Locale, Messages};

/// Approximate width of a terminal cell in pixels, used to size columns
const CELL_PIXELS: u16 = 8;

/// Column width for schema properties without column settings
const FALLBACK_WIDTH: u16 = 20;

/// Which part of the explorer receives keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Logs,
    Search,
    Filters,
}

/// State of the link with the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Connection {
    Connecting,
    Connected,
    /// Paused by the user
    Disconnected,
    Unreachable(String),
}

/// State of the log query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogsStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub property: String,
    pub title: String,
    pub visible: bool,
    pub width: u16,
}

/// A search the runner should send, tagged with the query generation
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub generation: u64,
    pub payload: SearchParams,
    /// Append the rows (live polling) instead of replacing them
    pub append: bool,
    /// Facet counts to fetch alongside the rows
    pub facets: Option<SearchParams>,
}

/// A selectable value in the filters panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterEntry {
    pub property: String,
    pub key: String,
    pub count: usize,
}

/// UI-specific transient state
pub struct UiState {
    pub focus: Focus,
    /// Search text being edited
    pub search_input: String,
    pub help_visible: bool,
    pub filters_visible: bool,
    pub details_visible: bool,
    pub columns_visible: bool,
    pub table_state: TableState,
    pub filter_cursor: usize,
    pub column_cursor: usize,
    pub details_scroll: u16,
    /// Rows visible in the table, updated on render
    pub page_size: usize,
    pub time_zone: TimeZoneMode,
    pub error_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Logs,
            search_input: String::new(),
            help_visible: false,
            filters_visible: false,
            details_visible: false,
            columns_visible: false,
            table_state: TableState::default(),
            filter_cursor: 0,
            column_cursor: 0,
            details_scroll: 0,
            page_size: 20,
            time_zone: TimeZoneMode::Local,
            error_message: None,
        }
    }
}

/// Global studio state
pub struct AppState {
    pub server_url: String,
    pub locale: Locale,
    pub connection: Connection,
    pub introspection: Option<Introspection>,
    pub columns: Vec<Column>,
    pub rows: Vec<Value>,
    pub status: LogsStatus,
    /// A search is in flight
    pub fetching: bool,
    /// Bumped whenever the query changes; older responses are dropped
    pub generation: u64,
    /// Applied search text
    pub search_text: String,
    pub filters: FilterSelection,
    pub facets: IndexMap<String, FacetResult>,
    pub live: bool,
    pub facet_limit: usize,
    pub ui_state: UiState,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(server_url: impl Into<String>, locale: Locale) -> Self {
        Self {
            server_url: server_url.into(),
            locale,
            connection: Connection::Connecting,
            introspection: None,
            columns: Vec::new(),
            rows: Vec::new(),
            status: LogsStatus::Loading,
            fetching: false,
            generation: 0,
            search_text: String::new(),
            filters: FilterSelection::default(),
            facets: IndexMap::new(),
            live: false,
            facet_limit: 20,
            ui_state: UiState::default(),
            should_quit: false,
        }
    }

    pub fn messages(&self) -> &'static Messages {
        self.locale.messages()
    }

    // ------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------

    pub fn set_introspection(&mut self, intro: Introspection) {
        self.columns = columns_for(&intro);
        self.introspection = Some(intro);
        self.connection = Connection::Connected;
        self.ui_state.column_cursor = 0;
    }

    pub fn connection_failed(&mut self, message: String) {
        self.connection = Connection::Unreachable(message.clone());
        self.status = LogsStatus::Failed(message);
        self.fetching = false;
    }

    pub fn connect(&mut self) {
        self.connection = Connection::Connecting;
        self.status = LogsStatus::Loading;
    }

    /// Stop talking to the server; in-flight responses are discarded
    pub fn disconnect(&mut self) {
        self.connection = Connection::Disconnected;
        self.generation += 1;
        self.fetching = false;
    }

    pub fn is_connected(&self) -> bool {
        self.connection == Connection::Connected
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn where_clause(&self) -> WhereClause {
        match &self.introspection {
            Some(intro) => self.filters.to_where(intro),
            None => WhereClause::new(),
        }
    }

    /// The clear-filters control applies when a search text or a filter is set
    pub fn show_clear_filters(&self) -> bool {
        !self.search_text.is_empty() || !self.filters.is_empty()
    }

    /// Creation time of the newest row, used as the live-mode cursor
    pub fn cursor(&self) -> Option<i64> {
        self.rows.iter().rev().find_map(created_at)
    }

    /// Start the query over: drop rows and selection, fetch from scratch
    pub fn restart_query(&mut self) -> Option<FetchRequest> {
        if !self.is_connected() {
            return None;
        }
        self.generation += 1;
        self.rows.clear();
        self.status = LogsStatus::Loading;
        self.ui_state.table_state.select(None);
        self.ui_state.details_scroll = 0;
        Some(self.fetch_request(false))
    }

    /// Re-run the current query, keeping rows on screen until it completes
    pub fn refetch(&mut self) -> Option<FetchRequest> {
        if !self.is_connected() {
            return None;
        }
        self.generation += 1;
        Some(self.fetch_request(false))
    }

    /// Next live poll, if one is due
    pub fn poll_request(&mut self) -> Option<FetchRequest> {
        if !self.live || !self.is_connected() || self.fetching || self.status != LogsStatus::Ready {
            return None;
        }
        Some(self.fetch_request(true))
    }

    fn fetch_request(&mut self, append: bool) -> FetchRequest {
        self.fetching = true;
        let filters = self.where_clause();
        let cursor = if append { self.cursor() } else { None };
        let payload = build_payload(Some(&self.search_text), Some(&filters), cursor);
        let facets = if !append || self.ui_state.filters_visible {
            self.facets_payload(&filters)
        } else {
            None
        };

        FetchRequest {
            generation: self.generation,
            payload,
            append,
            facets,
        }
    }

    fn facets_payload(&self, filters: &WhereClause) -> Option<SearchParams> {
        let intro = self.introspection.as_ref()?;
        if intro.facets.is_empty() {
            return None;
        }
        let request = FacetRequest {
            limit: Some(self.facet_limit),
            ..Default::default()
        };
        Some(SearchParams {
            limit: Some(0),
            sort_by: None,
            facets: Some(
                intro
                    .facets
                    .keys()
                    .map(|property| (property.clone(), request.clone()))
                    .collect(),
            ),
            ..build_payload(Some(&self.search_text), Some(filters), None)
        })
    }

    /// Apply fetched rows; returns false for stale responses
    pub fn logs_loaded(&mut self, generation: u64, rows: Vec<Value>, append: bool) -> bool {
        if generation != self.generation {
            return false;
        }
        self.fetching = false;
        self.status = LogsStatus::Ready;
        if append {
            self.rows.extend(rows);
        } else {
            self.rows = rows;
            self.clamp_selection();
        }
        true
    }

    pub fn logs_failed(&mut self, generation: u64, message: String, append: bool) -> bool {
        if generation != self.generation {
            return false;
        }
        self.fetching = false;
        if append {
            self.show_error(message);
        } else {
            self.status = LogsStatus::Failed(message);
        }
        true
    }

    pub fn facets_loaded(&mut self, generation: u64, facets: IndexMap<String, FacetResult>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.facets = facets;
        let len = self.filter_entries().len();
        self.ui_state.filter_cursor = self.ui_state.filter_cursor.min(len.saturating_sub(1));
        true
    }

    // ------------------------------------------------------------------
    // Search and filters
    // ------------------------------------------------------------------

    pub fn start_search(&mut self) {
        self.ui_state.focus = Focus::Search;
        self.ui_state.search_input = self.search_text.clone();
    }

    /// Leave search input and apply it; returns whether the text changed
    pub fn apply_search(&mut self) -> bool {
        self.ui_state.focus = Focus::Logs;
        let input = self.ui_state.search_input.trim().to_string();
        if input == self.search_text {
            return false;
        }
        self.search_text = input;
        true
    }

    pub fn cancel_search(&mut self) {
        self.ui_state.focus = Focus::Logs;
        self.ui_state.search_input = self.search_text.clone();
    }

    /// Drop search text and filters; returns whether anything was set
    pub fn clear_filters(&mut self) -> bool {
        if !self.show_clear_filters() {
            return false;
        }
        self.search_text.clear();
        self.ui_state.search_input.clear();
        self.filters.clear();
        true
    }

    /// Facet values in the filters panel, in facet declaration order
    ///
    /// Selected values the server no longer reports stay listed with a zero
    /// count so they can be unselected.
    pub fn filter_entries(&self) -> Vec<FilterEntry> {
        let Some(intro) = &self.introspection else {
            return Vec::new();
        };

        let mut entries = Vec::new();
        for property in intro.facets.keys() {
            let reported = self.facets.get(property);
            if let Some(result) = reported {
                entries.extend(result.values.iter().map(|(key, count)| FilterEntry {
                    property: property.clone(),
                    key: key.clone(),
                    count: *count,
                }));
            }
            for key in self.filters.values(property) {
                if !reported.is_some_and(|r| r.values.contains_key(key)) {
                    entries.push(FilterEntry {
                        property: property.clone(),
                        key: key.to_string(),
                        count: 0,
                    });
                }
            }
        }
        entries
    }

    /// Toggle the value under the filters cursor; returns whether filters changed
    pub fn toggle_filter_at_cursor(&mut self) -> bool {
        let entries = self.filter_entries();
        match entries.get(self.ui_state.filter_cursor) {
            Some(entry) => {
                self.filters.toggle(&entry.property, &entry.key);
                true
            }
            None => false,
        }
    }

    pub fn filter_up(&mut self) {
        self.ui_state.filter_cursor = self.ui_state.filter_cursor.saturating_sub(1);
    }

    pub fn filter_down(&mut self) {
        let len = self.filter_entries().len();
        if self.ui_state.filter_cursor + 1 < len {
            self.ui_state.filter_cursor += 1;
        }
    }

    // ------------------------------------------------------------------
    // Table
    // ------------------------------------------------------------------

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.visible)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.ui_state.table_state.selected()
    }

    pub fn selected_record(&self) -> Option<&Value> {
        self.rows.get(self.selected_index()?)
    }

    pub fn select(&mut self, index: Option<usize>) {
        let index = index.map(|i| i.min(self.rows.len().saturating_sub(1)));
        if self.rows.is_empty() {
            self.ui_state.table_state.select(None);
        } else {
            self.ui_state.table_state.select(index);
        }
        self.ui_state.details_scroll = 0;
    }

    pub fn select_next(&mut self) {
        let next = self.selected_index().map_or(0, |i| i + 1);
        self.select(Some(next));
    }

    pub fn select_prev(&mut self) {
        let prev = self.selected_index().map_or(0, |i| i.saturating_sub(1));
        self.select(Some(prev));
    }

    pub fn page_down(&mut self) {
        let step = self.ui_state.page_size.max(1);
        let next = self.selected_index().map_or(0, |i| i + step);
        self.select(Some(next));
    }

    pub fn page_up(&mut self) {
        let step = self.ui_state.page_size.max(1);
        let prev = self.selected_index().map_or(0, |i| i.saturating_sub(step));
        self.select(Some(prev));
    }

    pub fn select_last(&mut self) {
        self.select(Some(self.rows.len().saturating_sub(1)));
    }

    fn clamp_selection(&mut self) {
        if let Some(index) = self.selected_index() {
            self.select(Some(index));
        }
    }

    // ------------------------------------------------------------------
    // Panels
    // ------------------------------------------------------------------

    pub fn toggle_filters(&mut self) {
        self.ui_state.filters_visible = !self.ui_state.filters_visible;
        self.ui_state.focus = if self.ui_state.filters_visible {
            Focus::Filters
        } else {
            Focus::Logs
        };
    }

    pub fn cycle_focus(&mut self) {
        self.ui_state.focus = match self.ui_state.focus {
            Focus::Logs if self.ui_state.filters_visible => Focus::Filters,
            _ => Focus::Logs,
        };
    }

    pub fn toggle_column_at_cursor(&mut self) {
        if let Some(column) = self.columns.get_mut(self.ui_state.column_cursor) {
            column.visible = !column.visible;
        }
    }

    pub fn column_up(&mut self) {
        self.ui_state.column_cursor = self.ui_state.column_cursor.saturating_sub(1);
    }

    pub fn column_down(&mut self) {
        if self.ui_state.column_cursor + 1 < self.columns.len() {
            self.ui_state.column_cursor += 1;
        }
    }

    /// Close the topmost overlay; returns false when nothing was open
    pub fn dismiss(&mut self) -> bool {
        let ui = &mut self.ui_state;
        if ui.help_visible {
            ui.help_visible = false;
        } else if ui.columns_visible {
            ui.columns_visible = false;
        } else if ui.error_message.is_some() {
            ui.error_message = None;
        } else if ui.details_visible {
            ui.details_visible = false;
        } else if ui.filters_visible {
            ui.filters_visible = false;
            ui.focus = Focus::Logs;
        } else if ui.table_state.selected().is_some() {
            ui.table_state.select(None);
        } else {
            return false;
        }
        true
    }

    pub fn show_error(&mut self, message: String) {
        self.ui_state.error_message = Some(message);
    }
}

/// Table columns from the column settings, or every schema property when the
/// introspection declares none
fn columns_for(intro: &Introspection) -> Vec<Column> {
    if intro.columns.is_empty() {
        return intro
            .db_schema
            .fields()
            .into_iter()
            .map(|field| Column {
                title: intro.label(&field.path).to_string(),
                property: field.path,
                visible: true,
                width: FALLBACK_WIDTH,
            })
            .collect();
    }

    intro
        .columns
        .iter()
        .map(|(property, config)| Column {
            property: property.clone(),
            title: intro.label(property).to_string(),
            visible: config.visible,
            width: (config.size / CELL_PIXELS).max(4),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinorama_types::{Predicate, CREATED_AT_PROPERTY};
    use serde_json::json;

    fn intro() -> Introspection {
        serde_json::from_value(json!({
            "dbSchema": { "time": "number", "level": "enum", "msg": "string" },
            "facets": { "level": "enum", "msg": "string" },
            "columns": {
                "time": { "visible": true, "size": 150 },
                "level": { "visible": true, "size": 70 },
                "msg": { "visible": false, "size": 400 }
            },
            "labels": { "time": "Time", "level": ["Level", { "30": "INFO" }] }
        }))
        .unwrap()
    }

    fn connected() -> AppState {
        let mut state = AppState::new("http://127.0.0.1:6200", Locale::En);
        state.set_introspection(intro());
        state
    }

    fn record(n: i64) -> Value {
        json!({ "msg": format!("m{}", n), "_pinorama": { "createdAt": n } })
    }

    fn facet(values: &[(&str, usize)]) -> FacetResult {
        FacetResult {
            count: values.len(),
            values: values.iter().map(|(k, c)| (k.to_string(), *c)).collect(),
        }
    }

    #[test]
    fn test_columns_follow_introspection() {
        let state = connected();
        let columns: Vec<_> = state.columns.iter().map(|c| (c.title.as_str(), c.visible, c.width)).collect();
        assert_eq!(columns, vec![("Time", true, 18), ("Level", true, 8), ("msg", false, 50)]);
        assert_eq!(state.visible_columns().count(), 2);
    }

    #[test]
    fn test_no_fetch_until_connected() {
        let mut state = AppState::new("http://127.0.0.1:6200", Locale::En);
        assert!(state.restart_query().is_none());
        assert!(state.refetch().is_none());
    }

    #[test]
    fn test_restart_query_resets_selection_and_builds_payload() {
        let mut state = connected();
        let generation = state.generation;
        state.rows = vec![record(1), record(2)];
        state.select(Some(1));
        state.search_text = "timeout".into();
        state.filters.toggle("level", "30");

        let request = state.restart_query().unwrap();
        assert_eq!(request.generation, generation + 1);
        assert!(!request.append);
        assert!(state.rows.is_empty());
        assert_eq!(state.selected_index(), None);
        assert_eq!(state.status, LogsStatus::Loading);

        let payload = serde_json::to_value(&request.payload).unwrap();
        assert_eq!(payload["term"], "timeout");
        assert_eq!(payload["where"]["level"], json!({ "in": [30] }));

        let facets = request.facets.unwrap();
        assert_eq!(facets.limit, Some(0));
        assert!(facets.facets.unwrap().contains_key("msg"));
    }

    #[test]
    fn test_stale_responses_are_dropped() {
        let mut state = connected();
        let first = state.restart_query().unwrap();
        let second = state.restart_query().unwrap();

        assert!(!state.logs_loaded(first.generation, vec![record(1)], false));
        assert!(state.rows.is_empty());
        assert!(state.fetching);

        assert!(state.logs_loaded(second.generation, vec![record(2)], false));
        assert_eq!(state.rows.len(), 1);
        assert!(!state.fetching);
        assert_eq!(state.status, LogsStatus::Ready);
    }

    #[test]
    fn test_live_poll_uses_cursor_and_appends() {
        let mut state = connected();
        state.live = true;
        assert!(state.poll_request().is_none());

        let initial = state.restart_query().unwrap();
        assert!(state.poll_request().is_none());
        state.logs_loaded(initial.generation, vec![record(10), record(20)], false);

        let poll = state.poll_request().unwrap();
        assert!(poll.append);
        assert!(poll.facets.is_none());
        let clause = poll.payload.filters.as_ref().unwrap();
        assert_eq!(
            serde_json::to_value(&clause[CREATED_AT_PROPERTY]).unwrap(),
            json!({ "gt": 20.0 })
        );

        // one poll at a time
        assert!(state.poll_request().is_none());

        state.logs_loaded(poll.generation, vec![record(30)], true);
        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.cursor(), Some(30));
    }

    #[test]
    fn test_live_poll_without_rows_has_no_cursor() {
        let mut state = connected();
        state.live = true;
        let initial = state.restart_query().unwrap();
        state.logs_loaded(initial.generation, Vec::new(), false);

        let poll = state.poll_request().unwrap();
        assert!(!poll
            .payload
            .filters
            .unwrap_or_default()
            .contains_key(CREATED_AT_PROPERTY));
    }

    #[test]
    fn test_failed_poll_keeps_rows() {
        let mut state = connected();
        state.live = true;
        let initial = state.restart_query().unwrap();
        state.logs_loaded(initial.generation, vec![record(1)], false);

        let poll = state.poll_request().unwrap();
        state.logs_failed(poll.generation, "boom".into(), true);
        assert_eq!(state.status, LogsStatus::Ready);
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.ui_state.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_search_apply_and_cancel() {
        let mut state = connected();
        state.start_search();
        assert_eq!(state.ui_state.focus, Focus::Search);
        state.ui_state.search_input.push_str(" error ");
        assert!(state.apply_search());
        assert_eq!(state.search_text, "error");
        assert_eq!(state.ui_state.focus, Focus::Logs);

        state.start_search();
        state.ui_state.search_input.push('s');
        state.cancel_search();
        assert_eq!(state.search_text, "error");

        state.start_search();
        assert!(!state.apply_search());
    }

    #[test]
    fn test_clear_filters_visibility() {
        let mut state = connected();
        assert!(!state.show_clear_filters());

        state.search_text = "x".into();
        assert!(state.show_clear_filters());
        state.search_text.clear();

        state.filters.toggle("level", "30");
        assert!(state.show_clear_filters());

        assert!(state.clear_filters());
        assert!(state.filters.is_empty());
        assert!(!state.clear_filters());
    }

    #[test]
    fn test_filter_entries_keep_selected_values() {
        let mut state = connected();
        let request = state.restart_query().unwrap();
        let mut facets = IndexMap::new();
        facets.insert("level".to_string(), facet(&[("30", 4), ("50", 1)]));
        facets.insert("msg".to_string(), facet(&[("hello", 2)]));
        state.facets_loaded(request.generation, facets);

        state.ui_state.filter_cursor = 1;
        assert!(state.toggle_filter_at_cursor());
        assert!(state.filters.contains("level", "50"));

        // the server stops reporting the selected value
        let mut facets = IndexMap::new();
        facets.insert("level".to_string(), facet(&[("30", 4)]));
        state.facets_loaded(request.generation, facets);

        let entries = state.filter_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].key, "50");
        assert_eq!(entries[1].count, 0);

        let clause = state.where_clause();
        assert!(matches!(clause.get("level"), Some(Predicate::Compare(_))));
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut state = connected();
        state.select(Some(3));
        assert_eq!(state.selected_index(), None);

        state.rows = (0..5).map(record).collect();
        state.select_next();
        assert_eq!(state.selected_index(), Some(0));
        state.ui_state.page_size = 10;
        state.page_down();
        assert_eq!(state.selected_index(), Some(4));
        state.page_up();
        assert_eq!(state.selected_index(), Some(0));
        state.select_last();
        assert_eq!(state.selected_record(), Some(&record(4)));
    }

    #[test]
    fn test_dismiss_closes_topmost() {
        let mut state = connected();
        state.ui_state.help_visible = true;
        state.ui_state.details_visible = true;

        assert!(state.dismiss());
        assert!(!state.ui_state.help_visible);
        assert!(state.ui_state.details_visible);
        assert!(state.dismiss());
        assert!(!state.dismiss());
    }

    #[test]
    fn test_disconnect_discards_in_flight() {
        let mut state = connected();
        let request = state.restart_query().unwrap();
        state.disconnect();
        assert!(!state.logs_loaded(request.generation, vec![record(1)], false));
        assert!(state.restart_query().is_none());
    }
}
