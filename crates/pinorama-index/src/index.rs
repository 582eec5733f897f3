use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tantivy::collector::{Count, DocSetCollector, TopDocs};
use tantivy::query::{AllQuery, EmptyQuery, Query, QueryParser};
use tantivy::schema::Value as _;
use tantivy::{DocAddress, Index, IndexReader, IndexWriter, Order, ReloadPolicy, Searcher, TantivyDocument};

use pinorama_types::{
    created_at, lookup, stamp_created_at, value_key, Elapsed, FacetRequest, FacetResult, Schema,
    SchemaType, SearchHit, SearchParams, SearchResponse, SortBy, SortOrder, CREATED_AT_PROPERTY,
};

use crate::fields::{FieldMap, PropertyFields, ID_FIELD};
use crate::query;
use crate::IndexError;

/// Memory budget of the single indexing thread
const WRITER_MEMORY_BUDGET: usize = 50_000_000;

/// Hits returned when a search sets no limit
pub const DEFAULT_LIMIT: usize = 10;

/// Facet values returned when a facet request sets no limit
pub const DEFAULT_FACET_LIMIT: usize = 10;

/// Largest edit distance supported for fuzzy term matching
pub const MAX_TOLERANCE: u8 = 2;

/// Writer plus the counters that must advance with it
struct WriterState {
    writer: IndexWriter,
    next_id: u64,
    last_created_at: i64,
}

/// Which fast field orders the hits
enum SortField {
    /// Insertion order, which follows the creation time
    CreatedAt,
    Number(String),
}

/// In-memory full-text index of log records
///
/// Every inserted record is stamped with `_pinorama.createdAt` (epoch ms).
/// Stamps are unique and strictly increasing in insertion order, so a
/// creation-time cursor can resume anywhere, even inside a bulk.
pub struct LogIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<WriterState>,
    fields: FieldMap,
    schema: Schema,
}

impl LogIndex {
    pub fn new(schema: &Schema) -> Result<Self, IndexError> {
        let fields = FieldMap::build(schema);
        let index = Index::create_in_ram(fields.schema.clone());
        let writer = index.writer_with_num_threads(1, WRITER_MEMORY_BUDGET)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        tracing::debug!(properties = fields.properties.len(), "Created log index");

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(WriterState {
                writer,
                next_id: 0,
                last_created_at: 0,
            }),
            fields,
            schema: schema.clone(),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of stored records
    pub fn count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Insert a batch of records; every record must be a JSON object
    ///
    /// Nothing is inserted when any record is rejected.
    pub fn insert_many(&self, records: Vec<Value>) -> Result<usize, IndexError> {
        let objects = into_objects(records)?;
        if objects.is_empty() {
            return Ok(0);
        }

        let mut state = self.writer.lock();
        let base = Utc::now()
            .timestamp_millis()
            .max(state.last_created_at + 1);

        let stamped = objects
            .into_iter()
            .zip(base..)
            .map(|(mut object, stamp)| {
                stamp_created_at(&mut object, stamp);
                (Value::Object(object), stamp)
            })
            .collect();
        self.write(&mut state, stamped)
    }

    /// Insert records that already carry a creation time (snapshot restore)
    ///
    /// Records without one are stamped with the current time.
    pub fn insert_restored(&self, records: Vec<Value>) -> Result<usize, IndexError> {
        let objects = into_objects(records)?;
        if objects.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().timestamp_millis();
        let mut stamped: Vec<(Value, i64)> = objects
            .into_iter()
            .map(|mut object| {
                let doc = Value::Object(object.clone());
                let stamp = match created_at(&doc) {
                    Some(stamp) => stamp,
                    None => {
                        stamp_created_at(&mut object, now);
                        now
                    }
                };
                (Value::Object(object), stamp)
            })
            .collect();
        // ids follow creation order so that sorting by id sorts by creation
        stamped.sort_by_key(|(_, stamp)| *stamp);

        let mut state = self.writer.lock();
        self.write(&mut state, stamped)
    }

    fn write(&self, state: &mut WriterState, records: Vec<(Value, i64)>) -> Result<usize, IndexError> {
        let count = records.len();
        let mut skipped = 0usize;
        let mut newest = state.last_created_at;

        for (record, stamp) in records {
            let id = state.next_id;
            state.next_id += 1;
            newest = newest.max(stamp);
            let (doc, mismatched) = self.to_document(id, stamp, &record);
            skipped += mismatched;
            state.writer.add_document(doc)?;
        }

        state.writer.commit()?;
        state.last_created_at = newest;
        self.reader.reload()?;

        if skipped > 0 {
            tracing::debug!(skipped, "Values not matching the schema were stored but not indexed");
        }
        tracing::debug!(count, created_at = newest, "Inserted records");
        Ok(count)
    }

    fn to_document(&self, id: u64, stamp: i64, record: &Value) -> (TantivyDocument, usize) {
        let mut doc = TantivyDocument::default();
        doc.add_u64(self.fields.id, id);
        doc.add_i64(self.fields.created_at, stamp);
        doc.add_text(self.fields.source, record.to_string());

        let mut mismatched = 0;
        for (path, slot) in &self.fields.properties {
            let Some(value) = lookup(record, path) else {
                continue;
            };
            let values: Vec<&Value> = match (slot.ty.is_array(), value) {
                (_, Value::Null) => continue,
                (true, Value::Array(items)) => items.iter().collect(),
                (false, Value::Array(_)) | (true, _) => {
                    mismatched += 1;
                    continue;
                }
                (false, scalar) => vec![scalar],
            };
            for value in values {
                if !index_value(&mut doc, slot, value) {
                    mismatched += 1;
                }
            }
        }
        (doc, mismatched)
    }

    /// Remove every record
    pub fn clear(&self) -> Result<(), IndexError> {
        let mut state = self.writer.lock();
        state.writer.delete_all_documents()?;
        state.writer.commit()?;
        self.reader.reload()?;
        tracing::info!("Cleared log index");
        Ok(())
    }

    /// All stored records in creation order
    pub fn documents(&self) -> Result<Vec<Value>, IndexError> {
        let searcher = self.reader.searcher();
        let total = searcher.num_docs() as usize;
        if total == 0 {
            return Ok(Vec::new());
        }
        let top = TopDocs::with_limit(total).order_by_fast_field::<u64>(ID_FIELD, Order::Asc);
        searcher
            .search(&AllQuery, &top)?
            .into_iter()
            .map(|(_, address)| self.source(&searcher, address))
            .collect()
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub fn search(&self, params: &SearchParams) -> Result<SearchResponse, IndexError> {
        let started = Instant::now();
        let query = self.build_query(params)?;
        let sort = params
            .sort_by
            .as_ref()
            .map(|s| self.sort_field(s).map(|field| (field, s.order())))
            .transpose()?;

        let searcher = self.reader.searcher();
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = params.offset.unwrap_or(0);
        let count = searcher.search(query.as_ref(), &Count)?;

        let addresses = if limit == 0 || offset >= count {
            Vec::new()
        } else {
            // the collector allocates by limit
            let top = TopDocs::with_limit(limit.min(count - offset)).and_offset(offset);
            match sort {
                None => searcher.search(query.as_ref(), &top)?,
                Some((SortField::CreatedAt, order)) => searcher
                    .search(query.as_ref(), &top.order_by_fast_field::<u64>(ID_FIELD, engine_order(order)))?
                    .into_iter()
                    .map(|(_, address)| (0.0, address))
                    .collect(),
                Some((SortField::Number(name), order)) => searcher
                    .search(query.as_ref(), &top.order_by_fast_field::<f64>(name, engine_order(order)))?
                    .into_iter()
                    .map(|(_, address)| (0.0, address))
                    .collect(),
            }
        };

        let mut hits = Vec::with_capacity(addresses.len());
        for (score, address) in addresses {
            let doc: TantivyDocument = searcher.doc(address)?;
            let id = doc
                .get_first(self.fields.id)
                .and_then(|v| v.as_u64())
                .unwrap_or_default();
            hits.push(SearchHit {
                id: id.to_string(),
                score,
                document: self.parse_source(&doc),
            });
        }

        let facets = match &params.facets {
            Some(requests) => Some(self.facets(&searcher, query.as_ref(), requests)?),
            None => None,
        };

        let elapsed = Elapsed::from_duration(started.elapsed());
        tracing::debug!(count, hits = hits.len(), elapsed = %elapsed.formatted, "Search");

        Ok(SearchResponse {
            count,
            hits,
            elapsed,
            facets,
        })
    }

    fn build_query(&self, params: &SearchParams) -> Result<Box<dyn Query>, IndexError> {
        let mut clauses: Vec<Box<dyn Query>> = Vec::new();

        if let Some(term) = params.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            clauses.push(self.term_query(term, params.properties.as_deref(), params.tolerance)?);
        }
        if let Some(filters) = &params.filters {
            for (property, predicate) in filters {
                clauses.push(query::filter_query(&self.fields, property, predicate)?);
            }
        }

        Ok(query::all_of(clauses))
    }

    /// Every word must prefix-match a word of some searched property
    fn term_query(
        &self,
        term: &str,
        properties: Option<&[String]>,
        tolerance: Option<u8>,
    ) -> Result<Box<dyn Query>, IndexError> {
        let fields = self.fields.text_fields(properties)?;
        if fields.is_empty() {
            return Ok(Box::new(EmptyQuery));
        }

        let distance = tolerance.unwrap_or(0).min(MAX_TOLERANCE);
        let mut parser = QueryParser::for_index(&self.index, fields.clone());
        parser.set_conjunction_by_default();
        for field in fields {
            parser.set_field_fuzzy(field, true, distance, true);
        }

        let (query, errors) = parser.parse_query_lenient(term);
        if !errors.is_empty() {
            tracing::debug!(term, errors = errors.len(), "Ignored unparsable parts of search term");
        }
        Ok(query)
    }

    fn sort_field(&self, sort: &SortBy) -> Result<SortField, IndexError> {
        if sort.property == CREATED_AT_PROPERTY {
            return Ok(SortField::CreatedAt);
        }
        match self.fields.get(&sort.property) {
            Some(PropertyFields {
                ty: SchemaType::Number,
                value_name: Some(name),
                ..
            }) => Ok(SortField::Number(name.clone())),
            Some(_) => Err(IndexError::UnsortableProperty(sort.property.clone())),
            None => Err(IndexError::UnknownProperty(sort.property.clone())),
        }
    }

    fn facets(
        &self,
        searcher: &Searcher,
        query: &dyn Query,
        requests: &IndexMap<String, FacetRequest>,
    ) -> Result<IndexMap<String, FacetResult>, IndexError> {
        for property in requests.keys() {
            if property != CREATED_AT_PROPERTY && self.fields.get(property).is_none() {
                return Err(IndexError::UnknownProperty(property.clone()));
            }
        }

        let mut tallies: Vec<HashMap<String, usize>> = vec![HashMap::new(); requests.len()];
        for address in searcher.search(query, &DocSetCollector)? {
            let record = self.source(searcher, address)?;
            for (property, tally) in requests.keys().zip(tallies.iter_mut()) {
                let values: Vec<&Value> = match lookup(&record, property) {
                    None | Some(Value::Null) => continue,
                    Some(Value::Array(items)) => items.iter().collect(),
                    Some(value) => vec![value],
                };
                for value in values {
                    *tally.entry(value_key(value)).or_default() += 1;
                }
            }
        }

        Ok(requests
            .iter()
            .zip(tallies)
            .map(|((property, request), tally)| (property.clone(), facet_result(request, tally)))
            .collect())
    }

    fn source(&self, searcher: &Searcher, address: DocAddress) -> Result<Value, IndexError> {
        let doc: TantivyDocument = searcher.doc(address)?;
        Ok(self.parse_source(&doc))
    }

    fn parse_source(&self, doc: &TantivyDocument) -> Value {
        doc.get_first(self.fields.source)
            .and_then(|v| v.as_str())
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or(Value::Null)
    }
}

fn into_objects(records: Vec<Value>) -> Result<Vec<Map<String, Value>>, IndexError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match record {
            Value::Object(object) => Ok(object),
            _ => Err(IndexError::NotAnObject { index }),
        })
        .collect()
}

/// Add one scalar value to its engine field; false when the type does not match
fn index_value(doc: &mut TantivyDocument, slot: &PropertyFields, value: &Value) -> bool {
    match slot.ty.element() {
        SchemaType::String => match value.as_str() {
            Some(text) => {
                if let Some(field) = slot.text {
                    doc.add_text(field, text);
                }
                if let Some(field) = slot.exact {
                    doc.add_text(field, text);
                }
                true
            }
            None => false,
        },
        SchemaType::Enum => match (value, slot.exact) {
            (Value::String(_) | Value::Number(_) | Value::Bool(_), Some(field)) => {
                doc.add_text(field, value_key(value));
                true
            }
            _ => false,
        },
        SchemaType::Number => match (value.as_f64(), slot.value) {
            (Some(n), Some(field)) => {
                doc.add_f64(field, n);
                true
            }
            _ => false,
        },
        SchemaType::Boolean => match (value.as_bool(), slot.value) {
            (Some(b), Some(field)) => {
                doc.add_bool(field, b);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

fn engine_order(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

/// Most frequent values first (or least frequent for ascending), ties by value
fn facet_result(request: &FacetRequest, tally: HashMap<String, usize>) -> FacetResult {
    let count = tally.len();
    let mut values: Vec<(String, usize)> = tally.into_iter().collect();
    match request.sort.unwrap_or(SortOrder::Desc) {
        SortOrder::Desc => values.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))),
        SortOrder::Asc => values.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0))),
    }

    FacetResult {
        count,
        values: values
            .into_iter()
            .skip(request.offset.unwrap_or(0))
            .take(request.limit.unwrap_or(DEFAULT_FACET_LIMIT))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinorama_types::{build_payload, Predicate, WhereClause, PAYLOAD_LIMIT};
    use serde_json::json;

    fn pino_index() -> LogIndex {
        let intro = pinorama_presets::pino().unwrap();
        LogIndex::new(&intro.db_schema).unwrap()
    }

    fn sample() -> Vec<Value> {
        vec![
            json!({ "level": 30, "time": 1, "msg": "server listening", "hostname": "web-1", "pid": 1 }),
            json!({ "level": 40, "time": 2, "msg": "slow request", "hostname": "web-2", "pid": 1 }),
            json!({ "level": 50, "time": 3, "msg": "request failed: timeout", "hostname": "web-1", "pid": 2 }),
            json!({ "level": 30, "time": 4, "msg": "request completed", "hostname": "web-2", "pid": 2 }),
        ]
    }

    fn messages(response: &SearchResponse) -> Vec<String> {
        response
            .hits
            .iter()
            .map(|h| h.document["msg"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn where_clause(value: Value) -> WhereClause {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_insert_stamps_created_at() {
        let index = pino_index();
        assert_eq!(index.insert_many(sample()).unwrap(), 4);
        assert_eq!(index.count(), 4);

        let docs = index.documents().unwrap();
        let stamps: Vec<i64> = docs.iter().filter_map(created_at).collect();
        assert_eq!(stamps.len(), 4);
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(docs[0]["msg"], "server listening");
    }

    #[test]
    fn test_cursor_pages_through_a_bulk_larger_than_a_page() {
        let index = pino_index();
        let total = PAYLOAD_LIMIT + 5;
        let records = (0..total).map(|i| json!({ "msg": format!("line {}", i) })).collect();
        index.insert_many(records).unwrap();

        let first = index.search(&build_payload(None, None, None)).unwrap();
        assert_eq!(first.count, total);
        assert_eq!(first.hits.len(), PAYLOAD_LIMIT);

        let cursor = created_at(&first.hits[PAYLOAD_LIMIT - 1].document);
        let next = index.search(&build_payload(None, None, cursor)).unwrap();
        assert_eq!(next.hits.len(), 5);
        assert_eq!(next.hits[0].document["msg"], format!("line {}", PAYLOAD_LIMIT));
        assert_eq!(next.hits[4].document["msg"], format!("line {}", total - 1));
    }

    #[test]
    fn test_huge_limit_and_offset_are_clamped() {
        let index = pino_index();
        index.insert_many(sample()).unwrap();

        let params: SearchParams =
            serde_json::from_value(json!({ "limit": u64::MAX, "offset": 1 })).unwrap();
        let response = index.search(&params).unwrap();
        assert_eq!(response.count, 4);
        assert_eq!(response.hits.len(), 3);

        let params: SearchParams =
            serde_json::from_value(json!({ "limit": u64::MAX, "offset": u64::MAX })).unwrap();
        assert!(index.search(&params).unwrap().hits.is_empty());
    }

    #[test]
    fn test_created_at_strictly_increases_across_bulks() {
        let index = pino_index();
        index.insert_many(vec![json!({ "msg": "a" })]).unwrap();
        index.insert_many(vec![json!({ "msg": "b" })]).unwrap();
        index.insert_many(vec![json!({ "msg": "c" })]).unwrap();

        let stamps: Vec<i64> = index
            .documents()
            .unwrap()
            .iter()
            .filter_map(created_at)
            .collect();
        assert_eq!(stamps.len(), 3);
        assert!(stamps[0] < stamps[1] && stamps[1] < stamps[2]);
    }

    #[test]
    fn test_non_object_rejects_whole_bulk() {
        let index = pino_index();
        let err = index
            .insert_many(vec![json!({ "msg": "ok" }), json!("nope")])
            .unwrap_err();
        assert!(matches!(err, IndexError::NotAnObject { index: 1 }));
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_mismatched_values_are_stored_not_indexed() {
        let index = pino_index();
        index
            .insert_many(vec![json!({ "msg": 42, "level": { "weird": true } })])
            .unwrap();
        let docs = index.documents().unwrap();
        assert_eq!(docs[0]["msg"], 42);
    }

    #[test]
    fn test_base_payload_returns_insertion_order() {
        let index = pino_index();
        index.insert_many(sample()).unwrap();

        let response = index.search(&build_payload(None, None, None)).unwrap();
        assert_eq!(response.count, 4);
        assert_eq!(
            messages(&response),
            vec!["server listening", "slow request", "request failed: timeout", "request completed"]
        );
    }

    #[test]
    fn test_term_matches_prefixes_of_every_word() {
        let index = pino_index();
        index.insert_many(sample()).unwrap();

        let response = index.search(&build_payload(Some("req"), None, None)).unwrap();
        assert_eq!(response.count, 3);

        let response = index
            .search(&build_payload(Some("request time"), None, None))
            .unwrap();
        assert_eq!(messages(&response), vec!["request failed: timeout"]);
    }

    #[test]
    fn test_term_tolerance() {
        let index = pino_index();
        index.insert_many(sample()).unwrap();

        let strict = SearchParams {
            term: Some("timeuot".into()),
            ..Default::default()
        };
        assert_eq!(index.search(&strict).unwrap().count, 0);

        let tolerant = SearchParams {
            tolerance: Some(2),
            ..strict
        };
        assert_eq!(index.search(&tolerant).unwrap().count, 1);
    }

    #[test]
    fn test_filters() {
        let index = pino_index();
        index.insert_many(sample()).unwrap();

        let search = |clause: Value| {
            index
                .search(&build_payload(None, Some(&where_clause(clause)), None))
                .unwrap()
                .count
        };

        assert_eq!(search(json!({ "level": { "in": [40, 50] } })), 2);
        assert_eq!(search(json!({ "level": { "nin": [30] } })), 2);
        assert_eq!(search(json!({ "hostname": "web-1" })), 2);
        assert_eq!(search(json!({ "hostname": ["web-1", "web-2"] })), 4);
        assert_eq!(search(json!({ "time": { "gte": 2, "lt": 4 } })), 2);
        assert_eq!(search(json!({ "time": { "between": [1, 2] } })), 2);
        assert_eq!(search(json!({ "hostname": "web-2", "level": { "eq": 30 } })), 1);
        assert_eq!(search(json!({})), 4);
    }

    #[test]
    fn test_invalid_filters_are_client_errors() {
        let index = pino_index();
        let params = build_payload(None, Some(&where_clause(json!({ "nope": "x" }))), None);
        let err = index.search(&params).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_cursor_returns_only_newer_records() {
        let index = pino_index();
        index.insert_many(sample()).unwrap();
        let cursor = index
            .documents()
            .unwrap()
            .last()
            .and_then(created_at)
            .unwrap();

        index
            .insert_many(vec![json!({ "level": 60, "msg": "crash", "time": 5 })])
            .unwrap();

        let response = index.search(&build_payload(None, None, Some(cursor))).unwrap();
        assert_eq!(messages(&response), vec!["crash"]);
    }

    #[test]
    fn test_limit_offset_and_sort() {
        let index = pino_index();
        index.insert_many(sample()).unwrap();

        let params = SearchParams {
            limit: Some(2),
            offset: Some(1),
            sort_by: Some(SortBy::new("time").with_order(SortOrder::Desc)),
            ..Default::default()
        };
        let response = index.search(&params).unwrap();
        assert_eq!(response.count, 4);
        assert_eq!(messages(&response), vec!["request failed: timeout", "slow request"]);

        let past_end = SearchParams {
            offset: Some(10),
            ..params.clone()
        };
        assert!(index.search(&past_end).unwrap().hits.is_empty());

        let unsortable = SearchParams {
            sort_by: Some(SortBy::new("msg")),
            ..Default::default()
        };
        assert!(matches!(
            index.search(&unsortable),
            Err(IndexError::UnsortableProperty(_))
        ));
    }

    #[test]
    fn test_facets_follow_query() {
        let index = pino_index();
        index.insert_many(sample()).unwrap();

        let mut facets = IndexMap::new();
        facets.insert("level".to_string(), FacetRequest::default());
        facets.insert("hostname".to_string(), FacetRequest::default());

        let mut filters = WhereClause::new();
        filters.insert("pid".to_string(), Predicate::Compare(
            serde_json::from_value(json!({ "eq": 2 })).unwrap(),
        ));
        let params = SearchParams {
            filters: Some(filters),
            facets: Some(facets),
            limit: Some(0),
            ..Default::default()
        };

        let response = index.search(&params).unwrap();
        assert!(response.hits.is_empty());
        let facets = response.facets.unwrap();
        assert_eq!(facets["level"].count, 2);
        assert_eq!(facets["level"].values.get("50"), Some(&1));
        assert_eq!(facets["hostname"].values.len(), 2);
    }

    #[test]
    fn test_facet_ordering_and_paging() {
        let mut tally = HashMap::new();
        tally.insert("a".to_string(), 1);
        tally.insert("b".to_string(), 3);
        tally.insert("c".to_string(), 3);

        let desc = facet_result(&FacetRequest::default(), tally.clone());
        assert_eq!(desc.count, 3);
        assert_eq!(desc.values.keys().collect::<Vec<_>>(), vec!["b", "c", "a"]);

        let paged = facet_result(
            &FacetRequest {
                limit: Some(1),
                offset: Some(1),
                sort: Some(SortOrder::Asc),
            },
            tally,
        );
        assert_eq!(paged.values.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_clear() {
        let index = pino_index();
        index.insert_many(sample()).unwrap();
        index.clear().unwrap();
        assert_eq!(index.count(), 0);
        assert!(index.documents().unwrap().is_empty());
    }

    #[test]
    fn test_restored_records_keep_created_at() {
        let index = pino_index();
        let restored = vec![
            json!({ "msg": "later", "_pinorama": { "createdAt": 2_000 } }),
            json!({ "msg": "earlier", "_pinorama": { "createdAt": 1_000 } }),
        ];
        index.insert_restored(restored).unwrap();

        let docs = index.documents().unwrap();
        assert_eq!(docs[0]["msg"], "earlier");
        assert_eq!(created_at(&docs[1]), Some(2_000));

        index.insert_many(vec![json!({ "msg": "new" })]).unwrap();
        let newest = index.documents().unwrap().last().and_then(created_at).unwrap();
        assert!(newest > 2_000);
    }
}
