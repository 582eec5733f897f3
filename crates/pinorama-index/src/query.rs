use std::ops::Bound;

use serde_json::Value;
use tantivy::query::{AllQuery, BooleanQuery, EmptyQuery, Occur, Query, RangeQuery, TermQuery};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::Term;

use pinorama_types::{value_key, Comparison, Predicate, SchemaType, CREATED_AT_PROPERTY};

use crate::fields::{FieldMap, PropertyFields, CREATED_AT_FIELD};
use crate::IndexError;

type BoxQuery = Box<dyn Query>;

/// Translate one `where` entry into an engine query
pub(crate) fn filter_query(
    fields: &FieldMap,
    property: &str,
    predicate: &Predicate,
) -> Result<BoxQuery, IndexError> {
    if property == CREATED_AT_PROPERTY {
        return created_at_query(property, predicate);
    }

    let slot = fields
        .get(property)
        .ok_or_else(|| IndexError::UnknownProperty(property.to_string()))?;

    match slot.ty.element() {
        SchemaType::String | SchemaType::Enum => match slot.exact {
            Some(field) => keyword_query(property, field, predicate),
            None => Err(invalid(property, "property is not filterable")),
        },
        SchemaType::Number => number_query(property, slot, predicate),
        SchemaType::Boolean => match slot.value {
            Some(field) => bool_query(property, field, predicate),
            None => Err(invalid(property, "property is not filterable")),
        },
        _ => Err(invalid(property, "property is not filterable")),
    }
}

/// Every query must match; no queries matches everything
pub(crate) fn all_of(mut queries: Vec<BoxQuery>) -> BoxQuery {
    match queries.len() {
        0 => Box::new(AllQuery),
        1 => queries.remove(0),
        _ => Box::new(BooleanQuery::new(
            queries.into_iter().map(|q| (Occur::Must, q)).collect(),
        )),
    }
}

/// At least one query must match; no queries matches nothing
fn any_of(mut queries: Vec<BoxQuery>) -> BoxQuery {
    match queries.len() {
        0 => Box::new(EmptyQuery),
        1 => queries.remove(0),
        _ => Box::new(BooleanQuery::new(
            queries.into_iter().map(|q| (Occur::Should, q)).collect(),
        )),
    }
}

fn none_of(queries: Vec<BoxQuery>) -> BoxQuery {
    let mut clauses: Vec<(Occur, BoxQuery)> = vec![(Occur::Must, Box::new(AllQuery))];
    clauses.extend(queries.into_iter().map(|q| (Occur::MustNot, q)));
    Box::new(BooleanQuery::new(clauses))
}

fn term(term: Term) -> BoxQuery {
    Box::new(TermQuery::new(term, IndexRecordOption::Basic))
}

fn invalid(property: &str, reason: impl Into<String>) -> IndexError {
    IndexError::InvalidFilter {
        property: property.to_string(),
        reason: reason.into(),
    }
}

// ============================================================================
// Strings and enums
// ============================================================================

fn keyword_query(property: &str, field: Field, predicate: &Predicate) -> Result<BoxQuery, IndexError> {
    let keyword = |value: &str| term(Term::from_field_text(field, value));

    match predicate {
        Predicate::Text(value) => Ok(keyword(value)),
        Predicate::AnyOf(values) => Ok(any_of(values.iter().map(|v| keyword(v)).collect())),
        Predicate::Flag(_) => Err(invalid(property, "boolean filter on a non-boolean property")),
        Predicate::Compare(comparison) => {
            if comparison.has_range() {
                return Err(invalid(property, "range operators only apply to numbers"));
            }
            let key = |value: &Value| keyword(&value_key(value));

            let mut clauses = Vec::new();
            if let Some(eq) = &comparison.eq {
                clauses.push(key(eq));
            }
            if let Some(values) = &comparison.any_of {
                clauses.push(any_of(values.iter().map(key).collect()));
            }
            if let Some(values) = &comparison.nin {
                clauses.push(none_of(values.iter().map(key).collect()));
            }
            Ok(all_of(clauses))
        }
    }
}

// ============================================================================
// Numbers
// ============================================================================

fn number_query(
    property: &str,
    slot: &PropertyFields,
    predicate: &Predicate,
) -> Result<BoxQuery, IndexError> {
    let (Some(field), Some(name)) = (slot.value, slot.value_name.as_deref()) else {
        return Err(invalid(property, "property is not filterable"));
    };
    let Predicate::Compare(comparison) = predicate else {
        return Err(invalid(property, "number properties take comparison operators"));
    };

    let number = |value: &Value| -> Result<BoxQuery, IndexError> {
        value
            .as_f64()
            .map(|n| term(Term::from_field_f64(field, n)))
            .ok_or_else(|| invalid(property, format!("expected a number, got {}", value)))
    };
    let numbers = |values: &[Value]| -> Result<Vec<BoxQuery>, IndexError> {
        values.iter().map(number).collect()
    };

    let mut clauses = Vec::new();
    if let Some(eq) = &comparison.eq {
        clauses.push(number(eq)?);
    }
    if let Some(values) = &comparison.any_of {
        clauses.push(any_of(numbers(values)?));
    }
    if let Some(values) = &comparison.nin {
        clauses.push(none_of(numbers(values)?));
    }
    for (lower, upper) in f64_bounds(comparison) {
        clauses.push(Box::new(RangeQuery::new_f64_bounds(name.to_string(), lower, upper)));
    }
    Ok(all_of(clauses))
}

/// One bound pair per range operator present
fn f64_bounds(c: &Comparison) -> Vec<(Bound<f64>, Bound<f64>)> {
    let mut bounds = Vec::new();
    if let Some(v) = c.gt {
        bounds.push((Bound::Excluded(v), Bound::Unbounded));
    }
    if let Some(v) = c.gte {
        bounds.push((Bound::Included(v), Bound::Unbounded));
    }
    if let Some(v) = c.lt {
        bounds.push((Bound::Unbounded, Bound::Excluded(v)));
    }
    if let Some(v) = c.lte {
        bounds.push((Bound::Unbounded, Bound::Included(v)));
    }
    if let Some((low, high)) = c.between {
        bounds.push((Bound::Included(low), Bound::Included(high)));
    }
    bounds
}

// ============================================================================
// Booleans
// ============================================================================

fn bool_query(property: &str, field: Field, predicate: &Predicate) -> Result<BoxQuery, IndexError> {
    let flag = match predicate {
        Predicate::Flag(b) => Some(*b),
        Predicate::Compare(Comparison { eq: Some(value), .. }) => value.as_bool(),
        _ => None,
    };
    flag.map(|b| term(Term::from_field_bool(field, b)))
        .ok_or_else(|| invalid(property, "boolean properties take true or false"))
}

// ============================================================================
// Creation time
// ============================================================================

/// Range over the millisecond creation time; fractional bounds are rounded
/// inward so the integer range matches exactly the same records.
fn created_at_query(property: &str, predicate: &Predicate) -> Result<BoxQuery, IndexError> {
    let Predicate::Compare(c) = predicate else {
        return Err(invalid(property, "the creation time takes comparison operators"));
    };
    if c.any_of.is_some() || c.nin.is_some() {
        return Err(invalid(property, "the creation time only supports eq and ranges"));
    }

    let mut bounds: Vec<(Bound<i64>, Bound<i64>)> = Vec::new();
    if let Some(eq) = &c.eq {
        let ms = eq
            .as_f64()
            .ok_or_else(|| invalid(property, format!("expected a number, got {}", eq)))?;
        bounds.push((Bound::Included(ms.ceil() as i64), Bound::Included(ms.floor() as i64)));
    }
    if let Some(v) = c.gt {
        bounds.push((Bound::Excluded(v.floor() as i64), Bound::Unbounded));
    }
    if let Some(v) = c.gte {
        bounds.push((Bound::Included(v.ceil() as i64), Bound::Unbounded));
    }
    if let Some(v) = c.lt {
        bounds.push((Bound::Unbounded, Bound::Excluded(v.ceil() as i64)));
    }
    if let Some(v) = c.lte {
        bounds.push((Bound::Unbounded, Bound::Included(v.floor() as i64)));
    }
    if let Some((low, high)) = c.between {
        bounds.push((Bound::Included(low.ceil() as i64), Bound::Included(high.floor() as i64)));
    }

    Ok(all_of(
        bounds
            .into_iter()
            .map(|(lower, upper)| -> BoxQuery {
                Box::new(RangeQuery::new_i64_bounds(CREATED_AT_FIELD.to_string(), lower, upper))
            })
            .collect(),
    ))
}
