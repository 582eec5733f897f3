use std::collections::HashSet;

use indexmap::IndexMap;
use tantivy::schema::{Field, Schema as TantivySchema, FAST, INDEXED, STORED, STRING, TEXT};

use pinorama_types::{Schema, SchemaType};

use crate::IndexError;

pub(crate) const ID_FIELD: &str = "_id";
pub(crate) const CREATED_AT_FIELD: &str = "_created_at";
pub(crate) const SOURCE_FIELD: &str = "_source";

/// Search engine fields backing one schema property
#[derive(Clone, Debug)]
pub(crate) struct PropertyFields {
    pub ty: SchemaType,
    /// Tokenized text, for term search (strings)
    pub text: Option<Field>,
    /// Untokenized keys, for filters (strings and enums)
    pub exact: Option<Field>,
    /// Numbers and booleans
    pub value: Option<Field>,
    /// Engine name of `value`; range queries address fields by name
    pub value_name: Option<String>,
}

/// Mapping from the log schema to the search engine schema
pub(crate) struct FieldMap {
    pub schema: TantivySchema,
    pub id: Field,
    pub created_at: Field,
    pub source: Field,
    pub properties: IndexMap<String, PropertyFields>,
}

impl FieldMap {
    pub fn build(schema: &Schema) -> Self {
        let mut builder = TantivySchema::builder();
        let mut names = FieldNames::default();

        let id = builder.add_u64_field(&names.claim(ID_FIELD), INDEXED | STORED | FAST);
        let created_at =
            builder.add_i64_field(&names.claim(CREATED_AT_FIELD), INDEXED | STORED | FAST);
        let source = builder.add_text_field(&names.claim(SOURCE_FIELD), STORED);

        let mut properties = IndexMap::new();
        for field in schema.fields() {
            let name = names.claim(&field.path);
            let mut slot = PropertyFields {
                ty: field.ty,
                text: None,
                exact: None,
                value: None,
                value_name: None,
            };

            match field.ty.element() {
                SchemaType::String => {
                    slot.text = Some(builder.add_text_field(&name, TEXT));
                    let exact_name = names.claim(&format!("{}__exact", name));
                    slot.exact = Some(builder.add_text_field(&exact_name, STRING));
                }
                SchemaType::Enum => {
                    slot.exact = Some(builder.add_text_field(&name, STRING));
                }
                SchemaType::Number => {
                    slot.value = Some(builder.add_f64_field(&name, INDEXED | FAST));
                    slot.value_name = Some(name);
                }
                SchemaType::Boolean => {
                    slot.value = Some(builder.add_bool_field(&name, INDEXED));
                    slot.value_name = Some(name);
                }
                // element() only yields scalar types
                _ => continue,
            }

            properties.insert(field.path, slot);
        }

        Self {
            schema: builder.build(),
            id,
            created_at,
            source,
            properties,
        }
    }

    pub fn get(&self, property: &str) -> Option<&PropertyFields> {
        self.properties.get(property)
    }

    /// Tokenized fields searched by a term, optionally restricted
    pub fn text_fields(&self, restrict: Option<&[String]>) -> Result<Vec<Field>, IndexError> {
        match restrict {
            None => Ok(self.properties.values().filter_map(|p| p.text).collect()),
            Some(properties) => properties
                .iter()
                .map(|property| {
                    let slot = self
                        .get(property)
                        .ok_or_else(|| IndexError::UnknownProperty(property.clone()))?;
                    slot.text.ok_or_else(|| IndexError::InvalidFilter {
                        property: property.clone(),
                        reason: format!("'{}' properties are not searchable", slot.ty.as_str()),
                    })
                })
                .collect(),
        }
    }
}

/// Allocates unique engine field names derived from property paths
#[derive(Default)]
struct FieldNames {
    used: HashSet<String>,
}

impl FieldNames {
    fn claim(&mut self, path: &str) -> String {
        let base: String = path
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();

        let mut name = base.clone();
        let mut n = 1;
        while self.used.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        self.used.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_are_sanitized_and_unique() {
        let mut names = FieldNames::default();
        assert_eq!(names.claim("req.method"), "req_method");
        assert_eq!(names.claim("req_method"), "req_method_1");
        assert_eq!(names.claim("_id"), "_id");
        assert_eq!(names.claim("_id"), "_id_1");
    }

    #[test]
    fn test_fields_per_type() {
        let schema = Schema::new()
            .with_field("msg", SchemaType::String)
            .with_field("level", SchemaType::Enum)
            .with_field("time", SchemaType::Number)
            .with_field("ok", SchemaType::Boolean)
            .with_field("tags", SchemaType::StringArray);
        let map = FieldMap::build(&schema);

        let msg = map.get("msg").unwrap();
        assert!(msg.text.is_some() && msg.exact.is_some());
        let level = map.get("level").unwrap();
        assert!(level.text.is_none() && level.exact.is_some());
        assert_eq!(map.get("time").unwrap().value_name.as_deref(), Some("time"));
        assert!(map.get("ok").unwrap().value.is_some());
        assert!(map.get("tags").unwrap().text.is_some());

        assert_eq!(map.text_fields(None).unwrap().len(), 2);
        assert!(matches!(
            map.text_fields(Some(&["level".to_string()])),
            Err(IndexError::InvalidFilter { .. })
        ));
        assert!(matches!(
            map.text_fields(Some(&["nope".to_string()])),
            Err(IndexError::UnknownProperty(_))
        ));
    }
}
