use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Type of a schema property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "enum")]
    Enum,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "number[]")]
    NumberArray,
    #[serde(rename = "boolean[]")]
    BooleanArray,
    #[serde(rename = "enum[]")]
    EnumArray,
}

impl SchemaType {
    /// Whether values of this type are arrays
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::StringArray | Self::NumberArray | Self::BooleanArray | Self::EnumArray
        )
    }

    /// The scalar type of each value (identity for scalar types)
    pub fn element(&self) -> SchemaType {
        match self {
            Self::StringArray => Self::String,
            Self::NumberArray => Self::Number,
            Self::BooleanArray => Self::Boolean,
            Self::EnumArray => Self::Enum,
            other => *other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::StringArray => "string[]",
            Self::NumberArray => "number[]",
            Self::BooleanArray => "boolean[]",
            Self::EnumArray => "enum[]",
        }
    }
}

/// A schema entry: either a leaf type or a nested object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaNode {
    Type(SchemaType),
    Nested(Schema),
}

/// A flattened schema property
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaField {
    /// Dot-separated path (`req.method`)
    pub path: String,
    pub ty: SchemaType,
}

/// Log record schema, possibly nested, in declaration order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    nodes: IndexMap<String, SchemaNode>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property by dot path, creating intermediate objects
    pub fn with_field(mut self, path: &str, ty: SchemaType) -> Self {
        self.insert(path, ty);
        self
    }

    /// Insert a property by dot path, replacing any previous entry
    pub fn insert(&mut self, path: &str, ty: SchemaType) {
        match path.split_once('.') {
            None => {
                self.nodes.insert(path.to_string(), SchemaNode::Type(ty));
            }
            Some((head, rest)) => {
                let node = self
                    .nodes
                    .entry(head.to_string())
                    .or_insert_with(|| SchemaNode::Nested(Schema::new()));
                if let SchemaNode::Type(_) = node {
                    *node = SchemaNode::Nested(Schema::new());
                }
                if let SchemaNode::Nested(nested) = node {
                    nested.insert(rest, ty);
                }
            }
        }
    }

    /// Look up the type of a property by dot path
    pub fn get(&self, path: &str) -> Option<SchemaType> {
        match path.split_once('.') {
            None => match self.nodes.get(path)? {
                SchemaNode::Type(ty) => Some(*ty),
                SchemaNode::Nested(_) => None,
            },
            Some((head, rest)) => match self.nodes.get(head)? {
                SchemaNode::Nested(nested) => nested.get(rest),
                SchemaNode::Type(_) => None,
            },
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// All leaf properties, flattened to dot paths in declaration order
    pub fn fields(&self) -> Vec<SchemaField> {
        let mut out = Vec::new();
        self.collect_fields("", &mut out);
        out
    }

    fn collect_fields(&self, prefix: &str, out: &mut Vec<SchemaField>) {
        for (name, node) in &self.nodes {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            match node {
                SchemaNode::Type(ty) => out.push(SchemaField { path, ty: *ty }),
                SchemaNode::Nested(nested) => nested.collect_fields(&path, out),
            }
        }
    }

    /// Merge another schema into this one; properties of `other` win
    pub fn extend(&mut self, other: &Schema) {
        for field in other.fields() {
            self.insert(&field.path, field.ty);
        }
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_fields_flatten_in_order() {
        let schema = Schema::new()
            .with_field("time", SchemaType::Number)
            .with_field("req.method", SchemaType::String)
            .with_field("req.url", SchemaType::String)
            .with_field("level", SchemaType::Enum);

        let paths: Vec<String> = schema.fields().into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec!["time", "req.method", "req.url", "level"]);
        assert_eq!(schema.get("req.url"), Some(SchemaType::String));
        assert_eq!(schema.get("req"), None);
        assert_eq!(schema.len(), 4);
    }

    #[test]
    fn test_deserialize_nested_json() {
        let json = r#"{"msg":"string","tags":"string[]","res":{"statusCode":"number"}}"#;
        let schema: Schema = serde_json::from_str(json).unwrap();

        assert_eq!(schema.get("tags"), Some(SchemaType::StringArray));
        assert_eq!(schema.get("res.statusCode"), Some(SchemaType::Number));
        assert_eq!(serde_json::to_string(&schema).unwrap(), json);
    }

    #[test]
    fn test_extend_overrides_types() {
        let mut base = Schema::new().with_field("pid", SchemaType::Enum);
        let other = Schema::new()
            .with_field("pid", SchemaType::Number)
            .with_field("req.id", SchemaType::String);
        base.extend(&other);

        assert_eq!(base.get("pid"), Some(SchemaType::Number));
        assert!(base.contains("req.id"));
    }

    #[test]
    fn test_array_element_type() {
        assert!(SchemaType::EnumArray.is_array());
        assert_eq!(SchemaType::EnumArray.element(), SchemaType::Enum);
        assert_eq!(SchemaType::Boolean.element(), SchemaType::Boolean);
    }
}
