use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::value_key;
use crate::schema::Schema;
use crate::CREATED_AT_PROPERTY;

/// How a facet is presented and filtered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    String,
    Enum,
    Number,
    Boolean,
}

/// Table column settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub visible: bool,
    /// Preferred width in pixels
    pub size: u16,
}

impl ColumnConfig {
    pub fn new(visible: bool, size: u16) -> Self {
        Self { visible, size }
    }
}

/// Display label for a property, optionally decoding enum values
///
/// Serialized as `"Title"` or `["Title", {"30": "INFO"}]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Title(String),
    WithValues(String, IndexMap<String, String>),
}

impl Label {
    pub fn title(&self) -> &str {
        match self {
            Self::Title(title) | Self::WithValues(title, _) => title,
        }
    }

    /// Decoded label for a raw value, if one is declared
    pub fn value_label(&self, value: &Value) -> Option<&str> {
        match self {
            Self::Title(_) => None,
            Self::WithValues(_, values) => values.get(&value_key(value)).map(String::as_str),
        }
    }
}

/// Value formatter applied before display
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formatter {
    /// Epoch milliseconds rendered as a date and time
    Timestamp,
}

/// CSS declarations, e.g. `{"color": "var(--color-red-500)"}`
pub type CssStyle = IndexMap<String, String>;

/// Style for a property, optionally specialised per value
///
/// Serialized as `{...}` or `[{...}, {"50": {...}}]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleRule {
    Base(CssStyle),
    WithValues(CssStyle, IndexMap<String, CssStyle>),
}

impl StyleRule {
    pub fn base(&self) -> &CssStyle {
        match self {
            Self::Base(base) | Self::WithValues(base, _) => base,
        }
    }

    /// Per-value styles (empty for plain rules)
    pub fn values(&self) -> Option<&IndexMap<String, CssStyle>> {
        match self {
            Self::Base(_) => None,
            Self::WithValues(_, values) => Some(values),
        }
    }

    /// Base style merged with the style declared for `value`
    pub fn for_value(&self, value: &Value) -> CssStyle {
        let mut style = self.base().clone();
        if let Some(specific) = self.values().and_then(|v| v.get(&value_key(value))) {
            for (prop, decl) in specific {
                style.insert(prop.clone(), decl.clone());
            }
        }
        style
    }
}

/// Everything a viewer needs to know to present the records of an index
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Introspection {
    pub db_schema: Schema,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub facets: IndexMap<String, FacetKind>,
    #[serde(default)]
    pub columns: IndexMap<String, ColumnConfig>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub labels: IndexMap<String, Label>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub formatters: IndexMap<String, Formatter>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub styles: IndexMap<String, StyleRule>,
}

impl Introspection {
    pub fn new(db_schema: Schema) -> Self {
        Self {
            db_schema,
            ..Default::default()
        }
    }

    /// Column title, falling back to the property path
    pub fn label<'a>(&'a self, property: &'a str) -> &'a str {
        self.labels
            .get(property)
            .map(Label::title)
            .unwrap_or(property)
    }

    pub fn value_label(&self, property: &str, value: &Value) -> Option<&str> {
        self.labels.get(property)?.value_label(value)
    }

    pub fn formatter(&self, property: &str) -> Option<Formatter> {
        self.formatters.get(property).copied()
    }

    /// Effective style for a cell (base style when `value` is `None`)
    pub fn style(&self, property: &str, value: Option<&Value>) -> CssStyle {
        match (self.styles.get(property), value) {
            (Some(rule), Some(value)) => rule.for_value(value),
            (Some(rule), None) => rule.base().clone(),
            (None, _) => CssStyle::new(),
        }
    }

    /// Columns shown by default, in declaration order
    pub fn visible_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, c)| c.visible)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Merge another introspection into this one; entries of `other` win
    pub fn extend(&mut self, other: &Introspection) {
        self.db_schema.extend(&other.db_schema);
        self.facets
            .extend(other.facets.iter().map(|(k, v)| (k.clone(), *v)));
        self.columns
            .extend(other.columns.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.labels
            .extend(other.labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.formatters
            .extend(other.formatters.iter().map(|(k, v)| (k.clone(), *v)));
        self.styles
            .extend(other.styles.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Keys referenced by facets/columns/labels/formatters/styles that are not
    /// part of the schema
    pub fn unknown_properties(&self) -> Vec<String> {
        let known = |key: &str| key == CREATED_AT_PROPERTY || self.db_schema.contains(key);

        let mut unknown: Vec<String> = self
            .facets
            .keys()
            .chain(self.columns.keys())
            .chain(self.labels.keys())
            .chain(self.formatters.keys())
            .chain(self.styles.keys())
            .filter(|k| !known(k))
            .cloned()
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }
}
