use serde::Deserialize;
use serde_json::Value;

use pinorama_types::Introspection;

use crate::{Preset, PresetError};

/// Preset file layout shared by the TOML and JSON forms
#[derive(Debug, Deserialize)]
struct PresetDefinition {
    preset: PresetMeta,
    introspection: Introspection,
}

#[derive(Debug, Deserialize)]
struct PresetMeta {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    extends: Option<String>,
}

/// A parsed preset whose base has not been applied yet
#[derive(Debug)]
pub(crate) struct ParsedPreset {
    pub preset: Preset,
    pub extends: Option<String>,
}

impl From<PresetDefinition> for ParsedPreset {
    fn from(def: PresetDefinition) -> Self {
        Self {
            preset: Preset {
                name: def.preset.name,
                description: def.preset.description,
                introspection: def.introspection,
            },
            extends: def.preset.extends,
        }
    }
}

pub(crate) fn parse_toml(content: &str, name: &str) -> Result<ParsedPreset, PresetError> {
    let def: PresetDefinition = toml::from_str(content).map_err(|e| PresetError::Toml {
        name: name.to_string(),
        source: e,
    })?;
    Ok(def.into())
}

/// JSON presets may also be a bare introspection document
pub(crate) fn parse_json(content: &str, name: &str) -> Result<ParsedPreset, PresetError> {
    let to_error = |e| PresetError::Json {
        name: name.to_string(),
        source: e,
    };

    let value: Value = serde_json::from_str(content).map_err(to_error)?;
    if value.get("preset").is_some() {
        let def: PresetDefinition = serde_json::from_value(value).map_err(to_error)?;
        return Ok(def.into());
    }

    let introspection: Introspection = serde_json::from_value(value).map_err(to_error)?;
    Ok(ParsedPreset {
        preset: Preset {
            name: name.to_string(),
            description: String::new(),
            introspection,
        },
        extends: None,
    })
}

/// Apply the `extends` base, looked up among `bases`
pub(crate) fn resolve(parsed: ParsedPreset, bases: &[Preset]) -> Result<Preset, PresetError> {
    let Some(base_name) = parsed.extends else {
        return Ok(parsed.preset);
    };

    let invalid = || PresetError::InvalidBase {
        preset: parsed.preset.name.clone(),
        base: base_name.clone(),
    };
    if base_name == parsed.preset.name {
        return Err(invalid());
    }
    let base = bases.iter().find(|p| p.name == base_name).ok_or_else(invalid)?;

    let mut introspection = base.introspection.clone();
    introspection.extend(&parsed.preset.introspection);

    Ok(Preset {
        introspection,
        ..parsed.preset
    })
}
