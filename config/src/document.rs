use crate::ConfigError;
use serde_yaml::{Mapping, Number, Value};

/// An untyped configuration tree as supplied by the operator.
///
/// Backed by a YAML value so that `.nan` survives parsing; JSON and TOML
/// inputs are converted into the same representation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigDocument(Value);

impl ConfigDocument {
    #[must_use]
    pub fn empty() -> Self {
        Self(Value::Mapping(Mapping::new()))
    }

    /// Parses YAML and expands `<<` merge keys.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let mut value: Value = serde_yaml::from_str(content)?;
        value.apply_merge()?;
        Ok(Self(value))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(Self(serde_json::from_str(content)?))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(Self(toml::from_str(content)?))
    }

    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Looks up a dotted path such as `datasource.s3.bucket`.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.0, |current, segment| current.as_mapping()?.get(segment))
    }

    /// Sets a dotted path, creating missing parents.
    ///
    /// Returns `false` and leaves the document untouched when an existing
    /// parent is not a mapping, so the normalizer still reports it.
    pub fn set_path(&mut self, path: &str, value: Value) -> bool {
        if self.0.is_null() {
            self.0 = Value::Mapping(Mapping::new());
        }

        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };

        let mut current = &mut self.0;
        for segment in parents.into_iter().flat_map(|p| p.split('.')) {
            let Value::Mapping(map) = current else {
                return false;
            };
            current = map
                .entry(Value::String(segment.to_string()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
        }

        let Value::Mapping(map) = current else {
            return false;
        };
        map.insert(Value::String(leaf.to_string()), value);
        true
    }

    /// Layers `overlay` on top of this document. Mappings merge key by key;
    /// any other overlay value replaces what was there.
    pub fn merge(&mut self, overlay: Self) {
        merge_values(&mut self.0, overlay.0);
    }
}

impl From<Value> for ConfigDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<serde_json::Value> for ConfigDocument {
    fn from(value: serde_json::Value) -> Self {
        Self(from_json(value))
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::Number(Number::from(u))
            } else if let Some(i) = n.as_i64() {
                Value::Number(Number::from(i))
            } else {
                n.as_f64().map_or(Value::Null, |f| Value::Number(Number::from(f)))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Sequence(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (Value::String(k), from_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_path_walks_nested_mappings() {
        let doc = ConfigDocument::from(json!({"datasource": {"s3": {"bucket": "b"}}}));
        assert_eq!(
            doc.get_path("datasource.s3.bucket"),
            Some(&Value::String("b".to_string()))
        );
        assert_eq!(doc.get_path("datasource.swift.container"), None);
        assert_eq!(doc.get_path("datasource.s3.bucket.deeper"), None);
    }

    #[test]
    fn set_path_creates_parents() {
        let mut doc = ConfigDocument::empty();
        assert!(doc.set_path("core.secret", Value::String("abcdefgh".to_string())));
        assert!(doc.set_path("core.port", Value::Number(8080.into())));
        assert_eq!(doc, ConfigDocument::from(json!({"core": {"secret": "abcdefgh", "port": 8080}})));
    }

    #[test]
    fn set_path_leaves_scalar_parent_alone() {
        let mut doc = ConfigDocument::from(json!({"core": "oops"}));
        assert!(!doc.set_path("core.host", Value::String("127.0.0.1".to_string())));
        assert_eq!(doc, ConfigDocument::from(json!({"core": "oops"})));
    }

    #[test]
    fn set_path_on_empty_file_creates_root() {
        let mut doc = ConfigDocument::from_yaml_str("").unwrap();
        assert!(doc.set_path("core.port", Value::Number(8080.into())));
        assert_eq!(doc, ConfigDocument::from(json!({"core": {"port": 8080}})));
    }

    #[test]
    fn yaml_merge_keys_are_expanded() {
        let yaml = "base: &base\n  secret: abcdefgh\n  database_url: x\ncore:\n  <<: *base\n  port: 8080\n";
        let doc = ConfigDocument::from_yaml_str(yaml).unwrap();
        assert_eq!(
            doc.get_path("core.secret"),
            Some(&Value::String("abcdefgh".to_string()))
        );
        assert_eq!(doc.get_path("core.database_url"), Some(&Value::String("x".to_string())));
        assert_eq!(doc.get_path("core.port"), Some(&Value::Number(8080.into())));
        assert_eq!(doc.get_path("core.<<"), None);
    }

    #[test]
    fn merge_is_recursive_for_mappings_only() {
        let mut base = ConfigDocument::from(json!({
            "core": {"secret": "abcdefgh", "port": 3000},
            "uploader": {"disabled_extensions": ["exe", "sh"]}
        }));
        base.merge(ConfigDocument::from(json!({
            "core": {"port": 8080},
            "uploader": {"disabled_extensions": ["bat"]}
        })));
        assert_eq!(
            base,
            ConfigDocument::from(json!({
                "core": {"secret": "abcdefgh", "port": 8080},
                "uploader": {"disabled_extensions": ["bat"]}
            }))
        );
    }

    #[test]
    fn yaml_keeps_nan() {
        let doc = ConfigDocument::from_yaml_str("color: .nan\n").unwrap();
        let color = doc.get_path("color").and_then(Value::as_f64).unwrap();
        assert!(color.is_nan());
    }

    #[test]
    fn toml_and_json_parse_to_same_tree() {
        let toml = ConfigDocument::from_toml_str("[core]\nsecret = \"abcdefgh\"\nport = 3000\n").unwrap();
        let json = ConfigDocument::from_json_str(r#"{"core": {"secret": "abcdefgh", "port": 3000}}"#).unwrap();
        assert_eq!(toml, json);
    }
}
