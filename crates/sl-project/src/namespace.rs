//! Parameter namespace used for property substitution.
//!
//! A diagram may reference an initialization document that defines named
//! parameters. While blocks are parsed, a string property value (or array
//! element) equal to a parameter name is replaced by the parameter's value.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;

use crate::{ProjectError, ProjectResult, is_json_path};

/// Ordered name → value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterNamespace {
    values: IndexMap<String, Value>,
}

impl ParameterNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Replace a string equal to a parameter name by the parameter's value.
    /// Arrays are substituted element-wise; nothing else is touched.
    pub fn substitute(&self, value: &Value) -> Value {
        match value {
            Value::String(name) => self.get(name).cloned().unwrap_or_else(|| value.clone()),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(name) => self.get(name).cloned().unwrap_or_else(|| item.clone()),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl From<IndexMap<String, Value>> for ParameterNamespace {
    fn from(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<(String, Value)> for ParameterNamespace {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Produces the namespace for a diagram's initialization reference.
pub trait NamespaceLoader {
    /// An absent reference yields an empty namespace.
    fn load(&self, reference: Option<&str>) -> ProjectResult<ParameterNamespace>;
}

/// A fixed namespace, whatever the reference.
impl NamespaceLoader for ParameterNamespace {
    fn load(&self, _reference: Option<&str>) -> ProjectResult<ParameterNamespace> {
        Ok(self.clone())
    }
}

/// Reads the reference as a YAML or JSON mapping, relative to `base_dir`.
#[derive(Debug, Clone)]
pub struct FileNamespaceLoader {
    base_dir: PathBuf,
}

impl FileNamespaceLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Loader resolving references next to the given diagram file.
    pub fn for_diagram(diagram_path: &Path) -> Self {
        Self::new(diagram_path.parent().unwrap_or_else(|| Path::new(".")))
    }

    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl NamespaceLoader for FileNamespaceLoader {
    fn load(&self, reference: Option<&str>) -> ProjectResult<ParameterNamespace> {
        let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
            return Ok(ParameterNamespace::new());
        };

        let path = self.resolve(reference);
        let content = std::fs::read_to_string(&path).map_err(|err| ProjectError::Namespace {
            path: path.clone(),
            reason: err.to_string(),
        })?;

        let values: IndexMap<String, Value> = if is_json_path(&path) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(values.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn namespace() -> ParameterNamespace {
        let mut ns = ParameterNamespace::new();
        ns.insert("K", 2.5);
        ns.insert("taps", json!([1, 2, 3]));
        ns
    }

    #[test]
    fn substitute_exact_name() {
        let ns = namespace();
        assert_eq!(ns.substitute(&json!("K")), json!(2.5));
        assert_eq!(ns.substitute(&json!("K2")), json!("K2"));
        assert_eq!(ns.substitute(&json!(7)), json!(7));
        assert_eq!(ns.substitute(&json!("taps")), json!([1, 2, 3]));
    }

    #[test]
    fn substitute_array_elements() {
        let ns = namespace();
        assert_eq!(ns.substitute(&json!(["K", 1, "x"])), json!([2.5, 1, "x"]));
    }

    #[test]
    fn absent_reference_is_empty() {
        let loader = FileNamespaceLoader::new("/nonexistent");
        assert!(loader.load(None).unwrap().is_empty());
        assert!(loader.load(Some("")).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let loader = FileNamespaceLoader::new(std::env::temp_dir());
        let err = loader.load(Some("sl_project_no_such_namespace.yaml")).unwrap_err();
        assert!(matches!(err, ProjectError::Namespace { .. }));
    }

    #[test]
    fn load_yaml_namespace() {
        let dir = std::env::temp_dir();
        let path = dir.join("sl_project_namespace_unit.yaml");
        std::fs::write(&path, "K: 4\nname: pump\n").unwrap();

        let ns = FileNamespaceLoader::new(&dir)
            .load(Some("sl_project_namespace_unit.yaml"))
            .unwrap();
        let names: Vec<&str> = ns.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["K", "name"]);
        assert_eq!(ns.get("K"), Some(&json!(4)));
    }
}
