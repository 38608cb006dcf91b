//! Engine configuration.
//!
//! Every transform has a `*_with(&config)` variant; the plain variants use
//! [`EngineConfig::default`]. A configuration can be loaded from TOML:
//!
//! ```toml
//! [simplify]
//! max_passes = 32
//!
//! [quadrature]
//! relative_tolerance = 1e-10
//! absolute_tolerance = 1e-13
//! max_depth = 25
//! ```
//! Missing tables or keys keep their defaults, unknown keys are ignored.
use crate::symbolic::symbolic_error::{SymbolicError, SymbolicResult};
use std::path::Path;
use toml::{Table, Value};

/// Budget of the fixed-point simplifier.
#[derive(Clone, Debug, PartialEq)]
pub struct SimplifyConfig {
    pub max_passes: usize,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        SimplifyConfig { max_passes: 16 }
    }
}

/// Stopping rule of the adaptive Simpson fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadratureConfig {
    pub relative_tolerance: f64,
    pub absolute_tolerance: f64,
    pub max_depth: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        QuadratureConfig {
            relative_tolerance: 1e-9,
            absolute_tolerance: 1e-12,
            max_depth: 20,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineConfig {
    pub simplify: SimplifyConfig,
    pub quadrature: QuadratureConfig,
}

fn read_float(table: &Table, key: &str, default: f64) -> SymbolicResult<f64> {
    match table.get(key) {
        None => Ok(default),
        Some(Value::Float(v)) => Ok(*v),
        Some(Value::Integer(v)) => Ok(*v as f64),
        Some(other) => Err(SymbolicError::Config(format!(
            "'{}' must be a number, found {}",
            key,
            other.type_str()
        ))),
    }
}

fn read_count(table: &Table, key: &str, default: usize) -> SymbolicResult<usize> {
    match table.get(key) {
        None => Ok(default),
        Some(Value::Integer(v)) if *v > 0 => Ok(*v as usize),
        Some(other) => Err(SymbolicError::Config(format!(
            "'{}' must be a positive integer, found {}",
            key, other
        ))),
    }
}

fn sub_table<'a>(root: &'a Table, name: &str) -> SymbolicResult<Option<&'a Table>> {
    match root.get(name) {
        None => Ok(None),
        Some(Value::Table(t)) => Ok(Some(t)),
        Some(_) => Err(SymbolicError::Config(format!("[{}] must be a table", name))),
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> SymbolicResult<EngineConfig> {
        let root: Table =
            toml::from_str(text).map_err(|e| SymbolicError::Config(e.to_string()))?;
        let mut config = EngineConfig::default();
        if let Some(simplify) = sub_table(&root, "simplify")? {
            config.simplify.max_passes =
                read_count(simplify, "max_passes", config.simplify.max_passes)?;
        }
        if let Some(quad) = sub_table(&root, "quadrature")? {
            let defaults = &config.quadrature;
            config.quadrature = QuadratureConfig {
                relative_tolerance: read_float(quad, "relative_tolerance", defaults.relative_tolerance)?,
                absolute_tolerance: read_float(quad, "absolute_tolerance", defaults.absolute_tolerance)?,
                max_depth: read_count(quad, "max_depth", defaults.max_depth)?,
            };
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> SymbolicResult<EngineConfig> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SymbolicError::Config(format!("{}: {}", path.display(), e)))?;
        EngineConfig::from_toml_str(&text)
    }

    fn validate(&self) -> SymbolicResult<()> {
        let q = &self.quadrature;
        if !(q.relative_tolerance > 0.0) {
            return Err(SymbolicError::Config(format!(
                "quadrature relative_tolerance must be positive, found {}",
                q.relative_tolerance
            )));
        }
        if !(q.absolute_tolerance >= 0.0) {
            return Err(SymbolicError::Config(format!(
                "quadrature absolute_tolerance must be non-negative, found {}",
                q.absolute_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.simplify.max_passes, 16);
        assert_eq!(config.quadrature.relative_tolerance, 1e-9);
        assert_eq!(config.quadrature.max_depth, 20);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [quadrature]
            max_depth = 12
            relative_tolerance = 1e-6
            unknown = "ignored"
            "#,
        )
        .unwrap();
        assert_eq!(config.quadrature.max_depth, 12);
        assert_eq!(config.quadrature.relative_tolerance, 1e-6);
        assert_eq!(config.quadrature.absolute_tolerance, 1e-12);
        assert_eq!(config.simplify, SimplifyConfig::default());
    }

    #[test]
    fn test_wrong_types_are_config_errors() {
        let err = EngineConfig::from_toml_str("[simplify]\nmax_passes = \"many\"").unwrap_err();
        assert!(matches!(err, SymbolicError::Config(_)));
        let err = EngineConfig::from_toml_str("simplify = 3").unwrap_err();
        assert!(matches!(err, SymbolicError::Config(_)));
        let err = EngineConfig::from_toml_str("[quadrature]\nrelative_tolerance = -1.0").unwrap_err();
        assert!(matches!(err, SymbolicError::Config(_)));
    }

    #[test]
    fn test_tolerance_bounds() {
        let config = EngineConfig::from_toml_str("[quadrature]\nabsolute_tolerance = 0.0").unwrap();
        assert_eq!(config.quadrature.absolute_tolerance, 0.0);
        let err = EngineConfig::from_toml_str("[quadrature]\nabsolute_tolerance = -1e-9").unwrap_err();
        assert_eq!(
            err,
            SymbolicError::Config("quadrature absolute_tolerance must be non-negative, found -0.000000001".to_string())
        );
        let err = EngineConfig::from_toml_str("[quadrature]\nrelative_tolerance = 0.0").unwrap_err();
        assert_eq!(
            err,
            SymbolicError::Config("quadrature relative_tolerance must be positive, found 0".to_string())
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simplify]\nmax_passes = 4").unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.simplify.max_passes, 4);
        assert!(EngineConfig::from_file(Path::new("/nonexistent/engine.toml")).is_err());
    }
}
