//! Transpilers for embedded DSL expressions such as ``afx`<div/>` ``.
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

pub type DslError = Box<dyn std::error::Error + Send + Sync>;

/// Turns the code of a DSL expression into Fusion source. The output is
/// parsed as the right hand side of an assignment.
pub trait DslTranspiler: Send + Sync {
    fn transpile(&self, identifier: &str, code: &str) -> Result<String, DslError>;
}

impl<F> DslTranspiler for F
where
    F: Fn(&str, &str) -> Result<String, DslError> + Send + Sync,
{
    fn transpile(&self, identifier: &str, code: &str) -> Result<String, DslError> {
        self(identifier, code)
    }
}

#[derive(Debug, Error)]
#[error("the fusion dsl `{0}` is not registered")]
pub struct UnknownDsl(pub String);

type Transpile = Box<dyn Fn(&str) -> Result<String, DslError> + Send + Sync>;

/// Transpilers keyed by DSL identifier.
#[derive(Default)]
pub struct DslRegistry {
    transpilers: IndexMap<String, Transpile>,
}

impl DslRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `transpiler` for `identifier`, replacing an earlier one.
    pub fn register<F>(&mut self, identifier: impl Into<String>, transpiler: F)
    where
        F: Fn(&str) -> Result<String, DslError> + Send + Sync + 'static,
    {
        self.transpilers
            .insert(identifier.into(), Box::new(transpiler));
    }

    pub fn with<F>(mut self, identifier: impl Into<String>, transpiler: F) -> Self
    where
        F: Fn(&str) -> Result<String, DslError> + Send + Sync + 'static,
    {
        self.register(identifier, transpiler);
        self
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.transpilers.keys().map(String::as_str)
    }
}

impl fmt::Debug for DslRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DslRegistry")
            .field("identifiers", &self.identifiers().collect::<Vec<_>>())
            .finish()
    }
}

impl DslTranspiler for DslRegistry {
    fn transpile(&self, identifier: &str, code: &str) -> Result<String, DslError> {
        let transpiler = self
            .transpilers
            .get(identifier)
            .ok_or_else(|| UnknownDsl(identifier.to_string()))?;
        transpiler(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_dispatches_by_identifier() {
        let registry = DslRegistry::new()
            .with("upper", |code: &str| Ok(format!("'{}'", code.to_uppercase())))
            .with("fail", |_: &str| Err("nope".into()));

        assert_eq!(registry.transpile("upper", "abc").unwrap(), "'ABC'");
        assert_eq!(registry.transpile("fail", "abc").unwrap_err().to_string(), "nope");
        assert_eq!(
            registry.transpile("afx", "<div/>").unwrap_err().to_string(),
            "the fusion dsl `afx` is not registered"
        );
        assert_eq!(registry.identifiers().collect::<Vec<_>>(), ["upper", "fail"]);
    }

    #[test]
    fn closures_are_transpilers() {
        let echo = |identifier: &str, code: &str| -> Result<String, DslError> {
            Ok(format!("'{identifier}:{code}'"))
        };
        assert_eq!(echo.transpile("x", "y").unwrap(), "'x:y'");
    }
}
