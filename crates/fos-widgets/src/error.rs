//! Widget errors
//!
//! Only construction-time and bridge failures surface as errors. Everything
//! else (missing targets, repeated show/hide, disabled elements) is a
//! silent no-op.

/// Fatal widget error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("{component}: Option \"{option}\" provided type \"{found}\" but expected type \"{expected}\".")]
    ConfigType {
        component: String,
        option: String,
        found: String,
        expected: String,
    },

    #[error("{component} requires {dependency}")]
    MissingDependency {
        component: &'static str,
        dependency: &'static str,
    },

    #[error("No method named \"{method}\" on {component}")]
    UnknownMethod {
        component: &'static str,
        method: String,
    },

    #[error("No plugin registered as \"{0}\"")]
    UnknownPlugin(String),
}

impl WidgetError {
    pub(crate) fn placement_engine(component: &'static str) -> Self {
        Self::MissingDependency {
            component,
            dependency: "a placement engine",
        }
    }
}
