//! Error types for ShEx satisfaction checking.

/// Main error type for ShEx operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShexError {
    /// Error in the schema itself.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Error during validation.
    #[error(transparent)]
    Validation(#[from] ShexValidationError),
}

/// Error type for schema construction and eager reference checking.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// Invalid cardinality.
    #[error("Invalid cardinality: min={min}, max={max:?}")]
    InvalidCardinality {
        /// Minimum occurrences.
        min: u32,
        /// Maximum occurrences.
        max: Option<u32>,
    },

    /// Undefined shape reference.
    #[error("Undefined shape reference: {label}")]
    UndefinedShapeRef {
        /// The unresolved label.
        label: String,
    },

    /// Undefined triple expression reference.
    #[error("Undefined triple expression reference: {label}")]
    UndefinedTripleExprRef {
        /// The unresolved label.
        label: String,
    },
}

/// Error type for validation operations.
///
/// These are failures of the validation attempt itself, not of the node
/// being validated: a node that merely does not conform produces an
/// unsatisfied [`ValidationResult`](crate::ValidationResult), never an
/// error. Unresolved references nested inside expressions fail their
/// branch with a reason and let sibling branches run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShexValidationError {
    /// The shape label supplied to a top-level validation call is not in
    /// the schema.
    #[error("Shape not found: {label}")]
    ShapeNotFound {
        /// The unknown label.
        label: String,
    },

    /// The schema has no start expression and no shape label was supplied.
    #[error("Schema has no start expression")]
    NoStart,

    /// A pattern facet in the schema is not a valid regular expression.
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidRegex {
        /// The offending pattern.
        pattern: String,
        /// The regex engine's message, or the unknown flag letter.
        message: String,
    },

    /// The graph collaborator failed while fetching a node's neighborhood.
    /// The engine does not retry; retry policy belongs to the graph.
    #[error("Graph access failed: {source}")]
    Graph {
        /// The underlying graph error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ShexValidationError {
    /// Creates a shape not found error.
    pub fn shape_not_found(label: impl Into<String>) -> Self {
        Self::ShapeNotFound {
            label: label.into(),
        }
    }

    /// Creates an invalid regex error.
    pub fn invalid_regex(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates a graph access error from a collaborator failure.
    pub fn graph(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Graph {
            source: Box::new(source),
        }
    }
}
