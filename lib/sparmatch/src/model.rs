//! ShEx schema model types.
//!
//! This module defines the shape expression and triple expression trees that
//! the satisfaction engine evaluates:
//! - [`ShapeLabel`] / [`TripleExprLabel`] - identifiers for labeled expressions
//! - [`ShapeExpr`] - shape expression (union of all shape variants)
//! - [`TripleExpr`] - triple expression (constraints over a node's edges)
//! - [`NodeConstraint`] - constraints on a node's value (kind, datatype, facets, value set)
//! - [`Cardinality`] - min/max occurrences for triple expressions
//! - [`Schema`] - collection of labeled shape expressions with an optional start

use crate::error::SchemaError;
use oxrdf::{BlankNode, NamedNode, NamedOrBlankNode, Term};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Unique identifier for a shape expression (shape label in ShEx terminology).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeLabel {
    /// Named shape (IRI).
    Iri(NamedNode),
    /// Anonymous shape (blank node).
    BNode(BlankNode),
}

impl ShapeLabel {
    /// Creates a shape label from a named or blank node.
    pub fn from_named_or_blank(node: NamedOrBlankNode) -> Self {
        match node {
            NamedOrBlankNode::NamedNode(n) => Self::Iri(n),
            NamedOrBlankNode::BlankNode(b) => Self::BNode(b),
        }
    }

    /// Returns the shape label as a named node if it is one.
    pub fn as_iri(&self) -> Option<&NamedNode> {
        match self {
            Self::Iri(n) => Some(n),
            Self::BNode(_) => None,
        }
    }
}

impl From<NamedNode> for ShapeLabel {
    fn from(n: NamedNode) -> Self {
        Self::Iri(n)
    }
}

impl From<BlankNode> for ShapeLabel {
    fn from(b: BlankNode) -> Self {
        Self::BNode(b)
    }
}

impl std::fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iri(n) => write!(f, "<{}>", n.as_str()),
            Self::BNode(b) => write!(f, "_:{}", b.as_str()),
        }
    }
}

/// Unique identifier for a triple expression.
///
/// ShEx keeps shape and triple expression labels in separate namespaces,
/// so this is a distinct type from [`ShapeLabel`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TripleExprLabel {
    /// Named triple expression (IRI).
    Iri(NamedNode),
    /// Anonymous triple expression (blank node).
    BNode(BlankNode),
}

impl From<NamedNode> for TripleExprLabel {
    fn from(n: NamedNode) -> Self {
        Self::Iri(n)
    }
}

impl From<BlankNode> for TripleExprLabel {
    fn from(b: BlankNode) -> Self {
        Self::BNode(b)
    }
}

impl std::fmt::Display for TripleExprLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iri(n) => write!(f, "<{}>", n.as_str()),
            Self::BNode(b) => write!(f, "_:{}", b.as_str()),
        }
    }
}

/// Shape expression.
///
/// The main schema type: every variant constrains a focus node, either by
/// its own value ([`NodeConstraint`]) or by the structure of its
/// neighborhood ([`Shape`]), possibly combined with boolean operators.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeExpr {
    /// Conjunction of shape expressions (AND).
    And(ShapeAnd),

    /// Disjunction of shape expressions (OR).
    Or(ShapeOr),

    /// Negation of a shape expression (NOT).
    Not(ShapeNot),

    /// Node constraint - validates properties of the focus node itself.
    NodeConstraint(NodeConstraint),

    /// Shape with a triple expression - validates the focus node's neighborhood.
    Shape(Shape),

    /// Externally defined shape. The engine has no semantics for it and
    /// reports failure rather than silently succeeding.
    External,

    /// Reference to another shape expression by label.
    Ref(ShapeLabel),
}

impl ShapeExpr {
    /// Conjunction of the given shape expressions.
    pub fn and(exprs: Vec<ShapeExpr>) -> Self {
        Self::And(ShapeAnd { label: None, exprs })
    }

    /// Disjunction of the given shape expressions.
    pub fn or(exprs: Vec<ShapeExpr>) -> Self {
        Self::Or(ShapeOr { label: None, exprs })
    }

    /// Negation of the given shape expression.
    pub fn not(expr: ShapeExpr) -> Self {
        Self::Not(ShapeNot {
            label: None,
            expr: Box::new(expr),
        })
    }

    /// Reference to the shape expression with the given label.
    pub fn shape_ref(label: impl Into<ShapeLabel>) -> Self {
        Self::Ref(label.into())
    }

    /// Returns this expression's own label if it carries one.
    pub fn label(&self) -> Option<&ShapeLabel> {
        match self {
            Self::And(e) => e.label.as_ref(),
            Self::Or(e) => e.label.as_ref(),
            Self::Not(e) => e.label.as_ref(),
            Self::Shape(e) => e.label.as_ref(),
            Self::NodeConstraint(_) | Self::External | Self::Ref(_) => None,
        }
    }

    /// Collects all shape and triple expression references in this
    /// expression, without following them.
    pub fn collect_refs<'a>(
        &'a self,
        shape_refs: &mut Vec<&'a ShapeLabel>,
        triple_refs: &mut Vec<&'a TripleExprLabel>,
    ) {
        match self {
            Self::And(e) => {
                for expr in &e.exprs {
                    expr.collect_refs(shape_refs, triple_refs);
                }
            }
            Self::Or(e) => {
                for expr in &e.exprs {
                    expr.collect_refs(shape_refs, triple_refs);
                }
            }
            Self::Not(e) => e.expr.collect_refs(shape_refs, triple_refs),
            Self::Shape(shape) => {
                if let Some(expr) = &shape.expression {
                    expr.collect_refs(shape_refs, triple_refs);
                }
            }
            Self::Ref(label) => shape_refs.push(label),
            Self::NodeConstraint(_) | Self::External => {}
        }
    }
}

/// Labeled conjunction of shape expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeAnd {
    /// Optional label for this expression.
    pub label: Option<ShapeLabel>,
    /// The conjuncts. All must be satisfied.
    pub exprs: Vec<ShapeExpr>,
}

/// Labeled disjunction of shape expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeOr {
    /// Optional label for this expression.
    pub label: Option<ShapeLabel>,
    /// The disjuncts. At least one must be satisfied.
    pub exprs: Vec<ShapeExpr>,
}

/// Labeled negation of a shape expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNot {
    /// Optional label for this expression.
    pub label: Option<ShapeLabel>,
    /// The negated expression.
    pub expr: Box<ShapeExpr>,
}

/// Shape: a structural constraint on the focus node's neighborhood.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Optional label for this shape.
    pub label: Option<ShapeLabel>,

    /// Whether this is a closed shape (no outgoing edges beyond those
    /// matched by the expression or declared EXTRA).
    pub closed: bool,

    /// Predicates whose edges may be left unmatched.
    pub extra: Vec<NamedNode>,

    /// The triple expression the neighborhood must match. A shape without
    /// an expression matches any neighborhood (subject to `closed`).
    pub expression: Option<TripleExpr>,
}

impl Shape {
    /// Creates a new empty shape.
    pub fn new() -> Self {
        Self {
            label: None,
            closed: false,
            extra: Vec::new(),
            expression: None,
        }
    }

    /// Creates a new shape with the given triple expression.
    pub fn with_expression(expression: TripleExpr) -> Self {
        Self {
            label: None,
            closed: false,
            extra: Vec::new(),
            expression: Some(expression),
        }
    }

    /// Sets the label of this shape.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<ShapeLabel>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Marks this shape as closed.
    #[must_use]
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Adds an EXTRA predicate.
    #[must_use]
    pub fn with_extra(mut self, predicate: NamedNode) -> Self {
        self.extra.push(predicate);
        self
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::new()
    }
}

/// Triple expression: describes how a set of a node's edges must be
/// partitioned and matched.
#[derive(Debug, Clone, PartialEq)]
pub enum TripleExpr {
    /// Constraint on a single edge with a cardinality.
    TripleConstraint(TripleConstraint),

    /// Disjunction: one branch must match the whole edge set.
    OneOf(OneOf),

    /// Conjunction: the edge set must be split so that every member matches.
    EachOf(EachOf),

    /// Reference to another triple expression by label.
    Ref(TripleExprLabel),
}

impl TripleExpr {
    /// Returns the cardinality attached to this expression.
    ///
    /// References carry no cardinality of their own; the referenced
    /// expression's cardinality applies after resolution.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::TripleConstraint(tc) => tc.cardinality,
            Self::OneOf(e) => e.cardinality,
            Self::EachOf(e) => e.cardinality,
            Self::Ref(_) => Cardinality::default(),
        }
    }

    /// Returns this expression's own label if it carries one.
    pub fn label(&self) -> Option<&TripleExprLabel> {
        match self {
            Self::TripleConstraint(tc) => tc.label.as_ref(),
            Self::OneOf(e) => e.label.as_ref(),
            Self::EachOf(e) => e.label.as_ref(),
            Self::Ref(_) => None,
        }
    }

    /// Collects all shape and triple expression references in this
    /// expression, without following them.
    pub fn collect_refs<'a>(
        &'a self,
        shape_refs: &mut Vec<&'a ShapeLabel>,
        triple_refs: &mut Vec<&'a TripleExprLabel>,
    ) {
        match self {
            Self::TripleConstraint(tc) => {
                if let Some(value_expr) = &tc.value_expr {
                    value_expr.collect_refs(shape_refs, triple_refs);
                }
            }
            Self::OneOf(e) => {
                for expr in &e.exprs {
                    expr.collect_refs(shape_refs, triple_refs);
                }
            }
            Self::EachOf(e) => {
                for expr in &e.exprs {
                    expr.collect_refs(shape_refs, triple_refs);
                }
            }
            Self::Ref(label) => triple_refs.push(label),
        }
    }
}

/// Constraint on a single edge of the focus node.
///
/// Specifies a predicate, a direction, an optional shape expression the
/// matched endpoint must satisfy, and a cardinality.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleConstraint {
    /// Optional label for this constraint.
    pub label: Option<TripleExprLabel>,

    /// Predicate IRI for this constraint.
    pub predicate: NamedNode,

    /// Whether this constraint matches incoming edges (focus node is the
    /// object) instead of outgoing ones.
    pub inverse: bool,

    /// Optional shape expression the matched endpoint must satisfy: the
    /// object for a forward constraint, the subject for an inverse one.
    pub value_expr: Option<Box<ShapeExpr>>,

    /// Cardinality constraint (min/max occurrences).
    pub cardinality: Cardinality,
}

impl TripleConstraint {
    /// Creates a new triple constraint with the given predicate.
    pub fn new(predicate: NamedNode) -> Self {
        Self {
            label: None,
            predicate,
            inverse: false,
            value_expr: None,
            cardinality: Cardinality::default(),
        }
    }

    /// Sets the value expression of this constraint.
    #[must_use]
    pub fn with_value_expr(mut self, value_expr: ShapeExpr) -> Self {
        self.value_expr = Some(Box::new(value_expr));
        self
    }

    /// Sets the cardinality of this constraint.
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Sets whether this constraint matches incoming edges.
    #[must_use]
    pub fn inverse(mut self) -> Self {
        self.inverse = true;
        self
    }
}

impl From<TripleConstraint> for TripleExpr {
    fn from(tc: TripleConstraint) -> Self {
        Self::TripleConstraint(tc)
    }
}

/// Disjunction of triple expressions with a cardinality.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOf {
    /// Optional label for this expression.
    pub label: Option<TripleExprLabel>,
    /// The alternatives.
    pub exprs: Vec<TripleExpr>,
    /// Cardinality of the whole disjunction.
    pub cardinality: Cardinality,
}

impl OneOf {
    /// Creates a new disjunction of the given expressions.
    pub fn new(exprs: Vec<TripleExpr>) -> Self {
        Self {
            label: None,
            exprs,
            cardinality: Cardinality::default(),
        }
    }

    /// Sets the cardinality of this expression.
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }
}

impl From<OneOf> for TripleExpr {
    fn from(e: OneOf) -> Self {
        Self::OneOf(e)
    }
}

/// Conjunction of triple expressions with a cardinality.
#[derive(Debug, Clone, PartialEq)]
pub struct EachOf {
    /// Optional label for this expression.
    pub label: Option<TripleExprLabel>,
    /// The members. Every member must be matched by its share of the edges.
    pub exprs: Vec<TripleExpr>,
    /// Cardinality of the whole conjunction.
    pub cardinality: Cardinality,
}

impl EachOf {
    /// Creates a new conjunction of the given expressions.
    pub fn new(exprs: Vec<TripleExpr>) -> Self {
        Self {
            label: None,
            exprs,
            cardinality: Cardinality::default(),
        }
    }

    /// Sets the cardinality of this expression.
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }
}

impl From<EachOf> for TripleExpr {
    fn from(e: EachOf) -> Self {
        Self::EachOf(e)
    }
}

/// Cardinality constraint (min/max occurrences).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cardinality {
    /// Minimum number of occurrences (default: 1).
    pub min: u32,

    /// Maximum number of occurrences (`None` = unbounded, default: 1).
    pub max: Option<u32>,
}

impl Cardinality {
    /// Creates a cardinality constraint, rejecting `max < min`.
    pub fn range(min: u32, max: Option<u32>) -> Result<Self, SchemaError> {
        if let Some(max_val) = max {
            if max_val < min {
                return Err(SchemaError::InvalidCardinality { min, max });
            }
        }
        Ok(Self { min, max })
    }

    /// Creates a cardinality constraint for exactly n occurrences.
    pub fn exactly(n: u32) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    /// Creates a cardinality constraint for 0 or 1 occurrence (?).
    pub fn optional() -> Self {
        Self {
            min: 0,
            max: Some(1),
        }
    }

    /// Creates a cardinality constraint for 0 or more occurrences (*).
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// Creates a cardinality constraint for 1 or more occurrences (+).
    pub fn one_or_more() -> Self {
        Self { min: 1, max: None }
    }

    /// Returns true if this cardinality allows the given count.
    pub fn allows(&self, count: u32) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }

    /// Returns true if this is the default cardinality (exactly 1).
    pub fn is_default(&self) -> bool {
        self.min == 1 && self.max == Some(1)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::exactly(1)
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.min, self.max) {
            (0, None) => write!(f, "*"),
            (1, None) => write!(f, "+"),
            (0, Some(1)) => write!(f, "?"),
            (min, None) => write!(f, "{{{min},}}"),
            (min, Some(max)) if min == max => write!(f, "{{{min}}}"),
            (min, Some(max)) => write!(f, "{{{min},{max}}}"),
        }
    }
}

/// Node constraint - validates properties of a node's value.
///
/// Can constrain node kind, datatype, string facets (length, pattern),
/// numeric facets (bounds, digits), and value sets. All present facets must
/// hold; an absent facet is vacuously true.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeConstraint {
    /// Required node kind (IRI, blank node, literal, non-literal).
    pub node_kind: Option<NodeKind>,

    /// Required datatype for literals.
    pub datatype: Option<NamedNode>,

    /// String facets (length, pattern).
    pub string_facets: Vec<StringFacet>,

    /// Numeric facets (bounds, digit counts).
    pub numeric_facets: Vec<NumericFacet>,

    /// Value set constraint. Empty means unconstrained.
    pub values: Vec<ValueSetValue>,
}

impl NodeConstraint {
    /// Creates a new empty node constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node constraint with the given node kind.
    pub fn with_node_kind(node_kind: NodeKind) -> Self {
        Self {
            node_kind: Some(node_kind),
            ..Self::default()
        }
    }

    /// Creates a node constraint with the given datatype.
    pub fn with_datatype(datatype: NamedNode) -> Self {
        Self {
            datatype: Some(datatype),
            ..Self::default()
        }
    }

    /// Adds a string facet.
    #[must_use]
    pub fn with_string_facet(mut self, facet: StringFacet) -> Self {
        self.string_facets.push(facet);
        self
    }

    /// Adds a numeric facet.
    #[must_use]
    pub fn with_numeric_facet(mut self, facet: NumericFacet) -> Self {
        self.numeric_facets.push(facet);
        self
    }

    /// Adds a value to the value set.
    #[must_use]
    pub fn with_value(mut self, value: ValueSetValue) -> Self {
        self.values.push(value);
        self
    }

    /// Returns true if this constraint has no facets at all.
    pub fn is_empty(&self) -> bool {
        self.node_kind.is_none()
            && self.datatype.is_none()
            && self.string_facets.is_empty()
            && self.numeric_facets.is_empty()
            && self.values.is_empty()
    }
}

impl From<NodeConstraint> for ShapeExpr {
    fn from(nc: NodeConstraint) -> Self {
        Self::NodeConstraint(nc)
    }
}

/// Node kind constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// IRI node.
    Iri,
    /// Blank node.
    BNode,
    /// Literal value.
    Literal,
    /// Non-literal (IRI or blank node).
    NonLiteral,
}

impl NodeKind {
    /// Returns true if the given term matches this node kind.
    pub fn matches(&self, term: &Term) -> bool {
        match self {
            Self::Iri => matches!(term, Term::NamedNode(_)),
            Self::BNode => matches!(term, Term::BlankNode(_)),
            Self::Literal => matches!(term, Term::Literal(_)),
            Self::NonLiteral => matches!(term, Term::NamedNode(_) | Term::BlankNode(_)),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iri => write!(f, "IRI"),
            Self::BNode => write!(f, "BNODE"),
            Self::Literal => write!(f, "LITERAL"),
            Self::NonLiteral => write!(f, "NONLITERAL"),
        }
    }
}

/// String facet constraint (length, pattern).
///
/// Lengths are counted in Unicode code points of the node's lexical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFacet {
    /// Exact string length.
    Length(usize),
    /// Minimum string length.
    MinLength(usize),
    /// Maximum string length.
    MaxLength(usize),
    /// Regular expression pattern.
    Pattern {
        /// Regex pattern.
        pattern: String,
        /// Optional flag letters (`s`, `m`, `i`, `x`, `q`).
        flags: Option<String>,
    },
}

/// Numeric facet constraint (bounds, digit counts).
///
/// Only applicable to literals with a decimal-derived or floating datatype;
/// comparisons are numeric, never lexical.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericFacet {
    /// Minimum inclusive value.
    MinInclusive(oxrdf::Literal),
    /// Minimum exclusive value.
    MinExclusive(oxrdf::Literal),
    /// Maximum inclusive value.
    MaxInclusive(oxrdf::Literal),
    /// Maximum exclusive value.
    MaxExclusive(oxrdf::Literal),
    /// Maximum total number of digits of the canonical decimal form.
    TotalDigits(u32),
    /// Maximum number of fraction digits of the canonical decimal form.
    FractionDigits(u32),
}

/// Stem of a stem-range value: a prefix, or a wildcard matching everything
/// of the stem's kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StemPattern {
    /// Prefix match.
    Prefix(String),
    /// Matches every value of the range's kind.
    Wildcard,
}

/// Value in a value set constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSetValue {
    /// Exact RDF term.
    ObjectValue(Term),

    /// Language-tagged string with exactly this language tag.
    Language(String),

    /// IRI prefix match.
    IriStem(String),

    /// IRI stem with exclusions.
    IriStemRange {
        /// Stem to match.
        stem: StemPattern,
        /// Narrower stems or exact values that must not match.
        exclusions: Vec<ValueSetValue>,
    },

    /// Literal lexical-form prefix match.
    LiteralStem(String),

    /// Literal stem with exclusions.
    LiteralStemRange {
        /// Stem to match.
        stem: StemPattern,
        /// Narrower stems or exact values that must not match.
        exclusions: Vec<ValueSetValue>,
    },

    /// Language-tag prefix match (by subtag boundaries).
    LanguageStem(String),

    /// Language stem with exclusions.
    LanguageStemRange {
        /// Stem to match.
        stem: StemPattern,
        /// Narrower stems or exact values that must not match.
        exclusions: Vec<ValueSetValue>,
    },
}

impl ValueSetValue {
    /// Creates an IRI stem value.
    pub fn iri_stem(stem: impl Into<String>) -> Self {
        Self::IriStem(stem.into())
    }

    /// Creates a literal stem value.
    pub fn literal_stem(stem: impl Into<String>) -> Self {
        Self::LiteralStem(stem.into())
    }

    /// Creates a language stem value.
    pub fn language_stem(stem: impl Into<String>) -> Self {
        Self::LanguageStem(stem.into())
    }
}

/// Collection of shape expressions indexed by label (shapes schema in ShEx
/// terminology), with an optional start expression.
///
/// Schemas are immutable for the lifetime of a validation run; reference
/// resolution stays lazy, so a dangling label is a validation-time failure
/// of the referencing branch rather than a construction error.
/// [`Schema::check_refs`] performs the eager check when wanted.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Shape expressions indexed by label.
    shapes: FxHashMap<ShapeLabel, Arc<ShapeExpr>>,

    /// Optional start expression (default entry point for validation).
    start: Option<ShapeExpr>,

    /// All shape labels, in insertion order.
    labels: Vec<ShapeLabel>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shape expression with the given label.
    pub fn add_shape(&mut self, label: impl Into<ShapeLabel>, expr: ShapeExpr) {
        let label = label.into();
        if !self.shapes.contains_key(&label) {
            self.labels.push(label.clone());
        }
        self.shapes.insert(label, Arc::new(expr));
    }

    /// Gets a shape expression by label.
    pub fn get_shape(&self, label: &ShapeLabel) -> Option<&Arc<ShapeExpr>> {
        self.shapes.get(label)
    }

    /// Returns an iterator over all shape labels, in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &ShapeLabel> {
        self.labels.iter()
    }

    /// Returns an iterator over all labeled shape expressions.
    pub fn shapes(&self) -> impl Iterator<Item = (&ShapeLabel, &Arc<ShapeExpr>)> {
        self.shapes.iter()
    }

    /// Sets the start expression.
    pub fn set_start(&mut self, expr: ShapeExpr) {
        self.start = Some(expr);
    }

    /// Gets the start expression.
    pub fn start(&self) -> Option<&ShapeExpr> {
        self.start.as_ref()
    }

    /// Returns true if the schema has no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Returns the number of labeled shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Checks that every reference in the schema resolves, including
    /// references to labels that only appear nested inside other
    /// expressions.
    pub fn check_refs(&self) -> Result<(), SchemaError> {
        let index = crate::schema::SchemaIndex::new(self);
        let mut shape_refs = Vec::new();
        let mut triple_refs = Vec::new();
        for expr in self.shapes.values() {
            expr.collect_refs(&mut shape_refs, &mut triple_refs);
        }
        if let Some(start) = &self.start {
            start.collect_refs(&mut shape_refs, &mut triple_refs);
        }
        for label in shape_refs {
            if index.shape(label).is_none() {
                return Err(SchemaError::UndefinedShapeRef {
                    label: label.to_string(),
                });
            }
        }
        for label in triple_refs {
            if index.triple_expr(label).is_none() {
                return Err(SchemaError::UndefinedTripleExprRef {
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }
}
