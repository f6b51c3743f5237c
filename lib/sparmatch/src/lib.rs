//! ShEx shape expression satisfaction for RDF graphs.
//!
//! This crate implements the core ShEx validation semantics: deciding
//! whether a focus node in an RDF graph conforms to a shape expression. It
//! covers the recursive satisfaction engine (boolean combinators, shapes,
//! node constraints, references over cyclic schemas) and the triple
//! expression matcher, which assigns a node's edges to sub-expressions
//! under min/max cardinalities and closed/EXTRA policies by lazily
//! enumerating restricted set partitions.
//!
//! Schema parsing is out of scope: schemas are built programmatically (or
//! by an external parser) from the types in this crate. The graph is
//! consumed through the minimal [`NeighborhoodSource`] capability, which
//! [`oxrdf::Graph`] implements.
//!
//! # Quick start
//!
//! ```rust
//! use oxrdf::{Graph, NamedNode, Term, TripleRef};
//! use sparmatch::{Schema, Shape, ShapeExpr, ShapeLabel, ShexValidator, TripleConstraint};
//!
//! let name = NamedNode::new("http://xmlns.com/foaf/0.1/name")?;
//! let alice = NamedNode::new("http://example.org/alice")?;
//!
//! // ex:PersonShape { foaf:name . }
//! let mut schema = Schema::new();
//! let label = ShapeLabel::from(NamedNode::new("http://example.org/PersonShape")?);
//! schema.add_shape(
//!     label.clone(),
//!     ShapeExpr::Shape(Shape::with_expression(
//!         TripleConstraint::new(name.clone()).into(),
//!     )),
//! );
//!
//! let mut graph = Graph::new();
//! graph.insert(TripleRef::new(
//!     &alice,
//!     &name,
//!     &oxrdf::Literal::new_simple_literal("Alice"),
//! ));
//!
//! let validator = ShexValidator::new(schema);
//! let result = validator.validate(&graph, &Term::NamedNode(alice), &label)?;
//! assert!(result.is_valid());
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod constraints;
mod error;
mod graph;
mod matcher;
mod model;
mod partitions;
mod result;
mod schema;
mod validator;

pub use error::{SchemaError, ShexError, ShexValidationError};
pub use graph::NeighborhoodSource;
pub use model::{
    Cardinality, EachOf, NodeConstraint, NodeKind, NumericFacet, OneOf, Schema, Shape, ShapeAnd,
    ShapeExpr, ShapeLabel, ShapeNot, ShapeOr, StemPattern, StringFacet, TripleConstraint,
    TripleExpr, TripleExprLabel, ValueSetValue,
};
pub use partitions::{ExactPartitions, RangePartitions, partitions_exact, partitions_range};
pub use result::ValidationResult;
pub use schema::SchemaIndex;
pub use validator::ShexValidator;
