//! The graph collaborator surface.
//!
//! The engine consumes the graph through the minimal capability it needs:
//! fetching a node's outgoing and incoming triples. Every call is treated
//! as potentially expensive (the source may be remote or lazily
//! materialized), so each accessor is invoked at most once per focus node
//! per satisfaction attempt, and failures are surfaced as validation
//! errors rather than retried.

use oxrdf::{Graph, Term, Triple};
use std::convert::Infallible;

/// Minimal query capability over a triple source.
pub trait NeighborhoodSource {
    /// Error reported by the underlying source.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the triples with the given node as subject.
    fn arcs_out(&self, node: &Term) -> Result<Vec<Triple>, Self::Error>;

    /// Returns the triples with the given node as object.
    fn arcs_in(&self, node: &Term) -> Result<Vec<Triple>, Self::Error>;
}

impl NeighborhoodSource for Graph {
    type Error = Infallible;

    #[allow(unreachable_patterns)]
    fn arcs_out(&self, node: &Term) -> Result<Vec<Triple>, Infallible> {
        Ok(match node {
            Term::NamedNode(n) => self
                .triples_for_subject(n)
                .map(|t| t.into_owned())
                .collect(),
            Term::BlankNode(b) => self
                .triples_for_subject(b)
                .map(|t| t.into_owned())
                .collect(),
            // Literals cannot be subjects.
            _ => Vec::new(),
        })
    }

    fn arcs_in(&self, node: &Term) -> Result<Vec<Triple>, Infallible> {
        Ok(self
            .triples_for_object(node)
            .map(|t| t.into_owned())
            .collect())
    }
}
