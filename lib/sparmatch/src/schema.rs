//! Schema indexing and recursion tracking.
//!
//! [`SchemaIndex`] is built once per validator from a [`Schema`]: a single
//! traversal collecting every labeled shape and triple expression into
//! lookup tables, stopping at the first re-encounter of a label so that
//! self-referential schemas index in time proportional to the schema size.
//!
//! [`VisitState`] is the per-call recursion guard. Shape visits are keyed
//! by `(focus node, shape label)` - the pair, not the bare label - so that
//! chains through the same shape at different nodes (a linked list shape,
//! say) are not mistaken for cycles. Triple expression expansion is keyed
//! by label alone, since re-entering a triple expression label without
//! passing through a shape is never well-founded.

use crate::model::{Schema, ShapeExpr, ShapeLabel, TripleExpr, TripleExprLabel};
use oxrdf::Term;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Label lookup tables over a schema graph.
#[derive(Debug, Default)]
pub struct SchemaIndex {
    shapes: FxHashMap<ShapeLabel, Arc<ShapeExpr>>,
    triple_exprs: FxHashMap<TripleExprLabel, Arc<TripleExpr>>,
}

impl SchemaIndex {
    /// Indexes a schema.
    pub fn new(schema: &Schema) -> Self {
        let mut index = Self::default();
        for (label, expr) in schema.shapes() {
            if !index.shapes.contains_key(label) {
                index.shapes.insert(label.clone(), Arc::clone(expr));
            }
            if let Some(own) = expr.label() {
                if own != label && !index.shapes.contains_key(own) {
                    index
                        .shapes
                        .insert(own.clone(), Arc::new(expr.as_ref().clone()));
                }
            }
            index.visit_shape_children(expr);
        }
        if let Some(start) = schema.start() {
            index.visit_shape_expr(start);
        }
        index
    }

    /// Resolves a shape label.
    pub fn shape(&self, label: &ShapeLabel) -> Option<&Arc<ShapeExpr>> {
        self.shapes.get(label)
    }

    /// Resolves a triple expression label.
    pub fn triple_expr(&self, label: &TripleExprLabel) -> Option<&Arc<TripleExpr>> {
        self.triple_exprs.get(label)
    }

    fn visit_shape_expr(&mut self, expr: &ShapeExpr) {
        if let Some(label) = expr.label() {
            if self.shapes.contains_key(label) {
                return;
            }
            self.shapes.insert(label.clone(), Arc::new(expr.clone()));
        }
        self.visit_shape_children(expr);
    }

    fn visit_shape_children(&mut self, expr: &ShapeExpr) {
        match expr {
            ShapeExpr::And(e) => {
                for child in &e.exprs {
                    self.visit_shape_expr(child);
                }
            }
            ShapeExpr::Or(e) => {
                for child in &e.exprs {
                    self.visit_shape_expr(child);
                }
            }
            ShapeExpr::Not(e) => self.visit_shape_expr(&e.expr),
            ShapeExpr::Shape(shape) => {
                if let Some(te) = &shape.expression {
                    self.visit_triple_expr(te);
                }
            }
            ShapeExpr::NodeConstraint(_) | ShapeExpr::External | ShapeExpr::Ref(_) => {}
        }
    }

    fn visit_triple_expr(&mut self, expr: &TripleExpr) {
        if let Some(label) = expr.label() {
            if self.triple_exprs.contains_key(label) {
                return;
            }
            self.triple_exprs
                .insert(label.clone(), Arc::new(expr.clone()));
        }
        match expr {
            TripleExpr::TripleConstraint(tc) => {
                if let Some(value_expr) = &tc.value_expr {
                    self.visit_shape_expr(value_expr);
                }
            }
            TripleExpr::OneOf(e) => {
                for child in &e.exprs {
                    self.visit_triple_expr(child);
                }
            }
            TripleExpr::EachOf(e) => {
                for child in &e.exprs {
                    self.visit_triple_expr(child);
                }
            }
            TripleExpr::Ref(_) => {}
        }
    }
}

/// Per-call recursion guard.
///
/// Created fresh for every top-level validation call and discarded after.
/// A `(node, label)` pair found already in the visiting set signals a cycle
/// and resolves to the documented policy (provisional success) instead of
/// descending further.
#[derive(Debug, Default)]
pub(crate) struct VisitState {
    visiting: FxHashSet<(Term, ShapeLabel)>,
    expanding: FxHashSet<TripleExprLabel>,
}

impl VisitState {
    /// Marks a shape visit. Returns false if the pair is already being
    /// visited (a cycle).
    pub(crate) fn enter_shape(&mut self, node: &Term, label: &ShapeLabel) -> bool {
        self.visiting.insert((node.clone(), label.clone()))
    }

    pub(crate) fn leave_shape(&mut self, node: &Term, label: &ShapeLabel) {
        self.visiting.remove(&(node.clone(), label.clone()));
    }

    /// Marks a triple expression expansion. Returns false if the label is
    /// already being expanded.
    pub(crate) fn enter_triple_expr(&mut self, label: &TripleExprLabel) -> bool {
        self.expanding.insert(label.clone())
    }

    pub(crate) fn leave_triple_expr(&mut self, label: &TripleExprLabel) {
        self.expanding.remove(label);
    }
}
