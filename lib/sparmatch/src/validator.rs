//! Shape expression satisfaction.
//!
//! The top-level recursive boolean evaluator: exhaustive dispatch over
//! [`ShapeExpr`] variants, mutually recursive with the triple expression
//! matcher through shapes and triple constraint value expressions. All
//! state lives in the per-call [`EvalContext`]; the validator itself is
//! immutable after construction and can be shared across threads, with
//! concurrent calls each carrying their own context.

use crate::constraints::{check_node_constraint, RegexCache};
use crate::error::ShexValidationError;
use crate::graph::NeighborhoodSource;
use crate::matcher::{expression_predicates, matches};
use crate::model::{Schema, Shape, ShapeExpr, ShapeLabel, TripleExpr};
use crate::result::ValidationResult;
use crate::schema::{SchemaIndex, VisitState};
use oxrdf::{Term, Triple};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// ShEx validator: checks focus nodes against the shapes of a schema.
#[derive(Debug)]
pub struct ShexValidator {
    schema: Schema,
    index: SchemaIndex,
}

impl ShexValidator {
    /// Creates a validator for the given schema, indexing it once.
    pub fn new(schema: Schema) -> Self {
        let index = SchemaIndex::new(&schema);
        Self { schema, index }
    }

    /// Returns a reference to the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Checks whether the focus node satisfies the shape with the given
    /// label.
    ///
    /// An unknown top-level label is an error; unresolved references
    /// nested inside the schema only fail their own branch.
    pub fn validate<G: NeighborhoodSource>(
        &self,
        graph: &G,
        node: &Term,
        shape_label: &ShapeLabel,
    ) -> Result<ValidationResult, ShexValidationError> {
        if self.index.shape(shape_label).is_none() {
            return Err(ShexValidationError::shape_not_found(shape_label.to_string()));
        }
        let mut ctx = EvalContext::new(graph, &self.index);
        let satisfied = satisfies_ref(&mut ctx, node, shape_label)?;
        Ok(ctx.into_result(satisfied))
    }

    /// Checks whether the focus node satisfies the schema's start
    /// expression. Errors if the schema declares no start.
    pub fn validate_start<G: NeighborhoodSource>(
        &self,
        graph: &G,
        node: &Term,
    ) -> Result<ValidationResult, ShexValidationError> {
        let Some(start) = self.schema.start() else {
            return Err(ShexValidationError::NoStart);
        };
        let mut ctx = EvalContext::new(graph, &self.index);
        let satisfied = satisfies(&mut ctx, node, start)?;
        Ok(ctx.into_result(satisfied))
    }
}

/// Per-call evaluation state: the graph and index collaborators, the
/// recursion guard, the compiled-pattern cache and the reason trace.
pub(crate) struct EvalContext<'a, G: NeighborhoodSource> {
    pub(crate) graph: &'a G,
    pub(crate) index: &'a SchemaIndex,
    pub(crate) visits: VisitState,
    pub(crate) regexes: RegexCache,
    reasons: Vec<String>,
}

impl<'a, G: NeighborhoodSource> EvalContext<'a, G> {
    fn new(graph: &'a G, index: &'a SchemaIndex) -> Self {
        Self {
            graph,
            index,
            visits: VisitState::default(),
            regexes: RegexCache::default(),
            reasons: Vec::new(),
        }
    }

    /// Records a failure reason for diagnostics.
    pub(crate) fn reason(&mut self, message: String) {
        self.reasons.push(message);
    }

    fn into_result(self, satisfied: bool) -> ValidationResult {
        if satisfied {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(self.reasons)
        }
    }
}

/// Checks whether a node satisfies a shape expression.
pub(crate) fn satisfies<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    node: &Term,
    expr: &ShapeExpr,
) -> Result<bool, ShexValidationError> {
    match expr {
        ShapeExpr::NodeConstraint(constraint) => {
            let failures = check_node_constraint(node, constraint, &mut ctx.regexes)?;
            if failures.is_empty() {
                Ok(true)
            } else {
                ctx.reasons.extend(failures);
                Ok(false)
            }
        }
        ShapeExpr::Shape(shape) => satisfies_shape(ctx, node, shape),
        ShapeExpr::And(and) => {
            for member in &and.exprs {
                if !satisfies(ctx, node, member)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        ShapeExpr::Or(or) => {
            for member in &or.exprs {
                if satisfies(ctx, node, member)? {
                    return Ok(true);
                }
            }
            ctx.reason(format!(
                "Node {node} satisfies none of the {} alternatives",
                or.exprs.len()
            ));
            Ok(false)
        }
        ShapeExpr::Not(not) => Ok(!satisfies(ctx, node, &not.expr)?),
        ShapeExpr::External => {
            // No local semantics; failing is safer than silently passing.
            ctx.reason(format!("External shape cannot be checked for {node}"));
            Ok(false)
        }
        ShapeExpr::Ref(label) => satisfies_ref(ctx, node, label),
    }
}

/// Resolves a shape reference and evaluates it under the recursion guard.
///
/// Cycle policy: a `(node, label)` pair already being visited is
/// provisionally treated as satisfied for that attempt. A self-negating
/// shape like `<S> { <p> NOT @<S> }` therefore fails on a node whose
/// p-edge loops back to itself, while ordinary recursive shapes (lists,
/// trees) terminate with the expected result.
pub(crate) fn satisfies_ref<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    node: &Term,
    label: &ShapeLabel,
) -> Result<bool, ShexValidationError> {
    let Some(resolved) = ctx.index.shape(label) else {
        ctx.reason(format!("Shape reference not found: {label}"));
        return Ok(false);
    };
    let resolved = Arc::clone(resolved);
    if !ctx.visits.enter_shape(node, label) {
        return Ok(true);
    }
    let result = satisfies(ctx, node, &resolved);
    ctx.visits.leave_shape(node, label);
    result
}

/// Checks a node's neighborhood against a shape.
fn satisfies_shape<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    node: &Term,
    shape: &Shape,
) -> Result<bool, ShexValidationError> {
    let outs = ctx
        .graph
        .arcs_out(node)
        .map_err(ShexValidationError::graph)?;
    let (forward, inverse) = match &shape.expression {
        Some(expression) => expression_predicates(ctx.index, expression),
        None => (FxHashSet::default(), FxHashSet::default()),
    };

    // A closed shape forbids outgoing edges whose predicate is neither
    // mentioned by the expression nor declared EXTRA.
    if shape.closed {
        for triple in &outs {
            if !forward.contains(&triple.predicate) && !shape.extra.contains(&triple.predicate) {
                ctx.reason(format!(
                    "Closed shape does not allow predicate {} on {node}",
                    triple.predicate
                ));
                return Ok(false);
            }
        }
    }

    let Some(expression) = &shape.expression else {
        // No expression: the whole neighborhood is remainder.
        return Ok(true);
    };

    // Incoming arcs are only fetched when some constraint is inverse.
    let ins = if inverse.is_empty() {
        Vec::new()
    } else {
        ctx.graph
            .arcs_in(node)
            .map_err(ShexValidationError::graph)?
    };

    // Matchables: outgoing edges mentioned forward, incoming edges
    // mentioned inverse. Edges with an EXTRA predicate may be left out of
    // the match, so they are tried separately.
    let mut seen: FxHashSet<Triple> = FxHashSet::default();
    let mut matchables: Vec<Triple> = Vec::new();
    let mut extra_candidates: Vec<Triple> = Vec::new();
    for triple in outs
        .iter()
        .filter(|t| forward.contains(&t.predicate))
        .chain(ins.iter().filter(|t| inverse.contains(&t.predicate)))
    {
        if seen.insert(triple.clone()) {
            if shape.extra.contains(&triple.predicate) {
                extra_candidates.push(triple.clone());
            } else {
                matchables.push(triple.clone());
            }
        }
    }

    let matched = match_with_extras(ctx, node, expression, &mut matchables, &extra_candidates)?;
    if !matched {
        ctx.reason(format!(
            "Neighborhood of {node} does not match the shape's expression"
        ));
    }
    Ok(matched)
}

/// Tries the match with every subset of the EXTRA-predicate edges left
/// out, keeping them all first: an unmatched edge is only permissible when
/// its predicate is declared EXTRA, so those are the only edges worth
/// excluding.
fn match_with_extras<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    focus: &Term,
    expression: &TripleExpr,
    kept: &mut Vec<Triple>,
    extras: &[Triple],
) -> Result<bool, ShexValidationError> {
    let Some((first, rest)) = extras.split_first() else {
        return matches(ctx, focus, kept, expression);
    };
    kept.push(first.clone());
    if match_with_extras(ctx, focus, expression, kept, rest)? {
        return Ok(true);
    }
    kept.pop();
    match_with_extras(ctx, focus, expression, kept, rest)
}
