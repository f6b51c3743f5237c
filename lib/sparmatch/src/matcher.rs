//! Triple expression matching.
//!
//! Decides whether a set of candidate edges can be partitioned to satisfy a
//! triple expression's cardinality and sub-structure. The entry point is
//! [`matches`]; it is mutually recursive with the shape satisfaction engine
//! through triple constraint value expressions.
//!
//! Matching an `EachOf` does not brute-force partitions of the whole edge
//! set. Edges are bucketed by predicate and members are grouped into
//! connected components of the member-claims-predicate relation: a
//! component with a single member matches the union of its buckets
//! directly, and only components where several members are entangled over
//! shared predicates fall back to the combinatorial block-assignment
//! search. Collapsing this tiering into one generic partition search would
//! reintroduce the exponential blowup it exists to avoid.

use crate::error::ShexValidationError;
use crate::graph::NeighborhoodSource;
use crate::model::{EachOf, TripleConstraint, TripleExpr, TripleExprLabel};
use crate::partitions::{partitions_exact, partitions_range};
use crate::schema::SchemaIndex;
use crate::validator::{satisfies, EvalContext};
use oxrdf::{NamedNode, Term, Triple};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Checks whether the edge set matches the triple expression under its own
/// cardinality.
///
/// The empty set matches iff the expression is nullable. A non-empty set
/// matches iff some partition into `k` non-empty blocks, with `k` in the
/// expression's cardinality range capped at the edge count, has every block
/// matching one repetition of the expression body. The search is
/// existential and short-circuits on the first satisfying partition.
pub(crate) fn matches<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    focus: &Term,
    edges: &[Triple],
    expr: &TripleExpr,
) -> Result<bool, ShexValidationError> {
    match expr {
        TripleExpr::Ref(label) => {
            let Some(resolved) = ctx.index.triple_expr(label) else {
                ctx.reason(format!("Triple expression reference not found: {label}"));
                return Ok(false);
            };
            let resolved = Arc::clone(resolved);
            if !ctx.visits.enter_triple_expr(label) {
                ctx.reason(format!("Cyclic triple expression reference: {label}"));
                return Ok(false);
            }
            let result = matches(ctx, focus, edges, &resolved);
            ctx.visits.leave_triple_expr(label);
            result
        }
        TripleExpr::TripleConstraint(tc) => {
            // A triple constraint never needs the general partition
            // machinery: the only valid split is into singletons, so the
            // count must be in range and every edge must match on its own.
            if edges.is_empty() {
                return Ok(tc.cardinality.min == 0);
            }
            let count = u32::try_from(edges.len()).unwrap_or(u32::MAX);
            if !tc.cardinality.allows(count) {
                ctx.reason(format!(
                    "{count} edges with predicate {} do not satisfy cardinality {}",
                    tc.predicate, tc.cardinality
                ));
                return Ok(false);
            }
            for triple in edges {
                if !triple_matches_constraint(ctx, focus, triple, tc)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        TripleExpr::OneOf(_) | TripleExpr::EachOf(_) => {
            let cardinality = expr.cardinality();
            if edges.is_empty() {
                return Ok(is_nullable(ctx.index, expr));
            }
            let n = edges.len();
            let lo = usize::try_from(cardinality.min.max(1)).unwrap_or(usize::MAX);
            let hi = cardinality
                .max
                .map_or(n, |m| usize::try_from(m).unwrap_or(usize::MAX).min(n));
            if lo > hi {
                ctx.reason(format!(
                    "{n} edges cannot be split to satisfy cardinality {cardinality}"
                ));
                return Ok(false);
            }
            for partition in partitions_range(edges, lo, hi) {
                let mut all = true;
                for block in &partition {
                    if !matches_once(ctx, focus, block, expr)? {
                        all = false;
                        break;
                    }
                }
                if all {
                    return Ok(true);
                }
            }
            ctx.reason(format!(
                "No partition of {n} edges satisfies the group under cardinality {cardinality}"
            ));
            Ok(false)
        }
    }
}

/// Matches one repetition of an expression body, ignoring the expression's
/// own cardinality (already expanded by the caller's partitioning).
fn matches_once<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    focus: &Term,
    block: &[Triple],
    expr: &TripleExpr,
) -> Result<bool, ShexValidationError> {
    match expr {
        TripleExpr::OneOf(oneof) => {
            // OneOf chooses one branch for the entire block; the branch's
            // own cardinality applies.
            for member in &oneof.exprs {
                if matches(ctx, focus, block, member)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        TripleExpr::EachOf(eachof) => match_each_of(ctx, focus, block, eachof),
        TripleExpr::TripleConstraint(_) | TripleExpr::Ref(_) => {
            matches(ctx, focus, block, expr)
        }
    }
}

/// Checks one edge against a triple constraint: predicate and direction
/// must agree, and the matched endpoint (object if forward, subject if
/// inverse) must satisfy the constraint's value expression if present.
fn triple_matches_constraint<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    focus: &Term,
    triple: &Triple,
    tc: &TripleConstraint,
) -> Result<bool, ShexValidationError> {
    if triple.predicate != tc.predicate {
        return Ok(false);
    }
    let value = if tc.inverse {
        if triple.object != *focus {
            return Ok(false);
        }
        Term::from(triple.subject.clone())
    } else {
        if Term::from(triple.subject.clone()) != *focus {
            return Ok(false);
        }
        triple.object.clone()
    };
    match &tc.value_expr {
        None => Ok(true),
        Some(value_expr) => satisfies(ctx, &value, value_expr),
    }
}

/// Matches one repetition of an EachOf: the block must be split so that
/// every member is satisfied by its share, with all edges consumed.
fn match_each_of<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    focus: &Term,
    edges: &[Triple],
    eachof: &EachOf,
) -> Result<bool, ShexValidationError> {
    if eachof.exprs.is_empty() {
        return Ok(edges.is_empty());
    }

    // Static predicate closure per member: which predicates can appear in
    // it, through nested groups and references. No graph access.
    let claims: Vec<FxHashSet<NamedNode>> = eachof
        .exprs
        .iter()
        .map(|member| {
            let (forward, inverse) = expression_predicates(ctx.index, member);
            forward.into_iter().chain(inverse).collect()
        })
        .collect();

    // Per-predicate edge buckets, in first-seen order. Every bucket must be
    // claimed by at least one member; `owners` remembers the first
    // claimant of each.
    let mut bucket_keys: Vec<NamedNode> = Vec::new();
    let mut buckets: FxHashMap<NamedNode, Vec<Triple>> = FxHashMap::default();
    for triple in edges {
        if !buckets.contains_key(&triple.predicate) {
            bucket_keys.push(triple.predicate.clone());
        }
        buckets
            .entry(triple.predicate.clone())
            .or_default()
            .push(triple.clone());
    }
    let mut owners: Vec<usize> = Vec::with_capacity(bucket_keys.len());
    for predicate in &bucket_keys {
        match claims.iter().position(|c| c.contains(predicate)) {
            Some(owner) => owners.push(owner),
            None => {
                ctx.reason(format!(
                    "No member of the group claims predicate {predicate}"
                ));
                return Ok(false);
            }
        }
    }

    // Connected components of the member-claims-predicate relation.
    // Members entangled through shared predicates must be solved jointly;
    // everything else matches its buckets directly.
    let member_count = eachof.exprs.len();
    let mut components = UnionFind::new(member_count);
    for predicate in &bucket_keys {
        let mut first: Option<usize> = None;
        for (member, claim) in claims.iter().enumerate() {
            if claim.contains(predicate) {
                match first {
                    Some(f) => components.union(f, member),
                    None => first = Some(member),
                }
            }
        }
    }

    let mut component_members: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    for member in 0..member_count {
        component_members
            .entry(components.find(member))
            .or_default()
            .push(member);
    }
    let mut component_edges: FxHashMap<usize, Vec<Triple>> = FxHashMap::default();
    for (predicate, &owner) in bucket_keys.iter().zip(&owners) {
        component_edges
            .entry(components.find(owner))
            .or_default()
            .extend(buckets[predicate].iter().cloned());
    }

    // Process components in first-member order. The outcome cannot depend
    // on the order: components are disjoint in both members and edges.
    for member in 0..member_count {
        let root = components.find(member);
        let members = &component_members[&root];
        if members[0] != member {
            continue;
        }
        let edges_for = component_edges.get(&root).cloned().unwrap_or_default();
        if members.len() == 1 {
            if !matches(ctx, focus, &edges_for, &eachof.exprs[member])? {
                return Ok(false);
            }
        } else if !solve_component(ctx, focus, &edges_for, members, &claims, &eachof.exprs)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Solves an entangled component: enumerates partitions of the component's
/// edges into blocks (partition generator) and injective block-to-member
/// assignments until one simultaneous solution is found. Members left
/// without a block must match the empty set.
fn solve_component<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    focus: &Term,
    edges: &[Triple],
    member_idxs: &[usize],
    claims: &[FxHashSet<NamedNode>],
    exprs: &[TripleExpr],
) -> Result<bool, ShexValidationError> {
    let limit = member_idxs.len().min(edges.len());
    for block_count in 1..=limit {
        for partition in partitions_exact(edges, block_count) {
            let mut used = vec![false; member_idxs.len()];
            if assign_blocks(ctx, focus, &partition, member_idxs, claims, exprs, &mut used)? {
                return Ok(true);
            }
        }
    }
    ctx.reason(format!(
        "No assignment of {} edges satisfies all {} entangled group members",
        edges.len(),
        member_idxs.len()
    ));
    Ok(false)
}

fn assign_blocks<G: NeighborhoodSource>(
    ctx: &mut EvalContext<'_, G>,
    focus: &Term,
    blocks: &[Vec<Triple>],
    member_idxs: &[usize],
    claims: &[FxHashSet<NamedNode>],
    exprs: &[TripleExpr],
    used: &mut [bool],
) -> Result<bool, ShexValidationError> {
    let Some((block, rest)) = blocks.split_first() else {
        // All blocks are assigned; every member left out must tolerate an
        // empty share.
        for (slot, &member) in member_idxs.iter().enumerate() {
            if !used[slot] && !matches(ctx, focus, &[], &exprs[member])? {
                return Ok(false);
            }
        }
        return Ok(true);
    };
    for (slot, &member) in member_idxs.iter().enumerate() {
        if used[slot] {
            continue;
        }
        // Cheap static pruning before the real match.
        if !block
            .iter()
            .all(|triple| claims[member].contains(&triple.predicate))
        {
            continue;
        }
        if matches(ctx, focus, block, &exprs[member])? {
            used[slot] = true;
            if assign_blocks(ctx, focus, rest, member_idxs, claims, exprs, used)? {
                return Ok(true);
            }
            used[slot] = false;
        }
    }
    Ok(false)
}

/// Computes the forward and inverse predicate sets that can textually
/// appear in an expression: a static closure over nested constraints and
/// references, not a graph traversal.
pub(crate) fn expression_predicates(
    index: &SchemaIndex,
    expr: &TripleExpr,
) -> (FxHashSet<NamedNode>, FxHashSet<NamedNode>) {
    let mut forward = FxHashSet::default();
    let mut inverse = FxHashSet::default();
    collect_predicates(
        index,
        expr,
        &mut forward,
        &mut inverse,
        &mut FxHashSet::default(),
    );
    (forward, inverse)
}

fn collect_predicates(
    index: &SchemaIndex,
    expr: &TripleExpr,
    forward: &mut FxHashSet<NamedNode>,
    inverse: &mut FxHashSet<NamedNode>,
    seen: &mut FxHashSet<TripleExprLabel>,
) {
    match expr {
        TripleExpr::TripleConstraint(tc) => {
            if tc.inverse {
                inverse.insert(tc.predicate.clone());
            } else {
                forward.insert(tc.predicate.clone());
            }
        }
        TripleExpr::OneOf(e) => {
            for member in &e.exprs {
                collect_predicates(index, member, forward, inverse, seen);
            }
        }
        TripleExpr::EachOf(e) => {
            for member in &e.exprs {
                collect_predicates(index, member, forward, inverse, seen);
            }
        }
        TripleExpr::Ref(label) => {
            if seen.insert(label.clone()) {
                if let Some(resolved) = index.triple_expr(label) {
                    let resolved = Arc::clone(resolved);
                    collect_predicates(index, &resolved, forward, inverse, seen);
                }
            }
        }
    }
}

/// Whether an expression can match the empty edge set.
pub(crate) fn is_nullable(index: &SchemaIndex, expr: &TripleExpr) -> bool {
    nullable_guarded(index, expr, &mut FxHashSet::default())
}

fn nullable_guarded(
    index: &SchemaIndex,
    expr: &TripleExpr,
    seen: &mut FxHashSet<TripleExprLabel>,
) -> bool {
    match expr {
        TripleExpr::TripleConstraint(tc) => tc.cardinality.min == 0,
        TripleExpr::OneOf(e) => {
            e.cardinality.min == 0
                || e.exprs
                    .iter()
                    .any(|member| nullable_guarded(index, member, seen))
        }
        TripleExpr::EachOf(e) => {
            e.cardinality.min == 0
                || e.exprs
                    .iter()
                    .all(|member| nullable_guarded(index, member, seen))
        }
        TripleExpr::Ref(label) => {
            if !seen.insert(label.clone()) {
                return false;
            }
            match index.triple_expr(label) {
                Some(resolved) => {
                    let resolved = Arc::clone(resolved);
                    nullable_guarded(index, &resolved, seen)
                }
                None => false,
            }
        }
    }
}

/// Union-find over member indices, used to group members entangled through
/// shared predicates. Roots are the smallest member index of their set, so
/// component iteration order is deterministic.
#[derive(Debug)]
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&self, mut x: usize) -> usize {
        while self.parent[x] != x {
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            let (small, large) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[large] = small;
        }
    }
}
