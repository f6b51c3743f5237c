//! Integration tests for the ShEx satisfaction engine.
//!
//! Schemas are built programmatically (parsing is out of scope for this
//! crate); data graphs are parsed from Turtle.

use oxrdf::vocab::xsd;
use oxrdf::{Graph, Literal, NamedNode, Term, Triple, TripleRef};
use oxrdfio::{RdfFormat, RdfParser};
use sparmatch::{
    Cardinality, EachOf, NodeConstraint, NodeKind, OneOf, Schema, Shape, ShapeExpr, ShapeLabel,
    ShexValidator, TripleConstraint, ValueSetValue,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Helper to parse a Turtle string into a Graph.
fn parse_turtle(turtle: &str) -> Graph {
    let mut graph = Graph::new();
    let parser = RdfParser::from_format(RdfFormat::Turtle);
    for quad_result in parser.for_reader(turtle.as_bytes()) {
        let quad = quad_result.expect("Failed to parse turtle");
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    graph
}

/// Helper to create a simple NamedNode.
fn nn(iri: &str) -> NamedNode {
    NamedNode::new_unchecked(iri)
}

/// Helper to create a Term from an IRI.
fn term(iri: &str) -> Term {
    Term::NamedNode(nn(iri))
}

fn label(iri: &str) -> ShapeLabel {
    ShapeLabel::from(nn(iri))
}

// =============================================================================
// Shape and Boolean Combinator Tests
// =============================================================================

#[test]
fn test_simple_person_shape() {
    // ex:PersonShape { foaf:name xsd:string ; foaf:age xsd:integer? }
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/PersonShape"),
        ShapeExpr::Shape(Shape::with_expression(
            EachOf::new(vec![
                TripleConstraint::new(nn("http://xmlns.com/foaf/0.1/name"))
                    .with_value_expr(
                        NodeConstraint::with_datatype(xsd::STRING.into_owned()).into(),
                    )
                    .into(),
                TripleConstraint::new(nn("http://xmlns.com/foaf/0.1/age"))
                    .with_value_expr(
                        NodeConstraint::with_datatype(xsd::INTEGER.into_owned()).into(),
                    )
                    .with_cardinality(Cardinality::optional())
                    .into(),
            ])
            .into(),
        )),
    );
    let validator = ShexValidator::new(schema);

    let data = parse_turtle(
        r#"
        @prefix foaf: <http://xmlns.com/foaf/0.1/> .
        @prefix ex: <http://example.org/> .
        ex:alice foaf:name "Alice Smith" ;
                 foaf:age 30 .
        ex:bob foaf:name "Bob Jones" .
    "#,
    );

    let shape = label("http://example.org/PersonShape");
    assert!(validator
        .validate(&data, &term("http://example.org/alice"), &shape)
        .unwrap()
        .is_valid());
    assert!(validator
        .validate(&data, &term("http://example.org/bob"), &shape)
        .unwrap()
        .is_valid());

    // A missing required name fails.
    let nameless = parse_turtle(
        r#"
        @prefix foaf: <http://xmlns.com/foaf/0.1/> .
        @prefix ex: <http://example.org/> .
        ex:carol foaf:age 40 .
    "#,
    );
    assert!(!validator
        .validate(&nameless, &term("http://example.org/carol"), &shape)
        .unwrap()
        .is_valid());
}

#[test]
fn test_boolean_combinators() {
    // ex:S = (iri AND NOT (datatype integer)) OR literal
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::or(vec![
            ShapeExpr::and(vec![
                NodeConstraint::with_node_kind(NodeKind::Iri).into(),
                ShapeExpr::not(
                    NodeConstraint::with_datatype(xsd::INTEGER.into_owned()).into(),
                ),
            ]),
            NodeConstraint::with_node_kind(NodeKind::Literal).into(),
        ]),
    );
    let validator = ShexValidator::new(schema);
    let graph = Graph::new();
    let shape = label("http://example.org/S");

    assert!(validator
        .validate(&graph, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());
    assert!(validator
        .validate(
            &graph,
            &Term::Literal(Literal::new_simple_literal("hello")),
            &shape
        )
        .unwrap()
        .is_valid());
    assert!(!validator
        .validate(
            &graph,
            &Term::BlankNode(oxrdf::BlankNode::default()),
            &shape
        )
        .unwrap()
        .is_valid());
}

#[test]
fn test_datatype_castability() {
    // NodeConstraint { datatype xsd:integer } against "30"^^xsd:integer
    // and the non-castable "30.5"^^xsd:integer.
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/IntShape"),
        NodeConstraint::with_datatype(xsd::INTEGER.into_owned()).into(),
    );
    let validator = ShexValidator::new(schema);
    let graph = Graph::new();
    let shape = label("http://example.org/IntShape");

    let good = Term::Literal(Literal::new_typed_literal("30", xsd::INTEGER));
    assert!(validator.validate(&graph, &good, &shape).unwrap().is_valid());

    let bad = Term::Literal(Literal::new_typed_literal("30.5", xsd::INTEGER));
    let result = validator.validate(&graph, &bad, &shape).unwrap();
    assert!(!result.is_valid());
    assert!(
        result.reasons().iter().any(|r| r.contains("lexical form")),
        "expected a castability reason, got {:?}",
        result.reasons()
    );
}

// =============================================================================
// Closed Shapes and EXTRA
// =============================================================================

#[test]
fn test_closed_shape_rejects_unexpected_predicate() {
    // CLOSED { ex:p1 . } over {(x,p1,1),(x,p2,2)}
    let shape_expr = |extra: Option<NamedNode>| {
        let mut shape = Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/p1")).into(),
        )
        .closed();
        if let Some(extra) = extra {
            shape = shape.with_extra(extra);
        }
        ShapeExpr::Shape(shape)
    };

    let data = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p1 ex:a ;
             ex:p2 ex:b .
    "#,
    );

    let mut closed = Schema::new();
    closed.add_shape(nn("http://example.org/S"), shape_expr(None));
    let validator = ShexValidator::new(closed);
    let result = validator
        .validate(&data, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap();
    assert!(!result.is_valid());
    assert!(
        result
            .reasons()
            .iter()
            .any(|r| r.contains("http://example.org/p2")),
        "expected the excess predicate in the reasons, got {:?}",
        result.reasons()
    );

    // Declaring EXTRA ex:p2 makes the same neighborhood acceptable.
    let mut with_extra = Schema::new();
    with_extra.add_shape(
        nn("http://example.org/S"),
        shape_expr(Some(nn("http://example.org/p2"))),
    );
    let validator = ShexValidator::new(with_extra);
    assert!(validator
        .validate(&data, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap()
        .is_valid());
}

#[test]
fn test_extra_permits_unmatched_edges_with_failing_values() {
    // EXTRA ex:p { ex:p @IntShape }: of two p-edges only one has an
    // integer value; the other may be left unmatched thanks to EXTRA.
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(
            Shape::with_expression(
                TripleConstraint::new(nn("http://example.org/p"))
                    .with_value_expr(
                        NodeConstraint::with_datatype(xsd::INTEGER.into_owned()).into(),
                    )
                    .into(),
            )
            .with_extra(nn("http://example.org/p")),
        ),
    );
    let validator = ShexValidator::new(schema);

    let data = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p 5 ;
             ex:p "five" .
    "#,
    );
    assert!(validator
        .validate(&data, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap()
        .is_valid());

    // Without EXTRA the failing edge has to be matched, so the shape fails.
    let mut strict = Schema::new();
    strict.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/p"))
                .with_value_expr(
                    NodeConstraint::with_datatype(xsd::INTEGER.into_owned()).into(),
                )
                .into(),
        )),
    );
    let validator = ShexValidator::new(strict);
    assert!(!validator
        .validate(&data, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap()
        .is_valid());
}

// =============================================================================
// Cardinality
// =============================================================================

#[test]
fn test_cardinality_range_partitioning() {
    // { ex:p . {2,3} }
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/p"))
                .with_cardinality(Cardinality::range(2, Some(3)).unwrap())
                .into(),
        )),
    );
    let validator = ShexValidator::new(schema);
    let shape = label("http://example.org/S");

    let two = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p ex:v1 , ex:v2 .
    "#,
    );
    assert!(validator
        .validate(&two, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());

    let one = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p ex:v1 .
    "#,
    );
    assert!(!validator
        .validate(&one, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());

    let four = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p ex:v1 , ex:v2 , ex:v3 , ex:v4 .
    "#,
    );
    assert!(!validator
        .validate(&four, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());
}

#[test]
fn test_unbounded_cardinality_over_large_neighborhood() {
    // { ex:p . + } over hundreds of edges must not enumerate partitions.
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/p"))
                .with_cardinality(Cardinality::one_or_more())
                .into(),
        )),
    );
    let validator = ShexValidator::new(schema);

    let mut graph = Graph::new();
    let x = nn("http://example.org/x");
    let p = nn("http://example.org/p");
    for i in 0..500 {
        let object = nn(&format!("http://example.org/v{i}"));
        graph.insert(TripleRef::new(&x, &p, &object));
    }
    assert!(validator
        .validate(&graph, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap()
        .is_valid());
}

#[test]
fn test_grouped_cardinality_repetition() {
    // { (ex:first . ; ex:rest .) {2,2} }: the group itself repeats, so the
    // edges must split into two blocks each holding one first/rest pair.
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            EachOf::new(vec![
                TripleConstraint::new(nn("http://example.org/first")).into(),
                TripleConstraint::new(nn("http://example.org/rest")).into(),
            ])
            .with_cardinality(Cardinality::exactly(2))
            .into(),
        )),
    );
    let validator = ShexValidator::new(schema);

    let paired = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:first ex:a , ex:b ;
             ex:rest ex:c , ex:d .
    "#,
    );
    assert!(validator
        .validate(&paired, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap()
        .is_valid());

    let unbalanced = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:first ex:a ;
             ex:rest ex:c , ex:d .
    "#,
    );
    assert!(!validator
        .validate(&unbalanced, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap()
        .is_valid());
}

// =============================================================================
// OneOf and EachOf
// =============================================================================

#[test]
fn test_one_of_chooses_a_branch() {
    // { (ex:name . | ex:label .) }
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            OneOf::new(vec![
                TripleConstraint::new(nn("http://example.org/name")).into(),
                TripleConstraint::new(nn("http://example.org/label")).into(),
            ])
            .into(),
        )),
    );
    let validator = ShexValidator::new(schema);
    let shape = label("http://example.org/S");

    let with_label = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:label "thing" .
    "#,
    );
    assert!(validator
        .validate(&with_label, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());

    // Both branches present: OneOf must cover the whole set with one
    // branch, which neither can.
    let with_both = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:label "thing" ;
             ex:name "thing" .
    "#,
    );
    assert!(!validator
        .validate(&with_both, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());
}

#[test]
fn test_each_of_entangled_members_share_a_predicate() {
    // { ex:p @IntShape ; ex:p @IriShape }: two members claim the same
    // predicate, so the bucket must be split between them.
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            EachOf::new(vec![
                TripleConstraint::new(nn("http://example.org/p"))
                    .with_value_expr(
                        NodeConstraint::with_datatype(xsd::INTEGER.into_owned()).into(),
                    )
                    .into(),
                TripleConstraint::new(nn("http://example.org/p"))
                    .with_value_expr(NodeConstraint::with_node_kind(NodeKind::Iri).into())
                    .into(),
            ])
            .into(),
        )),
    );
    let validator = ShexValidator::new(schema);
    let shape = label("http://example.org/S");

    let mixed = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p 5 ;
             ex:p ex:other .
    "#,
    );
    assert!(validator
        .validate(&mixed, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());

    // Two integers: the IRI member cannot be satisfied.
    let two_ints = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p 5 ;
             ex:p 6 .
    "#,
    );
    assert!(!validator
        .validate(&two_ints, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());
}

#[test]
fn test_each_of_unclaimed_predicate_fails() {
    // An edge handed to the group with a predicate no member mentions can
    // never be consumed.
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(
            Shape::with_expression(
                EachOf::new(vec![
                    TripleConstraint::new(nn("http://example.org/p")).into(),
                    TripleConstraint::new(nn("http://example.org/q"))
                        .with_cardinality(Cardinality::optional())
                        .into(),
                ])
                .into(),
            )
            .closed(),
        ),
    );
    let validator = ShexValidator::new(schema);
    let data = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p ex:a ;
             ex:r ex:b .
    "#,
    );
    assert!(!validator
        .validate(&data, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap()
        .is_valid());
}

#[test]
fn test_each_of_result_independent_of_edge_order() {
    // The predicate-bucket strategy must be associative: permuting the
    // neighborhood never changes the outcome.
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            EachOf::new(vec![
                TripleConstraint::new(nn("http://example.org/a"))
                    .with_cardinality(Cardinality::one_or_more())
                    .into(),
                TripleConstraint::new(nn("http://example.org/b"))
                    .with_value_expr(NodeConstraint::with_node_kind(NodeKind::Iri).into())
                    .into(),
                TripleConstraint::new(nn("http://example.org/b"))
                    .with_value_expr(
                        NodeConstraint::with_datatype(xsd::INTEGER.into_owned()).into(),
                    )
                    .into(),
            ])
            .into(),
        )),
    );
    let validator = ShexValidator::new(schema);
    let shape = label("http://example.org/S");

    let x = nn("http://example.org/x");
    let triples = vec![
        Triple::new(x.clone(), nn("http://example.org/a"), nn("http://example.org/1")),
        Triple::new(x.clone(), nn("http://example.org/a"), nn("http://example.org/2")),
        Triple::new(x.clone(), nn("http://example.org/b"), nn("http://example.org/3")),
        Triple::new(
            x.clone(),
            nn("http://example.org/b"),
            Literal::new_typed_literal("7", xsd::INTEGER),
        ),
    ];

    // Try several insertion orders, including reversed.
    let orders: Vec<Vec<usize>> = vec![
        vec![0, 1, 2, 3],
        vec![3, 2, 1, 0],
        vec![2, 0, 3, 1],
        vec![1, 3, 0, 2],
    ];
    for order in orders {
        let mut graph = Graph::new();
        for &i in &order {
            graph.insert(&triples[i]);
        }
        assert!(
            validator
                .validate(&graph, &term("http://example.org/x"), &shape)
                .unwrap()
                .is_valid(),
            "order {order:?} changed the outcome"
        );
    }
}

#[test]
fn test_each_of_independent_predicates_stay_cheap() {
    // Many independent constraints over disjoint predicates: each bucket
    // matches its own member directly, so a sizable neighborhood is fine.
    let predicates: Vec<NamedNode> = (0..20)
        .map(|i| nn(&format!("http://example.org/p{i}")))
        .collect();
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            EachOf::new(
                predicates
                    .iter()
                    .map(|p| {
                        TripleConstraint::new(p.clone())
                            .with_cardinality(Cardinality::range(1, Some(10)).unwrap())
                            .into()
                    })
                    .collect(),
            )
            .into(),
        )),
    );
    let validator = ShexValidator::new(schema);

    let mut graph = Graph::new();
    let x = nn("http://example.org/x");
    for (i, p) in predicates.iter().enumerate() {
        for j in 0..5 {
            let object = nn(&format!("http://example.org/v{i}_{j}"));
            graph.insert(TripleRef::new(&x, p, &object));
        }
    }
    assert!(validator
        .validate(&graph, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap()
        .is_valid());
}

// =============================================================================
// Inverse Constraints
// =============================================================================

#[test]
fn test_inverse_triple_constraint() {
    // { ^ex:memberOf . }: some node must point at the focus node.
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/memberOf"))
                .inverse()
                .into(),
        )),
    );
    let validator = ShexValidator::new(schema);
    let shape = label("http://example.org/S");

    let data = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:alice ex:memberOf ex:team .
    "#,
    );
    assert!(validator
        .validate(&data, &term("http://example.org/team"), &shape)
        .unwrap()
        .is_valid());
    assert!(!validator
        .validate(&data, &term("http://example.org/alice"), &shape)
        .unwrap()
        .is_valid());
}

// =============================================================================
// Recursion and Cycles
// =============================================================================

#[test]
fn test_recursive_shape_over_a_chain() {
    // ex:ListShape { ex:next @ex:ListShape ? }: a finite chain conforms.
    let list = label("http://example.org/ListShape");
    let mut schema = Schema::new();
    schema.add_shape(
        list.clone(),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/next"))
                .with_value_expr(ShapeExpr::Ref(list.clone()))
                .with_cardinality(Cardinality::optional())
                .into(),
        )),
    );
    let validator = ShexValidator::new(schema);

    let data = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:n1 ex:next ex:n2 .
        ex:n2 ex:next ex:n3 .
    "#,
    );
    assert!(validator
        .validate(&data, &term("http://example.org/n1"), &list)
        .unwrap()
        .is_valid());
}

#[test]
fn test_cyclic_schema_terminates_with_and_without_self_loop() {
    // ex:S { ex:p @ex:S }: must terminate on a graph with the self loop
    // (satisfied via the visiting policy) and without it (plain failure).
    let shape = label("http://example.org/S");
    let mut schema = Schema::new();
    schema.add_shape(
        shape.clone(),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/p"))
                .with_value_expr(ShapeExpr::Ref(shape.clone()))
                .into(),
        )),
    );
    let validator = ShexValidator::new(schema);

    let with_loop = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p ex:x .
    "#,
    );
    assert!(validator
        .validate(&with_loop, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());

    let without_loop = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:q ex:y .
    "#,
    );
    assert!(!validator
        .validate(&without_loop, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());
}

#[test]
fn test_self_negating_shape() {
    // ex:S { ex:p NOT @ex:S }: with the self loop the p-value is the focus
    // node itself, which cannot satisfy NOT of an in-progress self; expect
    // failure. Without the loop, the p-value is a plain node that fails S,
    // so NOT @S holds; expect success.
    let shape = label("http://example.org/S");
    let mut schema = Schema::new();
    schema.add_shape(
        shape.clone(),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/p"))
                .with_value_expr(ShapeExpr::not(ShapeExpr::Ref(shape.clone())))
                .into(),
        )),
    );
    let validator = ShexValidator::new(schema);

    let self_loop = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p ex:x .
    "#,
    );
    assert!(!validator
        .validate(&self_loop, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());

    let no_loop = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:y ex:p ex:z .
    "#,
    );
    assert!(validator
        .validate(&no_loop, &term("http://example.org/y"), &shape)
        .unwrap()
        .is_valid());
}

#[test]
fn test_mutually_recursive_shapes() {
    // ex:A { ex:b @ex:B } and ex:B { ex:a @ex:A ? }.
    let a = label("http://example.org/A");
    let b = label("http://example.org/B");
    let mut schema = Schema::new();
    schema.add_shape(
        a.clone(),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/b"))
                .with_value_expr(ShapeExpr::Ref(b.clone()))
                .into(),
        )),
    );
    schema.add_shape(
        b.clone(),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/a"))
                .with_value_expr(ShapeExpr::Ref(a.clone()))
                .with_cardinality(Cardinality::optional())
                .into(),
        )),
    );
    let validator = ShexValidator::new(schema);

    let data = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:b ex:y .
        ex:y ex:a ex:x .
    "#,
    );
    assert!(validator
        .validate(&data, &term("http://example.org/x"), &a)
        .unwrap()
        .is_valid());
}

// =============================================================================
// Value Sets and Start Expression
// =============================================================================

#[test]
fn test_value_set_over_edges() {
    // { ex:status [ "active" "retired" ] }
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/status"))
                .with_value_expr(
                    NodeConstraint::new()
                        .with_value(ValueSetValue::ObjectValue(Term::Literal(
                            Literal::new_simple_literal("active"),
                        )))
                        .with_value(ValueSetValue::ObjectValue(Term::Literal(
                            Literal::new_simple_literal("retired"),
                        )))
                        .into(),
                )
                .into(),
        )),
    );
    let validator = ShexValidator::new(schema);
    let shape = label("http://example.org/S");

    let active = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:status "active" .
    "#,
    );
    assert!(validator
        .validate(&active, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());

    let unknown = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:status "dormant" .
    "#,
    );
    assert!(!validator
        .validate(&unknown, &term("http://example.org/x"), &shape)
        .unwrap()
        .is_valid());
}

#[test]
fn test_validate_against_start_expression() {
    let mut schema = Schema::new();
    schema.set_start(ShapeExpr::Shape(Shape::with_expression(
        TripleConstraint::new(nn("http://example.org/p")).into(),
    )));
    let validator = ShexValidator::new(schema);

    let data = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p ex:y .
    "#,
    );
    assert!(validator
        .validate_start(&data, &term("http://example.org/x"))
        .unwrap()
        .is_valid());
    assert!(!validator
        .validate_start(&data, &term("http://example.org/y"))
        .unwrap()
        .is_valid());
}

#[test]
fn test_unresolved_reference_reason_is_reported() {
    let mut schema = Schema::new();
    schema.add_shape(
        nn("http://example.org/S"),
        ShapeExpr::Shape(Shape::with_expression(
            TripleConstraint::new(nn("http://example.org/p"))
                .with_value_expr(ShapeExpr::shape_ref(nn("http://example.org/Missing")))
                .into(),
        )),
    );
    // The schema-level eager check catches it too.
    assert!(schema.check_refs().is_err());

    let validator = ShexValidator::new(schema);
    let data = parse_turtle(
        r#"
        @prefix ex: <http://example.org/> .
        ex:x ex:p ex:y .
    "#,
    );
    let result = validator
        .validate(&data, &term("http://example.org/x"), &label("http://example.org/S"))
        .unwrap();
    assert!(!result.is_valid());
    assert!(
        result
            .reasons()
            .iter()
            .any(|r| r.contains("reference not found")),
        "expected an unresolved-reference reason, got {:?}",
        result.reasons()
    );
}
