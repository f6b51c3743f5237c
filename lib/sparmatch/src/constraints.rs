//! Node constraint evaluation.
//!
//! A node constraint is a pure predicate on a single term: it never touches
//! the graph. The five facet families (node kind, datatype, string facets,
//! numeric facets, value set) are ANDed; an absent facet is vacuously true.
//! Each failing facet surfaces an expected-vs-actual reason, but callers
//! only act on the resulting boolean.

use crate::error::ShexValidationError;
use crate::model::{NodeConstraint, NumericFacet, StemPattern, StringFacet, ValueSetValue};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode, NamedNodeRef, Term};
use oxsdatatypes::{Boolean, DateTime, Decimal, Double, Float, Integer};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::str::FromStr;

/// Checks a term against a node constraint.
///
/// Returns the list of failure reasons; an empty list means the constraint
/// is satisfied. Errors only on malformed pattern facets, which are schema
/// defects rather than node failures.
pub(crate) fn check_node_constraint(
    node: &Term,
    constraint: &NodeConstraint,
    regexes: &mut RegexCache,
) -> Result<Vec<String>, ShexValidationError> {
    let mut reasons = Vec::new();

    if let Some(node_kind) = &constraint.node_kind {
        if !node_kind.matches(node) {
            reasons.push(format!("Node {node} does not match node kind {node_kind}"));
        }
    }

    if let Some(datatype) = &constraint.datatype {
        check_datatype(node, datatype, &mut reasons);
    }

    for facet in &constraint.string_facets {
        check_string_facet(node, facet, regexes, &mut reasons)?;
    }

    for facet in &constraint.numeric_facets {
        check_numeric_facet(node, facet, &mut reasons);
    }

    if !constraint.values.is_empty()
        && !constraint
            .values
            .iter()
            .any(|value| matches_value_set(node, value))
    {
        reasons.push(format!("Node {node} is not in the allowed value set"));
    }

    Ok(reasons)
}

/// Cache of compiled pattern facets, scoped to one validation call.
#[derive(Debug, Default)]
pub(crate) struct RegexCache {
    compiled: FxHashMap<(String, Option<String>), Regex>,
}

impl RegexCache {
    fn get(
        &mut self,
        pattern: &str,
        flags: Option<&str>,
    ) -> Result<&Regex, ShexValidationError> {
        let key = (pattern.to_owned(), flags.map(ToOwned::to_owned));
        match self.compiled.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(compile_pattern(pattern, flags)?)),
        }
    }
}

/// Translates ShEx pattern flag letters into an inline regex group.
///
/// `s` = dot matches newline, `m` = multiline anchors, `i` = case
/// insensitive, `x` = insignificant whitespace, `q` = the pattern is
/// literal text (combinable only with `i`).
fn compile_pattern(pattern: &str, flags: Option<&str>) -> Result<Regex, ShexValidationError> {
    let mut inline = String::new();
    let mut literal = false;
    for flag in flags.unwrap_or_default().chars() {
        match flag {
            's' | 'm' | 'i' | 'x' => inline.push(flag),
            'q' => literal = true,
            other => {
                return Err(ShexValidationError::invalid_regex(
                    pattern,
                    format!("unsupported flag '{other}'"),
                ));
            }
        }
    }
    let body = if literal {
        inline.retain(|c| c == 'i');
        regex::escape(pattern)
    } else {
        pattern.to_owned()
    };
    let full = if inline.is_empty() {
        body
    } else {
        format!("(?{inline}){body}")
    };
    Regex::new(&full)
        .map_err(|e| ShexValidationError::invalid_regex(pattern, e.to_string()))
}

fn check_datatype(node: &Term, datatype: &NamedNode, reasons: &mut Vec<String>) {
    let Term::Literal(lit) = node else {
        reasons.push(format!("Datatype {datatype} requires a literal, got {node}"));
        return;
    };
    // A language-tagged literal reports the implicit rdf:langString
    // datatype, so the plain equality below covers that case.
    if lit.datatype() != datatype.as_ref() {
        reasons.push(format!(
            "Literal datatype {} does not match expected {datatype}",
            lit.datatype()
        ));
        return;
    }
    if !is_castable(lit.value(), datatype.as_ref()) {
        reasons.push(format!(
            "\"{}\" is not a valid lexical form for {datatype}",
            lit.value()
        ));
    }
}

/// Lexical-form check for the fixed SPARQL operand datatypes. Other
/// datatypes are opaque and accept any lexical form.
fn is_castable(value: &str, datatype: NamedNodeRef<'_>) -> bool {
    if datatype == xsd::INTEGER {
        Integer::from_str(value).is_ok()
    } else if datatype == xsd::DECIMAL {
        Decimal::from_str(value).is_ok()
    } else if datatype == xsd::FLOAT {
        Float::from_str(value).is_ok()
    } else if datatype == xsd::DOUBLE {
        Double::from_str(value).is_ok()
    } else if datatype == xsd::BOOLEAN {
        Boolean::from_str(value).is_ok()
    } else if datatype == xsd::DATE_TIME {
        DateTime::from_str(value).is_ok()
    } else {
        true
    }
}

/// The lexical form a string facet measures: the IRI string, the blank node
/// identifier, or the literal's lexical value.
#[allow(unreachable_patterns)]
fn lexical_form(term: &Term) -> &str {
    match term {
        Term::NamedNode(n) => n.as_str(),
        Term::BlankNode(b) => b.as_str(),
        Term::Literal(l) => l.value(),
        _ => "",
    }
}

fn check_string_facet(
    node: &Term,
    facet: &StringFacet,
    regexes: &mut RegexCache,
    reasons: &mut Vec<String>,
) -> Result<(), ShexValidationError> {
    let value = lexical_form(node);
    match facet {
        StringFacet::Length(expected) => {
            let len = value.chars().count();
            if len != *expected {
                reasons.push(format!("String length {len} is not exactly {expected}"));
            }
        }
        StringFacet::MinLength(min) => {
            let len = value.chars().count();
            if len < *min {
                reasons.push(format!("String length {len} is less than minimum {min}"));
            }
        }
        StringFacet::MaxLength(max) => {
            let len = value.chars().count();
            if len > *max {
                reasons.push(format!("String length {len} exceeds maximum {max}"));
            }
        }
        StringFacet::Pattern { pattern, flags } => {
            let regex = regexes.get(pattern, flags.as_deref())?;
            if !regex.is_match(value) {
                reasons.push(format!("\"{value}\" does not match pattern '{pattern}'"));
            }
        }
    }
    Ok(())
}

/// A numeric literal value: exact decimal arithmetic for decimal-derived
/// datatypes, IEEE doubles otherwise.
#[derive(Debug, Clone, Copy)]
enum NumericValue {
    Decimal(Decimal),
    Double(Double),
}

fn parse_numeric(lit: &Literal) -> Option<NumericValue> {
    let datatype = lit.datatype();
    if is_decimal_derived(datatype) {
        Decimal::from_str(lit.value()).ok().map(NumericValue::Decimal)
    } else if datatype == xsd::FLOAT || datatype == xsd::DOUBLE {
        Double::from_str(lit.value()).ok().map(NumericValue::Double)
    } else {
        None
    }
}

fn is_decimal_derived(datatype: NamedNodeRef<'_>) -> bool {
    datatype == xsd::DECIMAL
        || datatype == xsd::INTEGER
        || datatype == xsd::LONG
        || datatype == xsd::INT
        || datatype == xsd::SHORT
        || datatype == xsd::BYTE
        || datatype == xsd::NON_NEGATIVE_INTEGER
        || datatype == xsd::NON_POSITIVE_INTEGER
        || datatype == xsd::POSITIVE_INTEGER
        || datatype == xsd::NEGATIVE_INTEGER
        || datatype == xsd::UNSIGNED_LONG
        || datatype == xsd::UNSIGNED_INT
        || datatype == xsd::UNSIGNED_SHORT
        || datatype == xsd::UNSIGNED_BYTE
}

/// Numeric comparison: exact when both sides are decimal-derived, through
/// doubles otherwise. `None` means incomparable (NaN).
fn compare_numeric(a: NumericValue, b: NumericValue) -> Option<Ordering> {
    match (a, b) {
        (NumericValue::Decimal(x), NumericValue::Decimal(y)) => Some(x.cmp(&y)),
        _ => as_double(a).partial_cmp(&as_double(b)),
    }
}

fn as_double(value: NumericValue) -> Double {
    match value {
        NumericValue::Decimal(d) => Double::from(d),
        NumericValue::Double(d) => d,
    }
}

/// Digit counts of a decimal's canonical form: leading integer zeros and
/// trailing fraction zeros do not count, so `5.50` has 1 fraction digit.
fn digit_counts(value: Decimal) -> (usize, usize) {
    let canonical = value.to_string();
    let unsigned = canonical.strip_prefix('-').unwrap_or(canonical.as_str());
    match unsigned.split_once('.') {
        Some((int, frac)) => {
            let int_digits = if int == "0" { 0 } else { int.len() };
            (int_digits + frac.len(), frac.len())
        }
        None => (unsigned.len(), 0),
    }
}

fn check_numeric_facet(node: &Term, facet: &NumericFacet, reasons: &mut Vec<String>) {
    let Term::Literal(lit) = node else {
        reasons.push(format!("Numeric facet requires a numeric literal, got {node}"));
        return;
    };
    match facet {
        NumericFacet::MinInclusive(bound) => {
            check_bound(lit, bound, |o| o != Ordering::Less, ">=", reasons);
        }
        NumericFacet::MinExclusive(bound) => {
            check_bound(lit, bound, |o| o == Ordering::Greater, ">", reasons);
        }
        NumericFacet::MaxInclusive(bound) => {
            check_bound(lit, bound, |o| o != Ordering::Greater, "<=", reasons);
        }
        NumericFacet::MaxExclusive(bound) => {
            check_bound(lit, bound, |o| o == Ordering::Less, "<", reasons);
        }
        NumericFacet::TotalDigits(max) => match decimal_value(lit) {
            Some(value) => {
                let (total, _) = digit_counts(value);
                if total > *max as usize {
                    reasons.push(format!(
                        "Value {value} has {total} digits, more than totaldigits {max}"
                    ));
                }
            }
            None => reasons.push(format!(
                "totaldigits is not applicable to \"{}\"^^{}",
                lit.value(),
                lit.datatype()
            )),
        },
        NumericFacet::FractionDigits(max) => match decimal_value(lit) {
            Some(value) => {
                let (_, fraction) = digit_counts(value);
                if fraction > *max as usize {
                    reasons.push(format!(
                        "Value {value} has {fraction} fraction digits, more than fractiondigits {max}"
                    ));
                }
            }
            None => reasons.push(format!(
                "fractiondigits is not applicable to \"{}\"^^{}",
                lit.value(),
                lit.datatype()
            )),
        },
    }
}

/// The exact decimal value of a decimal-derived literal; digit facets are
/// undefined for floating datatypes.
fn decimal_value(lit: &Literal) -> Option<Decimal> {
    if is_decimal_derived(lit.datatype()) {
        Decimal::from_str(lit.value()).ok()
    } else {
        None
    }
}

fn check_bound(
    lit: &Literal,
    bound: &Literal,
    ok: fn(Ordering) -> bool,
    relation: &str,
    reasons: &mut Vec<String>,
) {
    match (parse_numeric(lit), parse_numeric(bound)) {
        (Some(value), Some(limit)) => {
            if !compare_numeric(value, limit).is_some_and(ok) {
                reasons.push(format!(
                    "Value {} is not {relation} {}",
                    lit.value(),
                    bound.value()
                ));
            }
        }
        _ => reasons.push(format!(
            "\"{}\"^^{} is not comparable to numeric bound {}",
            lit.value(),
            lit.datatype(),
            bound.value()
        )),
    }
}

/// Checks if a term matches one value set entry.
pub(crate) fn matches_value_set(term: &Term, value: &ValueSetValue) -> bool {
    match value {
        ValueSetValue::ObjectValue(expected) => term == expected,
        ValueSetValue::Language(tag) => {
            language_of(term).is_some_and(|lang| lang.eq_ignore_ascii_case(tag))
        }
        ValueSetValue::IriStem(stem) => {
            iri_of(term).is_some_and(|iri| iri.starts_with(stem.as_str()))
        }
        ValueSetValue::IriStemRange { stem, exclusions } => {
            iri_of(term).is_some_and(|iri| stem_matches(iri, stem))
                && !is_excluded(term, exclusions)
        }
        ValueSetValue::LiteralStem(stem) => {
            literal_of(term).is_some_and(|lit| lit.value().starts_with(stem.as_str()))
        }
        ValueSetValue::LiteralStemRange { stem, exclusions } => {
            literal_of(term).is_some_and(|lit| stem_matches(lit.value(), stem))
                && !is_excluded(term, exclusions)
        }
        ValueSetValue::LanguageStem(stem) => {
            language_of(term).is_some_and(|lang| language_stem_matches(lang, stem))
        }
        ValueSetValue::LanguageStemRange { stem, exclusions } => {
            language_of(term).is_some_and(|lang| match stem {
                StemPattern::Prefix(prefix) => language_stem_matches(lang, prefix),
                StemPattern::Wildcard => true,
            }) && !is_excluded(term, exclusions)
        }
    }
}

fn is_excluded(term: &Term, exclusions: &[ValueSetValue]) -> bool {
    exclusions.iter().any(|ex| matches_value_set(term, ex))
}

fn stem_matches(value: &str, stem: &StemPattern) -> bool {
    match stem {
        StemPattern::Prefix(prefix) => value.starts_with(prefix.as_str()),
        StemPattern::Wildcard => true,
    }
}

fn iri_of(term: &Term) -> Option<&str> {
    match term {
        Term::NamedNode(n) => Some(n.as_str()),
        _ => None,
    }
}

fn literal_of(term: &Term) -> Option<&Literal> {
    match term {
        Term::Literal(l) => Some(l),
        _ => None,
    }
}

fn language_of(term: &Term) -> Option<&str> {
    match term {
        Term::Literal(l) => l.language(),
        _ => None,
    }
}

/// Language stems match on subtag boundaries: `fr` matches `fr` and
/// `fr-CA` but not `frm`. The empty stem matches any language tag.
fn language_stem_matches(lang: &str, stem: &str) -> bool {
    if stem.is_empty() {
        return true;
    }
    if lang.len() == stem.len() {
        return lang.eq_ignore_ascii_case(stem);
    }
    lang.len() > stem.len()
        && lang[..stem.len()].eq_ignore_ascii_case(stem)
        && lang.as_bytes()[stem.len()] == b'-'
}
