//! Lower raw schema JSON into the typed node arena.
//!
//! Every static invariant is checked here, once, so validation never sees an
//! inconsistent schema: bound ordering, non-negative counts, `multipleOf > 0`,
//! compilable regexes, known formats, well-formed combinator lists, unique
//! `required` entries and unique `$id`s. Unknown keywords are kept in
//! `Meta::extra` untouched.
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::SchemaLoadError;
use crate::pointer::Pointer;
use crate::schema::number::{compare, to_f64};
use crate::schema::{
    Additional, ArrayConstraints, Dependency, Format, Items, Meta, NodeId, NodeKind,
    NumberConstraints, ObjectConstraints, Pattern, PatternProperty, PropertyNames, RefNode, RefTarget,
    SchemaDocument, SchemaNode, StringConstraints,
};

const META_KEYWORDS: &[&str] = &["$schema", "$id", "title", "description", "definitions", "$defs"];
const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern", "format"];
const NUMBER_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];
const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "required",
    "additionalProperties",
    "patternProperties",
    "propertyNames",
    "minProperties",
    "maxProperties",
    "dependencies",
];
const ARRAY_KEYWORDS: &[&str] = &[
    "items",
    "additionalItems",
    "contains",
    "minItems",
    "maxItems",
    "uniqueItems",
];
const COMBINATORS: &[&str] = &["anyOf", "allOf", "oneOf"];
const NO_KEYWORDS: &[&str] = &[];

type Result<T> = std::result::Result<T, SchemaLoadError>;

pub fn lower_document(raw: &Value) -> Result<SchemaDocument> {
    let mut lowerer = Lowerer::default();
    lowerer.declared.insert(String::new());
    lowerer.scopes.push(Scope {
        uri: String::new(),
        prefix: Pointer::root(),
    });
    let root = lowerer.lower(raw, Pointer::root(), "")?;

    let ref_cache = (0..lowerer.ref_slots).map(|_| OnceCell::new()).collect();
    tracing::debug!(
        nodes = lowerer.nodes.len(),
        refs = lowerer.ref_slots,
        resources = lowerer.declared.len(),
        "schema lowered"
    );
    Ok(SchemaDocument {
        nodes: lowerer.nodes,
        root,
        pointers: lowerer.pointers,
        anchors: lowerer.anchors,
        ref_cache,
        raw: raw.clone(),
    })
}

// ————————————————————————————————————————————————————————————————————————————
// LOWERER
// ————————————————————————————————————————————————————————————————————————————

/// An enclosing `$id` resource: its URI and where it starts in the raw schema.
struct Scope {
    uri: String,
    prefix: Pointer,
}

#[derive(Default)]
struct Lowerer {
    nodes: Vec<SchemaNode>,
    scopes: Vec<Scope>,
    declared: HashSet<String>,
    pointers: HashMap<(String, String), NodeId>,
    anchors: HashMap<(String, String), NodeId>,
    ref_slots: usize,
}

impl Lowerer {
    /// Nodes are pushed after their children, so the arena is in post-order.
    fn lower(&mut self, value: &Value, pointer: Pointer, base: &str) -> Result<NodeId> {
        let Value::Object(map) = value else {
            return Err(SchemaLoadError::NotAnObject { pointer });
        };
        let kw = Keywords { map, pointer: &pointer };

        let mut base = base.to_string();
        let mut anchor = None;
        let mut opened_scope = false;
        if let Some(id) = kw.string("$id")? {
            let (uri, fragment) = split_reference(id);
            if !uri.is_empty() {
                base = join_uri(&base, uri);
                if !self.declared.insert(base.clone()) {
                    return Err(SchemaLoadError::DuplicateId {
                        pointer: kw.at("$id"),
                        id: id.to_string(),
                    });
                }
                self.scopes.push(Scope {
                    uri: base.clone(),
                    prefix: pointer.clone(),
                });
                opened_scope = true;
            }
            if !fragment.is_empty() {
                anchor = Some(fragment.to_string());
            }
        }

        // a failed load discards the lowerer, so the scope stack needs no unwinding
        let node = self.lower_node(&kw, &base)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        for scope in &self.scopes {
            if let Some(relative) = pointer.strip_prefix(&scope.prefix) {
                self.pointers.insert((scope.uri.clone(), relative.to_string()), id);
            }
        }
        if let Some(name) = anchor {
            match self.anchors.entry((base.clone(), name)) {
                Entry::Occupied(entry) => {
                    return Err(SchemaLoadError::DuplicateId {
                        pointer: kw.at("$id"),
                        id: format!("#{}", entry.key().1),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(id);
                }
            }
        }
        if opened_scope {
            self.scopes.pop();
        }
        Ok(id)
    }

    fn lower_node(&mut self, kw: &Keywords<'_>, base: &str) -> Result<SchemaNode> {
        let (kind, consumed) = self.lower_kind(kw, base)?;

        let mut meta = Meta {
            schema: kw.string("$schema")?.map(str::to_string),
            id: kw.string("$id")?.map(str::to_string),
            title: kw.string("title")?.map(str::to_string),
            description: kw.string("description")?.map(str::to_string),
            definitions: self.lower_table(kw, "definitions", base)?,
            defs: self.lower_table(kw, "$defs", base)?,
            extra: IndexMap::new(),
        };
        for (key, value) in kw.map {
            if !META_KEYWORDS.contains(&key.as_str()) && !consumed.contains(&key.as_str()) {
                meta.extra.insert(key.clone(), value.clone());
            }
        }

        Ok(SchemaNode {
            meta,
            pointer: kw.pointer.clone(),
            base: base.to_string(),
            kind,
        })
    }

    /// The node's kind plus the keywords that kind interprets.
    fn lower_kind(&mut self, kw: &Keywords<'_>, base: &str) -> Result<(NodeKind, Vec<&'static str>)> {
        if let Some(reference) = kw.string("$ref")? {
            // draft-07: siblings of `$ref` are ignored, so they stay opaque
            let (uri, fragment) = split_reference(reference);
            let resource = if uri.is_empty() { base.to_string() } else { join_uri(base, uri) };
            let slot = self.ref_slots;
            self.ref_slots += 1;
            let node = RefNode {
                reference: reference.to_string(),
                target: RefTarget {
                    resource,
                    fragment: normalize_fragment(fragment),
                },
                slot,
            };
            return Ok((NodeKind::Ref(node), vec!["$ref"]));
        }

        let mut kinds: Vec<&'static str> = Vec::new();
        if kw.map.contains_key("type") {
            kinds.push("type");
        }
        kinds.extend(COMBINATORS.iter().copied().filter(|c| kw.map.contains_key(*c)));
        match kinds.as_slice() {
            [] => Err(SchemaLoadError::MissingKind { pointer: kw.pointer.clone() }),
            ["type"] => self.lower_typed(kw, base),
            [combinator] => {
                let combinator: &'static str = *combinator;
                let branches = self.lower_branches(kw, combinator, base)?;
                let kind = match combinator {
                    "anyOf" => NodeKind::AnyOf(branches),
                    "allOf" => NodeKind::AllOf(branches),
                    _ => NodeKind::OneOf(branches),
                };
                Ok((kind, vec![combinator]))
            }
            _ => Err(SchemaLoadError::ConflictingKinds {
                pointer: kw.pointer.clone(),
                kinds: kinds.iter().map(|k| k.to_string()).collect(),
            }),
        }
    }

    fn lower_typed(&mut self, kw: &Keywords<'_>, base: &str) -> Result<(NodeKind, Vec<&'static str>)> {
        let Some(name) = kw.string("type")? else {
            return Err(kw.invalid("type", "a single type name"));
        };
        let (kind, keywords): (NodeKind, &[&'static str]) = match name {
            "string" => (NodeKind::String(lower_string(kw)?), STRING_KEYWORDS),
            "number" => (NodeKind::Number(lower_number(kw, false)?), NUMBER_KEYWORDS),
            "integer" => (NodeKind::Number(lower_number(kw, true)?), NUMBER_KEYWORDS),
            "object" => (NodeKind::Object(self.lower_object(kw, base)?), OBJECT_KEYWORDS),
            "array" => (NodeKind::Array(self.lower_array(kw, base)?), ARRAY_KEYWORDS),
            "boolean" => (NodeKind::Boolean, NO_KEYWORDS),
            "null" => (NodeKind::Null, NO_KEYWORDS),
            other => {
                return Err(SchemaLoadError::UnknownType {
                    pointer: kw.at("type"),
                    name: other.to_string(),
                });
            }
        };
        let mut consumed = vec!["type"];
        consumed.extend_from_slice(keywords);
        Ok((kind, consumed))
    }

    fn lower_branches(&mut self, kw: &Keywords<'_>, keyword: &'static str, base: &str) -> Result<Vec<NodeId>> {
        let at = kw.at(keyword);
        match kw.map.get(keyword) {
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.lower(item, at.index(i), base))
                .collect(),
            _ => Err(SchemaLoadError::EmptyCombinator { pointer: at, keyword }),
        }
    }

    /// `definitions` / `$defs` / `properties`: name → schema.
    fn lower_table(&mut self, kw: &Keywords<'_>, keyword: &'static str, base: &str) -> Result<Option<IndexMap<String, NodeId>>> {
        let Some(value) = kw.map.get(keyword) else {
            return Ok(None);
        };
        let Value::Object(entries) = value else {
            return Err(kw.invalid(keyword, "an object of schemas"));
        };
        let at = kw.at(keyword);
        let mut out = IndexMap::with_capacity(entries.len());
        for (name, schema) in entries {
            let id = self.lower(schema, at.child(name.as_str()), base)?;
            out.insert(name.clone(), id);
        }
        Ok(Some(out))
    }

    fn lower_additional(&mut self, kw: &Keywords<'_>, keyword: &'static str, base: &str) -> Result<Option<Additional>> {
        match kw.map.get(keyword) {
            None => Ok(None),
            Some(Value::Bool(allowed)) => Ok(Some(Additional::Allowed(*allowed))),
            Some(schema @ Value::Object(_)) => {
                let id = self.lower(schema, kw.at(keyword), base)?;
                Ok(Some(Additional::Schema(id)))
            }
            Some(_) => Err(kw.invalid(keyword, "a boolean or a schema")),
        }
    }

    fn lower_object(&mut self, kw: &Keywords<'_>, base: &str) -> Result<ObjectConstraints> {
        let properties = self.lower_table(kw, "properties", base)?;
        let required = kw.string_list("required")?;
        if let Some(names) = &required {
            let mut seen = HashSet::new();
            for name in names {
                if !seen.insert(name.as_str()) {
                    return Err(SchemaLoadError::DuplicateRequired {
                        pointer: kw.at("required"),
                        property: name.clone(),
                    });
                }
            }
        }
        let additional = self.lower_additional(kw, "additionalProperties", base)?;

        let pattern_properties = match kw.map.get("patternProperties") {
            None => None,
            Some(Value::Object(entries)) => {
                let at = kw.at("patternProperties");
                let mut out = Vec::with_capacity(entries.len());
                for (source, schema) in entries {
                    let regex = compile(source, at.child(source.as_str()))?;
                    let node = self.lower(schema, at.child(source.as_str()), base)?;
                    out.push(PatternProperty { regex, node });
                }
                Some(out)
            }
            Some(_) => return Err(kw.invalid("patternProperties", "an object of schemas")),
        };

        let property_names = match kw.map.get("propertyNames") {
            None => None,
            Some(Value::Object(map)) => {
                let inner_pointer = kw.at("propertyNames");
                let inner = Keywords { map, pointer: &inner_pointer };
                let pattern = inner.pattern("pattern")?;
                let extra = map
                    .iter()
                    .filter(|(k, _)| k.as_str() != "pattern")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Some(PropertyNames { pattern, extra })
            }
            Some(_) => return Err(kw.invalid("propertyNames", "an object")),
        };

        let min_properties = kw.count("minProperties")?;
        let max_properties = kw.count("maxProperties")?;
        kw.ordered(min_properties, max_properties, "minProperties", "maxProperties")?;

        let dependencies = match kw.map.get("dependencies") {
            None => None,
            Some(Value::Object(entries)) => {
                let at = kw.at("dependencies");
                let mut out = IndexMap::with_capacity(entries.len());
                for (name, dep) in entries {
                    let dep_at = at.child(name.as_str());
                    let dependency = match dep {
                        Value::Array(items) => {
                            let list = items
                                .iter()
                                .map(|item| item.as_str().map(str::to_string))
                                .collect::<Option<Vec<_>>>()
                                .ok_or_else(|| SchemaLoadError::InvalidKeyword {
                                    pointer: dep_at.clone(),
                                    keyword: "dependencies".into(),
                                    expected: "an array of property names or a schema",
                                })?;
                            Dependency::Properties(list)
                        }
                        Value::Object(_) => Dependency::Schema(self.lower(dep, dep_at, base)?),
                        _ => {
                            return Err(SchemaLoadError::InvalidKeyword {
                                pointer: dep_at,
                                keyword: "dependencies".into(),
                                expected: "an array of property names or a schema",
                            });
                        }
                    };
                    out.insert(name.clone(), dependency);
                }
                Some(out)
            }
            Some(_) => return Err(kw.invalid("dependencies", "an object")),
        };

        Ok(ObjectConstraints {
            properties,
            required,
            additional,
            pattern_properties,
            property_names,
            min_properties,
            max_properties,
            dependencies,
        })
    }

    fn lower_array(&mut self, kw: &Keywords<'_>, base: &str) -> Result<ArrayConstraints> {
        let items = match kw.map.get("items") {
            None => None,
            Some(schema @ Value::Object(_)) => Some(Items::List(self.lower(schema, kw.at("items"), base)?)),
            Some(Value::Array(schemas)) => {
                let at = kw.at("items");
                let ids = schemas
                    .iter()
                    .enumerate()
                    .map(|(i, s)| self.lower(s, at.index(i), base))
                    .collect::<Result<Vec<_>>>()?;
                Some(Items::Tuple(ids))
            }
            Some(_) => return Err(kw.invalid("items", "a schema or an array of schemas")),
        };
        let additional_items = self.lower_additional(kw, "additionalItems", base)?;
        let contains = match kw.map.get("contains") {
            None => None,
            Some(schema) => Some(self.lower(schema, kw.at("contains"), base)?),
        };
        let min_items = kw.count("minItems")?;
        let max_items = kw.count("maxItems")?;
        kw.ordered(min_items, max_items, "minItems", "maxItems")?;

        Ok(ArrayConstraints {
            items,
            additional_items,
            contains,
            min_items,
            max_items,
            unique_items: kw.boolean("uniqueItems")?,
        })
    }
}

fn lower_string(kw: &Keywords<'_>) -> Result<StringConstraints> {
    let min_length = kw.count("minLength")?;
    let max_length = kw.count("maxLength")?;
    kw.ordered(min_length, max_length, "minLength", "maxLength")?;
    let format = match kw.string("format")? {
        None => None,
        Some(name) => Some(Format::from_name(name).ok_or_else(|| SchemaLoadError::UnknownFormat {
            pointer: kw.at("format"),
            format: name.to_string(),
        })?),
    };
    Ok(StringConstraints {
        min_length,
        max_length,
        pattern: kw.pattern("pattern")?,
        format,
    })
}

fn lower_number(kw: &Keywords<'_>, integer: bool) -> Result<NumberConstraints> {
    let minimum = kw.number("minimum")?;
    let maximum = kw.number("maximum")?;
    let exclusive_minimum = kw.number("exclusiveMinimum")?;
    let exclusive_maximum = kw.number("exclusiveMaximum")?;
    let multiple_of = kw.number("multipleOf")?;

    let inverted = |lo: &Option<Number>, hi: &Option<Number>, strict: bool| match (lo, hi) {
        (Some(lo), Some(hi)) => match compare(lo, hi) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => strict,
            _ => false,
        },
        _ => false,
    };
    if inverted(&minimum, &maximum, false) {
        return Err(SchemaLoadError::InvertedBounds {
            pointer: kw.pointer.clone(),
            lower: "minimum",
            upper: "maximum",
        });
    }
    if inverted(&exclusive_minimum, &exclusive_maximum, true) {
        return Err(SchemaLoadError::InvertedBounds {
            pointer: kw.pointer.clone(),
            lower: "exclusiveMinimum",
            upper: "exclusiveMaximum",
        });
    }
    if multiple_of.as_ref().is_some_and(|m| to_f64(m) <= 0.0) {
        return Err(SchemaLoadError::NonPositiveMultipleOf { pointer: kw.at("multipleOf") });
    }

    Ok(NumberConstraints {
        integer,
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
        multiple_of,
    })
}

// ————————————————————————————————————————————————————————————————————————————
// KEYWORD READERS
// ————————————————————————————————————————————————————————————————————————————

struct Keywords<'a> {
    map: &'a Map<String, Value>,
    pointer: &'a Pointer,
}

impl<'a> Keywords<'a> {
    fn at(&self, keyword: &str) -> Pointer {
        self.pointer.child(keyword)
    }

    fn invalid(&self, keyword: &str, expected: &'static str) -> SchemaLoadError {
        SchemaLoadError::InvalidKeyword {
            pointer: self.at(keyword),
            keyword: keyword.to_string(),
            expected,
        }
    }

    fn string(&self, keyword: &str) -> Result<Option<&'a str>> {
        match self.map.get(keyword) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.invalid(keyword, "a string")),
        }
    }

    fn boolean(&self, keyword: &str) -> Result<Option<bool>> {
        match self.map.get(keyword) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.invalid(keyword, "a boolean")),
        }
    }

    fn number(&self, keyword: &str) -> Result<Option<Number>> {
        match self.map.get(keyword) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.clone())),
            Some(_) => Err(self.invalid(keyword, "a number")),
        }
    }

    fn count(&self, keyword: &str) -> Result<Option<u64>> {
        match self.map.get(keyword) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.invalid(keyword, "a non-negative integer")),
        }
    }

    fn string_list(&self, keyword: &str) -> Result<Option<Vec<String>>> {
        match self.map.get(keyword) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Some)
                .ok_or_else(|| self.invalid(keyword, "an array of strings")),
            Some(_) => Err(self.invalid(keyword, "an array of strings")),
        }
    }

    fn pattern(&self, keyword: &str) -> Result<Option<Pattern>> {
        let Some(source) = self.string(keyword)? else {
            return Ok(None);
        };
        Pattern::new(source)
            .map(Some)
            .map_err(|error| SchemaLoadError::InvalidPattern {
                pointer: self.at(keyword),
                message: error.to_string(),
            })
    }

    fn ordered<T: PartialOrd>(&self, lower: Option<T>, upper: Option<T>, lower_name: &'static str, upper_name: &'static str) -> Result<()> {
        match (lower, upper) {
            (Some(lo), Some(hi)) if lo > hi => Err(SchemaLoadError::InvertedBounds {
                pointer: self.pointer.clone(),
                lower: lower_name,
                upper: upper_name,
            }),
            _ => Ok(()),
        }
    }
}

fn compile(source: &str, pointer: Pointer) -> Result<Regex> {
    Regex::new(source).map_err(|error| SchemaLoadError::InvalidPattern {
        pointer,
        message: error.to_string(),
    })
}

// ————————————————————————————————————————————————————————————————————————————
// URI HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Split at the first `#` into (URI part, fragment).
pub(crate) fn split_reference(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((uri, fragment)) => (uri, fragment),
        None => (reference, ""),
    }
}

/// Resolve `reference` against `base`, dropping any fragment.
pub(crate) fn join_uri(base: &str, reference: &str) -> String {
    if let Ok(mut absolute) = url::Url::parse(reference) {
        absolute.set_fragment(None);
        return absolute.to_string();
    }
    if let Ok(base_url) = url::Url::parse(base) {
        if let Ok(mut joined) = base_url.join(reference) {
            joined.set_fragment(None);
            return joined.to_string();
        }
    }
    // relative base: replace its last path segment
    match base.rfind('/') {
        Some(slash) => format!("{}{}", &base[..=slash], reference),
        None => reference.to_string(),
    }
}

/// Percent-decode pointer fragments and re-render them in canonical form.
fn normalize_fragment(fragment: &str) -> String {
    if fragment.starts_with('/') || fragment.starts_with("%2F") || fragment.starts_with("%2f") {
        if let Some(pointer) = Pointer::from_fragment(fragment) {
            return pointer.to_string();
        }
    }
    crate::pointer::percent_decode(fragment).unwrap_or_else(|| fragment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(schema: Value) -> SchemaDocument {
        SchemaDocument::parse(&schema).unwrap()
    }

    fn load_err(schema: Value) -> SchemaLoadError {
        SchemaDocument::parse(&schema).unwrap_err()
    }

    #[test]
    fn lowers_every_kind() {
        let doc = load(json!({
            "type": "object",
            "properties": {
                "s": {"type": "string"},
                "n": {"type": "number"},
                "i": {"type": "integer"},
                "a": {"type": "array", "items": {"type": "boolean"}},
                "z": {"type": "null"},
                "r": {"$ref": "#/properties/s"},
                "u": {"anyOf": [{"type": "string"}, {"type": "null"}]},
                "v": {"allOf": [{"type": "string"}]},
                "w": {"oneOf": [{"type": "string"}]}
            }
        }));
        let root = doc.node(doc.root());
        let NodeKind::Object(obj) = &root.kind else { panic!("root is object") };
        let kinds: Vec<_> = obj
            .properties
            .as_ref()
            .unwrap()
            .values()
            .map(|id| doc.node(*id).kind.name())
            .collect();
        assert_eq!(
            kinds,
            ["string", "number", "integer", "array", "null", "$ref", "anyOf", "allOf", "oneOf"]
        );
        // root comes last in the post-order arena
        assert_eq!(doc.root().index(), doc.len() - 1);
        assert_eq!(doc.refs().count(), 1);
    }

    #[test]
    fn unknown_keywords_stay_opaque() {
        let doc = load(json!({
            "type": "string",
            "minLength": 1,
            "x-widget": {"kind": "textarea"},
            "minimum": 3
        }));
        let extra = &doc.node(doc.root()).meta.extra;
        assert_eq!(extra.get("x-widget"), Some(&json!({"kind": "textarea"})));
        // number keywords on a string node are not interpreted
        assert_eq!(extra.get("minimum"), Some(&json!(3)));
        assert!(!extra.contains_key("minLength"));
    }

    #[test]
    fn ref_siblings_are_preserved_not_interpreted() {
        let doc = load(json!({
            "definitions": {"a": {"type": "null"}},
            "$ref": "#/definitions/a",
            "type": "string"
        }));
        let root = doc.node(doc.root());
        assert!(matches!(root.kind, NodeKind::Ref(_)));
        assert_eq!(root.meta.extra.get("type"), Some(&json!("string")));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = load_err(json!({
            "type": "object",
            "properties": {"name": {"type": "string", "minLength": 5, "maxLength": 2}}
        }));
        assert_eq!(
            err,
            SchemaLoadError::InvertedBounds {
                pointer: Pointer::parse("/properties/name").unwrap(),
                lower: "minLength",
                upper: "maxLength",
            }
        );
        assert!(matches!(
            load_err(json!({"type": "number", "minimum": 10, "maximum": 1.5})),
            SchemaLoadError::InvertedBounds { lower: "minimum", .. }
        ));
        assert!(matches!(
            load_err(json!({"type": "number", "exclusiveMinimum": 3, "exclusiveMaximum": 3})),
            SchemaLoadError::InvertedBounds { lower: "exclusiveMinimum", .. }
        ));
        assert!(matches!(
            load_err(json!({"type": "array", "minItems": 3, "maxItems": 1})),
            SchemaLoadError::InvertedBounds { lower: "minItems", .. }
        ));
        // equal bounds are fine
        load(json!({"type": "string", "minLength": 2, "maxLength": 2}));
    }

    #[test]
    fn keyword_shape_errors_carry_pointer() {
        let err = load_err(json!({"type": "array", "items": {"type": "number", "multipleOf": 0}}));
        assert_eq!(err.pointer().to_string(), "/items/multipleOf");

        let err = load_err(json!({"type": "string", "pattern": "(unclosed"}));
        assert!(matches!(err, SchemaLoadError::InvalidPattern { .. }));
        assert_eq!(err.pointer().to_string(), "/pattern");

        let err = load_err(json!({"type": "string", "format": "colour"}));
        assert!(matches!(err, SchemaLoadError::UnknownFormat { .. }));

        let err = load_err(json!({"type": "string", "minLength": -1}));
        assert!(matches!(err, SchemaLoadError::InvalidKeyword { expected: "a non-negative integer", .. }));

        let err = load_err(json!({"type": "widget"}));
        assert!(matches!(err, SchemaLoadError::UnknownType { .. }));

        let err = load_err(json!({"type": ["string", "null"]}));
        assert!(matches!(err, SchemaLoadError::InvalidKeyword { .. }));
    }

    #[test]
    fn kind_invariants() {
        assert!(matches!(load_err(json!({"title": "nothing"})), SchemaLoadError::MissingKind { .. }));
        assert!(matches!(
            load_err(json!({"type": "string", "oneOf": [{"type": "null"}]})),
            SchemaLoadError::ConflictingKinds { .. }
        ));
        assert!(matches!(load_err(json!({"anyOf": []})), SchemaLoadError::EmptyCombinator { .. }));
        assert!(matches!(load_err(json!({"allOf": {"type": "null"}})), SchemaLoadError::EmptyCombinator { .. }));
        let err = load_err(json!({"oneOf": [{"type": "null"}, 3]}));
        assert_eq!(err, SchemaLoadError::NotAnObject { pointer: Pointer::parse("/oneOf/1").unwrap() });
    }

    #[test]
    fn required_must_be_unique() {
        let err = load_err(json!({"type": "object", "required": ["a", "b", "a"]}));
        assert_eq!(
            err,
            SchemaLoadError::DuplicateRequired {
                pointer: Pointer::parse("/required").unwrap(),
                property: "a".into()
            }
        );
    }

    #[test]
    fn ids_open_scopes() {
        let doc = load(json!({
            "$id": "http://example.com/root.json",
            "type": "object",
            "definitions": {
                "item": {
                    "$id": "item.json",
                    "type": "object",
                    "properties": {"id": {"$id": "#ident", "type": "string"}}
                }
            }
        }));
        let item = doc.lookup_pointer("http://example.com/item.json", &Pointer::root()).unwrap();
        assert_eq!(doc.node(item).pointer.to_string(), "/definitions/item");
        // the same node stays addressable from the root resource
        let via_root = doc
            .lookup_pointer("", &Pointer::parse("/definitions/item/properties/id").unwrap())
            .unwrap();
        let via_item = doc
            .lookup_pointer("http://example.com/item.json", &Pointer::parse("/properties/id").unwrap())
            .unwrap();
        assert_eq!(via_root, via_item);
        assert_eq!(doc.lookup_anchor("http://example.com/item.json", "ident"), Some(via_item));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = load_err(json!({
            "anyOf": [
                {"$id": "http://example.com/a.json", "type": "null"},
                {"$id": "http://example.com/a.json", "type": "string"}
            ]
        }));
        assert!(matches!(err, SchemaLoadError::DuplicateId { .. }));
        assert_eq!(err.pointer().to_string(), "/anyOf/1/$id");
    }

    #[test]
    fn duplicate_anchors_are_rejected() {
        let err = load_err(json!({
            "type": "object",
            "properties": {"p": {"$ref": "#dup"}},
            "definitions": {
                "a": {"$id": "#dup", "type": "string"},
                "b": {"$id": "#dup", "type": "null"}
            }
        }));
        assert!(matches!(&err, SchemaLoadError::DuplicateId { id, .. } if id == "#dup"));
        assert_eq!(err.pointer().to_string(), "/definitions/b/$id");

        // the same name under different resources is fine
        SchemaDocument::parse(&json!({
            "definitions": {
                "a": {"$id": "http://example.com/a.json", "type": "null", "definitions": {"x": {"$id": "#dup", "type": "null"}}},
                "b": {"$id": "http://example.com/b.json", "type": "null", "definitions": {"x": {"$id": "#dup", "type": "null"}}}
            },
            "type": "null"
        }))
        .unwrap();
    }

    #[test]
    fn uri_joining() {
        assert_eq!(join_uri("http://example.com/schemas/root.json", "item.json"), "http://example.com/schemas/item.json");
        assert_eq!(join_uri("", "item.json"), "item.json");
        assert_eq!(join_uri("schemas/root.json", "item.json"), "schemas/item.json");
        assert_eq!(join_uri("http://a.com/x.json", "https://b.com/y.json#frag"), "https://b.com/y.json");
        assert_eq!(split_reference("item.json#/definitions/a"), ("item.json", "/definitions/a"));
        assert_eq!(normalize_fragment("/definitions/a%20b"), "/definitions/a b");
        assert_eq!(normalize_fragment("/a~1b"), "/a~1b");
    }
}
