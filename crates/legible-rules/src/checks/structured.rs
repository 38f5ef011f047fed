//! JSON-LD presence, validity and shape.
//!
//! Linked-data graphs may reference nodes by `@id` from anywhere, including
//! themselves, so traversal follows references through an index, remembers
//! every `@id` it has entered and stops at `max_jsonld_depth`.

use crate::descriptor::RuleDescriptor;
use crate::error::Result;
use crate::registry::RuleRegistryBuilder;
use crate::rule::{RuleContext, RuleOutput};
use legible_core::{Category, Severity};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};

const PRIORITY: i32 = 40;

/// Parse failures reported per issue.
const MAX_EVIDENCE: usize = 3;

/// What a bounded walk over one page's JSON-LD found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonLdSummary {
    /// Every `@type` seen, sorted
    pub types: BTreeSet<String>,
    /// Node objects entered
    pub node_count: usize,
    /// Whether some branch was cut at the depth bound
    pub depth_exceeded: bool,
}

/// Walk parsed JSON-LD documents, following `@id` references between them.
///
/// Each identified node is entered at most once, so cyclic graphs terminate.
/// Nesting deeper than `max_depth` is not visited and sets
/// [`JsonLdSummary::depth_exceeded`].
#[must_use]
pub fn walk_jsonld(documents: &[Value], max_depth: usize) -> JsonLdSummary {
    let mut index = HashMap::new();
    for document in documents {
        index_nodes(document, 0, max_depth, &mut index);
    }

    let mut walker = Walker {
        index,
        visited: HashSet::new(),
        max_depth,
        summary: JsonLdSummary::default(),
    };
    for document in documents {
        walker.visit(document, 0);
    }
    walker.summary
}

struct Walker<'a> {
    index: HashMap<&'a str, &'a Map<String, Value>>,
    visited: HashSet<&'a str>,
    max_depth: usize,
    summary: JsonLdSummary,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, value: &'a Value, depth: usize) {
        if depth > self.max_depth {
            self.summary.depth_exceeded = true;
            return;
        }
        match value {
            Value::Array(items) => {
                for item in items {
                    self.visit(item, depth + 1);
                }
            }
            Value::Object(map) => self.visit_object(map, depth),
            _ => {}
        }
    }

    fn visit_object(&mut self, map: &'a Map<String, Value>, depth: usize) {
        if let Some(id) = map.get("@id").and_then(Value::as_str) {
            if !self.visited.insert(id) {
                return;
            }
            if is_reference(map) {
                if let Some(target) = self.index.get(id).copied() {
                    self.visit_node(target, depth + 1);
                }
                return;
            }
        }
        self.visit_node(map, depth);
    }

    fn visit_node(&mut self, map: &'a Map<String, Value>, depth: usize) {
        if depth > self.max_depth {
            self.summary.depth_exceeded = true;
            return;
        }
        self.summary.node_count += 1;
        match map.get("@type") {
            Some(Value::String(ty)) => {
                self.summary.types.insert(ty.clone());
            }
            Some(Value::Array(types)) => {
                self.summary
                    .types
                    .extend(types.iter().filter_map(Value::as_str).map(ToString::to_string));
            }
            _ => {}
        }
        for (key, child) in map {
            if matches!(key.as_str(), "@id" | "@type" | "@context") {
                continue;
            }
            self.visit(child, depth + 1);
        }
    }
}

fn index_nodes<'a>(
    value: &'a Value,
    depth: usize,
    max_depth: usize,
    index: &mut HashMap<&'a str, &'a Map<String, Value>>,
) {
    if depth > max_depth {
        return;
    }
    match value {
        Value::Array(items) => {
            for item in items {
                index_nodes(item, depth + 1, max_depth, index);
            }
        }
        Value::Object(map) => {
            if let Some(id) = map.get("@id").and_then(Value::as_str) {
                if !is_reference(map) {
                    index.entry(id).or_insert(map);
                }
            }
            for (key, child) in map {
                if key != "@context" {
                    index_nodes(child, depth + 1, max_depth, index);
                }
            }
        }
        _ => {}
    }
}

/// `{"@id": "..."}` with nothing else points at a node defined elsewhere.
fn is_reference(map: &Map<String, Value>) -> bool {
    map.len() == 1 && map.contains_key("@id")
}

/// Parsed blocks and the errors of blocks that failed to parse.
fn parse_blocks(ctx: &RuleContext<'_>) -> (Vec<Value>, Vec<String>) {
    let mut parsed = Vec::new();
    let mut errors = Vec::new();
    for block in ctx.document.jsonld_blocks() {
        match serde_json::from_str::<Value>(&block) {
            Ok(value) => parsed.push(value),
            Err(e) => errors.push(e.to_string()),
        }
    }
    (parsed, errors)
}

pub(crate) fn register(builder: &mut RuleRegistryBuilder) -> Result<()> {
    builder
        .register_fn(
            RuleDescriptor::new(
                "structured-data.missing",
                "No structured data",
                Category::StructuredData,
                Severity::Medium,
            )?
            .with_priority(PRIORITY)
            .with_tags(["json-ld"])
            .with_description("The page has neither JSON-LD blocks nor microdata."),
            missing_structured_data,
        )?
        .register_fn(
            RuleDescriptor::new(
                "structured-data.invalid-jsonld",
                "Invalid JSON-LD",
                Category::StructuredData,
                Severity::High,
            )?
            .with_priority(PRIORITY)
            .with_tags(["json-ld"])
            .with_description("A JSON-LD block is not valid JSON."),
            invalid_jsonld,
        )?
        .register_fn(
            RuleDescriptor::new(
                "structured-data.missing-type",
                "JSON-LD without @type",
                Category::StructuredData,
                Severity::Medium,
            )?
            .with_priority(PRIORITY)
            .with_tags(["json-ld"])
            .with_description("JSON-LD is present but no node declares an @type."),
            missing_type,
        )?
        .register_fn(
            RuleDescriptor::new(
                "structured-data.excessive-depth",
                "JSON-LD nested too deeply",
                Category::StructuredData,
                Severity::Low,
            )?
            .with_priority(PRIORITY)
            .with_tags(["json-ld"])
            .with_description("JSON-LD nesting exceeds the configured traversal depth."),
            excessive_depth,
        )?;
    Ok(())
}

fn missing_structured_data(ctx: &RuleContext<'_>) -> RuleOutput {
    if !ctx.document.jsonld_blocks().is_empty() || ctx.document.exists("[itemscope]")? {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("No machine-readable annotations describe what this page is.")
        .remediation("Add a <script type=\"application/ld+json\"> block using a schema.org type.")
        .location("head")
        .build()])
}

fn invalid_jsonld(ctx: &RuleContext<'_>) -> RuleOutput {
    let (_, errors) = parse_blocks(ctx);
    if errors.is_empty() {
        return Ok(Vec::new());
    }

    let mut issue = ctx
        .issue()
        .description(format!(
            "{} JSON-LD block(s) could not be parsed and will be ignored by consumers.",
            errors.len()
        ))
        .remediation("Fix the JSON syntax; trailing commas and unescaped quotes are common causes.")
        .location(r#"script[type="application/ld+json"]"#);
    for error in errors.into_iter().take(MAX_EVIDENCE) {
        issue = issue.evidence(error);
    }
    Ok(vec![issue.build()])
}

fn missing_type(ctx: &RuleContext<'_>) -> RuleOutput {
    let (parsed, _) = parse_blocks(ctx);
    if parsed.is_empty() {
        return Ok(Vec::new());
    }
    let summary = walk_jsonld(&parsed, ctx.config.thresholds.max_jsonld_depth);
    if !summary.types.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("JSON-LD nodes without @type cannot be mapped to a schema.")
        .remediation("Declare an @type such as Article, Product or Organization on each top-level node.")
        .location(r#"script[type="application/ld+json"]"#)
        .build()])
}

fn excessive_depth(ctx: &RuleContext<'_>) -> RuleOutput {
    let (parsed, _) = parse_blocks(ctx);
    let max_depth = ctx.config.thresholds.max_jsonld_depth;
    if !walk_jsonld(&parsed, max_depth).depth_exceeded {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description(format!(
            "JSON-LD nests deeper than {max_depth} levels; deeper nodes were not examined."
        ))
        .remediation("Flatten the graph with @graph and @id references instead of deep nesting.")
        .location(r#"script[type="application/ld+json"]"#)
        .build()])
}
