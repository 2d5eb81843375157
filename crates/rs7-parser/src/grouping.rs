//! Schema-directed grouping (spec.md §4.D step 4).
//!
//! A greedy, single left-to-right pass over the flat segment sequence:
//! at each position in a schema's ordered child list, consume as many
//! repetitions of that child as match, then advance. A Group child is
//! matched by checking whether the next segment's name is reachable as
//! the group's own leading segment - recursing into the group's first
//! children until one of them is mandatory (spec.md §4.B cardinality),
//! since a mandatory child is guaranteed to open every occurrence of
//! the group.

use std::collections::VecDeque;

use rs7_core::error::{Error, Result};
use rs7_core::node::{Node, NodeKind};
use rs7_core::validation::ValidationLevel;
use rs7_schema::{registry_for, Kind, Registry, Version};
use tracing::debug;

/// Drain `segments` into `message`'s children, grouping per the active
/// schema version's structure for `message`'s own name. Leftover
/// segments that match nothing in the schema are rejected in STRICT and
/// appended flat, in encounter order, in LENIENT.
pub fn group_into(message: &mut Node, segments: Vec<Node>) -> Result<()> {
    let version = message.version();
    let level = message.validation_level();
    let reg = registry_for(version);
    let msg_name = message.name().unwrap_or_default().to_string();

    let mut queue: VecDeque<Node> = segments.into();
    let built = build_children(&msg_name, reg.as_ref(), &mut queue, version, level)?;
    for child in built {
        message.add(child)?;
    }

    if !queue.is_empty() {
        if level.is_strict() {
            let child = queue.pop_front().expect("checked non-empty");
            let name = child.name().unwrap_or("").to_string();
            return Err(Error::child_not_valid(msg_name, name));
        }
        debug!(count = queue.len(), "appending ungrouped leftover segments");
        for seg in queue {
            message.add(seg)?;
        }
    }

    Ok(())
}

/// Walk `parent_name`'s ordered schema children, consuming matching
/// segments/groups off the front of `queue` in order. Never consumes a
/// segment that doesn't fit the current schema child; a schema child
/// with no matching input is simply absent (min==0) or left short
/// (min>0, reported by `Node::validate` downstream rather than here -
/// spec.md §4.D only rejects segments the schema never names at all).
fn build_children(
    parent_name: &str,
    reg: &dyn Registry,
    queue: &mut VecDeque<Node>,
    version: Version,
    level: ValidationLevel,
) -> Result<Vec<Node>> {
    let mut out = Vec::new();
    for def in reg.children_of(parent_name) {
        let child_kind = reg.lookup_structure(&def.name).kind;
        let mut count = 0usize;
        loop {
            let Some(front_name) = queue.front().and_then(|n| n.name()).map(str::to_string) else {
                break;
            };
            match child_kind {
                Kind::Segment => {
                    if front_name != def.name {
                        break;
                    }
                    out.push(queue.pop_front().expect("front just peeked"));
                }
                Kind::Group => {
                    if !reachable_leading(&def.name, reg).contains(&front_name) {
                        break;
                    }
                    let mut group = Node::construct(NodeKind::Group, &def.name, version, level)?;
                    for c in build_children(&def.name, reg, queue, version, level)? {
                        group.add(c)?;
                    }
                    out.push(group);
                }
                _ => break,
            }
            count += 1;
            if def.max_occurs().map(|m| count >= m).unwrap_or(false) {
                break;
            }
        }
    }
    Ok(out)
}

/// The set of segment names that can open `name` (itself, if it's a
/// segment; otherwise its first child, recursively, continuing past an
/// optional child to the next one until a mandatory child is reached).
fn reachable_leading(name: &str, reg: &dyn Registry) -> Vec<String> {
    let def = reg.lookup_structure(name);
    match def.kind {
        Kind::Segment => vec![name.to_string()],
        Kind::Group => {
            let mut out = Vec::new();
            for child in &def.children {
                out.extend(reachable_leading(&child.name, reg));
                if child.min > 0 {
                    break;
                }
            }
            out
        }
        _ => Vec::new(),
    }
}
