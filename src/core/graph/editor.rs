//! Editor graph documents
//!
//! The interactive editor persists a graph as a JSON document where node
//! labels double as type tags: a label starting with `P` is a process, a
//! label starting with `R` is a resource whose capacity is written in
//! parentheses, e.g. `R1 (2)`. Edges refer to nodes by their full label.
//!
//! This module reads and writes that document and extracts the
//! [`GraphSnapshot`] the reduction engine works on. Node positions and
//! counters belong to the editor and are carried through untouched.

use crate::core::error::{RagError, Result};
use crate::core::graph::snapshot::GraphSnapshot;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Next free index for newly created nodes of each kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIndexes {
    pub process: u32,
    pub resource: u32,
}

/// A graph as saved by the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
    #[serde(default)]
    pub node_positions: BTreeMap<String, (f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_indexes: Option<NodeIndexes>,
}

impl EditorGraph {
    /// Read an editor document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open graph file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse graph file {}", path.display()))
    }

    /// Write the document to disk, pretty-printed like the editor does
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create graph file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).context("Failed to serialize graph")?;
        writer.flush().context("Failed to write graph file")?;
        Ok(())
    }

    /// Split the labelled nodes into processes and resources
    ///
    /// Resource ids drop the capacity suffix (`R1 (2)` becomes `R1`) and
    /// edges are rewritten to use ids. Edge endpoints that match no node
    /// are kept verbatim so that [`GraphSnapshot::validate`] reports them.
    ///
    /// # Errors
    /// - `MalformedCapacity` if a resource label has no integer capacity
    /// - `UnrecognizedNode` if a label carries neither tag
    pub fn extract(&self) -> Result<GraphSnapshot> {
        let mut snapshot = GraphSnapshot::new();
        let mut ids: BTreeMap<&str, String> = BTreeMap::new();

        for label in &self.nodes {
            let id = match tag_of(label) {
                Some('P') => {
                    let id = label.trim().to_string();
                    snapshot.processes.push(id.clone());
                    id
                }
                Some('R') => {
                    let (id, capacity) = parse_resource_label(label)?;
                    snapshot.capacities.insert(id.clone(), capacity);
                    snapshot.resources.push(id.clone());
                    id
                }
                _ => return Err(RagError::UnrecognizedNode(label.clone())),
            };
            ids.insert(label.as_str(), id);
        }

        let resolve = |label: &String| ids.get(label.as_str()).cloned().unwrap_or_else(|| label.clone());
        snapshot.edges = self
            .edges
            .iter()
            .map(|(from, to)| (resolve(from), resolve(to)))
            .collect();

        Ok(snapshot)
    }

    /// Delete every edge touching a process
    ///
    /// This is how the editor clears a process from the drawing once the
    /// reduction has removed it. The process node itself stays.
    ///
    /// # Returns
    /// The number of edges removed
    pub fn remove_process_edges(&mut self, process: &str) -> usize {
        let before = self.edges.len();
        self.edges
            .retain(|(from, to)| from.trim() != process && to.trim() != process);
        before - self.edges.len()
    }
}

fn tag_of(label: &str) -> Option<char> {
    label.trim_start().chars().next()
}

/// Parse a resource label such as `R3 (2)` into `("R3", 2)`
pub fn parse_resource_label(label: &str) -> Result<(String, u32)> {
    let malformed = || RagError::MalformedCapacity {
        label: label.to_string(),
    };

    let (name, rest) = label.split_once('(').ok_or_else(malformed)?;
    let digits = rest.trim().strip_suffix(')').ok_or_else(malformed)?;
    let capacity = digits.trim().parse::<u32>().map_err(|_| malformed())?;

    let name = name.trim();
    if name.is_empty() {
        return Err(malformed());
    }
    Ok((name.to_string(), capacity))
}
