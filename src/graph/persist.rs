//! Display-position persistence.
//!
//! Each node stores its canvas position as
//! `<node id="Read 0"><displayPosition x="90" y="30"/></node>`, and a graph
//! stores all of them inside `<applicationData id="Presentation">`. Topology is
//! persisted separately through [`GraphDefinition`](crate::definition::GraphDefinition).

use super::node::{GraphNode, NodeId, Position};
use super::{Graph, GraphEvent};
use crate::error::PersistError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;

pub const PRESENTATION_ID: &str = "Presentation";

/// Coordinates are written as integers but read as floats and truncated.
fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.trim()
        .parse::<f32>()
        .map(|v| v as i32)
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPosition {
    #[serde(rename = "@x", deserialize_with = "coordinate")]
    pub x: i32,
    #[serde(rename = "@y", deserialize_with = "coordinate")]
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "node")]
pub struct NodeElement {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(
        rename = "displayPosition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_position: Option<DisplayPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "applicationData")]
pub struct PresentationElement {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "node", default)]
    pub nodes: Vec<NodeElement>,
}

fn to_xml<T: Serialize>(value: &T) -> Result<String, PersistError> {
    quick_xml::se::to_string(value).map_err(|e| PersistError::Xml(e.to_string()))
}

fn from_xml<T: for<'de> Deserialize<'de>>(xml: &str) -> Result<T, PersistError> {
    quick_xml::de::from_str(xml).map_err(|e| PersistError::Xml(e.to_string()))
}

impl GraphNode {
    pub fn save_parameters(&self) -> NodeElement {
        NodeElement {
            id: self.name.clone(),
            display_position: Some(DisplayPosition {
                x: self.position.x,
                y: self.position.y,
            }),
        }
    }

    /// Applies a stored element. A missing `displayPosition` leaves the position as is.
    pub fn load_parameters(&mut self, element: &NodeElement) {
        if let Some(dp) = &element.display_position {
            self.position = Position::new(dp.x, dp.y);
        }
    }

    pub fn to_presentation_xml(&self) -> Result<String, PersistError> {
        to_xml(&self.save_parameters())
    }

    pub fn load_presentation_xml(&mut self, xml: &str) -> Result<(), PersistError> {
        let element: NodeElement = from_xml(xml)?;
        self.load_parameters(&element);
        Ok(())
    }
}

impl Graph {
    pub fn presentation(&self) -> PresentationElement {
        PresentationElement {
            id: PRESENTATION_ID.to_string(),
            nodes: self.nodes().map(GraphNode::save_parameters).collect(),
        }
    }

    pub fn save_presentation(&self) -> Result<String, PersistError> {
        to_xml(&self.presentation())
    }

    /// Restores node positions from a presentation block. Elements naming
    /// unknown nodes are skipped. Returns the number of nodes updated.
    pub fn load_presentation(&mut self, xml: &str) -> Result<usize, PersistError> {
        let presentation: PresentationElement = from_xml(xml)?;
        let mut updated = 0;
        for element in &presentation.nodes {
            let Some(id) = self.find(&element.id) else {
                log::debug!("presentation names unknown node '{}'", element.id);
                continue;
            };
            if let Some(node) = self.nodes.get_mut(&id) {
                node.load_parameters(element);
                updated += 1;
                self.events.publish(GraphEvent::Updated(id));
            }
        }
        Ok(updated)
    }

    /// Restores one node from its own `<node>` element.
    pub fn load_node_presentation(&mut self, id: NodeId, xml: &str) -> Result<(), PersistError> {
        self.node_mut(id)?.load_presentation_xml(xml)?;
        self.events.publish(GraphEvent::Updated(id));
        Ok(())
    }

    pub fn write_presentation(&self, path: &str) -> Result<(), PersistError> {
        let xml = self.save_presentation()?;
        fs::write(path, xml).map_err(|e| PersistError::Io {
            path: path.to_string(),
            source: e,
        })
    }

    pub fn read_presentation(&mut self, path: &str) -> Result<usize, PersistError> {
        let xml = fs::read_to_string(path).map_err(|e| PersistError::Io {
            path: path.to_string(),
            source: e,
        })?;
        self.load_presentation(&xml)
    }
}
