// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use cadence_core::scene::{NodeId, NodeInfo, PropertyType, PropertyValue, SceneGraph};
use std::collections::BTreeMap;

const VISIBLE: &str = "visible";
const SENSITIVE: &str = "sensitive";

#[derive(Debug, Clone)]
struct SceneNode {
    name: String,
    children: Vec<NodeId>,
    properties: Vec<(String, PropertyValue)>,
}

impl SceneNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
            properties: vec![
                (VISIBLE.to_string(), PropertyValue::Boolean(true)),
                (SENSITIVE.to_string(), PropertyValue::Boolean(true)),
            ],
        }
    }

    fn slot(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut PropertyValue> {
        self.properties
            .iter_mut()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    fn flag(&self, name: &str) -> bool {
        matches!(self.slot(name), Some(PropertyValue::Boolean(true)))
    }
}

/// A scene graph held in memory, for tools and demos.
///
/// Every node carries the boolean properties `visible` and `sensitive`,
/// which are also what scene dumps report as `IsVisible`/`IsSensitive`.
/// Properties keep their declaration order.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    nodes: BTreeMap<NodeId, SceneNode>,
    root: Option<NodeId>,
    next_id: NodeId,
}

impl MemoryScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    fn allocate(&mut self, name: &str) -> NodeId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.nodes.insert(id, SceneNode::new(name));
        id
    }

    /// Creates the root node, replacing any previous tree.
    pub fn add_root(&mut self, name: &str) -> NodeId {
        self.nodes.clear();
        let id = self.allocate(name);
        self.root = Some(id);
        id
    }

    /// Appends a child to `parent`. Returns `None` if `parent` does not exist.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = self.allocate(name);
        self.nodes.get_mut(&parent)?.children.push(id);
        Some(id)
    }

    /// Declares or overwrites a property, fixing its type.
    pub fn define_property(&mut self, id: NodeId, name: &str, value: PropertyValue) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        match node.slot_mut(name) {
            Some(slot) => *slot = value,
            None => node.properties.push((name.to_string(), value)),
        }
        true
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if the scene has no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl SceneGraph for MemoryScene {
    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn node_info(&self, id: NodeId) -> Option<NodeInfo> {
        self.nodes.get(&id).map(|n| NodeInfo {
            name: n.name.clone(),
            visible: n.flag(VISIBLE),
            sensitive: n.flag(SENSITIVE),
        })
    }

    fn property_names(&self, id: NodeId) -> Vec<String> {
        self.nodes
            .get(&id)
            .map(|n| n.properties.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    fn property_type(&self, id: NodeId, name: &str) -> Option<PropertyType> {
        self.nodes
            .get(&id)?
            .slot(name)
            .map(PropertyValue::property_type)
    }

    fn property(&self, id: NodeId, name: &str) -> Option<PropertyValue> {
        self.nodes.get(&id)?.slot(name).cloned()
    }

    fn set_property(&mut self, id: NodeId, name: &str, value: PropertyValue) -> bool {
        let Some(slot) = self.nodes.get_mut(&id).and_then(|n| n.slot_mut(name)) else {
            return false;
        };
        if slot.property_type() != value.property_type() {
            return false;
        }
        *slot = value;
        true
    }
}
