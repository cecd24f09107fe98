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

//! The scene-graph contract used by the remote control channel.
//!
//! The pacing core never owns a scene. Remote property writes and scene dumps
//! go through this trait so any tree of named, typed properties can be exposed.

use std::fmt;

/// Identifier of a scene node.
pub type NodeId = u32;

/// Descriptive fields of a node, as reported in scene dumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Display name.
    pub name: String,
    /// Whether the node is visible.
    pub visible: bool,
    /// Whether the node reacts to input.
    pub sensitive: bool,
}

/// The native type of a node property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// `bool`
    Boolean,
    /// `i32`
    Integer,
    /// `f32`
    Float,
    /// UTF-8 text
    String,
    /// Two `f32` components
    Vector2,
    /// Three `f32` components
    Vector3,
    /// Four `f32` components
    Vector4,
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A boolean.
    Boolean(bool),
    /// A signed integer.
    Integer(i32),
    /// A float.
    Float(f32),
    /// Text.
    String(String),
    /// A 2-component vector.
    Vector2([f32; 2]),
    /// A 3-component vector.
    Vector3([f32; 3]),
    /// A 4-component vector.
    Vector4([f32; 4]),
}

impl PropertyValue {
    /// The type of this value.
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Boolean(_) => PropertyType::Boolean,
            PropertyValue::Integer(_) => PropertyType::Integer,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Vector2(_) => PropertyType::Vector2,
            PropertyValue::Vector3(_) => PropertyType::Vector3,
            PropertyValue::Vector4(_) => PropertyType::Vector4,
        }
    }
}

fn write_components(f: &mut fmt::Formatter<'_>, components: &[f32]) -> fmt::Result {
    write!(f, "[")?;
    for (i, c) in components.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{c}")?;
    }
    write!(f, "]")
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(v) => write!(f, "{v}"),
            PropertyValue::Integer(v) => write!(f, "{v}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::String(v) => f.write_str(v),
            PropertyValue::Vector2(v) => write_components(f, v),
            PropertyValue::Vector3(v) => write_components(f, v),
            PropertyValue::Vector4(v) => write_components(f, v),
        }
    }
}

/// A tree of nodes carrying named, typed properties.
pub trait SceneGraph {
    /// The root node, if the scene is not empty.
    fn root(&self) -> Option<NodeId>;

    /// Direct children of `id`, in order. Unknown ids have no children.
    fn children(&self, id: NodeId) -> Vec<NodeId>;

    /// Descriptive fields of `id`.
    fn node_info(&self, id: NodeId) -> Option<NodeInfo>;

    /// Names of every property of `id`, in a stable order.
    fn property_names(&self, id: NodeId) -> Vec<String>;

    /// The native type of property `name` on `id`.
    fn property_type(&self, id: NodeId, name: &str) -> Option<PropertyType>;

    /// Current value of property `name` on `id`.
    fn property(&self, id: NodeId, name: &str) -> Option<PropertyValue>;

    /// Writes property `name` on `id`. Returns `false` if the node or property
    /// does not exist or the value has the wrong type.
    fn set_property(&mut self, id: NodeId, name: &str, value: PropertyValue) -> bool;

    /// Searches the tree below the root for `id`.
    fn find_by_id(&self, id: NodeId) -> Option<NodeId> {
        let mut pending: Vec<NodeId> = self.root().into_iter().collect();
        while let Some(node) = pending.pop() {
            if node == id {
                return Some(node);
            }
            pending.extend(self.children(node));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(PropertyValue::Boolean(true).to_string(), "true");
        assert_eq!(PropertyValue::Integer(-3).to_string(), "-3");
        assert_eq!(PropertyValue::Float(0.5).to_string(), "0.5");
        assert_eq!(PropertyValue::Vector3([2.0, 2.0, 2.5]).to_string(), "[2, 2, 2.5]");
    }

    #[test]
    fn test_value_type() {
        assert_eq!(
            PropertyValue::Vector4([0.0; 4]).property_type(),
            PropertyType::Vector4
        );
        assert_eq!(
            PropertyValue::String("a".into()).property_type(),
            PropertyType::String
        );
    }
}
