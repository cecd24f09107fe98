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

//! Scene dumps: a recursive JSON description of the tree, length-prefixed.

use super::error::RemoteResult;
use cadence_core::scene::{NodeId, SceneGraph};
use serde::Serialize;

/// One node of a scene dump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDump {
    /// Node name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Depth in the tree, zero for the root.
    pub level: u32,
    /// Node identifier.
    pub id: NodeId,
    /// Visibility flag.
    #[serde(rename = "IsVisible")]
    pub visible: bool,
    /// Input sensitivity flag.
    #[serde(rename = "IsSensitive")]
    pub sensitive: bool,
    /// `[name, value]` pairs.
    pub properties: Vec<[String; 2]>,
    /// Child nodes.
    pub children: Vec<NodeDump>,
}

impl NodeDump {
    fn build(scene: &dyn SceneGraph, id: NodeId, level: u32) -> Option<Self> {
        let info = scene.node_info(id)?;
        let properties = scene
            .property_names(id)
            .into_iter()
            .filter_map(|name| {
                let value = scene.property(id, &name)?;
                Some([name, value.to_string()])
            })
            .collect();
        let children = scene
            .children(id)
            .into_iter()
            .filter_map(|child| Self::build(scene, child, level + 1))
            .collect();
        Some(Self {
            name: info.name,
            level,
            id,
            visible: info.visible,
            sensitive: info.sensitive,
            properties,
            children,
        })
    }
}

/// Serializes the whole scene as `"<byte length>\n<json>"`.
///
/// An empty scene dumps as `{}`.
pub fn dump_scene(scene: &dyn SceneGraph) -> RemoteResult<String> {
    let root = scene.root().and_then(|root| NodeDump::build(scene, root, 0));
    let json = match root {
        Some(root) => serde_json::to_string(&root)?,
        None => "{}".to_string(),
    };
    Ok(format!("{}\n{}", json.len(), json))
}
