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

//! Parsing and application of remote property-set commands.
//!
//! Wire format: `<command>|<id>;<property>;<value>|---|<id>;<property>;<value>`.
//! The leading command token is ignored and `---` separates assignments.

use super::error::{RemoteError, RemoteResult};
use cadence_core::scene::{NodeId, PropertyType, PropertyValue, SceneGraph};

/// Longest property command accepted, in bytes.
pub const MAX_PROPERTY_COMMAND_LENGTH: usize = 256;

const ASSIGNMENT_SEPARATOR: &str = "---";

/// One parsed `id;property;value` triple. The value stays raw until the
/// target property's type is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAssignment {
    /// Target node.
    pub node: NodeId,
    /// Property name.
    pub property: String,
    /// Unconverted value text.
    pub raw_value: String,
}

/// Splits a property command into assignments.
///
/// Malformed assignments are logged and skipped. Over-long messages yield an
/// error and no assignment at all.
pub fn parse_property_command(message: &str) -> RemoteResult<Vec<PropertyAssignment>> {
    if message.len() > MAX_PROPERTY_COMMAND_LENGTH {
        log::warn!(
            "Rejecting property command of {} bytes (limit {})",
            message.len(),
            MAX_PROPERTY_COMMAND_LENGTH
        );
        return Err(RemoteError::MessageTooLong {
            length: message.len(),
            max: MAX_PROPERTY_COMMAND_LENGTH,
        });
    }

    let assignments = message
        .trim_end()
        .split('|')
        .skip(1)
        .map(str::trim)
        .filter(|token| !token.is_empty() && *token != ASSIGNMENT_SEPARATOR)
        .filter_map(parse_assignment)
        .collect();
    Ok(assignments)
}

fn parse_assignment(token: &str) -> Option<PropertyAssignment> {
    let mut parts = token.splitn(3, ';');
    let (Some(id), Some(property), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        log::warn!("Skipping malformed property assignment '{token}'");
        return None;
    };
    let Ok(node) = id.trim().parse::<NodeId>() else {
        log::warn!("Skipping property assignment with invalid id '{id}'");
        return None;
    };
    Some(PropertyAssignment {
        node,
        property: property.trim().to_string(),
        raw_value: value.to_string(),
    })
}

fn parse_components<const N: usize>(text: &str) -> Option<[f32; N]> {
    let mut components = [0.0f32; N];
    let mut count = 0;
    for part in text.split(',') {
        if count == N {
            return None;
        }
        components[count] = part.trim().parse().ok()?;
        count += 1;
    }
    (count == N).then_some(components)
}

/// Converts raw text into a value of the given type.
///
/// Square brackets are stripped first, so `[1,0,0,1]` and `1,0,0,1` are
/// equivalent. Booleans accept `true`/`false` or an integer (non-zero is true).
pub fn convert_value(raw: &str, property_type: PropertyType) -> Option<PropertyValue> {
    let text: String = raw.chars().filter(|c| !matches!(c, '[' | ']')).collect();
    let text = text.trim();
    match property_type {
        PropertyType::Integer => text.parse().ok().map(PropertyValue::Integer),
        PropertyType::Float => text.parse().ok().map(PropertyValue::Float),
        PropertyType::Boolean => match text {
            "true" => Some(PropertyValue::Boolean(true)),
            "false" => Some(PropertyValue::Boolean(false)),
            _ => text
                .parse::<i32>()
                .ok()
                .map(|v| PropertyValue::Boolean(v != 0)),
        },
        PropertyType::String => Some(PropertyValue::String(text.to_string())),
        PropertyType::Vector2 => parse_components::<2>(text).map(PropertyValue::Vector2),
        PropertyType::Vector3 => parse_components::<3>(text).map(PropertyValue::Vector3),
        PropertyType::Vector4 => parse_components::<4>(text).map(PropertyValue::Vector4),
    }
}

/// Applies assignments to the scene and returns how many were written.
///
/// Unknown nodes and properties are skipped silently; values that do not
/// convert to the property's type are logged and skipped.
pub fn apply_assignments(scene: &mut dyn SceneGraph, assignments: &[PropertyAssignment]) -> usize {
    let mut applied = 0;
    for assignment in assignments {
        let Some(node) = scene.find_by_id(assignment.node) else {
            continue;
        };
        let Some(property_type) = scene.property_type(node, &assignment.property) else {
            continue;
        };
        let Some(value) = convert_value(&assignment.raw_value, property_type) else {
            log::warn!(
                "Cannot convert '{}' to {:?} for property '{}' of node {}",
                assignment.raw_value,
                property_type,
                assignment.property,
                assignment.node
            );
            continue;
        };
        if scene.set_property(node, &assignment.property, value) {
            applied += 1;
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_assignments_around_separator() {
        let parsed = parse_property_command("cmd|5;scale;2,2,2|---|9;visible;1").unwrap();
        assert_eq!(
            parsed,
            vec![
                PropertyAssignment {
                    node: 5,
                    property: "scale".into(),
                    raw_value: "2,2,2".into()
                },
                PropertyAssignment {
                    node: 9,
                    property: "visible".into(),
                    raw_value: "1".into()
                },
            ]
        );
    }

    #[test]
    fn test_over_length_message_yields_nothing() {
        let message = format!("cmd|1;name;{}", "x".repeat(MAX_PROPERTY_COMMAND_LENGTH));
        assert!(matches!(
            parse_property_command(&message),
            Err(RemoteError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_malformed_tokens_are_skipped() {
        let parsed =
            parse_property_command("set_properties|abc;opacity;1|7;opacity|8;opacity;0.5\n")
                .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].node, 8);
        assert_eq!(parsed[0].raw_value, "0.5");
    }

    #[test]
    fn test_convert_value_per_type() {
        assert_eq!(
            convert_value("[1,0,0,1]", PropertyType::Vector4),
            Some(PropertyValue::Vector4([1.0, 0.0, 0.0, 1.0]))
        );
        assert_eq!(
            convert_value("2, 3", PropertyType::Vector2),
            Some(PropertyValue::Vector2([2.0, 3.0]))
        );
        assert_eq!(convert_value("1,2", PropertyType::Vector3), None);
        assert_eq!(convert_value("1,2,3,4", PropertyType::Vector3), None);
        assert_eq!(
            convert_value("0", PropertyType::Boolean),
            Some(PropertyValue::Boolean(false))
        );
        assert_eq!(
            convert_value("5", PropertyType::Boolean),
            Some(PropertyValue::Boolean(true))
        );
        assert_eq!(
            convert_value("42", PropertyType::Integer),
            Some(PropertyValue::Integer(42))
        );
        assert_eq!(convert_value("4.2x", PropertyType::Float), None);
        assert_eq!(
            convert_value("[hello]", PropertyType::String),
            Some(PropertyValue::String("hello".into()))
        );
    }
}
