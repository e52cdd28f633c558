//! Occurrence tree rendered as structural notation
//!
//! Each occurrence becomes a part usage typed by the component definition,
//! nested under the occurrence its path extends. Poses are written relative to
//! the enclosing occurrence so the text can be fed back through the importer or
//! the pose accumulator.

use std::collections::HashMap;

use glam::DMat4;

use geolink_core::{
    AngleUnit, COMPONENT_DEFINITION, EulerOrder, POSE_ATTRIBUTES, Pose, quote_name, quote_text,
};

use crate::definition::OccurrencePose;

/// Attribute carrying the Onshape instance id
pub const INSTANCE_ID_ATTRIBUTE: &str = "ID";

const INDENT: &str = "    ";

type ChildIndex<'a> = HashMap<&'a [String], Vec<&'a OccurrencePose>>;

/// Render `poses` as parts nested under a wrapper part named `root_name`
///
/// Siblings are sorted by name. `order` must be the convention the poses were
/// decomposed with.
pub fn occurrence_notation(poses: &[OccurrencePose], root_name: &str, order: EulerOrder) -> String {
    let mut children: ChildIndex = HashMap::new();
    for pose in poses {
        let parent = &pose.path[..pose.path.len().saturating_sub(1)];
        children.entry(parent).or_default().push(pose);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let mut text = format!("part {} {{\n", quote_name(root_name));
    write_children(&mut text, &children, &[], &DMat4::IDENTITY, 1, order);
    text.push_str("}\n");
    text
}

fn write_children(
    text: &mut String,
    children: &ChildIndex,
    parent_path: &[String],
    parent_world: &DMat4,
    level: usize,
    order: EulerOrder,
) {
    let Some(siblings) = children.get(parent_path) else {
        return;
    };
    let pad = INDENT.repeat(level);
    let parent_inverse = parent_world.inverse();

    for occurrence in siblings {
        let world = Pose::new(occurrence.translation, occurrence.rotation)
            .to_mat4(order, AngleUnit::Radians);
        let local = Pose::from_mat4(&(parent_inverse * world), order, AngleUnit::Radians);

        text.push_str(&format!(
            "{pad}part {} : {COMPONENT_DEFINITION} {{\n",
            quote_name(&occurrence.name)
        ));
        text.push_str(&format!(
            "{pad}{INDENT}attribute :>> {INSTANCE_ID_ATTRIBUTE} = {};\n",
            quote_text(&occurrence.id)
        ));
        let values = local.translation.to_array().into_iter().chain(local.rotation.to_array());
        for (name, value) in POSE_ATTRIBUTES.iter().zip(values) {
            text.push_str(&format!("{pad}{INDENT}attribute :>> {name} = {value:?};\n"));
        }
        write_children(text, children, &occurrence.path, &world, level + 1, order);
        text.push_str(&format!("{pad}}}\n"));
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use geolink_core::{ImportOptions, PoseOptions, accumulate_poses, import_text, parse};

    use super::*;
    use crate::definition::AssemblyDefinition;

    fn recorded_poses() -> Vec<OccurrencePose> {
        let definition: AssemblyDefinition =
            serde_json::from_str(include_str!("../tests/data/assembly_definition.json")).unwrap();
        definition.occurrence_poses(EulerOrder::SXYZ)
    }

    #[test]
    fn test_nesting_and_sibling_order() {
        let text = occurrence_notation(&recorded_poses(), "test", EulerOrder::SXYZ);
        assert!(text.starts_with("part test {\n    part 'Arm <1>' : Component {\n"));
        assert!(text.contains("        attribute :>> ID = \"i2\";\n"));
        assert!(text.contains("        part Gripper : Component {\n"));

        let arm = text.find("'Arm <1>'").unwrap();
        let gripper = text.find("Gripper").unwrap();
        let base = text.find("part Base").unwrap();
        assert!(arm < gripper && gripper < base);
    }

    #[test]
    fn test_rendered_text_imports_with_local_poses() {
        let text = occurrence_notation(&recorded_poses(), "test", EulerOrder::SXYZ);
        let imported = import_text(&text, &ImportOptions::default()).unwrap();

        assert_eq!(imported.tree.roots(), ["Arm <1>", "Base"]);
        assert_eq!(imported.tree.parent_name("Gripper"), Some("Arm <1>"));
        let gripper = imported.tree.get("Gripper").unwrap();
        assert!(gripper.translation.abs_diff_eq(DVec3::new(0.0, 3.0, 0.0), 1e-12));
        let arm = imported.tree.get("Arm <1>").unwrap();
        assert!(arm.translation.abs_diff_eq(DVec3::new(2.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn test_world_poses_survive_rendering() {
        let order: EulerOrder = "rzyx".parse().unwrap();
        let poses = vec![
            OccurrencePose {
                id: "a".to_string(),
                name: "outer".to_string(),
                kind: "Assembly".to_string(),
                path: vec!["a".to_string()],
                translation: DVec3::new(1.0, -2.0, 0.5),
                rotation: DVec3::new(0.4, -0.2, 1.1),
            },
            OccurrencePose {
                id: "b".to_string(),
                name: "inner".to_string(),
                kind: "Part".to_string(),
                path: vec!["a".to_string(), "b".to_string()],
                translation: DVec3::new(3.0, 0.25, -1.0),
                rotation: DVec3::new(-0.3, 0.6, 0.2),
            },
        ];
        let text = occurrence_notation(&poses, "scene", order);

        // Give every part a type tag so the accumulator emits it
        let tagged = text.replace("attribute :>> ID", "attribute :>> typeID = 1; attribute :>> ID");
        let document = parse(&tagged).unwrap();
        let records =
            accumulate_poses(&document, &PoseOptions::new(AngleUnit::Radians, order)).unwrap();

        assert_eq!(records.len(), 2);
        for (record, pose) in records.iter().zip(&poses) {
            assert_eq!(record.name, pose.name);
            assert!(record.absolute.translation.abs_diff_eq(pose.translation, 1e-9));
            assert!(record.absolute.rotation.abs_diff_eq(pose.rotation, 1e-9));
        }
    }

    #[test]
    fn test_empty_assembly() {
        assert_eq!(occurrence_notation(&[], "empty", EulerOrder::SXYZ), "part empty {\n}\n");
    }
}
