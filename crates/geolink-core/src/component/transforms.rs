//! World poses of the component tree

use crate::pose::{Frame, PoseOptions, PoseRecord};

use super::{ComponentError, ComponentTree};

impl ComponentTree {
    /// Absolute poses of `root` and all its descendants, depth-first
    ///
    /// Every component emits a record; the parent link is the tree parent
    /// within the walked subtree.
    pub fn world_poses(
        &self,
        root: &str,
        options: &PoseOptions,
    ) -> Result<Vec<PoseRecord>, ComponentError> {
        if !self.contains(root) {
            return Err(ComponentError::NotFound(root.to_string()));
        }
        let mut records = Vec::with_capacity(self.len());
        self.collect_world_poses(root, Frame::ROOT, options, &mut records);
        Ok(records)
    }

    fn collect_world_poses<'a>(
        &'a self,
        name: &str,
        frame: Frame<'a>,
        options: &PoseOptions,
        records: &mut Vec<PoseRecord>,
    ) {
        let Some(component) = self.get(name) else {
            return;
        };

        let local = component.local_pose();
        let absolute = frame.absolute(&local, options);
        records.push(frame.record(
            &component.name,
            component.type_id,
            local,
            &absolute,
            component.source.clone(),
            options,
        ));

        let child_frame = Frame {
            transform: absolute,
            ancestor: Some((component.name.as_str(), component.type_id)),
        };
        for child in self.children(name) {
            self.collect_world_poses(child, child_frame, options, records);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{DMat4, DVec3};

    use super::*;
    use crate::transform::{EulerOrder, compose, transform, translation_of};

    #[test]
    fn test_world_poses_compose_down_the_tree() {
        let mut tree = ComponentTree::new();
        tree.create("root", 0, DVec3::ZERO, DVec3::ZERO, None).unwrap();
        tree.create("child", 1, DVec3::ONE, DVec3::ONE, Some("root"))
            .unwrap();
        tree.create("grandchild", 2, DVec3::ONE, DVec3::ONE, Some("child"))
            .unwrap();

        let records = tree.world_poses("root", &PoseOptions::default()).unwrap();
        assert_eq!(records.len(), 3);

        let local = transform(DVec3::ONE, DVec3::ONE, EulerOrder::SXYZ);
        let expected = compose(&compose(&DMat4::IDENTITY, &local), &local);
        let grandchild = &records[2];
        assert_eq!(grandchild.name, "grandchild");
        assert_eq!(grandchild.parent_name.as_deref(), Some("child"));
        assert_eq!(grandchild.parent_type_id, Some(1));
        assert!(
            grandchild
                .absolute
                .translation
                .abs_diff_eq(translation_of(&expected), 1e-9)
        );
        assert!(records[0].parent_name.is_none());
    }

    #[test]
    fn test_world_poses_unknown_root() {
        let tree = ComponentTree::new();
        assert_eq!(
            tree.world_poses("nope", &PoseOptions::default()),
            Err(ComponentError::NotFound("nope".to_string()))
        );
    }
}
