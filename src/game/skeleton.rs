use glam::{Mat4, Quat, Vec3};

use crate::error::{AnimError, Result};

/// Receiver of sampled joint transforms.
pub trait SkeletonSink {
    fn num_joints(&self) -> usize;

    fn set_joint_local(&mut self, index: usize, translate: Vec3, rotate: Quat, scale: Vec3);

    /// Recompute world and skin matrices from the current local transforms.
    fn evaluate(&mut self);
}

#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub parent: Option<usize>,

    pub pose_translate: Vec3,
    pub pose_rotate: Quat,
    pub pose_scale: Vec3,
    /// global bind pose
    pose_matrix: Mat4,
    inv_pose_matrix: Mat4,

    translate: Vec3,
    rotate: Quat,
    scale: Vec3,
    /// per-instance scale on top of the animated one, not inherited by child translations' axes
    variation_scale: Vec3,

    local_unscaled: Mat4,
    local_scaled: Mat4,
    world_unscaled: Mat4,
    world_scaled: Mat4,
    skin_matrix: Mat4,
    dirty: bool,
}

impl Joint {
    pub fn translate(&self) -> Vec3 {
        self.translate
    }

    pub fn rotate(&self) -> Quat {
        self.rotate
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn variation_scale(&self) -> Vec3 {
        self.variation_scale
    }

    pub fn pose_matrix(&self) -> Mat4 {
        self.pose_matrix
    }

    pub fn inv_pose_matrix(&self) -> Mat4 {
        self.inv_pose_matrix
    }

    /// world transform including this joint's scale
    pub fn world_matrix(&self) -> Mat4 {
        self.world_scaled
    }

    pub fn skin_matrix(&self) -> Mat4 {
        self.skin_matrix
    }
}

/// Joints are stored parents-first so a single forward pass evaluates the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(num_joints: usize) -> Self {
        Self { joints: Vec::with_capacity(num_joints) }
    }

    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        translate: Vec3,
        rotate: Quat,
        scale: Vec3,
    ) -> Result<usize> {
        let index = self.joints.len();
        if let Some(parent) = parent {
            if parent >= index {
                return Err(AnimError::InvalidParentJoint { joint: index, parent });
            }
        }

        let local_pose = Mat4::from_scale_rotation_translation(scale, rotate, translate);
        let pose_matrix = match parent {
            Some(p) => self.joints[p].pose_matrix * local_pose,
            None => local_pose,
        };

        self.joints.push(Joint {
            name: name.into(),
            parent,
            pose_translate: translate,
            pose_rotate: rotate,
            pose_scale: scale,
            pose_matrix,
            inv_pose_matrix: pose_matrix.inverse(),
            translate,
            rotate,
            scale,
            variation_scale: Vec3::ONE,
            local_unscaled: Mat4::IDENTITY,
            local_scaled: Mat4::IDENTITY,
            world_unscaled: Mat4::IDENTITY,
            world_scaled: Mat4::IDENTITY,
            skin_matrix: Mat4::IDENTITY,
            dirty: true,
        });
        Ok(index)
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn joint_index_by_name(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    pub fn set_variation_scale(&mut self, index: usize, scale: Vec3) {
        if let Some(joint) = self.joints.get_mut(index) {
            joint.variation_scale = scale;
            joint.dirty = true;
        }
    }

    /// Back to the bind pose; takes effect on the next `evaluate`.
    pub fn reset_to_pose(&mut self) {
        for joint in &mut self.joints {
            joint.translate = joint.pose_translate;
            joint.rotate = joint.pose_rotate;
            joint.scale = joint.pose_scale;
            joint.dirty = true;
        }
    }

    pub fn skin_matrices(&self) -> impl Iterator<Item = Mat4> + '_ {
        self.joints.iter().map(|j| j.skin_matrix)
    }
}

impl SkeletonSink for Skeleton {
    fn num_joints(&self) -> usize {
        self.joints.len()
    }

    fn set_joint_local(&mut self, index: usize, translate: Vec3, rotate: Quat, scale: Vec3) {
        if let Some(joint) = self.joints.get_mut(index) {
            joint.translate = translate;
            joint.rotate = rotate;
            joint.scale = scale;
            joint.dirty = true;
        }
    }

    fn evaluate(&mut self) {
        for index in 0..self.joints.len() {
            let (before, rest) = self.joints.split_at_mut(index);
            let joint = &mut rest[0];

            if joint.dirty {
                joint.rotate = joint.rotate.normalize();
                joint.local_unscaled = Mat4::from_rotation_translation(joint.rotate, joint.translate);
                joint.local_scaled = Mat4::from_scale_rotation_translation(
                    joint.scale * joint.variation_scale,
                    joint.rotate,
                    joint.translate,
                );
                joint.dirty = false;
            }

            match joint.parent.map(|p| &before[p]) {
                Some(parent) => {
                    // the child's offset follows the parent's scale, its axes do not
                    let parent_scale = parent.scale * parent.variation_scale;
                    let offset = (joint.translate * parent_scale).extend(1.0);
                    let mut unscaled = joint.local_unscaled;
                    let mut scaled = joint.local_scaled;
                    unscaled.w_axis = offset;
                    scaled.w_axis = offset;
                    joint.world_unscaled = parent.world_unscaled * unscaled;
                    joint.world_scaled = parent.world_unscaled * scaled;
                }
                None => {
                    joint.world_unscaled = joint.local_unscaled;
                    joint.world_scaled = joint.local_scaled;
                }
            }
            joint.skin_matrix = joint.world_scaled * joint.inv_pose_matrix;
        }
    }
}
