//! Binding between joint angles and the named nodes of the arm model.
//!
//! The labels are node names baked into the model asset. If the asset renames a
//! node, that joint simply stops moving.

use crate::joints::{Joint, JointAngles};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBinding {
    pub label: &'static str,
    pub axis: Axis,
    pub joint: Joint,
}

pub const JOINT_NODES: [NodeBinding; 7] = [
    NodeBinding {
        label: "SR",
        axis: Axis::X,
        joint: Joint::ShoulderRoll,
    },
    NodeBinding {
        label: "SY",
        axis: Axis::Y,
        joint: Joint::ShoulderYaw,
    },
    NodeBinding {
        label: "SP",
        axis: Axis::Z,
        joint: Joint::ShoulderPitch,
    },
    NodeBinding {
        label: "EP",
        axis: Axis::Y,
        joint: Joint::ElbowPitch,
    },
    NodeBinding {
        label: "WP",
        axis: Axis::X,
        joint: Joint::WristPitch,
    },
    NodeBinding {
        label: "WY",
        axis: Axis::Z,
        joint: Joint::WristYaw,
    },
    NodeBinding {
        label: "WR",
        axis: Axis::X,
        joint: Joint::WristRoll,
    },
];

pub fn binding_for_label(label: &str) -> Option<&'static NodeBinding> {
    JOINT_NODES.iter().find(|binding| binding.label == label)
}

impl NodeBinding {
    /// XYZ Euler angles (radians) for this node: the rest pose with the bound axis
    /// replaced by the joint angle. Applying it twice gives the same pose.
    pub fn pose(&self, rest: [f64; 3], angles: &JointAngles) -> [f64; 3] {
        let mut euler = rest;
        euler[self.axis.index()] = angles.radians(self.joint);
        euler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn table_matches_model_contract() {
        let expected = [
            ("SR", Axis::X, "sr"),
            ("SY", Axis::Y, "sy"),
            ("SP", Axis::Z, "sp"),
            ("EP", Axis::Y, "ep"),
            ("WP", Axis::X, "wp"),
            ("WY", Axis::Z, "wy"),
            ("WR", Axis::X, "wr"),
        ];
        for (binding, (label, axis, field)) in JOINT_NODES.iter().zip(expected) {
            assert_eq!(binding.label, label);
            assert_eq!(binding.axis, axis);
            assert_eq!(binding.joint.field(), field);
        }
    }

    #[test]
    fn unknown_labels_are_unbound() {
        assert!(binding_for_label("SP").is_some());
        assert!(binding_for_label("sp").is_none());
        assert!(binding_for_label("Base").is_none());
    }

    #[test]
    fn shoulder_pitch_rotates_around_z_only() {
        let angles = JointAngles {
            sp: 12.5,
            ..Default::default()
        };
        let binding = binding_for_label("SP").unwrap();
        let rest = [0.1, 0.2, 0.3];

        let pose = binding.pose(rest, &angles);
        assert_eq!(pose[0], 0.1);
        assert_eq!(pose[1], 0.2);
        assert!((pose[2] - 12.5 * PI / 180.0).abs() < 1e-12);

        assert_eq!(binding.pose(rest, &angles), pose);
    }
}
