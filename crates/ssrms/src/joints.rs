use serde::{Deserialize, Serialize};

/// One of the seven rotary joints of the arm, base to tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    ShoulderRoll,
    ShoulderYaw,
    ShoulderPitch,
    ElbowPitch,
    WristPitch,
    WristYaw,
    WristRoll,
}

impl Joint {
    pub const ALL: [Joint; 7] = [
        Joint::ShoulderRoll,
        Joint::ShoulderYaw,
        Joint::ShoulderPitch,
        Joint::ElbowPitch,
        Joint::WristPitch,
        Joint::WristYaw,
        Joint::WristRoll,
    ];

    /// Human readable name used on the display panel.
    pub fn display_name(self) -> &'static str {
        match self {
            Joint::ShoulderRoll => "Shoulder Roll",
            Joint::ShoulderYaw => "Shoulder Yaw",
            Joint::ShoulderPitch => "Shoulder Pitch",
            Joint::ElbowPitch => "Elbow Pitch",
            Joint::WristPitch => "Wrist Pitch",
            Joint::WristYaw => "Wrist Yaw",
            Joint::WristRoll => "Wrist Roll",
        }
    }

    /// Short field name (`sr`, `sy`, ...).
    pub fn field(self) -> &'static str {
        match self {
            Joint::ShoulderRoll => "sr",
            Joint::ShoulderYaw => "sy",
            Joint::ShoulderPitch => "sp",
            Joint::ElbowPitch => "ep",
            Joint::WristPitch => "wp",
            Joint::WristYaw => "wy",
            Joint::WristRoll => "wr",
        }
    }
}

/// Latest reported angle of every joint, in degrees.
///
/// No history is kept: every update overwrites the previous value of exactly one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    pub sr: f64,
    pub sy: f64,
    pub sp: f64,
    pub ep: f64,
    pub wp: f64,
    pub wy: f64,
    pub wr: f64,
}

impl JointAngles {
    pub fn get(&self, joint: Joint) -> f64 {
        match joint {
            Joint::ShoulderRoll => self.sr,
            Joint::ShoulderYaw => self.sy,
            Joint::ShoulderPitch => self.sp,
            Joint::ElbowPitch => self.ep,
            Joint::WristPitch => self.wp,
            Joint::WristYaw => self.wy,
            Joint::WristRoll => self.wr,
        }
    }

    pub fn set(&mut self, joint: Joint, degrees: f64) {
        let slot = match joint {
            Joint::ShoulderRoll => &mut self.sr,
            Joint::ShoulderYaw => &mut self.sy,
            Joint::ShoulderPitch => &mut self.sp,
            Joint::ElbowPitch => &mut self.ep,
            Joint::WristPitch => &mut self.wp,
            Joint::WristYaw => &mut self.wy,
            Joint::WristRoll => &mut self.wr,
        };
        *slot = degrees;
    }

    pub fn radians(&self, joint: Joint) -> f64 {
        self.get(joint).to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn set_touches_only_one_field() {
        for joint in Joint::ALL {
            let mut angles = JointAngles::default();
            angles.set(joint, 42.0);

            for other in Joint::ALL {
                let expected = if other == joint { 42.0 } else { 0.0 };
                assert_eq!(angles.get(other), expected, "{joint:?} leaked into {other:?}");
            }
        }
    }

    #[test]
    fn radians_match_standard_conversion() {
        let mut angles = JointAngles::default();
        for (joint, degrees) in Joint::ALL.into_iter().zip([-180.0, -90.5, 0.0, 12.5, 45.0, 90.0, 270.0]) {
            angles.set(joint, degrees);
            assert!((angles.radians(joint) - degrees * PI / 180.0).abs() < 1e-12);
        }
    }

    #[test]
    fn field_names_are_unique() {
        let mut fields: Vec<_> = Joint::ALL.iter().map(|j| j.field()).collect();
        fields.sort_unstable();
        fields.dedup();
        assert_eq!(fields.len(), 7);
    }
}
