//! Telemetry items published by the ISS Live push service for the arm.

use crate::joints::{Joint, JointAngles};

/// Every SSRMS item we subscribe to. Only [`JOINT_CHANNELS`] feed the model.
pub const ARM_ITEMS: [&str; 11] = [
    "CSASSRMS001",
    "CSASSRMS002",
    "CSASSRMS003",
    "CSASSRMS004",
    "CSASSRMS005",
    "CSASSRMS006",
    "CSASSRMS007",
    "CSASSRMS008",
    "CSASSRMS009",
    "CSASSRMS010",
    "CSASSRMS011",
];

pub const ARM_FIELDS: [&str; 2] = [TIMESTAMP_FIELD, VALUE_FIELD];

/// Ground time item carrying the acquisition-of-signal status.
pub const TIME_ITEM: &str = "TIME_000001";

pub const TIME_FIELDS: [&str; 4] = [
    TIMESTAMP_FIELD,
    VALUE_FIELD,
    STATUS_CLASS_FIELD,
    STATUS_INDICATOR_FIELD,
];

pub const TIMESTAMP_FIELD: &str = "TimeStamp";
pub const VALUE_FIELD: &str = "Value";
pub const STATUS_CLASS_FIELD: &str = "Status.Class";
pub const STATUS_INDICATOR_FIELD: &str = "Status.Indicator";

/// Item name to joint.
pub const JOINT_CHANNELS: [(&str, Joint); 7] = [
    ("CSASSRMS004", Joint::ShoulderRoll),
    ("CSASSRMS005", Joint::ShoulderYaw),
    ("CSASSRMS006", Joint::ShoulderPitch),
    ("CSASSRMS007", Joint::ElbowPitch),
    ("CSASSRMS008", Joint::WristPitch),
    ("CSASSRMS009", Joint::WristYaw),
    ("CSASSRMS010", Joint::WristRoll),
];

pub fn joint_for_item(item: &str) -> Option<Joint> {
    JOINT_CHANNELS
        .iter()
        .find(|(name, _)| *name == item)
        .map(|(_, joint)| *joint)
}

/// Applies one `Value` update of an arm item.
///
/// Unknown items are ignored and `None` is returned. A value that does not parse as a
/// number is stored as `NaN` so the panel shows that the feed is garbage.
pub fn apply_arm_value(angles: &mut JointAngles, item: &str, value: &str) -> Option<Joint> {
    let joint = joint_for_item(item)?;
    let degrees = value.trim().parse::<f64>().unwrap_or_else(|_| {
        tracing::warn!(item, value, "non-numeric joint angle");
        f64::NAN
    });
    angles.set(joint, degrees);
    Some(joint)
}
