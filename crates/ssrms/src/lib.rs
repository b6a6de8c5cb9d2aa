//! Space Station Remote Manipulator System (Canadarm2) telemetry model.
//!
//! Everything in here is independent of the renderer and the push transport:
//! - [`joints`]: the seven joint angles and their update rules
//! - [`channels`]: the telemetry item names and what they feed
//! - [`signal`] and [`clock`]: acquisition-of-signal classification
//! - [`rig`]: which model node rotates around which axis for which joint
//! - [`panel`]: the text shown next to the 3D view

pub mod channels;
pub mod clock;
pub mod joints;
pub mod panel;
pub mod rig;
pub mod signal;

pub use channels::{ARM_FIELDS, ARM_ITEMS, TIME_FIELDS, TIME_ITEM};
pub use joints::{Joint, JointAngles};
pub use panel::{PanelLine, panel_lines, render_panel};
pub use rig::{Axis, JOINT_NODES, NodeBinding};
pub use signal::{SignalStatus, TelemetryStatus};
