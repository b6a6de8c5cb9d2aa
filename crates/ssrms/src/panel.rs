//! Text panel next to the 3D view.

use std::fmt;

use crate::joints::{Joint, JointAngles};
use crate::signal::TelemetryStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelLine {
    pub label: &'static str,
    pub value: String,
}

impl fmt::Display for PanelLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// Time difference with exactly ten decimals, whatever its magnitude.
/// Non-finite values have no decimals and render as `NaN`, `inf` or `-inf`.
pub fn format_difference(difference: f64) -> String {
    format!("{difference:.10}")
}

/// Joint angles in raw degrees followed by the signal fields.
pub fn panel_lines(angles: &JointAngles, status: &TelemetryStatus) -> Vec<PanelLine> {
    let mut lines: Vec<PanelLine> = Joint::ALL
        .iter()
        .map(|&joint| PanelLine {
            label: joint.display_name(),
            value: angles.get(joint).to_string(),
        })
        .collect();

    lines.push(PanelLine {
        label: "Time Difference",
        value: format_difference(status.difference),
    });
    lines.push(PanelLine {
        label: "Signal",
        value: status.status.label().to_string(),
    });
    lines.push(PanelLine {
        label: "Status Code",
        value: status.code.to_string(),
    });
    lines
}

/// One `label: value` row per line.
pub fn render_panel(lines: &[PanelLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalStatus;

    fn decimals(s: &str) -> usize {
        s.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
    }

    #[test]
    fn difference_always_has_ten_decimals() {
        for d in [0.0, 1.0, -1.0, 0.00153680542553047, 123456.789, 1e-15, -0.5] {
            assert_eq!(decimals(&format_difference(d)), 10, "{d}");
        }
        assert_eq!(format_difference(0.0005), "0.0005000000");
    }

    #[test]
    fn non_finite_difference_has_no_decimals() {
        assert_eq!(format_difference(f64::NAN), "NaN");
        assert_eq!(format_difference(f64::INFINITY), "inf");
        assert_eq!(format_difference(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn panel_shows_raw_degrees_and_status() {
        let angles = JointAngles {
            sp: 12.5,
            wr: -90.0,
            ..Default::default()
        };
        let status = TelemetryStatus {
            timestamp: 100.0,
            status: SignalStatus::Stale,
            code: 2,
            difference: 0.25,
        };

        let text = render_panel(&panel_lines(&angles, &status));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Shoulder Roll: 0");
        assert_eq!(lines[2], "Shoulder Pitch: 12.5");
        assert_eq!(lines[6], "Wrist Roll: -90");
        assert_eq!(lines[7], "Time Difference: 0.2500000000");
        assert_eq!(lines[8], "Signal: Stale Signal");
        assert_eq!(lines[9], "Status Code: 2");
    }

    #[test]
    fn nan_angles_render_as_nan() {
        let angles = JointAngles {
            ep: f64::NAN,
            ..Default::default()
        };
        let lines = panel_lines(&angles, &TelemetryStatus::default());
        assert_eq!(lines[3].value, "NaN");
    }
}
