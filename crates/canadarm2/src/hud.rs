//! Telemetry panel overlaid on the 3D view.

use bevy::prelude::*;
use ssrms::{PanelLine, panel_lines, render_panel};

use crate::telemetry::{ArmJoints, LinkState, SignalState};

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_panel)
            .add_systems(Update, refresh_panel);
    }
}

/// Marker component for the panel text
#[derive(Component)]
pub(crate) struct TelemetryPanel;

fn spawn_panel(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::srgb(0.9, 0.9, 0.9)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        TelemetryPanel,
        Name::new("Telemetry Panel"),
    ));
}

pub(crate) fn panel_text(joints: &ArmJoints, signal: &SignalState, link: LinkState) -> String {
    let mut lines = panel_lines(joints, signal);
    lines.push(PanelLine {
        label: "Stream",
        value: link.label().to_string(),
    });
    render_panel(&lines)
}

pub(crate) fn refresh_panel(
    joints: Res<ArmJoints>,
    signal: Res<SignalState>,
    link: Res<LinkState>,
    added: Query<(), Added<TelemetryPanel>>,
    mut panels: Query<&mut Text, With<TelemetryPanel>>,
) {
    if !(joints.is_changed() || signal.is_changed() || link.is_changed()) && added.is_empty() {
        return;
    }
    let text = panel_text(&joints, &signal, *link);
    for mut panel in &mut panels {
        panel.0.clone_from(&text);
    }
}
