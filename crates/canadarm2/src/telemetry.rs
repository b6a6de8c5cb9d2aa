//! Bridge between the push client and the ECS.
//!
//! The stream runs on the client's own runtime and only ever sends
//! [`StreamEvent`]s. Everything it changes is applied here, on the schedule,
//! one update at a time in arrival order.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use lightstreamer::{ItemUpdate, StreamClient, StreamError, StreamEvent, Subscription};
use settings::SettingsArc;
use ssrms::channels::{STATUS_CLASS_FIELD, TIMESTAMP_FIELD, VALUE_FIELD, apply_arm_value};
use ssrms::clock::now_hours_of_year;
use ssrms::{ARM_FIELDS, ARM_ITEMS, JointAngles, TIME_FIELDS, TIME_ITEM, TelemetryStatus};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info, warn};

use crate::config::StreamSettings;

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArmJoints>()
            .init_resource::<SignalState>()
            .init_resource::<LinkState>()
            .init_resource::<TelemetryLink>()
            .add_systems(Startup, start_telemetry)
            .add_systems(PreUpdate, pump_telemetry_events)
            .add_systems(Last, stop_on_exit);
    }
}

/// Latest joint angles in degrees.
#[derive(Resource, Default, Debug, Deref, DerefMut)]
pub struct ArmJoints(pub JointAngles);

/// Result of the last time item update.
#[derive(Resource, Default, Debug, Deref, DerefMut)]
pub struct SignalState(pub TelemetryStatus);

/// State of the push connection itself, independent of the feed's own status.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected,
}

impl LinkState {
    pub fn label(self) -> &'static str {
        match self {
            LinkState::Idle => "Idle",
            LinkState::Connecting => "Connecting",
            LinkState::Connected => "Connected",
            LinkState::Disconnected => "Disconnected",
        }
    }
}

#[derive(Resource)]
pub struct TelemetryLink {
    client: Option<StreamClient>,
    sender: UnboundedSender<StreamEvent>,
    receiver: Arc<Mutex<UnboundedReceiver<StreamEvent>>>,
}

impl Default for TelemetryLink {
    fn default() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            client: None,
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }
}

impl TelemetryLink {
    pub fn sender(&self) -> UnboundedSender<StreamEvent> {
        self.sender.clone()
    }

    /// Connects and subscribes to the arm group and the time item.
    pub fn connect(&mut self, settings: &StreamSettings) -> Result<(), StreamError> {
        let mut client = StreamClient::new(settings.client_config())?;
        client.subscribe(Subscription::merge(ARM_ITEMS, ARM_FIELDS))?;
        client.subscribe(Subscription::merge([TIME_ITEM], TIME_FIELDS))?;
        client.start(self.sender())?;
        self.client = Some(client);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.stop();
        }
    }
}

fn start_telemetry(
    mut link: ResMut<TelemetryLink>,
    mut state: ResMut<LinkState>,
    settings: Res<SettingsArc<StreamSettings>>,
) {
    if let Err(err) = link.connect(&settings) {
        error!(%err, "could not start telemetry stream");
        state.set_if_neq(LinkState::Disconnected);
    }
}

fn stop_on_exit(mut exits: MessageReader<AppExit>, mut link: ResMut<TelemetryLink>) {
    if exits.read().next().is_some() {
        link.disconnect();
    }
}

pub(crate) fn pump_telemetry_events(
    link: Res<TelemetryLink>,
    mut joints: ResMut<ArmJoints>,
    mut signal: ResMut<SignalState>,
    mut state: ResMut<LinkState>,
) {
    let mut receiver = match link.receiver.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    while let Ok(event) = receiver.try_recv() {
        match event {
            StreamEvent::Connecting => {
                state.set_if_neq(LinkState::Connecting);
            }
            StreamEvent::Connected { session_id } => {
                info!(session = %session_id, "telemetry connected");
                state.set_if_neq(LinkState::Connected);
            }
            StreamEvent::Subscribed {
                subscription,
                items,
                fields,
            } => {
                debug!(%subscription, items, fields, "telemetry subscription active");
            }
            StreamEvent::Update(update) if update.item == TIME_ITEM => {
                **signal = time_status(&update);
            }
            StreamEvent::Update(update) => apply_arm_update(&update, &mut joints),
            StreamEvent::SubscriptionError {
                subscription,
                code,
                message,
            } => {
                warn!(%subscription, code, %message, "telemetry subscription rejected");
            }
            StreamEvent::Disconnected { reason } => {
                warn!(%reason, "telemetry disconnected");
                state.set_if_neq(LinkState::Disconnected);
            }
        }
    }
}

fn time_status(update: &ItemUpdate) -> TelemetryStatus {
    TelemetryStatus::evaluate(
        update.value(TIMESTAMP_FIELD).unwrap_or_default(),
        update.value(STATUS_CLASS_FIELD).unwrap_or_default(),
        now_hours_of_year(),
    )
}

/// Writes the joint fed by this item, if any. Only marks the resource changed
/// when a joint actually received a value.
fn apply_arm_update(update: &ItemUpdate, joints: &mut ResMut<ArmJoints>) {
    if !update.is_changed(VALUE_FIELD) {
        return;
    }
    let value = update.value(VALUE_FIELD).unwrap_or_default();
    if apply_arm_value(joints.bypass_change_detection(), &update.item, value).is_some() {
        joints.set_changed();
    }
}
