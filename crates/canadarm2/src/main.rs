mod config;
mod hud;
mod scene;
mod telemetry;
mod viewer;

use app::{AppContext, BoxError};
use bevy::app::AppExit;

const APP_ID: &str = "canadarm2";

fn main() -> Result<(), BoxError> {
    // Kept until the loop returns so the file log is flushed.
    let ctx = AppContext::init(APP_ID, env!("CARGO_PKG_VERSION"))?;
    let mut app = viewer::build(&ctx)?;

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(format!("viewer exited with code {code}").into()),
    }
}
