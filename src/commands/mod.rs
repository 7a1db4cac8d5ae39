pub mod acquisition;
pub mod analysis;
pub mod signup;
pub mod state;

use tauri::State;

use crate::error::StyleError;
use crate::shell::ShellView;
use state::AppState;

/// Liveness check for the webview. Does not contact the signup backend.
#[tauri::command]
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}

/// Current state of the whole screen. Drains pending notices.
#[tauri::command]
pub async fn get_view(state: State<'_, AppState>) -> Result<ShellView, String> {
    Ok(state.session.lock().await.view())
}

/// User-facing failures are already queued as notices; the view carries
/// them. Only log here.
pub(crate) fn settle<T>(action: &str, result: Result<T, StyleError>) {
    if let Err(e) = result {
        tracing::warn!(action, error = %e, "Action finished with an error");
    }
}
