use tauri::State;

use super::settle;
use super::state::AppState;
use crate::occasion::Occasion;
use crate::shell::ShellView;

#[tauri::command]
pub async fn select_occasion(
    state: State<'_, AppState>,
    occasion: String,
) -> Result<ShellView, String> {
    let occasion: Occasion = occasion.parse().map_err(|e| format!("{e}"))?;
    let mut session = state.session.lock().await;
    session.select_occasion(occasion);
    Ok(session.view())
}

#[tauri::command]
pub async fn analyze_outfit(state: State<'_, AppState>) -> Result<ShellView, String> {
    let mut session = state.session.lock().await;
    let result = session.analyze().await;
    settle("analyze_outfit", result);
    Ok(session.view())
}
