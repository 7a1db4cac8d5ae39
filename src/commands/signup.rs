use tauri::State;

use super::settle;
use super::state::AppState;
use crate::shell::ShellView;

#[tauri::command]
pub async fn open_signup(state: State<'_, AppState>) -> Result<ShellView, String> {
    let mut session = state.session.lock().await;
    session.open_signup();
    Ok(session.view())
}

#[tauri::command]
pub async fn set_signup_email(
    state: State<'_, AppState>,
    email: String,
) -> Result<ShellView, String> {
    let mut session = state.session.lock().await;
    session.set_email(email);
    Ok(session.view())
}

/// Submit the dialog. The session lock is released during the network
/// calls so the view stays readable while `submitting` is set. The cancel
/// token is minted under the lock, so a skip either lands before the begin
/// (and the begin is refused) or cancels this submit.
#[tauri::command]
pub async fn submit_signup(state: State<'_, AppState>) -> Result<ShellView, String> {
    let (request, cancel) = {
        let mut session = state.session.lock().await;
        match session.begin_signup() {
            Ok(started) => started,
            Err(e) => {
                settle("submit_signup", Err::<(), _>(e));
                return Ok(session.view());
            }
        }
    };

    let result = state.pipeline.submit(request, &cancel).await;

    let mut session = state.session.lock().await;
    let finished = session.finish_signup(result);
    settle("submit_signup", finished);
    Ok(session.view())
}

/// Close the dialog. A submit still in flight is cancelled.
#[tauri::command]
pub async fn skip_signup(state: State<'_, AppState>) -> Result<ShellView, String> {
    let mut session = state.session.lock().await;
    session.skip_signup();
    Ok(session.view())
}
