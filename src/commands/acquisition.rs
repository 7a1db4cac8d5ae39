use std::path::{Path, PathBuf};

use base64::Engine as _;
use serde::Deserialize;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;

use super::settle;
use super::state::AppState;
use crate::acquisition::{ImageCandidate, PreviewUrl};
use crate::capture::{PermissionReport, VideoFrame};
use crate::config;
use crate::shell::ShellView;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "heic"];

/// One file from a drop payload, as read by the webview.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedFile {
    pub name: String,
    pub media_type: String,
    pub data_base64: String,
}

fn decode(data: &str) -> Result<Vec<u8>, String> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| format!("Invalid base64 payload: {e}"))
}

async fn select_path(state: &AppState, path: &Path) -> Result<ShellView, String> {
    if !path.is_file() {
        return Err(format!("Not a regular file: {}", path.display()));
    }
    let mut session = state.session.lock().await;
    let result = session.select_path(path).await;
    settle("select_image_path", result);
    Ok(session.view())
}

#[tauri::command]
pub async fn select_image_path(
    state: State<'_, AppState>,
    file_path: String,
) -> Result<ShellView, String> {
    select_path(&state, Path::new(&file_path)).await
}

/// Native file picker starting in the user's pictures folder.
#[tauri::command]
pub async fn pick_image_file(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<ShellView, String> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let mut picker = app.dialog().file().add_filter("Images", IMAGE_EXTENSIONS);
    if let Some(dir) = config::pictures_dir() {
        picker = picker.set_directory(dir);
    }
    picker.pick_file(move |picked| {
        let _ = tx.send(picked);
    });

    let picked: Option<PathBuf> = rx
        .await
        .map_err(|_| "File picker closed unexpectedly".to_string())?
        .and_then(|p| p.into_path().ok());

    match picked {
        Some(path) => select_path(&state, &path).await,
        None => Ok(state.session.lock().await.view()),
    }
}

#[tauri::command]
pub async fn drop_image(
    state: State<'_, AppState>,
    files: Vec<DroppedFile>,
) -> Result<ShellView, String> {
    let candidates = files
        .into_iter()
        .take(1)
        .map(|f| Ok(ImageCandidate::new(f.name, f.media_type, decode(&f.data_base64)?)))
        .collect::<Result<Vec<_>, String>>()?;

    let mut session = state.session.lock().await;
    session.select_drop(candidates);
    Ok(session.view())
}

#[tauri::command]
pub async fn drag_enter(state: State<'_, AppState>) -> Result<ShellView, String> {
    let mut session = state.session.lock().await;
    session.drag_enter();
    Ok(session.view())
}

#[tauri::command]
pub async fn drag_leave(state: State<'_, AppState>) -> Result<ShellView, String> {
    let mut session = state.session.lock().await;
    session.drag_leave();
    Ok(session.view())
}

/// The webview has run its own permission prompt; `permission` is the
/// outcome.
#[tauri::command]
pub async fn start_camera(
    state: State<'_, AppState>,
    permission: PermissionReport,
) -> Result<ShellView, String> {
    let cancel = state.next_camera_token();
    state.camera.report_permission(permission);

    let mut session = state.session.lock().await;
    let result = session.start_camera(&cancel).await;
    settle("start_camera", result);
    Ok(session.view())
}

/// Latest rendered viewfinder frame. Returns whether it was accepted.
#[tauri::command]
pub fn report_camera_frame(
    state: State<'_, AppState>,
    width: u32,
    height: u32,
    rgba_base64: String,
) -> Result<bool, String> {
    let frame = VideoFrame::new(width, height, decode(&rgba_base64)?)
        .ok_or_else(|| format!("Frame buffer does not match {width}x{height} RGBA"))?;
    Ok(state.camera.push_frame(frame))
}

#[tauri::command]
pub async fn capture_photo(state: State<'_, AppState>) -> Result<ShellView, String> {
    let mut session = state.session.lock().await;
    let result = session.capture_photo();
    settle("capture_photo", result);
    Ok(session.view())
}

#[tauri::command]
pub async fn stop_camera(state: State<'_, AppState>) -> Result<ShellView, String> {
    state.cancel_camera();
    let mut session = state.session.lock().await;
    session.stop_camera();
    Ok(session.view())
}

#[tauri::command]
pub async fn clear_image(state: State<'_, AppState>) -> Result<ShellView, String> {
    let mut session = state.session.lock().await;
    session.clear_image();
    Ok(session.view())
}

/// Inline data URL for the preview the view refers to.
#[tauri::command]
pub async fn read_preview(
    state: State<'_, AppState>,
    url: PreviewUrl,
) -> Result<String, String> {
    state
        .session
        .lock()
        .await
        .preview_data_url(&url)
        .ok_or_else(|| format!("Preview {url} has been released"))
}
