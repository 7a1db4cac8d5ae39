pub mod acquisition;
pub mod analysis;
pub mod backend;
pub mod capture;
pub mod config;
pub mod error;
pub mod occasion;
pub mod shell;
pub mod submission;

#[cfg(feature = "desktop")]
pub mod commands;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tracing_subscriber::EnvFilter;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let state = commands::state::AppState::new(config::BackendConfig::from_env())
        .expect("failed to initialise signup backend");

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            commands::health_check,
            commands::get_view,
            commands::acquisition::select_image_path,
            commands::acquisition::pick_image_file,
            commands::acquisition::drop_image,
            commands::acquisition::drag_enter,
            commands::acquisition::drag_leave,
            commands::acquisition::start_camera,
            commands::acquisition::report_camera_frame,
            commands::acquisition::capture_photo,
            commands::acquisition::stop_camera,
            commands::acquisition::clear_image,
            commands::acquisition::read_preview,
            commands::analysis::select_occasion,
            commands::analysis::analyze_outfit,
            commands::signup::open_signup,
            commands::signup::set_signup_email,
            commands::signup::submit_signup,
            commands::signup::skip_signup,
        ])
        .run(tauri::generate_context!())
        .expect("error while running StyleAI");
}
