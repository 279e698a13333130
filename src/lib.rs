pub mod config;
pub mod db;
pub mod error;
pub mod firewall;
pub mod i18n;
pub mod myip;
pub mod platform;
pub mod settings;
pub mod vultr;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
mod tray;

/// Install the panic hook and the `tracing` subscriber (`RUST_LOG` overrides `lavascope=info`).
pub fn init_tracing() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("PANIC in LavaScope: {info}");
        default_hook(info);
    }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lavascope=info".into()),
        )
        .try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::{Arc, RwLock};

    use tauri::Manager;

    use commands::AppState;
    use firewall::{FirewallApi, FirewallService, FirewallStore, IpVersion};
    use platform::{Platform, ProviderEnv};
    use vultr::VultrClient;

    init_tracing();

    let app = tauri::Builder::default()
        // Registered first so a second launch exits before any other plugin starts.
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            if let Err(e) = tray::show_main_window(app) {
                tracing::error!("Failed to show main window for second instance: {e}");
            }
        }))
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_clipboard_manager::init())
        .plugin(tauri_plugin_notification::init())
        .plugin(tauri_plugin_autostart::init(
            tauri_plugin_autostart::MacosLauncher::LaunchAgent,
            None,
        ))
        .invoke_handler(tauri::generate_handler![
            commands::firewall::list_groups,
            commands::firewall::get_group,
            commands::firewall::create_group,
            commands::firewall::set_new_description,
            commands::firewall::update_description,
            commands::firewall::delete_group,
            commands::firewall::list_rules,
            commands::firewall::get_new_rule,
            commands::firewall::edit_new_rule,
            commands::firewall::reset_new_rule,
            commands::firewall::get_source_type_options,
            commands::firewall::create_rule,
            commands::firewall::delete_rule,
            commands::settings::get_settings,
            commands::settings::save_settings,
            commands::settings::get_dev_panel,
            commands::settings::set_dev_panel,
            commands::settings::get_locale,
            commands::settings::toggle_locale,
            commands::settings::get_theme,
            commands::settings::set_theme,
            commands::settings::get_color_scheme,
            commands::settings::set_color_scheme,
            commands::settings::toggle_color_scheme,
            commands::system::get_platform,
            commands::system::write_clipboard,
            commands::system::read_clipboard,
            commands::system::notify,
            commands::system::focus_window,
            commands::system::set_autostart,
            commands::system::get_autostart,
            commands::system::get_detected_ips,
            commands::system::detect_ip,
            commands::system::list_ip_endpoints,
            commands::system::add_ip_endpoint,
            commands::system::delete_ip_endpoint,
            commands::system::reset_ip_endpoints,
        ])
        .setup(|app| {
            let app_handle = app.handle().clone();

            let app_data_dir = app.path().app_data_dir()?;
            std::fs::create_dir_all(&app_data_dir)?;
            let db_path = app_data_dir.join(config::DATABASE_FILE_NAME);
            let database = Arc::new(db::Database::open(&db_path)?);
            tracing::info!("Database opened at {}", db_path.display());

            let locale = settings::locale::init_locale(&database, settings::locale::system_language().as_deref())?;
            let translator = Arc::new(i18n::Translator::new(locale));

            let stored = settings::load_settings(&database)?;
            let client = match VultrClient::from_settings(&stored) {
                Ok(client) => client,
                Err(e) => {
                    tracing::warn!("Ignoring stored proxy settings: {e}");
                    VultrClient::new(stored.api_token.clone(), None)?
                }
            };
            let has_token = client.has_token();
            let api: Arc<dyn FirewallApi> = Arc::new(client);
            let service = Arc::new(FirewallService::new(
                api,
                Arc::new(FirewallStore::new()),
                Arc::clone(&database),
            ));
            let needs_refresh = match service.restore_cached() {
                Ok(stale) => stale,
                Err(e) => {
                    tracing::warn!("Offline cache unavailable: {e}");
                    true
                }
            };

            let detected = myip::stored_addresses(&database)?;
            service.store().refresh_drafts(&detected);

            let platform = Platform::detect(true);
            platform::log_platform_info(platform, "desktop");
            let capabilities = platform::select(
                platform,
                ProviderEnv {
                    app: Some(app_handle.clone()),
                    ..Default::default()
                },
            );

            app.manage(AppState {
                database,
                service: Arc::clone(&service),
                translator: Arc::clone(&translator),
                capabilities,
                detected_ips: RwLock::new(detected),
            });

            tray::build(&app_handle, &translator)?;

            // Background refresh: public addresses, then stale groups.
            tauri::async_runtime::spawn(async move {
                let state = app_handle.state::<AppState>();
                for version in [IpVersion::V4, IpVersion::V6] {
                    if let Err(e) = state.refresh_ip(version).await {
                        tracing::warn!("{e}");
                    }
                }
                if needs_refresh && has_token {
                    if let Err(e) = state.service.refresh_groups().await {
                        tracing::debug!("Startup group refresh skipped: {e}");
                    }
                }
            });

            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::CloseRequested { api, .. } = event {
                if window.label() == config::MAIN_WINDOW_LABEL {
                    api.prevent_close();
                    tray::handle_window_close(window);
                }
            }
        })
        .build(tauri::generate_context!());

    let app = match app {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Error while building LavaScope: {e}");
            return;
        }
    };

    app.run(tray::handle_run_event);
}
