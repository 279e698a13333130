//! System tray icon, its menu, and main-window close handling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tauri::{
    menu::{Menu, MenuEvent, MenuItem},
    tray::{MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager, RunEvent, Window, Wry,
};

use crate::commands::AppState;
use crate::config::MAIN_WINDOW_LABEL;
use crate::error::AppError;
use crate::i18n::{Message, Translator};
use crate::platform::Notification;

const TRAY_ID: &str = "mainTray";

/// Menu items whose text follows the locale and window visibility.
pub struct TrayMenu {
    hide: MenuItem<Wry>,
    quit: MenuItem<Wry>,
}

/// Whether the "still running" notice was already shown this session.
#[derive(Default)]
pub struct WindowState {
    notified_background: AtomicBool,
}

impl WindowState {
    /// True exactly once, for the first close of the main window.
    fn take_first_close(&self) -> bool {
        !self.notified_background.swap(true, Ordering::SeqCst)
    }
}

pub fn build(app: &AppHandle, translator: &Translator) -> Result<TrayIcon, AppError> {
    let hide = MenuItem::with_id(app, Message::Hide.id(), translator.t(Message::Hide), true, None::<&str>)?;
    let quit = MenuItem::with_id(app, Message::Quit.id(), translator.t(Message::Quit), true, None::<&str>)?;
    let menu = Menu::with_items(app, &[&hide, &quit])?;

    let mut builder = TrayIconBuilder::with_id(TRAY_ID)
        .tooltip("LavaScope")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(handle_menu_event)
        .on_tray_icon_event(handle_tray_icon_event);
    if let Some(icon) = app.default_window_icon().cloned() {
        builder = builder.icon(icon);
    }
    let tray = builder.build(app)?;

    app.manage(Mutex::new(TrayMenu { hide, quit }));
    app.manage(WindowState::default());
    Ok(tray)
}

/// Re-apply the current locale to every menu item.
pub fn retranslate(app: &AppHandle) -> Result<(), AppError> {
    let (Some(state), Some(menu)) = (app.try_state::<AppState>(), app.try_state::<Mutex<TrayMenu>>()) else {
        return Ok(());
    };
    let menu = menu.lock().map_err(|_| AppError::Io("Tray menu state poisoned".into()))?;
    menu.hide.set_text(hide_text(app, &state.translator))?;
    menu.quit.set_text(state.translator.t(Message::Quit))?;
    Ok(())
}

fn hide_text(app: &AppHandle, translator: &Translator) -> &'static str {
    let visible = app
        .get_webview_window(MAIN_WINDOW_LABEL)
        .and_then(|w| w.is_visible().ok())
        .unwrap_or(false);
    if visible {
        translator.t(Message::Hide)
    } else {
        translator.t(Message::Show)
    }
}

/// Bring the main window back, e.g. when a second instance is launched.
pub fn show_main_window(app: &AppHandle) -> Result<(), AppError> {
    let window = app
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| AppError::WindowNotFound(MAIN_WINDOW_LABEL.to_string()))?;
    window.show()?;
    window.unminimize()?;
    window.set_focus()?;
    Ok(())
}

/// Dock icon click on macOS: restore the dock icon and the main window.
#[cfg(target_os = "macos")]
fn handle_reopen(app: &AppHandle) -> Result<(), AppError> {
    app.set_activation_policy(tauri::ActivationPolicy::Regular)?;
    show_main_window(app)
}

pub fn handle_run_event(#[allow(unused_variables)] app: &AppHandle, event: RunEvent) {
    let res = match event {
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => handle_reopen(app),
        _ => Ok(()),
    };
    if let Err(e) = res {
        tracing::error!("Run event handling failed: {e}");
    }
}

fn toggle_main_window(app: &AppHandle) -> Result<(), AppError> {
    let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) else {
        return Ok(());
    };
    if window.is_visible()? {
        window.hide()?;
    } else {
        window.show()?;
        window.set_focus()?;
    }
    Ok(())
}

fn handle_menu_event(app: &AppHandle, event: MenuEvent) {
    let id = event.id().as_ref();
    let res = match Message::from_id(id) {
        Some(Message::Quit) => {
            app.exit(0);
            Ok(())
        }
        Some(Message::Hide) => toggle_main_window(app),
        _ => {
            tracing::error!("Unknown menu item with id: {id}");
            Ok(())
        }
    };
    if let Err(e) = res {
        tracing::error!("Tray menu action failed: {e}");
    }
}

fn handle_tray_icon_event(tray: &TrayIcon, event: TrayIconEvent) {
    let app = tray.app_handle();
    let res = match event {
        TrayIconEvent::Click {
            button: MouseButton::Left,
            button_state: MouseButtonState::Up,
            ..
        } => toggle_main_window(app),
        // The menu opens on right click; label it for the current visibility first.
        TrayIconEvent::Click {
            button: MouseButton::Right,
            button_state: MouseButtonState::Down,
            ..
        } => retranslate(app),
        _ => Ok(()),
    };
    if let Err(e) = res {
        tracing::error!("Tray icon event failed: {e}");
    }
}

/// Hide the main window instead of closing it; tell the user once that the app keeps running.
pub fn handle_window_close(window: &Window) {
    if let Err(e) = window.hide() {
        tracing::error!("Failed to hide window {}: {e}", window.label());
    }

    let app = window.app_handle();
    // Hidden window, hidden dock icon.
    #[cfg(target_os = "macos")]
    if let Err(e) = app.set_activation_policy(tauri::ActivationPolicy::Accessory) {
        tracing::error!("Failed to set activation policy: {e}");
    }

    let (Some(state), Some(window_state)) = (app.try_state::<AppState>(), app.try_state::<WindowState>()) else {
        return;
    };
    if !window_state.take_first_close() {
        return;
    }
    let notice = Notification::new(state.translator.t(Message::RunningInBackground));
    if let Err(e) = state.capabilities.notify(&notice) {
        tracing::error!("Failed to show background notification: {e}");
    }
}
