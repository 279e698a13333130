fn main() {
    // The desktop shell needs the Tauri context (tauri.conf.json, icons,
    // capabilities); the headless library builds without it.
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
