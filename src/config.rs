use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "WALLE Health";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> String {
    "walle_health=info".to_string()
}

/// Get the application data directory
/// ~/WalleHealth/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("WalleHealth")
}

/// Path of the local companion database
pub fn database_path() -> PathBuf {
    app_data_dir().join("walle.db")
}
