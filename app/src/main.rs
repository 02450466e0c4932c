use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sqlboard_client::RestPanelApi;
use sqlboard_core::controller::FormController;
use sqlboard_core::history::QueryHistory;
use sqlboard_core::profiles::{FileProfilesStore, PanelProfile};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8081";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

/// Picks the backend profile: the one named by `SQLBOARD_PROFILE`, else the
/// first stored profile, else a local default.
fn resolve_profile(store: Option<&FileProfilesStore>) -> PanelProfile {
    if let Some(store) = store {
        if let Ok(name) = std::env::var("SQLBOARD_PROFILE") {
            if let Some(profile) = store.profile(&name) {
                return profile.clone();
            }
            warn!(profile = %name, "profile not found, falling back");
        }
        if let Some(profile) = store.profiles().first() {
            return profile.clone();
        }
    }
    PanelProfile::new("local", DEFAULT_BASE_URL)
}

fn run_app(
    run_tui: impl FnOnce(FormController<RestPanelApi>) -> Result<(), sqlboard_tui::TuiError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = match FileProfilesStore::load_default() {
        Ok(store) => Some(store),
        Err(error) => {
            warn!(error = %error, "failed to load profiles, using defaults");
            None
        }
    };
    let profile = resolve_profile(store.as_ref());

    let api = RestPanelApi::new(profile.base_url.clone());
    let mut controller = FormController::new(api, profile.role);
    match QueryHistory::load_default() {
        Ok(history) => controller = controller.with_history(history),
        Err(error) => warn!(error = %error, "query history disabled"),
    }

    run_tui(controller)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    run_app(sqlboard_tui::run)
}

#[cfg(test)]
mod tests {
    use std::io;

    use sqlboard_core::profiles::{FileProfilesStore, PanelProfile, Role};
    use tempfile::TempDir;

    use super::{resolve_profile, run_app, DEFAULT_BASE_URL};

    #[test]
    fn run_app_returns_ok_when_tui_runner_succeeds() {
        let result = run_app(|_controller| Ok(()));
        assert!(result.is_ok());
    }

    #[test]
    fn run_app_propagates_tui_errors() {
        let result = run_app(|_controller| {
            Err(sqlboard_tui::TuiError::Io(io::Error::other("boom")))
        });
        assert!(result.is_err());
    }

    #[test]
    fn missing_store_falls_back_to_the_local_default() {
        let profile = resolve_profile(None);
        assert_eq!(profile.base_url, DEFAULT_BASE_URL);
        assert_eq!(profile.role, Role::Master);
    }

    #[test]
    fn first_stored_profile_wins_without_an_explicit_name() {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_dir.path().join("profiles.toml");
        let mut store = FileProfilesStore::load_from_path(path).expect("load failed");
        let mut profile = PanelProfile::new("replica-panel", "http://10.0.0.2:8082");
        profile.role = Role::Replica;
        store.upsert_profile(profile);

        let resolved = resolve_profile(Some(&store));
        assert_eq!(resolved.name, "replica-panel");
        assert_eq!(resolved.role, Role::Replica);
    }
}
