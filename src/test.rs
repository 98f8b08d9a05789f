//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{TestSheet, TestSheetState};
use crate::Config;
use tempfile::TempDir;
use uuid::Uuid;

/// A home directory with a valid config and a random spreadsheet id, so that every test gets its
/// own `TestSheet` state. Holds the TempDir to keep the directory alive for the duration of the
/// test.
pub(crate) struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("expenses");
        let secret_path = temp_dir.path().join("client_secret.json");

        let secret_content = r#"{
            "installed": {
                "client_id": "test-client-id",
                "client_secret": "test-secret",
                "redirect_uris": ["http://localhost"],
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;
        std::fs::write(&secret_path, secret_content).unwrap();

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let sheet_url = format!("https://docs.google.com/spreadsheets/d/{rand}/edit");
        let config = Config::create(&root, &secret_path, &sheet_url)
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }

    /// Gets the current state of the TestSheet associated with this environment.
    pub(crate) fn get_state(&self) -> TestSheetState {
        TestSheet::new(self.config.spreadsheet_id()).get_state()
    }

    /// Sets the state of the TestSheet associated with this environment.
    pub(crate) fn set_state(&self, state: TestSheetState) {
        TestSheet::new(self.config.spreadsheet_id()).set_state(state)
    }
}

#[tokio::test]
async fn test_env_starts_with_seed_data() {
    let env = TestEnv::new().await;
    let titles: Vec<String> = env.get_state().tabs.into_iter().map(|(t, _)| t).collect();
    assert!(titles.contains(&"2024".to_string()));
    assert!(env.config().secrets().is_dir());
}
