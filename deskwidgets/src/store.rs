//! The persisted widget collection: one JSON array, rewritten in full on
//! every save.

use deskcore::storage;
use std::path::{Path, PathBuf};

use crate::state::WidgetState;

pub const STORE_FILE_NAME: &str = "widgets_config.json";

#[derive(Debug, Clone)]
pub struct WidgetStore {
    path: PathBuf,
}

impl WidgetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in file order.
    pub fn load(&self) -> storage::Result<Vec<WidgetState>> {
        let states: Vec<WidgetState> = storage::load_json(&self.path)?;
        tracing::debug!(path = %self.path.display(), count = states.len(), "loaded widget states");
        Ok(states)
    }

    /// Overwrite the file with `states`.
    pub fn save(&self, states: &[WidgetState]) -> storage::Result<()> {
        storage::save_json(&self.path, states)?;
        tracing::debug!(path = %self.path.display(), count = states.len(), "saved widget states");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DisplayMode;
    use deskcore::storage::StorageError;

    #[test]
    fn save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = WidgetStore::new(dir.path().join(STORE_FILE_NAME));
        let states = vec![
            WidgetState { display_mode: DisplayMode::Quote, ..Default::default() },
            WidgetState { note_text: "second".into(), ..Default::default() },
            WidgetState { countdown_seconds: 99, reminders: vec!["x".into()], ..Default::default() },
        ];
        store.save(&states).unwrap();
        assert_eq!(store.load().unwrap(), states);
    }

    #[test]
    fn missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = WidgetStore::new(dir.path().join("nope.json"));
        assert!(!store.path().exists());
        assert!(matches!(store.load(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn record_without_reminders_loads_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        std::fs::write(
            &path,
            r#"[{"display_mode": "countdown", "note_text": "", "countdown_seconds": 10}]"#,
        )
        .unwrap();
        let states = WidgetStore::new(&path).load().unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].countdown_seconds, 10);
        assert!(states[0].reminders.is_empty());
    }

    #[test]
    fn file_is_a_json_array_of_flat_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = WidgetStore::new(dir.path().join(STORE_FILE_NAME));
        store.save(&[WidgetState::default()]).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!([{
                "display_mode": "time",
                "note_text": "",
                "countdown_seconds": 0,
                "reminders": [],
            }])
        );
    }
}
