//! Manager: owns every live overlay and the persisted collection
//!
//! Overlays are keyed by a `WidgetId` that is never reused, in an ordered map
//! so iteration (and therefore the saved file) follows creation order.

use deskcore::safety::catch_panic;
use deskcore::storage::StorageError;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::overlay::OverlayWidget;
use crate::state::WidgetState;
use crate::store::WidgetStore;

/// Stable handle for an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("no widget with id {0}")]
    NoSuchWidget(WidgetId),
    #[error("widget {id} failed to close: {message}")]
    Teardown { id: WidgetId, message: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ManagerError {
    /// Missing persisted file: worth a warning, nothing more.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ManagerError::Storage(StorageError::NotFound(_)))
    }
}

pub struct Manager {
    widgets: BTreeMap<WidgetId, OverlayWidget>,
    next_id: u64,
    store: WidgetStore,
    /// Set when the persisted file could not be read. The file may still
    /// hold widgets that never made it into the collection, so exit leaves
    /// it alone until a load or an explicit save succeeds.
    load_failed: bool,
}

impl Manager {
    pub fn new(store: WidgetStore) -> Self {
        Self {
            widgets: BTreeMap::new(),
            next_id: 1,
            store,
            load_failed: false,
        }
    }

    pub fn store(&self) -> &WidgetStore {
        &self.store
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.widgets.keys().copied().collect()
    }

    pub fn get(&self, id: WidgetId) -> Option<&OverlayWidget> {
        self.widgets.get(&id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut OverlayWidget> {
        self.widgets.get_mut(&id)
    }

    pub fn widgets(&self) -> impl Iterator<Item = &OverlayWidget> {
        self.widgets.values()
    }

    pub fn widgets_mut(&mut self) -> impl Iterator<Item = &mut OverlayWidget> {
        self.widgets.values_mut()
    }

    /// Add an overlay, with default state unless `initial` is given.
    pub fn create_widget(&mut self, initial: Option<WidgetState>) -> WidgetId {
        self.create_widget_at(initial, Instant::now())
    }

    pub fn create_widget_at(&mut self, initial: Option<WidgetState>, now: Instant) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        let widget = OverlayWidget::new(id, initial.unwrap_or_default(), now);
        self.widgets.insert(id, widget);
        tracing::info!(widget = %id, total = self.widgets.len(), "widget created");
        id
    }

    /// Remove and tear down one overlay. The widget leaves the collection
    /// even if its teardown panics.
    pub fn destroy_widget(&mut self, id: WidgetId) -> Result<(), ManagerError> {
        let mut widget = self.widgets.remove(&id).ok_or(ManagerError::NoSuchWidget(id))?;
        catch_panic(|| widget.destroy()).map_err(|message| ManagerError::Teardown { id, message })?;
        tracing::info!(widget = %id, total = self.widgets.len(), "widget destroyed");
        Ok(())
    }

    /// Tear down every overlay. Returns how many there were.
    pub fn clear_all(&mut self) -> usize {
        let widgets = std::mem::take(&mut self.widgets);
        let count = widgets.len();
        for (id, mut widget) in widgets {
            if let Err(message) = catch_panic(|| widget.destroy()) {
                tracing::warn!(widget = %id, %message, "teardown failed during clear");
            }
        }
        tracing::info!(count, "all widgets cleared");
        count
    }

    /// Snapshot of every overlay's state, in collection order.
    pub fn export_states(&self) -> Vec<WidgetState> {
        self.widgets.values().map(OverlayWidget::export_state).collect()
    }

    /// Reminders of every overlay, in collection order.
    pub fn all_reminders(&self) -> Vec<String> {
        self.widgets
            .values()
            .flat_map(|w| w.state().reminders.iter().cloned())
            .collect()
    }

    /// Overwrite the persisted file with the whole collection.
    pub fn save_all(&mut self) -> Result<usize, ManagerError> {
        let states = self.export_states();
        self.store.save(&states)?;
        self.load_failed = false;
        tracing::info!(count = states.len(), path = %self.store.path().display(), "widgets saved");
        Ok(states.len())
    }

    /// Append one overlay per persisted record, in file order.
    pub fn load_all(&mut self) -> Result<usize, ManagerError> {
        let states = match self.store.load() {
            Ok(states) => states,
            Err(e @ StorageError::NotFound(_)) => return Err(e.into()),
            Err(e) => {
                self.load_failed = true;
                return Err(e.into());
            }
        };
        self.load_failed = false;
        let count = states.len();
        let now = Instant::now();
        for state in states {
            self.create_widget_at(Some(state), now);
        }
        tracing::info!(count, path = %self.store.path().display(), "widgets loaded");
        Ok(count)
    }

    /// Startup restore: a missing file just means a first run.
    pub fn load_at_startup(&mut self) -> Result<usize, ManagerError> {
        match self.load_all() {
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %self.store.path().display(), "no saved widgets yet");
                Ok(0)
            }
            other => other,
        }
    }

    /// Persist everything before the process exits. Skipped while the file
    /// on disk is one that failed to load.
    pub fn on_close(&mut self) -> Result<usize, ManagerError> {
        if self.load_failed {
            tracing::warn!(path = %self.store.path().display(), "saved file failed to load, leaving it untouched on exit");
            return Ok(0);
        }
        tracing::info!("saving widgets before exit");
        self.save_all()
    }

    /// Run due refresh ticks on every overlay. Returns how long until the
    /// next one is due.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        self.widgets
            .values_mut()
            .filter_map(|w| {
                w.poll(now);
                w.time_until_refresh(now)
            })
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DisplayMode;
    use crate::store::STORE_FILE_NAME;

    fn manager_in(dir: &tempfile::TempDir) -> Manager {
        Manager::new(WidgetStore::new(dir.path().join(STORE_FILE_NAME)))
    }

    #[test]
    fn ids_are_never_reused() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let a = m.create_widget(None);
        m.destroy_widget(a).unwrap();
        let b = m.create_widget(None);
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn create_defaults_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let id = m.create_widget(None);
        assert_eq!(m.get(id).unwrap().export_state(), WidgetState::default());
    }

    #[test]
    fn destroy_unknown_is_error_and_keeps_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let id = m.create_widget(None);
        let err = m.destroy_widget(WidgetId::new(99)).unwrap_err();
        assert!(matches!(err, ManagerError::NoSuchWidget(missing) if missing == WidgetId::new(99)));
        assert_eq!(m.ids(), vec![id]);

        m.destroy_widget(id).unwrap();
        assert!(matches!(m.destroy_widget(id), Err(ManagerError::NoSuchWidget(_))));
    }

    #[test]
    fn clear_all_empties_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        m.create_widget(None);
        m.create_widget(None);
        assert_eq!(m.clear_all(), 2);
        assert!(m.is_empty());
    }

    #[test]
    fn save_then_load_round_trips_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let states = vec![
            WidgetState { display_mode: DisplayMode::Calendar, ..Default::default() },
            WidgetState { note_text: "remember".into(), display_mode: DisplayMode::Note, ..Default::default() },
            WidgetState { reminders: vec!["a".into(), "b".into()], ..Default::default() },
        ];
        for s in &states {
            m.create_widget(Some(s.clone()));
        }
        assert_eq!(m.save_all().unwrap(), 3);

        let mut fresh = manager_in(&dir);
        assert_eq!(fresh.load_all().unwrap(), 3);
        assert_eq!(fresh.export_states(), states);
    }

    #[test]
    fn countdown_survives_save_destroy_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let first = m.create_widget(None);
        let second = m.create_widget(None);
        m.get_mut(second).unwrap().set_countdown(10);
        m.save_all().unwrap();
        m.destroy_widget(first).unwrap();
        m.destroy_widget(second).unwrap();
        assert!(m.is_empty());

        m.load_all().unwrap();
        assert_eq!(m.len(), 2);
        let countdowns: Vec<u32> = m.widgets().map(|w| w.state().countdown_seconds).collect();
        assert_eq!(countdowns, vec![0, 10]);
    }

    #[test]
    fn load_appends_to_existing() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        m.create_widget(None);
        m.save_all().unwrap();
        m.load_all().unwrap();
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn load_without_file_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let err = m.load_all().unwrap_err();
        assert!(err.is_not_found());
        assert!(m.is_empty());
        assert_eq!(m.load_at_startup().unwrap(), 0);
    }

    #[test]
    fn corrupt_file_is_not_silenced_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        std::fs::write(m.store().path(), "not json").unwrap();
        let err = m.load_at_startup().unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn unreadable_file_survives_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let original = r#"[{"display_mode":"note","note_text":"keep me"},{"countdown_seconds":-1}]"#;
        std::fs::write(m.store().path(), original).unwrap();

        assert!(m.load_at_startup().is_err());
        assert!(m.load_failed());
        m.create_widget(None);
        assert_eq!(m.on_close().unwrap(), 0);
        assert_eq!(std::fs::read_to_string(m.store().path()).unwrap(), original);
    }

    #[test]
    fn explicit_save_clears_failed_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        std::fs::write(m.store().path(), "not json").unwrap();
        assert!(m.load_all().is_err());

        m.create_widget(None);
        assert_eq!(m.save_all().unwrap(), 1);
        assert!(!m.load_failed());
        assert_eq!(m.on_close().unwrap(), 1);
        assert_eq!(m.store().load().unwrap().len(), 1);
    }

    #[test]
    fn on_close_persists_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let id = m.create_widget(None);
        m.get_mut(id).unwrap().add_reminder("buy milk");
        m.on_close().unwrap();
        let saved = m.store().load().unwrap();
        assert_eq!(saved[0].reminders, vec!["buy milk".to_string()]);
    }

    #[test]
    fn all_reminders_follow_collection_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let a = m.create_widget(None);
        let b = m.create_widget(None);
        m.get_mut(b).unwrap().add_reminder("second");
        m.get_mut(a).unwrap().add_reminder("first");
        assert_eq!(m.all_reminders(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn tick_advances_every_widget() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        let t0 = Instant::now();
        let a = m.create_widget_at(Some(WidgetState { countdown_seconds: 5, ..Default::default() }), t0);
        let b = m.create_widget_at(Some(WidgetState { countdown_seconds: 1, ..Default::default() }), t0);
        let next = m.tick(t0 + Duration::from_millis(2500));
        assert_eq!(next, Some(Duration::from_millis(500)));
        assert_eq!(m.get(a).unwrap().state().countdown_seconds, 3);
        assert_eq!(m.get(b).unwrap().state().countdown_seconds, 0);
    }

    #[test]
    fn tick_on_empty_manager_schedules_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager_in(&dir);
        assert_eq!(m.tick(Instant::now()), None);
    }
}
