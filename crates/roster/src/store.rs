//! List storage: the CRUD boundary for saved participant lists.
//!
//! [`ListStore`] is what the rest of the app talks to. Two implementations are
//! provided: [`MemoryStore`] for tests and one-off sessions, and [`RonStore`],
//! which keeps every list in a single RON file.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::ParticipantList;

/// Length of generated list ids.
const LIST_ID_LEN: usize = 20;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("list with id {0} not found")]
    NotFound(String),
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is malformed: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not encode store: {0}")]
    Encode(#[from] ron::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD operations on saved lists.
pub trait ListStore {
    /// All saved lists.
    fn lists(&self) -> StoreResult<Vec<ParticipantList>>;

    /// Fetch one list by id.
    fn load(&self, id: &str) -> StoreResult<ParticipantList>;

    /// Save a new list with zeroed counters and return its id.
    fn save(&mut self, name: &str, participants: &[String]) -> StoreResult<String>;

    /// Overwrite an existing list.
    fn update(&mut self, list: &ParticipantList) -> StoreResult<()>;

    fn delete(&mut self, id: &str) -> StoreResult<()>;

    /// Increment the selection counter of `participant` and return the updated list.
    fn mark_selected(&mut self, id: &str, participant: &str) -> StoreResult<ParticipantList> {
        let mut list = self.load(id)?;
        if !list.mark_selected(participant) {
            log::warn!("List {} has no participant named {:?}", id, participant);
        }
        self.update(&list)?;
        Ok(list)
    }

    /// Zero every counter in the list and return the updated list.
    fn reset_selections(&mut self, id: &str) -> StoreResult<ParticipantList> {
        let mut list = self.load(id)?;
        list.reset_selections();
        self.update(&list)?;
        log::info!("Reset selection counters for list {:?}", list.name);
        Ok(list)
    }
}

fn generate_id(rng: &mut StdRng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(LIST_ID_LEN)
        .map(char::from)
        .collect()
}

/// In-process store.
pub struct MemoryStore {
    lists: BTreeMap<String, ParticipantList>,
    rng: StdRng,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            lists: BTreeMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic ids, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            lists: BTreeMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ListStore for MemoryStore {
    fn lists(&self) -> StoreResult<Vec<ParticipantList>> {
        Ok(self.lists.values().cloned().collect())
    }

    fn load(&self, id: &str) -> StoreResult<ParticipantList> {
        self.lists
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save(&mut self, name: &str, participants: &[String]) -> StoreResult<String> {
        let id = generate_id(&mut self.rng);
        self.lists
            .insert(id.clone(), ParticipantList::new(id.clone(), name, participants));
        Ok(id)
    }

    fn update(&mut self, list: &ParticipantList) -> StoreResult<()> {
        match self.lists.get_mut(&list.id) {
            Some(slot) => {
                *slot = list.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(list.id.clone())),
        }
    }

    fn delete(&mut self, id: &str) -> StoreResult<()> {
        self.lists
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// File-backed store: every list lives in one RON document.
///
/// Each operation reads the file, applies the change and writes it back, so
/// the file is always the source of truth. A missing file is an empty store.
pub struct RonStore {
    path: PathBuf,
    rng: StdRng,
}

impl RonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StoreResult<BTreeMap<String, ParticipantList>> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(ron::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, lists: &BTreeMap<String, ParticipantList>) -> StoreResult<()> {
        let s = ron::ser::to_string_pretty(lists, ron::ser::PrettyConfig::default())?;
        std::fs::write(&self.path, s)?;
        Ok(())
    }
}

impl ListStore for RonStore {
    fn lists(&self) -> StoreResult<Vec<ParticipantList>> {
        Ok(self.read_all()?.into_values().collect())
    }

    fn load(&self, id: &str) -> StoreResult<ParticipantList> {
        self.read_all()?
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save(&mut self, name: &str, participants: &[String]) -> StoreResult<String> {
        let mut all = self.read_all()?;
        let id = generate_id(&mut self.rng);
        all.insert(id.clone(), ParticipantList::new(id.clone(), name, participants));
        self.write_all(&all)?;
        log::debug!("Saved list {:?} as {} to {:?}", name, id, self.path);
        Ok(id)
    }

    fn update(&mut self, list: &ParticipantList) -> StoreResult<()> {
        let mut all = self.read_all()?;
        match all.get_mut(&list.id) {
            Some(slot) => *slot = list.clone(),
            None => return Err(StoreError::NotFound(list.id.clone())),
        }
        self.write_all(&all)
    }

    fn delete(&mut self, id: &str) -> StoreResult<()> {
        let mut all = self.read_all()?;
        if all.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.write_all(&all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{eligible, SELECTION_LIMIT};

    fn names() -> Vec<String> {
        ["Ana", "Beto", "Cara"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn memory_store_first_selection_counts_once() {
        let mut store = MemoryStore::with_seed(7);
        let id = store.save("Friday", &names()).unwrap();
        let list = store.load(&id).unwrap();
        assert_eq!(eligible(&list).len(), 3);

        let list = store.mark_selected(&id, "Beto").unwrap();
        assert_eq!(list.participant("Beto").unwrap().times_selected, 1);
        assert_eq!(store.load(&id).unwrap().participant("Beto").unwrap().times_selected, 1);
    }

    #[test]
    fn memory_store_exhausted_list_resets_to_full_eligibility() {
        let mut store = MemoryStore::with_seed(7);
        let id = store.save("Friday", &names()).unwrap();
        for name in names() {
            for _ in 0..SELECTION_LIMIT {
                store.mark_selected(&id, &name).unwrap();
            }
        }
        assert!(eligible(&store.load(&id).unwrap()).is_empty());

        let list = store.reset_selections(&id).unwrap();
        assert!(list.participants.iter().all(|p| p.times_selected == 0));
        assert_eq!(eligible(&list).len(), 3);
    }

    #[test]
    fn memory_store_unknown_id_is_not_found() {
        let mut store = MemoryStore::with_seed(1);
        assert!(matches!(store.load("missing"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.mark_selected("missing", "Ana"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("missing"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn memory_store_generates_distinct_ids() {
        let mut store = MemoryStore::with_seed(3);
        let a = store.save("a", &names()).unwrap();
        let b = store.save("b", &names()).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), LIST_ID_LEN);
        assert_eq!(store.lists().unwrap().len(), 2);
    }

    #[test]
    fn ron_store_persists_between_instances() {
        let path = std::env::temp_dir().join(format!(
            "roster-store-test-{}-{}.ron",
            std::process::id(),
            rand::random::<u32>()
        ));
        let id = {
            let mut store = RonStore::new(&path);
            let id = store.save("Friday", &names()).unwrap();
            store.mark_selected(&id, "Cara").unwrap();
            id
        };
        let store = RonStore::new(&path);
        let list = store.load(&id).unwrap();
        assert_eq!(list.name, "Friday");
        assert_eq!(list.participant("Cara").unwrap().times_selected, 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn ron_store_missing_file_is_empty() {
        let path = std::env::temp_dir().join(format!(
            "roster-store-missing-{}-{}.ron",
            std::process::id(),
            rand::random::<u32>()
        ));
        let store = RonStore::new(&path);
        assert!(store.lists().unwrap().is_empty());
    }
}
