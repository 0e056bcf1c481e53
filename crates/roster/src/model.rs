//! Participant lists and selection counters.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A participant stops being eligible once selected this many times.
pub const SELECTION_LIMIT: u32 = 4;

/// One named participant and how often they have been drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub times_selected: u32,
    #[serde(default)]
    pub last_selected: Option<SystemTime>,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            times_selected: 0,
            last_selected: None,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.times_selected < SELECTION_LIMIT
    }
}

/// A saved, named list of participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantList {
    pub id: String,
    pub name: String,
    pub participants: Vec<Participant>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl ParticipantList {
    /// Build a fresh list with every counter at zero.
    pub fn new(id: impl Into<String>, name: impl Into<String>, names: &[String]) -> Self {
        let now = SystemTime::now();
        Self {
            id: id.into(),
            name: name.into(),
            participants: names.iter().map(Participant::new).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Participant names in list order.
    pub fn names(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.name.clone()).collect()
    }

    pub fn participant(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name == name)
    }

    /// Bump the counter of `name`. Returns false if no such participant.
    pub fn mark_selected(&mut self, name: &str) -> bool {
        let now = SystemTime::now();
        let Some(p) = self.participants.iter_mut().find(|p| p.name == name) else {
            return false;
        };
        p.times_selected += 1;
        p.last_selected = Some(now);
        self.updated_at = now;
        true
    }

    /// Zero every counter.
    pub fn reset_selections(&mut self) {
        for p in &mut self.participants {
            p.times_selected = 0;
            p.last_selected = None;
        }
        self.updated_at = SystemTime::now();
    }
}

/// Participants that can still be drawn.
pub fn eligible(list: &ParticipantList) -> Vec<&Participant> {
    list.participants.iter().filter(|p| p.is_eligible()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParticipantList {
        let names = vec!["Ana".to_string(), "Beto".to_string(), "Cara".to_string()];
        ParticipantList::new("list-1", "Friday", &names)
    }

    #[test]
    fn eligible_includes_everyone_below_limit() {
        let mut list = sample();
        assert_eq!(eligible(&list).len(), 3);
        for _ in 0..SELECTION_LIMIT - 1 {
            list.mark_selected("Beto");
        }
        assert_eq!(eligible(&list).len(), 3);
        list.mark_selected("Beto");
        let names: Vec<_> = eligible(&list).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Cara"]);
    }

    #[test]
    fn mark_selected_unknown_name_is_noop() {
        let mut list = sample();
        assert!(!list.mark_selected("Zed"));
        assert!(list.participants.iter().all(|p| p.times_selected == 0));
    }

    #[test]
    fn reset_selections_clears_counters_and_timestamps() {
        let mut list = sample();
        list.mark_selected("Ana");
        assert!(list.participant("Ana").and_then(|p| p.last_selected).is_some());
        list.reset_selections();
        assert!(list
            .participants
            .iter()
            .all(|p| p.times_selected == 0 && p.last_selected.is_none()));
    }
}
