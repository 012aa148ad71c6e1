use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{Followup, Lead, Profile, ProfilePatch, Project};

use super::error::StoreError;
use super::storage::Storage;

/// Storage keys. Stable across versions; renaming one silently orphans data.
pub const KEY_LEADS: &str = "leads";
pub const KEY_PROJECTS: &str = "projects";
pub const KEY_PROFILE: &str = "profile";

/// Owns the three persisted collections. All mutation goes through the
/// upsert/delete/append operations here; callers only ever see borrowed
/// views. Every mutating operation rewrites the affected collection's blob
/// before returning.
pub struct Store {
    storage: Box<dyn Storage>,
    leads: Vec<Lead>,
    projects: Vec<Project>,
    profile: Profile,
}

impl Store {
    /// Load all collections from storage. Missing or corrupt blobs fall back
    /// to an empty collection (leads/projects) or the default profile; this
    /// never fails. Legacy-shaped records are migrated and written back once.
    pub fn open(storage: impl Storage + 'static) -> Self {
        let storage: Box<dyn Storage> = Box::new(storage);
        let leads: Vec<Lead> = read_collection(storage.as_ref(), KEY_LEADS);
        let projects: Vec<Project> = read_collection(storage.as_ref(), KEY_PROJECTS);
        let profile = match storage.read(KEY_PROFILE) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                warn!(error = %e, "corrupt profile blob, using defaults");
                Profile::default()
            }),
            Ok(None) => Profile::default(),
            Err(e) => {
                warn!(error = %e, "storage unreadable, using default profile");
                Profile::default()
            }
        };

        let mut store = Self {
            storage,
            leads,
            projects,
            profile,
        };
        let migrated = store.migrate();
        store.sort_collections();
        if migrated {
            // Best effort; open itself never raises.
            if let Err(e) = store.persist_leads().and_then(|_| store.persist_projects()) {
                warn!(error = %e, "could not persist migrated collections");
            }
        }
        store
    }

    /// One-time migration of legacy stored shapes: records saved by the old
    /// app have no id (they were keyed by array position, newest first) and
    /// leads carried a flat `notes` string instead of a follow-up log.
    fn migrate(&mut self) -> bool {
        let mut changed = false;
        let mut next = Utc::now().timestamp_millis();

        // Stored order was newest-first, so assign descending ids to keep it.
        for lead in &mut self.leads {
            if lead.id == 0 {
                lead.id = next;
                next -= 1;
                changed = true;
            }
            if let Some(notes) = lead.notes.take() {
                if !notes.trim().is_empty() && lead.followups.is_empty() {
                    let at = if lead.created_at.is_empty() {
                        Utc::now().to_rfc3339()
                    } else {
                        lead.created_at.clone()
                    };
                    lead.followups.push(Followup { note: notes, at });
                }
                changed = true;
            }
        }
        for project in &mut self.projects {
            if project.id == 0 {
                project.id = next;
                next -= 1;
                changed = true;
            }
        }
        if changed {
            debug!("migrated legacy record shapes");
        }
        changed
    }

    fn sort_collections(&mut self) {
        self.leads.sort_by_key(|l| std::cmp::Reverse(l.id));
        self.projects.sort_by_key(|p| std::cmp::Reverse(p.id));
    }

    fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let max = self
            .leads
            .iter()
            .map(|l| l.id)
            .chain(self.projects.iter().map(|p| p.id))
            .max()
            .unwrap_or(0);
        if now > max {
            now
        } else {
            max + 1
        }
    }

    // ===== Leads =====

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    /// Leads matching `filter` (case-insensitive over name, phone and
    /// location; empty matches all), newest id first. Lazy and restartable.
    pub fn list_leads<'a>(&'a self, filter: &'a str) -> impl Iterator<Item = &'a Lead> + 'a {
        self.leads.iter().filter(move |l| l.matches_filter(filter))
    }

    /// Leads whose next-follow-up timestamp is at or before `as_of`,
    /// ascending by that timestamp.
    pub fn followups_due(&self, as_of: &str) -> Vec<&Lead> {
        let mut due: Vec<&Lead> = self.leads.iter().filter(|l| l.is_due(as_of)).collect();
        due.sort_by(|a, b| a.next_follow.cmp(&b.next_follow));
        due
    }

    /// Insert or replace a lead. A lead with id 0 is new and gets a fresh
    /// identifier (becoming the newest); an existing id is replaced in place.
    /// Returns the lead's id.
    pub fn upsert_lead(&mut self, mut lead: Lead) -> Result<i64, StoreError> {
        if lead.name.trim().is_empty() {
            return Err(StoreError::Validation("name"));
        }
        if lead.phone.trim().is_empty() {
            return Err(StoreError::Validation("phone"));
        }
        if lead.created_at.is_empty() {
            lead.created_at = Utc::now().to_rfc3339();
        }
        if lead.id == 0 {
            lead.id = self.next_id();
        }
        let id = lead.id;
        match self.leads.iter_mut().find(|l| l.id == id) {
            Some(existing) => *existing = lead,
            None => self.leads.insert(0, lead),
        }
        self.sort_collections();
        self.persist_leads()?;
        Ok(id)
    }

    /// Remove a lead by id. Deleting an unknown id is a no-op, not an error.
    pub fn delete_lead(&mut self, id: i64) -> Result<bool, StoreError> {
        let before = self.leads.len();
        self.leads.retain(|l| l.id != id);
        if self.leads.len() == before {
            return Ok(false);
        }
        self.persist_leads()?;
        Ok(true)
    }

    /// Prepend a follow-up note to a lead's log and point its next-action
    /// timestamp at it (last write wins).
    pub fn append_followup(&mut self, id: i64, note: &str, at: &str) -> Result<(), StoreError> {
        if note.trim().is_empty() {
            return Err(StoreError::Validation("note"));
        }
        if at.trim().is_empty() {
            return Err(StoreError::Validation("timestamp"));
        }
        let lead = self
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::UnknownId(id))?;
        lead.followups.insert(
            0,
            Followup {
                note: note.to_string(),
                at: at.to_string(),
            },
        );
        lead.next_follow = Some(at.to_string());
        self.persist_leads()
    }

    // ===== Projects =====

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn upsert_project(&mut self, mut project: Project) -> Result<i64, StoreError> {
        if project.name.trim().is_empty() {
            return Err(StoreError::Validation("name"));
        }
        if project.location.trim().is_empty() {
            return Err(StoreError::Validation("location"));
        }
        if project.id == 0 {
            project.id = self.next_id();
        }
        let id = project.id;
        match self.projects.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = project,
            None => self.projects.insert(0, project),
        }
        self.sort_collections();
        self.persist_projects()?;
        Ok(id)
    }

    pub fn delete_project(&mut self, id: i64) -> Result<bool, StoreError> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return Ok(false);
        }
        self.persist_projects()?;
        Ok(true)
    }

    // ===== Profile =====

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Merge supplied fields into the singleton profile; unsupplied fields
    /// keep their prior values.
    pub fn save_profile(&mut self, patch: ProfilePatch) -> Result<(), StoreError> {
        self.profile.apply(patch);
        self.persist_profile()
    }

    // ===== Restore =====

    /// Replace/merge collections from a backup. Arrays replace wholesale,
    /// the profile merges field-wise. Imported records go through the same
    /// legacy migration as loaded ones.
    pub fn restore(
        &mut self,
        leads: Option<Vec<Lead>>,
        projects: Option<Vec<Project>>,
        profile: Option<ProfilePatch>,
    ) -> Result<(), StoreError> {
        if let Some(leads) = leads {
            self.leads = leads;
        }
        if let Some(projects) = projects {
            self.projects = projects;
        }
        if let Some(patch) = profile {
            self.profile.apply(patch);
        }
        self.migrate();
        self.sort_collections();
        self.persist_leads()?;
        self.persist_projects()?;
        self.persist_profile()
    }

    // ===== Persistence =====

    fn persist_leads(&mut self) -> Result<(), StoreError> {
        let blob = serde_json::to_string_pretty(&self.leads)?;
        self.storage
            .write(KEY_LEADS, &blob)
            .map_err(StoreError::Storage)?;
        debug!(count = self.leads.len(), "persisted leads");
        Ok(())
    }

    fn persist_projects(&mut self) -> Result<(), StoreError> {
        let blob = serde_json::to_string_pretty(&self.projects)?;
        self.storage
            .write(KEY_PROJECTS, &blob)
            .map_err(StoreError::Storage)?;
        debug!(count = self.projects.len(), "persisted projects");
        Ok(())
    }

    fn persist_profile(&mut self) -> Result<(), StoreError> {
        let blob = serde_json::to_string_pretty(&self.profile)?;
        self.storage
            .write(KEY_PROFILE, &blob)
            .map_err(StoreError::Storage)
    }
}

fn read_collection<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Vec<T> {
    match storage.read(key) {
        Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
            warn!(key, error = %e, "corrupt collection blob, starting empty");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "storage unreadable, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::storage::{FileStorage, MemoryStorage};
    use tempfile::TempDir;

    fn lead(name: &str, phone: &str) -> Lead {
        Lead {
            name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_upsert_rejects_empty_name_and_phone() {
        let mut store = Store::open(MemoryStorage::new());
        assert!(matches!(
            store.upsert_lead(lead("", "123")),
            Err(StoreError::Validation("name"))
        ));
        assert!(matches!(
            store.upsert_lead(lead("Asha", "  ")),
            Err(StoreError::Validation("phone"))
        ));
        assert!(store.leads().is_empty());
    }

    #[test]
    fn test_upsert_assigns_ids_and_orders_newest_first() {
        let mut store = Store::open(MemoryStorage::new());
        let a = store.upsert_lead(lead("A", "1")).unwrap();
        let b = store.upsert_lead(lead("B", "2")).unwrap();
        let c = store.upsert_lead(lead("C", "3")).unwrap();
        assert!(a < b && b < c);
        let ids: Vec<i64> = store.list_leads("").map(|l| l.id).collect();
        assert_eq!(ids, vec![c, b, a]);
    }

    #[test]
    fn test_upsert_existing_replaces_in_place() {
        let mut store = Store::open(MemoryStorage::new());
        let a = store.upsert_lead(lead("A", "1")).unwrap();
        let b = store.upsert_lead(lead("B", "2")).unwrap();
        let mut edited = lead("A edited", "1");
        edited.id = a;
        store.upsert_lead(edited).unwrap();
        let ids: Vec<i64> = store.list_leads("").map(|l| l.id).collect();
        assert_eq!(ids, vec![b, a]);
        assert_eq!(store.leads()[1].name, "A edited");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = Store::open(MemoryStorage::new());
        let a = store.upsert_lead(lead("A", "1")).unwrap();
        assert!(store.delete_lead(a).unwrap());
        assert!(!store.delete_lead(a).unwrap());
        assert!(!store.delete_lead(999).unwrap());
        assert!(store.leads().is_empty());
    }

    #[test]
    fn test_list_reflects_upsert_delete_sequence() {
        let mut store = Store::open(MemoryStorage::new());
        let a = store.upsert_lead(lead("A", "1")).unwrap();
        let b = store.upsert_lead(lead("B", "2")).unwrap();
        let c = store.upsert_lead(lead("C", "3")).unwrap();
        store.delete_lead(b).unwrap();
        let d = store.upsert_lead(lead("D", "4")).unwrap();
        store.delete_lead(b).unwrap(); // repeat delete changes nothing
        let ids: Vec<i64> = store.list_leads("").map(|l| l.id).collect();
        assert_eq!(ids, vec![d, c, a]);
    }

    #[test]
    fn test_list_leads_filters() {
        let mut store = Store::open(MemoryStorage::new());
        let mut a = lead("Asha", "9876");
        a.location = Some("HSR Layout".to_string());
        store.upsert_lead(a).unwrap();
        store.upsert_lead(lead("Ravi", "5544")).unwrap();
        assert_eq!(store.list_leads("hsr").count(), 1);
        assert_eq!(store.list_leads("ravi").count(), 1);
        assert_eq!(store.list_leads("").count(), 2);
        assert_eq!(store.list_leads("nobody").count(), 0);
        // Restartable: same call yields the same sequence again
        assert_eq!(store.list_leads("").count(), 2);
    }

    #[test]
    fn test_followups_due_set_and_order() {
        let mut store = Store::open(MemoryStorage::new());
        let mut a = lead("A", "1");
        a.next_follow = Some("2024-03-05".to_string());
        let mut b = lead("B", "2");
        b.next_follow = Some("2024-03-01".to_string());
        let mut c = lead("C", "3");
        c.next_follow = Some("2024-03-20".to_string());
        let d = lead("D", "4"); // no follow-up set
        for l in [a, b, c, d] {
            store.upsert_lead(l).unwrap();
        }
        let due: Vec<&str> = store
            .followups_due("2024-03-10")
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(due, vec!["B", "A"]);
    }

    #[test]
    fn test_append_followup_sets_next_action() {
        let mut store = Store::open(MemoryStorage::new());
        let id = store.upsert_lead(lead("A", "1")).unwrap();
        store
            .append_followup(id, "Called client", "2024-01-10T10:00")
            .unwrap();
        let l = &store.leads()[0];
        assert_eq!(l.followups.len(), 1);
        assert_eq!(l.followups[0].note, "Called client");
        assert_eq!(l.next_follow.as_deref(), Some("2024-01-10T10:00"));

        // A later append overwrites the next-action pointer
        store
            .append_followup(id, "Site visit booked", "2024-02-01T09:00")
            .unwrap();
        let l = &store.leads()[0];
        assert_eq!(l.followups.len(), 2);
        assert_eq!(l.followups[0].note, "Site visit booked");
        assert_eq!(l.next_follow.as_deref(), Some("2024-02-01T09:00"));
    }

    #[test]
    fn test_append_followup_requires_note_and_timestamp() {
        let mut store = Store::open(MemoryStorage::new());
        let id = store.upsert_lead(lead("A", "1")).unwrap();
        assert!(store.append_followup(id, "", "2024-01-10").is_err());
        assert!(store.append_followup(id, "note", " ").is_err());
        assert!(matches!(
            store.append_followup(42, "note", "2024-01-10"),
            Err(StoreError::UnknownId(42))
        ));
        assert!(store.leads()[0].followups.is_empty());
    }

    #[test]
    fn test_project_requires_name_and_location() {
        let mut store = Store::open(MemoryStorage::new());
        let p = Project {
            name: "Green Meadows".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            store.upsert_project(p),
            Err(StoreError::Validation("location"))
        ));
        assert!(store.projects().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        let id = {
            let mut store = Store::open(FileStorage::new(path.clone()).unwrap());
            store.upsert_lead(lead("Asha", "9876")).unwrap()
        };
        let store = Store::open(FileStorage::new(path).unwrap());
        assert_eq!(store.leads().len(), 1);
        assert_eq!(store.leads()[0].id, id);
        assert_eq!(store.leads()[0].name, "Asha");
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let storage = MemoryStorage::with_blob(KEY_LEADS, "{not json");
        let store = Store::open(storage);
        assert!(store.leads().is_empty());
    }

    #[test]
    fn test_legacy_leads_migrate_on_load() {
        let legacy = r#"[{
            "name": "Ravi",
            "phone": "99880",
            "ptype": "Residential",
            "config": "3 BHK",
            "fdate": "2024-02-01",
            "notes": "asked for brochure",
            "createdAt": "2024-01-15T08:30:00.000Z"
        }]"#;
        let store = Store::open(MemoryStorage::with_blob(KEY_LEADS, legacy));
        let l = &store.leads()[0];
        assert!(l.id != 0);
        assert_eq!(l.segment.as_deref(), Some("Residential"));
        assert_eq!(l.followups.len(), 1);
        assert_eq!(l.followups[0].note, "asked for brochure");
        assert_eq!(l.followups[0].at, "2024-01-15T08:30:00.000Z");
        assert_eq!(l.next_follow.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn test_legacy_order_preserved_by_assigned_ids() {
        // Legacy arrays were stored newest-first
        let legacy = r#"[{"name":"Newest","phone":"1"},{"name":"Older","phone":"2"}]"#;
        let store = Store::open(MemoryStorage::with_blob(KEY_LEADS, legacy));
        let names: Vec<&str> = store.list_leads("").map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Newest", "Older"]);
    }

    #[test]
    fn test_save_profile_merges() {
        let mut store = Store::open(MemoryStorage::new());
        store
            .save_profile(ProfilePatch {
                business_name: Some("Vamika Estate".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.profile().business_name, "Vamika Estate");
        assert_eq!(store.profile().accent, "#3B82F6");
    }

    struct FailingStorage;

    impl crate::store::storage::Storage for FailingStorage {
        fn read(&self, _key: &str) -> std::io::Result<Option<String>> {
            Ok(None)
        }
        fn write(&mut self, _key: &str, _value: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            ))
        }
    }

    #[test]
    fn test_persist_failure_keeps_in_memory_mutation() {
        let mut store = Store::open(FailingStorage);
        let result = store.upsert_lead(lead("Asha", "9876"));
        assert!(matches!(result, Err(StoreError::Storage(_))));
        // Collection stays valid in memory for the session
        assert_eq!(store.list_leads("").count(), 1);
    }
}
