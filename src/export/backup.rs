use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::{Lead, Profile, ProfilePatch, Project};
use crate::store::{Store, StoreError};

/// Full backup of the three collections, human-readable JSON.
#[derive(Debug, Serialize)]
pub struct Backup<'a> {
    pub leads: &'a [Lead],
    pub projects: &'a [Project],
    pub profile: &'a Profile,
}

/// Serialize the store's collections to a backup document.
pub fn export_backup(store: &Store) -> Result<String, StoreError> {
    let backup = Backup {
        leads: store.leads(),
        projects: store.projects(),
        profile: store.profile(),
    };
    Ok(serde_json::to_string_pretty(&backup)?)
}

/// Raw restore payload. Fields are untyped so a wrong container type can be
/// skipped without rejecting the whole document, matching the original app.
/// The legacy export wrote the profile under `settings`.
#[derive(Debug, Deserialize)]
struct BackupPayload {
    #[serde(default)]
    leads: Option<Value>,
    #[serde(default)]
    projects: Option<Value>,
    #[serde(default, alias = "settings")]
    profile: Option<Value>,
}

/// Restore a backup into the store. An unparseable payload aborts with the
/// existing data untouched; a field that is present but of the wrong
/// container type is skipped. Arrays replace the collection wholesale, the
/// profile merges field-wise.
pub fn import_backup(store: &mut Store, payload: &str) -> Result<(), StoreError> {
    let payload: BackupPayload = serde_json::from_str(payload)?;

    // Decode everything before touching the store so a malformed record
    // cannot leave a partial import behind.
    let leads = decode_array::<Lead>("leads", payload.leads)?;
    let projects = decode_array::<Project>("projects", payload.projects)?;
    let patch = match payload.profile {
        Some(v) if v.is_object() => Some(serde_json::from_value::<ProfilePatch>(v)?),
        Some(_) => {
            warn!("backup profile is not an object, skipping");
            None
        }
        None => None,
    };

    store.restore(leads, projects, patch)
}

fn decode_array<T: serde::de::DeserializeOwned>(
    field: &str,
    value: Option<Value>,
) -> Result<Option<Vec<T>>, StoreError> {
    match value {
        Some(v) if v.is_array() => Ok(Some(serde_json::from_value(v)?)),
        Some(_) => {
            warn!(field, "backup field is not an array, skipping");
            Ok(None)
        }
        None => Ok(None),
    }
}
