use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::{debug, info};

use spl_store::LedgerStore;
use spl_types::{ClassLevel, ClassRecord, Profile};

use crate::error::{ChaincodeError, ChaincodeResult};

/// One entry of a `getProfileByID` result: the ledger key and the stored
/// record, embedded byte for byte as JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: Box<RawValue>,
}

impl QueryResult {
    /// Decode the embedded record as a profile.
    pub fn profile(&self) -> ChaincodeResult<Profile> {
        serde_json::from_str(self.record.get()).map_err(|e| ChaincodeError::Decode {
            id: self.key.clone(),
            reason: e.to_string(),
        })
    }
}

/// Create/update/delete/read of profile records against a world state.
///
/// The manager holds no state of its own. Each call runs inside one host
/// transaction; read-modify-write sequences rely on the host to order
/// conflicting transactions.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileManager;

impl ProfileManager {
    pub fn new() -> Self {
        Self
    }

    /// Store a new profile with `class` in the grade 10 slot.
    pub fn create(
        &self,
        stub: &dyn LedgerStore,
        user_id: &str,
        class: ClassRecord,
        bc: Vec<String>,
    ) -> ChaincodeResult<Profile> {
        self.create_with(stub, user_id, || Ok((class, bc)))
    }

    /// Like [`create`](Self::create), but the class and audit tags are only
    /// produced once the key is known to be free.
    pub fn create_with<F>(
        &self,
        stub: &dyn LedgerStore,
        user_id: &str,
        payload: F,
    ) -> ChaincodeResult<Profile>
    where
        F: FnOnce() -> ChaincodeResult<(ClassRecord, Vec<String>)>,
    {
        require_user_id(user_id)?;
        if stub.contains_key(user_id)? {
            return Err(ChaincodeError::AlreadyExists(user_id.to_owned()));
        }

        let (class, bc) = payload()?;
        let profile = Profile::new(user_id, class, bc);
        write_profile(stub, &profile)?;
        info!(user_id, "profile created");
        Ok(profile)
    }

    /// Replace one class slot and the audit tags of an existing profile.
    pub fn update(
        &self,
        stub: &dyn LedgerStore,
        user_id: &str,
        class: ClassRecord,
        bc: Vec<String>,
        level: ClassLevel,
    ) -> ChaincodeResult<Profile> {
        self.update_with(stub, user_id, level, || Ok((class, bc)))
    }

    /// Like [`update`](Self::update), but the new class and audit tags are
    /// only produced after the stored profile has been read and decoded.
    pub fn update_with<F>(
        &self,
        stub: &dyn LedgerStore,
        user_id: &str,
        level: ClassLevel,
        payload: F,
    ) -> ChaincodeResult<Profile>
    where
        F: FnOnce() -> ChaincodeResult<(ClassRecord, Vec<String>)>,
    {
        require_user_id(user_id)?;
        let mut profile = self
            .read(stub, user_id)?
            .ok_or_else(|| ChaincodeError::NotFound(user_id.to_owned()))?;

        let (class, bc) = payload()?;
        profile.user_id = user_id.to_owned();
        profile.replace_class(level, class);
        profile.bc = bc;
        write_profile(stub, &profile)?;
        info!(user_id, level = %level, "profile updated");
        Ok(profile)
    }

    /// Remove a profile. The stored bytes must still decode as a profile.
    pub fn delete(&self, stub: &dyn LedgerStore, user_id: &str) -> ChaincodeResult<()> {
        require_user_id(user_id)?;
        if self.read(stub, user_id)?.is_none() {
            return Err(ChaincodeError::NotFound(user_id.to_owned()));
        }
        stub.del_state(user_id)?;
        info!(user_id, "profile deleted");
        Ok(())
    }

    /// Point read of a profile by ledger key. Empty values read as absent.
    pub fn read(&self, stub: &dyn LedgerStore, user_id: &str) -> ChaincodeResult<Option<Profile>> {
        let Some(bytes) = stub.get_state(user_id)? else {
            return Ok(None);
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice::<Profile>(&bytes)
            .map(Some)
            .map_err(|e| ChaincodeError::Decode {
                id: user_id.to_owned(),
                reason: e.to_string(),
            })
    }

    /// Every record whose `user_id` field equals `user_id`, via rich query.
    pub fn get_by_id(
        &self,
        stub: &dyn LedgerStore,
        user_id: &str,
    ) -> ChaincodeResult<Vec<QueryResult>> {
        let query = user_id_query(user_id);
        debug!(%query, "rich query");

        // The iterator is dropped on every return path below, including `?`.
        let iterator = stub.get_query_result(&query)?;
        let mut results = Vec::new();
        for item in iterator {
            let record = item?;
            let value = serde_json::from_slice::<Box<RawValue>>(&record.value).map_err(|e| {
                ChaincodeError::Decode {
                    id: record.key.clone(),
                    reason: e.to_string(),
                }
            })?;
            results.push(QueryResult {
                key: record.key,
                record: value,
            });
        }
        debug!(user_id, matches = results.len(), "query complete");
        Ok(results)
    }
}

/// Rich query selecting records by their `user_id` field.
pub fn user_id_query(user_id: &str) -> String {
    serde_json::json!({ "selector": { "user_id": user_id } }).to_string()
}

fn require_user_id(user_id: &str) -> ChaincodeResult<()> {
    if user_id.is_empty() {
        return Err(ChaincodeError::MalformedInput("user id must not be empty".into()));
    }
    Ok(())
}

fn write_profile(stub: &dyn LedgerStore, profile: &Profile) -> ChaincodeResult<()> {
    let bytes = serde_json::to_vec(profile).map_err(|e| ChaincodeError::Encode(e.to_string()))?;
    stub.put_state(&profile.user_id, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use spl_store::{
        InMemoryLedgerStore, IteratorTracker, QueryRecord, StateQueryIterator, StoreError,
        StoreResult,
    };
    use spl_types::Subject;

    fn class(name: &str) -> ClassRecord {
        ClassRecord {
            class_name: name.into(),
            school_name: "SchoolA".into(),
            head_teacher_name: "Mr.X".into(),
            homeroom_teacher_name: "Ms.Y".into(),
            subjects: vec![Subject::new("Math", "9")],
            semester: "HK1".into(),
            diligence: vec!["A".into()],
        }
    }

    fn tags(t: &[&str]) -> Vec<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    // -----------------------------------------------------------------------
    // create
    // -----------------------------------------------------------------------

    #[test]
    fn create_then_get_by_id() {
        let store = InMemoryLedgerStore::new();
        let m = ProfileManager::new();
        let created = m.create(&store, "u1", class("10A"), tags(&["tx1"])).unwrap();

        let results = m.get_by_id(&store, "u1").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "u1");
        assert_eq!(results[0].profile().unwrap(), created);
    }

    #[test]
    fn create_twice_is_already_exists_and_keeps_record() {
        let store = InMemoryLedgerStore::new();
        let m = ProfileManager::new();
        m.create(&store, "u1", class("10A"), tags(&["tx1"])).unwrap();
        let before = store.get_state("u1").unwrap();

        let err = m.create(&store, "u1", class("10B"), tags(&["tx9"])).unwrap_err();
        assert!(matches!(err, ChaincodeError::AlreadyExists(ref id) if id == "u1"));
        assert_eq!(store.get_state("u1").unwrap(), before);
    }

    #[test]
    fn create_over_empty_value_succeeds() {
        let store = InMemoryLedgerStore::new();
        store.put_state("u1", b"").unwrap();
        ProfileManager::new()
            .create(&store, "u1", class("10A"), vec![])
            .unwrap();
        assert!(store.contains_key("u1").unwrap());
    }

    #[test]
    fn empty_user_id_is_malformed() {
        let store = InMemoryLedgerStore::new();
        let err = ProfileManager::new()
            .create(&store, "", class("10A"), vec![])
            .unwrap_err();
        assert!(matches!(err, ChaincodeError::MalformedInput(_)));
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // update
    // -----------------------------------------------------------------------

    #[test]
    fn update_touches_only_selected_slot_and_bc() {
        let store = InMemoryLedgerStore::new();
        let m = ProfileManager::new();
        m.create(&store, "u1", class("10A"), tags(&["tx1"])).unwrap();
        m.update(&store, "u1", class("11A"), tags(&["tx2"]), ClassLevel::Eleven)
            .unwrap();
        m.update(&store, "u1", class("12A"), tags(&["tx3"]), ClassLevel::Twelve)
            .unwrap();
        let before = m.read(&store, "u1").unwrap().unwrap();

        let after = m
            .update(&store, "u1", class("10Z"), tags(&["tx4", "tx5"]), ClassLevel::Ten)
            .unwrap();
        assert_eq!(after.class_10.class_name, "10Z");
        assert_eq!(after.bc, ["tx4", "tx5"]);
        assert_eq!(
            serde_json::to_vec(&after.class_11).unwrap(),
            serde_json::to_vec(&before.class_11).unwrap()
        );
        assert_eq!(
            serde_json::to_vec(&after.class_12).unwrap(),
            serde_json::to_vec(&before.class_12).unwrap()
        );
        assert_eq!(m.read(&store, "u1").unwrap().unwrap(), after);
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = InMemoryLedgerStore::new();
        let err = ProfileManager::new()
            .update(&store, "ghost", class("11A"), vec![], ClassLevel::Eleven)
            .unwrap_err();
        assert!(matches!(err, ChaincodeError::NotFound(ref id) if id == "ghost"));
        assert!(store.is_empty());
    }

    #[test]
    fn payload_is_built_only_after_the_key_check() {
        let store = InMemoryLedgerStore::new();
        let m = ProfileManager::new();
        let mut built = false;
        let err = m
            .update_with(&store, "ghost", ClassLevel::Ten, || {
                built = true;
                Ok((class("10A"), vec![]))
            })
            .unwrap_err();
        assert!(matches!(err, ChaincodeError::NotFound(_)));
        assert!(!built);

        m.create(&store, "u1", class("10A"), vec![]).unwrap();
        let err = m
            .create_with(&store, "u1", || {
                built = true;
                Ok((class("10B"), vec![]))
            })
            .unwrap_err();
        assert!(matches!(err, ChaincodeError::AlreadyExists(_)));
        assert!(!built);
    }

    #[test]
    fn update_over_garbage_is_decode_error() {
        let store = InMemoryLedgerStore::new();
        store.put_state("u1", b"not json").unwrap();
        let err = ProfileManager::new()
            .update(&store, "u1", class("11A"), vec![], ClassLevel::Eleven)
            .unwrap_err();
        assert!(matches!(err, ChaincodeError::Decode { ref id, .. } if id == "u1"));
        assert_eq!(store.get_state("u1").unwrap().unwrap(), b"not json");
    }

    // -----------------------------------------------------------------------
    // delete
    // -----------------------------------------------------------------------

    #[test]
    fn delete_then_query_is_empty_and_second_delete_fails() {
        let store = InMemoryLedgerStore::new();
        let m = ProfileManager::new();
        m.create(&store, "u1", class("10A"), vec![]).unwrap();
        m.delete(&store, "u1").unwrap();

        assert!(m.get_by_id(&store, "u1").unwrap().is_empty());
        let err = m.delete(&store, "u1").unwrap_err();
        assert!(matches!(err, ChaincodeError::NotFound(_)));
    }

    #[test]
    fn delete_over_garbage_is_decode_error_and_keeps_key() {
        let store = InMemoryLedgerStore::new();
        store.put_state("u1", b"{broken").unwrap();
        let err = ProfileManager::new().delete(&store, "u1").unwrap_err();
        assert!(matches!(err, ChaincodeError::Decode { .. }));
        assert!(store.contains_key("u1").unwrap());
    }

    // -----------------------------------------------------------------------
    // get_by_id
    // -----------------------------------------------------------------------

    #[test]
    fn get_by_id_selects_only_matching_user() {
        let store = InMemoryLedgerStore::new();
        let m = ProfileManager::new();
        m.create(&store, "u1", class("10A"), vec![]).unwrap();
        m.create(&store, "u2", class("10B"), vec![]).unwrap();

        let results = m.get_by_id(&store, "u2").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].profile().unwrap().class_10.class_name, "10B");
        assert_eq!(store.open_iterators(), 0);
    }

    #[test]
    fn record_is_returned_as_stored() {
        let store = InMemoryLedgerStore::new();
        let stored = r#"{"user_id":"u1","bc":["tx1"],"class_10":{"class_name":"10A"}}"#;
        store.put_state("u1", stored.as_bytes()).unwrap();

        let results = ProfileManager::new().get_by_id(&store, "u1").unwrap();
        assert_eq!(results[0].record.get(), stored);
        assert_eq!(
            serde_json::to_string(&results).unwrap(),
            format!(r#"[{{"Key":"u1","Record":{stored}}}]"#)
        );
    }

    #[test]
    fn non_json_record_matching_nothing_is_not_returned() {
        let store = InMemoryLedgerStore::new();
        store.put_state("u1", b"not json").unwrap();
        assert!(ProfileManager::new().get_by_id(&store, "u1").unwrap().is_empty());
    }

    #[test]
    fn quotes_in_user_id_stay_inside_the_selector() {
        let query = user_id_query(r#"u1","other":"x"#);
        let doc: Value = serde_json::from_str(&query).unwrap();
        assert_eq!(doc["selector"].as_object().unwrap().len(), 1);
        assert_eq!(doc["selector"]["user_id"], r#"u1","other":"x"#);
    }

    struct FailingCursor {
        tracker: IteratorTracker,
    }

    impl LedgerStore for FailingCursor {
        fn get_state(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
            Ok(None)
        }
        fn put_state(&self, _key: &str, _value: &[u8]) -> StoreResult<()> {
            Ok(())
        }
        fn del_state(&self, _key: &str) -> StoreResult<()> {
            Ok(())
        }
        fn get_query_result(&self, _query: &str) -> StoreResult<StateQueryIterator> {
            Ok(StateQueryIterator::from_results(
                vec![
                    Ok(QueryRecord::new("u1", br#"{"user_id":"u1"}"#.to_vec())),
                    Err(StoreError::Iteration("cursor lost".into())),
                    Ok(QueryRecord::new("u3", br#"{"user_id":"u1"}"#.to_vec())),
                ],
                Some(&self.tracker),
            ))
        }
    }

    #[test]
    fn iterator_released_when_cursor_fails() {
        let stub = FailingCursor {
            tracker: IteratorTracker::new(),
        };
        let err = ProfileManager::new().get_by_id(&stub, "u1").unwrap_err();
        assert!(matches!(err, ChaincodeError::BackingStore(StoreError::Iteration(_))));
        assert_eq!(stub.tracker.open_count(), 0);
    }
}
