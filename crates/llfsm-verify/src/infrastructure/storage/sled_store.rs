//! Sled Kripke Store
//!
//! Durable [`PersistentStore`] on top of sled.
//!
//! # Layout
//!
//! ```text
//! states : StateId (u64, big-endian)      → KripkeState (JSON)
//! ids    : PropertyList (JSON)            → StateId (u64, big-endian)
//! meta   : "next_state_id"                → u64 (little-endian)
//! ```
//!
//! Big-endian state keys make sled's key order equal to id order, so
//! [`states`](PersistentStore::states) is a plain scan. Reopening a
//! database continues where the previous run stopped: known property
//! lists map to their old ids.
//!
//! A new state touches all three trees in one transaction, so a record is
//! never visible without its index entry or counter bump.

use crate::domain::kripke::{KripkeEdge, KripkeState, PersistentStore};
use crate::error::StoreError;
use llfsm_core::{PropertyList, StateId};
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const NEXT_STATE_ID: &[u8] = b"next_state_id";

/// Sled-backed Kripke structure
#[derive(Debug, Clone)]
pub struct SledKripkeStore {
    db: Arc<Db>,
    states: Tree,
    ids: Tree,
    meta: Tree,
}

impl SledKripkeStore {
    /// Opens (or creates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Backend failures.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Opened Kripke store");
        Self::from_db(db)
    }

    /// Store that is deleted when dropped.
    ///
    /// # Errors
    ///
    /// Backend failures.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        debug!("Opened temporary Kripke store");
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        let states = db.open_tree("states")?;
        let ids = db.open_tree("ids")?;
        let meta = db.open_tree("meta")?;
        Ok(Self {
            db: Arc::new(db),
            states,
            ids,
            meta,
        })
    }

    /// Total number of edges
    ///
    /// # Errors
    ///
    /// Backend or decoding failures.
    pub fn edge_count(&self) -> Result<usize, StoreError> {
        Ok(self.states()?.iter().map(|state| state.edges.len()).sum())
    }

    fn insert_new(&self, properties: PropertyList, is_initial: bool) -> Result<KripkeState, StoreError> {
        let key = serde_json::to_vec(&properties)?;
        (&self.states, &self.ids, &self.meta)
            .transaction(|(states, ids, meta)| -> ConflictableTransactionResult<KripkeState, StoreError> {
                let next = match meta.get(NEXT_STATE_ID)? {
                    Some(bytes) => decode_counter(&bytes).map_err(ConflictableTransactionError::Abort)?,
                    None => 0,
                };
                let id = usize::try_from(next).map(StateId::new).map_err(|_| {
                    ConflictableTransactionError::Abort(StoreError::Corrupted("state id out of range".into()))
                })?;
                let state = KripkeState::new(id, properties.clone(), is_initial);
                let bytes = serde_json::to_vec(&state)
                    .map_err(|err| ConflictableTransactionError::Abort(StoreError::from(err)))?;

                states.insert(&encode_id(id)[..], bytes)?;
                ids.insert(key.as_slice(), &encode_id(id)[..])?;
                meta.insert(NEXT_STATE_ID, &(next + 1).to_le_bytes()[..])?;
                Ok(state)
            })
            .map_err(|err| match err {
                TransactionError::Abort(err) => err,
                TransactionError::Storage(err) => StoreError::Backend(err),
            })
    }

    fn put(&self, state: &KripkeState) -> Result<(), StoreError> {
        self.states.insert(encode_id(state.id), serde_json::to_vec(state)?)?;
        Ok(())
    }
}

impl PersistentStore for SledKripkeStore {
    fn add(&mut self, properties: PropertyList, is_initial: bool) -> Result<(StateId, KripkeState), StoreError> {
        if let Some(id) = self.id(&properties)? {
            let mut state = self.state(id)?;
            if is_initial && !state.is_initial {
                state.is_initial = true;
                self.put(&state)?;
            }
            return Ok((id, state));
        }

        let state = self.insert_new(properties, is_initial)?;
        Ok((state.id, state))
    }

    fn add_edge(&mut self, edge: KripkeEdge, source: StateId) -> Result<(), StoreError> {
        let mut state = self.state(source)?;
        state.add_edge(edge);
        self.put(&state)
    }

    fn state(&self, id: StateId) -> Result<KripkeState, StoreError> {
        let bytes = self
            .states
            .get(encode_id(id))?
            .ok_or(StoreError::UnknownState(id))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn id(&self, properties: &PropertyList) -> Result<Option<StateId>, StoreError> {
        let key = serde_json::to_vec(properties)?;
        self.ids.get(key)?.map(|bytes| decode_id(&bytes)).transpose()
    }

    fn len(&self) -> usize {
        self.states.len()
    }

    fn states(&self) -> Result<Vec<KripkeState>, StoreError> {
        self.states
            .iter()
            .values()
            .map(|bytes| -> Result<KripkeState, StoreError> { Ok(serde_json::from_slice(&bytes?)?) })
            .collect()
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        let bytes = self.db.flush()?;
        debug!(bytes, states = self.states.len(), "Flushed Kripke store");
        Ok(())
    }
}

fn encode_id(id: StateId) -> [u8; 8] {
    u64::try_from(id.as_usize()).unwrap_or(u64::MAX).to_be_bytes()
}

fn decode_counter(bytes: &[u8]) -> Result<u64, StoreError> {
    bytes
        .try_into()
        .map(u64::from_le_bytes)
        .map_err(|_| StoreError::Corrupted("state id counter".into()))
}

fn decode_id(bytes: &[u8]) -> Result<StateId, StoreError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupted(format!("state id of {} bytes", bytes.len())))?;
    usize::try_from(u64::from_be_bytes(raw))
        .map(StateId::new)
        .map_err(|_| StoreError::Corrupted("state id out of range".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use llfsm_core::Value;

    fn properties(pc: &str) -> PropertyList {
        let mut properties = PropertyList::new();
        properties.insert("pc".into(), Value::from(pc));
        properties
    }

    #[test]
    fn test_add_deduplicates_and_counts() {
        let mut store = SledKripkeStore::temporary().unwrap();
        let (a, _) = store.add(properties("a"), false).unwrap();
        let (b, _) = store.add(properties("b"), false).unwrap();
        let (again, state) = store.add(properties("a"), true).unwrap();

        assert_eq!(a, StateId::new(0));
        assert_eq!(b, StateId::new(1));
        assert_eq!(again, a);
        assert!(state.is_initial);
        assert!(store.state(a).unwrap().is_initial, "initial flag persisted");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_edges_persist() {
        let mut store = SledKripkeStore::temporary().unwrap();
        let (a, _) = store.add(properties("a"), true).unwrap();
        let (b, _) = store.add(properties("b"), false).unwrap();
        store.add_edge(KripkeEdge::new(b).clock("m").after(30), a).unwrap();
        store.add_edge(KripkeEdge::new(a).snapshotting(true), b).unwrap();

        assert_eq!(store.edge_count().unwrap(), 2);
        assert_eq!(store.state(a).unwrap().edges[0].time, 30);
        assert!(matches!(
            store.add_edge(KripkeEdge::new(a), StateId::new(42)),
            Err(StoreError::UnknownState(_))
        ));
    }

    #[test]
    fn test_states_in_id_order() {
        let mut store = SledKripkeStore::temporary().unwrap();
        for i in 0..300 {
            store.add(properties(&format!("s{i}")), false).unwrap();
        }
        let ids: Vec<_> = store.states().unwrap().iter().map(|s| s.id.as_usize()).collect();
        assert_eq!(ids, (0..300).collect::<Vec<_>>());
    }

    #[test]
    fn test_failed_insert_leaves_no_partial_state() {
        let mut store = SledKripkeStore::temporary().unwrap();
        store.add(properties("a"), true).unwrap();
        store.meta.insert(NEXT_STATE_ID, vec![1, 2, 3]).unwrap();

        assert!(matches!(
            store.add(properties("b"), false),
            Err(StoreError::Corrupted(_))
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.ids.len(), 1);
        assert_eq!(store.id(&properties("b")).unwrap(), None);

        store.meta.insert(NEXT_STATE_ID, 1u64.to_le_bytes().to_vec()).unwrap();
        let (b, _) = store.add(properties("b"), false).unwrap();
        assert_eq!(b, StateId::new(1));
        assert_eq!(store.id(&properties("b")).unwrap(), Some(b));
    }

    #[test]
    fn test_decode_rejects_short_keys() {
        assert!(matches!(decode_id(&[1, 2, 3]), Err(StoreError::Corrupted(_))));
    }
}
