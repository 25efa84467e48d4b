use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::iter::{IteratorTracker, StateQueryIterator};
use crate::selector::Selector;
use crate::traits::LedgerStore;

/// A single world-state mutation as recorded in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalOp {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

/// Configuration for [`WalLedgerStore`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WalStoreConfig {
    /// `fsync` after every append instead of relying on the page cache.
    pub sync_every_write: bool,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// The file half of the log: somewhere to append frames and cut them off again.
trait LogFile: Write {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

struct LogWriter<F: LogFile = File> {
    file: F,
    /// End of the last frame that was fully written.
    offset: u64,
}

impl<F: LogFile> LogWriter<F> {
    /// Append one frame. On failure the file is cut back to `offset`, so a
    /// frame the caller saw fail is never replayed or glued to the next one.
    fn append(&mut self, frame: &[u8], sync: bool) -> StoreResult<()> {
        if let Err(e) = self.write_through(frame, sync) {
            if let Err(rollback) = self.file.truncate_to(self.offset) {
                warn!(offset = self.offset, error = %rollback, "failed to roll back state log append");
            }
            return Err(e.into());
        }
        self.offset += frame.len() as u64;
        Ok(())
    }

    fn write_through(&mut self, frame: &[u8], sync: bool) -> io::Result<()> {
        self.file.write_all(frame)?;
        self.file.flush()?;
        if sync {
            self.file.sync()?;
        }
        Ok(())
    }
}

/// World state rebuilt from a write-ahead log.
///
/// Every `put_state`/`del_state` is framed as
///
/// ```text
/// [4 bytes: entry length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized WalOp)]
/// ```
///
/// and appended before the in-memory state changes. On open the log is
/// replayed front-to-back; entries failing the CRC check are skipped and a
/// torn tail is cut off so later appends start on a frame boundary.
pub struct WalLedgerStore {
    path: PathBuf,
    config: WalStoreConfig,
    state: RwLock<BTreeMap<String, Vec<u8>>>,
    log: Mutex<LogWriter>,
    iterators: IteratorTracker,
}

impl WalLedgerStore {
    /// Open (or create) the log at `path` and replay it.
    pub fn open(path: &Path, config: WalStoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(parent_dir(path))?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let (state, valid_len) = replay(path)?;
        let file_len = file.metadata()?.len();
        if valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len,
                file_len,
                "discarding torn tail of state log"
            );
            file.set_len(valid_len)?;
        }

        info!(path = %path.display(), keys = state.len(), "state log opened");
        Ok(Self {
            path: path.to_path_buf(),
            config,
            state: RwLock::new(state),
            log: Mutex::new(LogWriter {
                file,
                offset: valid_len,
            }),
            iterators: IteratorTracker::new(),
        })
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the log in bytes.
    pub fn log_len(&self) -> StoreResult<u64> {
        let log = self.log.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(log.offset)
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Query iterators handed out and not yet dropped.
    pub fn open_iterators(&self) -> usize {
        self.iterators.open_count()
    }

    /// Rewrite the log so it holds exactly one `Put` per live key.
    ///
    /// The new log is written to a temporary file next to the old one and
    /// renamed over it, so a crash mid-compaction leaves the old log intact.
    pub fn compact(&self) -> StoreResult<()> {
        let mut log = self.log.lock().map_err(|_| StoreError::LockPoisoned)?;
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;

        let tmp = tempfile::NamedTempFile::new_in(parent_dir(&self.path))?;
        let mut compacted = Vec::new();
        for (key, value) in state.iter() {
            compacted.extend(encode_frame(&WalOp::Put {
                key: key.clone(),
                value: value.clone(),
            })?);
        }
        let offset = compacted.len() as u64;
        tmp.as_file().write_all(&compacted)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        let file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        log.file = file;
        let before = log.offset;
        log.offset = offset;

        debug!(before, after = offset, keys = state.len(), "state log compacted");
        Ok(())
    }

    fn append(&self, op: WalOp) -> StoreResult<()> {
        let frame = encode_frame(&op)?;
        let mut log = self.log.lock().map_err(|_| StoreError::LockPoisoned)?;
        log.append(&frame, self.config.sync_every_write)?;

        // Apply while still holding the log lock so state order matches log order.
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        match op {
            WalOp::Put { key, value } => {
                debug!(key = %key, len = value.len(), "put state");
                state.insert(key, value);
            }
            WalOp::Delete { key } => {
                debug!(key = %key, "del state");
                state.remove(&key);
            }
        }
        Ok(())
    }
}

impl LedgerStore for WalLedgerStore {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.append(WalOp::Put {
            key: key.to_owned(),
            value: value.to_vec(),
        })
    }

    fn del_state(&self, key: &str) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.append(WalOp::Delete {
            key: key.to_owned(),
        })
    }

    fn get_query_result(&self, query: &str) -> StoreResult<StateQueryIterator> {
        let selector = Selector::parse(query)?;
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(StateQueryIterator::new(
            selector.filter(&state),
            Some(&self.iterators),
        ))
    }
}

impl std::fmt::Debug for WalLedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalLedgerStore")
            .field("path", &self.path)
            .field("key_count", &self.len())
            .finish()
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Frame one op as header plus bincode payload.
fn encode_frame(op: &WalOp) -> StoreResult<Vec<u8>> {
    let payload = bincode::serialize(op).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .map_err(|_| StoreError::Serialization("state log entry exceeds 4 GiB".into()))?;
    let crc = crc32fast::hash(&payload);

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Replay the log at `path`, returning the rebuilt state and the length of
/// the well-framed prefix of the file.
fn replay(path: &Path) -> StoreResult<(BTreeMap<String, Vec<u8>>, u64)> {
    let mut file = BufReader::new(File::open(path)?);
    let file_len = file.get_ref().metadata()?.len();
    let mut state = BTreeMap::new();
    let mut offset: u64 = 0;
    let mut applied = 0usize;

    while offset + HEADER_SIZE as u64 <= file_len {
        let mut header = [0u8; HEADER_SIZE];
        match file.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || offset + HEADER_SIZE as u64 + length as u64 > file_len {
            warn!(offset, length, file_len, "invalid state log entry length; stopping replay");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match file.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, "truncated state log entry; stopping replay");
                break;
            }
            Err(e) => return Err(e.into()),
        }
        offset += HEADER_SIZE as u64 + length as u64;

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            warn!(
                offset,
                expected = expected_crc,
                actual = actual_crc,
                "CRC mismatch; skipping state log entry"
            );
            continue;
        }

        match bincode::deserialize::<WalOp>(&payload) {
            Ok(WalOp::Put { key, value }) => {
                state.insert(key, value);
                applied += 1;
            }
            Ok(WalOp::Delete { key }) => {
                state.remove(&key);
                applied += 1;
            }
            Err(e) => warn!(offset, error = %e, "undecodable state log entry; skipping"),
        }
    }

    debug!(applied, keys = state.len(), "state log replay complete");
    Ok((state, offset))
}
