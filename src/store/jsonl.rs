//! Append-only JSON-lines store.
//!
//! Three files live under the store directory: `sessions.jsonl`,
//! `positions.jsonl` and `moves.jsonl`. A position's move lines are written
//! before its position line, and the position line marks the analysis as
//! committed: move lines without one are ignored when the store is opened.
//! A save writes its moves in index order, so a move with index 0 starts a
//! new batch and discards any earlier, uncommitted batch for that position.
//! Session lines are appended on every update and the last one wins.
//! Opening the store cuts an interrupted final line off each file.
//! Deleting a session rewrites the files.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::PositionAnalysis;
use crate::session::AnalysisSession;

use super::index::StoreIndex;
use super::records::{split, MoveRecord, PositionRecord, StoredPosition};
use super::{ResultStore, StoreError};

const SESSIONS_FILE: &str = "sessions.jsonl";
const POSITIONS_FILE: &str = "positions.jsonl";
const MOVES_FILE: &str = "moves.jsonl";

pub struct JsonlStore {
    root: PathBuf,
    index: RwLock<StoreIndex>,
}

impl JsonlStore {
    /// Opens the store at `root`, creating the directory if needed and
    /// loading every committed record.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;

        for file in &[SESSIONS_FILE, POSITIONS_FILE, MOVES_FILE] {
            truncate_torn_tail(&root.join(file))?;
        }

        let mut index = StoreIndex::default();
        for session in read_records::<AnalysisSession>(&root.join(SESSIONS_FILE))? {
            index.put_session(session);
        }

        let mut pending: FxHashMap<(Uuid, u64), Vec<MoveRecord>> = FxHashMap::default();
        for record in read_records::<MoveRecord>(&root.join(MOVES_FILE))? {
            let batch = pending
                .entry((record.session_id, record.sequence))
                .or_default();
            if record.move_index == 0 {
                batch.clear();
            }
            batch.push(record);
        }
        for position in read_records::<PositionRecord>(&root.join(POSITIONS_FILE))? {
            let key = (position.session_id, position.sequence);
            let batch = pending.remove(&key).unwrap_or_default();
            // a position without moves wrote none, whatever an earlier attempt left
            let moves = if position.statistics.move_count == 0 {
                Vec::new()
            } else {
                batch
            };
            index.put_position(position, moves);
        }
        if !pending.is_empty() {
            warn!(
                "Ignoring moves of {} uncommitted positions in {}",
                pending.len(),
                root.display()
            );
        }

        debug!("Opened store at {}", root.display());
        Ok(Self {
            root,
            index: RwLock::new(index),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn append<T: Serialize>(&self, file: &str, records: &[T]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let path = self.root.join(file);
        let mut buffer = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buffer, record)?;
            buffer.push(b'\n');
        }
        let io_error = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error)?;
        let committed = file.metadata().map_err(io_error)?.len();
        if let Err(source) = file.write_all(&buffer) {
            // leave no partial line for the next append to run into
            let _ = file.set_len(committed);
            return Err(io_error(source));
        }
        file.sync_data().map_err(io_error)
    }

    fn rewrite<'a, T, I>(&self, file: &str, records: I) -> Result<(), StoreError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let path = self.root.join(file);
        let staging = self.root.join(format!("{}.tmp", file));
        let io_error = |source| StoreError::Io {
            path: staging.clone(),
            source,
        };
        let mut writer = BufWriter::new(File::create(&staging).map_err(io_error)?);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n").map_err(io_error)?;
        }
        writer.flush().map_err(io_error)?;
        drop(writer);
        fs::rename(&staging, &path).map_err(|source| StoreError::Io { path, source })
    }
}

/// Cuts the file back to its last complete line. An interrupted append
/// leaves a partial line behind, and the next append would run into it.
fn truncate_torn_tail(path: &Path) -> Result<(), StoreError> {
    let io_error = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(source) => return Err(io_error(source)),
    };
    if contents.is_empty() || contents.ends_with(b"\n") {
        return Ok(());
    }

    let complete = contents
        .iter()
        .rposition(|&byte| byte == b'\n')
        .map_or(0, |newline| newline + 1);
    warn!(
        "Dropping {} bytes of a torn record at the end of {}",
        contents.len() - complete,
        path.display()
    );
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(io_error)?;
    file.set_len(complete as u64).map_err(io_error)?;
    file.sync_data().map_err(io_error)
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .collect::<Result<_, _>>()
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::with_capacity(lines.len());
    for (number, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(source) => {
                return Err(StoreError::Corrupt {
                    path: path.to_path_buf(),
                    line: number + 1,
                    source,
                })
            }
        }
    }
    Ok(records)
}

impl ResultStore for JsonlStore {
    fn save_session(&self, session: &AnalysisSession) -> Result<(), StoreError> {
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        self.append(SESSIONS_FILE, std::slice::from_ref(session))?;
        index.put_session(session.clone());
        Ok(())
    }

    fn load_session(&self, id: Uuid) -> Result<AnalysisSession, StoreError> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session(id)
            .cloned()
            .ok_or(StoreError::SessionNotFound(id))
    }

    fn list_sessions(&self) -> Result<Vec<AnalysisSession>, StoreError> {
        Ok(self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sessions())
    }

    fn delete_session(&self, id: Uuid) -> Result<(), StoreError> {
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        if !index.remove_session(id) {
            return Err(StoreError::SessionNotFound(id));
        }
        let sessions = index.sessions();
        self.rewrite(MOVES_FILE, index.move_records())?;
        self.rewrite(POSITIONS_FILE, index.position_records())?;
        self.rewrite(SESSIONS_FILE, sessions.iter())
    }

    fn save_position(
        &self,
        session_id: Uuid,
        sequence: u64,
        analysis: &PositionAnalysis,
    ) -> Result<(), StoreError> {
        let (position, moves) = split(session_id, sequence, analysis);
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        self.append(MOVES_FILE, &moves)?;
        self.append(POSITIONS_FILE, std::slice::from_ref(&position))?;
        index.put_position(position, moves);
        Ok(())
    }

    fn positions_for_session(&self, id: Uuid) -> Result<Vec<StoredPosition>, StoreError> {
        Ok(self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .positions_for_session(id))
    }

    fn positions_by_id(&self, position_id: &str) -> Result<Vec<StoredPosition>, StoreError> {
        Ok(self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .positions_by_id(position_id))
    }

    fn top_moves(&self, session: Option<Uuid>, limit: usize) -> Result<Vec<MoveRecord>, StoreError> {
        Ok(self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .top_moves(session, limit))
    }
}
