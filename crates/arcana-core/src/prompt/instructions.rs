//! Per-card instruction lookup and aggregation

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use serde::Deserialize;

use crate::logging::SharedLogger;
use crate::types::CardInstruction;
use crate::{log_debug, log_warn};

/// Errors looking up card instructions
#[derive(Debug, thiserror::Error)]
pub enum InstructionLookupError {
    #[error("Instruction source unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse instructions: {0}")]
    Parse(String),
}

pub type InstructionLookupResult<T> = Result<T, InstructionLookupError>;

/// Lookup of guidance by `(card_id, style_id)`
///
/// `Ok(None)` means there is no instruction for that pair, which is normal.
#[async_trait]
pub trait InstructionSource: Send + Sync {
    fn name(&self) -> &str;

    async fn get(&self, card_id: &str, style_id: &str) -> InstructionLookupResult<Option<CardInstruction>>;
}

type InstructionKey = (String, String);

fn index(instructions: impl IntoIterator<Item = CardInstruction>) -> HashMap<InstructionKey, CardInstruction> {
    instructions
        .into_iter()
        .map(|i| ((i.card_id.clone(), i.style_id.clone()), i))
        .collect()
}

/// In-memory instruction source
///
/// Counts lookups and can be told to fail for chosen card ids.
#[derive(Debug, Default)]
pub struct MemoryInstructionSource {
    instructions: RwLock<HashMap<InstructionKey, CardInstruction>>,
    failing: RwLock<HashSet<String>>,
    lookups: AtomicUsize,
}

impl MemoryInstructionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instructions(instructions: impl IntoIterator<Item = CardInstruction>) -> Self {
        Self {
            instructions: RwLock::new(index(instructions)),
            ..Self::default()
        }
    }

    /// Insert or replace the instruction for its `(card_id, style_id)`
    pub fn insert(&self, instruction: CardInstruction) {
        let key = (instruction.card_id.clone(), instruction.style_id.clone());
        self.instructions.write().insert(key, instruction);
    }

    /// Make lookups for `card_id` fail with an I/O error
    pub fn fail_for(&self, card_id: impl Into<String>) {
        self.failing.write().insert(card_id.into());
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.instructions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.read().is_empty()
    }
}

#[async_trait]
impl InstructionSource for MemoryInstructionSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, card_id: &str, style_id: &str) -> InstructionLookupResult<Option<CardInstruction>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().contains(card_id) {
            return Err(InstructionLookupError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("lookup for {} failed", card_id),
            )));
        }
        let key = (card_id.to_string(), style_id.to_string());
        Ok(self.instructions.read().get(&key).cloned())
    }
}

#[derive(Debug, Default, Deserialize)]
struct InstructionFile {
    #[serde(default)]
    instructions: Vec<CardInstruction>,
}

/// Instructions loaded from a YAML or JSON file
///
/// `.json` files hold a top-level array; anything else is YAML with an
/// `instructions:` list. The file is read on first lookup and kept until
/// `reload` is called.
#[derive(Debug)]
pub struct FileInstructionSource {
    path: PathBuf,
    loaded: RwLock<Option<Arc<HashMap<InstructionKey, CardInstruction>>>>,
}

impl FileInstructionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file now
    pub async fn reload(&self) -> InstructionLookupResult<usize> {
        let instructions = self.read_file().await?;
        let count = instructions.len();
        *self.loaded.write() = Some(Arc::new(instructions));
        Ok(count)
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    async fn read_file(&self) -> InstructionLookupResult<HashMap<InstructionKey, CardInstruction>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(InstructionLookupError::Unavailable(format!(
                    "{} does not exist",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let instructions: Vec<CardInstruction> = if self.is_json() {
            serde_json::from_str(&content).map_err(|e| InstructionLookupError::Parse(e.to_string()))?
        } else if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_yaml::from_str::<InstructionFile>(&content)
                .map_err(|e| InstructionLookupError::Parse(e.to_string()))?
                .instructions
        };

        Ok(index(instructions))
    }

    async fn instructions(&self) -> InstructionLookupResult<Arc<HashMap<InstructionKey, CardInstruction>>> {
        let cached = self.loaded.read().clone();
        if let Some(loaded) = cached {
            return Ok(loaded);
        }
        let loaded = Arc::new(self.read_file().await?);
        *self.loaded.write() = Some(Arc::clone(&loaded));
        Ok(loaded)
    }
}

#[async_trait]
impl InstructionSource for FileInstructionSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, card_id: &str, style_id: &str) -> InstructionLookupResult<Option<CardInstruction>> {
        let instructions = self.instructions().await?;
        Ok(instructions
            .get(&(card_id.to_string(), style_id.to_string()))
            .cloned())
    }
}

/// Collects the instructions for a set of drawn cards under one style
pub struct CardInstructionAggregator {
    source: Arc<dyn InstructionSource>,
    logger: SharedLogger,
}

impl CardInstructionAggregator {
    pub fn new(source: Arc<dyn InstructionSource>, logger: SharedLogger) -> Self {
        Self { source, logger }
    }

    /// Instructions for `card_ids` in their first-appearance order
    ///
    /// Repeated ids are looked up once. Cards with no instruction are left
    /// out; a failed lookup is logged and counts as no instruction.
    pub async fn aggregate(&self, card_ids: &[String], style_id: &str) -> Vec<CardInstruction> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = card_ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();

        let lookups = unique.iter().map(|card_id| self.source.get(card_id, style_id));
        let results = join_all(lookups).await;

        let mut instructions = Vec::with_capacity(results.len());
        for (card_id, result) in unique.iter().zip(results) {
            match result {
                Ok(Some(instruction)) => instructions.push(instruction),
                Ok(None) => log_debug!(self.logger, "No instruction for {} in style {}", card_id, style_id),
                Err(e) => log_warn!(
                    self.logger,
                    "Instruction lookup for {} ({}) via '{}' failed: {}",
                    card_id,
                    style_id,
                    self.source.name(),
                    e
                ),
            }
        }
        instructions
    }
}
