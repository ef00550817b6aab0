//! ``src/data/source.rs``
//! ============================================================================
//! # Data sources
//!
//! Seeds the three list screens. A `JsonFileSource` reads a user-supplied
//! file; `EmbeddedSeed` falls back to the data compiled into the binary.
//! Records arrive untyped and are validated per screen on conversion.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::Config,
    error::AppError,
    model::{
        list_item::{ItemStatus, ListItem, RawItem},
        screen_spec::ScreenId,
    },
};

const EMBEDDED_SEED: &str = include_str!("../../data/seed.json");

/// Raw records for every screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub regularization: Vec<RawItem>,
    #[serde(default)]
    pub shift_swap: Vec<RawItem>,
    #[serde(default)]
    pub employees: Vec<RawItem>,
}

impl Seed {
    pub fn parse(text: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Move the records of `screen` out of the seed.
    pub fn take(&mut self, screen: ScreenId) -> Vec<RawItem> {
        std::mem::take(match screen {
            ScreenId::Regularization => &mut self.regularization,
            ScreenId::ShiftSwap => &mut self.shift_swap,
            ScreenId::Employees => &mut self.employees,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regularization.len() + self.shift_swap.len() + self.employees.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Convert raw records into typed items; the first bad record aborts.
pub fn typed_items<S: ItemStatus>(raw: Vec<RawItem>, screen: ScreenId) -> Result<Vec<ListItem<S>>, AppError> {
    raw.into_iter()
        .map(|record| record.into_item::<S>(screen.title()))
        .collect()
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable origin for logs and the status bar.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<Seed, AppError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Seed, AppError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AppError::file_io(&self.path, e))?;

        let seed = Seed::parse(&text).map_err(|e| e.with_context(self.describe()))?;
        info!(
            marker = "SEED_LOADED",
            operation_type = "data_source",
            source = %self.path.display(),
            records = seed.len(),
            "loaded seed file"
        );
        Ok(seed)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSeed;

#[async_trait]
impl DataSource for EmbeddedSeed {
    fn describe(&self) -> String {
        "built-in sample data".to_string()
    }

    async fn load(&self) -> Result<Seed, AppError> {
        Seed::parse(EMBEDDED_SEED)
    }
}

/// The configured file if any, else the compiled-in seed.
#[must_use]
pub fn source_for(cfg: &Config) -> Box<dyn DataSource> {
    match &cfg.data_file {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => Box::new(EmbeddedSeed),
    }
}
