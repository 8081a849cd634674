//! Application context - wires the controller to its data directory
//!
//! Layout of the data directory:
//!
//! | file            | contents                          |
//! |-----------------|-----------------------------------|
//! | `state.json`    | [`ControllerSnapshot`]            |
//! | `registry.json` | attribute grants                  |
//! | `supply.json`   | in-memory asset ledger state      |
//! | `journal.jsonl` | hash-chained event journal        |

use chrono::{DateTime, Utc};
use mintgate_calendar::{Clock, FixedOffsetCalendar, ManualClock, SystemClock};
use mintgate_controller::{
    Collaborators, ControllerSnapshot, EventJournal, InMemoryAssetLedger, JournalError,
    MintController, PolicyConfig, StoreError,
};
use mintgate_core::Address;
use mintgate_registry::{InMemoryRegistry, RegistryError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct AppContext {
    pub registry: Arc<InMemoryRegistry>,
    pub asset: Arc<InMemoryAssetLedger>,
    pub journal: EventJournal,
    controller: Option<MintController>,
    clock: Arc<dyn Clock>,
    data_path: PathBuf,
}

impl AppContext {
    /// Load everything found in `data_path`. `at` pins the clock.
    pub fn open(data_path: impl AsRef<Path>, at: Option<DateTime<Utc>>) -> anyhow::Result<Self> {
        let data_path = data_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_path)?;

        let registry_path = data_path.join("registry.json");
        let registry = if registry_path.exists() {
            InMemoryRegistry::from_file(&registry_path)?
        } else {
            InMemoryRegistry::new()
        };

        let supply_path = data_path.join("supply.json");
        let asset = if supply_path.exists() {
            InMemoryAssetLedger::from_file(&supply_path)?
        } else {
            InMemoryAssetLedger::new()
        };

        let journal = EventJournal::open(data_path.join("journal.jsonl"))?;

        let clock: Arc<dyn Clock> = match at {
            Some(at) => Arc::new(ManualClock::new(at)),
            None => Arc::new(SystemClock),
        };

        let mut ctx = Self {
            registry: Arc::new(registry),
            asset: Arc::new(asset),
            journal,
            controller: None,
            clock,
            data_path,
        };

        let state_path = ctx.state_path();
        if state_path.exists() {
            let snapshot = ControllerSnapshot::from_file(&state_path)?;
            let collaborators = ctx.collaborators(&snapshot.policy)?;
            ctx.controller = Some(MintController::restore(snapshot, collaborators)?);
        }

        tracing::debug!(
            data = %ctx.data_path.display(),
            initialized = ctx.is_initialized(),
            journal_sequence = ctx.journal.last_sequence(),
            "Context opened"
        );
        Ok(ctx)
    }

    fn collaborators(&self, policy: &PolicyConfig) -> anyhow::Result<Collaborators> {
        let calendar = FixedOffsetCalendar::with_offset_minutes(policy.time_zone_offset_minutes)?;
        Ok(Collaborators {
            registry: self.registry.clone(),
            calendar: Arc::new(calendar),
            clock: self.clock.clone(),
            asset: self.asset.clone(),
        })
    }

    /// Create a fresh controller; fails if one already exists
    pub fn initialize(&mut self, owner: Address, policy: PolicyConfig) -> anyhow::Result<()> {
        if self.is_initialized() {
            anyhow::bail!(
                "Controller already initialized (owner = {})",
                self.controller()?.owner()
            );
        }
        let collaborators = self.collaborators(&policy)?;
        self.controller = Some(MintController::new(owner, policy, collaborators)?);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> anyhow::Result<&MintController> {
        match &self.controller {
            Some(controller) => Ok(controller),
            None => anyhow::bail!("Controller not initialized; run `mintgate init` first"),
        }
    }

    pub fn controller_mut(&mut self) -> anyhow::Result<&mut MintController> {
        match &mut self.controller {
            Some(controller) => Ok(controller),
            None => anyhow::bail!("Controller not initialized; run `mintgate init` first"),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Journal drained events, then write state, registry and supply files
    pub fn commit(&mut self) -> Result<usize, CommitError> {
        let (written, snapshot) = match &mut self.controller {
            Some(controller) => {
                let written = self.journal.append_all(controller.drain_events())?;
                (written, Some(controller.snapshot()))
            }
            None => (0, None),
        };

        if let Some(snapshot) = snapshot {
            snapshot.save(self.state_path())?;
        }
        self.registry.save(self.data_path.join("registry.json"))?;
        self.asset.save(self.data_path.join("supply.json"))?;

        tracing::debug!(events = written, sequence = self.journal.last_sequence(), "State committed");
        Ok(written)
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_path.join("state.json")
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_path.join("journal.jsonl")
    }
}

/// Errors while persisting a successful call
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("State error: {0}")]
    Store(#[from] StoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}
