//! Concurrent reconciliation planner
//!
//! Turns a source listing and a destination listing into an ordered plan of
//! [`Change`]s. Each logical path is classified independently on a blocking
//! worker (classification may hash file content), with at most
//! `concurrency` paths in flight. The plan is ordered only after every path
//! has been classified.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use drivesync_core::domain::{
    classify, sort_by_precedence, Change, ChangePolicy, FileDescriptor, Operation, RemotePath,
};
use drivesync_core::ports::{IFileLister, Listing};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument};

use crate::SyncError;

/// Default number of paths classified at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Which way content flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Local is the source, remote the destination
    Push,
    /// Remote is the source, local the destination
    Pull,
}

impl Direction {
    /// Orders `(local, remote)` as `(source, destination)`
    pub fn arrange<'a>(
        self,
        local: &'a dyn IFileLister,
        remote: &'a dyn IFileLister,
    ) -> (&'a dyn IFileLister, &'a dyn IFileLister) {
        match self {
            Direction::Push => (local, remote),
            Direction::Pull => (remote, local),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Push => write!(f, "push"),
            Direction::Pull => write!(f, "pull"),
        }
    }
}

/// Counts of each operation in a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub additions: usize,
    pub deletions: usize,
    pub modifications: usize,
    pub unchanged: usize,
}

impl PlanSummary {
    /// Number of changes that alter the destination
    pub fn active(&self) -> usize {
        self.additions + self.deletions + self.modifications
    }
}

/// An ordered batch of changes, safe to apply front to back
#[derive(Debug, Clone, Default)]
pub struct Plan {
    changes: Vec<Change>,
}

impl Plan {
    /// All changes, including those resolved to [`Operation::None`]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Changes that alter the destination, in application order
    pub fn active(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|c| c.op().is_active())
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for change in &self.changes {
            match change.op() {
                Operation::Add => summary.additions += 1,
                Operation::Delete => summary.deletions += 1,
                Operation::Modify => summary.modifications += 1,
                Operation::None => summary.unchanged += 1,
            }
        }
        summary
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

impl From<Vec<Change>> for Plan {
    /// Orders an already classified batch
    fn from(mut changes: Vec<Change>) -> Self {
        sort_by_precedence(&mut changes);
        Self { changes }
    }
}

/// Classifies every path of two listings and orders the result
#[derive(Debug, Clone)]
pub struct Reconciler {
    concurrency: usize,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl Reconciler {
    /// Create a reconciler; a concurrency of zero is treated as one.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Lists both sides and plans the changes from `source` to `destination`
    ///
    /// # Errors
    /// Fails if either side cannot be listed at all.
    #[instrument(skip_all, fields(source = %source.origin(), destination = %destination.origin()))]
    pub async fn reconcile(
        &self,
        source: &dyn IFileLister,
        destination: &dyn IFileLister,
        policy: ChangePolicy,
    ) -> Result<Plan, SyncError> {
        let (src_listing, dest_listing) = tokio::try_join!(
            list_side(source),
            list_side(destination),
        )?;
        self.plan(src_listing, dest_listing, policy).await
    }

    /// Plans the changes between two listings
    ///
    /// Paths are classified in lexical order; changes of equal precedence
    /// keep that order in the plan.
    pub async fn plan(
        &self,
        source: Listing,
        destination: Listing,
        policy: ChangePolicy,
    ) -> Result<Plan, SyncError> {
        let pairs = pair_listings(source, destination);
        let total = pairs.len();

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        for (index, (path, src, dest)) in pairs.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| SyncError::TaskFailed(e.to_string()))?;
                let change = tokio::task::spawn_blocking(move || classify(path, src, dest, policy))
                    .await
                    .map_err(|e| SyncError::TaskFailed(e.to_string()))??;
                Ok::<_, SyncError>((index, change))
            });
        }

        // Barrier: every path is classified before anything is ordered
        let mut slots: Vec<Option<Change>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, change) = joined.map_err(|e| SyncError::TaskFailed(e.to_string()))??;
            slots[index] = Some(change);
        }

        let plan = Plan::from(slots.into_iter().flatten().collect::<Vec<_>>());
        let summary = plan.summary();
        info!(
            paths = total,
            additions = summary.additions,
            deletions = summary.deletions,
            modifications = summary.modifications,
            "Reconciliation plan ready"
        );
        Ok(plan)
    }
}

async fn list_side(lister: &dyn IFileLister) -> Result<Listing, SyncError> {
    lister
        .list()
        .await
        .map_err(|e| SyncError::ListingFailed {
            origin: lister.origin(),
            message: format!("{e:#}"),
        })
}

type Pair = (
    RemotePath,
    Option<Arc<FileDescriptor>>,
    Option<Arc<FileDescriptor>>,
);

/// Joins two listings on their logical paths, in lexical order
fn pair_listings(mut source: Listing, mut destination: Listing) -> Vec<Pair> {
    let paths: BTreeSet<RemotePath> = source
        .keys()
        .chain(destination.keys())
        .cloned()
        .collect();

    paths
        .into_iter()
        .map(|path| {
            let src = source.remove(&path).map(Arc::new);
            let dest = destination.remove(&path).map(Arc::new);
            (path, src, dest)
        })
        .collect()
}
