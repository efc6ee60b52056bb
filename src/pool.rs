//! Bounded pool of reusable [`ByteSink`]s.
//!
//! The pool only bounds how many *idle* sinks it keeps. [`SinkPool::acquire`] never blocks and
//! never fails: with an empty free list it simply builds a new sink. [`SinkPool::release`]
//! resets the sink and keeps it unless the free list is full, in which case the sink is dropped.
//!
//! Every acquired sink is stamped with the id of the pool it came from. Releasing a sink into a
//! pool it was not acquired from (a fresh sink, a clone, or another pool's sink) fails with
//! [`PoolContractViolation`](crate::EncodingErrorKind::PoolContractViolation) and the sink is
//! dropped. Releasing the same sink twice cannot be expressed since `release` takes ownership.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::Mutex;

use crate::{ByteSink, EncodingError, SinkConfig};

/// Idle sinks retained by a pool built from [`PoolConfig::default`].
pub const DEFAULT_MAX_POOLED: usize = 32;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Configuration for a [`SinkPool`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Maximum idle sinks kept for reuse. Zero disables retention.
    pub max_pooled: usize,

    /// Configuration of the sinks the pool creates.
    pub sink: SinkConfig,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pooled: DEFAULT_MAX_POOLED,
            sink: SinkConfig::default(),
        }
    }
}

impl PoolConfig {
    /// Create a pool configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of idle sinks kept.
    #[must_use]
    pub fn max_pooled(mut self, max: usize) -> Self {
        self.max_pooled = max;
        self
    }

    /// Set the configuration for created sinks.
    #[must_use]
    pub fn sink(mut self, sink: SinkConfig) -> Self {
        self.sink = sink;
        self
    }
}

/// Snapshot of pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Idle sinks currently held.
    pub pooled: usize,
    /// Sinks built because the free list was empty.
    pub created: u64,
    /// Successful acquisitions.
    pub acquired: u64,
    /// Successful releases, including those that were discarded.
    pub released: u64,
    /// Releases dropped because the free list was full.
    pub discarded: u64,
}

#[derive(Default)]
struct PoolMetrics {
    created: AtomicU64,
    acquired: AtomicU64,
    released: AtomicU64,
    discarded: AtomicU64,
}

impl PoolMetrics {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

struct PoolInner {
    id: u64,
    free_list: Mutex<Vec<ByteSink>>,
    config: PoolConfig,
    metrics: PoolMetrics,
}

/// Thread safe pool of [`ByteSink`]s. Clones share the same free list.
///
/// ## Example
///
/// ```rust
/// use wirebuf::{Endian, SinkPool};
///
/// let pool = SinkPool::new();
/// let mut sink = pool.acquire();
/// sink.write_u16(7, Endian::Big);
/// let message = sink.take_bytes();
/// pool.release(sink)?;
///
/// assert_eq!(message, vec![0, 7]);
/// assert_eq!(pool.stats().pooled, 1);
/// assert_eq!(pool.acquire().bytes_written(), 0);
/// # Ok::<(), wirebuf::EncodingError>(())
/// ```
#[derive(Clone)]
pub struct SinkPool {
    inner: Arc<PoolInner>,
}

impl Default for SinkPool {
    fn default() -> Self {
        Self::from_valid_config(PoolConfig::default())
    }
}

impl std::fmt::Debug for SinkPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkPool")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl SinkPool {
    /// Create a pool with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool from `config`, failing if its sink configuration does not validate.
    pub fn with_config(config: PoolConfig) -> Result<Self, EncodingError> {
        config.sink.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: PoolConfig) -> Self {
        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            pool = id,
            max_pooled = config.max_pooled,
            initial_capacity = config.sink.initial_capacity,
            "Creating sink pool"
        );
        Self {
            inner: Arc::new(PoolInner {
                id,
                free_list: Mutex::new(Vec::with_capacity(config.max_pooled)),
                config,
                metrics: PoolMetrics::default(),
            }),
        }
    }

    /// The configuration of this pool.
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Take an idle sink, or build a new one if none is idle.
    pub fn acquire(&self) -> ByteSink {
        let reused = self.inner.free_list.lock().pop();
        let mut sink = match reused {
            Some(sink) => sink,
            None => {
                PoolMetrics::bump(&self.inner.metrics.created);
                ByteSink::from_valid_config(self.inner.config.sink.clone())
            }
        };
        sink.lease = Some(self.inner.id);
        PoolMetrics::bump(&self.inner.metrics.acquired);
        sink
    }

    /// Like [`SinkPool::acquire`], but the sink goes back to the pool when the guard drops.
    pub fn lease(&self) -> PooledSink {
        PooledSink {
            sink: Some(self.acquire()),
            pool: self.clone(),
        }
    }

    /// Reset `sink` and return it to the free list, or drop it if the free list is full.
    ///
    /// Fails without retaining the sink if it is not checked out of this pool.
    pub fn release(&self, mut sink: ByteSink) -> Result<(), EncodingError> {
        if sink.lease != Some(self.inner.id) {
            tracing::debug!(
                pool = self.inner.id,
                lease = ?sink.lease,
                "Rejecting release of a sink not checked out of this pool"
            );
            return Err(EncodingError::pool_contract_violation(&format!(
                "Sink is not checked out of pool [{}]",
                self.inner.id
            )));
        }
        sink.lease = None;
        sink.reset();
        PoolMetrics::bump(&self.inner.metrics.released);

        let mut free_list = self.inner.free_list.lock();
        if free_list.len() < self.inner.config.max_pooled {
            free_list.push(sink);
            return Ok(());
        }
        drop(free_list);
        PoolMetrics::bump(&self.inner.metrics.discarded);
        tracing::debug!(
            pool = self.inner.id,
            max_pooled = self.inner.config.max_pooled,
            "Sink pool full, discarding released sink"
        );
        Ok(())
    }

    /// Drop every idle sink.
    pub fn clear(&self) {
        let drained = std::mem::take(&mut *self.inner.free_list.lock());
        tracing::debug!(
            pool = self.inner.id,
            dropped = drained.len(),
            "Clearing sink pool"
        );
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let metrics = &self.inner.metrics;
        PoolStats {
            pooled: self.inner.free_list.lock().len(),
            created: metrics.created.load(Ordering::Relaxed),
            acquired: metrics.acquired.load(Ordering::Relaxed),
            released: metrics.released.load(Ordering::Relaxed),
            discarded: metrics.discarded.load(Ordering::Relaxed),
        }
    }
}

/// A sink acquired with [`SinkPool::lease`].
///
/// Dereferences to [`ByteSink`]. When dropped, the sink is released back to its pool.
pub struct PooledSink {
    sink: Option<ByteSink>,
    pool: SinkPool,
}

impl PooledSink {
    /// Keep the sink, preventing its return to the pool.
    #[must_use]
    pub fn detach(mut self) -> ByteSink {
        let mut sink = self.sink.take().expect("sink already taken");
        sink.lease = None;
        sink
    }
}

impl std::ops::Deref for PooledSink {
    type Target = ByteSink;

    fn deref(&self) -> &Self::Target {
        self.sink.as_ref().expect("sink already taken")
    }
}

impl std::ops::DerefMut for PooledSink {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.sink.as_mut().expect("sink already taken")
    }
}

impl Drop for PooledSink {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            if let Err(e) = self.pool.release(sink) {
                tracing::debug!("Failed to return leased sink: {}", e);
            }
        }
    }
}
