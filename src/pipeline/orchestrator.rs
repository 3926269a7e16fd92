//! One query cycle: cache lookup, resolution, fetch, state transition
//!
//! A cycle is split in three so several can be in flight while the
//! orchestrator stays exclusively owned:
//!
//! - [`QueryOrchestrator::begin`] bumps the generation and moves to `Loading`,
//!   answering straight from the cache on a hit.
//! - [`Pipeline::execute`] does the network work and borrows nothing mutable.
//! - [`QueryOrchestrator::complete`] applies the outcome, but only if no newer
//!   query has begun since.

use std::sync::Arc;

use crate::domain::{AggregatedResult, QueryKey, QueryState};
use crate::error::QueryError;
use crate::infrastructure::ethereum::ChainDataProvider;
use crate::pipeline::cache::{CachedResult, ResultCache};
use crate::pipeline::fetcher::BalanceFetcher;
use crate::pipeline::resolver::AddressResolver;

/// Handle for a query that missed the cache and needs the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    key: QueryKey,
}

impl QueryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// What `begin` did with a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Begin {
    /// Served from the cache; state is already `Success`
    Cached { generation: u64 },
    /// State is `Loading`; run the ticket through [`Pipeline::execute`]
    Pending(QueryTicket),
}

pub type QueryOutcome = Result<AggregatedResult, QueryError>;

/// The network half of a cycle, cheap to clone into a task
#[derive(Clone)]
pub struct Pipeline {
    resolver: AddressResolver,
    fetcher: BalanceFetcher,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn ChainDataProvider>, metadata_concurrency: Option<usize>) -> Self {
        Self {
            resolver: AddressResolver::new(Arc::clone(&provider)),
            fetcher: BalanceFetcher::new(provider).with_concurrency(metadata_concurrency),
        }
    }

    pub async fn execute(&self, key: &QueryKey) -> QueryOutcome {
        let owner = self.resolver.resolve(key).await?;
        self.fetcher.fetch(owner).await
    }
}

/// Owns the session's query state and result cache
pub struct QueryOrchestrator {
    pipeline: Pipeline,
    cache: ResultCache,
    state: QueryState,
    generation: u64,
}

impl QueryOrchestrator {
    pub fn new(provider: Arc<dyn ChainDataProvider>) -> Self {
        Self::with_pipeline(Pipeline::new(provider, None))
    }

    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            cache: ResultCache::new(),
            state: QueryState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Generation of the most recent trigger
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn pipeline(&self) -> Pipeline {
        self.pipeline.clone()
    }

    /// Start a new cycle, superseding any in flight
    pub fn begin(&mut self, key: QueryKey) -> Begin {
        self.generation += 1;
        let generation = self.generation;

        if let Some(cached) = self.cache.lookup(&key) {
            tracing::info!(query = %key, generation, "cache hit");
            self.state = QueryState::Success(cached.result);
            return Begin::Cached { generation };
        }

        tracing::info!(query = %key, generation, "cache miss, querying provider");
        self.state = QueryState::Loading;
        Begin::Pending(QueryTicket { generation, key })
    }

    /// Apply a finished cycle. Returns false, changing nothing, when the
    /// ticket was superseded by a newer `begin`.
    pub fn complete(&mut self, ticket: QueryTicket, outcome: QueryOutcome) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                query = %ticket.key,
                stale = ticket.generation,
                current = self.generation,
                "dropping superseded query result"
            );
            return false;
        }

        self.state = match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                tracing::info!(
                    query = %ticket.key,
                    owner = %result.owner(),
                    tokens = result.len(),
                    "query succeeded"
                );
                self.cache
                    .store(ticket.key, CachedResult::new(Arc::clone(&result)));
                QueryState::Success(result)
            }
            Err(err) => {
                tracing::warn!(query = %ticket.key, kind = ?err.kind(), "query failed: {}", err);
                QueryState::Failure(err.kind(), err.to_string())
            }
        };
        true
    }

    /// Run a whole cycle for callers that issue one query at a time
    pub async fn run(&mut self, key: QueryKey) -> &QueryState {
        if let Begin::Pending(ticket) = self.begin(key) {
            let outcome = self.pipeline.execute(ticket.key()).await;
            self.complete(ticket, outcome);
        }
        &self.state
    }
}
