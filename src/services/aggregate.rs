//! Concurrent fan-out of independent lookups.
//!
//! An [`Aggregator`] collects named read operations, runs them all at once and joins
//! their results into one [`Aggregated`] bag. The first failure to arrive wins: the
//! remaining lookups are dropped and no partial results are handed out.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};

use crate::error::{AppError, AppResult};

type Lookup<'a> = BoxFuture<'a, AppResult<Box<dyn Any + Send>>>;

/// Builder for a set of independent, named lookups
#[derive(Default)]
pub struct Aggregator<'a> {
    lookups: Vec<(&'static str, Lookup<'a>)>,
}

impl<'a> Aggregator<'a> {
    pub fn new() -> Self {
        Self { lookups: Vec::new() }
    }

    /// Register a lookup under `name`. Nothing runs until [`Aggregator::run`].
    pub fn add<T, F>(mut self, name: &'static str, lookup: F) -> Self
    where
        T: Send + 'static,
        F: Future<Output = AppResult<T>> + Send + 'a,
    {
        let lookup = lookup
            .map(|result| result.map(|value| Box::new(value) as Box<dyn Any + Send>))
            .boxed();
        self.lookups.push((name, lookup));
        self
    }

    /// Run every lookup concurrently. Resolves once all have succeeded, or with the
    /// first error observed.
    pub async fn run(self) -> AppResult<Aggregated> {
        let mut seen = HashSet::with_capacity(self.lookups.len());
        if let Some((name, _)) = self.lookups.iter().find(|(name, _)| !seen.insert(*name)) {
            return Err(AppError::Internal(format!("Duplicate lookup name: {}", name)));
        }

        let total = self.lookups.len();
        let mut pending: FuturesUnordered<_> = self
            .lookups
            .into_iter()
            .map(|(name, lookup)| lookup.map(move |result| (name, result)))
            .collect();

        let mut values = HashMap::with_capacity(total);
        while let Some((name, result)) = pending.next().await {
            match result {
                Ok(value) => {
                    values.insert(name, value);
                }
                Err(e) => {
                    tracing::debug!(lookup = name, error = %e, "Aggregate lookup failed");
                    return Err(e);
                }
            }
        }

        Ok(Aggregated { values })
    }
}

/// Results of a successful aggregate, keyed by lookup name
#[derive(Default)]
pub struct Aggregated {
    values: HashMap<&'static str, Box<dyn Any + Send>>,
}

impl Aggregated {
    /// Move a result out of the bag
    pub fn take<T: 'static>(&mut self, name: &str) -> AppResult<T> {
        let value = self
            .values
            .remove(name)
            .ok_or_else(|| AppError::Internal(format!("No lookup named {}", name)))?;
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| AppError::Internal(format!("Lookup {} has an unexpected type", name)))
    }
}
