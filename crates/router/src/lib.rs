//! Endpoint selection for a provider's configured endpoint list.
//!
//! A provider may have more than one endpoint (e.g. a primary and a
//! failover region). [`EndpointRouter`] hands out one URL per call, round
//! robin among the currently-healthy set, thread-safe across concurrent
//! callers.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub weight: u32,
    pub healthy: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("provider has no configured endpoints")]
    NoEndpoints,
    #[error("provider has no healthy endpoints")]
    NoHealthyEndpoints,
}

/// Per-provider round-robin counters. `next` recomputes the healthy subset
/// on every call so a health-check flipping an endpoint takes effect
/// immediately, without invalidating the counter.
#[derive(Debug, Default)]
pub struct EndpointRouter {
    counters: DashMap<String, AtomicUsize>,
}

impl EndpointRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the next endpoint URL for `provider_id` from `endpoints`.
    ///
    /// Returns [`Error::NoHealthyEndpoints`] when every endpoint is marked
    /// unhealthy; callers that want a last-resort fallback should catch
    /// that case and retry with the full (possibly unhealthy) set
    /// themselves rather than have the router silently paper over it.
    pub fn next<'a>(&self, provider_id: &str, endpoints: &'a [Endpoint]) -> Result<&'a str, Error> {
        if endpoints.is_empty() {
            return Err(Error::NoEndpoints);
        }

        let healthy: Vec<&Endpoint> = endpoints.iter().filter(|e| e.healthy).collect();

        if healthy.is_empty() {
            return Err(Error::NoHealthyEndpoints);
        }

        let counter = self.counters.entry(provider_id.to_string()).or_insert_with(|| AtomicUsize::new(0));
        let index = counter.fetch_add(1, Ordering::Relaxed) % healthy.len();

        Ok(healthy[index].url.as_str())
    }

    /// Clears every provider's counter. Safe to call while `next` is in
    /// flight on other providers; a concurrent `next` on the same provider
    /// just restarts its rotation from whatever index it lands on.
    pub fn reset(&self) {
        self.counters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(url: &str, healthy: bool) -> Endpoint {
        Endpoint { url: url.to_string(), weight: 1, healthy }
    }

    #[test]
    fn empty_endpoints_is_an_error() {
        let router = EndpointRouter::new();
        assert_eq!(router.next("p1", &[]), Err(Error::NoEndpoints));
    }

    #[test]
    fn all_unhealthy_is_an_error() {
        let router = EndpointRouter::new();
        let endpoints = vec![endpoint("https://a", false), endpoint("https://b", false)];
        assert_eq!(router.next("p1", &endpoints), Err(Error::NoHealthyEndpoints));
    }

    #[test]
    fn rotates_round_robin_across_healthy_endpoints() {
        let router = EndpointRouter::new();
        let endpoints = vec![endpoint("https://a", true), endpoint("https://b", true)];

        let first = router.next("p1", &endpoints).unwrap();
        let second = router.next("p1", &endpoints).unwrap();
        let third = router.next("p1", &endpoints).unwrap();

        assert_eq!(first, "https://a");
        assert_eq!(second, "https://b");
        assert_eq!(third, "https://a");
    }

    #[test]
    fn skips_unhealthy_endpoints() {
        let router = EndpointRouter::new();
        let endpoints = vec![endpoint("https://a", false), endpoint("https://b", true)];

        for _ in 0..3 {
            assert_eq!(router.next("p1", &endpoints).unwrap(), "https://b");
        }
    }

    #[test]
    fn counters_are_independent_per_provider() {
        let router = EndpointRouter::new();
        let endpoints = vec![endpoint("https://a", true), endpoint("https://b", true)];

        assert_eq!(router.next("p1", &endpoints).unwrap(), "https://a");
        assert_eq!(router.next("p2", &endpoints).unwrap(), "https://a");
        assert_eq!(router.next("p1", &endpoints).unwrap(), "https://b");
    }

    #[test]
    fn reset_restarts_rotation() {
        let router = EndpointRouter::new();
        let endpoints = vec![endpoint("https://a", true), endpoint("https://b", true)];

        router.next("p1", &endpoints).unwrap();
        router.reset();

        assert_eq!(router.next("p1", &endpoints).unwrap(), "https://a");
    }
}
