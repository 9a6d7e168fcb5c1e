use serde::Serialize;

use crate::location::Location;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreloadTiming {
    /// Milliseconds spent executing the chain.
    pub preload: u64,
}

/// Timing report for one finished preload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreloadStats {
    pub url: String,
    pub route: String,
    pub time: PreloadTiming,
}

/// Fire-and-forget statistics sink.
pub trait StatsReporter: Send + Sync {
    fn report(&self, stats: PreloadStats);
}

impl<F> StatsReporter for F
where
    F: Fn(PreloadStats) + Send + Sync,
{
    fn report(&self, stats: PreloadStats) {
        self(stats)
    }
}

/// Called once per non-initial navigation, before loading starts.
pub trait NavigateHook: Send + Sync {
    fn on_navigate(&self, location: &Location);
}

impl<F> NavigateHook for F
where
    F: Fn(&Location) + Send + Sync,
{
    fn on_navigate(&self, location: &Location) {
        self(location)
    }
}
