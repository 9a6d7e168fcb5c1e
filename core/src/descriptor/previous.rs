use std::sync::Arc;

use crate::location::{Location, RouteParams};
use crate::navigation::{MatchedRoute, RouteComponent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub component_id: String,
    pub params: RouteParams,
}

/// The components matched by the previous navigation, owned by whoever
/// drives navigations and passed explicitly to the descriptor builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviousRoutes {
    entries: Vec<RouteEntry>,
    search: String,
}

impl PreviousRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(route: &MatchedRoute, location: &Location) -> Self {
        Self {
            entries: route
                .components
                .iter()
                .map(|c| RouteEntry {
                    component_id: c.id().to_string(),
                    params: route.params.clone(),
                })
                .collect(),
            search: location.search.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Number of leading components whose identity and params match.
    pub fn unchanged_prefix(
        &self,
        components: &[Arc<dyn RouteComponent>],
        params: &RouteParams,
    ) -> usize {
        components
            .iter()
            .zip(&self.entries)
            .take_while(|(c, entry)| c.id() == entry.component_id && *params == entry.params)
            .count()
    }
}
