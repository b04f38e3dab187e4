use serde::{Deserialize, Serialize};

/// Per-user state threaded through the event handlers.
///
/// Handlers take the state by value and hand back the updated one; nothing is kept
/// between calls apart from what the caller stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Pollutants to chart. `None` until the user first changes the filter, meaning
    /// every pollutant is displayed.
    pollutant_filter: Option<Vec<String>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_pollutant_filter(pollutants: Vec<String>) -> Self {
        Self {
            pollutant_filter: Some(pollutants),
        }
    }

    pub fn pollutant_filter(&self) -> Option<&[String]> {
        self.pollutant_filter.as_deref()
    }

    pub fn displays(&self, pollutant: &str) -> bool {
        self.pollutant_filter
            .as_ref()
            .map_or(true, |filter| filter.iter().any(|p| p == pollutant))
    }
}

/// The user changed the pollutant checklist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterChanged {
    pub pollutants: Vec<String>,
}

/// The user changed the set of selected map points.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SelectionChanged {
    /// Station names as labelled on the map.
    pub selected: Vec<String>,
    /// Current checklist value when the event carries one.
    #[serde(default)]
    pub pollutants: Option<Vec<String>>,
}
