use serde::{Deserialize, Serialize};

/// Where a preload pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Server-side rendering; redirects abort the render and errors are rethrown.
    Server,
    /// Browser runtime; redirects become new navigations and errors are logged.
    Client,
}

impl Environment {
    pub fn is_server(self) -> bool {
        matches!(self, Self::Server)
    }

    pub fn is_client(self) -> bool {
        matches!(self, Self::Client)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Client => "client",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
