use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Deployment target for the SimAtomic platform API.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    /// Local development server.
    Local,
    /// The hosted SimAtomic platform.
    #[default]
    Production,
    /// An explicit base URL, e.g. a mock service in tests.
    Custom { base_url: String },
}

impl Environment {
    /// Get the API base URL associated with the environment.
    pub fn api_base_url(&self) -> String {
        match self {
            Environment::Local => "http://localhost:8080/api/api_handler".to_string(),
            Environment::Production => "https://app.simatomic.com/api/api_handler".to_string(),
            Environment::Custom { base_url } => base_url.clone(),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    /// Accepts the named environments, or a base URL for a custom one, so
    /// the string form produced by `Display` always parses back.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Environment::Custom {
                base_url: s.to_string(),
            });
        }
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "local"),
            Environment::Production => write!(f, "production"),
            Environment::Custom { base_url } => write!(f, "{}", base_url),
        }
    }
}
