pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_api_url(std::env::var("KANBAN_API_URL").ok().as_deref())
    }

    fn from_api_url(value: Option<&str>) -> Self {
        let api_url = value
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();
        Self { api_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_local_backend() {
        assert_eq!(ClientConfig::from_api_url(None).api_url, DEFAULT_API_URL);
        assert_eq!(ClientConfig::from_api_url(Some("  ")).api_url, DEFAULT_API_URL);
    }

    #[test]
    fn strips_trailing_slash() {
        let config = ClientConfig::from_api_url(Some("http://kanban.internal:8080/api/"));
        assert_eq!(config.api_url, "http://kanban.internal:8080/api");
    }
}
