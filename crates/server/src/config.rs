use strip_ansi_escapes::strip;

pub const DEFAULT_PORT: u16 = 5001;
const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Reads `DATABASE_URL`, `HOST` and `BACKEND_PORT`/`PORT` from the environment.
    pub fn from_env() -> std::io::Result<Self> {
        let database_url = match non_empty_var("DATABASE_URL") {
            Some(url) => url,
            None => {
                let url = utils::assets::default_database_url()?;
                tracing::info!("No DATABASE_URL set, using {}", url);
                url
            }
        };

        let port = non_empty_var("BACKEND_PORT")
            .or_else(|| non_empty_var("PORT"))
            .map(|raw| {
                parse_port(&raw).unwrap_or_else(|| {
                    tracing::warn!("Invalid port {:?}, falling back to {}", raw, DEFAULT_PORT);
                    DEFAULT_PORT
                })
            })
            .unwrap_or(DEFAULT_PORT);

        let host = non_empty_var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self {
            database_url,
            host,
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Ports sometimes arrive wrapped in terminal colour codes from dev tooling.
fn parse_port(raw: &str) -> Option<u16> {
    let cleaned = String::from_utf8(strip(raw.as_bytes())).ok()?;
    cleaned.trim().parse::<u16>().ok()
}
