#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    // CORS
    pub frontend_urls: Vec<String>,
    // Local storage for uploaded photos and the heatmap GeoJSON files
    pub upload_dir: String,
    pub geo_dir: String,
    // "plaintext" (default) or "argon2"
    pub credential_strategy: String,
    pub admin_key: Option<String>,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|c| c.parse::<u32>().ok())
            .unwrap_or(10);

        let frontend_urls = std::env::var("FRONTEND_URLS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".to_string());
        let geo_dir = std::env::var("GEO_DIR")
            .unwrap_or_else(|_| "geo".to_string());

        let credential_strategy = std::env::var("CREDENTIAL_STRATEGY")
            .unwrap_or_else(|_| "plaintext".to_string());

        let admin_key = std::env::var("ADMIN_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        Config {
            database_url,
            port,
            max_connections,
            frontend_urls: split_origins(&frontend_urls),
            upload_dir,
            geo_dir,
            credential_strategy,
            admin_key,
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_origins() {
        assert_eq!(
            split_origins("http://localhost:5173, https://urban-nest.app/ ,"),
            vec!["http://localhost:5173", "https://urban-nest.app"]
        );
        assert!(split_origins("").is_empty());
    }
}
