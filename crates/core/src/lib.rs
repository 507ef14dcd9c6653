pub mod domain;
pub mod recommend;
pub mod reference;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    pub const DEFAULT_CROP_TABLE_PATH: &str = "data/crop_nutrient_ideal_values.csv";
    pub const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub crop_table_path: PathBuf,
        pub port: u16,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let crop_table_path = std::env::var("CROP_TABLE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CROP_TABLE_PATH));

            let port = match std::env::var("PORT").ok() {
                Some(v) => v
                    .trim()
                    .parse()
                    .with_context(|| format!("PORT must be a valid port number (got {v:?})"))?,
                None => DEFAULT_PORT,
            };

            Ok(Self {
                crop_table_path,
                port,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }
    }
}
