// SPDX-License-Identifier: GPL-3.0-only
use crate::config::Config;
use crate::registry::{PlotData, SqliteStore};

/// Create an in-memory SQLite database for testing
pub async fn setup_test_database() -> anyhow::Result<SqliteStore> {
    SqliteStore::in_memory().await
}

/// Create a test configuration with temporary paths
pub fn create_test_config() -> Config {
    use std::net::SocketAddr;
    use std::str::FromStr;

    let temp_dir = std::env::temp_dir().join(format!("plotscart-test-{}", uuid::Uuid::new_v4()));

    Config {
        registry_db_path: temp_dir.join("test_plots.db"),
        local_api_bind: SocketAddr::from_str("127.0.0.1:0").unwrap(), // Use port 0 to auto-assign
        log_level: "error".to_string(), // Reduce log noise in tests
        log_json: false,
        cors_allowed_origin: Some("http://localhost:3000".to_string()),
    }
}

/// A valid payload; callers tweak individual fields
pub fn sample_plot_data(title: &str) -> PlotData {
    PlotData {
        title: title.to_string(),
        dimensions: "30x40 sqft".to_string(),
        location: "Koramangala, Bangalore".to_string(),
        price: "₹45 Lakhs".to_string(),
        owner_name: "Rajesh Kumar".to_string(),
        phone_number: "7780270405".to_string(),
        whatsapp_number: "7780270405".to_string(),
        images: vec![
            "https://images.example.com/plot-front.jpg".to_string(),
            "https://images.example.com/plot-road.jpg".to_string(),
        ],
        description: Some("Clear title, ready for registration.".to_string()),
    }
}
