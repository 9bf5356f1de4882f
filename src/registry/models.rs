// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// User identifier used when the caller is not authenticated
pub const GUEST_USER_ID: &str = "guest";

/// Store-assigned plot identifier
pub type PlotId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    /// Unique identifier for the plot
    pub id: PlotId,

    /// Listing headline
    pub title: String,

    /// Free-form dimensions, e.g. "30x40 sqft"
    pub dimensions: String,

    pub location: String,

    /// Display price, kept as entered (e.g. "₹45 Lakhs")
    pub price: String,

    pub owner_name: String,

    /// 10-digit phone number
    pub phone_number: String,

    /// 10-digit WhatsApp number
    pub whatsapp_number: String,

    /// Image URLs in display order
    pub images: Vec<String>,

    pub description: Option<String>,

    /// Creation timestamp, never changed after insert
    #[serde(rename = "postedDate")]
    pub posted_at: DateTime<Utc>,

    /// False once the plot has been soft-deleted
    pub is_active: bool,
}

impl Plot {
    /// Pre-filled WhatsApp chat link for contacting the owner
    pub fn whatsapp_link(&self) -> String {
        format!(
            "https://wa.me/91{}?text=Hi, I'm interested in your plot: {}",
            self.whatsapp_number, self.title
        )
    }
}

/// Client-supplied plot fields for create and update.
///
/// Missing or `null` fields deserialize as empty so validation can report them
/// by name instead of failing at the JSON layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlotData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dimensions: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: String,
    #[serde(deserialize_with = "null_as_default")]
    pub owner_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub whatsapp_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    pub description: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single (user, plot) wishlist association.
///
/// Holds the plot id only; the plot itself is looked up on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub id: i64,
    pub user_id: String,
    pub plot_id: PlotId,
    #[serde(rename = "addedDate")]
    pub added_at: DateTime<Utc>,
}

/// Validation failure for one payload field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as it appears in JSON payloads
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_plot() -> Plot {
        Plot {
            id: 7,
            title: "Prime Commercial Plot in BTM Layout".to_string(),
            dimensions: "30x40 sqft".to_string(),
            location: "BTM Layout, Bangalore".to_string(),
            price: "₹45 Lakhs".to_string(),
            owner_name: "Rajesh Kumar".to_string(),
            phone_number: "7780270405".to_string(),
            whatsapp_number: "9876543210".to_string(),
            images: vec![
                "https://images.example.com/a.jpg".to_string(),
                "https://images.example.com/b.jpg".to_string(),
            ],
            description: Some("Excellent commercial plot".to_string()),
            posted_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_whatsapp_link() {
        let plot = sample_plot();
        assert_eq!(
            plot.whatsapp_link(),
            "https://wa.me/919876543210?text=Hi, I'm interested in your plot: Prime Commercial Plot in BTM Layout"
        );
    }

    #[test]
    fn test_plot_serialize_json() {
        let json = serde_json::to_string(&sample_plot()).unwrap();
        assert!(json.contains("\"id\":7"));
        assert!(json.contains("\"ownerName\":\"Rajesh Kumar\""));
        assert!(json.contains("\"phoneNumber\":\"7780270405\""));
        assert!(json.contains("\"whatsappNumber\":\"9876543210\""));
        assert!(json.contains("\"postedDate\":\"2024-01-01T00:00:00Z\""));
        assert!(json.contains("\"isActive\":true"));
    }

    #[test]
    fn test_plot_data_missing_fields_default_to_blank() {
        let data: PlotData = serde_json::from_str(r#"{"title": "Corner plot"}"#).unwrap();
        assert_eq!(data.title, "Corner plot");
        assert_eq!(data.location, "");
        assert_eq!(data.phone_number, "");
        assert!(data.images.is_empty());
        assert_eq!(data.description, None);
    }

    #[test]
    fn test_plot_data_null_fields_become_blank() {
        let data: PlotData =
            serde_json::from_str(r#"{"title": null, "location": "x", "images": null, "description": null}"#).unwrap();
        assert_eq!(data.title, "");
        assert_eq!(data.location, "x");
        assert!(data.images.is_empty());
        assert_eq!(data.description, None);
    }

    #[test]
    fn test_plot_data_deserialize_camel_case() {
        let json = r#"{
            "title": "Residential Plot near Electronic City",
            "dimensions": "40x60 sqft",
            "location": "Electronic City, Bangalore",
            "price": "₹32 Lakhs",
            "ownerName": "Priya Sharma",
            "phoneNumber": "7780270405",
            "whatsappNumber": "7780270405",
            "images": ["https://images.example.com/1.jpg"],
            "description": "Clear title"
        }"#;

        let data: PlotData = serde_json::from_str(json).unwrap();
        assert_eq!(data.owner_name, "Priya Sharma");
        assert_eq!(data.whatsapp_number, "7780270405");
        assert_eq!(data.images, vec!["https://images.example.com/1.jpg".to_string()]);
        assert_eq!(data.description.as_deref(), Some("Clear title"));
    }

    #[test]
    fn test_wishlist_entry_serialize_json() {
        let entry = WishlistEntry {
            id: 3,
            user_id: GUEST_USER_ID.to_string(),
            plot_id: 7,
            added_at: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"userId\":\"guest\""));
        assert!(json.contains("\"plotId\":7"));
        assert!(json.contains("\"addedDate\":\"2024-02-01T12:00:00Z\""));
    }
}
