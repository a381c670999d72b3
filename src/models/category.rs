use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::Database;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceCategory {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl ServiceCategory {
    pub async fn all(db: &Database) -> Vec<Self> {
        match sqlx::query_as::<_, ServiceCategory>(
            "SELECT id, name, description, icon
             FROM service_categories
             ORDER BY name"
        )
        .fetch_all(&db.pool)
        .await {
            Ok(categories) => categories,
            Err(e) => {
                log::error!("Error fetching service categories: {}", e);
                Vec::new()
            }
        }
    }

    /// Emoji shown next to a category name in chat. Closed mapping over the
    /// seeded catalog with a generic fallback for anything unknown.
    pub fn emoji(name: &str) -> &'static str {
        match name {
            "IT & Tech Support" => "💻",
            "Plumbing Services" => "🔧",
            "Electrical Services" => "⚡",
            "HVAC Services" => "🌡️",
            "Car Repair & Maintenance" => "🚗",
            "House Cleaning" => "🧹",
            "Painting Services" => "🎨",
            "General Handyman" => "🛠️",
            "Laundry Services" => "🧺",
            _ => "📋",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_have_icons() {
        assert_eq!(ServiceCategory::emoji("Plumbing Services"), "🔧");
        assert_eq!(ServiceCategory::emoji("Laundry Services"), "🧺");
    }

    #[test]
    fn unknown_category_falls_back() {
        assert_eq!(ServiceCategory::emoji("Dog Walking"), "📋");
    }
}
