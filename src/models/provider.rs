use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::{Database, DbError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceProvider {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub business_name: String,
    pub description: String,
    pub service_categories: Vec<String>,
    pub location: String,
    pub rating: f64,
    pub reviews_count: i32,
    pub hourly_rate: f64,
    pub photos: Vec<String>,
    pub verified: bool,
}

const PROVIDER_COLUMNS: &str =
    "id, user_id, business_name, description, service_categories, location, \
     rating, reviews_count, hourly_rate, photos, verified";

impl ServiceProvider {
    /// Verified providers for a category, best rated first. Surfaces the
    /// backend error so the chat assistant can tell "nobody available"
    /// apart from "backend unreachable".
    pub async fn try_by_category(
        db: &Database,
        category: &str,
        limit: i64,
    ) -> Result<Vec<Self>, DbError> {
        let providers = sqlx::query_as::<_, ServiceProvider>(&format!(
            "SELECT {PROVIDER_COLUMNS}
             FROM service_providers
             WHERE service_categories @> ARRAY[$1] AND verified = true
             ORDER BY rating DESC
             LIMIT $2"
        ))
        .bind(category)
        .bind(limit)
        .fetch_all(&db.pool)
        .await?;

        Ok(providers)
    }

    pub async fn by_category(db: &Database, category: &str, limit: i64) -> Vec<Self> {
        match Self::try_by_category(db, category, limit).await {
            Ok(providers) => providers,
            Err(e) => {
                log::error!("Error fetching service providers for {}: {}", category, e);
                Vec::new()
            }
        }
    }

    /// Case-insensitive partial match over business name, description and
    /// category membership, optionally narrowed by a location substring.
    pub async fn search(db: &Database, term: &str, location: Option<&str>) -> Vec<Self> {
        let pattern = format!("%{}%", term);

        let result = match location {
            Some(location) => {
                sqlx::query_as::<_, ServiceProvider>(&format!(
                    "SELECT {PROVIDER_COLUMNS}
                     FROM service_providers
                     WHERE verified = true
                       AND (business_name ILIKE $1
                            OR description ILIKE $1
                            OR service_categories @> ARRAY[$2])
                       AND location ILIKE $3
                     ORDER BY rating DESC
                     LIMIT 20"
                ))
                .bind(&pattern)
                .bind(term)
                .bind(format!("%{}%", location))
                .fetch_all(&db.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ServiceProvider>(&format!(
                    "SELECT {PROVIDER_COLUMNS}
                     FROM service_providers
                     WHERE verified = true
                       AND (business_name ILIKE $1
                            OR description ILIKE $1
                            OR service_categories @> ARRAY[$2])
                     ORDER BY rating DESC
                     LIMIT 20"
                ))
                .bind(&pattern)
                .bind(term)
                .fetch_all(&db.pool)
                .await
            }
        };

        match result {
            Ok(providers) => providers,
            Err(e) => {
                log::error!("Error searching service providers: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn find(db: &Database, id: Uuid) -> Option<Self> {
        match sqlx::query_as::<_, ServiceProvider>(&format!(
            "SELECT {PROVIDER_COLUMNS}
             FROM service_providers
             WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&db.pool)
        .await {
            Ok(Some(provider)) => Some(provider),
            Ok(None) => {
                log::warn!("Provider {} not found", id);
                None
            }
            Err(e) => {
                log::error!("Error fetching provider {}: {}", id, e);
                None
            }
        }
    }
}
