use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teloxide::types::ChatId;
use uuid::Uuid;

use crate::database::{Database, DbError};
use crate::models::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "in_progress" => BookingStatus::InProgress,
            "completed" => BookingStatus::Completed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "⏳",
            BookingStatus::Confirmed => "✅",
            BookingStatus::InProgress => "🔧",
            BookingStatus::Completed => "🏁",
            BookingStatus::Cancelled => "❌",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::InProgress => "In progress",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub provider_id: Uuid,
    pub service_category: String,
    pub description: String,
    pub location: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub status: String,
    pub estimated_cost: Option<f64>,
    pub notes: Option<String>,
    pub urgency_level: Option<String>,
    pub estimated_duration: Option<String>,
    pub contact_preference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record shape built by the booking forms and inserted as-is. The server
/// assigns the id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub provider_id: Uuid,
    pub service_category: String,
    pub description: String,
    pub location: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub status: BookingStatus,
    pub estimated_cost: Option<f64>,
    pub notes: Option<String>,
    pub urgency_level: Option<String>,
    pub estimated_duration: Option<String>,
    pub contact_preference: Option<String>,
}

/// A booking joined with the provider display fields the list screen shows.
#[derive(Debug, Clone, FromRow)]
pub struct BookingWithProvider {
    pub id: Uuid,
    pub service_category: String,
    pub description: String,
    pub location: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub status: String,
    pub estimated_cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub provider_name: String,
    pub provider_rating: f64,
}

impl Booking {
    pub fn status(&self) -> BookingStatus {
        BookingStatus::from_str(&self.status)
    }

    /// Inserts a booking for the current user and returns the persisted row.
    pub async fn create(db: &Database, chat_id: ChatId, data: &NewBooking) -> Result<Booking, DbError> {
        let profile = Profile::find_by_chat_id(db, chat_id).await?;
        let Some(profile) = profile else {
            return Err(DbError::NotAuthenticated);
        };

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings
                (client_id, provider_id, service_category, description, location,
                 scheduled_date, scheduled_time, status, estimated_cost, notes,
                 urgency_level, estimated_duration, contact_preference)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, client_id, provider_id, service_category, description,
                      location, scheduled_date, scheduled_time, status,
                      estimated_cost, notes, urgency_level, estimated_duration,
                      contact_preference, created_at, updated_at
            "#,
        )
        .bind(profile.id)
        .bind(data.provider_id)
        .bind(&data.service_category)
        .bind(&data.description)
        .bind(&data.location)
        .bind(&data.scheduled_date)
        .bind(&data.scheduled_time)
        .bind(data.status.as_str())
        .bind(data.estimated_cost)
        .bind(&data.notes)
        .bind(&data.urgency_level)
        .bind(&data.estimated_duration)
        .bind(&data.contact_preference)
        .fetch_one(&db.pool)
        .await?;

        log::info!("📋 Booking {} created for user {}", booking.id, chat_id);
        Ok(booking)
    }

    pub async fn update_status(db: &Database, id: Uuid, status: BookingStatus) -> Result<(), DbError> {
        sqlx::query("UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&db.pool)
            .await?;

        Ok(())
    }

    /// The current user's bookings, newest first.
    pub async fn for_client(db: &Database, chat_id: ChatId) -> Vec<BookingWithProvider> {
        match sqlx::query_as::<_, BookingWithProvider>(
            r#"
            SELECT b.id, b.service_category, b.description, b.location,
                   b.scheduled_date, b.scheduled_time, b.status, b.estimated_cost,
                   b.created_at,
                   p.business_name AS provider_name,
                   p.rating AS provider_rating
            FROM bookings b
            JOIN service_providers p ON p.id = b.provider_id
            JOIN profiles pr ON pr.id = b.client_id
            WHERE pr.chat_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(chat_id.0)
        .fetch_all(&db.pool)
        .await {
            Ok(bookings) => bookings,
            Err(e) => {
                log::error!("Error fetching bookings for user {}: {}", chat_id, e);
                Vec::new()
            }
        }
    }
}

impl BookingWithProvider {
    pub fn status(&self) -> BookingStatus {
        BookingStatus::from_str(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::InProgress,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_defaults_to_pending() {
        assert_eq!(BookingStatus::from_str("paused"), BookingStatus::Pending);
    }
}
