use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: PgPool,
}

// Plain error type without external dependencies. Reads degrade to empty
// collections at the call sites; writes hand this back to the caller.
#[derive(Debug)]
pub enum DbError {
    Database(String),
    NotAuthenticated,
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::Database(e) => write!(f, "Database error: {}", e),
            DbError::NotAuthenticated => write!(f, "User not authenticated"),
        }
    }
}

impl std::error::Error for DbError {}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Database(err.to_string())
    }
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn init(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Client profiles, keyed by the Telegram chat id
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                chat_id BIGINT NOT NULL UNIQUE,
                email TEXT,
                full_name TEXT NOT NULL DEFAULT '',
                phone TEXT,
                address TEXT,
                user_type TEXT NOT NULL DEFAULT 'client',
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Read-only reference data for the services catalog
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS service_categories (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL,
                icon TEXT NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Providers are owned by the backend; the bot only reads them
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS service_providers (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID,
                business_name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                service_categories TEXT[] NOT NULL DEFAULT '{}',
                location TEXT NOT NULL DEFAULT '',
                rating DOUBLE PRECISION NOT NULL DEFAULT 0,
                reviews_count INTEGER NOT NULL DEFAULT 0,
                hourly_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
                photos TEXT[] NOT NULL DEFAULT '{}',
                verified BOOLEAN NOT NULL DEFAULT false,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                client_id UUID NOT NULL REFERENCES profiles (id),
                provider_id UUID NOT NULL REFERENCES service_providers (id),
                service_category TEXT NOT NULL,
                description TEXT NOT NULL,
                location TEXT NOT NULL,
                scheduled_date TEXT NOT NULL,
                scheduled_time TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                estimated_cost DOUBLE PRECISION,
                notes TEXT,
                urgency_level TEXT,
                estimated_duration TEXT,
                contact_preference TEXT,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Seed the catalog categories
        sqlx::query(
            r#"
            INSERT INTO service_categories (name, description, icon)
            VALUES
                ('IT & Tech Support', 'Computer repair, network setup, smart home installation, and tech troubleshooting', 'monitor'),
                ('Plumbing Services', 'Leak repair, drain cleaning, fixture installation, and water heater services', 'wrench'),
                ('Electrical Services', 'Outlet installation, lighting repair, wiring, and electrical safety', 'zap'),
                ('HVAC Services', 'AC repair/installation, heating system maintenance, and duct cleaning', 'thermometer'),
                ('Car Repair & Maintenance', 'Engine diagnostics, brake repair, oil changes, and general automotive maintenance', 'car'),
                ('House Cleaning', 'Regular cleaning, deep cleaning, and move-in/out cleaning services', 'sparkles'),
                ('Painting Services', 'Interior and exterior painting for residential and commercial properties', 'paint-roller'),
                ('General Handyman', 'Home repairs, furniture assembly, and general maintenance tasks', 'hammer'),
                ('Laundry Services', 'Wash & fold, ironing, delicates, and bulky item cleaning with pickup', 'package')
            ON CONFLICT (name) DO UPDATE SET
                description = EXCLUDED.description,
                icon = EXCLUDED.icon
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_profiles_chat_id ON profiles (chat_id)"
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_providers_verified ON service_providers (verified)"
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_providers_rating ON service_providers (rating)"
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_providers_categories ON service_providers USING GIN (service_categories)"
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookings_client_id ON bookings (client_id)"
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings (status)"
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookings_created_at ON bookings (created_at)"
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
