use serde::{Deserialize, Serialize};

use crate::forms::{to_24_hour, TextField, ValidationError};
use crate::models::{BookingStatus, NewBooking, ServiceProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Emergency,
    Urgent,
    Normal,
    Flexible,
}

impl Urgency {
    pub const ALL: [Urgency; 4] = [
        Urgency::Emergency,
        Urgency::Urgent,
        Urgency::Normal,
        Urgency::Flexible,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            Urgency::Emergency => "emergency",
            Urgency::Urgent => "urgent",
            Urgency::Normal => "normal",
            Urgency::Flexible => "flexible",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Emergency => "Emergency",
            Urgency::Urgent => "Urgent (Same Day)",
            Urgency::Normal => "Normal",
            Urgency::Flexible => "Flexible",
        }
    }

    pub fn surcharge(&self) -> f64 {
        match self {
            Urgency::Emergency => 100.0,
            Urgency::Urgent => 50.0,
            Urgency::Normal => 0.0,
            Urgency::Flexible => -25.0,
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.value() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPreference {
    Phone,
    Message,
}

impl ContactPreference {
    pub fn value(&self) -> &'static str {
        match self {
            ContactPreference::Phone => "phone",
            ContactPreference::Message => "message",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactPreference::Phone => "📞 Phone",
            ContactPreference::Message => "💬 Message",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "phone" => Some(ContactPreference::Phone),
            "message" => Some(ContactPreference::Message),
            _ => None,
        }
    }
}

pub const DURATION_OPTIONS: [&str; 6] = [
    "30 minutes - 1 hour",
    "1-2 hours",
    "2-4 hours",
    "4-6 hours",
    "Full day (8+ hours)",
    "Multiple days",
];

/// Draft state of the general-service booking form. Fields default to the
/// same values the form resets to after a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralBookingForm {
    pub provider: ServiceProvider,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    pub urgency: Urgency,
    pub duration: String,
    pub contact: ContactPreference,
    pub awaiting: Option<TextField>,
    pub submitting: bool,
}

impl GeneralBookingForm {
    pub fn new(provider: ServiceProvider) -> Self {
        Self {
            provider,
            date: String::new(),
            time: String::new(),
            location: String::new(),
            description: String::new(),
            urgency: Urgency::Normal,
            duration: "1-2 hours".to_string(),
            contact: ContactPreference::Phone,
            awaiting: None,
            submitting: false,
        }
    }

    /// Two-hour minimum at the provider's hourly rate, plus the urgency
    /// surcharge. Recomputed on every render, never stored on the draft.
    pub fn estimated_cost(&self) -> f64 {
        self.provider.hourly_rate * 2.0 + self.urgency.surcharge()
    }

    pub fn notes(&self) -> String {
        let mut lines = vec![
            format!("Urgency Level: {}", self.urgency.value()),
            format!("Estimated Duration: {}", self.duration),
            format!("Contact Preference: {}", self.contact.value()),
        ];
        if self.urgency != Urgency::Normal {
            lines.push(format!("Urgency Surcharge: ₱{}", self.urgency.surcharge() as i64));
        }
        lines.join("\n")
    }

    /// First failure wins, in the order the form presents its fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.date.is_empty() {
            return Err(ValidationError("Please select a service date"));
        }
        if self.time.is_empty() {
            return Err(ValidationError("Please select a preferred time"));
        }
        if self.location.trim().is_empty() {
            return Err(ValidationError("Please enter the service location"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError("Please describe the service needed"));
        }
        Ok(())
    }

    /// Validates and converts the draft into the record submitted to the
    /// backend. Client bookings always start out pending.
    pub fn to_record(&self) -> Result<NewBooking, ValidationError> {
        self.validate()?;
        let scheduled_time = to_24_hour(&self.time)
            .ok_or(ValidationError("Please select a preferred time"))?;

        Ok(NewBooking {
            provider_id: self.provider.id,
            service_category: self
                .provider
                .service_categories
                .first()
                .cloned()
                .unwrap_or_default(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            scheduled_date: self.date.clone(),
            scheduled_time,
            status: BookingStatus::Pending,
            estimated_cost: Some(self.estimated_cost()),
            notes: Some(self.notes()),
            urgency_level: Some(self.urgency.value().to_string()),
            estimated_duration: Some(self.duration.clone()),
            contact_preference: Some(self.contact.value().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn provider(hourly_rate: f64) -> ServiceProvider {
        ServiceProvider {
            id: Uuid::new_v4(),
            user_id: None,
            business_name: "Quick Plumb Pro".to_string(),
            description: "Licensed plumbing".to_string(),
            service_categories: vec!["Plumbing Services".to_string()],
            location: "Quezon City".to_string(),
            rating: 4.7,
            reviews_count: 120,
            hourly_rate,
            photos: Vec::new(),
            verified: true,
        }
    }

    fn filled_form(hourly_rate: f64) -> GeneralBookingForm {
        let mut form = GeneralBookingForm::new(provider(hourly_rate));
        form.date = "2025-02-10".to_string();
        form.time = "2:00 PM".to_string();
        form.location = "123 Test St".to_string();
        form.description = "fix sink".to_string();
        form
    }

    #[test]
    fn cost_is_two_hours_plus_surcharge() {
        let mut form = filled_form(100.0);
        for (urgency, expected) in [
            (Urgency::Emergency, 300.0),
            (Urgency::Urgent, 250.0),
            (Urgency::Normal, 200.0),
            (Urgency::Flexible, 175.0),
        ] {
            form.urgency = urgency;
            assert_eq!(form.estimated_cost(), expected);
        }
    }

    #[test]
    fn cost_holds_at_zero_rate() {
        let mut form = filled_form(0.0);
        form.urgency = Urgency::Flexible;
        assert_eq!(form.estimated_cost(), -25.0);
    }

    #[test]
    fn validation_order_first_failure_wins() {
        let mut form = GeneralBookingForm::new(provider(100.0));
        assert_eq!(form.validate(), Err(ValidationError("Please select a service date")));

        form.date = "2025-02-10".to_string();
        assert_eq!(form.validate(), Err(ValidationError("Please select a preferred time")));

        form.time = "2:00 PM".to_string();
        form.location = "   ".to_string();
        assert_eq!(form.validate(), Err(ValidationError("Please enter the service location")));

        form.location = "123 Test St".to_string();
        form.description = " ".to_string();
        assert_eq!(form.validate(), Err(ValidationError("Please describe the service needed")));

        form.description = "fix sink".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn invalid_form_never_becomes_a_record() {
        let form = GeneralBookingForm::new(provider(100.0));
        assert!(form.to_record().is_err());
    }

    #[test]
    fn notes_include_surcharge_only_when_not_normal() {
        let mut form = filled_form(100.0);
        assert!(!form.notes().contains("Urgency Surcharge"));

        form.urgency = Urgency::Urgent;
        let notes = form.notes();
        assert!(notes.contains("Urgency Level: urgent"));
        assert!(notes.contains("Estimated Duration: 1-2 hours"));
        assert!(notes.contains("Contact Preference: phone"));
        assert!(notes.contains("Urgency Surcharge: ₱50"));
    }

    #[test]
    fn urgent_booking_record_matches_contract() {
        let mut form = filled_form(100.0);
        form.urgency = Urgency::Urgent;

        let record = form.to_record().unwrap();
        assert_eq!(record.estimated_cost, Some(250.0));
        assert_eq!(record.scheduled_time, "14:00:00");
        assert_eq!(record.scheduled_date, "2025-02-10");
        assert_eq!(record.status, BookingStatus::Pending);
        assert_eq!(record.service_category, "Plumbing Services");
    }
}
