use serde::{Deserialize, Serialize};

use crate::forms::{to_24_hour, TextField, ValidationError};
use crate::models::{BookingStatus, NewBooking, ServiceProvider};

pub const LAUNDRY_CATEGORY: &str = "Laundry Services";

#[derive(Debug, Clone, Copy)]
pub struct LaundryService {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub pricing_model: &'static str,
    pub base_price: f64,
    pub notes: &'static str,
}

pub const LAUNDRY_SERVICES: [LaundryService; 7] = [
    LaundryService {
        id: "1",
        name: "Standard Wash & Fold",
        description: "Wash, dry, fold for everyday clothes",
        pricing_model: "Flat-Rate (per bag)",
        base_price: 250.0,
        notes: "Most common recurring service",
    },
    LaundryService {
        id: "2",
        name: "Standard Wash & Iron",
        description: "Clothes are washed, dried, and ironed",
        pricing_model: "Flat-Rate (per bag) or Per-Piece",
        base_price: 350.0,
        notes: "Ideal for professionals and families",
    },
    LaundryService {
        id: "3",
        name: "Express Wash",
        description: "Same-day wash & fold service",
        pricing_model: "Flat-Rate + Add-on",
        base_price: 300.0,
        notes: "Time-based surcharge",
    },
    LaundryService {
        id: "4",
        name: "Express Wash & Iron",
        description: "Same-day wash + ironing",
        pricing_model: "Flat-Rate + Add-on",
        base_price: 450.0,
        notes: "Premium tier with speed + quality",
    },
    LaundryService {
        id: "5",
        name: "Delicate Wash",
        description: "Gentle handling (air-dry, cold cycle)",
        pricing_model: "Per-Piece",
        base_price: 50.0,
        notes: "For silks, lace, wool",
    },
    LaundryService {
        id: "6",
        name: "Baby Clothes",
        description: "Uses hypoallergenic detergent",
        pricing_model: "Flat-Rate or Per-Piece",
        base_price: 200.0,
        notes: "Family-safe; could be bundled",
    },
    LaundryService {
        id: "7",
        name: "Curtain/Bedding Wash",
        description: "Wash for oversized items",
        pricing_model: "Per-Kilo",
        base_price: 80.0,
        notes: "Large items by weight (e.g., duvets, drapes)",
    },
];

pub fn laundry_service(id: &str) -> Option<&'static LaundryService> {
    LAUNDRY_SERVICES.iter().find(|s| s.id == id)
}

/// Draft state of the laundry booking form. Sub-services are multi-select
/// with toggle semantics; the estimate tracks the selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaundryBookingForm {
    pub provider: ServiceProvider,
    pub selected: Vec<String>,
    pub date: String,
    pub time: String,
    pub address: String,
    pub instructions: String,
    pub awaiting: Option<TextField>,
    pub submitting: bool,
}

impl LaundryBookingForm {
    pub fn new(provider: ServiceProvider) -> Self {
        Self {
            provider,
            selected: Vec::new(),
            date: String::new(),
            time: String::new(),
            address: String::new(),
            instructions: String::new(),
            awaiting: None,
            submitting: false,
        }
    }

    /// Selecting a selected service deselects it.
    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
        } else if laundry_service(id).is_some() {
            self.selected.push(id.to_string());
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// Sum of the base prices of the current selection.
    pub fn estimated_cost(&self) -> f64 {
        self.selected
            .iter()
            .filter_map(|id| laundry_service(id))
            .map(|s| s.base_price)
            .sum()
    }

    pub fn selected_names(&self) -> Vec<&'static str> {
        self.selected
            .iter()
            .filter_map(|id| laundry_service(id))
            .map(|s| s.name)
            .collect()
    }

    /// Joined sub-service names, with special instructions appended as a
    /// second paragraph when present.
    pub fn description(&self) -> String {
        let services = self.selected_names().join(", ");
        let instructions = self.instructions.trim();
        if instructions.is_empty() {
            services
        } else {
            format!("{}\n\n{}", services, instructions)
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.selected.is_empty() {
            return Err(ValidationError("Please select at least one service"));
        }
        if self.date.is_empty() {
            return Err(ValidationError("Please select a pickup date"));
        }
        if self.time.is_empty() {
            return Err(ValidationError("Please select a pickup time"));
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError("Please enter your pickup address"));
        }
        Ok(())
    }

    pub fn to_record(&self) -> Result<NewBooking, ValidationError> {
        self.validate()?;
        let scheduled_time = to_24_hour(&self.time)
            .ok_or(ValidationError("Please select a pickup time"))?;

        Ok(NewBooking {
            provider_id: self.provider.id,
            service_category: LAUNDRY_CATEGORY.to_string(),
            description: self.description(),
            location: self.address.trim().to_string(),
            scheduled_date: self.date.clone(),
            scheduled_time,
            status: BookingStatus::Pending,
            estimated_cost: Some(self.estimated_cost()),
            notes: None,
            urgency_level: None,
            estimated_duration: None,
            contact_preference: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn form() -> LaundryBookingForm {
        LaundryBookingForm::new(ServiceProvider {
            id: Uuid::new_v4(),
            user_id: None,
            business_name: "Fresh Spin Laundry".to_string(),
            description: "Pickup and delivery laundry".to_string(),
            service_categories: vec![LAUNDRY_CATEGORY.to_string()],
            location: "Pasig".to_string(),
            rating: 4.9,
            reviews_count: 88,
            hourly_rate: 0.0,
            photos: Vec::new(),
            verified: true,
        })
    }

    #[test]
    fn cost_is_sum_of_selected_base_prices() {
        let mut form = form();
        form.toggle("1");
        form.toggle("3");
        assert_eq!(form.estimated_cost(), 550.0);

        form.toggle("5");
        assert_eq!(form.estimated_cost(), 600.0);
    }

    #[test]
    fn toggle_deselects_on_second_tap() {
        let mut form = form();
        form.toggle("2");
        assert!(form.is_selected("2"));
        assert_eq!(form.estimated_cost(), 350.0);

        form.toggle("2");
        assert!(!form.is_selected("2"));
        assert_eq!(form.estimated_cost(), 0.0);
    }

    #[test]
    fn unknown_service_id_is_ignored() {
        let mut form = form();
        form.toggle("99");
        assert!(form.selected.is_empty());
        assert_eq!(form.estimated_cost(), 0.0);
    }

    #[test]
    fn validation_order_first_failure_wins() {
        let mut form = form();
        assert_eq!(form.validate(), Err(ValidationError("Please select at least one service")));

        form.toggle("1");
        assert_eq!(form.validate(), Err(ValidationError("Please select a pickup date")));

        form.date = "2025-03-01".to_string();
        assert_eq!(form.validate(), Err(ValidationError("Please select a pickup time")));

        form.time = "9:00 AM".to_string();
        form.address = "  ".to_string();
        assert_eq!(form.validate(), Err(ValidationError("Please enter your pickup address")));

        form.address = "45 Laundry Lane".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn description_joins_names_and_appends_instructions() {
        let mut form = form();
        form.toggle("1");
        form.toggle("5");
        assert_eq!(form.description(), "Standard Wash & Fold, Delicate Wash");

        form.instructions = "Ring the doorbell twice".to_string();
        assert_eq!(
            form.description(),
            "Standard Wash & Fold, Delicate Wash\n\nRing the doorbell twice"
        );
    }

    #[test]
    fn record_is_pinned_to_the_laundry_category() {
        let mut form = form();
        form.toggle("1");
        form.date = "2025-03-01".to_string();
        form.time = "9:00 AM".to_string();
        form.address = "45 Laundry Lane".to_string();

        let record = form.to_record().unwrap();
        assert_eq!(record.service_category, LAUNDRY_CATEGORY);
        assert_eq!(record.scheduled_time, "09:00:00");
        assert_eq!(record.status, BookingStatus::Pending);
        assert_eq!(record.estimated_cost, Some(250.0));
    }
}
