pub mod booking;
pub mod category;
pub mod chat;
pub mod profile;
pub mod provider;

pub use booking::{Booking, BookingStatus, BookingWithProvider, NewBooking};
pub use category::ServiceCategory;
pub use chat::{BookingDraft, ChatMessage, ChatSession, Sender};
pub use profile::Profile;
pub use provider::ServiceProvider;
