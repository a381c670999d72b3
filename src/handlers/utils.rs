use chrono::{Datelike, NaiveDate, Utc};
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, MessageId,
    ParseMode, ReplyMarkup,
};

use crate::app_state::AppState;
use crate::models::{
    Booking, BookingDraft, BookingStatus, BookingWithProvider, Profile, ServiceCategory,
    ServiceProvider,
};

/// Escapes MarkdownV2 special characters.
pub fn escape_markdown_v2(text: &str) -> String {
    let specials = ['_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!'];
    let mut out = String::with_capacity(text.len() * 2);

    for ch in text.chars() {
        if specials.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Peso amount, escaped for MarkdownV2. Whole amounts drop the cents.
pub fn format_money(amount: f64) -> String {
    let formatted = if amount.fract() == 0.0 {
        format!("₱{:.0}", amount)
    } else {
        format!("₱{:.2}", amount)
    };
    escape_markdown_v2(&formatted)
}

/// Main menu, one button per screen.
pub fn main_menu_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(vec![
            vec![
                KeyboardButton::new("🛠 Services"),
                KeyboardButton::new("📋 My Bookings"),
            ],
            vec![
                KeyboardButton::new("👤 Profile"),
                KeyboardButton::new("ℹ️ Help"),
            ],
        ])
        .resize_keyboard(),
    )
}

pub fn categories_keyboard(categories: &[ServiceCategory]) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();

    for category in categories {
        keyboard.push(vec![InlineKeyboardButton::callback(
            format!("{} {}", ServiceCategory::emoji(&category.name), category.name),
            format!("category_{}", category.name),
        )]);
    }

    InlineKeyboardMarkup::new(keyboard)
}

/// Provider cards for chat replies, the catalog and search results.
pub fn provider_cards_text(providers: &[ServiceProvider]) -> String {
    providers
        .iter()
        .map(|p| {
            let verified = if p.verified { " ✅" } else { "" };
            format!(
                "*{}*{}\n⭐ {} \\({} reviews\\)\n📍 {}\n💰 {}/hr\n{}",
                escape_markdown_v2(&p.business_name),
                verified,
                escape_markdown_v2(&format!("{:.1}", p.rating)),
                p.reviews_count,
                escape_markdown_v2(&p.location),
                format_money(p.hourly_rate),
                escape_markdown_v2(&p.description),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn providers_keyboard(providers: &[ServiceProvider]) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();

    for provider in providers {
        keyboard.push(vec![InlineKeyboardButton::callback(
            format!("📅 Book {}", provider.business_name),
            format!("book_{}", provider.id),
        )]);
    }

    InlineKeyboardMarkup::new(keyboard)
}

pub fn make_calendar_keyboard() -> InlineKeyboardMarkup {
    let now = Utc::now();
    make_days_keyboard(now.year(), now.month())
}

pub fn make_days_keyboard(year: i32, month: u32) -> InlineKeyboardMarkup {
    let month_names = [
        "January", "February", "March", "April", "May", "June",
        "July", "August", "September", "October", "November", "December",
    ];

    let Some(first_day) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new());
    };
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let Some(next_month) = next_month else {
        return InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new());
    };
    let days_in_month = (next_month - first_day).num_days() as u32;

    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    keyboard.push(vec![
        InlineKeyboardButton::callback("◀️", format!("calendar_prev_{}_{}", year, month)),
        InlineKeyboardButton::callback(
            format!("{} {}", month_names[month as usize - 1], year),
            "calendar_ignore".to_string(),
        ),
        InlineKeyboardButton::callback("▶️", format!("calendar_next_{}_{}", year, month)),
    ]);

    keyboard.push(
        ["S", "M", "T", "W", "T", "F", "S"]
            .iter()
            .map(|d| InlineKeyboardButton::callback(d.to_string(), "calendar_ignore".to_string()))
            .collect(),
    );

    let today = Utc::now().date_naive();
    let mut current_week = Vec::new();

    // Empty cells before the first day (Sunday-first week)
    for _ in 0..first_day.weekday().num_days_from_sunday() {
        current_week.push(InlineKeyboardButton::callback(" ", "calendar_ignore".to_string()));
    }

    for day in 1..=days_in_month {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };

        // Past days are blocked
        if date < today {
            current_week.push(InlineKeyboardButton::callback("❌", "calendar_ignore".to_string()));
        } else {
            current_week.push(InlineKeyboardButton::callback(
                day.to_string(),
                format!("calendar_day_{}_{}_{}", year, month, day),
            ));
        }

        if current_week.len() == 7 {
            keyboard.push(current_week);
            current_week = Vec::new();
        }
    }

    if !current_week.is_empty() {
        while current_week.len() < 7 {
            current_week.push(InlineKeyboardButton::callback(" ", "calendar_ignore".to_string()));
        }
        keyboard.push(current_week);
    }

    keyboard.push(vec![InlineKeyboardButton::callback("❌ Cancel", "cancel_draft")]);

    InlineKeyboardMarkup::new(keyboard)
}

/// Hourly slots between 8 AM and 5 PM, as the general form offers them.
pub fn general_time_slots() -> Vec<String> {
    (8..=17)
        .map(|hour| {
            let time12 = if hour > 12 { hour - 12 } else { hour };
            let ampm = if hour >= 12 { "PM" } else { "AM" };
            format!("{}:00 {}", time12, ampm)
        })
        .collect()
}

pub const LAUNDRY_TIME_SLOTS: [&str; 9] = [
    "8:00 AM", "9:00 AM", "10:00 AM", "11:00 AM",
    "1:00 PM", "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM",
];

pub fn time_slots_keyboard(slots: &[String]) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for chunk in slots.chunks(3) {
        keyboard.push(
            chunk
                .iter()
                .map(|slot| InlineKeyboardButton::callback(slot.clone(), format!("slot_{}", slot)))
                .collect(),
        );
    }

    keyboard.push(vec![InlineKeyboardButton::callback("❌ Cancel", "cancel_draft")]);

    InlineKeyboardMarkup::new(keyboard)
}

pub fn urgency_keyboard() -> InlineKeyboardMarkup {
    use crate::forms::Urgency;

    let mut keyboard = Vec::new();
    for urgency in Urgency::ALL {
        let surcharge = urgency.surcharge();
        let label = if surcharge > 0.0 {
            format!("{} +₱{:.0}", urgency.label(), surcharge)
        } else if surcharge < 0.0 {
            format!("{} -₱{:.0}", urgency.label(), -surcharge)
        } else {
            urgency.label().to_string()
        };
        keyboard.push(vec![InlineKeyboardButton::callback(
            label,
            format!("urgency_{}", urgency.value()),
        )]);
    }

    InlineKeyboardMarkup::new(keyboard)
}

pub fn duration_keyboard() -> InlineKeyboardMarkup {
    use crate::forms::DURATION_OPTIONS;

    let keyboard = DURATION_OPTIONS
        .iter()
        .enumerate()
        .map(|(idx, duration)| {
            vec![InlineKeyboardButton::callback(
                duration.to_string(),
                format!("duration_{}", idx),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(keyboard)
}

pub fn contact_keyboard() -> InlineKeyboardMarkup {
    use crate::forms::ContactPreference;

    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(ContactPreference::Phone.label(), "contact_phone"),
        InlineKeyboardButton::callback(ContactPreference::Message.label(), "contact_message"),
    ]])
}

pub fn laundry_services_keyboard(form: &crate::forms::LaundryBookingForm) -> InlineKeyboardMarkup {
    use crate::forms::LAUNDRY_SERVICES;

    let mut keyboard = Vec::new();

    for service in &LAUNDRY_SERVICES {
        let mark = if form.is_selected(service.id) { "✅ " } else { "" };
        keyboard.push(vec![InlineKeyboardButton::callback(
            format!("{}{} — ₱{:.0}", mark, service.name, service.base_price),
            format!("laundry_{}", service.id),
        )]);
    }

    keyboard.push(vec![
        InlineKeyboardButton::callback("✔️ Done", "laundry_done"),
        InlineKeyboardButton::callback("❌ Cancel", "cancel_draft"),
    ]);

    InlineKeyboardMarkup::new(keyboard)
}

/// Summary shown before the final "send" tap, MarkdownV2-escaped.
pub fn booking_summary_text(draft: &BookingDraft) -> String {
    match draft {
        BookingDraft::General(form) => {
            let base = form.provider.hourly_rate * 2.0;
            let mut cost_lines = format!(
                "Base Rate \\({}/hr\\): {}",
                format_money(form.provider.hourly_rate),
                format_money(base),
            );
            let surcharge = form.urgency.surcharge();
            if surcharge != 0.0 {
                let sign = if surcharge > 0.0 { "\\+" } else { "\\-" };
                cost_lines.push_str(&format!(
                    "\nUrgency Surcharge: {}{}",
                    sign,
                    format_money(surcharge.abs()),
                ));
            }

            format!(
                "📋 *Booking Summary*\n\n\
                 *Provider:* {}\n\
                 *Service:* {}\n\
                 *Date:* {}\n\
                 *Time:* {}\n\
                 *Location:* {}\n\
                 *Description:* {}\n\
                 *Urgency:* {}\n\
                 *Duration:* {}\n\
                 *Contact:* {}\n\n\
                 💳 *Cost Estimate*\n{}\n*Estimated Total:* {}\n\n\
                 _Final cost will be confirmed by the provider based on actual work required_",
                escape_markdown_v2(&form.provider.business_name),
                escape_markdown_v2(form.provider.service_categories.first().map(String::as_str).unwrap_or("Professional service")),
                escape_markdown_v2(&form.date),
                escape_markdown_v2(&form.time),
                escape_markdown_v2(form.location.trim()),
                escape_markdown_v2(form.description.trim()),
                escape_markdown_v2(form.urgency.label()),
                escape_markdown_v2(&form.duration),
                escape_markdown_v2(form.contact.label()),
                cost_lines,
                format_money(form.estimated_cost()),
            )
        }
        BookingDraft::Laundry(form) => {
            let services = form.selected_names().join(", ");
            let instructions = form.instructions.trim();
            let instructions_line = if instructions.is_empty() {
                String::new()
            } else {
                format!("\n*Instructions:* {}", escape_markdown_v2(instructions))
            };

            format!(
                "🧺 *Laundry Booking Summary*\n\n\
                 *Provider:* {}\n\
                 *Services:* {}\n\
                 *Pickup:* {} at {}\n\
                 *Address:* {}{}\n\n\
                 *Estimated Total:* {}",
                escape_markdown_v2(&form.provider.business_name),
                escape_markdown_v2(&services),
                escape_markdown_v2(&form.date),
                escape_markdown_v2(&form.time),
                escape_markdown_v2(form.address.trim()),
                instructions_line,
                format_money(form.estimated_cost()),
            )
        }
    }
}

pub fn skip_instructions_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "⏭ Skip",
        "skip_instructions",
    )]])
}

pub fn confirm_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("✅ Send Booking Request", "submit_booking")],
        vec![InlineKeyboardButton::callback("❌ Cancel", "cancel_draft")],
    ])
}

pub fn booking_filters_keyboard(active: &str) -> InlineKeyboardMarkup {
    let filters = [
        ("all", "All"),
        ("pending", "Pending"),
        ("confirmed", "Confirmed"),
        ("completed", "Completed"),
    ];

    let row = filters
        .iter()
        .map(|(key, label)| {
            let text = if *key == active {
                format!("• {}", label)
            } else {
                label.to_string()
            };
            InlineKeyboardButton::callback(text, format!("filter_{}", key))
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(vec![row])
}

/// Renders the bookings screen; edits in place when a message id is given
/// (filter taps), otherwise sends a new message.
pub async fn show_bookings(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState,
    filter: &str,
    edit: Option<MessageId>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let bookings = Booking::for_client(&state.db, chat_id).await;

    let filtered: Vec<&BookingWithProvider> = bookings
        .iter()
        .filter(|b| filter == "all" || b.status == filter)
        .collect();

    let text = if filtered.is_empty() {
        let hint = if filter == "all" {
            "You haven't made any bookings yet\\. Ask me about a service to get started\\!"
        } else {
            "No bookings with this status\\."
        };
        format!("📋 *My Bookings*\n\n{}", hint)
    } else {
        let blocks = filtered
            .iter()
            .map(|b| {
                let status = b.status();
                let cost = b
                    .estimated_cost
                    .map(format_money)
                    .unwrap_or_else(|| escape_markdown_v2("—"));
                format!(
                    "{} *{}* — {}\n📅 {} at {}\n📍 {}\n💰 {}\n_{}_",
                    status.icon(),
                    escape_markdown_v2(&b.provider_name),
                    escape_markdown_v2(&b.service_category),
                    escape_markdown_v2(&b.scheduled_date),
                    escape_markdown_v2(&b.scheduled_time),
                    escape_markdown_v2(&b.location),
                    cost,
                    escape_markdown_v2(status.label()),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("📋 *My Bookings*\n\n{}", blocks)
    };

    // Filter row plus a cancel button per pending booking
    let mut keyboard = booking_filters_keyboard(filter).inline_keyboard;
    for booking in &filtered {
        if booking.status() == BookingStatus::Pending {
            keyboard.push(vec![InlineKeyboardButton::callback(
                format!("❌ Cancel — {}", booking.provider_name),
                format!("cancelbk_{}", booking.id),
            )]);
        }
    }
    let reply_markup = InlineKeyboardMarkup::new(keyboard);

    match edit {
        Some(message_id) => {
            bot.edit_message_text(chat_id, message_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(reply_markup)
                .await?;
        }
        None => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(reply_markup)
                .await?;
        }
    }

    Ok(())
}

pub async fn show_services(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let categories = ServiceCategory::all(&state.db).await;

    if categories.is_empty() {
        bot.send_message(chat_id, "⚠️ Couldn't load the services catalog. Please try again later.")
            .await?;
        return Ok(());
    }

    bot.send_message(
        chat_id,
        "🛠 *Service Categories*\n\nAll professionals are vetted and highly rated\\. Choose a category:",
    )
    .parse_mode(ParseMode::MarkdownV2)
    .reply_markup(categories_keyboard(&categories))
    .await?;

    Ok(())
}

pub async fn show_profile(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match Profile::find_by_chat_id(&state.db, chat_id).await {
        Ok(Some(profile)) => {
            let optional = |v: &Option<String>| {
                escape_markdown_v2(v.as_deref().filter(|s| !s.is_empty()).unwrap_or("—"))
            };
            bot.send_message(
                chat_id,
                format!(
                    "👤 *Profile*\n\n\
                     *Name:* {}\n\
                     *Email:* {}\n\
                     *Phone:* {}\n\
                     *Address:* {}\n\
                     *Account type:* {}\n\
                     *Member since:* {}",
                    escape_markdown_v2(&profile.full_name),
                    optional(&profile.email),
                    optional(&profile.phone),
                    optional(&profile.address),
                    escape_markdown_v2(&profile.user_type),
                    escape_markdown_v2(&profile.created_at.format("%d.%m.%Y").to_string()),
                ),
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }
        Ok(None) => {
            bot.send_message(chat_id, "👤 You don't have a profile yet. Send /start to register.")
                .await?;
        }
        Err(e) => {
            log::error!("Error loading profile for user {}: {}", chat_id, e);
            bot.send_message(chat_id, "⚠️ Couldn't load your profile. Please try again later.")
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_specials_are_escaped() {
        assert_eq!(escape_markdown_v2("a.b!c"), "a\\.b\\!c");
        assert_eq!(escape_markdown_v2("plain"), "plain");
    }

    #[test]
    fn whole_amounts_drop_cents() {
        assert_eq!(format_money(250.0), "₱250");
        assert_eq!(format_money(250.5), "₱250\\.50");
    }

    #[test]
    fn general_slots_span_eight_to_five() {
        let slots = general_time_slots();
        assert_eq!(slots.len(), 10);
        assert_eq!(slots.first().map(String::as_str), Some("8:00 AM"));
        assert_eq!(slots.get(4).map(String::as_str), Some("12:00 PM"));
        assert_eq!(slots.last().map(String::as_str), Some("5:00 PM"));
    }
}
