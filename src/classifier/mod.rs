use crate::database::{Database, DbError};
use crate::models::{ChatMessage, ChatSession, ServiceProvider};

/// Ordered keyword table; the first keyword found as a substring of the
/// lower-cased input wins. No scoring, no longest-match.
pub const SERVICE_KEYWORDS: &[(&str, &str)] = &[
    ("computer", "IT & Tech Support"),
    ("laptop", "IT & Tech Support"),
    ("pc", "IT & Tech Support"),
    ("tech", "IT & Tech Support"),
    ("plumb", "Plumbing Services"),
    ("leak", "Plumbing Services"),
    ("pipe", "Plumbing Services"),
    ("toilet", "Plumbing Services"),
    ("sink", "Plumbing Services"),
    ("faucet", "Plumbing Services"),
    ("electric", "Electrical Services"),
    ("wiring", "Electrical Services"),
    ("outlet", "Electrical Services"),
    ("power", "Electrical Services"),
    ("lighting", "Electrical Services"),
    ("hvac", "HVAC Services"),
    ("heating", "HVAC Services"),
    ("cooling", "HVAC Services"),
    ("air conditioning", "HVAC Services"),
    ("ac", "HVAC Services"),
    ("furnace", "HVAC Services"),
    ("car", "Car Repair & Maintenance"),
    ("auto", "Car Repair & Maintenance"),
    ("vehicle", "Car Repair & Maintenance"),
    ("brake", "Car Repair & Maintenance"),
    ("engine", "Car Repair & Maintenance"),
    ("clean", "House Cleaning"),
    ("cleaning", "House Cleaning"),
    ("paint", "Painting Services"),
    ("painting", "Painting Services"),
    ("handyman", "General Handyman"),
    ("repair", "General Handyman"),
];

const FALLBACK_PROMPT: &str =
    "I understand you need help with a service. Could you please specify which \
     type of service you're looking for?\n\n\
     • Computer/IT repair\n\
     • Plumbing\n\
     • Electrical work\n\
     • HVAC (heating/cooling)\n\
     • Auto repair\n\
     • House cleaning\n\
     • Painting\n\
     • General handyman services\n\n\
     Once you tell me the service type, I can find the perfect professional for \
     your needs!";

pub fn classify(input: &str) -> Option<&'static str> {
    let input = input.to_lowercase();
    SERVICE_KEYWORDS
        .iter()
        .find(|(keyword, _)| input.contains(keyword))
        .map(|(_, category)| *category)
}

fn service_description(category: &str) -> &'static str {
    match category {
        "IT & Tech Support" => "computer repair, network setup, smart home installation, and tech troubleshooting",
        "Plumbing Services" => "leak repair, drain cleaning, fixture installation, and water heater services",
        "Electrical Services" => "outlet installation, lighting repair, wiring, and electrical safety",
        "HVAC Services" => "AC repair/installation, heating system maintenance, and duct cleaning",
        "Car Repair & Maintenance" => "engine diagnostics, brake repair, oil changes, and general automotive maintenance",
        "House Cleaning" => "regular cleaning, deep cleaning, and move-in/out cleaning services",
        "Painting Services" => "interior and exterior painting for residential and commercial properties",
        "General Handyman" => "home repairs, furniture assembly, and general maintenance tasks",
        _ => "various professional services",
    }
}

/// Message for a matched category: found providers, nobody available, or
/// the backend being unreachable. The last two are distinct states.
pub fn reply_text(category: &str, outcome: Result<&[ServiceProvider], &DbError>) -> String {
    let category_lower = category.to_lowercase();
    match outcome {
        Ok(providers) if !providers.is_empty() => format!(
            "Perfect! I found {} {} professionals in your area. These providers \
             handle {}. Here are some top-rated options for you:",
            providers.len(),
            category_lower,
            service_description(category)
        ),
        Ok(_) => format!(
            "I understand you need {} services. Unfortunately, I couldn't find \
             any available providers in your area right now. Please try again \
             later or contact us directly for assistance.",
            category_lower
        ),
        Err(_) => format!(
            "I can help you find {} professionals! However, I'm having trouble \
             accessing our provider database right now. Please try again in a \
             moment.",
            category_lower
        ),
    }
}

pub struct AssistantReply {
    pub text: String,
    pub providers: Vec<ServiceProvider>,
    pub category: Option<&'static str>,
}

/// Classifies one utterance and fetches up to 3 matching providers. The
/// conversation state is owned by the caller and updated in place.
pub async fn respond(db: &Database, session: &mut ChatSession, input: &str) -> AssistantReply {
    session.messages.push(ChatMessage::user(input.to_string()));

    let reply = match classify(input) {
        Some(category) => match ServiceProvider::try_by_category(db, category, 3).await {
            Ok(providers) => AssistantReply {
                text: reply_text(category, Ok(&providers)),
                providers,
                category: Some(category),
            },
            Err(e) => {
                log::error!("Error fetching providers for chat reply: {}", e);
                AssistantReply {
                    text: reply_text(category, Err(&e)),
                    providers: Vec::new(),
                    category: Some(category),
                }
            }
        },
        None => AssistantReply {
            text: FALLBACK_PROMPT.to_string(),
            providers: Vec::new(),
            category: None,
        },
    };

    let mut message = ChatMessage::assistant(reply.text.clone());
    if !reply.providers.is_empty() {
        message = message.with_providers(
            reply.providers.clone(),
            reply.category.map(str::to_string),
        );
    }
    session.messages.push(message);

    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn provider(name: &str) -> ServiceProvider {
        ServiceProvider {
            id: Uuid::new_v4(),
            user_id: None,
            business_name: name.to_string(),
            description: String::new(),
            service_categories: vec!["Plumbing Services".to_string()],
            location: String::new(),
            rating: 4.5,
            reviews_count: 10,
            hourly_rate: 500.0,
            photos: Vec::new(),
            verified: true,
        }
    }

    #[test]
    fn leak_maps_to_plumbing() {
        assert_eq!(classify("There is a LEAK under my sink"), Some("Plumbing Services"));
        assert_eq!(classify("leaking roof"), Some("Plumbing Services"));
    }

    #[test]
    fn first_match_in_table_order_wins() {
        // "computer" precedes the plumbing keywords in the table.
        assert_eq!(classify("my computer has a leak"), Some("IT & Tech Support"));
    }

    #[test]
    fn unmatched_input_has_no_category() {
        assert_eq!(classify("hello there"), None);
    }

    #[test]
    fn fallback_prompt_lists_eight_categories() {
        assert_eq!(FALLBACK_PROMPT.matches('•').count(), 8);
    }

    #[test]
    fn found_reply_names_category_and_count() {
        let providers = vec![provider("A"), provider("B")];
        let text = reply_text("Plumbing Services", Ok(&providers));
        assert!(text.contains("found 2 plumbing services professionals"));
    }

    #[test]
    fn empty_result_is_distinct_from_transport_error() {
        let empty = reply_text("Plumbing Services", Ok(&[]));
        let failed = reply_text(
            "Plumbing Services",
            Err(&DbError::Database("connection refused".to_string())),
        );

        assert!(empty.contains("plumbing services"));
        assert!(empty.contains("couldn't find any available providers"));
        assert!(failed.contains("having trouble accessing our provider database"));
        assert_ne!(empty, failed);
    }
}
