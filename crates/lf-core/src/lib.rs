//! lostfound/crates/lf-core/src/lib.rs
//!
//! The central domain models and interface definitions for the
//! lost-and-found matching service.

pub mod models;
pub mod traits;
pub mod error;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;


#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(status: ItemStatus) -> Item {
        Item {
            id: Uuid::now_v7(),
            title: "Black umbrella".to_string(),
            description: "Left near the library entrance".to_string(),
            status,
            owner_id: Uuid::now_v7(),
            image_ref: "deadbeef".to_string(),
            matched: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn status_opposite_is_involutive() {
        assert_eq!(ItemStatus::Lost.opposite(), ItemStatus::Found);
        assert_eq!(ItemStatus::Found.opposite(), ItemStatus::Lost);
        assert_eq!(ItemStatus::Lost.opposite().opposite(), ItemStatus::Lost);
    }

    #[test]
    fn status_parses_lowercase_only() {
        assert_eq!("lost".parse::<ItemStatus>().unwrap(), ItemStatus::Lost);
        assert_eq!("found".parse::<ItemStatus>().unwrap(), ItemStatus::Found);
        assert!("Lost".parse::<ItemStatus>().is_err());
        assert!("stolen".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn match_event_rounds_percentage_to_two_decimals() {
        let a = item(ItemStatus::Lost);
        let b = item(ItemStatus::Found);
        let event = MatchEvent::new(&a, &b, 0.876_543);
        assert_eq!(event.similarity_percent, 87.65);
        assert_eq!(event.item.item_id, a.id);
        assert_eq!(event.partner.owner_id, b.owner_id);
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            id: Uuid::now_v7(),
            name: "Ada".to_string(),
            email: "ada@example.edu".to_string(),
            password_hash: "$argon2id$secret".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("ada@example.edu"));
    }
}
