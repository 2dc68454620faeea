//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod token;
mod validation;
mod value;

pub use request::{Message, SendMessage, SendOptions};
pub use token::ApiToken;
pub use validation::ValidationError;
pub use value::{
    ClientId, ClientSecret, Destination, MessageText, PhoneNumber, SenderId, UnixTimestamp,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_rejects_empty() {
        assert!(matches!(
            ClientId::new("   "),
            Err(ValidationError::Empty {
                field: ClientId::FIELD
            })
        ));
    }

    #[test]
    fn client_secret_rejects_empty() {
        assert!(matches!(
            ClientSecret::new(""),
            Err(ValidationError::Empty {
                field: ClientSecret::FIELD
            })
        ));
    }

    #[test]
    fn phone_number_parses_with_region_and_converts_to_destination() {
        let pn = PhoneNumber::parse(Some(phonenumber::country::Id::ZA), " 0711234567 ").unwrap();
        assert_eq!(pn.raw(), "0711234567");

        let dest: Destination = pn.into();
        assert_eq!(dest.as_str(), "+27711234567");
    }

    #[test]
    fn token_expiry_uses_seconds_not_raw_minutes() {
        let issued_at = UnixTimestamp::new(1_700_000_000);
        let token = ApiToken::issued("t", None, 1440, issued_at);
        // A raw-minutes expiry would be stale almost immediately.
        assert!(token.is_valid_at(issued_at.plus_secs(1441)));
        assert!(!token.is_valid_at(issued_at.plus_secs(1440 * 60)));
    }
}
