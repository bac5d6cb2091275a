//! Normalization and hashing of user identity fields.
//!
//! The provider matches hashed identifiers byte for byte, so a stray capital
//! letter or trailing space silently lowers match rates instead of failing.
//! Normalization here is deterministic and idempotent:
//! `normalize(k, normalize(k, x)) == normalize(k, x)`.

use sha2::{Digest, Sha256};

use crate::record::ConversionEvent;

/// Kind of identity field carried in an [`IdentityBundle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Email,
    Phone,
    FirstName,
    LastName,
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::Email => write!(f, "email"),
            IdentifierKind::Phone => write!(f, "phone"),
            IdentifierKind::FirstName => write!(f, "first_name"),
            IdentifierKind::LastName => write!(f, "last_name"),
        }
    }
}

/// Normalize a raw identity value. Returns `None` when nothing is left.
///
/// - email and names: trimmed and lowercased
/// - phone: every non-digit character removed
pub fn normalize(kind: IdentifierKind, value: &str) -> Option<String> {
    let normalized = match kind {
        IdentifierKind::Email | IdentifierKind::FirstName | IdentifierKind::LastName => {
            value.trim().to_lowercase()
        }
        IdentifierKind::Phone => value.chars().filter(char::is_ascii_digit).collect(),
    };

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// SHA-256 of the UTF-8 bytes, as 64 lowercase hex characters.
pub fn hash(normalized: &str) -> String {
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// A single hashed identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedIdentifier {
    pub kind: IdentifierKind,
    /// Lowercase hex SHA-256 digest of the normalized value
    pub value: String,
}

impl HashedIdentifier {
    /// Normalize and hash `raw`, or `None` if it normalizes to nothing.
    pub fn from_raw(kind: IdentifierKind, raw: &str) -> Option<Self> {
        normalize(kind, raw).map(|normalized| Self {
            kind,
            value: hash(&normalized),
        })
    }
}

/// Hashed identity fields attached to a conversion. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityBundle {
    identifiers: Vec<HashedIdentifier>,
}

impl IdentityBundle {
    pub fn identifiers(&self) -> &[HashedIdentifier] {
        &self.identifiers
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Always false: bundles are only built with at least one identifier.
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// First identifier of the given kind.
    pub fn get(&self, kind: IdentifierKind) -> Option<&HashedIdentifier> {
        self.identifiers.iter().find(|id| id.kind == kind)
    }

    pub fn count(&self, kind: IdentifierKind) -> usize {
        self.identifiers.iter().filter(|id| id.kind == kind).count()
    }
}

/// Hash every identity field of `event` that survives normalization.
///
/// Returns `None` when no field was supplied or all of them normalize to
/// empty; the provider record then omits the identity section entirely.
pub fn build_identity_bundle(event: &ConversionEvent) -> Option<IdentityBundle> {
    let fields = [
        (IdentifierKind::Email, event.email.as_deref()),
        (IdentifierKind::Phone, event.phone.as_deref()),
        (IdentifierKind::FirstName, event.first_name.as_deref()),
        (IdentifierKind::LastName, event.last_name.as_deref()),
    ];

    let identifiers: Vec<HashedIdentifier> = fields
        .into_iter()
        .filter_map(|(kind, raw)| raw.and_then(|raw| HashedIdentifier::from_raw(kind, raw)))
        .collect();

    if identifiers.is_empty() {
        None
    } else {
        Some(IdentityBundle { identifiers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_support::sample_event;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize(IdentifierKind::Email, "  Customer@Example.COM \n"),
            Some("customer@example.com".to_string())
        );
        assert_eq!(normalize(IdentifierKind::Email, "   "), None);
        assert_eq!(normalize(IdentifierKind::Email, ""), None);
    }

    #[test]
    fn test_normalize_phone_strips_non_digits() {
        assert_eq!(
            normalize(IdentifierKind::Phone, "+55 11 99999-9999"),
            Some("5511999999999".to_string())
        );
        assert_eq!(normalize(IdentifierKind::Phone, "(+) - "), None);
    }

    #[test]
    fn test_normalize_names() {
        assert_eq!(
            normalize(IdentifierKind::FirstName, " João "),
            Some("joão".to_string())
        );
        assert_eq!(
            normalize(IdentifierKind::LastName, "SILVA"),
            Some("silva".to_string())
        );
    }

    #[test]
    fn test_hash_is_stable_lowercase_hex() {
        let first = hash("a@b.com");
        let second = hash("a@b.com");

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_ne!(first, hash("a@b.co"));
    }

    #[test]
    fn test_hash_known_vector() {
        assert_eq!(
            hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_bundle_absent_without_identity_fields() {
        let event = sample_event();
        assert!(build_identity_bundle(&event).is_none());
    }

    #[test]
    fn test_bundle_absent_when_all_fields_normalize_empty() {
        let mut event = sample_event();
        event.email = Some("   ".to_string());
        event.phone = Some("+ - ()".to_string());
        event.first_name = Some("".to_string());
        event.last_name = Some("\t".to_string());

        assert!(build_identity_bundle(&event).is_none());
    }

    #[test]
    fn test_bundle_single_phone_entry() {
        let mut event = sample_event();
        event.phone = Some("+55 11 99999-9999".to_string());

        let bundle = build_identity_bundle(&event).unwrap();

        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.count(IdentifierKind::Phone), 1);
        assert_eq!(
            bundle.get(IdentifierKind::Phone).unwrap().value,
            hash("5511999999999")
        );
    }

    #[test]
    fn test_bundle_keeps_field_order_and_skips_blank() {
        let mut event = sample_event();
        event.email = Some("Customer@Example.com".to_string());
        event.phone = Some("  ".to_string());
        event.first_name = Some("João".to_string());
        event.last_name = Some("Silva".to_string());

        let bundle = build_identity_bundle(&event).unwrap();
        let kinds: Vec<IdentifierKind> = bundle.identifiers().iter().map(|id| id.kind).collect();

        assert_eq!(
            kinds,
            vec![
                IdentifierKind::Email,
                IdentifierKind::FirstName,
                IdentifierKind::LastName
            ]
        );
        assert_eq!(
            bundle.get(IdentifierKind::Email).unwrap().value,
            hash("customer@example.com")
        );
    }

    #[test]
    fn test_identifier_kind_display() {
        assert_eq!(IdentifierKind::Email.to_string(), "email");
        assert_eq!(IdentifierKind::FirstName.to_string(), "first_name");
    }

    proptest! {
        #[test]
        fn normalize_email_is_idempotent(raw in "\\PC{0,40}") {
            if let Some(once) = normalize(IdentifierKind::Email, &raw) {
                prop_assert_eq!(normalize(IdentifierKind::Email, &once), Some(once.clone()));
            }
        }

        #[test]
        fn normalize_phone_is_idempotent(raw in "[0-9 +()\\-a-z]{0,24}") {
            if let Some(once) = normalize(IdentifierKind::Phone, &raw) {
                prop_assert!(once.chars().all(|c| c.is_ascii_digit()));
                prop_assert_eq!(normalize(IdentifierKind::Phone, &once), Some(once.clone()));
            }
        }
    }
}
