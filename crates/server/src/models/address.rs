//! Shipping address domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trellis_core::{AddressId, UserId};

/// A stored shipping address (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// User who owns this address.
    #[serde(skip)]
    pub user_id: UserId,
    /// The address fields proper.
    #[serde(flatten)]
    pub fields: AddressFields,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
    /// When the address was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// The point-in-time copy embedded into an order.
    #[must_use]
    pub fn snapshot(&self) -> AddressSnapshot {
        AddressSnapshot {
            address_id: Some(self.id),
            fields: self.fields.clone(),
        }
    }
}

/// The full set of address fields.
///
/// `state` is the only optional field; everything else must be non-empty
/// (see [`AddressPatch::into_validated`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub zipcode: String,
    pub country: String,
    pub phone: String,
}

impl AddressFields {
    /// Recipient display name, used in order notifications.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A partial set of address fields, as sent by clients.
///
/// Used both for partial updates (only provided fields are applied) and for
/// inline addresses during order placement (where
/// [`into_validated`](Self::into_validated) enforces the required fields).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

impl AddressPatch {
    /// Whether the patch carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zipcode.is_none()
            && self.country.is_none()
            && self.phone.is_none()
    }

    /// Promote the patch to a complete [`AddressFields`].
    ///
    /// Every field except `state` must be present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing field.
    pub fn into_validated(self) -> Result<AddressFields, MissingAddressField> {
        fn required(
            value: Option<String>,
            name: &'static str,
        ) -> Result<String, MissingAddressField> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(MissingAddressField(name)),
            }
        }

        Ok(AddressFields {
            first_name: required(self.first_name, "firstName")?,
            last_name: required(self.last_name, "lastName")?,
            email: required(self.email, "email")?,
            street: required(self.street, "street")?,
            city: required(self.city, "city")?,
            state: self.state.filter(|s| !s.trim().is_empty()),
            zipcode: required(self.zipcode, "zipcode")?,
            country: required(self.country, "country")?,
            phone: required(self.phone, "phone")?,
        })
    }

    /// Apply the patch on top of existing fields, leaving absent fields untouched.
    #[must_use]
    pub fn apply_to(self, mut fields: AddressFields) -> AddressFields {
        if let Some(v) = self.first_name {
            fields.first_name = v;
        }
        if let Some(v) = self.last_name {
            fields.last_name = v;
        }
        if let Some(v) = self.email {
            fields.email = v;
        }
        if let Some(v) = self.street {
            fields.street = v;
        }
        if let Some(v) = self.city {
            fields.city = v;
        }
        if let Some(v) = self.state {
            fields.state = Some(v);
        }
        if let Some(v) = self.zipcode {
            fields.zipcode = v;
        }
        if let Some(v) = self.country {
            fields.country = v;
        }
        if let Some(v) = self.phone {
            fields.phone = v;
        }
        fields
    }
}

/// A required address field was missing or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("missing required address field: {0}")]
pub struct MissingAddressField(pub &'static str);

/// The denormalized copy of an address stored on an order.
///
/// A point-in-time copy: later edits to the source address never change a
/// placed order. `address_id` records provenance when the order used a saved
/// address and is absent for inline addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
    #[serde(flatten)]
    pub fields: AddressFields,
}

impl From<AddressFields> for AddressSnapshot {
    fn from(fields: AddressFields) -> Self {
        Self {
            address_id: None,
            fields,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_patch() -> AddressPatch {
        AddressPatch {
            first_name: Some("Alice".into()),
            last_name: Some("Nguyen".into()),
            email: Some("a@x.com".into()),
            street: Some("1 Elm St".into()),
            city: Some("Springfield".into()),
            state: None,
            zipcode: Some("12345".into()),
            country: Some("US".into()),
            phone: Some("555-0100".into()),
        }
    }

    #[test]
    fn test_validate_accepts_missing_state() {
        let fields = full_patch().into_validated().unwrap();
        assert_eq!(fields.state, None);
        assert_eq!(fields.display_name(), "Alice Nguyen");
    }

    #[test]
    fn test_validate_rejects_missing_required_field() {
        let mut patch = full_patch();
        patch.zipcode = None;
        assert_eq!(
            patch.into_validated(),
            Err(MissingAddressField("zipcode"))
        );
    }

    #[test]
    fn test_validate_rejects_blank_required_field() {
        let mut patch = full_patch();
        patch.city = Some("   ".into());
        assert_eq!(patch.into_validated(), Err(MissingAddressField("city")));
    }

    #[test]
    fn test_apply_to_leaves_absent_fields_untouched() {
        let original = full_patch().into_validated().unwrap();
        let patch = AddressPatch {
            city: Some("Shelbyville".into()),
            state: Some("IL".into()),
            ..AddressPatch::default()
        };

        let updated = patch.apply_to(original.clone());
        assert_eq!(updated.city, "Shelbyville");
        assert_eq!(updated.state.as_deref(), Some("IL"));
        assert_eq!(updated.street, original.street);
        assert_eq!(updated.phone, original.phone);
    }

    #[test]
    fn test_snapshot_serde_camel_case() {
        let snapshot = AddressSnapshot::from(full_patch().into_validated().unwrap());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["firstName"], "Alice");
        assert_eq!(json["zipcode"], "12345");
        assert!(json.get("addressId").is_none());
        let back: AddressSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
