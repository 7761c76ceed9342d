//! Listing and booking stores.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Catalog error type.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A booking referenced a listing that does not exist.
    #[error("unknown listing: {0}")]
    UnknownListing(String),

    /// Seed file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed file could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Summary of the provider behind a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub id: String,
    pub display_name: String,
    /// Whether the provider has passed the approval flow.
    #[serde(default = "default_approved")]
    pub approved: bool,
}

fn default_approved() -> bool {
    true
}

/// A bookable service listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Price in minor currency units.
    pub price_cents: u32,
    pub provider: ProviderSummary,
}

/// A client's booking of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub listing_id: String,
    pub client_id: String,
    /// Requested time slot, as entered by the client.
    pub slot: String,
    pub created_at: DateTime<Utc>,
}

/// Thread-safe store of service listings.
///
/// Listings keep their seed order; the set is small enough that lookups
/// scan it.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    inner: Arc<RwLock<Vec<ServiceListing>>>,
}

impl CatalogStore {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog seeded with the built-in demo listings.
    #[must_use]
    pub fn with_demo_listings() -> Self {
        let store = Self::new();
        store.seed(demo_listings());
        store
    }

    /// Parse a YAML seed document (a sequence of listings).
    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let listings: Vec<ServiceListing> = serde_yaml::from_str(text)?;
        let store = Self::new();
        store.seed(listings);
        Ok(store)
    }

    /// Load a YAML seed file.
    pub fn from_yaml_file(path: &str) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Replace the listing set.
    pub fn seed(&self, listings: Vec<ServiceListing>) {
        let mut guard = self.inner.write().unwrap();
        *guard = listings;
    }

    /// All listings, in seed order.
    #[must_use]
    pub fn list(&self) -> Vec<ServiceListing> {
        self.inner.read().unwrap().clone()
    }

    /// Look up a listing by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ServiceListing> {
        self.inner
            .read()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }

    /// Number of listings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Whether the catalog holds no listings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thread-safe store of bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingStore {
    inner: Arc<RwLock<Vec<Booking>>>,
}

impl BookingStore {
    /// Create an empty booking store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a booking for a listing.
    ///
    /// Rejects listings that are not in the catalog.
    pub fn create(
        &self,
        catalog: &CatalogStore,
        listing_id: &str,
        client_id: &str,
        slot: &str,
    ) -> Result<Booking, CatalogError> {
        if catalog.get(listing_id).is_none() {
            return Err(CatalogError::UnknownListing(listing_id.to_string()));
        }
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            listing_id: listing_id.to_string(),
            client_id: client_id.to_string(),
            slot: slot.to_string(),
            created_at: Utc::now(),
        };
        let mut guard = self.inner.write().unwrap();
        guard.push(booking.clone());
        Ok(booking)
    }

    /// All bookings, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<Booking> {
        self.inner.read().unwrap().clone()
    }

    /// Bookings for one listing.
    #[must_use]
    pub fn list_for_listing(&self, listing_id: &str) -> Vec<Booking> {
        self.inner
            .read()
            .unwrap()
            .iter()
            .filter(|b| b.listing_id == listing_id)
            .cloned()
            .collect()
    }

    /// Number of bookings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Whether no bookings exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Built-in listing set used when no seed file is configured.
#[must_use]
pub(crate) fn demo_listings() -> Vec<ServiceListing> {
    let listing = |id: &str, title: &str, description: &str, category: &str, price_cents, pid: &str, pname: &str| ServiceListing {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        price_cents,
        provider: ProviderSummary {
            id: pid.to_string(),
            display_name: pname.to_string(),
            approved: true,
        },
    };

    vec![
        listing(
            "svc-cleaning-01",
            "Home deep cleaning",
            "Full apartment or house deep clean, supplies included.",
            "cleaning",
            9500,
            "prov-ana",
            "Ana Kovac",
        ),
        listing(
            "svc-plumbing-01",
            "Emergency plumbing",
            "Leak repair, unclogging and fixture replacement, same day.",
            "plumbing",
            12000,
            "prov-marco",
            "Marco Ruiz",
        ),
        listing(
            "svc-tutoring-01",
            "Math tutoring",
            "One-on-one tutoring for middle and high school, online or at home.",
            "tutoring",
            4500,
            "prov-lena",
            "Lena Fischer",
        ),
        listing(
            "svc-garden-01",
            "Garden maintenance",
            "Mowing, hedge trimming and seasonal planting.",
            "gardening",
            6000,
            "prov-tomas",
            "Tomas Berg",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog = CatalogStore::with_demo_listings();
        assert!(!catalog.is_empty());

        let first = &catalog.list()[0];
        let found = catalog.get(&first.id).unwrap();
        assert_eq!(found.title, first.title);

        assert!(catalog.get("nope").is_none());
    }

    #[test]
    fn test_yaml_seed() {
        let yaml = r#"
- id: svc-test
  title: Test service
  description: A service
  category: testing
  price_cents: 100
  provider:
    id: prov-t
    display_name: Tess Ter
"#;
        let catalog = CatalogStore::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.len(), 1);
        let listing = catalog.get("svc-test").unwrap();
        // `approved` defaults to true when the seed omits it.
        assert!(listing.provider.approved);
    }

    #[test]
    fn test_booking_lifecycle() {
        let catalog = CatalogStore::with_demo_listings();
        let bookings = BookingStore::new();
        assert!(bookings.is_empty());

        let listing_id = catalog.list()[0].id.clone();
        let booking = bookings
            .create(&catalog, &listing_id, "client-1", "2026-08-10T09:00")
            .unwrap();
        assert_eq!(booking.client_id, "client-1");
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings.list_for_listing(&listing_id).len(), 1);
        assert!(bookings.list_for_listing("other").is_empty());
    }

    #[test]
    fn test_booking_rejects_unknown_listing() {
        let catalog = CatalogStore::with_demo_listings();
        let bookings = BookingStore::new();

        let err = bookings
            .create(&catalog, "svc-missing", "client-1", "anytime")
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownListing(_)));
        assert!(bookings.is_empty());
    }
}
