//! Service listings and booking storage.
//!
//! In-memory, thread-safe stores behind the marketplace pages: listings
//! are seeded at startup (from YAML or the built-in demo set), bookings
//! accumulate as clients book providers.
//!
//! # Example
//!
//! ```rust
//! use localserv::catalog::{BookingStore, CatalogStore};
//!
//! let catalog = CatalogStore::with_demo_listings();
//! let bookings = BookingStore::new();
//!
//! let listing = &catalog.list()[0];
//! let booking = bookings
//!     .create(&catalog, &listing.id, "client-1", "2026-08-10T09:00")
//!     .unwrap();
//! assert_eq!(booking.listing_id, listing.id);
//! ```

mod store;

pub use store::{Booking, BookingStore, CatalogError, CatalogStore, ProviderSummary, ServiceListing};
