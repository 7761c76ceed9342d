//! Localized message bundle for the presentation layer.
//!
//! Pages and components never hard-code user-facing copy; they look it up
//! by key. A missing key renders as the key itself so gaps are visible
//! instead of panicking.

use std::collections::HashMap;

use serde::Deserialize;

/// Built-in English bundle.
const BUILTIN: &str = r#"
app.name: Localserv
landing.title: Find local services
landing.tagline: Book trusted providers in your neighborhood
landing.browse: Available services
login.title: Sign in
login.body: Sign in to book services or manage your listings.
login.cta: Sign in
pending.title: Application received
pending.body: Your provider application is being reviewed. We will email you once it is approved.
apply.title: Become a provider
apply.body: Tell us about the services you offer and start receiving bookings.
admin.title: Admin panel
admin.body: Review provider applications and platform activity.
provider.title: Provider dashboard
provider.body: Manage your listings and upcoming bookings.
contact.title: Contact us
contact.body: Questions? Reach out and we will get back to you.
card.by: by
card.book: Book now
nav.home: Home
nav.contact: Contact
nav.login: Sign in
footer.note: Localserv connects neighbors with trusted local providers
"#;

/// Flat key/value message bundle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Messages {
    #[serde(flatten)]
    entries: HashMap<String, String>,
}

impl Messages {
    /// Parse a YAML bundle (a flat string-to-string mapping).
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// The built-in English bundle.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_yaml(BUILTIN).unwrap_or_default()
    }

    /// Look up a message, falling back to the key itself when missing.
    #[must_use]
    pub fn msg<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map_or(key, String::as_str)
    }
}
