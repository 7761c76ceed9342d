//! Reusable HTML fragments.

use crate::catalog::ServiceListing;
use crate::i18n::Messages;

/// Escape text interpolated into HTML.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Format a minor-unit price for display.
fn format_price(price_cents: u32) -> String {
    format!("${}.{:02}", price_cents / 100, price_cents % 100)
}

/// Render a service listing card.
///
/// Pure function of the listing and the message bundle; the single action
/// is the book button, which posts to the booking API.
#[must_use]
pub fn service_card(listing: &ServiceListing, messages: &Messages) -> String {
    format!(
        r#"<div class="service-card flex flex-col gap-2 p-5 rounded-2xl bg-surface shadow-md" id="card-{id}">
    <div class="flex items-center justify-between">
        <h3 class="font-semibold text-lg">{title}</h3>
        <span class="text-xs px-2 py-1 rounded-lg bg-surfaceVariant text-textMuted">{category}</span>
    </div>
    <p class="text-sm text-textMuted">{description}</p>
    <div class="flex items-center justify-between mt-2">
        <span class="text-sm text-textSecondary">{by_label} {provider_name}</span>
        <span class="font-semibold">{price}</span>
    </div>
    <button
        class="mt-2 h-10 rounded-xl bg-primary text-white hover:bg-primaryMuted active:scale-95 transition-all"
        hx-post="/api/bookings"
        hx-ext="json-enc"
        hx-vals='{{"listing_id": "{id}", "slot": ""}}'
        hx-swap="none">
        {book_label}
    </button>
</div>"#,
        id = escape_html(&listing.id),
        title = escape_html(&listing.title),
        category = escape_html(&listing.category),
        description = escape_html(&listing.description),
        by_label = messages.msg("card.by"),
        provider_name = escape_html(&listing.provider.display_name),
        price = format_price(listing.price_cents),
        book_label = messages.msg("card.book"),
    )
}

/// Render the pending-approval status panel.
#[must_use]
pub fn pending_panel(messages: &Messages) -> String {
    format!(
        r#"<div class="rounded-3xl bg-surface p-8 shadow-lg text-center max-w-xl mx-auto">
    <h1 class="text-2xl font-bold mb-4">{title}</h1>
    <p class="text-textMuted">{body}</p>
</div>"#,
        title = messages.msg("pending.title"),
        body = messages.msg("pending.body"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ProviderSummary, ServiceListing};

    fn listing() -> ServiceListing {
        ServiceListing {
            id: "svc-1".into(),
            title: "Window cleaning".into(),
            description: "Streak-free".into(),
            category: "cleaning".into(),
            price_cents: 2550,
            provider: ProviderSummary {
                id: "prov-1".into(),
                display_name: "Pat Quinn".into(),
                approved: true,
            },
        }
    }

    #[test]
    fn test_card_contains_listing_fields() {
        let html = service_card(&listing(), &Messages::builtin());
        assert!(html.contains("Window cleaning"));
        assert!(html.contains("Pat Quinn"));
        assert!(html.contains("$25.50"));
        assert!(html.contains("Book now"));
        assert!(html.contains(r#"hx-post="/api/bookings""#));
    }

    #[test]
    fn test_card_falls_back_to_message_key() {
        let empty = Messages::from_yaml("{}").unwrap();
        let html = service_card(&listing(), &empty);
        assert!(html.contains("card.book"));
    }

    #[test]
    fn test_card_escapes_html() {
        let mut l = listing();
        l.title = "<script>alert(1)</script>".into();
        let html = service_card(&l, &Messages::builtin());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
