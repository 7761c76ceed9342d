//! HTML shell and page renderers.

use crate::catalog::ServiceListing;
use crate::i18n::Messages;
use crate::ui::components;

/// Generate the HTML shell for the application.
#[must_use]
pub fn html_shell(title: &str, content: &str, messages: &Messages) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en" class="dark">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Local services marketplace">
    <title>{title} - {app_name}</title>

    <!-- HTMX and Extensions (local) -->
    <script src="/static/vendor/htmx-2.0.8.min.js"></script>
    <script src="/static/vendor/htmx-json-enc.js"></script>
    <script defer src="/static/vendor/alpine.min.js"></script>

    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="min-h-screen bg-background text-textPrimary antialiased">
    <div id="app-shell" class="flex flex-col min-h-screen">
        <header class="sticky top-0 z-50 w-full bg-surfaceContainer backdrop-blur shadow-sm shrink-0">
            <div class="container mx-auto flex h-14 md:h-16 items-center justify-between px-4 md:px-6 max-w-5xl">
                <a href="/" class="flex items-center gap-2 md:gap-3 font-semibold hover:opacity-80 transition-opacity">
                    <svg class="h-5 w-5 md:h-6 md:w-6 text-primary" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
                        <path d="M3 9.5 12 3l9 6.5V21a1 1 0 0 1-1 1H4a1 1 0 0 1-1-1Z"/>
                        <path d="M9 22V12h6v10"/>
                    </svg>
                    <span class="text-base md:text-lg">{app_name}</span>
                </a>
                <nav class="flex items-center gap-1" hx-boost="true">
                    <a href="/" class="px-3 py-2 rounded-xl text-sm text-textSecondary hover:text-textPrimary hover:bg-surface transition-all">{nav_home}</a>
                    <a href="/contact" class="px-3 py-2 rounded-xl text-sm text-textSecondary hover:text-textPrimary hover:bg-surface transition-all">{nav_contact}</a>
                    <a href="/login" class="px-3 py-2 rounded-xl text-sm text-textSecondary hover:text-textPrimary hover:bg-surface transition-all">{nav_login}</a>
                </nav>
            </div>
        </header>

        <main id="app" class="flex-1 overflow-y-auto container mx-auto px-4 md:px-6 py-4 md:py-8 max-w-5xl">
            {content}
        </main>

        <footer class="bg-surfaceContainer py-3 md:py-6 shrink-0 hidden md:block">
            <div class="container mx-auto px-4 md:px-6 max-w-5xl">
                <p class="text-xs text-textMuted text-center">{footer_note}</p>
            </div>
        </footer>
    </div>
</body>
</html>"#,
        title = title,
        app_name = messages.msg("app.name"),
        nav_home = messages.msg("nav.home"),
        nav_contact = messages.msg("nav.contact"),
        nav_login = messages.msg("nav.login"),
        footer_note = messages.msg("footer.note"),
        content = content,
    )
}

/// Landing page: hero plus the listing grid.
#[must_use]
pub fn landing(listings: &[ServiceListing], messages: &Messages) -> String {
    let cards: String = listings
        .iter()
        .map(|l| components::service_card(l, messages))
        .collect();
    let content = format!(
        r#"<div class="space-y-8">
    <div class="rounded-3xl bg-surface p-8 shadow-lg text-center">
        <h1 class="text-3xl font-bold mb-2">{title}</h1>
        <p class="text-textMuted">{tagline}</p>
    </div>
    <h2 class="text-xl font-semibold">{browse}</h2>
    <div class="grid gap-4 md:grid-cols-2">{cards}</div>
</div>"#,
        title = messages.msg("landing.title"),
        tagline = messages.msg("landing.tagline"),
        browse = messages.msg("landing.browse"),
        cards = cards,
    );
    html_shell(messages.msg("landing.title"), &content, messages)
}

/// Login page: triggers an interactive sign-in against the identity
/// provider.
#[must_use]
pub fn login(messages: &Messages) -> String {
    let content = format!(
        r#"<div class="rounded-3xl bg-surface p-8 shadow-lg text-center max-w-md mx-auto">
    <h1 class="text-2xl font-bold mb-4">{title}</h1>
    <p class="text-textMuted mb-6">{body}</p>
    <button
        class="h-12 px-6 rounded-2xl bg-primary text-white hover:bg-primaryMuted active:scale-95 font-medium transition-all shadow-md"
        hx-post="/api/auth/sign-in"
        hx-swap="none">
        {cta}
    </button>
</div>"#,
        title = messages.msg("login.title"),
        body = messages.msg("login.body"),
        cta = messages.msg("login.cta"),
    );
    html_shell(messages.msg("login.title"), &content, messages)
}

/// Pending-approval page body (rendered when the visitor is authenticated
/// but not yet an approved provider).
#[must_use]
pub fn pending_approval(messages: &Messages) -> String {
    html_shell(
        messages.msg("pending.title"),
        &components::pending_panel(messages),
        messages,
    )
}

/// Apply/onboarding page.
#[must_use]
pub fn apply(messages: &Messages) -> String {
    let content = format!(
        r#"<div class="rounded-3xl bg-surface p-8 shadow-lg max-w-xl mx-auto">
    <h1 class="text-2xl font-bold mb-4">{title}</h1>
    <p class="text-textMuted">{body}</p>
</div>"#,
        title = messages.msg("apply.title"),
        body = messages.msg("apply.body"),
    );
    html_shell(messages.msg("apply.title"), &content, messages)
}

/// Admin panel page.
#[must_use]
pub fn admin_panel(messages: &Messages) -> String {
    let content = format!(
        r#"<div class="rounded-3xl bg-surface p-8 shadow-lg">
    <h1 class="text-2xl font-bold mb-4">{title}</h1>
    <p class="text-textMuted">{body}</p>
</div>"#,
        title = messages.msg("admin.title"),
        body = messages.msg("admin.body"),
    );
    html_shell(messages.msg("admin.title"), &content, messages)
}

/// Provider dashboard page.
#[must_use]
pub fn provider_dashboard(messages: &Messages) -> String {
    let content = format!(
        r#"<div class="rounded-3xl bg-surface p-8 shadow-lg">
    <h1 class="text-2xl font-bold mb-4">{title}</h1>
    <p class="text-textMuted">{body}</p>
</div>"#,
        title = messages.msg("provider.title"),
        body = messages.msg("provider.body"),
    );
    html_shell(messages.msg("provider.title"), &content, messages)
}

/// Contact page.
#[must_use]
pub fn contact(messages: &Messages) -> String {
    let content = format!(
        r#"<div class="rounded-3xl bg-surface p-8 shadow-lg max-w-xl mx-auto">
    <h1 class="text-2xl font-bold mb-4">{title}</h1>
    <p class="text-textMuted">{body}</p>
</div>"#,
        title = messages.msg("contact.title"),
        body = messages.msg("contact.body"),
    );
    html_shell(messages.msg("contact.title"), &content, messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogStore;

    #[test]
    fn test_landing_renders_all_cards() {
        let catalog = CatalogStore::with_demo_listings();
        let listings = catalog.list();
        let html = landing(&listings, &Messages::builtin());
        for listing in &listings {
            assert!(html.contains(&listing.title));
        }
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_login_has_sign_in_action() {
        let html = login(&Messages::builtin());
        assert!(html.contains(r#"hx-post="/api/auth/sign-in""#));
    }

    #[test]
    fn test_pending_page_renders_panel() {
        let html = pending_approval(&Messages::builtin());
        assert!(html.contains("Application received"));
    }
}
