//! Content-type to route map for CMS change notifications.
//!
//! The site is a handful of routes composed from a few content types. When
//! the CMS reports a change, the webhook handler looks the type up here and
//! purges exactly the routes that embed it. Unknown types map to nothing:
//! a new schema type must be added here deliberately before its changes
//! propagate, and callers log the miss rather than fail.

/// Every route the site serves. Types that touch global chrome (navigation,
/// footer, metadata) purge all of them.
pub const ALL_ROUTES: &[&str] = &["/", "/projects", "/services", "/clients", "/about", "/contact"];

/// Projects surface on the home page grid and the portfolio index.
const PROJECT_ROUTES: &[&str] = &["/", "/projects"];
/// Services surface on the home page summary and the services index.
const SERVICE_ROUTES: &[&str] = &["/", "/services"];
const CLIENT_ROUTES: &[&str] = &["/clients"];
/// Editorial pages drive the home, about and contact copy.
const PAGE_ROUTES: &[&str] = &["/", "/about", "/contact"];

/// Routes to purge when a document of `content_type` changes.
/// `None` for unmapped types.
pub fn routes_for(content_type: &str) -> Option<&'static [&'static str]> {
    match content_type {
        "project" => Some(PROJECT_ROUTES),
        "service" => Some(SERVICE_ROUTES),
        "client" => Some(CLIENT_ROUTES),
        "page" => Some(PAGE_ROUTES),
        "siteSettings" => Some(ALL_ROUTES),
        _ => None,
    }
}
