//! OpenAPI documentation assembly.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Backlot Site API",
        version = "0.1.0",
        description = "Backend for the Backlot studio site: contact intake, CMS change webhooks, and CDN image redirects."
    ),
    paths(
        handlers::contact::submit_contact,
        handlers::revalidate::handle_change,
        handlers::images::redirect_to_cdn,
    ),
    components(schemas(
        handlers::contact::ContactSubmission,
        handlers::contact::ContactReceipt,
        handlers::revalidate::ChangeNotification,
        handlers::revalidate::RevalidationReport,
        error::ErrorResponse,
    )),
    tags(
        (name = "contact", description = "Contact form intake"),
        (name = "revalidate", description = "CMS change notifications"),
        (name = "images", description = "CDN image redirects")
    )
)]
pub struct ApiDoc;
