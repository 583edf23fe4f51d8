/// Router Module Index
///
/// Routes are grouped by access tier, and each tier gets its access control applied as
/// an Axum layer in `create_router`, so no endpoint is exposed by accident.

/// Routes accessible to everyone (anonymous API endpoints, health).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
pub mod authenticated;

/// API routes restricted to the `super_admin` role. Authenticated by the same layer as
/// `authenticated`; the role itself is checked by the handlers through the policy.
pub mod super_admin;

/// Server-rendered pages, gated per role by the layouts in `pages`.
pub mod pages;
