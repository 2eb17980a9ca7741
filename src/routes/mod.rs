/// Router Module Index
///
/// Routes are split by access level. Access control is applied to a whole module
/// through a layer in `create_router`, never route by route.

/// Pages and actions open to everyone. `like_post` checks identity itself.
pub mod public;

/// Authoring routes. Wrapped in `require_admin`.
pub mod admin;
