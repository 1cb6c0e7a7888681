/*!
 * Downstream guard
 *
 * Responsibility:
 * - Re-derive the caller identity from edge-injected headers inside each service
 * - Enforce the role an operation declares, independently of the edge
 * - Hand handlers an `IdentityContext` (the only way caller identity enters business data)
 *
 * Public API:
 * - authorize / identify / guard
 * - IdentityContext
 * - Identity / AdminIdentity / MaybeIdentity (axum extractors)
 */

mod core;
mod extract;
mod types;

pub use self::core::{authorize, guard, identify};
pub use extract::{AdminIdentity, Identity, MaybeIdentity};
pub use types::IdentityContext;
