//! Shared trust primitives for the edge and the internal services.
//!
//! Responsibility:
//! - Token issuance/verification with the process-wide signing key (`token`)
//! - Identity header names and the strip-then-inject helpers (`headers`)
//! - Per-service re-validation of edge-injected headers (`guard`)
//! - Service-to-service calls on behalf of a verified caller (`client`)
//! - HTTP layers every internal service mounts (`transport`)
//!
//! Nothing in here holds request-scoped state. The codec and route policy are
//! built once at start and shared read-only.

pub mod client;
pub mod error;
pub mod guard;
pub mod headers;
pub mod role;
pub mod token;
pub mod transport;
pub mod visibility;

pub use client::{IdentityClient, PropagationError, TargetOperation};
pub use error::AuthError;
pub use guard::{AdminIdentity, Identity, IdentityContext, MaybeIdentity};
pub use role::Role;
pub use token::{Claims, TokenCodec, TokenError, VerifyError};
pub use visibility::Visibility;
