//! Authorization for every LMS resource.
//!
//! The decision itself lives in [`policy`]: a pure function of the caller,
//! the requested action and a descriptor of the target resource. The
//! descriptors carry whatever ownership facts a rule needs (the creator of
//! an assignment, the instructor of a course, ...), and [`ownership`]
//! resolves those facts from the store.
//!
//! Handlers always check existence before permission: a missing target is
//! reported as not found even to a caller who could never have accessed it.

mod error;
pub mod ownership;
mod policy;

pub use error::AuthzError;
pub use ownership::{Owned, ResolveError};
pub use policy::{Action, Caller, ListScope, Resource, authorize, list_scope};
