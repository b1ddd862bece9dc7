//! Owners
//!
//! The authenticated principal is resolved outside this crate; every
//! operation receives the owner's identifier explicitly.

use crate::uuids::TypedUuid;

/// Owner marker
#[derive(Debug)]
pub struct Owner;

/// Owner UUID
pub type OwnerUuid = TypedUuid<Owner>;
