//! CLI command implementations

pub(crate) mod add;
pub(crate) mod check;
pub(crate) mod collect;
pub(crate) mod common;
