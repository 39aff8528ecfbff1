//! CLI command implementations.

pub(crate) mod list;
pub(crate) mod publish;

pub(crate) use list::ListArgs;
pub(crate) use publish::PublishArgs;
