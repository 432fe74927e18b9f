pub(crate) mod compiler;
pub(crate) mod filter;
pub(crate) mod plan;
