pub(crate) mod action;
pub(crate) mod builder;
pub(crate) mod reconstruct;
