pub(crate) mod adapter;
pub(crate) mod graph;
pub(crate) mod merge;
pub(crate) mod request;
pub(crate) mod solver;
