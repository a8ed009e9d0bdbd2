pub(crate) mod generation;
pub(crate) mod model;
