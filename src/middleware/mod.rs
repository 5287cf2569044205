//! Request middleware and extractors

pub mod validation;

pub use validation::ValidatedJson;
