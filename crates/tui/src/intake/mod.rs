pub mod form;
pub mod reconcile;
pub mod staging;
