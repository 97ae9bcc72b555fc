pub mod backup;
pub mod listing;
pub mod metadata;
pub mod naming;
pub mod sanitize;
