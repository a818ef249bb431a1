//! On-disk state: layout, settings, records and the operation journal

pub mod journal;
pub mod layout;
pub mod records;
pub mod settings;
