pub mod airtable;
pub mod disabled;
pub mod gmail;
pub mod stripe;
