pub mod activity_log;
pub mod delivery_ledger;
