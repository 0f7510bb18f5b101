pub mod normalizer;
pub mod notifier;
pub mod payment_pipeline;
