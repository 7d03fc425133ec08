pub mod reconcile_pipeline;

pub use reconcile_pipeline::ReconcilePipeline;
