pub mod batch_sampler;
pub mod time;
