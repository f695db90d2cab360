mod partition;
mod worker;

pub use partition::Partition;
pub use worker::GradientWorker;
