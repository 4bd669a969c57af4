mod engine;
mod processor;
mod select;

pub use engine::{BooleanOperation, BooleanOptions};
pub use processor::CrossingProcessor;
pub use select::{should_emit, OpType};
