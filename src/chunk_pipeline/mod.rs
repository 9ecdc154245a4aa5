//! The chunk loops: transform-and-splice over a whole file, and
//! placeholder-file creation with incremental injection.

pub mod applier;
pub mod injection;
pub mod report;
mod sink;

pub use self::applier::ChunkTransformApplier;
pub use self::injection::ColumnInjectionBuilder;
pub use self::report::{ChunkReport, SkipReason, SkippedChunk};
