pub mod export;
pub mod source;

pub use source::SourceArgs;
