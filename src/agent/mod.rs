pub mod context;
pub mod loop_;

pub use loop_::{
    generate, Generator, GeneratorOptions, ToolErrorPolicy, DEFAULT_ROUNDTRIP_LIMIT,
};
