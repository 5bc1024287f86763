pub mod engine;

pub use engine::validate;
