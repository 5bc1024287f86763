pub mod handler;
pub mod params;
pub mod tools;

pub use handler::Ga4McpServer;
pub use tools::ToolRegistry;
