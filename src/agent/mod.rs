pub mod endpoint;
pub mod http;

pub use endpoint::{AgentEndpoint, EndpointError, ReplyChunk, ReplyRequest};
pub use http::HttpAgentEndpoint;
