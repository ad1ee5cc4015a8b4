pub mod dispatcher;
pub mod push_gateway;

pub use dispatcher::*;
pub use push_gateway::*;
