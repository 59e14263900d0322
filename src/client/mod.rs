// Module declarations
mod builder;
mod connection;
mod core;
mod endpoint;
mod state;

// Public API exports
pub use self::core::RealtimeClient;
pub use builder::{ENV_PREFIX, RealtimeClientBuilder, RealtimeClientOptions};
pub use connection::{ConnectionManager, ConnectionState, ConnectionStatus};
pub use endpoint::build_endpoint_url;
pub use state::ClientState;
