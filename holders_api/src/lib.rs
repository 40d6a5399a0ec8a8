mod client;
mod errors;
mod user_agent;
pub use self::client::Client;
pub use self::errors::Error;
