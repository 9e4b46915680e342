pub mod abort;
pub mod client;

pub use self::abort::AbortState;
pub use self::client::{Endpoint, HttpTransport, HttpTransportFactory};
