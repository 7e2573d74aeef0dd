pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod formats;
pub mod sniffer;
pub mod transport;
pub mod types;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ConfigError, ProbeError, TransportError};
pub use sniffer::sniff;
pub use transport::{DispatchMode, HttpTransport, MemoryResource, MemoryTransport, ModeProbe, Transport};
pub use types::{BatchResult, ImageFormat, ImageMeta, ParseOutcome, ProbeResult};
