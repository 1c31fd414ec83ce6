pub mod clock;
pub mod config;
pub mod event_publisher;
pub mod repositories;

pub use clock::{SimulationClock, SystemClock};
pub use config::{AccountSeed, ConfigError, EngineConfig, MarketSeed};
pub use event_publisher::BroadcastEventPublisher;
pub use repositories::{InMemoryLedger, InMemoryMarketStore, InMemoryPriceHistory};
