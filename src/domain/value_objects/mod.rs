mod account;
mod ids;
mod price;
mod side;

pub use account::{AccountId, CurrencyScope, OwnerId};
pub use ids::{GoodId, MarketId, RegionId, TradedGood};
pub use price::Price;
pub use side::Side;

pub type Timestamp = chrono::DateTime<chrono::Utc>;
