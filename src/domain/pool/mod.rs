//! Pool domain - normalized pool records and new-pool tracking

mod pool_record;
mod seen_set;

pub use pool_record::{PoolDetail, PoolRecord, PoolVariant};
pub use seen_set::SeenSet;
