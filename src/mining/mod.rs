//! Transaction pooling and proposer scheduling for mining cycles

pub mod pool;
pub mod scheduler;

pub use pool::TransactionPool;
pub use scheduler::{FixedOrder, MinerScheduler, PoetLottery};
