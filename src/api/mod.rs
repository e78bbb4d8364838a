//! REST API module
//!
//! Provides HTTP access to a shared ledger.
//!
//! # Endpoints
//!
//! ## Participants
//! - `POST /api/participants` - Register a participant with its holdings
//! - `GET /api/participants/{identity}` - Holdings of a participant
//! - `GET /api/directory` - Current ownership snapshot
//!
//! ## Transactions
//! - `POST /api/transactions` - Queue a transfer
//! - `GET /api/transactions/pending` - Transfers awaiting the next cycle
//! - `GET /api/properties/{property}/history` - Committed transfers of a property
//!
//! ## Mining
//! - `POST /api/mine` - Run a mining cycle
//!
//! ## Chain
//! - `GET /api/chain` - All blocks and the chain length
//! - `GET /api/chain/blocks/{index}` - Block by 1-based index
//! - `GET /api/chain/validate` - Verify hash links and merkle roots
//! - `GET /api/stats` - Chain statistics
//!
//! ## WebSocket
//! - `GET /ws` - Real-time updates (ParticipantRegistered, TransactionSubmitted,
//!   BlockCommitted, ChainUpdated)

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::ApiState;
pub use routes::create_router;
pub use websocket::WsBroadcaster;
