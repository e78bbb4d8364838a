//! REST API handlers for ledger operations

use crate::api::websocket::{WsBroadcaster, WsEvent};
use crate::core::{
    Block, ChainStats, LedgerEngine, MiningReport, OwnerDirectory, RegistrationError, Transaction,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
///
/// Every mutation takes the ledger's write lock, so a mining cycle runs
/// alone and validate-then-apply is atomic per transfer.
#[derive(Clone)]
pub struct ApiState {
    pub ledger: Arc<RwLock<LedgerEngine>>,
    pub ws_broadcaster: Arc<WsBroadcaster>,
}

impl ApiState {
    pub fn new(ledger: LedgerEngine) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            ws_broadcaster: Arc::new(WsBroadcaster::new()),
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct BlockInfo {
    pub index: u64,
    pub hash: String,
    pub previous_hash: String,
    pub merkle_root: String,
    pub timestamp: String,
    pub miner: String,
    pub transactions: usize,
}

impl From<&Block> for BlockInfo {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index,
            hash: block.hash(),
            previous_hash: block.previous_hash.clone(),
            merkle_root: block.merkle_root.clone(),
            timestamp: block.timestamp.to_rfc3339(),
            miner: block.miner.clone(),
            transactions: block.tx_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub identity: String,
    pub properties: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub transaction: Transaction,
    pub pending: usize,
}

#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub pending_transactions: usize,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub property: String,
    pub current_owner: Option<String>,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub blocks_checked: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

fn api_error(status: StatusCode, error: String) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError { error }))
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub identity: String,
    #[serde(default)]
    pub properties: Vec<String>,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub seller: String,
    pub property: String,
    pub buyer: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// POST /api/participants - Register a participant
pub async fn register_participant(
    State(state): State<ApiState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ParticipantResponse>), (StatusCode, Json<ApiError>)> {
    let mut ledger = state.ledger.write().await;

    match ledger.register_participant(&req.identity, req.properties.clone()) {
        Ok(()) => {
            state
                .ws_broadcaster
                .broadcast(WsEvent::ParticipantRegistered {
                    identity: req.identity.clone(),
                    properties: req.properties.len(),
                });

            Ok((
                StatusCode::CREATED,
                Json(ParticipantResponse {
                    identity: req.identity,
                    properties: req.properties,
                }),
            ))
        }
        Err(e) => {
            let status = match e {
                RegistrationError::DuplicateIdentity(_)
                | RegistrationError::PropertyAlreadyHeld { .. } => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            Err(api_error(status, format!("Registration rejected: {}", e)))
        }
    }
}

/// GET /api/participants/{identity} - Holdings of a participant
pub async fn get_participant(
    State(state): State<ApiState>,
    Path(identity): Path<String>,
) -> Result<Json<ParticipantResponse>, (StatusCode, Json<ApiError>)> {
    let ledger = state.ledger.read().await;

    match ledger.holdings(&identity) {
        Some(properties) if ledger.is_registered(&identity) => Ok(Json(ParticipantResponse {
            properties: properties.to_vec(),
            identity,
        })),
        _ => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Participant {} not found", identity),
        )),
    }
}

/// GET /api/directory - Current ownership snapshot
pub async fn get_directory(State(state): State<ApiState>) -> Json<OwnerDirectory> {
    let ledger = state.ledger.read().await;
    Json(ledger.get_directory())
}

/// POST /api/transactions - Queue a transfer
pub async fn submit_transaction(
    State(state): State<ApiState>,
    Json(req): Json<TransferRequest>,
) -> (StatusCode, Json<SubmitResponse>) {
    let transaction = Transaction::new(&req.seller, &req.property, &req.buyer);

    let pending = {
        let mut ledger = state.ledger.write().await;
        ledger.submit(transaction.clone());
        ledger.pending_count()
    };

    state.ws_broadcaster.broadcast(WsEvent::TransactionSubmitted {
        transaction: transaction.clone(),
    });

    (
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            transaction,
            pending,
        }),
    )
}

/// GET /api/transactions/pending - Transfers waiting for the next cycle
pub async fn get_pending(State(state): State<ApiState>) -> Json<PendingResponse> {
    let ledger = state.ledger.read().await;
    let transactions = ledger.pending_transactions();

    Json(PendingResponse {
        pending_transactions: transactions.len(),
        transactions,
    })
}

/// GET /api/properties/{property}/history - Committed transfers of a property
pub async fn get_property_history(
    State(state): State<ApiState>,
    Path(property): Path<String>,
) -> Json<HistoryResponse> {
    let ledger = state.ledger.read().await;

    Json(HistoryResponse {
        current_owner: ledger.owner_of(&property).map(str::to_string),
        transactions: ledger.transaction_history(&property),
        property,
    })
}

/// POST /api/mine - Run a mining cycle
pub async fn mine(State(state): State<ApiState>) -> Json<MiningReport> {
    let mut ledger = state.ledger.write().await;
    let report = ledger.mine();

    for index in &report.committed_blocks {
        if let Some(block) = ledger.get_block(*index) {
            state.ws_broadcaster.broadcast(WsEvent::BlockCommitted {
                block: BlockInfo::from(block),
            });
        }
    }

    if !report.committed_blocks.is_empty() {
        let stats = ledger.stats();
        state.ws_broadcaster.broadcast(WsEvent::ChainUpdated {
            length: stats.length,
            latest_hash: stats.latest_hash,
            committed_transfers: stats.committed_transfers,
        });
    }

    Json(report)
}

/// GET /api/chain - Full chain and its length
pub async fn get_chain(State(state): State<ApiState>) -> Json<ChainResponse> {
    let ledger = state.ledger.read().await;
    let (blocks, length) = ledger.get_chain();

    Json(ChainResponse {
        length,
        blocks: blocks.to_vec(),
    })
}

/// GET /api/chain/blocks/{index} - Get block by 1-based index
pub async fn get_block(
    State(state): State<ApiState>,
    Path(index): Path<u64>,
) -> Result<Json<Block>, (StatusCode, Json<ApiError>)> {
    let ledger = state.ledger.read().await;

    ledger.get_block(index).cloned().map(Json).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("Block at index {} not found", index),
        )
    })
}

/// GET /api/chain/validate - Verify hash links and merkle roots
pub async fn validate_chain(State(state): State<ApiState>) -> Json<ValidationResponse> {
    let ledger = state.ledger.read().await;
    let block_count = ledger.block_count();

    match ledger.verify_chain() {
        Ok(()) => Json(ValidationResponse {
            valid: true,
            blocks_checked: block_count,
            message: format!("Ledger is valid ({} blocks verified)", block_count),
        }),
        Err(e) => {
            log::error!("Chain integrity violation: {}", e);
            Json(ValidationResponse {
                valid: false,
                blocks_checked: block_count,
                message: e.to_string(),
            })
        }
    }
}

/// GET /api/stats - Chain statistics
pub async fn get_stats(State(state): State<ApiState>) -> Json<ChainStats> {
    let ledger = state.ledger.read().await;
    Json(ledger.stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ApiState {
        ApiState::new(LedgerEngine::new())
    }

    async fn register(state: &ApiState, identity: &str, properties: &[&str]) -> StatusCode {
        let req = RegisterRequest {
            identity: identity.to_string(),
            properties: properties.iter().map(|s| s.to_string()).collect(),
        };
        match register_participant(State(state.clone()), Json(req)).await {
            Ok((status, _)) => status,
            Err((status, _)) => status,
        }
    }

    async fn transfer(state: &ApiState, seller: &str, property: &str, buyer: &str) -> usize {
        let req = TransferRequest {
            seller: seller.to_string(),
            property: property.to_string(),
            buyer: buyer.to_string(),
        };
        let (status, Json(resp)) = submit_transaction(State(state.clone()), Json(req)).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        resp.pending
    }

    #[tokio::test]
    async fn test_register_status_codes() {
        let state = state();
        assert_eq!(register(&state, "alice", &["x"]).await, StatusCode::CREATED);
        assert_eq!(register(&state, "alice", &[]).await, StatusCode::CONFLICT);
        assert_eq!(register(&state, "bob", &["x"]).await, StatusCode::CONFLICT);
        assert_eq!(register(&state, "bob", &[""]).await, StatusCode::BAD_REQUEST);
        assert_eq!(register(&state, "", &[]).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_transfer_flow() {
        let state = state();
        register(&state, "alice", &["x"]).await;
        register(&state, "bob", &[]).await;

        assert_eq!(transfer(&state, "alice", "x", "bob").await, 1);
        let Json(pending) = get_pending(State(state.clone())).await;
        assert_eq!(pending.pending_transactions, 1);

        let Json(report) = mine(State(state.clone())).await;
        assert_eq!(report.committed_blocks, vec![2]);

        let Json(bob) = get_participant(State(state.clone()), Path("bob".to_string()))
            .await
            .unwrap();
        assert_eq!(bob.properties, vec!["x".to_string()]);

        let Json(history) =
            get_property_history(State(state.clone()), Path("x".to_string())).await;
        assert_eq!(history.current_owner.as_deref(), Some("bob"));
        assert_eq!(history.transactions.len(), 1);

        let Json(chain) = get_chain(State(state.clone())).await;
        assert_eq!(chain.length, 2);

        let Json(validation) = validate_chain(State(state.clone())).await;
        assert!(validation.valid);
    }

    #[tokio::test]
    async fn test_invalid_transfer_dropped() {
        let state = state();
        register(&state, "alice", &["x"]).await;
        transfer(&state, "alice", "x", "ghost").await;

        let Json(report) = mine(State(state.clone())).await;
        assert!(report.committed_blocks.is_empty());
        assert_eq!(report.rejected.len(), 1);

        let Json(pending) = get_pending(State(state.clone())).await;
        assert_eq!(pending.pending_transactions, 0);
        let Json(stats) = get_stats(State(state.clone())).await;
        assert_eq!(stats.length, 1);
    }

    #[tokio::test]
    async fn test_not_found() {
        let state = state();

        let err = get_block(State(state.clone()), Path(5)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let err = get_participant(State(state.clone()), Path("nobody".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let Json(genesis) = get_block(State(state.clone()), Path(1)).await.unwrap();
        assert!(genesis.is_genesis());
    }

    #[tokio::test]
    async fn test_mine_broadcasts_commits() {
        let state = state();
        let mut rx = state.ws_broadcaster.subscribe();
        register(&state, "alice", &["x"]).await;
        register(&state, "bob", &[]).await;
        transfer(&state, "alice", "x", "bob").await;
        mine(State(state.clone())).await;

        let mut saw_commit = false;
        while let Ok(event) = rx.try_recv() {
            if let WsEvent::BlockCommitted { block } = event {
                assert_eq!(block.index, 2);
                assert_eq!(block.transactions, 1);
                saw_commit = true;
            }
        }
        assert!(saw_commit);
    }
}
