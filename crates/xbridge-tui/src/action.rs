//! Actions for state updates, and requests to the chain task.

use xbridge_chain::{AggregatorLimits, ReceiptStatus};
use xbridge_core::{Chain, ConnectionStatus, DepositAction, LimitsContext, NavigationState};

/// Actions that can update application state.
#[derive(Debug, Clone)]
pub enum Action {
    /// Connection status of one chain changed.
    UpdateConnectionStatus(Chain, ConnectionStatus),
    /// Navigate to the deposit page with the wallet's state.
    OpenDeposit(NavigationState),
    /// Leave the deposit page.
    CloseDeposit,
    /// Wizard transition request.
    Deposit(DepositAction),
    /// Aggregator limits fetched for the token selector.
    SetAggregatorLimits {
        context: LimitsContext,
        limits: AggregatorLimits,
    },
    /// Receipt polling for a submitted deposit finished.
    DepositReceipt {
        hash: String,
        outcome: Result<ReceiptStatus, String>,
    },
    Quit,
}

/// Work for the background chain task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainRequest {
    /// Load aggregator limits for the token selector.
    FetchLimits(LimitsContext),
    /// Poll for the receipt of a submitted deposit.
    WatchDeposit { chain: Chain, hash: String },
}
