//! Deposit wizard state and its reducer.
//!
//! The wizard walks through chain -> token -> amount -> review -> confirm ->
//! processing -> complete. All state lives in a [`DepositState`] owned by the
//! page that shows the wizard, and every change goes through
//! [`DepositState::reduce`].

use serde::{Deserialize, Serialize};

use crate::types::{Balance, Chain, CrossBridgeAsset};

/// Wizard step. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepositStep {
    #[default]
    ChainSelector,
    TokenSelector,
    AmountSelector,
    Review,
    Confirm,
    Processing,
    Complete,
}

impl DepositStep {
    pub fn all() -> &'static [DepositStep] {
        &[
            DepositStep::ChainSelector,
            DepositStep::TokenSelector,
            DepositStep::AmountSelector,
            DepositStep::Review,
            DepositStep::Confirm,
            DepositStep::Processing,
            DepositStep::Complete,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            DepositStep::ChainSelector => 0,
            DepositStep::TokenSelector => 1,
            DepositStep::AmountSelector => 2,
            DepositStep::Review => 3,
            DepositStep::Confirm => 4,
            DepositStep::Processing => 5,
            DepositStep::Complete => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DepositStep::ChainSelector => "Select network",
            DepositStep::TokenSelector => "Select token",
            DepositStep::AmountSelector => "Enter amount",
            DepositStep::Review => "Review",
            DepositStep::Confirm => "Confirm",
            DepositStep::Processing => "Processing",
            DepositStep::Complete => "Complete",
        }
    }

    /// The single view mounted for this step.
    pub fn view(&self) -> StepView {
        match self {
            DepositStep::ChainSelector => StepView::ChainSelector,
            DepositStep::TokenSelector => StepView::TokenSelector,
            DepositStep::AmountSelector => StepView::AmountSelector,
            DepositStep::Review => StepView::Review,
            DepositStep::Confirm => StepView::Confirm,
            DepositStep::Processing => StepView::Processing,
            DepositStep::Complete => StepView::Complete,
        }
    }

    /// Step reached by going back, if going back is allowed.
    pub fn previous(&self) -> Option<DepositStep> {
        match self {
            DepositStep::TokenSelector => Some(DepositStep::ChainSelector),
            DepositStep::AmountSelector => Some(DepositStep::TokenSelector),
            DepositStep::Review => Some(DepositStep::AmountSelector),
            DepositStep::Confirm => Some(DepositStep::Review),
            DepositStep::ChainSelector | DepositStep::Processing | DepositStep::Complete => None,
        }
    }

    /// Steps that cannot be shown without a source chain.
    pub fn requires_chain(&self) -> bool {
        matches!(
            self,
            DepositStep::TokenSelector
                | DepositStep::AmountSelector
                | DepositStep::Review
                | DepositStep::Confirm
        )
    }
}

/// Named views of the wizard; one per [`DepositStep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepView {
    ChainSelector,
    TokenSelector,
    AmountSelector,
    Review,
    Confirm,
    Processing,
    Complete,
}

impl StepView {
    pub fn step(&self) -> DepositStep {
        match self {
            StepView::ChainSelector => DepositStep::ChainSelector,
            StepView::TokenSelector => DepositStep::TokenSelector,
            StepView::AmountSelector => DepositStep::AmountSelector,
            StepView::Review => DepositStep::Review,
            StepView::Confirm => DepositStep::Confirm,
            StepView::Processing => DepositStep::Processing,
            StepView::Complete => DepositStep::Complete,
        }
    }
}

/// What the user has picked so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSelection {
    /// Source chain.
    pub chain: Option<Chain>,
    pub target_chain: Option<Chain>,
    pub target_asset: Option<CrossBridgeAsset>,
    pub source_asset: Option<CrossBridgeAsset>,
    /// Receiver address on the target chain.
    pub receiver: Option<String>,
    /// Amount in source token base units.
    pub amount: Option<Balance>,
}

impl DepositSelection {
    /// Every field needed to build the deposit is set.
    pub fn is_complete(&self) -> bool {
        self.chain.is_some()
            && self.target_chain.is_some()
            && self.target_asset.is_some()
            && self.source_asset.is_some()
            && self.receiver.is_some()
            && self.amount.is_some_and(|a| a > 0)
    }
}

/// Status of the deposit transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TxStatus {
    #[default]
    Idle,
    /// Unsigned payload shown, waiting for the external wallet.
    AwaitingSignature,
    /// Broadcast, waiting for a receipt.
    Pending,
    Confirmed,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositTx {
    pub hash: Option<String>,
    pub status: TxStatus,
}

/// Scope of an aggregator limits query. A result only applies while the
/// wizard still shows the same scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LimitsContext {
    pub chain: Chain,
    pub target_chain: Chain,
    pub target_asset: CrossBridgeAsset,
}

/// Transition requests consumed by [`DepositState::reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositAction {
    /// Start a fresh wizard run.
    Init,
    SelectReceiver(String),
    SelectTargetAsset(CrossBridgeAsset),
    SelectSourceNetwork(Chain),
    ClearSourceNetwork,
    SelectSourceAsset(CrossBridgeAsset),
    SelectAmount(Balance),
    ConfirmReview,
    /// The external wallet broadcast the deposit with this hash.
    SubmitDeposit(String),
    DepositConfirmed,
    DepositFailed(String),
    SetStep(DepositStep),
    Back,
    Reset,
    /// Tear down the wizard.
    Close,
}

/// State of one wizard run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositState {
    pub step: DepositStep,
    pub selection: DepositSelection,
    pub tx: DepositTx,
    /// Between `Init` and `Close`.
    pub active: bool,
}

impl DepositState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transition request, then re-establish the chain guard.
    pub fn reduce(&mut self, action: DepositAction) {
        match action {
            DepositAction::Init => {
                self.selection = DepositSelection::default();
                self.tx = DepositTx::default();
                self.step = DepositStep::ChainSelector;
                self.active = true;
            }
            DepositAction::SelectReceiver(receiver) => {
                self.selection.receiver = Some(receiver);
            }
            DepositAction::SelectTargetAsset(asset) => {
                self.selection.target_asset = Some(asset);
            }
            DepositAction::SelectSourceNetwork(chain) => {
                if self.expect_step(DepositStep::ChainSelector, "network selection") {
                    self.selection.chain = Some(chain);
                    self.selection.target_chain = Some(Chain::home());
                    self.selection.source_asset = None;
                    self.selection.amount = None;
                    self.step = DepositStep::TokenSelector;
                }
            }
            DepositAction::ClearSourceNetwork => {
                if self.in_flight() {
                    tracing::debug!("Keeping source chain while the deposit is {:?}", self.step);
                } else {
                    self.selection.chain = None;
                }
            }
            DepositAction::SelectSourceAsset(asset) => {
                if self.expect_step(DepositStep::TokenSelector, "token selection") {
                    self.selection.source_asset = Some(asset);
                    self.selection.amount = None;
                    self.step = DepositStep::AmountSelector;
                }
            }
            DepositAction::SelectAmount(amount) => {
                if self.expect_step(DepositStep::AmountSelector, "amount entry") {
                    if self.selection.source_asset.is_none() {
                        tracing::debug!("Ignoring amount without a source token");
                    } else if amount == 0 {
                        tracing::debug!("Ignoring zero deposit amount");
                    } else {
                        self.selection.amount = Some(amount);
                        self.step = DepositStep::Review;
                    }
                }
            }
            DepositAction::ConfirmReview => {
                if self.step == DepositStep::Review && self.selection.is_complete() {
                    self.step = DepositStep::Confirm;
                    self.tx = DepositTx {
                        hash: None,
                        status: TxStatus::AwaitingSignature,
                    };
                } else {
                    tracing::debug!("Review not confirmable at step {:?}", self.step);
                }
            }
            DepositAction::SubmitDeposit(hash) => {
                if self.step == DepositStep::Confirm {
                    self.tx = DepositTx {
                        hash: Some(hash),
                        status: TxStatus::Pending,
                    };
                    self.step = DepositStep::Processing;
                } else {
                    tracing::debug!("Ignoring submission at step {:?}", self.step);
                }
            }
            DepositAction::DepositConfirmed => {
                if self.expect_step(DepositStep::Processing, "confirmation") {
                    self.tx.status = TxStatus::Confirmed;
                    self.step = DepositStep::Complete;
                }
            }
            DepositAction::DepositFailed(reason) => {
                if self.expect_step(DepositStep::Processing, "failure") {
                    self.tx.status = TxStatus::Failed(reason);
                    self.step = DepositStep::Confirm;
                }
            }
            DepositAction::SetStep(step) => {
                if self.in_flight() {
                    tracing::debug!("Ignoring jump to {:?} while {:?}", step, self.step);
                } else if !self.can_show(step) {
                    tracing::debug!("Selection not ready for {:?}", step);
                } else {
                    if self.step == DepositStep::Confirm && step != DepositStep::Confirm {
                        self.tx = DepositTx::default();
                    }
                    self.step = step;
                }
            }
            DepositAction::Back => {
                if let Some(previous) = self.step.previous() {
                    if self.step == DepositStep::Confirm {
                        self.tx = DepositTx::default();
                    }
                    self.step = previous;
                }
            }
            DepositAction::Reset => {
                self.selection = DepositSelection::default();
                self.tx = DepositTx::default();
                self.step = DepositStep::ChainSelector;
            }
            DepositAction::Close => {
                self.selection = DepositSelection::default();
                self.tx = DepositTx::default();
                self.step = DepositStep::ChainSelector;
                self.active = false;
            }
        }

        self.enforce_chain_guard();
    }

    /// True when the current step is `expected`; otherwise logs and returns false.
    fn expect_step(&self, expected: DepositStep, what: &str) -> bool {
        if self.step == expected {
            return true;
        }
        tracing::debug!("Ignoring {} at step {:?}", what, self.step);
        false
    }

    /// A broadcast deposit is shown until its outcome is known or the
    /// wizard is reset.
    fn in_flight(&self) -> bool {
        matches!(self.step, DepositStep::Processing | DepositStep::Complete)
    }

    /// Whether `SetStep` may show `step` with the current selection.
    /// CONFIRM, PROCESSING and COMPLETE are entered only through the
    /// transaction transitions.
    fn can_show(&self, step: DepositStep) -> bool {
        let selection = &self.selection;
        match step {
            DepositStep::ChainSelector | DepositStep::TokenSelector => true,
            DepositStep::AmountSelector => selection.source_asset.is_some(),
            DepositStep::Review => selection.source_asset.is_some() && selection.amount.is_some(),
            DepositStep::Confirm => self.step == DepositStep::Confirm,
            DepositStep::Processing | DepositStep::Complete => false,
        }
    }

    /// A step that needs a source chain is never shown without one.
    fn enforce_chain_guard(&mut self) {
        if self.selection.chain.is_none() && self.step.requires_chain() {
            tracing::debug!("No source chain selected, back to chain selector");
            self.step = DepositStep::ChainSelector;
        }
    }

    /// The view to mount for the current state.
    pub fn view(&self) -> StepView {
        self.step.view()
    }

    /// Scope for an aggregator limits query, when the token selector has one.
    pub fn limits_context(&self) -> Option<LimitsContext> {
        if !self.active {
            return None;
        }
        Some(LimitsContext {
            chain: self.selection.chain?,
            target_chain: self.selection.target_chain?,
            target_asset: self.selection.target_asset?,
        })
    }
}
