//! Application state and logic.

use crate::action::{Action, ChainRequest};
use crate::log_buffer::LogBuffer;
use crate::theme::{Palette, Theme};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use std::collections::BTreeMap;
use xbridge_chain::{
    build_deposit, encode_for_qr, parse_tx_hash, AggregatorLimits, ReceiptStatus, UnsignedDeposit,
};
use xbridge_core::{
    check_bounds, enter, format_amount, parse_amount, Asset, AssetModel, Balance, Chain,
    ConnectionStatus, DepositAction, DepositState, DepositStep, Dictionaries, NavigationState,
};

/// Page currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Wallet,
    BridgeDeposit,
}

/// Wallet-wide settings other pages can change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletProvider {
    /// Chain the external wallet should be on for the running bridge operation.
    pub bridge_chain_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalletField {
    #[default]
    Receiver,
    Asset,
}

/// The wallet page form that opens the deposit page.
#[derive(Debug, Clone, Default)]
pub struct WalletForm {
    pub receiver: String,
    pub asset_index: usize,
    pub field: WalletField,
    /// Why the deposit page refused to open.
    pub error: Option<String>,
}

impl WalletForm {
    pub fn asset(&self) -> Asset {
        let assets = Asset::all();
        assets[self.asset_index % assets.len()]
    }

    pub fn select_asset(&mut self, asset: Asset) {
        if let Some(index) = Asset::all().iter().position(|a| *a == asset) {
            self.asset_index = index;
        }
    }

    fn cycle_asset(&mut self, forward: bool) {
        let len = Asset::all().len();
        self.asset_index = if forward {
            (self.asset_index + 1) % len
        } else {
            (self.asset_index + len - 1) % len
        };
    }

    pub fn navigation(&self) -> NavigationState {
        NavigationState::new(self.receiver.clone(), self.asset())
    }
}

/// View state of the deposit page that is not part of the wizard itself.
/// Dropped on unmount.
#[derive(Debug, Default)]
pub struct DepositPage {
    /// Highlighted row in the chain and token lists.
    pub list: ListState,
    pub limits: Option<AggregatorLimits>,
    pub limits_loading: bool,
    pub amount_input: String,
    pub amount_error: Option<String>,
    /// Amount exceeds aggregator liquidity. Not blocking.
    pub amount_warning: Option<String>,
    pub unsigned: Option<UnsignedDeposit>,
    pub qr_data: Option<Vec<u8>>,
    pub build_error: Option<String>,
    pub hash_input: String,
    pub hash_error: Option<String>,
}

/// Application state.
pub struct App {
    pub theme: Theme,
    pub palette: Palette,
    pub dictionaries: Dictionaries,
    pub route: Route,
    pub wallet_provider: WalletProvider,
    pub wallet: WalletForm,
    /// Wizard state, owned here and changed only through its reducer.
    pub deposit: DepositState,
    pub page: DepositPage,
    pub connections: BTreeMap<Chain, ConnectionStatus>,
    pub showing_help: bool,
    pub should_quit: bool,
    pub log_buffer: LogBuffer,
    /// Lines scrolled back from the newest log line.
    pub log_scroll: usize,
    tick_count: u64,
}

impl App {
    pub fn new(dictionaries: Dictionaries, log_buffer: LogBuffer, theme: Theme) -> Self {
        let connections = Chain::all()
            .iter()
            .map(|chain| (*chain, ConnectionStatus::Disconnected))
            .collect();
        Self {
            theme,
            palette: theme.palette(),
            dictionaries,
            route: Route::default(),
            wallet_provider: WalletProvider::default(),
            wallet: WalletForm::default(),
            deposit: DepositState::new(),
            page: DepositPage::default(),
            connections,
            showing_help: false,
            should_quit: false,
            log_buffer,
            log_scroll: 0,
            tick_count: 0,
        }
    }

    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        SPINNER[(self.tick_count as usize) % SPINNER.len()]
    }

    pub fn scroll_logs_up(&mut self) {
        let max = self.log_buffer.len().saturating_sub(1);
        self.log_scroll = (self.log_scroll + 1).min(max);
    }

    pub fn scroll_logs_down(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    // ==================== Lookups ====================

    /// Chains with a bridge into the home chain.
    pub fn source_chains(&self) -> Vec<Chain> {
        self.dictionaries.bridges.sources_for(Chain::home())
    }

    /// Source assets offered by the token selector.
    pub fn source_assets(&self) -> Vec<&AssetModel> {
        let selection = &self.deposit.selection;
        match (selection.chain, selection.target_chain, selection.target_asset) {
            (Some(chain), Some(target_chain), Some(target_asset)) => self
                .dictionaries
                .bridges
                .source_assets(chain, target_chain, target_asset),
            _ => Vec::new(),
        }
    }

    /// Dictionary entry of the chosen source asset.
    pub fn selected_asset(&self) -> Option<&AssetModel> {
        let selection = &self.deposit.selection;
        self.dictionaries
            .bridges
            .get(selection.chain?, selection.target_chain?)?
            .asset(selection.source_asset?)
    }

    /// Explorer link for the submitted deposit.
    pub fn deposit_tx_url(&self) -> Option<String> {
        let network = self.dictionaries.networks.get(self.deposit.selection.chain?)?;
        Some(network.tx_url(self.deposit.tx.hash.as_deref()?))
    }

    fn list_len(&self) -> usize {
        match self.deposit.step {
            DepositStep::ChainSelector => self.source_chains().len(),
            DepositStep::TokenSelector => self.source_assets().len(),
            _ => 0,
        }
    }

    fn select_next(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        let next = self.page.list.selected().map_or(0, |i| (i + 1) % len);
        self.page.list.select(Some(next));
    }

    fn select_previous(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        let previous = self.page.list.selected().map_or(0, |i| (i + len - 1) % len);
        self.page.list.select(Some(previous));
    }

    fn selected_index(&self) -> usize {
        self.page.list.selected().unwrap_or(0)
    }

    // ==================== Keyboard ====================

    /// Keys go into a text field rather than acting as shortcuts.
    pub fn is_typing(&self) -> bool {
        match self.route {
            Route::Wallet => self.wallet.field == WalletField::Receiver,
            Route::BridgeDeposit => matches!(
                self.deposit.step,
                DepositStep::AmountSelector | DepositStep::Confirm
            ),
        }
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        if self.showing_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                self.showing_help = false;
            }
            return None;
        }

        match key.code {
            KeyCode::PageUp => {
                self.scroll_logs_up();
                return None;
            }
            KeyCode::PageDown => {
                self.scroll_logs_down();
                return None;
            }
            KeyCode::Char('q') if !self.is_typing() => return Some(Action::Quit),
            KeyCode::Char('?') if !self.is_typing() => {
                self.showing_help = true;
                return None;
            }
            _ => {}
        }

        match self.route {
            Route::Wallet => self.handle_wallet_key(key),
            Route::BridgeDeposit => self.handle_deposit_key(key),
        }
    }

    fn handle_wallet_key(&mut self, key: KeyEvent) -> Option<Action> {
        match (self.wallet.field, key.code) {
            (_, KeyCode::Tab | KeyCode::BackTab) => {
                self.wallet.field = match self.wallet.field {
                    WalletField::Receiver => WalletField::Asset,
                    WalletField::Asset => WalletField::Receiver,
                };
            }
            (_, KeyCode::Enter) => return Some(Action::OpenDeposit(self.wallet.navigation())),
            (WalletField::Receiver, KeyCode::Char(c)) if !c.is_whitespace() => {
                self.wallet.receiver.push(c);
            }
            (WalletField::Receiver, KeyCode::Backspace) => {
                self.wallet.receiver.pop();
            }
            (WalletField::Asset, KeyCode::Up | KeyCode::Left | KeyCode::Char('k')) => {
                self.wallet.cycle_asset(false);
            }
            (WalletField::Asset, KeyCode::Down | KeyCode::Right | KeyCode::Char('j')) => {
                self.wallet.cycle_asset(true);
            }
            _ => {}
        }
        None
    }

    fn handle_deposit_key(&mut self, key: KeyEvent) -> Option<Action> {
        let deposit = |action| Some(Action::Deposit(action));

        match (self.deposit.step, key.code) {
            (DepositStep::ChainSelector, KeyCode::Up | KeyCode::Char('k'))
            | (DepositStep::TokenSelector, KeyCode::Up | KeyCode::Char('k')) => {
                self.select_previous();
                None
            }
            (DepositStep::ChainSelector, KeyCode::Down | KeyCode::Char('j'))
            | (DepositStep::TokenSelector, KeyCode::Down | KeyCode::Char('j')) => {
                self.select_next();
                None
            }

            (DepositStep::ChainSelector, KeyCode::Enter) => {
                let chain = *self.source_chains().get(self.selected_index())?;
                deposit(DepositAction::SelectSourceNetwork(chain))
            }
            (DepositStep::ChainSelector, KeyCode::Esc | KeyCode::Char('c')) => {
                Some(Action::CloseDeposit)
            }

            (DepositStep::TokenSelector, KeyCode::Enter) => {
                let asset = self.source_assets().get(self.selected_index())?.asset;
                deposit(DepositAction::SelectSourceAsset(asset))
            }
            (DepositStep::TokenSelector, KeyCode::Esc | KeyCode::Backspace) => {
                deposit(DepositAction::ClearSourceNetwork)
            }

            (DepositStep::AmountSelector, KeyCode::Char(c)) if c.is_ascii_digit() || c == '.' => {
                self.page.amount_input.push(c);
                self.page.amount_error = None;
                None
            }
            (DepositStep::AmountSelector, KeyCode::Backspace) => {
                self.page.amount_input.pop();
                self.page.amount_error = None;
                None
            }
            (DepositStep::AmountSelector, KeyCode::Enter) => self.submit_amount(),

            (DepositStep::Review, KeyCode::Enter) => deposit(DepositAction::ConfirmReview),
            (DepositStep::Review, KeyCode::Backspace) => deposit(DepositAction::Back),

            (DepositStep::Confirm, KeyCode::Char(c)) if c.is_ascii_hexdigit() || c == 'x' => {
                self.page.hash_input.push(c);
                self.page.hash_error = None;
                None
            }
            (DepositStep::Confirm, KeyCode::Backspace) => {
                self.page.hash_input.pop();
                self.page.hash_error = None;
                None
            }
            (DepositStep::Confirm, KeyCode::Enter) => self.submit_hash(),

            (DepositStep::AmountSelector | DepositStep::Review | DepositStep::Confirm, KeyCode::Esc) => {
                deposit(DepositAction::Back)
            }

            (DepositStep::Complete, KeyCode::Enter | KeyCode::Esc) => Some(Action::CloseDeposit),
            (_, KeyCode::Char('c')) if !self.is_typing() => Some(Action::CloseDeposit),
            _ => None,
        }
    }

    fn submit_amount(&mut self) -> Option<Action> {
        let asset = self.selected_asset()?.clone();
        let checked = parse_amount(&self.page.amount_input, asset.decimals).and_then(|value| {
            check_bounds(
                value,
                asset.decimals,
                asset.min_amount_units(),
                asset.max_amount_units(),
            )
            .map(|_| value)
        });

        match checked {
            Ok(value) => {
                self.page.amount_error = None;
                self.page.amount_warning = self.limit_warning(&asset, value);
                Some(Action::Deposit(DepositAction::SelectAmount(value)))
            }
            Err(e) => {
                self.page.amount_error = Some(e.to_string());
                None
            }
        }
    }

    fn limit_warning(&self, asset: &AssetModel, value: Balance) -> Option<String> {
        let limit = *self.page.limits.as_ref()?.get(&asset.symbol)?;
        if value <= limit {
            return None;
        }
        let limit = format_amount(limit, asset.decimals, 6);
        tracing::warn!(
            "Deposit exceeds aggregator liquidity of {} {}",
            limit,
            asset.symbol
        );
        Some(format!(
            "The aggregator only holds {} {}; the conversion may be delayed",
            limit, asset.symbol
        ))
    }

    fn submit_hash(&mut self) -> Option<Action> {
        match parse_tx_hash(&self.page.hash_input) {
            Ok(hash) => Some(Action::Deposit(DepositAction::SubmitDeposit(format!(
                "{:#x}",
                hash
            )))),
            Err(e) => {
                self.page.hash_error = Some(e.to_string());
                None
            }
        }
    }

    // ==================== Actions ====================

    /// Apply an action. Returns chain work the action calls for.
    pub fn handle_action(&mut self, action: Action) -> Option<ChainRequest> {
        match action {
            Action::UpdateConnectionStatus(chain, status) => {
                self.connections.insert(chain, status);
                None
            }
            Action::OpenDeposit(navigation) => self.mount(&navigation),
            Action::CloseDeposit => {
                self.unmount();
                None
            }
            Action::Deposit(action) => self.dispatch(action),
            Action::SetAggregatorLimits { context, limits } => {
                if self.deposit.limits_context() == Some(context) {
                    tracing::debug!("{} aggregator limit(s) for {}", limits.len(), context.chain);
                    self.page.limits = Some(limits);
                    self.page.limits_loading = false;
                } else {
                    tracing::debug!("Discarding aggregator limits for stale {:?}", context);
                }
                None
            }
            Action::DepositReceipt { hash, outcome } => self.on_receipt(hash, outcome),
            Action::Quit => {
                self.should_quit = true;
                None
            }
        }
    }

    /// Open the deposit page. Invalid navigation state stays on the wallet page.
    fn mount(&mut self, navigation: &NavigationState) -> Option<ChainRequest> {
        let entry = match enter(navigation) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Not opening deposit page: {}", e);
                self.route = Route::Wallet;
                self.wallet.error = Some(e.to_string());
                return None;
            }
        };

        tracing::info!(
            "Depositing {} to {}",
            entry.target_asset,
            entry.receiver
        );
        self.route = Route::BridgeDeposit;
        self.wallet.error = None;
        self.page = DepositPage::default();

        let mut request = None;
        for action in entry.actions() {
            request = self.dispatch(action).or(request);
        }
        request
    }

    /// Leave the deposit page, dropping every trace of the run.
    fn unmount(&mut self) {
        self.wallet_provider.bridge_chain_id = None;
        self.deposit.reduce(DepositAction::Reset);
        self.deposit.reduce(DepositAction::Close);
        self.page = DepositPage::default();
        self.route = Route::Wallet;
    }

    fn dispatch(&mut self, action: DepositAction) -> Option<ChainRequest> {
        let before = self.deposit.step;
        self.deposit.reduce(action);
        // The wallet follows whatever source chain the reducer accepted
        self.wallet_provider.bridge_chain_id =
            self.deposit.selection.chain.map(|chain| chain.chain_id());
        let step = self.deposit.step;
        if step == before {
            return None;
        }

        tracing::debug!("Deposit step {} -> {}", before.label(), step.label());
        self.page.list.select(Some(0));
        match step {
            DepositStep::TokenSelector => {
                self.page.limits = None;
                let context = self.deposit.limits_context()?;
                self.page.limits_loading = true;
                Some(ChainRequest::FetchLimits(context))
            }
            DepositStep::AmountSelector => {
                self.page.amount_input.clear();
                self.page.amount_error = None;
                self.page.amount_warning = None;
                None
            }
            DepositStep::Confirm if before == DepositStep::Review => {
                self.prepare_unsigned();
                None
            }
            DepositStep::Processing => {
                let chain = self.deposit.selection.chain?;
                let hash = self.deposit.tx.hash.clone()?;
                Some(ChainRequest::WatchDeposit { chain, hash })
            }
            DepositStep::ChainSelector
            | DepositStep::Review
            | DepositStep::Confirm
            | DepositStep::Complete => None,
        }
    }

    /// Build the unsigned calls and their QR payload for the confirm step.
    fn prepare_unsigned(&mut self) {
        self.page.unsigned = None;
        self.page.qr_data = None;
        self.page.build_error = None;
        self.page.hash_input.clear();
        self.page.hash_error = None;

        let selection = &self.deposit.selection;
        let model = match (selection.chain, selection.target_chain, selection.source_asset) {
            (Some(chain), Some(target), Some(asset)) => self
                .dictionaries
                .bridges
                .get(chain, target)
                .and_then(|bridge| Some((bridge, bridge.asset(asset)?))),
            _ => None,
        };
        let Some((bridge, asset)) = model else {
            self.page.build_error = Some("No bridge for this selection".to_string());
            return;
        };

        let built = build_deposit(bridge, asset, selection).and_then(|deposit| {
            let qr = encode_for_qr(&deposit)?;
            Ok((deposit, qr))
        });
        match built {
            Ok((deposit, qr)) => {
                self.page.unsigned = Some(deposit);
                self.page.qr_data = Some(qr);
            }
            Err(e) => {
                tracing::error!("Could not build deposit transaction: {}", e);
                self.page.build_error = Some(e.to_string());
            }
        }
    }

    fn on_receipt(
        &mut self,
        hash: String,
        outcome: Result<ReceiptStatus, String>,
    ) -> Option<ChainRequest> {
        if self.deposit.tx.hash.as_deref() != Some(hash.as_str()) {
            tracing::debug!("Ignoring receipt for {}, no longer tracked", hash);
            return None;
        }
        let action = match outcome {
            Ok(ReceiptStatus::Success { block }) => {
                tracing::info!("Deposit {} confirmed in block {}", hash, block);
                DepositAction::DepositConfirmed
            }
            Ok(ReceiptStatus::Reverted { block }) => {
                tracing::warn!("Deposit {} reverted in block {}", hash, block);
                DepositAction::DepositFailed(format!("Reverted in block {}", block))
            }
            Err(e) => DepositAction::DepositFailed(e),
        };
        self.dispatch(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xbridge_core::{CrossBridgeAsset, LimitsContext, StepView, TxStatus};

    const RECEIVER: &str = "0x00000000000000000000000000000000000000AB";

    fn app() -> App {
        App::new(Dictionaries::bundled().unwrap(), LogBuffer::new(), Theme::Dark)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))).is_none());
        }
    }

    /// Feed a key and run the resulting action, like the main loop does.
    fn press(app: &mut App, code: KeyCode) -> Option<ChainRequest> {
        let action = app.handle_key(key(code))?;
        app.handle_action(action)
    }

    fn mounted_eth() -> App {
        let mut app = app();
        app.handle_action(Action::OpenDeposit(NavigationState::new(RECEIVER, Asset::Eth)));
        app
    }

    fn eth_context() -> LimitsContext {
        LimitsContext {
            chain: Chain::Eth,
            target_chain: Chain::Rsk,
            target_asset: CrossBridgeAsset::Eths,
        }
    }

    #[test]
    fn test_mount_without_receiver_stays_on_wallet() {
        let mut app = app();
        let request = app.handle_action(Action::OpenDeposit(NavigationState {
            receiver: None,
            asset: Some(Asset::Eth),
        }));
        assert_eq!(request, None);
        assert_eq!(app.route, Route::Wallet);
        assert!(!app.deposit.active);
        assert!(app.wallet.error.is_some());
    }

    #[test]
    fn test_mount_unsupported_asset_stays_on_wallet() {
        let mut app = app();
        app.handle_action(Action::OpenDeposit(NavigationState::new(RECEIVER, Asset::Moc)));
        assert_eq!(app.route, Route::Wallet);
        assert!(!app.deposit.active);
    }

    #[test]
    fn test_mount_maps_eth_to_eths() {
        let app = mounted_eth();
        assert_eq!(app.route, Route::BridgeDeposit);
        assert!(app.deposit.active);
        assert_eq!(app.deposit.view(), StepView::ChainSelector);
        assert_eq!(app.deposit.selection.target_asset, Some(CrossBridgeAsset::Eths));
        assert_eq!(app.deposit.selection.receiver.as_deref(), Some(RECEIVER));
    }

    #[test]
    fn test_wallet_form_opens_deposit() {
        let mut app = app();
        type_text(&mut app, RECEIVER);
        app.handle_key(key(KeyCode::Tab));
        app.wallet.select_asset(Asset::Sov);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.route, Route::BridgeDeposit);
        assert_eq!(app.deposit.selection.target_asset, Some(CrossBridgeAsset::Sov));
    }

    #[test]
    fn test_selecting_network_requests_limits() {
        let mut app = mounted_eth();
        assert_eq!(app.source_chains(), vec![Chain::Eth, Chain::Bsc]);

        let request = press(&mut app, KeyCode::Enter);
        assert_eq!(request, Some(ChainRequest::FetchLimits(eth_context())));
        assert_eq!(app.deposit.step, DepositStep::TokenSelector);
        assert_eq!(app.wallet_provider.bridge_chain_id, Some(1));
        assert!(app.page.limits_loading);
    }

    #[test]
    fn test_stale_limits_are_discarded() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);

        let stale = LimitsContext {
            chain: Chain::Bsc,
            ..eth_context()
        };
        app.handle_action(Action::SetAggregatorLimits {
            context: stale,
            limits: AggregatorLimits::from([("ETH".to_string(), 1)]),
        });
        assert!(app.page.limits.is_none());

        app.handle_action(Action::SetAggregatorLimits {
            context: eth_context(),
            limits: AggregatorLimits::from([("ETH".to_string(), 7)]),
        });
        assert_eq!(app.page.limits.as_ref().unwrap()["ETH"], 7);
        assert!(!app.page.limits_loading);
    }

    #[test]
    fn test_failed_limits_leave_wizard_untouched() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        let before = app.deposit.clone();

        // A failed query arrives as an empty result
        let request = app.handle_action(Action::SetAggregatorLimits {
            context: eth_context(),
            limits: AggregatorLimits::new(),
        });
        assert_eq!(request, None);
        assert_eq!(app.deposit, before);
        assert!(!app.page.limits_loading);
        assert!(!app.source_assets().is_empty());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.deposit.step, DepositStep::AmountSelector);
        assert_eq!(app.deposit.selection.source_asset, Some(CrossBridgeAsset::Eth));
    }

    #[test]
    fn test_rejected_network_leaves_wallet_chain() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        app.handle_action(Action::Deposit(DepositAction::SelectSourceNetwork(Chain::Bsc)));
        assert_eq!(app.deposit.selection.chain, Some(Chain::Eth));
        assert_eq!(app.wallet_provider.bridge_chain_id, Some(1));
    }

    #[test]
    fn test_limits_after_unmount_are_discarded() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        app.handle_action(Action::CloseDeposit);
        app.handle_action(Action::SetAggregatorLimits {
            context: eth_context(),
            limits: AggregatorLimits::from([("ETH".to_string(), 7)]),
        });
        assert!(app.page.limits.is_none());
    }

    #[test]
    fn test_leaving_token_selector_clears_network() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.deposit.step, DepositStep::ChainSelector);
        assert_eq!(app.deposit.selection.chain, None);
        assert_eq!(app.wallet_provider.bridge_chain_id, None);
    }

    #[test]
    fn test_unmount_resets_everything() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.deposit.step, DepositStep::AmountSelector);

        app.handle_action(Action::CloseDeposit);
        assert_eq!(app.route, Route::Wallet);
        assert_eq!(app.wallet_provider.bridge_chain_id, None);
        assert!(!app.deposit.active);
        assert_eq!(app.deposit.step, DepositStep::ChainSelector);
        assert_eq!(app.deposit.selection, Default::default());

        app.handle_action(Action::OpenDeposit(NavigationState::new(RECEIVER, Asset::Sov)));
        assert_eq!(app.deposit.step, DepositStep::ChainSelector);
        assert_eq!(app.deposit.selection.chain, None);
        assert_eq!(app.deposit.selection.target_asset, Some(CrossBridgeAsset::Sov));
    }

    #[test]
    fn test_amount_below_minimum_is_rejected() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);

        type_text(&mut app, "0.001");
        assert!(press(&mut app, KeyCode::Enter).is_none());
        assert_eq!(app.deposit.step, DepositStep::AmountSelector);
        assert_eq!(app.page.amount_error.as_deref(), Some("Minimum deposit is 0.005"));
    }

    #[test]
    fn test_amount_over_limit_only_warns() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        app.handle_action(Action::SetAggregatorLimits {
            context: eth_context(),
            limits: AggregatorLimits::from([("ETH".to_string(), 10u128.pow(18))]),
        });
        press(&mut app, KeyCode::Enter);

        type_text(&mut app, "2");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.deposit.step, DepositStep::Review);
        assert_eq!(app.deposit.selection.amount, Some(2 * 10u128.pow(18)));
        assert!(app.page.amount_warning.is_some());
    }

    #[test]
    fn test_full_deposit_flow() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "0.5");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.deposit.view(), StepView::Review);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.deposit.step, DepositStep::Confirm);
        assert_eq!(app.deposit.tx.status, TxStatus::AwaitingSignature);
        assert_eq!(app.page.unsigned.as_ref().unwrap().calls.len(), 1);
        assert!(app.page.qr_data.is_some());

        let hash = format!("0x{}", "ab".repeat(32));
        type_text(&mut app, &hash);
        let request = press(&mut app, KeyCode::Enter);
        assert_eq!(
            request,
            Some(ChainRequest::WatchDeposit {
                chain: Chain::Eth,
                hash: hash.clone(),
            })
        );
        assert_eq!(app.deposit.step, DepositStep::Processing);

        app.handle_action(Action::DepositReceipt {
            hash: hash.clone(),
            outcome: Ok(ReceiptStatus::Success { block: 100 }),
        });
        assert_eq!(app.deposit.step, DepositStep::Complete);
        assert_eq!(
            app.deposit_tx_url(),
            Some(format!("https://etherscan.io/tx/{}", hash))
        );

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.route, Route::Wallet);
    }

    #[test]
    fn test_receipt_for_other_hash_is_ignored() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "1");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, &"cd".repeat(32));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.deposit.step, DepositStep::Processing);

        app.handle_action(Action::DepositReceipt {
            hash: format!("0x{}", "ee".repeat(32)),
            outcome: Ok(ReceiptStatus::Success { block: 1 }),
        });
        assert_eq!(app.deposit.step, DepositStep::Processing);

        app.handle_action(Action::DepositReceipt {
            hash: format!("0x{}", "cd".repeat(32)),
            outcome: Ok(ReceiptStatus::Reverted { block: 2 }),
        });
        assert_eq!(app.deposit.step, DepositStep::Confirm);
        assert_eq!(
            app.deposit.tx.status,
            TxStatus::Failed("Reverted in block 2".to_string())
        );
    }

    #[test]
    fn test_invalid_hash_is_reported() {
        let mut app = mounted_eth();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "1");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "0x12");
        assert!(press(&mut app, KeyCode::Enter).is_none());
        assert!(app.page.hash_error.is_some());
        assert_eq!(app.deposit.step, DepositStep::Confirm);
    }

    #[test]
    fn test_shortcuts_disabled_while_typing() {
        let mut app = app();
        assert!(app.is_typing());
        assert!(app.handle_key(key(KeyCode::Char('q'))).is_none());
        assert_eq!(app.wallet.receiver, "q");

        app.handle_key(key(KeyCode::Tab));
        assert!(matches!(app.handle_key(key(KeyCode::Char('q'))), Some(Action::Quit)));
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut app = mounted_eth();
        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.showing_help);
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert!(!app.showing_help);
        assert_eq!(app.deposit.step, DepositStep::ChainSelector);
    }

    #[test]
    fn test_connection_status_is_tracked_per_chain() {
        let mut app = app();
        app.handle_action(Action::UpdateConnectionStatus(
            Chain::Bsc,
            ConnectionStatus::Connected { block: 5 },
        ));
        assert_eq!(
            app.connections[&Chain::Bsc],
            ConnectionStatus::Connected { block: 5 }
        );
        assert_eq!(app.connections[&Chain::Rsk], ConnectionStatus::Disconnected);
    }
}
