//! Application configuration persistence.
//!
//! The config file itself lives in xbridge-core; the binary applies it.

use crate::app::Route;
pub use xbridge_core::config::{load_config, save_config};
use xbridge_chain::RpcEndpoints;
use xbridge_core::{AppConfig, Chain, NavigationState};

/// Record the receiver and asset of a deposit page that actually opened.
/// Returns whether the config changed and needs saving.
pub fn remember_opened(config: &mut AppConfig, navigation: &NavigationState, route: Route) -> bool {
    if route != Route::BridgeDeposit {
        return false;
    }
    let Some(receiver) = navigation.receiver.as_deref().map(str::trim) else {
        return false;
    };
    config.remember_receiver(receiver);
    config.last_asset = navigation.asset;
    true
}

/// RPC endpoints from the config file, with CLI flags taking precedence.
pub fn rpc_endpoints(config: &AppConfig, cli: [(Chain, Option<String>); 3]) -> RpcEndpoints {
    let mut endpoints = RpcEndpoints::default();
    for chain in Chain::all() {
        if let Some(url) = config.rpc_override(*chain) {
            endpoints.set(*chain, url.to_string());
        }
    }
    for (chain, url) in cli {
        if let Some(url) = url {
            endpoints.set(chain, url);
        }
    }
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::app::App;
    use crate::log_buffer::LogBuffer;
    use crate::theme::Theme;
    use pretty_assertions::assert_eq;
    use xbridge_core::{Asset, Dictionaries};

    fn open(navigation: &NavigationState) -> Route {
        let mut app = App::new(Dictionaries::bundled().unwrap(), LogBuffer::new(), Theme::Dark);
        app.handle_action(Action::OpenDeposit(navigation.clone()));
        app.route
    }

    #[test]
    fn test_rejected_navigation_is_not_remembered() {
        let mut config = AppConfig::default();
        for navigation in [
            NavigationState::new("0xABC", Asset::Moc),
            NavigationState {
                receiver: None,
                asset: Some(Asset::Eth),
            },
        ] {
            let route = open(&navigation);
            assert!(!remember_opened(&mut config, &navigation, route));
        }
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_opened_navigation_is_remembered() {
        let mut config = AppConfig::default();
        let navigation = NavigationState::new(" 0xABC ", Asset::Sov);
        let route = open(&navigation);
        assert!(remember_opened(&mut config, &navigation, route));
        assert_eq!(config.last_receiver(), Some("0xABC"));
        assert_eq!(config.last_asset, Some(Asset::Sov));
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = AppConfig::default();
        config
            .rpc_overrides
            .insert(Chain::Eth, "http://config-eth".to_string());
        config
            .rpc_overrides
            .insert(Chain::Rsk, "http://config-rsk".to_string());

        let endpoints = rpc_endpoints(
            &config,
            [
                (Chain::Rsk, None),
                (Chain::Eth, Some("http://cli-eth".to_string())),
                (Chain::Bsc, None),
            ],
        );

        assert_eq!(endpoints.get(Chain::Eth), Some("http://cli-eth"));
        assert_eq!(endpoints.get(Chain::Rsk), Some("http://config-rsk"));
        assert_eq!(endpoints.get(Chain::Bsc), None);
    }
}
