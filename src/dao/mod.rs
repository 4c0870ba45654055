/// Outbound access to the remote strategy-advisory service.
pub mod strategy_api;
