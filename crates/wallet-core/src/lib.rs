//! Core wallet services: orchestration, gas estimation, name
//! resolution, typed-data signing, batch submission and transaction
//! lifecycle monitoring.
//!
//! The [`Wallet`] façade composes the individual services over a single
//! [`wallet_chain::ChainClient`]; each service is also usable on its own
//! for callers that want a narrower surface.

pub mod batch;
pub mod config;
pub mod ens;
pub mod events;
pub mod gas;
pub mod monitor;
pub mod typed_data;
pub mod wallet;

pub use batch::{BatchStrategy, BatchTransactionHandler, SequentialStrategy};
pub use config::{ConfigError, ConfirmationMode, WalletConfig, DEFAULT_ENS_REGISTRY};
pub use ens::EnsResolver;
pub use events::EventBus;
pub use gas::GasEstimator;
pub use monitor::{MonitorSettings, TransactionMonitor};
pub use typed_data::TypedDataSigner;
pub use wallet::Wallet;
