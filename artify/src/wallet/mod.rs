//! Wallet provider abstraction and session management.
//!
//! This module defines a trait [`WalletProvider`] that abstracts over the
//! injected wallet's request interface, and a [`WalletConnector`] that:
//!
//! - probes the provider's presence as a capability, not an exception,
//! - obtains the active account (idempotently: a cached session never
//!   re-prompts the user),
//! - keeps the [`WalletSession`] up to date with provider account changes,
//!   fanning them out to subscribers via RAII [`AccountsSubscription`]
//!   guards that unregister on drop.
//!
//! The provider is an injected capability passed into the connector's
//! constructor; nothing here reads ambient global state, so the whole stack
//! is testable with a mock provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use ethers_core::types::{Address, TransactionReceipt, TransactionRequest, H256};

use crate::error::ProviderError;
use crate::types::WalletSession;

/// Blocking JSON-RPC wallet provider implementation.
pub mod rpc;

pub use rpc::HttpWalletProvider;

/// Abstract wallet provider used by the connector and the mint workflow.
///
/// This is the Rust rendering of the injected provider's request interface:
/// account authorisation, transaction submission (the provider owns keys,
/// signing, gas and nonces) and receipt lookup. Implementations talk to a
/// real wallet endpoint; tests use in-memory mocks.
pub trait WalletProvider: Send + Sync {
    /// Non-blocking capability probe; `true` if a provider is present.
    /// No side effects.
    fn is_installed(&self) -> bool;

    /// Requests account access, prompting the user if needed.
    ///
    /// Returns the list of authorised addresses; the first entry is the
    /// active account.
    fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Asks the wallet to sign and submit a transaction.
    fn send_transaction(&self, tx: &TransactionRequest) -> Result<H256, ProviderError>;

    /// Looks up the receipt of a submitted transaction, `None` while the
    /// transaction is still pending.
    fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, ProviderError>;
}

/// Callback invoked when the active session changes.
///
/// `None` means the session was destroyed (disconnect or empty account list).
pub type SessionListener = Box<dyn FnMut(Option<&WalletSession>) + Send>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    listeners: HashMap<u64, SessionListener>,
}

/// RAII guard for an account-change subscription.
///
/// Dropping the guard unregisters the listener, so page/handler teardown
/// cannot leak callbacks across transitions.
pub struct AccountsSubscription {
    id: u64,
    table: Weak<Mutex<ListenerTable>>,
}

impl Drop for AccountsSubscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
            table.listeners.remove(&self.id);
        }
    }
}

/// Owns the wallet session and mediates all provider interaction.
pub struct WalletConnector<P> {
    provider: P,
    session: Option<WalletSession>,
    listeners: Arc<Mutex<ListenerTable>>,
}

impl<P> WalletConnector<P> {
    /// Creates a connector around an injected provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            session: None,
            listeners: Arc::new(Mutex::new(ListenerTable::default())),
        }
    }

    /// Returns the current session, if connected.
    pub fn session(&self) -> Option<WalletSession> {
        self.session
    }

    /// Returns a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Registers a listener for session changes.
    ///
    /// The listener fires on connect, account change and disconnect. It is
    /// unregistered when the returned guard is dropped.
    pub fn on_accounts_changed<F>(&mut self, listener: F) -> AccountsSubscription
    where
        F: FnMut(Option<&WalletSession>) + Send + 'static,
    {
        let mut table = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let id = table.next_id;
        table.next_id += 1;
        table.listeners.insert(id, Box::new(listener));
        AccountsSubscription {
            id,
            table: Arc::downgrade(&self.listeners),
        }
    }

    fn notify(&self) {
        let mut table = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for listener in table.listeners.values_mut() {
            listener(self.session.as_ref());
        }
    }
}

impl<P: WalletProvider> WalletConnector<P> {
    /// Non-blocking capability probe for the underlying provider.
    pub fn is_installed(&self) -> bool {
        self.provider.is_installed()
    }

    /// Connects to the wallet and returns the active session.
    ///
    /// Idempotent: if a session already exists it is returned as-is and the
    /// user is not re-prompted. Absence of a provider is reported as
    /// [`ProviderError::Unavailable`]; a rejection in the wallet UI is
    /// reported, not retried.
    pub fn connect(&mut self) -> Result<WalletSession, ProviderError> {
        if !self.provider.is_installed() {
            return Err(ProviderError::Unavailable);
        }
        if let Some(session) = self.session {
            return Ok(session);
        }

        let accounts = self.provider.request_accounts()?;
        let address = accounts.first().copied().ok_or_else(|| {
            ProviderError::Protocol("provider returned no accounts".to_string())
        })?;

        let session = WalletSession {
            address,
            is_installed: true,
        };
        self.session = Some(session);
        self.notify();
        Ok(session)
    }

    /// Destroys the session, if any, and notifies listeners.
    pub fn disconnect(&mut self) {
        if self.session.take().is_some() {
            self.notify();
        }
    }

    /// Applies an `accountsChanged` notification from the provider.
    ///
    /// An empty account list destroys the session; otherwise the session's
    /// address is updated in place. Listeners fire on every effective
    /// change.
    pub fn handle_accounts_changed(&mut self, accounts: &[Address]) {
        match accounts.first() {
            None => {
                if self.session.take().is_some() {
                    self.notify();
                }
            }
            Some(address) => {
                let changed = self.session.map(|s| s.address) != Some(*address);
                self.session = Some(WalletSession {
                    address: *address,
                    is_installed: true,
                });
                if changed {
                    self.notify();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock provider that counts permission prompts.
    struct CountingProvider {
        installed: bool,
        accounts: Vec<Address>,
        prompts: AtomicUsize,
    }

    impl CountingProvider {
        fn with_account(address: Address) -> Self {
            Self {
                installed: true,
                accounts: vec![address],
                prompts: AtomicUsize::new(0),
            }
        }
    }

    impl WalletProvider for CountingProvider {
        fn is_installed(&self) -> bool {
            self.installed
        }

        fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok(self.accounts.clone())
        }

        fn send_transaction(&self, _tx: &TransactionRequest) -> Result<H256, ProviderError> {
            Err(ProviderError::Protocol("not used in this test".to_string()))
        }

        fn transaction_receipt(
            &self,
            _tx_hash: H256,
        ) -> Result<Option<TransactionReceipt>, ProviderError> {
            Ok(None)
        }
    }

    fn test_address(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn connect_is_idempotent_and_prompts_once() {
        let mut connector = WalletConnector::new(CountingProvider::with_account(test_address(1)));

        let first = connector.connect().expect("first connect should succeed");
        let second = connector.connect().expect("second connect should succeed");

        assert_eq!(first.address, test_address(1));
        assert_eq!(first, second);
        assert_eq!(connector.provider().prompts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_provider_is_reported_as_unavailable() {
        let provider = CountingProvider {
            installed: false,
            accounts: vec![test_address(1)],
            prompts: AtomicUsize::new(0),
        };
        let mut connector = WalletConnector::new(provider);

        let err = connector.connect().unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable));
        // Absence is a capability check: the user was never prompted.
        assert_eq!(connector.provider().prompts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_account_list_is_a_protocol_error() {
        let provider = CountingProvider {
            installed: true,
            accounts: Vec::new(),
            prompts: AtomicUsize::new(0),
        };
        let mut connector = WalletConnector::new(provider);

        let err = connector.connect().unwrap_err();
        assert!(matches!(err, ProviderError::Protocol(_)));
        assert!(connector.session().is_none());
    }

    #[test]
    fn account_change_updates_the_session_in_place() {
        let mut connector = WalletConnector::new(CountingProvider::with_account(test_address(1)));
        connector.connect().expect("connect should succeed");

        connector.handle_accounts_changed(&[test_address(2)]);
        assert_eq!(
            connector.session().map(|s| s.address),
            Some(test_address(2))
        );

        // Empty list means the provider disconnected us.
        connector.handle_accounts_changed(&[]);
        assert!(connector.session().is_none());
    }

    #[test]
    fn listeners_fire_until_their_guard_is_dropped() {
        let mut connector = WalletConnector::new(CountingProvider::with_account(test_address(1)));
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_clone = fired.clone();
        let guard = connector.on_accounts_changed(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        connector.connect().expect("connect should succeed");
        connector.handle_accounts_changed(&[test_address(2)]);
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        drop(guard);
        connector.handle_accounts_changed(&[test_address(3)]);
        assert_eq!(fired.load(Ordering::SeqCst), 2, "dropped guard still fired");
    }

    #[test]
    fn disconnect_destroys_the_session_and_notifies() {
        let mut connector = WalletConnector::new(CountingProvider::with_account(test_address(1)));
        let last_seen = Arc::new(Mutex::new(Some(test_address(9))));

        let last_seen_clone = last_seen.clone();
        let _guard = connector.on_accounts_changed(move |session| {
            *last_seen_clone.lock().expect("test mutex") = session.map(|s| s.address);
        });

        connector.connect().expect("connect should succeed");
        connector.disconnect();

        assert!(connector.session().is_none());
        assert_eq!(*last_seen.lock().expect("test mutex"), None);
    }
}
