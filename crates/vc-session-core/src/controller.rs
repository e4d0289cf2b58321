//! Session state machine.
//!
//! Every operation starts from `Idle` and ends in `Idle`, on success and on
//! failure. The at-most-one-in-flight guard lives here, not in the executor.
//! The `Session` sits in a `watch` channel: observers either poll
//! `snapshot()` or await changes on `subscribe()`.

use std::cell::RefCell;
use std::future::poll_fn;
use std::rc::Rc;
use std::task::Poll;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use vc_api_types::{ChainValue, Identity};
use vc_chain_client::{Subscription, WalletProvider};

use crate::binder::ContractBinder;
use crate::config::ContractConfig;
use crate::connector::WalletConnector;
use crate::error::SessionError;
use crate::executor::OperationExecutor;
use crate::session::{ContractHandle, OperationStatus, PendingOperation, Session};

struct AccountWatch {
    subscription: Subscription,
    events: mpsc::UnboundedReceiver<Vec<Identity>>,
}

pub struct SessionController<P> {
    connector: WalletConnector<P>,
    binder: ContractBinder<P>,
    executor: OperationExecutor,
    config: ContractConfig,
    state: watch::Sender<Session>,
    accounts: RefCell<Option<AccountWatch>>,
}

impl<P: WalletProvider> SessionController<P> {
    /// `provider` is `None` when no wallet is injected into the environment.
    pub fn new(provider: Option<Rc<P>>, config: ContractConfig) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            connector: WalletConnector::new(provider.clone()),
            binder: ContractBinder::new(provider),
            executor: OperationExecutor,
            config,
            state,
            accounts: RefCell::new(None),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn status(&self) -> OperationStatus {
        self.state.borrow().status
    }

    pub fn set_input(&self, text: &str) {
        self.state.send_if_modified(|session| {
            if session.input == text {
                return false;
            }
            session.input = text.to_owned();
            true
        });
    }

    /// Authorize, bind, and fetch the initial value.
    ///
    /// A failed initial fetch is recorded in `last_error` but still returns
    /// `Ok`: the session is connected and an explicit read can follow.
    pub async fn connect(&self) -> Result<(), SessionError> {
        self.begin(OperationStatus::Connecting, None)?;

        let identity = match self.connector.connect().await {
            Ok(identity) => identity,
            Err(err) => return Err(self.fail(err.into())),
        };
        info!("wallet connected: {identity}");

        self.ensure_account_watch();
        self.bind_and_refresh(identity).await
    }

    pub async fn read_value(&self) -> Result<ChainValue, SessionError> {
        self.ensure_idle()?;
        let handle = self.require_handle()?;
        self.begin(OperationStatus::Reading, Some(PendingOperation::read()))?;
        self.run_read(&handle).await
    }

    /// Validate `text`, submit it, and wait for confirmation.
    pub async fn write_value(&self, text: &str) -> Result<ChainValue, SessionError> {
        self.ensure_idle()?;
        let handle = self.require_handle()?;
        let input = OperationExecutor::parse_input(text).map_err(|err| self.fail(err.into()))?;
        self.begin(OperationStatus::Writing, Some(PendingOperation::write(input)))?;

        match self.executor.write_value(&handle, input).await {
            Ok(value) => {
                self.state.send_modify(|session| {
                    session.current_value = Some(value);
                    session.finish();
                });
                Ok(value)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Write the draft input; the draft is cleared once the write confirms.
    pub async fn submit_input(&self) -> Result<ChainValue, SessionError> {
        let draft = self.state.borrow().input.clone();
        let value = self.write_value(&draft).await?;
        self.state.send_if_modified(|session| {
            if session.input != draft {
                return false;
            }
            session.input.clear();
            true
        });
        Ok(value)
    }

    /// React to the provider's account list changing.
    ///
    /// A new first account replaces the identity wholesale: the old handle is
    /// dropped and the contract is bound again for the new signer. An empty
    /// list means the wallet was locked or disconnected.
    pub async fn apply_account_change(&self, accounts: Vec<Identity>) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let current = self.state.borrow().wallet_address.clone();

        match accounts.into_iter().next() {
            None => {
                if current.is_some() {
                    info!("wallet reported no accounts; disconnecting");
                    self.state.send_modify(|session| {
                        session.wallet_address = None;
                        session.contract = None;
                    });
                }
                Ok(())
            }
            Some(identity) if current.as_ref() == Some(&identity) => Ok(()),
            Some(identity) => {
                info!("account changed to {identity}; rebinding");
                self.begin(OperationStatus::Binding, None)?;
                self.bind_and_refresh(identity).await
            }
        }
    }

    /// Follow account changes until the session ends. Each change waits for
    /// the in-flight operation, if any, to finish first, and bursts collapse
    /// to the latest list.
    pub async fn watch_accounts(&self) {
        let mut state = self.subscribe();
        while let Some(first) = self.next_account_change().await {
            let idle = state.wait_for(|session| session.status.is_idle()).await.is_ok();
            // the session may have ended while the operation finished
            if !idle || self.accounts.borrow().is_none() {
                break;
            }
            let accounts = self.drain_account_changes().unwrap_or(first);
            if let Err(err) = self.apply_account_change(accounts).await {
                warn!("account change not applied: {err}");
            }
        }
        debug!("account watch finished");
    }

    /// Tear down the provider subscription and forget the session.
    pub fn end_session(&self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        if let Some(watch) = self.accounts.borrow_mut().take() {
            watch.subscription.cancel();
        }
        self.state.send_replace(Session::default());
        info!("session ended");
        Ok(())
    }

    // ── internals ──

    async fn bind_and_refresh(&self, identity: Identity) -> Result<(), SessionError> {
        self.state.send_modify(|session| {
            if session.wallet_address.as_ref() != Some(&identity) {
                session.contract = None;
            }
            session.wallet_address = Some(identity.clone());
            session.status = OperationStatus::Binding;
        });

        let handle = match self.binder.bind(&identity, &self.config).await {
            Ok(handle) => handle,
            Err(err) => {
                self.state.send_modify(|session| session.contract = None);
                return Err(self.fail(err.into()));
            }
        };

        self.state.send_modify(|session| {
            session.contract = Some(handle.clone());
            session.status = OperationStatus::Reading;
            session.pending = Some(PendingOperation::read());
        });

        if let Err(err) = self.run_read(&handle).await {
            warn!("initial value fetch failed: {err}");
        }
        Ok(())
    }

    async fn run_read(&self, handle: &ContractHandle) -> Result<ChainValue, SessionError> {
        match self.executor.read_value(handle).await {
            Ok(value) => {
                self.state.send_modify(|session| {
                    session.current_value = Some(value);
                    session.finish();
                });
                Ok(value)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.status() {
            OperationStatus::Idle => Ok(()),
            busy => {
                debug!("rejected operation while {busy}");
                Err(SessionError::Busy(busy))
            }
        }
    }

    /// Enter `status` if idle; otherwise leave the session untouched.
    fn begin(
        &self,
        status: OperationStatus,
        pending: Option<PendingOperation>,
    ) -> Result<(), SessionError> {
        let mut busy = None;
        self.state.send_if_modified(|session| {
            if !session.status.is_idle() {
                busy = Some(session.status);
                return false;
            }
            session.status = status;
            session.pending = pending;
            session.last_error = None;
            true
        });

        match busy {
            Some(current) => {
                debug!("rejected {status} while {current}");
                Err(SessionError::Busy(current))
            }
            None => Ok(()),
        }
    }

    fn require_handle(&self) -> Result<ContractHandle, SessionError> {
        let (connected, handle) = {
            let session = self.state.borrow();
            (session.is_connected(), session.contract.clone())
        };
        if !connected {
            return Err(self.fail(SessionError::NotConnected));
        }
        handle.ok_or_else(|| self.fail(SessionError::ContractUnbound))
    }

    fn fail(&self, err: SessionError) -> SessionError {
        warn!("session operation failed: {err}");
        self.state.send_modify(|session| {
            session.finish();
            session.last_error = Some(err.clone());
        });
        err
    }

    fn ensure_account_watch(&self) {
        if self.accounts.borrow().is_some() {
            return;
        }
        let Some(provider) = self.connector.provider() else {
            return;
        };

        let (sender, events) = mpsc::unbounded_channel();
        let subscription = provider.subscribe_accounts(Box::new(move |accounts| {
            let _ = sender.send(accounts);
        }));
        *self.accounts.borrow_mut() = Some(AccountWatch {
            subscription,
            events,
        });
    }

    fn drain_account_changes(&self) -> Option<Vec<Identity>> {
        let mut accounts = self.accounts.borrow_mut();
        let watch = accounts.as_mut()?;
        let mut latest = None;
        while let Ok(list) = watch.events.try_recv() {
            latest = Some(list);
        }
        latest
    }

    async fn next_account_change(&self) -> Option<Vec<Identity>> {
        poll_fn(|cx| match self.accounts.borrow_mut().as_mut() {
            Some(watch) => watch.events.poll_recv(cx),
            None => Poll::Ready(None),
        })
        .await
    }
}
