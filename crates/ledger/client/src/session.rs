use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use ledger_utils::parse::parse_address;
use ledger_utils::{TransactionResult, TxnConfig};
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::contract::ContractHandle;
use crate::descriptor::{DescriptorLoader, NetworkDescriptor};
use crate::entity::{Product, Supplier};
use crate::error::{Error, Result, ValidationError};
use crate::manifest::DeploymentManifest;
use crate::mutation::{
    MutationForm, MutationPhase, ProductForm, SettlePolicy, SupplierForm, TransferForm,
};
use crate::provider::{
    resolve_provider, ProviderEvent, ProviderKind, ProviderWatcher, ResolvedProvider,
};
use crate::sync::sync_entities;

const LOG_TARGET: &str = "ledger_client::session";

pub const STATUS_INITIALIZING: &str = "Initializing...";
pub const STATUS_CONNECTING: &str = "Connecting to blockchain...";
pub const STATUS_LOADING_CONTRACT: &str = "Loading smart contract...";
pub const STATUS_LOADING_DATA: &str = "Loading blockchain data...";
pub const STATUS_READY: &str = "Ready for blockchain operations";

/// Status to show when [`Session::connect`] failed.
pub fn connection_failed_status(error: &Error) -> String {
    format!("Connection failed: {}", error.user_message())
}

/// Knobs of a [`Session`] that don't concern provider or manifest resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub verify_code: bool,
    pub settle: SettlePolicy,
    pub txn: TxnConfig,
    pub watch_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for SessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            verify_code: config.verify_code,
            settle: config.settle_policy(),
            txn: config.txn,
            watch_interval: config.watch_interval(),
        }
    }
}

/// Result of an accepted mutation.
#[derive(Debug)]
pub struct MutationOutcome {
    pub transaction: TransactionResult,
    /// The resync scheduled after the settle delay.
    pub resync: JoinHandle<()>,
}

/// Contract the session talks to.
#[derive(Debug)]
enum Binding {
    Bound(ContractHandle),
    /// Re-resolution after a network change failed. Holds the reason until a later network
    /// change resolves a deployment again.
    Disconnected(String),
}

/// The connected client: provider, contract binding, active account and the product snapshot.
///
/// The snapshot is replaced as a whole by every completed sync. Overlapping syncs are not
/// serialized, the last one to finish wins.
#[derive(Debug)]
pub struct Session {
    resolved: ResolvedProvider,
    loader: DescriptorLoader,
    binding: RwLock<Binding>,
    account: RwLock<Option<Address>>,
    products: RwLock<Arc<Vec<Product>>>,
    status: RwLock<String>,
    phase: RwLock<MutationPhase>,
    options: SessionOptions,
}

impl Session {
    /// Resolves the provider and the contract described by `config`, then runs the initial sync.
    pub async fn connect(config: &ClientConfig) -> Result<Arc<Self>> {
        let resolved = resolve_provider(config).await;
        let manifest = config.load_manifest()?;
        Self::connect_with(resolved, manifest, SessionOptions::from(config)).await
    }

    pub async fn connect_with(
        resolved: ResolvedProvider,
        manifest: DeploymentManifest,
        options: SessionOptions,
    ) -> Result<Arc<Self>> {
        info!(target: LOG_TARGET, provider = %resolved.kind, status = STATUS_CONNECTING);

        let accounts = resolved.provider.accounts().await.map_err(Error::ProviderUnavailable)?;
        let account = accounts.first().copied().ok_or(Error::NoAccounts)?;

        info!(target: LOG_TARGET, status = STATUS_LOADING_CONTRACT);
        let loader = DescriptorLoader::new(manifest).with_code_verification(options.verify_code);
        let descriptor = loader.load(resolved.provider.as_ref()).await?;
        let handle = ContractHandle::bind(resolved.provider.clone(), descriptor);

        let session = Arc::new(Self {
            resolved,
            loader,
            binding: RwLock::new(Binding::Bound(handle)),
            account: RwLock::new(Some(account)),
            products: RwLock::new(Arc::new(Vec::new())),
            status: RwLock::new(STATUS_INITIALIZING.to_string()),
            phase: RwLock::new(MutationPhase::Idle),
            options,
        });

        session.set_status(STATUS_READY);

        if let Err(error) = session.sync().await {
            warn!(target: LOG_TARGET, %error, "Initial sync failed.");
        }

        Ok(session)
    }

    /// Snapshot of the product collection as of the last completed sync.
    pub fn current_entities(&self) -> Arc<Vec<Product>> {
        self.products.read().clone()
    }

    pub fn status(&self) -> String {
        self.status.read().clone()
    }

    pub fn phase(&self) -> MutationPhase {
        *self.phase.read()
    }

    pub fn active_account(&self) -> Option<Address> {
        *self.account.read()
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.resolved.kind
    }

    pub fn descriptor(&self) -> Result<NetworkDescriptor> {
        self.handle().map(|handle| handle.descriptor().clone())
    }

    /// The bound contract, or [`Error::Disconnected`] after a failed network change.
    pub fn handle(&self) -> Result<ContractHandle> {
        match &*self.binding.read() {
            Binding::Bound(handle) => Ok(handle.clone()),
            Binding::Disconnected(reason) => Err(Error::Disconnected(reason.clone())),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(*self.binding.read(), Binding::Bound(_))
    }

    /// Re-reads the product collection and replaces the snapshot.
    ///
    /// On failure the previous snapshot is kept. A disconnected session fails without any RPC
    /// call.
    pub async fn sync(&self) -> Result<Arc<Vec<Product>>> {
        let handle = self.handle()?;
        self.set_status(STATUS_LOADING_DATA);

        let products = Arc::new(sync_entities(&handle).await?);
        *self.products.write() = products.clone();

        self.set_status(STATUS_READY);
        Ok(products)
    }

    pub async fn create_product(self: &Arc<Self>, form: &mut ProductForm) -> Result<MutationOutcome> {
        self.submit(form).await
    }

    pub async fn register_supplier(
        self: &Arc<Self>,
        form: &mut SupplierForm,
    ) -> Result<MutationOutcome> {
        self.submit(form).await
    }

    pub async fn transfer_product(
        self: &Arc<Self>,
        form: &mut TransferForm,
    ) -> Result<MutationOutcome> {
        self.submit(form).await
    }

    /// Validates `form`, sends its call from the active account and schedules one resync.
    ///
    /// Invalid input fails before any RPC call. On success the form is cleared, on failure it is
    /// left as is and the status carries the node's message.
    pub async fn submit<F: MutationForm>(self: &Arc<Self>, form: &mut F) -> Result<MutationOutcome> {
        let mutation = F::MUTATION;

        self.set_phase(MutationPhase::Validating);
        let call = match form.validate() {
            Ok(call) => call,
            Err(error) => {
                debug!(target: LOG_TARGET, ?mutation, %error, "Rejected input.");
                self.set_phase(MutationPhase::Failed);
                self.set_phase(MutationPhase::Idle);
                return Err(error.into());
            }
        };

        let handle = match self.handle() {
            Ok(handle) => handle,
            Err(error) => {
                debug!(target: LOG_TARGET, ?mutation, %error, "Session is disconnected.");
                self.set_phase(MutationPhase::Failed);
                self.set_phase(MutationPhase::Idle);
                return Err(error);
            }
        };

        let Some(from) = self.active_account() else {
            let status = mutation.failure_status(&Error::NoAccounts.user_message());
            return Err(self.fail(status, Error::NoAccounts));
        };

        self.set_phase(MutationPhase::Submitting);
        self.set_status(mutation.pending_status());

        match handle.write(&call, from, &self.options.txn).await {
            Ok(transaction) => {
                self.set_phase(MutationPhase::Confirmed);
                self.set_status(mutation.success_status());
                form.clear();

                let resync = self.schedule_resync();
                Ok(MutationOutcome { transaction, resync })
            }
            Err(error) => Err(self.fail(mutation.failure_status(&error.user_message()), error)),
        }
    }

    /// Reads the supplier registered under `account`, validating the address first.
    pub async fn supplier(&self, account: &str) -> Result<Supplier> {
        let account = parse_address(account).map_err(ValidationError::from)?;
        self.handle()?.supplier(account).await
    }

    /// A watcher for account and network changes on the session's provider.
    pub fn watcher(&self) -> ProviderWatcher {
        ProviderWatcher::new(self.resolved.provider.clone(), self.options.watch_interval)
    }

    /// Reacts to a provider event.
    ///
    /// An account change switches the active account to the first listed one. A network change
    /// drops the previous network's snapshot, resolves the descriptor again, rebinds the contract
    /// and resyncs. If resolution fails the session stays disconnected, and every contract
    /// operation fails without an RPC call, until a later network change succeeds.
    pub async fn handle_event(&self, event: ProviderEvent) -> Result<()> {
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                let account = accounts.first().copied();
                info!(target: LOG_TARGET, account = ?account, "Active account changed.");
                *self.account.write() = account;
                Ok(())
            }

            ProviderEvent::NetworkChanged(network_id) => {
                info!(target: LOG_TARGET, network_id, "Network changed, reloading contract.");
                self.set_status(STATUS_LOADING_CONTRACT);
                self.loader.invalidate();
                *self.products.write() = Arc::new(Vec::new());

                let descriptor = match self.loader.load(self.resolved.provider.as_ref()).await {
                    Ok(descriptor) => descriptor,
                    Err(error) => {
                        warn!(target: LOG_TARGET, network_id, %error, "Session disconnected.");
                        *self.binding.write() = Binding::Disconnected(error.user_message());
                        self.set_status(connection_failed_status(&error));
                        return Err(error);
                    }
                };

                let handle = ContractHandle::bind(self.resolved.provider.clone(), descriptor);
                *self.binding.write() = Binding::Bound(handle);
                self.sync().await.map(|_| ())
            }
        }
    }

    fn schedule_resync(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        let delay = self.options.settle.post_mutation_settle_delay;
        self.set_phase(MutationPhase::ScheduledResync);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if let Err(error) = session.sync().await {
                warn!(target: LOG_TARGET, %error, "Resync after mutation failed.");
            }

            session.set_phase(MutationPhase::Idle);
        })
    }

    fn fail(&self, status: String, error: Error) -> Error {
        self.set_phase(MutationPhase::Failed);
        self.set_status(status);
        self.set_phase(MutationPhase::Idle);
        error
    }

    fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        info!(target: LOG_TARGET, %status);
        *self.status.write() = status;
    }

    fn set_phase(&self, phase: MutationPhase) {
        debug!(target: LOG_TARGET, %phase, "Mutation phase.");
        *self.phase.write() = phase;
    }
}
