use async_trait::async_trait;
use log::info;
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::identity::Identity;
use super::traits::IdentityProvider;

/// Identity provider that signs in as one fixed account.
///
/// Stands in for the hosted sign-in flow in local setups and tests.
pub struct StaticIdentityProvider {
    account: Identity,
    state: watch::Sender<Option<Identity>>,
}

impl StaticIdentityProvider {
    /// Signed out until `sign_in` is called.
    pub fn new(account: Identity) -> Self {
        Self {
            account,
            state: watch::channel(None).0,
        }
    }

    /// Already signed in as `account`.
    pub fn signed_in(account: Identity) -> Self {
        Self {
            state: watch::channel(Some(account.clone())).0,
            account,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IdentityProvider for StaticIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }

    async fn sign_in(&self) -> Result<Identity, CoreError> {
        self.state.send_replace(Some(self.account.clone()));
        info!("Signed in as {}", self.account.uid);
        Ok(self.account.clone())
    }

    async fn sign_out(&self) -> Result<(), CoreError> {
        if self.state.send_replace(None).is_some() {
            info!("Signed out {}", self.account.uid);
        }
        Ok(())
    }
}
