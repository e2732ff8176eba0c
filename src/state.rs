use std::sync::Arc;

use crate::{
    middleware::auth::{Authorizer, TokenService},
    payments::PaymentState,
    store::{Store, StoreState},
};

#[derive(Clone)]
pub struct AppState {
    pub store: StoreState,
    pub authorizer: Authorizer,
    pub tokens: TokenService,
    pub payments: PaymentState,
}

impl AppState {
    /// The role gate reads roles from the same store the handlers write to.
    pub fn new<S>(store: Arc<S>, tokens: TokenService, payments: PaymentState) -> Self
    where
        S: Store + 'static,
    {
        let authorizer = Authorizer::new(store.clone());
        Self {
            store,
            authorizer,
            tokens,
            payments,
        }
    }
}
