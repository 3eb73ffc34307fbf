pub mod google;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

// Traits.

/// Generic translation trait that clients must implement.
///
/// Implementing this trait allows different translation providers to be used
/// by the reaction translator.
#[async_trait]
pub trait GenericTranslateClient: Send + Sync + 'static {
    /// Translate `text` into the language identified by `target_language`.
    async fn translate(&self, text: &str, target_language: &str) -> Res<String>;
}

// Structs.

/// Translation client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TranslateClient {
    inner: Arc<dyn GenericTranslateClient>,
}

impl Deref for TranslateClient {
    type Target = dyn GenericTranslateClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TranslateClient {
    pub fn new(inner: Arc<dyn GenericTranslateClient>) -> Self {
        Self { inner }
    }
}
