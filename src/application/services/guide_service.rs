use std::sync::Arc;

use crate::application::errors::BotError;
use crate::domain::entities::{AccessToken, CommandRequest, GuideSet, Subcommand};
use crate::domain::traits::{CrisprVendor, TokenSource, VendorResult};

/// Service for running guide requests against the vendor
///
/// A request is tried once with the current token. If the vendor answers
/// Unauthorized, the token is force-refreshed and the request is tried once
/// more; the outcome of that second call is final.
pub struct GuideService {
    tokens: Arc<dyn TokenSource>,
    vendor: Arc<dyn CrisprVendor>,
}

impl GuideService {
    pub fn new(tokens: Arc<dyn TokenSource>, vendor: Arc<dyn CrisprVendor>) -> Self {
        Self { tokens, vendor }
    }

    pub fn vendor_name(&self) -> &str {
        self.vendor.name()
    }

    /// Ensure a valid token before any vendor call
    pub async fn authenticate(&self) -> Result<AccessToken, BotError> {
        Ok(self.tokens.get_valid_token().await?)
    }

    /// Run a request with a resolved token
    pub async fn execute(&self, request: &CommandRequest, token: AccessToken) -> Result<GuideSet, BotError> {
        match self.call(request, &token).await {
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("IDT rejected token for {}, forcing refresh", request.subcommand);
                let token = self.tokens.force_refresh(&token).await?;
                Ok(self.call(request, &token).await?)
            }
            result => Ok(result?),
        }
    }

    async fn call(&self, request: &CommandRequest, token: &AccessToken) -> VendorResult<GuideSet> {
        match request.subcommand {
            Subcommand::Design => self.vendor.design_guides(token, &request.target, request.species).await,
            Subcommand::Check => self.vendor.check_sequence(token, &request.target, request.species).await,
            Subcommand::Predesign => self.vendor.lookup_predesigned(token, &request.target, request.species).await,
            Subcommand::Help => Ok(GuideSet::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::{AuthError, VendorError, VendorErrorKind};
    use crate::domain::entities::Species;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingTokens {
        refreshes: AtomicUsize,
    }

    #[async_trait]
    impl TokenSource for CountingTokens {
        async fn get_valid_token(&self) -> Result<AccessToken, AuthError> {
            Ok(AccessToken::issued_now("first", 3600))
        }

        async fn force_refresh(&self, _rejected: &AccessToken) -> Result<AccessToken, AuthError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::issued_now("second", 3600))
        }
    }

    /// Answers each call from a script and records the token used
    struct ScriptedVendor {
        script: Mutex<Vec<VendorResult<GuideSet>>>,
        seen_tokens: Mutex<Vec<String>>,
    }

    impl ScriptedVendor {
        fn new(mut script: Vec<VendorResult<GuideSet>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                seen_tokens: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, token: &AccessToken) -> VendorResult<GuideSet> {
            self.seen_tokens.lock().unwrap().push(token.token.clone());
            self.script.lock().unwrap().pop().expect("unexpected vendor call")
        }
    }

    #[async_trait]
    impl CrisprVendor for ScriptedVendor {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn design_guides(&self, token: &AccessToken, _: &str, _: Species) -> VendorResult<GuideSet> {
            self.next(token)
        }

        async fn check_sequence(&self, token: &AccessToken, _: &str, _: Species) -> VendorResult<GuideSet> {
            self.next(token)
        }

        async fn lookup_predesigned(&self, token: &AccessToken, _: &str, _: Species) -> VendorResult<GuideSet> {
            self.next(token)
        }
    }

    fn unauthorized() -> VendorResult<GuideSet> {
        Err(VendorError::from_status(401, "expired"))
    }

    fn setup(script: Vec<VendorResult<GuideSet>>) -> (GuideService, Arc<CountingTokens>, Arc<ScriptedVendor>) {
        let tokens = Arc::new(CountingTokens { refreshes: AtomicUsize::new(0) });
        let vendor = Arc::new(ScriptedVendor::new(script));
        (GuideService::new(tokens.clone(), vendor.clone()), tokens, vendor)
    }

    fn check_request() -> CommandRequest {
        CommandRequest::new(Subcommand::Check, "ATGGCAGATTCCCAGTTGGA", Species::Human)
    }

    #[tokio::test]
    async fn test_unauthorized_retries_once_with_new_token() {
        let (service, tokens, vendor) = setup(vec![unauthorized(), Ok(GuideSet::default())]);
        let token = service.authenticate().await.unwrap();

        let result = service.execute(&check_request(), token).await;

        assert!(result.is_ok());
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(*vendor.seen_tokens.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_second_unauthorized_is_final() {
        let (service, tokens, _vendor) = setup(vec![unauthorized(), unauthorized()]);
        let token = service.authenticate().await.unwrap();

        let err = service.execute(&check_request(), token).await.unwrap_err();

        assert!(matches!(err, BotError::Vendor(ref e) if e.kind == VendorErrorKind::Unauthorized));
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let (service, tokens, vendor) = setup(vec![Err(VendorError::from_status(429, "slow down"))]);
        let token = service.authenticate().await.unwrap();

        let err = service.execute(&check_request(), token).await.unwrap_err();

        assert!(matches!(err, BotError::Vendor(ref e) if e.kind == VendorErrorKind::RateLimited));
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 0);
        assert_eq!(vendor.seen_tokens.lock().unwrap().len(), 1);
    }
}
