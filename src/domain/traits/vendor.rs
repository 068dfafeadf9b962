use async_trait::async_trait;
use crate::application::errors::{AuthError, VendorError};
use crate::domain::entities::{AccessToken, GuideSet, Species};

/// Result type for vendor operations
pub type VendorResult<T> = Result<T, VendorError>;

/// Remote CRISPR design service
///
/// Every operation is a single authenticated call using an already resolved
/// token. Token lifecycle is the caller's concern.
#[async_trait]
pub trait CrisprVendor: Send + Sync {
    /// Get the vendor name
    fn name(&self) -> &str;

    /// Design guides against a 23-1000 bp target sequence
    async fn design_guides(&self, token: &AccessToken, sequence: &str, species: Species) -> VendorResult<GuideSet>;

    /// Score a 20 bp protospacer
    async fn check_sequence(&self, token: &AccessToken, protospacer: &str, species: Species) -> VendorResult<GuideSet>;

    /// Look up predesigned guides for a gene symbol
    async fn lookup_predesigned(&self, token: &AccessToken, gene_symbol: &str, species: Species) -> VendorResult<GuideSet>;
}

/// Source of vendor access tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// A token with lifetime left beyond the safety margin
    async fn get_valid_token(&self) -> Result<AccessToken, AuthError>;

    /// Replace a token the vendor rejected
    async fn force_refresh(&self, rejected: &AccessToken) -> Result<AccessToken, AuthError>;
}
