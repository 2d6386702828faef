//! Federated credentials from a Cognito identity pool.

use crate::{Error, Result};
use aws_config::BehaviorVersion;
use aws_sdk_cognitoidentity::Client as CognitoClient;
use aws_sdk_s3::config::{Credentials, Region};
use std::time::SystemTime;
use tracing::{debug, info};

const PROVIDER_NAME: &str = "cognito-identity-pool";

/// Obtains temporary credentials for an unauthenticated identity in `identity_pool_id`.
pub async fn identity_pool_credentials(
    identity_pool_id: &str,
    region: &str,
) -> Result<Credentials> {
    // GetId and GetCredentialsForIdentity are unsigned calls.
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .no_credentials()
        .load()
        .await;
    let client = CognitoClient::new(&config);

    let identity = client
        .get_id()
        .identity_pool_id(identity_pool_id)
        .send()
        .await
        .map_err(|e| Error::Credentials(format!("Failed to get identity: {}", e)))?;
    let identity_id = identity
        .identity_id()
        .ok_or_else(|| Error::Credentials("Identity pool returned no identity id".to_string()))?;
    debug!("Resolved Cognito identity {}", identity_id);

    let response = client
        .get_credentials_for_identity()
        .identity_id(identity_id)
        .send()
        .await
        .map_err(|e| Error::Credentials(format!("Failed to get credentials: {}", e)))?;
    let credentials = response
        .credentials()
        .ok_or_else(|| Error::Credentials("Identity pool returned no credentials".to_string()))?;

    let access_key_id = credentials
        .access_key_id()
        .ok_or_else(|| Error::Credentials("Missing access key id".to_string()))?;
    let secret_key = credentials
        .secret_key()
        .ok_or_else(|| Error::Credentials("Missing secret key".to_string()))?;
    let expiry = credentials
        .expiration()
        .and_then(|expiration| SystemTime::try_from(*expiration).ok());

    info!("Using credentials from identity pool {}", identity_pool_id);
    Ok(Credentials::new(
        access_key_id,
        secret_key,
        credentials.session_token().map(str::to_string),
        expiry,
        PROVIDER_NAME,
    ))
}
