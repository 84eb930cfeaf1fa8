use crate::identity::types::ProviderErrorBody;

/// Extract the provider's error message from a failed response body.
/// Falls back to a generic message when the body is absent or unreadable.
pub(super) async fn read_error_message(response: reqwest::Response) -> String {
    response
        .json::<ProviderErrorBody>()
        .await
        .map(ProviderErrorBody::into_message)
        .unwrap_or_else(|_| "unknown provider error".to_string())
}
