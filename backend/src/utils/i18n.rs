//! Internationalization utilities for the backend
//!
//! This module provides locale extraction from HTTP requests and
//! request-scoped storage for the current locale.

use std::future::Future;

// Task-local storage for the current locale. Scoped per request by the
// locale middleware, so it follows the request across worker threads.
tokio::task_local! {
    static CURRENT_LOCALE: String;
}

/// Locale used when the client sends none or an unsupported one
pub const DEFAULT_LOCALE: &str = "pt";

/// Run `fut` with `locale` as the current locale
pub async fn with_locale<F: Future>(locale: &str, fut: F) -> F::Output {
    CURRENT_LOCALE.scope(normalize_locale(locale), fut).await
}

/// Get the current locale, falling back to the default outside a request scope
pub fn get_locale() -> String {
    CURRENT_LOCALE
        .try_with(|l| l.clone())
        .unwrap_or_else(|_| DEFAULT_LOCALE.to_string())
}

/// Normalize locale string to supported format
/// Accepts: "pt", "pt-BR", "pt_BR", "en", "en-US", "en_US", etc.
fn normalize_locale(locale: &str) -> String {
    let locale = locale.trim().to_lowercase();

    // Extract primary language tag
    let primary = locale
        .split(['-', '_', ',', ';'])
        .next()
        .unwrap_or(DEFAULT_LOCALE);

    if primary.starts_with("en") {
        "en".to_string()
    } else {
        DEFAULT_LOCALE.to_string()
    }
}

/// Extract locale from Accept-Language header value
pub fn extract_locale_from_header(header_value: Option<&str>) -> String {
    match header_value {
        Some(value) => normalize_locale(value),
        None => DEFAULT_LOCALE.to_string(),
    }
}
