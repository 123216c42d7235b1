//! Error classifier
//!
//! Maps failed calls to error categories and owns the retry-eligibility policy

use crate::models::fix::{ApiError, ErrorCategory};

/// Classify a normalized failure
pub fn classify(error: &ApiError) -> ErrorCategory {
    category_for_status(error.status_code)
}

/// Category for a raw status code; 0 means the call never got a response
pub fn category_for_status(status_code: u16) -> ErrorCategory {
    match status_code {
        0 => ErrorCategory::Network,
        401 | 403 => ErrorCategory::Authentication,
        400 | 422 => ErrorCategory::Validation,
        404 => ErrorCategory::NotFound,
        s if s >= 500 => ErrorCategory::Server,
        _ => ErrorCategory::Unknown,
    }
}

/// Whether altering the request body could plausibly fix this category
///
/// This is the only place that decides retry eligibility; everything else asks here.
pub fn is_retry_eligible(category: ErrorCategory) -> bool {
    matches!(category, ErrorCategory::Validation)
}

/// Canned explanation used when no AI explanation is available
pub fn fallback_explanation(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Authentication => {
            "The API rejected the credentials. Sign in again or provide a valid bearer token with sufficient permissions."
        }
        ErrorCategory::Validation => {
            "The API rejected the submitted data. Some fields are missing or have an invalid format."
        }
        ErrorCategory::NotFound => {
            "The requested resource was not found. Check the identifier or whether it has been deleted."
        }
        ErrorCategory::Server => {
            "The API encountered an internal error. This is not caused by your input; please try again later."
        }
        ErrorCategory::Network => {
            "The API could not be reached (connection failure or timeout). Check connectivity and try again later."
        }
        ErrorCategory::Unknown => "The API returned an unexpected error.",
    }
}

/// Canned advice accompanying the fallback explanation
pub fn fallback_suggestions(category: ErrorCategory) -> Vec<String> {
    let items: &[&str] = match category {
        ErrorCategory::Authentication => &[
            "Make sure a bearer token is set",
            "Check that the account has admin rights for this operation",
        ],
        ErrorCategory::Validation => &[
            "Check the data format",
            "Make sure all required fields are filled in",
            "Consult the API documentation",
        ],
        ErrorCategory::NotFound => &["Verify the identifier", "List the resources to find the right one"],
        ErrorCategory::Server => &["Wait a moment and try again", "Contact the API operator if it persists"],
        ErrorCategory::Network => &["Check the network connection", "Try again later"],
        ErrorCategory::Unknown => &["Consult the API documentation"],
    };
    items.iter().map(|s| s.to_string()).collect()
}
