//! API endpoint implementations
//!
//! Each group is a thin view over a [`RestClient`](crate::RestClient); all
//! requests go through its shared dispatcher and are always authenticated.

pub mod accounts;
pub mod fees;
pub mod futures;
pub mod orders;
pub mod payment_methods;
pub mod portfolios;
pub mod products;
pub mod public;

pub use accounts::AccountEndpoints;
pub use fees::FeeEndpoints;
pub use futures::FuturesEndpoints;
pub use orders::OrderEndpoints;
pub use payment_methods::PaymentMethodEndpoints;
pub use portfolios::PortfolioEndpoints;
pub use products::ProductEndpoints;
pub use public::PublicEndpoints;

use reqwest::Url;

use crate::error::{RestError, RestResult};

/// Path prefix shared by every Advanced Trade endpoint
pub const API_PREFIX: &str = "/api/v3/brokerage";

pub(crate) fn brokerage_path(segment: &str) -> String {
    format!("{}{}", API_PREFIX, segment)
}

/// Path for a resource id, percent-encoded as one path segment
///
/// `/`, `?` and `#` in an id stay inside the segment. Dot segments would
/// move the request to another endpoint and are rejected.
pub(crate) fn resource_path(segment: &str, id: &str) -> RestResult<String> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(RestError::InvalidParameter(format!(
            "invalid id '{}' for {}",
            id, segment
        )));
    }
    Ok(format!("{}{}/{}", API_PREFIX, segment, encode_segment(id)?))
}

fn encode_segment(id: &str) -> RestResult<String> {
    let invalid = || RestError::InvalidParameter(format!("cannot encode id '{}'", id));

    let mut scratch = Url::parse("https://localhost/").map_err(|_| invalid())?;
    scratch
        .path_segments_mut()
        .map_err(|_| invalid())?
        .clear()
        .push(id);
    let encoded = scratch.path().trim_start_matches('/');
    if encoded.is_empty() {
        return Err(invalid());
    }
    Ok(encoded.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(brokerage_path("/accounts"), "/api/v3/brokerage/accounts");
        assert_eq!(
            resource_path("/orders/historical", "abc-123").unwrap(),
            "/api/v3/brokerage/orders/historical/abc-123"
        );
        assert!(resource_path("/accounts", "").is_err());
    }

    #[test]
    fn test_ids_stay_in_one_segment() {
        assert_eq!(
            resource_path("/accounts", "abc?limit=1").unwrap(),
            "/api/v3/brokerage/accounts/abc%3Flimit=1"
        );
        assert_eq!(
            resource_path("/orders/historical", "../../accounts").unwrap(),
            "/api/v3/brokerage/orders/historical/..%2F..%2Faccounts"
        );
        assert_eq!(
            resource_path("/products", "a#b\\c").unwrap(),
            "/api/v3/brokerage/products/a%23b%5Cc"
        );
    }

    #[test]
    fn test_dot_ids_rejected() {
        assert!(matches!(
            resource_path("/accounts", ".."),
            Err(RestError::InvalidParameter(_))
        ));
        assert!(resource_path("/accounts", ".").is_err());
        assert_eq!(
            resource_path("/accounts", "%2e%2e").unwrap(),
            "/api/v3/brokerage/accounts/%252e%252e"
        );
    }
}
