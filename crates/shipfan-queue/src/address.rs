//! Queue identifier parsing and endpoint URL resolution.
//!
//! A queue is named by a six-part, colon-separated resource identifier:
//!
//! ```text
//! arn:aws:sqs:us-east-1:773658737383:processfulfillment-items-queue
//!  0   1   2      3           4                  5
//! ```
//!
//! Only the account id and queue name are needed to build the queue URL:
//! `<base endpoint><account id>/<queue name>`.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::config::QueueConfig;
use crate::error::DispatchError;

const ARN_PARTS: usize = 6;

/// Decomposed queue identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueAddress {
    pub region: String,
    pub account_id: String,
    pub queue_name: String,
}

impl QueueAddress {
    pub fn parse(identifier: &str) -> Result<Self, DispatchError> {
        let invalid = |reason: &str| DispatchError::InvalidQueueAddress {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = identifier.trim().split(':').collect();
        if parts.len() != ARN_PARTS {
            return Err(invalid(&format!(
                "expected {ARN_PARTS} colon-separated parts, found {}",
                parts.len()
            )));
        }

        let (account_id, queue_name) = (parts[4], parts[5]);
        if account_id.is_empty() {
            return Err(invalid("account id is empty"));
        }
        if queue_name.is_empty() {
            return Err(invalid("queue name is empty"));
        }

        Ok(Self {
            region: parts[3].to_string(),
            account_id: account_id.to_string(),
            queue_name: queue_name.to_string(),
        })
    }
}

impl FromStr for QueueAddress {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for QueueAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account_id, self.queue_name)
    }
}

/// Validated base endpoint of the queue service, always ending in `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEndpoint {
    base: String,
    region: String,
}

impl QueueEndpoint {
    pub fn new(base: &str, region: impl Into<String>) -> Result<Self, DispatchError> {
        let mut base = base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let url = Url::parse(&base).map_err(|e| DispatchError::InvalidEndpoint {
            endpoint: base.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DispatchError::InvalidEndpoint {
                endpoint: base,
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(Self {
            base: url.to_string(),
            region: region.into(),
        })
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self, DispatchError> {
        Self::new(&config.base_endpoint(), config.region.clone())
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Full queue URL for `address`.
    pub fn queue_url(&self, address: &QueueAddress) -> String {
        if !address.region.is_empty() && address.region != self.region {
            tracing::warn!(
                queue_region = %address.region,
                endpoint_region = %self.region,
                "queue region differs from configured region"
            );
        }
        format!("{}{}/{}", self.base, address.account_id, address.queue_name)
    }

    /// Parse `identifier` and return its queue URL.
    pub fn resolve(&self, identifier: &str) -> Result<String, DispatchError> {
        Ok(self.queue_url(&QueueAddress::parse(identifier)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARN: &str = "arn:aws:sqs:us-east-1:773658737383:processfulfillment-items-queue";

    #[test]
    fn parses_account_and_queue() {
        let addr: QueueAddress = ARN.parse().unwrap();
        assert_eq!(addr.region, "us-east-1");
        assert_eq!(addr.account_id, "773658737383");
        assert_eq!(addr.queue_name, "processfulfillment-items-queue");
        assert_eq!(addr.to_string(), "773658737383/processfulfillment-items-queue");
    }

    #[test]
    fn rejects_short_identifier() {
        let err = QueueAddress::parse("arn:aws:sqs:us-east-1:773658737383").unwrap_err();
        assert!(matches!(err, DispatchError::InvalidQueueAddress { .. }));
        assert!(QueueAddress::parse("").is_err());
        assert!(QueueAddress::parse("https://sqs.us-east-1.amazonaws.com/1/q").is_err());
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(QueueAddress::parse("arn:aws:sqs:us-east-1::queue").is_err());
        assert!(QueueAddress::parse("arn:aws:sqs:us-east-1:123:").is_err());
    }

    #[test]
    fn resolves_default_endpoint() {
        let endpoint = QueueEndpoint::from_config(&QueueConfig::default()).unwrap();
        assert_eq!(
            endpoint.resolve(ARN).unwrap(),
            "https://sqs.us-east-1.amazonaws.com/773658737383/processfulfillment-items-queue"
        );
    }

    #[test]
    fn override_gets_trailing_slash() {
        let endpoint = QueueEndpoint::new("http://localhost:9324", "us-east-1").unwrap();
        assert_eq!(endpoint.base(), "http://localhost:9324/");
        assert_eq!(
            endpoint.resolve(ARN).unwrap(),
            "http://localhost:9324/773658737383/processfulfillment-items-queue"
        );
    }

    #[test]
    fn rejects_bad_endpoint() {
        assert!(QueueEndpoint::new("not a url", "us-east-1").is_err());
        assert!(QueueEndpoint::new("ftp://example.com/", "us-east-1").is_err());
    }
}
