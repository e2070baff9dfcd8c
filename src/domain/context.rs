//! Operation Context
//!
//! Per-request metadata carried into handlers for log correlation.

use std::net::IpAddr;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Set by the bearer middleware once the session resolves
    pub customer_id: Option<i64>,
    pub correlation_id: Option<Uuid>,
    pub client_ip: Option<IpAddr>,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customer(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }
}
