use async_trait::async_trait;
use corsa_domain::{PaymentMethod, PaymentStatus};
use uuid::Uuid;

/// What the gateway reported back for a charge or refund
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub status: PaymentStatus,
    pub gateway: String,
    pub transaction_id: String,
}

/// Moves the money the engine has computed. The engine only consumes the
/// reported status; gateway protocol details live behind this trait.
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    async fn charge(
        &self,
        booking_id: Uuid,
        amount: i64,
        method: PaymentMethod,
    ) -> Result<PaymentReceipt, Box<dyn std::error::Error + Send + Sync>>;

    async fn refund(
        &self,
        booking_id: Uuid,
        amount: i64,
    ) -> Result<PaymentReceipt, Box<dyn std::error::Error + Send + Sync>>;
}

/// Always-successful adapter for tests and local runs
pub struct MockPaymentAdapter;

#[async_trait]
impl PaymentAdapter for MockPaymentAdapter {
    async fn charge(
        &self,
        booking_id: Uuid,
        _amount: i64,
        _method: PaymentMethod,
    ) -> Result<PaymentReceipt, Box<dyn std::error::Error + Send + Sync>> {
        Ok(PaymentReceipt {
            status: PaymentStatus::Succeeded,
            gateway: "mock".to_string(),
            transaction_id: format!("mock_ch_{}", booking_id.simple()),
        })
    }

    async fn refund(
        &self,
        booking_id: Uuid,
        _amount: i64,
    ) -> Result<PaymentReceipt, Box<dyn std::error::Error + Send + Sync>> {
        Ok(PaymentReceipt {
            status: PaymentStatus::Refunded,
            gateway: "mock".to_string(),
            transaction_id: format!("mock_rf_{}", booking_id.simple()),
        })
    }
}
