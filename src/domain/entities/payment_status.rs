use serde::{Serialize, Serializer};

/// Status of a single charge as reported by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Received,
    ReceivedInCash,
    Overdue,
    Refunded,
    Chargeback,
    AwaitingRiskAnalysis,
    Unknown(String),
}

impl PaymentStatus {
    /// Map an Asaas payment status string.
    pub fn from_gateway(s: &str) -> Self {
        match s {
            "PENDING" => PaymentStatus::Pending,
            "CONFIRMED" => PaymentStatus::Confirmed,
            "RECEIVED" => PaymentStatus::Received,
            "RECEIVED_IN_CASH" => PaymentStatus::ReceivedInCash,
            "OVERDUE" => PaymentStatus::Overdue,
            "REFUNDED" | "REFUND_REQUESTED" | "REFUND_IN_PROGRESS" => PaymentStatus::Refunded,
            "CHARGEBACK_REQUESTED" | "CHARGEBACK_DISPUTE" | "AWAITING_CHARGEBACK_REVERSAL" => {
                PaymentStatus::Chargeback
            }
            "AWAITING_RISK_ANALYSIS" => PaymentStatus::AwaitingRiskAnalysis,
            other => PaymentStatus::Unknown(other.to_string()),
        }
    }

    /// Money has been confirmed or settled.
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Confirmed | PaymentStatus::Received | PaymentStatus::ReceivedInCash
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Received => "received",
            PaymentStatus::ReceivedInCash => "received_in_cash",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Chargeback => "chargeback",
            PaymentStatus::AwaitingRiskAnalysis => "awaiting_risk_analysis",
            PaymentStatus::Unknown(raw) => raw.as_str(),
        }
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
