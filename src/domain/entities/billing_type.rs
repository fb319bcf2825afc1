use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// How the gateway collects a charge. Wire values follow the gateway's casing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum BillingType {
    Pix,
    Boleto,
    CreditCard,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn wire_names() {
        assert_eq!(BillingType::CreditCard.as_ref(), "CREDIT_CARD");
        assert_eq!(BillingType::from_str("pix").unwrap(), BillingType::Pix);
        assert_eq!(
            serde_json::to_string(&BillingType::Boleto).unwrap(),
            "\"BOLETO\""
        );
    }
}
