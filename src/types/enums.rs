//! Status and kind enumerations shared by several endpoints.

use crate::marshal::WireEnum;

/// Lifecycle status of a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeStatus {
    Pending,
    Awaiting,
    Authorized,
    Successful,
    Failed,
    Error,
    Canceled,
}

impl ChargeStatus {
    pub const ALL: [ChargeStatus; 7] = [
        ChargeStatus::Pending,
        ChargeStatus::Awaiting,
        ChargeStatus::Authorized,
        ChargeStatus::Successful,
        ChargeStatus::Failed,
        ChargeStatus::Error,
        ChargeStatus::Canceled,
    ];

    /// Whether the charge can no longer change status.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ChargeStatus::Successful
                | ChargeStatus::Failed
                | ChargeStatus::Error
                | ChargeStatus::Canceled
        )
    }
}

impl WireEnum for ChargeStatus {
    const TYPE_NAME: &'static str = "ChargeStatus";

    fn as_wire(&self) -> &'static str {
        match self {
            ChargeStatus::Pending => "pending",
            ChargeStatus::Awaiting => "awaiting",
            ChargeStatus::Authorized => "authorized",
            ChargeStatus::Successful => "successful",
            ChargeStatus::Failed => "failed",
            ChargeStatus::Error => "error",
            ChargeStatus::Canceled => "canceled",
        }
    }

    fn from_wire(code: &str) -> Option<Self> {
        ChargeStatus::ALL.into_iter().find(|s| s.as_wire() == code)
    }
}

/// Usage class of a transaction token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    OneTime,
    Subscription,
    Recurring,
}

impl TokenType {
    pub const ALL: [TokenType; 3] = [
        TokenType::OneTime,
        TokenType::Subscription,
        TokenType::Recurring,
    ];
}

impl WireEnum for TokenType {
    const TYPE_NAME: &'static str = "TokenType";

    fn as_wire(&self) -> &'static str {
        match self {
            TokenType::OneTime => "one_time",
            TokenType::Subscription => "subscription",
            TokenType::Recurring => "recurring",
        }
    }

    fn from_wire(code: &str) -> Option<Self> {
        TokenType::ALL.into_iter().find(|t| t.as_wire() == code)
    }
}

/// Payment method family of a transaction token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentType {
    Card,
    QrScan,
    QrMerchant,
    Konbini,
    ApplePay,
    GooglePay,
    Paidy,
    Online,
    BankTransfer,
}

impl PaymentType {
    pub const ALL: [PaymentType; 9] = [
        PaymentType::Card,
        PaymentType::QrScan,
        PaymentType::QrMerchant,
        PaymentType::Konbini,
        PaymentType::ApplePay,
        PaymentType::GooglePay,
        PaymentType::Paidy,
        PaymentType::Online,
        PaymentType::BankTransfer,
    ];
}

impl WireEnum for PaymentType {
    const TYPE_NAME: &'static str = "PaymentType";

    fn as_wire(&self) -> &'static str {
        match self {
            PaymentType::Card => "card",
            PaymentType::QrScan => "qr_scan",
            PaymentType::QrMerchant => "qr_merchant",
            PaymentType::Konbini => "konbini",
            PaymentType::ApplePay => "apple_pay",
            PaymentType::GooglePay => "google_pay",
            PaymentType::Paidy => "paidy",
            PaymentType::Online => "online",
            PaymentType::BankTransfer => "bank_transfer",
        }
    }

    fn from_wire(code: &str) -> Option<Self> {
        PaymentType::ALL.into_iter().find(|p| p.as_wire() == code)
    }
}

/// Processor that carried out a charge on the gateway side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gateway {
    Univapay,
    Paidy,
    AlipayConnect,
    AlipayPlus,
    WechatPay,
    PayPay,
    DBarai,
    RakutenPay,
}

impl Gateway {
    pub const ALL: [Gateway; 8] = [
        Gateway::Univapay,
        Gateway::Paidy,
        Gateway::AlipayConnect,
        Gateway::AlipayPlus,
        Gateway::WechatPay,
        Gateway::PayPay,
        Gateway::DBarai,
        Gateway::RakutenPay,
    ];
}

impl WireEnum for Gateway {
    const TYPE_NAME: &'static str = "Gateway";

    fn as_wire(&self) -> &'static str {
        match self {
            Gateway::Univapay => "univapay",
            Gateway::Paidy => "paidy",
            Gateway::AlipayConnect => "alipay_connect",
            Gateway::AlipayPlus => "alipay_plus",
            Gateway::WechatPay => "wechat_pay",
            Gateway::PayPay => "pay_pay",
            Gateway::DBarai => "d_barai",
            Gateway::RakutenPay => "rakuten_pay",
        }
    }

    fn from_wire(code: &str) -> Option<Self> {
        Gateway::ALL.into_iter().find(|g| g.as_wire() == code)
    }
}

wire_enum_impls!(ChargeStatus, TokenType, PaymentType, Gateway);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::Error;

    #[test]
    fn codes_are_unique() {
        fn assert_unique<T: WireEnum>(all: &[T]) {
            let mut codes: Vec<_> = all.iter().map(|v| v.as_wire()).collect();
            codes.sort_unstable();
            codes.dedup();
            assert_eq!(codes.len(), all.len(), "{}", T::TYPE_NAME);
        }

        assert_unique(&ChargeStatus::ALL);
        assert_unique(&TokenType::ALL);
        assert_unique(&PaymentType::ALL);
        assert_unique(&Gateway::ALL);
    }

    #[test]
    fn serde_uses_wire_codes() {
        assert_eq!(
            serde_json::to_value(TokenType::OneTime).unwrap(),
            json!("one_time")
        );
        let status: ChargeStatus = serde_json::from_value(json!("authorized")).unwrap();
        assert_eq!(status, ChargeStatus::Authorized);
        assert!(!status.is_final());
        assert!(serde_json::from_value::<PaymentType>(json!("cash")).is_err());
    }

    #[test]
    fn gateway_codes() {
        assert_eq!(Gateway::PayPay.to_string(), "pay_pay");
        let gateway: Gateway = serde_json::from_value(json!("alipay_plus")).unwrap();
        assert_eq!(gateway, Gateway::AlipayPlus);
        for bad in ["Univapay", "paypay", "alipay", ""] {
            let err = bad.parse::<Gateway>().unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::MalformedWireValue {
                        type_name: "Gateway",
                        ..
                    }
                ),
                "{bad}"
            );
        }
    }
}
