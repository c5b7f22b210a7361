use crate::marshal::WireEnum;

/// Card network of a payment card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardBrand {
    Visa,
    Mastercard,
    Maestro,
    AmericanExpress,
    Jcb,
    DinersClub,
    Discover,
    UnionPay,
}

impl CardBrand {
    pub const ALL: [CardBrand; 8] = [
        CardBrand::Visa,
        CardBrand::Mastercard,
        CardBrand::Maestro,
        CardBrand::AmericanExpress,
        CardBrand::Jcb,
        CardBrand::DinersClub,
        CardBrand::Discover,
        CardBrand::UnionPay,
    ];
}

impl WireEnum for CardBrand {
    const TYPE_NAME: &'static str = "CardBrand";

    fn as_wire(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Maestro => "maestro",
            CardBrand::AmericanExpress => "american_express",
            CardBrand::Jcb => "jcb",
            CardBrand::DinersClub => "diners_club",
            CardBrand::Discover => "discover",
            CardBrand::UnionPay => "unionpay",
        }
    }

    fn from_wire(code: &str) -> Option<Self> {
        CardBrand::ALL.into_iter().find(|b| b.as_wire() == code)
    }
}

wire_enum_impls!(CardBrand);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::Error;

    #[test]
    fn wire_codes() {
        assert_eq!(
            serde_json::to_value(CardBrand::AmericanExpress).unwrap(),
            json!("american_express")
        );
        let brand: CardBrand = serde_json::from_value(json!("diners_club")).unwrap();
        assert_eq!(brand, CardBrand::DinersClub);
    }

    #[test]
    fn every_brand_parses_back() {
        for brand in CardBrand::ALL {
            assert_eq!(brand.to_string().parse::<CardBrand>().unwrap(), brand);
        }
    }

    #[test]
    fn unknown_brand_is_rejected() {
        let err = "amex".parse::<CardBrand>().unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedWireValue {
                type_name: "CardBrand",
                ..
            }
        ));
        assert!(serde_json::from_value::<CardBrand>(json!("VISA")).is_err());
    }
}
