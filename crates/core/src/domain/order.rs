// Order Domain Model

use serde::{Deserialize, Serialize};

use super::account::UserId;
use super::catalog::ProductId;
use super::error::{DomainError, Result};
use super::money::Money;

pub type OrderId = i64;

/// Express delivery surcharge
pub const EXPRESS_DELIVERY_COST: Money = Money::from_units(50);
/// Ordinary delivery is charged below this goods total
pub const FREE_DELIVERY_THRESHOLD: Money = Money::from_units(200);
pub const ORDINARY_DELIVERY_COST: Money = Money::from_units(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Accepted,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created" => Some(OrderStatus::Created),
            "accepted" => Some(OrderStatus::Accepted),
            "paid" => Some(OrderStatus::Paid),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Ordinary,
    Express,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Ordinary => "ordinary",
            DeliveryType::Express => "express",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ordinary" => Some(DeliveryType::Ordinary),
            "express" => Some(DeliveryType::Express),
            _ => None,
        }
    }

    /// Delivery charge for a given goods total
    pub fn surcharge(&self, goods_total: Money) -> Money {
        match self {
            DeliveryType::Express => EXPRESS_DELIVERY_COST,
            DeliveryType::Ordinary if goods_total < FREE_DELIVERY_THRESHOLD => {
                ORDINARY_DELIVERY_COST
            }
            DeliveryType::Ordinary => Money::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Online,
    Someone,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Online => "online",
            PaymentType::Someone => "someone",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "online" => Some(PaymentType::Online),
            "someone" => Some(PaymentType::Someone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub count: u32,
    pub price: Money,
}

/// Contact and delivery details supplied at confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub delivery_type: DeliveryType,
    pub payment_type: PaymentType,
    pub city: String,
    pub address: String,
}

/// Order header as first written at checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub created_at: i64,
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub total_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: i64, // epoch ms
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub delivery_type: Option<DeliveryType>,
    pub payment_type: Option<PaymentType>,
    pub total_cost: Money,
    pub status: OrderStatus,
    pub city: Option<String>,
    pub address: Option<String>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn goods_total(&self) -> Result<Money> {
        self.lines.iter().try_fold(Money::ZERO, |acc, line| {
            acc.checked_add(line.price.checked_mul(line.count)?)
        })
    }

    pub fn count_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.count)
    }

    /// Created -> Accepted, applying the delivery surcharge once
    pub fn confirm(&mut self, details: OrderDetails) -> Result<()> {
        if self.status != OrderStatus::Created {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: OrderStatus::Accepted.to_string(),
            });
        }
        let goods = self.goods_total()?;
        self.total_cost = goods.checked_add(details.delivery_type.surcharge(goods))?;

        self.full_name = details.full_name;
        self.email = details.email;
        self.phone = details.phone;
        self.delivery_type = Some(details.delivery_type);
        self.payment_type = Some(details.payment_type);
        self.city = Some(details.city);
        self.address = Some(details.address);
        self.status = OrderStatus::Accepted;
        Ok(())
    }

    /// Accepted -> Paid
    pub fn mark_paid(&mut self) -> Result<()> {
        if self.status != OrderStatus::Accepted {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: OrderStatus::Paid.to_string(),
            });
        }
        self.status = OrderStatus::Paid;
        Ok(())
    }
}

/// Card data submitted to the payment endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCard {
    pub number: String,
    pub name: String,
    pub month: String,
    pub year: String,
    pub code: String,
}

impl PaymentCard {
    pub fn validate(&self) -> Result<()> {
        let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

        if !digits(&self.number) || !(8..=19).contains(&self.number.len()) {
            return Err(DomainError::ValidationError(
                "Card number must be 8 to 19 digits".to_string(),
            ));
        }
        if !digits(&self.code) || self.code.len() != 3 {
            return Err(DomainError::ValidationError(
                "Card code must be 3 digits".to_string(),
            ));
        }
        match self.month.parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => {}
            _ => {
                return Err(DomainError::ValidationError(
                    "Card month must be between 1 and 12".to_string(),
                ))
            }
        }
        if !digits(&self.year) || !matches!(self.year.len(), 2 | 4) {
            return Err(DomainError::ValidationError(
                "Card year must be 2 or 4 digits".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(lines: Vec<OrderLine>) -> Order {
        let total_cost = lines
            .iter()
            .map(|l| l.price.checked_mul(l.count).unwrap())
            .sum();
        Order {
            id: 1,
            created_at: 1000,
            user_id: 1,
            full_name: "Ann".into(),
            email: "ann@example.com".into(),
            phone: String::new(),
            delivery_type: None,
            payment_type: None,
            total_cost,
            status: OrderStatus::Created,
            city: None,
            address: None,
            lines,
        }
    }

    fn details(delivery_type: DeliveryType) -> OrderDetails {
        OrderDetails {
            full_name: "Ann Lee".into(),
            email: "ann@example.com".into(),
            phone: "+100".into(),
            delivery_type,
            payment_type: PaymentType::Online,
            city: "Moscow".into(),
            address: "Red sq. 1".into(),
        }
    }

    fn line(product_id: i64, count: u32, units: i64) -> OrderLine {
        OrderLine {
            product_id,
            count,
            price: Money::from_units(units),
        }
    }

    #[test]
    fn test_ordinary_delivery_below_threshold_is_charged() {
        let mut o = order(vec![line(1, 1, 150)]);
        o.confirm(details(DeliveryType::Ordinary)).unwrap();
        assert_eq!(o.total_cost, Money::from_units(170));
        assert_eq!(o.status, OrderStatus::Accepted);
        assert_eq!(o.city.as_deref(), Some("Moscow"));
    }

    #[test]
    fn test_ordinary_delivery_at_threshold_is_free() {
        let mut o = order(vec![line(1, 2, 100)]);
        o.confirm(details(DeliveryType::Ordinary)).unwrap();
        assert_eq!(o.total_cost, Money::from_units(200));
    }

    #[test]
    fn test_express_always_charged() {
        let mut o = order(vec![line(1, 3, 100)]);
        o.confirm(details(DeliveryType::Express)).unwrap();
        assert_eq!(o.total_cost, Money::from_units(350));
    }

    #[test]
    fn test_confirm_twice_rejected() {
        let mut o = order(vec![line(1, 1, 10)]);
        o.confirm(details(DeliveryType::Express)).unwrap();
        let err = o.confirm(details(DeliveryType::Express)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
        assert_eq!(o.total_cost, Money::from_units(60));
    }

    #[test]
    fn test_payment_requires_accepted() {
        let mut o = order(vec![line(1, 1, 10)]);
        assert!(o.mark_paid().is_err());
        o.confirm(details(DeliveryType::Ordinary)).unwrap();
        o.mark_paid().unwrap();
        assert_eq!(o.status, OrderStatus::Paid);
        assert!(o.mark_paid().is_err());
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [OrderStatus::Created, OrderStatus::Accepted, OrderStatus::Paid] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("Оплачен"), None);
    }

    #[test]
    fn test_card_validation() {
        let mut card = PaymentCard {
            number: "12345678".into(),
            name: "ANN LEE".into(),
            month: "02".into(),
            year: "2030".into(),
            code: "123".into(),
        };
        assert!(card.validate().is_ok());

        card.number = "1234 5678".into();
        assert!(card.validate().is_err());

        card.number = "12345678".into();
        card.month = "13".into();
        assert!(card.validate().is_err());

        card.month = "12".into();
        card.code = "12".into();
        assert!(card.validate().is_err());
    }
}
