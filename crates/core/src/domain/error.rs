// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid order state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    #[error("Product {0} is not in the cart")]
    NotInCart(i64),

    #[error("Amount overflow")]
    AmountOverflow,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
