// Domain Layer - Pure business logic and entities

pub mod account;
pub mod cart;
pub mod catalog;
pub mod catalog_query;
pub mod error;
pub mod money;
pub mod order;
pub mod session;

// Re-exports
pub use account::{Profile, ProfileUpdate, User, UserId};
pub use cart::{Cart, CartLine};
pub use catalog::{
    average_rating, Category, CategoryId, Image, NewReview, Product, ProductDetail, ProductId,
    Review, Sale, Specification, Tag, TagId,
};
pub use catalog_query::{CatalogQuery, Page, Predicate, SortDirection, SortKey};
pub use error::DomainError;
pub use money::Money;
pub use order::{
    DeliveryType, NewOrder, Order, OrderDetails, OrderId, OrderLine, OrderStatus, PaymentCard,
    PaymentType,
};
pub use session::{Session, SessionData, SessionId};
