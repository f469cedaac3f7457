// Application Layer - Use Cases and Business Logic

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod maintenance;
pub mod session;
pub mod shutdown;

// Re-exports
pub use account::AccountService;
pub use cart::{BasketItem, CartService};
pub use catalog::CatalogService;
pub use checkout::{CheckoutService, OrderView};
pub use maintenance::MaintenanceScheduler;
pub use session::SessionService;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
