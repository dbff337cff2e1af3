pub mod audit_logs;
pub mod cart_items;
pub mod carts;
pub mod coupons;
pub mod courses;
pub mod enrollments;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use coupons::Entity as Coupons;
pub use courses::Entity as Courses;
pub use enrollments::Entity as Enrollments;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use users::Entity as Users;
