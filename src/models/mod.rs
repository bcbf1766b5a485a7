// Domain models: fleet identity, role capacity, unified metric record, customers

mod customer;
mod fleet;
mod metric;

pub use customer::{
    CspKind, Customer, LoadProfile, ResourceSpec, customers_from_str, load_customers,
    mock_customers,
};
pub use fleet::{Role, RoleProfile, ServerIdentity};
pub use metric::Metric;
