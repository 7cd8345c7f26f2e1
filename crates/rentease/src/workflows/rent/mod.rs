pub mod domain;
pub mod policy;
pub mod repository;
pub mod router;
pub mod schedule;
pub mod service;

pub use domain::{
    DashboardStats, Lease, LeaseId, PaymentDue, PaymentId, PaymentStatus, Property, PropertyId,
};
pub use router::rent_router;
pub use service::{RentService, RentServiceError};
