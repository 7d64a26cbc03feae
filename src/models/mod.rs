pub mod location;
pub mod service_request;
pub mod timestamp;
pub mod user;

pub use location::{AddressType, Coordinates, Location, LocationAddress};
pub use service_request::{AddressSnapshot, RequestStatus, ServiceRequest, SnapshotCoordinates};
pub use user::{PublicUser, Role, User};
