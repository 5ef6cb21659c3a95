//! Business services between the HTTP/bot surfaces and the data layer.

pub mod documentation;
pub mod icons;
pub mod resolver;
pub mod rotation;
pub mod session;
pub mod status;
pub mod store_supervisor;
