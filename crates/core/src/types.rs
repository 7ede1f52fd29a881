//! Wire types shared by the admin, factory and scan APIs.

mod admin;
mod auth;
mod batch;
mod merkle;
mod scan;

pub use admin::*;
pub use auth::*;
pub use batch::*;
pub use merkle::*;
pub use scan::*;
