// Social networking: the shared catalogue of services and the per-user
// profile links that point at them.

pub mod links;
pub mod services;
