pub mod authorizer;
pub mod claims;
pub mod factory;
pub mod oidc;
pub mod policy;
pub mod token;
pub mod verifier;

pub use authorizer::{Authorizer, DenyReason};
pub use factory::build_authorizer;
pub use policy::{AuthorizerEvent, AuthorizerResponse, Effect};
