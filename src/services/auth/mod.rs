pub mod authorizer;
pub mod claims;
pub mod clock;
pub mod error;
pub mod factory;
pub mod role;
pub mod token_service;

pub use authorizer::{Authorizer, bearer_token};
pub use claims::{IdentityClaims, Subject, TokenKind, TokenPair};
pub use clock::{Clock, SystemClock};
pub use error::{AuthError, TokenError};
pub use factory::build_token_service;
pub use role::Role;
pub use token_service::{TokenConfig, TokenService};
