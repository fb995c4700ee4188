pub mod error;
pub mod factory;
pub mod protected_routes;
pub mod token;

pub use error::AuthError;
pub use factory::build_token_service;
pub use protected_routes::ProtectedRoutes;
pub use token::{Claims, IssuedTokenPair, SubjectType, TokenService};
