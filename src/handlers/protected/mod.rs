// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Routes here sit behind `jwt_auth_middleware`, so every handler can extract
// `Extension<CurrentUser>`.

pub mod farms;

pub use farms::*;
