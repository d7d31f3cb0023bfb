//! HTTP middleware: request tagging, session authentication and CSRF
//! protection.

pub mod csrf;
pub mod recovery;
pub mod request_id;
pub mod session;

pub use csrf::{CSRF_COOKIE, CSRF_HEADER, CsrfMiddleware, CsrfToken};
pub use recovery::RecoveryMiddleware;
pub use request_id::{RequestId, RequestIdMiddleware};
pub use session::{AuthContext, Authenticated, SESSION_COOKIE, SessionMiddleware};
