//! Clients for the external services the runner talks to

pub mod notifier;
pub mod registration;
pub mod verifier;

pub use notifier::{BatchNotice, NoticeKind, Notifier};
pub use registration::{OrderSink, RegistrationApi, SerialNumbers};
pub use verifier::{HttpVerifier, VerifierClient, VerifyError};
