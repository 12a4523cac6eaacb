//! Core types shared by the credential and prompt halves of the crate.

mod provider;
mod credential;
mod card;

pub use provider::Provider;
pub use credential::{KeyOrigin, ProviderCredentialRecord, ResolvedCredentialSet};
pub use card::{CardDraw, CardInstruction, Orientation};
