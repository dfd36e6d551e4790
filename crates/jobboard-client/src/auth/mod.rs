mod store;

pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, AUTH_TOKEN_KEY};
