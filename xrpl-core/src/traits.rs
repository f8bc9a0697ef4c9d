pub use autofill::Autofill;
pub use codec::BinaryCodec;
pub use connection::Connection;
pub use provider::XrplProvider;
pub use wallet::Wallet;

mod autofill;
mod codec;
mod connection;
mod provider;
mod wallet;
