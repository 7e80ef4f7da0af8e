pub mod cbor;
pub mod tlc;
pub mod yaml;
