//! Generated wire types and service stubs for `roster.v1`.

#[allow(clippy::pedantic)]
#[allow(clippy::nursery)]
#[allow(clippy::all)]
mod protocol {
    tonic::include_proto!("roster.v1");
}

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("roster_descriptor");

pub use protocol::*;
