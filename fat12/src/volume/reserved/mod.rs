mod bpb;

pub use self::bpb::*;
