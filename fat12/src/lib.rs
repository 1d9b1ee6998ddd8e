mod cluster;
mod control;
mod error;
mod util;
pub mod volume;

pub use self::{
    cluster::{ClusterEntry, ClusterStatus},
    control::Volume,
    error::{Error, Result},
    util::{decode_text, encode_text},
};
