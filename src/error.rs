use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("cache is unavailable")]
    Storage,
    #[display("remote is misconfigured")]
    Remote,
    #[display("sync failed")]
    Sync,
    #[display("indexing failed")]
    Index,
    #[display("failed to write output")]
    Output,
}
