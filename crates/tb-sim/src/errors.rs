use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("Simulated network needs at least one tank")]
    Empty,

    #[error("Link {from} -> {to} is out of range for {tanks} tanks")]
    LinkOutOfRange { from: usize, to: usize, tanks: usize },

    #[error("Tank {0} links to itself")]
    SelfLink(usize),

    #[error("False positive rate {0} is not a probability")]
    InvalidRate(f64),
}
