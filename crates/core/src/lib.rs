pub mod amount;
pub mod date;
pub mod institution;
pub mod slip;

pub use amount::{Amount, InvalidAmount};
pub use date::{SlipDate, InvalidDate};
pub use institution::{InstitutionTag, UnknownInstitution};
pub use slip::SlipResult;
