//! Schedule grid interpreter: turns roster worksheet snapshots into section
//! vacancy counts and per-person assignments. Pure functions over an
//! immutable [`Grid`]; all I/O lives in the command layer.

mod aggregate;
mod assignments;
mod block;
mod grid;
mod header;
mod layout;
mod slot;
mod types;

pub use aggregate::{DocumentVacancy, VacancyCell, VacancyReport, section_detail, vacancy_table};
pub use assignments::{AssignmentRecord, ScheduleBucket, group_schedule, lookup_person};
pub use block::BlockResult;
pub use grid::{CellAddress, Grid, GridSet};
pub use layout::SectionLocator;
pub use types::{Language, Role, Tally};
