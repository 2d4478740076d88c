pub mod detail;
pub mod layout;
pub mod lookup;
pub mod snapshot;
pub mod status;
pub mod vacancy;
