pub mod interrupt;
pub mod limit;
pub mod track;
