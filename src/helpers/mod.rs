//! Low-level helpers shared by the workbook readers.
pub(crate) mod xml;
pub(crate) mod zip;
