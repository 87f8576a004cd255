//! ZIP archive helper utilities for the `.xlsx` container.
//! Locates parts by name regardless of case and path separator.

use crate::error::ScreenerError;
use crate::helpers::xml::PartReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

/// Helper trait for ZIP archive part lookup
pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Gets a part from the archive by name (case-insensitive, path separator agnostic)
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, ScreenerError>;

    /// Event reader over a part of the archive
    fn part_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<PartReader<BufReader<ZipFile<'_, RS>>>>, ScreenerError>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, ScreenerError> {
        let pattern = name.replace('\\', "/");
        let path = self
            .file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(&file_name.replace('\\', "/")))
            .map(|file_name| file_name.to_owned());
        match path.map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(Some(file)) => Ok(Some(file)),
            Ok(None) | Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error)?,
        }
    }

    fn part_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<PartReader<BufReader<ZipFile<'_, RS>>>>, ScreenerError> {
        let reader = self
            .file(name)?
            .map(|file| PartReader::new(BufReader::new(file)));
        Ok(reader)
    }
}
