use std::io::{Read, Seek};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::XlsxError;

/// Read a part's bytes, or `None` if the archive has no such entry.
pub(crate) fn read_part_optional<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, XlsxError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Read a part's bytes, failing with [`XlsxError::MissingPart`] if absent.
pub(crate) fn read_part_required<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, XlsxError> {
    read_part_optional(archive, name)?.ok_or_else(|| XlsxError::MissingPart(name.to_string()))
}
