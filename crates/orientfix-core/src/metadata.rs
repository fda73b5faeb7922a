//! EXIF orientation extraction and metadata carry-over.
//!
//! Reading metadata never fails from the caller's point of view: a missing
//! file, a container without EXIF, or a corrupt EXIF block all come back as
//! `None`, which [`crate::orientation::OrientationCode::parse`] treats the
//! same as "already upright".
//!
//! [`PreservedMetadata`] keeps the EXIF block and ICC profile of a source
//! image so a backend can put them back after re-encoding, with the
//! orientation reset to 1.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};
use img_parts::{Bytes, DynImage, ImageEXIF, ImageICC};
use log::{debug, warn};

const EXIF_PREFIX: &[u8] = b"Exif\0\0";

/// Read the raw EXIF orientation value from encoded image bytes.
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    read_from_container(&mut Cursor::new(bytes))
}

/// Read the raw EXIF orientation value from an image file.
pub fn read_orientation_from_path(path: &Path) -> Option<u32> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!("cannot open {} for EXIF: {}", path.display(), e);
            return None;
        }
    };
    read_from_container(&mut BufReader::new(file))
}

fn read_from_container<R: BufRead + Seek>(reader: &mut R) -> Option<u32> {
    let exif = match Reader::new().read_from_container(reader) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("no readable EXIF: {}", e);
            return None;
        }
    };

    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    field.value.get_uint(0)
}

/// EXIF and ICC data lifted from a source image, ready to be written into
/// its upright re-encoding.
///
/// The EXIF block is stored with its orientation already set to 1 and
/// without the thumbnail IFD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreservedMetadata {
    exif: Option<Bytes>,
    icc: Option<Bytes>,
}

impl PreservedMetadata {
    /// Lift metadata from encoded JPEG or PNG bytes.
    ///
    /// Containers without metadata support (GIF) and unparseable input give
    /// an empty value. An EXIF block that cannot be rewritten is dropped.
    pub fn extract(bytes: &[u8]) -> Self {
        let image = match DynImage::from_bytes(Bytes::copy_from_slice(bytes)) {
            Ok(Some(image)) => image,
            Ok(None) => return Self::default(),
            Err(e) => {
                debug!("cannot parse container for metadata: {}", e);
                return Self::default();
            }
        };

        let exif = image.exif().and_then(|raw| match upright_exif(&raw) {
            Ok(rewritten) => Some(Bytes::from(rewritten)),
            Err(e) => {
                warn!("dropping EXIF block that cannot be rewritten: {}", e);
                None
            }
        });

        Self {
            exif,
            icc: image.icc_profile(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.icc.is_none()
    }

    /// Write the preserved metadata into freshly `encoded` bytes of the same
    /// container format.
    ///
    /// Returns `encoded` unchanged if the container cannot be parsed.
    pub fn apply(&self, encoded: Vec<u8>) -> Vec<u8> {
        if self.is_empty() {
            return encoded;
        }

        let mut image = match DynImage::from_bytes(Bytes::from(encoded.clone())) {
            Ok(Some(image)) => image,
            Ok(None) => return encoded,
            Err(e) => {
                warn!("cannot restore metadata: {}", e);
                return encoded;
            }
        };

        if let Some(exif) = &self.exif {
            image.set_exif(Some(exif.clone()));
        }
        if let Some(icc) = &self.icc {
            image.set_icc_profile(Some(icc.clone()));
        }

        let mut output = Vec::with_capacity(encoded.len());
        match image.encoder().write_to(&mut output) {
            Ok(_) => output,
            Err(e) => {
                warn!("cannot restore metadata: {}", e);
                encoded
            }
        }
    }
}

/// Re-serialize a raw TIFF-structured EXIF block with Orientation = 1.
fn upright_exif(raw: &[u8]) -> Result<Vec<u8>, exif::Error> {
    let raw = raw.strip_prefix(EXIF_PREFIX).unwrap_or(raw);
    let exif = Reader::new().read_raw(raw.to_vec())?;

    let upright = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![1]),
    };

    let mut writer = Writer::new();
    writer.push_field(&upright);
    for field in exif.fields() {
        if field.ifd_num != In::PRIMARY || !is_carried(field) {
            continue;
        }
        writer.push_field(field);
    }

    let mut buffer = Cursor::new(Vec::new());
    writer.write(&mut buffer, exif.little_endian())?;
    Ok(buffer.into_inner())
}

/// Tags the writer lays out itself, and values it cannot encode, are skipped.
fn is_carried(field: &Field) -> bool {
    let layout = matches!(
        field.tag,
        Tag::Orientation
            | Tag::ExifIFDPointer
            | Tag::GPSInfoIFDPointer
            | Tag::InteropIFDPointer
            | Tag::StripOffsets
            | Tag::StripByteCounts
            | Tag::JPEGInterchangeFormat
            | Tag::JPEGInterchangeFormatLength
    );
    !layout && !matches!(field.value, Value::Unknown(..))
}
