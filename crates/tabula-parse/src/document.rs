//! Document access on top of [`lopdf`].
//!
//! Opens a PDF, enforces the password contract before any page is
//! touched, and exposes the per-page metadata and content the
//! interpreter consumes: media box, crop box, rotation, content-stream
//! operations, and the resource dictionary.

use lopdf::content::{Content, Operation};
use tracing::debug;

use crate::error::BackendError;

/// A parsed PDF document with page ids cached in page order.
pub struct PdfDocument {
    inner: lopdf::Document,
    page_ids: Vec<lopdf::ObjectId>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("pages", &self.page_ids.len())
            .finish()
    }
}

impl PdfDocument {
    /// Open a document from bytes.
    ///
    /// Encrypted documents are decrypted with `password`; a missing or
    /// wrong password fails with [`BackendError::PasswordRequired`]
    /// before any page is accessed.
    pub fn open_bytes(bytes: &[u8], password: Option<&str>) -> Result<Self, BackendError> {
        let mut inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        if inner.is_encrypted() {
            let password = password.ok_or(BackendError::PasswordRequired)?;
            inner
                .decrypt(password)
                .map_err(|_| BackendError::PasswordRequired)?;
        }

        // get_pages returns a BTreeMap with 1-based keys, in page order
        let page_ids: Vec<lopdf::ObjectId> = inner.get_pages().values().copied().collect();
        debug!(pages = page_ids.len(), "opened PDF document");

        Ok(Self { inner, page_ids })
    }

    /// Open a document from a file path.
    pub fn open(
        path: impl AsRef<std::path::Path>,
        password: Option<&str>,
    ) -> Result<Self, BackendError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::open_bytes(&bytes, password)
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_id(&self, index: usize) -> Result<lopdf::ObjectId, BackendError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or_else(|| {
                BackendError::Argument(format!(
                    "page index {index} out of range (document has {} pages)",
                    self.page_ids.len()
                ))
            })
    }

    fn page_dict(&self, index: usize) -> Result<&lopdf::Dictionary, BackendError> {
        let id = self.page_id(index)?;
        self.inner
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))
    }

    /// Media box `[llx, lly, urx, ury]`, inherited through /Parent when
    /// absent on the page itself.
    pub fn media_box(&self, index: usize) -> Result<[f64; 4], BackendError> {
        let id = self.page_id(index)?;
        let obj = self
            .resolve_inherited(id, b"MediaBox")?
            .ok_or_else(|| BackendError::Parse("MediaBox not found on page or ancestors".into()))?;
        self.box_array(obj)
    }

    /// Crop box, when present on the page.
    pub fn crop_box(&self, index: usize) -> Result<Option<[f64; 4]>, BackendError> {
        let dict = self.page_dict(index)?;
        match dict.get(b"CropBox") {
            Ok(obj) => Ok(Some(self.box_array(obj)?)),
            Err(_) => Ok(None),
        }
    }

    /// Page rotation in degrees, normalized to 0/90/180/270.
    pub fn rotation(&self, index: usize) -> Result<i32, BackendError> {
        let id = self.page_id(index)?;
        match self.resolve_inherited(id, b"Rotate")? {
            Some(obj) => {
                let degrees = obj
                    .as_i64()
                    .map_err(|e| BackendError::Parse(format!("Rotate is not an integer: {e}")))?;
                Ok((degrees as i32).rem_euclid(360) / 90 * 90)
            }
            None => Ok(0),
        }
    }

    /// Decoded content-stream operations for the page.
    pub fn content_operations(&self, index: usize) -> Result<Vec<Operation>, BackendError> {
        let dict = self.page_dict(index)?;
        let bytes = self.content_bytes(dict)?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        let content = Content::decode(&bytes)
            .map_err(|e| BackendError::Parse(format!("failed to decode content stream: {e}")))?;
        Ok(content.operations)
    }

    /// Resource dictionary for the page (inherited when absent); `None`
    /// when the page has no resources at all.
    pub fn resources(&self, index: usize) -> Result<Option<&lopdf::Dictionary>, BackendError> {
        let id = self.page_id(index)?;
        match self.resolve_inherited(id, b"Resources")? {
            Some(obj) => {
                let obj = match obj {
                    lopdf::Object::Reference(id) => self.inner.get_object(*id).map_err(|e| {
                        BackendError::Parse(format!("failed to resolve /Resources: {e}"))
                    })?,
                    other => other,
                };
                obj.as_dict().map(Some).map_err(|_| {
                    BackendError::Parse("/Resources is not a dictionary".to_string())
                })
            }
            None => Ok(None),
        }
    }

    /// Resolve an object, following one level of indirection.
    pub fn resolve<'a>(&'a self, obj: &'a lopdf::Object) -> Result<&'a lopdf::Object, BackendError> {
        match obj {
            lopdf::Object::Reference(id) => self
                .inner
                .get_object(*id)
                .map_err(|e| BackendError::Parse(format!("failed to resolve reference: {e}"))),
            other => Ok(other),
        }
    }

    /// Walk /Parent links to find an inheritable page attribute.
    fn resolve_inherited(
        &self,
        page_id: lopdf::ObjectId,
        key: &[u8],
    ) -> Result<Option<&lopdf::Object>, BackendError> {
        let mut current_id = page_id;
        loop {
            let dict = self
                .inner
                .get_object(current_id)
                .and_then(|o| o.as_dict())
                .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

            if let Ok(value) = dict.get(key) {
                return Ok(Some(value));
            }

            match dict.get(b"Parent") {
                Ok(parent) => {
                    current_id = parent.as_reference().map_err(|e| {
                        BackendError::Parse(format!("invalid /Parent reference: {e}"))
                    })?;
                }
                Err(_) => return Ok(None),
            }
        }
    }

    fn content_bytes(&self, page_dict: &lopdf::Dictionary) -> Result<Vec<u8>, BackendError> {
        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => obj,
            Err(_) => return Ok(Vec::new()), // page with no content
        };

        match contents {
            lopdf::Object::Reference(id) => self.stream_bytes(*id),
            lopdf::Object::Array(items) => {
                let mut out = Vec::new();
                for item in items {
                    let id = item.as_reference().map_err(|e| {
                        BackendError::Parse(format!("/Contents item is not a reference: {e}"))
                    })?;
                    out.extend(self.stream_bytes(id)?);
                    out.push(b'\n');
                }
                Ok(out)
            }
            other => Err(BackendError::Parse(format!(
                "/Contents has unexpected type: {other:?}"
            ))),
        }
    }

    fn stream_bytes(&self, id: lopdf::ObjectId) -> Result<Vec<u8>, BackendError> {
        let stream = self
            .inner
            .get_object(id)
            .and_then(|o| o.as_stream())
            .map_err(|e| BackendError::Parse(format!("/Contents is not a stream: {e}")))?;
        stream
            .decompressed_content()
            .or_else(|_| Ok(stream.content.clone()))
    }

    fn box_array(&self, obj: &lopdf::Object) -> Result<[f64; 4], BackendError> {
        let obj = self.resolve(obj)?;
        let array = obj
            .as_array()
            .map_err(|e| BackendError::Parse(format!("box is not an array: {e}")))?;
        if array.len() != 4 {
            return Err(BackendError::Parse(format!(
                "box has {} entries, expected 4",
                array.len()
            )));
        }
        let mut out = [0.0; 4];
        for (slot, item) in out.iter_mut().zip(array) {
            *slot = object_to_f64(self.resolve(item)?)?;
        }
        Ok(out)
    }
}

/// Numeric object to f64, accepting integers and reals.
pub(crate) fn object_to_f64(obj: &lopdf::Object) -> Result<f64, BackendError> {
    match obj {
        lopdf::Object::Integer(i) => Ok(*i as f64),
        lopdf::Object::Real(f) => Ok(*f as f64),
        other => Err(BackendError::Parse(format!(
            "expected number, found {other:?}"
        ))),
    }
}
