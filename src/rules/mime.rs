use std::fmt;

use crate::build::RuleEntry;
use crate::nodes::FileNode;

/// Accumulated `mimetypes` constraint; duplicates are dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeTypeSet {
    types: Vec<String>,
}

impl MimeTypeSet {
    pub fn allow(&mut self, mime_type: impl Into<String>) {
        let mime_type = mime_type.into();
        if !self.types.contains(&mime_type) {
            self.types.push(mime_type);
        }
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Display for MimeTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mimetypes:{}", self.types.join(","))
    }
}

/// Builder for the allowed MIME types of a file node
///
/// The top-level type methods take subtypes: `image(["png", "jpeg"])` allows
/// `image/png` and `image/jpeg`.
pub struct MimeTypes<P> {
    file: FileNode<P>,
    slot: usize,
}

impl<P: Clone> MimeTypes<P> {
    pub(crate) fn new(file: FileNode<P>, slot: usize) -> Self {
        Self { file, slot }
    }

    /// Allow one full MIME type, stored exactly as given
    pub fn allow(self, mime_type: &str) -> Self {
        let mime_type = mime_type.to_string();
        self.file.edit_rule(self.slot, |entry| {
            if let RuleEntry::MimeTypes(set) = entry {
                set.allow(mime_type);
            }
        });
        self
    }

    fn family<I, S>(mut self, top_level: &str, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for subtype in subtypes {
            self = self.allow(&format!("{}/{}", top_level, subtype.as_ref()));
        }
        self
    }

    pub fn text<I, S>(self, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.family("text", subtypes)
    }

    pub fn image<I, S>(self, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.family("image", subtypes)
    }

    pub fn audio<I, S>(self, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.family("audio", subtypes)
    }

    pub fn video<I, S>(self, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.family("video", subtypes)
    }

    pub fn application<I, S>(self, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.family("application", subtypes)
    }

    pub fn multipart<I, S>(self, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.family("multipart", subtypes)
    }

    pub fn message<I, S>(self, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.family("message", subtypes)
    }

    pub fn pdf(self) -> Self {
        self.allow("application/pdf")
    }

    pub fn json(self) -> Self {
        self.allow("application/json")
    }

    pub fn end(self) -> FileNode<P> {
        self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_set_deduplicates() {
        let mut set = MimeTypeSet::default();
        set.allow("image/png");
        set.allow("image/png");
        set.allow("application/pdf");
        assert_eq!(set.to_string(), "mimetypes:image/png,application/pdf");
    }

    #[test]
    fn test_builder() {
        let root = crate::create();
        let upload = root
            .file("upload")
            .unwrap()
            .mime_type()
            .image(["jpeg", "png"])
            .text(vec!["plain".to_string()])
            .pdf()
            .allow("image/png")
            .allow("IMAGE/PNG")
            .end();
        assert_eq!(
            upload.rule_tokens().unwrap(),
            vec!["mimetypes:image/jpeg,image/png,text/plain,application/pdf,IMAGE/PNG"]
        );
    }
}
