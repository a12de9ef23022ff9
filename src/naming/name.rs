//! Parsing of uploaded file names into key components.

/// Longest base kept from a schema base name or uploaded file stem
pub const MAX_BASE_LEN: usize = 64;

/// Longest extension kept from an uploaded file name
pub const MAX_EXTENSION_LEN: usize = 16;

/// Components a storage key is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    /// Key prefix, without trailing slash
    pub namespace: Option<String>,
    pub base: String,
    pub extension: Option<String>,
}

impl KeyTemplate {
    /// Build a template for an upload.
    ///
    /// `base_name` is the per-type logical name; when absent the stem of
    /// the uploaded file name is used instead.
    pub fn for_upload(namespace: Option<&str>, base_name: Option<&str>, original_name: &str) -> Self {
        let (stem, extension) = split_file_name(original_name);
        let base = match base_name {
            Some(name) if !name.trim().is_empty() => sanitize(name),
            _ => sanitize(stem),
        };
        Self {
            namespace: namespace
                .map(|ns| ns.trim_matches('/').to_string())
                .filter(|ns| !ns.is_empty()),
            base: if base.is_empty() { "asset".to_string() } else { base },
            extension: extension
                .map(|ext| {
                    ext.chars()
                        .filter(|c| c.is_ascii_alphanumeric())
                        .take(MAX_EXTENSION_LEN)
                        .collect::<String>()
                })
                .filter(|ext| !ext.is_empty()),
        }
    }

    /// Render `{namespace}/{base}-{stamp}.{ext}`
    pub fn render(&self, stamp: &str) -> String {
        let mut key = String::with_capacity(self.base.len() + stamp.len() + 16);
        if let Some(ns) = &self.namespace {
            key.push_str(ns);
            key.push('/');
        }
        key.push_str(&self.base);
        key.push('-');
        key.push_str(stamp);
        if let Some(ext) = &self.extension {
            key.push('.');
            key.push_str(ext);
        }
        key
    }
}

/// Split a file name (possibly carrying a path) into stem and extension.
pub fn split_file_name(name: &str) -> (&str, Option<&str>) {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, Some(ext)),
        Some((stem, _)) => (stem, None),
        None => (file, None),
    }
}

/// Sanitized bases are ASCII, so this is also a byte length.
fn sanitize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(MAX_BASE_LEN)
        .collect()
}
