//! Extension to content type table.

/// Content type used when the extension is not in the table.
pub const DEFAULT_MIME: &str = "text/html";

const TABLE: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("js", "text/js"),
    ("ico", "image/x-icon"),
    ("png", "image/png"),
    ("jpg", "image/jpg"),
    ("jpeg", "image/jpeg"),
    ("svg", "image/svg+xml"),
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
    ("ttf", "application/x-font-ttf"),
    ("otf", "application/x-font-opentype"),
    ("woff", "application/font-woff"),
    ("woff2", "application/font-woff2"),
    ("eot", "application/vnd.ms-fontobject"),
    ("sfnt", "application/font-sfnt"),
];

/// Content type for a request path, judged by its `.<ext>` suffix.
pub fn mime_for(uri: &str) -> &'static str {
    let name = uri.rsplit('/').next().unwrap_or(uri);
    let Some((_, ext)) = name.rsplit_once('.') else {
        return DEFAULT_MIME;
    };
    TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map_or(DEFAULT_MIME, |(_, mime)| mime)
}
