//! Textual SVG minification.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{Compressor, ImageKind};
use crate::error::{PipelineError, Result};

static XML_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\?xml[^>]*\?>").expect("valid regex"));
static DOCTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<!DOCTYPE[^>\[]*(\[[^\]]*\])?\s*>").expect("valid regex"));
/// Matches a CDATA section or a comment; CDATA is kept as-is.
static COMMENT_OR_CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>|<!--.*?-->").expect("valid regex")
});
static METADATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<metadata\b[^>]*/>|<metadata\b[^>]*>.*?</metadata>").expect("valid regex")
});
static BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("valid regex"));

/// Removes the XML declaration, doctype, comments and `<metadata>`, and
/// collapses whitespace between tags.
///
/// Whitespace is left alone in documents where it can be significant: text,
/// embedded style or script, CDATA and `xml:space`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgCompressor;

impl Compressor for SvgCompressor {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn accepts(&self, kind: ImageKind) -> bool {
        kind == ImageKind::Svg
    }

    fn compress(&self, path: &Path, bytes: &[u8]) -> Result<Vec<u8>> {
        let source = std::str::from_utf8(bytes).map_err(|e| PipelineError::Image {
            path: path.to_path_buf(),
            message: format!("SVG is not valid UTF-8: {}", e),
        })?;
        Ok(minify_svg(source).into_bytes())
    }
}

const WHITESPACE_SENSITIVE: &[&str] = &["<text", "<style", "<script", "CDATA", "xml:space"];

pub(crate) fn minify_svg(source: &str) -> String {
    let svg = XML_DECLARATION.replace_all(source, "");
    let svg = DOCTYPE.replace_all(&svg, "");
    let svg = COMMENT_OR_CDATA.replace_all(&svg, |caps: &regex::Captures<'_>| {
        let matched = &caps[0];
        if matched.starts_with("<![CDATA[") {
            matched.to_string()
        } else {
            String::new()
        }
    });
    let svg = METADATA.replace_all(&svg, "");
    let svg = if WHITESPACE_SENSITIVE.iter().any(|marker| svg.contains(marker)) {
        svg
    } else {
        BETWEEN_TAGS.replace_all(&svg, "><").into_owned().into()
    };
    svg.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<!-- Generator: Sketch -->
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10">
  <metadata>
    <rdf:RDF></rdf:RDF>
  </metadata>
  <rect width="10" height="10" fill="red"/>
</svg>
"#;

    #[test]
    fn strips_boilerplate_and_whitespace() {
        assert_eq!(
            minify_svg(ICON),
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="red"/></svg>"#
        );
    }

    #[test]
    fn keeps_whitespace_around_text() {
        let svg = "<svg>\n  <text>a</text>\n  <text>b</text>\n</svg>";
        assert_eq!(minify_svg(svg), svg);
    }

    #[test]
    fn keeps_whitespace_in_style_and_script() {
        for svg in [
            "<svg>\n  <style>\n    .a { fill: red; }\n  </style>\n  <rect class=\"a\"/>\n</svg>",
            "<svg>\n  <script>\n    var a = 1;\n  </script>\n  <rect/>\n</svg>",
            "<svg xml:space=\"preserve\">\n  <g> </g>\n  <rect/>\n</svg>",
        ] {
            assert_eq!(minify_svg(svg), svg);
        }
    }

    #[test]
    fn comment_markers_inside_cdata_survive() {
        let svg = "<svg><style><![CDATA[ .a::after { content: \"<!-- x -->\"; } ]]></style><!-- drop --></svg>";
        assert_eq!(
            minify_svg(svg),
            "<svg><style><![CDATA[ .a::after { content: \"<!-- x -->\"; } ]]></style></svg>"
        );
    }

    #[test]
    fn compressor_output_is_smaller() {
        let out = SvgCompressor
            .compress(Path::new("icon.svg"), ICON.as_bytes())
            .unwrap();
        assert!(out.len() < ICON.len());
    }
}
