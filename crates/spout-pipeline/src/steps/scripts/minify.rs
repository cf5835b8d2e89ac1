//! Compression and name mangling.

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};

use super::parse_program;

/// Minify a script with the default compress and mangle settings.
///
/// Top-level names are kept: the input is a classic script whose globals may
/// be used by other scripts on the page.
pub fn minify_script(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let mut program = parse_program(&allocator, source)?;

    let ret = Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);

    Ok(Codegen::new()
        .with_options(CodegenOptions::minify())
        .with_scoping(ret.scoping)
        .build(&program)
        .code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_smaller_and_reparses() {
        let source = r#"
            // greeting helper
            function greet(name) {
                var message = "Hello, " + name;
                console.log(message);
                return message;
            }
            greet("world");
        "#;
        let minified = minify_script(source).unwrap();
        assert!(minified.len() < source.len());
        assert!(!minified.contains("greeting helper"));
        assert!(minified.contains("greet"));

        assert!(minify_script(&minified).is_ok());
    }

    #[test]
    fn invalid_script_is_an_error() {
        assert!(minify_script("var = ;").is_err());
    }
}
