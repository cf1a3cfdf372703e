use std::{env, fs, path::Path};

const FIXTURE_DIR: &str = "src/fixtures";

/// Generates a `fixtures` test module with one test per `*.md` file in
/// src/fixtures/. Every fixture must have an `.html` file with the same stem
/// holding the expected output.
fn main() {
    let mut stems: Vec<String> = fs::read_dir(FIXTURE_DIR)
        .unwrap()
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .map(|path| {
            assert!(
                path.with_extension("html").exists(),
                "fixture {} has no expected .html output",
                path.display()
            );
            path.file_stem().unwrap().to_string_lossy().into_owned()
        })
        .collect();
    stems.sort();

    let tests: String = stems
        .iter()
        .map(|stem| {
            format!("    #[test]\n    fn {stem}() {{\n        fixture_test(\"{stem}\");\n    }}\n")
        })
        .collect();
    let code = format!("mod fixtures {{\n    use super::fixture_test;\n\n{tests}}}\n");

    let dest = Path::new(&env::var("OUT_DIR").unwrap()).join("fixture_tests.rs");
    fs::write(dest, code).unwrap();

    println!("cargo::rerun-if-changed={FIXTURE_DIR}");
}
