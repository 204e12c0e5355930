//! End-To-End Package Archive Tests
//!
//! Builds a real ZIP package with a pool, a test, and an embedded
//! equation, then reads the archive back: every registered resource,
//! every asset (with descriptor), the manifest, and the previews must
//! be present, and the test document must reference the pool's
//! resource id.

use std::io::Read;

use quizpack::{
    EquationRenderer, LatexConfig, MultipleChoiceQuestion, NumericQuestion, Package,
    PackageConfig, Pool, PoolOptions, RenderError, RenderedEquation, Test, TestOptions, Tolerance,
};
use tempfile::TempDir;

struct NoopRenderer;

impl EquationRenderer for NoopRenderer {
    fn render(
        &mut self,
        formula: &str,
        _display: bool,
        _options: &LatexConfig,
    ) -> Result<RenderedEquation, RenderError> {
        Ok(RenderedEquation {
            png: formula.as_bytes().to_vec(),
            width_px: 88,
            height_px: 44,
        })
    }
}

fn read_entry(archive: &mut zip::ZipArchive<std::fs::File>, name: &str) -> String {
    let mut file = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing archive entry {}", name));
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

#[test]
fn test_package_archive_layout() {
    let dir = TempDir::new().unwrap();
    let archive_path = dir.path().join("COURSE.zip");

    let mut pkg = Package::create(
        &archive_path,
        PackageConfig::default(),
        Box::new(NoopRenderer),
    )
    .unwrap();

    let mut test = Test::new(&mut pkg, "Midterm", TestOptions::default());

    let mut pool = Pool::new(
        &mut pkg,
        "Mechanics",
        PoolOptions {
            preview: true,
            points_per_question: 5.0,
            questions_per_test: 2,
            ..Default::default()
        },
    );
    pool.add_multiple_choice(
        &mut pkg,
        MultipleChoiceQuestion::new(
            "Units",
            "The SI unit of force, $F = ma$, is?",
            vec!["newton".to_string(), "joule".to_string(), "watt".to_string()],
            0,
        ),
    )
    .unwrap();
    pool.add_numeric(
        &mut pkg,
        NumericQuestion::new("Gravity", "g in m/s^2?", 9.81, Tolerance::Absolute(0.05)),
    )
    .unwrap();
    let handle = pool.close_into(&mut pkg, &mut test).unwrap();
    assert_eq!(handle.resource_id, "res00001");

    let test_resource = test.close(&mut pkg).unwrap();
    assert_eq!(test_resource, "res00002");

    pkg.close().unwrap();

    let file = std::fs::File::open(&archive_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();

    // Registered resources and package fixtures.
    let manifest = read_entry(&mut archive, "imsmanifest.xml");
    assert!(manifest.contains("identifier=\"res00001\""));
    assert!(manifest.contains("bb:title=\"Mechanics\""));
    assert!(manifest.contains("identifier=\"res00002\""));
    assert!(manifest.contains("bb:title=\"Midterm\""));
    assert!(manifest.contains("resource/x-mhhe-course-cx"));

    let pool_doc = read_entry(&mut archive, "res00001.dat");
    assert!(pool_doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(pool_doc.contains("<assessment title=\"Mechanics\">"));
    assert_eq!(pool_doc.matches("<item ").count(), 2);

    // The test section draws from the pool by resource id.
    let test_doc = read_entry(&mut archive, "res00002.dat");
    assert!(test_doc.contains("<sourcebank_ref>res00001</sourcebank_ref>"));
    assert!(test_doc.contains("<selection_number>2</selection_number>"));
    assert!(test_doc.contains("Random Block"));

    // The rendered equation is embedded with its descriptor.
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names
        .iter()
        .any(|n| n.starts_with("csfiles/home_dir/LaTeX") && n.ends_with(".png")));
    assert!(names
        .iter()
        .any(|n| n.starts_with("csfiles/home_dir/LaTeX") && n.ends_with(".png.xml")));

    // Previews.
    assert!(names.contains(&"Mechanics_preview.html".to_string()));
    assert!(names.contains(&"Midterm_preview.html".to_string()));
    assert!(names.contains(&"Midterm_example_preview.html".to_string()));
    assert!(names.contains(&".bb-package-info".to_string()));

    let example = read_entry(&mut archive, "Midterm_example_preview.html");
    assert!(example.contains("[Total test marks 10]"));
}

#[test]
fn test_pool_without_preview_writes_no_preview_entry() {
    let dir = TempDir::new().unwrap();
    let archive_path = dir.path().join("P.zip");

    let mut pkg = Package::create(
        &archive_path,
        PackageConfig::default(),
        Box::new(NoopRenderer),
    )
    .unwrap();
    let mut pool = Pool::new(&mut pkg, "quiet", PoolOptions::default());
    pool.add_numeric(
        &mut pkg,
        NumericQuestion::new("Q", "1+1?", 2.0, Tolerance::Absolute(0.0)),
    )
    .unwrap();
    pool.close(&mut pkg).unwrap();
    pkg.close().unwrap();

    let file = std::fs::File::open(&archive_path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert!(!names.iter().any(|n| n.ends_with("_preview.html")));
}
