use std::io::Write;

use quiz2biz::catalog::{active_definitions, CatalogImportError, CatalogImporter};
use quiz2biz::scoring::ScoringEngine;

fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("quiz2biz-{}-{name}", std::process::id()));
    let mut file = std::fs::File::create(&path).expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    path
}

#[test]
fn imported_sheets_feed_the_engine() {
    let dimensions = temp_file(
        "dimensions.csv",
        "key,display_name,weight,order_index,is_active\n\
         arch_sec,Architecture & Security,0.6,1,true\n\
         devops_iac,DevOps & Infrastructure as Code,0.4,2,true\n",
    );
    let questions = temp_file(
        "questions.csv",
        "id,text,dimension_key,severity,coverage,answered,persona\n\
         q1,Is MFA enforced?,arch_sec,0.8,0.5,true,CTO\n\
         q2,Are secrets rotated?,arch_sec,0.6,0.75,true,CTO\n\
         q3,Is infrastructure codified?,devops_iac,,,,\n",
    );

    let entries = CatalogImporter::dimensions_from_path(&dimensions).expect("dimensions import");
    let scored = CatalogImporter::questions_from_path(&questions).expect("questions import");
    let assessment = ScoringEngine::default().assess(&active_definitions(&entries), &scored);

    let expected = 0.6 * (0.55 / 1.4001) + 0.4 * (0.5 / 0.5001);
    assert!((assessment.portfolio_residual - expected).abs() < 1e-12);
    assert_eq!(assessment.next_actions.len(), 3);
    assert_eq!(assessment.next_actions[0].question_id, "q3");

    std::fs::remove_file(dimensions).ok();
    std::fs::remove_file(questions).ok();
}

#[test]
fn missing_file_is_an_io_error() {
    let result = CatalogImporter::dimensions_from_path("/nonexistent/quiz2biz/dimensions.csv");

    assert!(matches!(result, Err(CatalogImportError::Io(_))));
}

#[test]
fn malformed_weight_is_a_csv_error() {
    let csv = "key,display_name,weight\narch_sec,Architecture,heavy\n";

    let result = CatalogImporter::dimensions_from_reader(csv.as_bytes());

    assert!(matches!(result, Err(CatalogImportError::Csv(_))));
}
