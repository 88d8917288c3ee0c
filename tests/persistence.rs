//! Persistence tests: the saved mapping file and its overwrite semantics.

use std::path::Path;

use hpo_lookup::HpoLookup;
use hpo_lookup::config::LookupConfig;

const HP_JSON: &str = r#"[
  {"id": "HP:0001945", "lbl": "Fever", "meta": {"synonyms": [{"val": "Pyrexia"}]}},
  {"id": "HP:0002315", "lbl": "Headache"}
]"#;

fn write_ontology(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("hpo.json");
    std::fs::write(&path, HP_JSON).unwrap();
    path
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn mapping_is_saved_next_to_ontology() {
    let dir = tempfile::TempDir::new().unwrap();
    let lookup = HpoLookup::with_ontology(write_ontology(dir.path())).unwrap();

    lookup.resolve("Pyrexia; headache, cough").unwrap();

    let saved = std::fs::read_to_string(dir.path().join("output_mappings.json")).unwrap();
    assert_eq!(
        saved,
        "{\n  \"pyrexia\": \"HP:0001945\",\n  \"headache\": \"HP:0002315\",\n  \"cough\": \"No mapping found\"\n}"
    );
}

#[test]
fn each_batch_overwrites_the_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let lookup = HpoLookup::with_ontology(write_ontology(dir.path())).unwrap();
    let out = dir.path().join("output_mappings.json");

    lookup.resolve("fever, headache, cough, sneezing").unwrap();
    lookup.resolve("headache").unwrap();

    assert_eq!(read_json(&out), serde_json::json!({"headache": "HP:0002315"}));
}

#[test]
fn custom_output_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let out = dir.path().join("runs").join("latest.json");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();

    let lookup = HpoLookup::new(LookupConfig {
        output_path: Some(out.clone()),
        ..LookupConfig::with_ontology(write_ontology(dir.path()))
    })
    .unwrap();
    lookup.resolve("fever").unwrap();

    assert_eq!(read_json(&out), serde_json::json!({"fever": "HP:0001945"}));
    assert!(!dir.path().join("output_mappings.json").exists());
}

#[test]
fn persistence_can_be_disabled() {
    let dir = tempfile::TempDir::new().unwrap();
    let lookup = HpoLookup::new(LookupConfig {
        persist: false,
        ..LookupConfig::with_ontology(write_ontology(dir.path()))
    })
    .unwrap();

    let mapping = lookup.resolve("fever").unwrap();
    assert_eq!(mapping.len(), 1);
    assert!(!dir.path().join("output_mappings.json").exists());
}

#[test]
fn config_file_drives_lookup() {
    let dir = tempfile::TempDir::new().unwrap();
    let ontology = write_ontology(dir.path());
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "ontology_path = {:?}\npersist = false\n\n[fields]\nlabel = [\"lbl\"]\n",
            ontology.display().to_string()
        ),
    )
    .unwrap();

    let config = LookupConfig::load(&config_path).unwrap();
    let lookup = HpoLookup::new(config).unwrap();
    assert_eq!(lookup.lookup("PYREXIA").unwrap().id(), Some("HP:0001945"));
}
