use super::*;
use std::io::Write;

#[test]
fn defaults_report_everything_and_allow_js() {
    let options = CheckerOptions::default();
    assert!(options.report_all_missing_overrides);
    assert!(options.warn_extension_shadowing);
    assert!(options.allows_dynamic_language(Language::Js));
    assert!(!options.allows_dynamic_language(Language::Ts));
    assert_eq!(options.max_constructor_chain_depth, MAX_CONSTRUCTOR_CHAIN_DEPTH);
}

#[test]
fn camel_case_keys_override_only_what_they_name() {
    let options = CheckerOptions::from_json_str(
        r#"{
            "compilerOptions": {
                "reportAllMissingOverrides": false,
                "dynamicLanguages": ["js", "ts"]
            }
        }"#,
    )
    .expect("valid config");
    assert!(!options.report_all_missing_overrides);
    assert!(options.allows_dynamic_language(Language::Ts));
    assert!(options.warn_extension_shadowing);
    assert_eq!(options.max_constructor_chain_depth, MAX_CONSTRUCTOR_CHAIN_DEPTH);
}

#[test]
fn missing_compiler_options_fall_back_to_defaults() {
    let options = CheckerOptions::from_json_str(r#"{ "include": ["src"] }"#).expect("valid config");
    assert_eq!(options, CheckerOptions::default());
}

#[test]
fn loads_from_a_config_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, r#"{{ "compilerOptions": {{ "maxConstructorChainDepth": 8 }} }}"#).expect("write");
    let options = CheckerOptions::from_config_file(file.path()).expect("loads");
    assert_eq!(options.max_constructor_chain_depth, 8);
}

#[test]
fn malformed_json_names_the_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "{{ not json").expect("write");
    let err = CheckerOptions::from_config_file(file.path()).expect_err("malformed");
    let text = format!("{err:#}");
    assert!(text.contains("failed to load arktsconfig"), "{text}");
    assert!(text.contains("failed to parse arktsconfig JSON"), "{text}");
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = CheckerOptions::from_config_file(&dir.path().join("arktsconfig.json")).expect_err("missing");
    assert!(format!("{err:#}").contains("failed to read arktsconfig"));
}
