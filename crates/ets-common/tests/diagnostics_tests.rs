use super::*;

fn template(code: u32) -> &'static str {
    lookup(code).map_or("", |m| m.message)
}

#[test]
fn placeholders_are_filled_by_position() {
    let text = format_message(template(diagnostic_codes::MISSING_OVERRIDE), &["B", "foo", "()", "A"]);
    assert_eq!(text, "B is not abstract and does not override abstract method foo() in A");
}

#[test]
fn unmatched_placeholders_survive() {
    assert_eq!(format_message("{0} and {1}", &["x"]), "x and {1}");
    assert_eq!(format_message("{name} {0}", &["x"]), "{name} x");
    assert_eq!(format_message("open {", &[]), "open {");
    assert_eq!(format_message("{1}{0}", &["a", "b"]), "ba");
}

#[test]
fn message_table_has_unique_codes() {
    let mut codes: Vec<u32> = DIAGNOSTIC_MESSAGES.iter().map(|m| m.code).collect();
    let total = codes.len();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), total, "duplicate diagnostic code in table");
}

#[test]
fn shadowing_is_reported_as_warning() {
    assert_eq!(
        lookup(diagnostic_codes::EXTENSION_SHADOWED).map(|m| m.category),
        Some(DiagnosticCategory::Warning)
    );
    assert_eq!(
        lookup(diagnostic_codes::REPEATED_INTERFACE).map(|m| m.category),
        Some(DiagnosticCategory::Error)
    );
    assert!(lookup(1).is_none());
}

#[test]
fn synthetic_spans_have_no_length() {
    let diag = Diagnostic::new(DiagnosticCategory::Error, 1, "main.ets", Span::SYNTHETIC, String::new())
        .with_related(Span::new(4, 9), "declared here");
    assert_eq!(diag.length, 0);
    assert_eq!(diag.related[0].length, 5);
}

#[test]
fn serialized_shape() {
    let diag = Diagnostic::new(
        DiagnosticCategory::Error,
        diagnostic_codes::REPEATED_INTERFACE,
        "main.ets",
        Span::new(10, 13),
        "Repeated interface.".to_string(),
    );
    let json = serde_json::to_value(&diag).expect("diagnostic should serialize");
    assert_eq!(json["code"], 2108);
    assert_eq!(json["length"], 3);
    assert_eq!(json["category"], "Error");
    assert_eq!(json["messageText"], "Repeated interface.");
    assert!(json.get("related").is_none());

    let json = serde_json::to_value(diag.with_related(Span::new(0, 1), "first listed here"))
        .expect("diagnostic should serialize");
    assert_eq!(json["related"][0]["messageText"], "first listed here");
}
