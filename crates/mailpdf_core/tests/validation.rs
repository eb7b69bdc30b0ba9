use mailpdf_core::{
    structural_issues, validate_config, Bundle, ConfigDraft, ErrorCode, Field, IssueKind, Locale,
    ProcessingConfig, Severity, WizardSettings,
};
use pretty_assertions::assert_eq;

fn draft(count: Option<i64>, base: &str, dir: &str) -> ConfigDraft {
    ConfigDraft {
        file_path: "C:\\mail\\archive.pst".to_string(),
        messages_per_document: count,
        base_name: base.to_string(),
        output_directory: dir.to_string(),
    }
}

#[test]
fn complete_draft_validates() {
    let bundle = Bundle::for_locale(Locale::En);
    let config = validate_config(
        &bundle,
        &WizardSettings::default(),
        &draft(Some(10), "emails_archiv", "/out"),
    )
    .expect("valid draft");

    assert_eq!(
        config,
        ProcessingConfig {
            file_path: "C:\\mail\\archive.pst".to_string(),
            messages_per_document: 10,
            base_name: "emails_archiv".to_string(),
            output_directory: "/out".to_string(),
        }
    );
    assert!(config.is_complete());
}

#[test]
fn absent_count_uses_default() {
    let bundle = Bundle::for_locale(Locale::En);
    let config = validate_config(&bundle, &WizardSettings::default(), &draft(None, "a", "/out"))
        .expect("valid draft");
    assert_eq!(config.messages_per_document, 10);
}

#[test]
fn count_bounds_are_inclusive() {
    let rules = WizardSettings::default();
    for count in [1, 25] {
        assert!(structural_issues(&rules, &draft(Some(count), "a", "/o")).is_empty());
    }

    let low = structural_issues(&rules, &draft(Some(0), "a", "/o"));
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].kind, IssueKind::TooSmall { minimum: 1 });

    let high = structural_issues(&rules, &draft(Some(26), "a", "/o"));
    assert_eq!(high[0].kind, IssueKind::TooBig { maximum: 25 });
}

#[test]
fn every_field_is_reported_at_once() {
    let bundle = Bundle::for_locale(Locale::En);
    let mut bad = draft(Some(30), "my archive", "   ");
    bad.file_path = "archive.zip".to_string();

    let errors = validate_config(&bundle, &WizardSettings::default(), &bad).expect_err("invalid");

    assert_eq!(
        errors.keys().copied().collect::<Vec<_>>(),
        vec![
            Field::FilePath,
            Field::MessagesPerDocument,
            Field::BaseName,
            Field::OutputDirectory
        ]
    );
    let count = &errors[&Field::MessagesPerDocument][0];
    assert_eq!(count.code(), ErrorCode::TooBig);
    assert_eq!(count.severity(), Severity::Warning);
    assert_eq!(count.user_message(), "The value must be at most 25.");
    assert_eq!(
        count.context().and_then(|ctx| ctx.get("field")).map(String::as_str),
        Some("Emails per PDF")
    );
    assert_eq!(errors[&Field::FilePath][0].code(), ErrorCode::Custom);
    assert_eq!(
        errors[&Field::FilePath][0].user_message(),
        "The file must have the extension .pst."
    );
    assert_eq!(errors[&Field::BaseName][0].code(), ErrorCode::InvalidString);
    assert_eq!(errors[&Field::OutputDirectory][0].code(), ErrorCode::RequiredField);
}

#[test]
fn extension_check_ignores_case() {
    let rules = WizardSettings::default();
    let mut upper = draft(Some(5), "a", "/o");
    upper.file_path = "ARCHIVE.PST".to_string();
    assert!(structural_issues(&rules, &upper).is_empty());
}

#[test]
fn empty_base_name_is_required_not_invalid() {
    let issues = structural_issues(&WizardSettings::default(), &draft(Some(5), "", "/o"));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, Field::BaseName);
    assert_eq!(issues[0].kind, IssueKind::Required);
}

#[test]
fn count_bounds_do_not_follow_the_default_setting() {
    let rules = WizardSettings {
        default_messages_per_document: 40,
        ..WizardSettings::default()
    };
    assert!(structural_issues(&rules, &draft(Some(25), "a", "/o")).is_empty());
    let high = structural_issues(&rules, &draft(Some(26), "a", "/o"));
    assert_eq!(high[0].kind, IssueKind::TooBig { maximum: 25 });
    let absent = structural_issues(&rules, &draft(None, "a", "/o"));
    assert_eq!(absent[0].kind, IssueKind::TooBig { maximum: 25 });
}
