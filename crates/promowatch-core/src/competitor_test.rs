use super::*;

#[test]
fn parses_name_and_pages_in_order() {
    let yaml = "\
name: Marriott
homepage: https://www.marriott.com.cn
pages:
  - https://www.marriott.com.cn/default.mi
  - https://www.marriott.com.cn/marriott-bonvoy/member-benefits.mi
  - https://www.marriott.com.cn/specials/offers.mi
";
    let competitor = parse_competitor(yaml).unwrap();
    assert_eq!(competitor.name, "Marriott");
    assert_eq!(
        competitor.homepage.as_deref(),
        Some("https://www.marriott.com.cn")
    );
    assert_eq!(competitor.pages.len(), 3);
    assert_eq!(
        competitor.pages[2],
        "https://www.marriott.com.cn/specials/offers.mi"
    );
}

#[test]
fn missing_pages_defaults_to_empty() {
    let competitor = parse_competitor("name: Marriott\n").unwrap();
    assert!(competitor.pages.is_empty());
    assert!(competitor.homepage.is_none());
}

#[test]
fn trims_competitor_name() {
    let competitor = parse_competitor("name: '  Marriott  '\n").unwrap();
    assert_eq!(competitor.name, "Marriott");
}

#[test]
fn rejects_blank_name() {
    let err = parse_competitor("name: '   '\n").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn rejects_non_http_page() {
    let yaml = "name: Marriott\npages:\n  - ftp://example.com/offers\n";
    let err = parse_competitor(yaml).unwrap_err();
    assert!(err.to_string().contains("http(s) URL"), "got: {err}");
}

#[test]
fn rejects_duplicate_pages_ignoring_trailing_slash() {
    let yaml = "\
name: Marriott
pages:
  - https://example.com/offers
  - https://example.com/offers/
";
    let err = parse_competitor(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate page"), "got: {err}");
}

#[test]
fn rejects_malformed_yaml() {
    let err = parse_competitor("name: [unterminated").unwrap_err();
    assert!(matches!(err, ConfigError::CompetitorFileParse(_)));
}

#[test]
fn load_competitor_reports_missing_file() {
    let err = load_competitor(Path::new("/nonexistent/competitor.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::CompetitorFileIo { .. }));
}

#[test]
fn shipped_competitor_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/competitor.yaml");
    let competitor = load_competitor(&path).unwrap();
    assert_eq!(competitor.name, "Marriott");
    assert_eq!(competitor.pages.len(), 3);
    assert!(competitor
        .pages
        .iter()
        .all(|p| p.starts_with("https://www.marriott.com.cn/")));
}
