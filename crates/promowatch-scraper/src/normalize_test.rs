use super::*;

#[test]
fn clean_text_collapses_whitespace() {
    assert_eq!(clean_text("  Family \n\t Fun   Package "), "Family Fun Package");
}

#[test]
fn clean_text_preserves_cjk() {
    assert_eq!(clean_text("\n  春季美食节\u{a0}特别优惠  "), "春季美食节 特别优惠");
}

#[test]
fn clean_text_strips_zero_width_characters() {
    assert_eq!(clean_text("会员\u{200b}专享"), "会员专享");
    assert_eq!(clean_text("\u{feff}"), "");
}

#[test]
fn char_len_counts_characters_not_bytes() {
    assert_eq!(char_len("优惠活动"), 4);
    assert_eq!("优惠活动".len(), 12);
}

#[test]
fn resolve_link_joins_relative_paths() {
    assert_eq!(
        resolve_link(
            "https://www.marriott.com.cn/specials/offers.mi",
            "/specials/spa-wellness.mi"
        )
        .as_deref(),
        Some("https://www.marriott.com.cn/specials/spa-wellness.mi")
    );
    assert_eq!(
        resolve_link("https://www.marriott.com.cn/specials/offers.mi", "family.mi").as_deref(),
        Some("https://www.marriott.com.cn/specials/family.mi")
    );
}

#[test]
fn resolve_link_keeps_absolute_urls() {
    assert_eq!(
        resolve_link("https://a.example/", "https://b.example/deal").as_deref(),
        Some("https://b.example/deal")
    );
}

#[test]
fn resolve_link_ignores_non_navigational_hrefs() {
    let page = "https://www.marriott.com.cn/default.mi";
    assert_eq!(resolve_link(page, ""), None);
    assert_eq!(resolve_link(page, "#top"), None);
    assert_eq!(resolve_link(page, "javascript:void(0)"), None);
    assert_eq!(resolve_link(page, "mailto:offers@example.com"), None);
}
