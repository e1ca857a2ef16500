//! Keyword-based category assignment.

use promowatch_core::CampaignCategory;

/// Ordered (category, keywords) table. The first category with any keyword
/// present in the text wins, so order resolves overlaps. Keywords are
/// lowercase; matching lowercases the input.
const CATEGORY_KEYWORDS: &[(CampaignCategory, &[&str])] = &[
    (
        CampaignCategory::Family,
        &["亲子", "家庭", "儿童", "家族", "亲情", "孩子", "family", "kids"],
    ),
    (
        CampaignCategory::Dining,
        &[
            "餐饮", "美食", "餐厅", "饮食", "用餐", "早餐", "晚餐", "自助餐", "dining",
            "restaurant", "brunch",
        ],
    ),
    (
        CampaignCategory::Seasonal,
        &[
            "季节", "春", "夏", "秋", "冬", "节日", "新年", "圣诞", "春节", "中秋", "holiday",
            "christmas", "festive",
        ],
    ),
    (
        CampaignCategory::Rewards,
        &[
            "积分", "会员", "旅享家", "奖励", "里程", "返现", "bonvoy", "points", "rewards",
        ],
    ),
    (
        CampaignCategory::Travel,
        &["旅行", "度假", "出行", "旅游", "游玩", "探索", "getaway", "vacation"],
    ),
    (
        CampaignCategory::Business,
        &["商务", "会议", "办公", "差旅", "business", "meeting"],
    ),
    (
        CampaignCategory::Spa,
        &["水疗", "spa", "养生", "按摩", "理疗", "massage", "wellness"],
    ),
    (
        CampaignCategory::Wedding,
        &["婚礼", "婚宴", "婚庆", "蜜月", "wedding", "honeymoon"],
    ),
    (
        CampaignCategory::Promotion,
        &["优惠", "折扣", "特价", "促销", "立减", "返利", "discount", "sale"],
    ),
];

/// Assigns a category to campaign text (name and description joined).
///
/// Returns [`CampaignCategory::General`] when no keyword matches, including
/// for empty input.
#[must_use]
pub fn classify(text: &str) -> CampaignCategory {
    let lowered = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map_or(CampaignCategory::General, |(category, _)| *category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_general() {
        assert_eq!(classify(""), CampaignCategory::General);
    }

    #[test]
    fn unmatched_text_is_general() {
        assert_eq!(classify("延迟退房礼遇"), CampaignCategory::General);
        assert_eq!(classify("Late checkout"), CampaignCategory::General);
    }

    #[test]
    fn matches_chinese_keywords() {
        assert_eq!(classify("万豪旅享家亲子主题房"), CampaignCategory::Family);
        assert_eq!(classify("水疗养生套餐"), CampaignCategory::Spa);
        assert_eq!(classify("婚礼场地预订"), CampaignCategory::Wedding);
        assert_eq!(classify("提前预订立减"), CampaignCategory::Promotion);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("SPA Retreat"), CampaignCategory::Spa);
        assert_eq!(classify("Marriott BONVOY Week"), CampaignCategory::Rewards);
        assert_eq!(classify("Family Fun Package"), CampaignCategory::Family);
    }

    #[test]
    fn table_order_breaks_ties() {
        // Both dining (美食) and promotion (优惠) match; dining comes first.
        assert_eq!(classify("春季美食节特别优惠"), CampaignCategory::Dining);
        // Family precedes rewards.
        assert_eq!(classify("会员亲子礼遇"), CampaignCategory::Family);
    }

    #[test]
    fn every_table_entry_is_reachable() {
        for (category, keywords) in CATEGORY_KEYWORDS {
            assert!(!keywords.is_empty());
            assert_ne!(*category, CampaignCategory::General);
        }
        assert_eq!(CATEGORY_KEYWORDS.len(), CampaignCategory::ALL.len() - 1);
    }

    #[test]
    fn keywords_are_lowercase() {
        for (_, keywords) in CATEGORY_KEYWORDS {
            for keyword in *keywords {
                assert_eq!(*keyword, keyword.to_lowercase());
            }
        }
    }
}
