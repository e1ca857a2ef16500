//! Fixed demo campaigns used when live extraction is unavailable or thin.

use promowatch_core::CandidateRecord;

const DEMO_CAMPAIGNS: &[(&str, &str, &str)] = &[
    (
        "万豪旅享家亲子主题房",
        "为家庭旅客打造的专属主题房体验，包含儿童欢迎礼品、亲子活动及家庭套餐优惠。入住即享专属儿童用品和游乐设施。",
        "https://www.marriott.com.cn/specials/family-theme-room.mi",
    ),
    (
        "万豪旅享家会员积分加倍",
        "限时活动：预订指定酒店可获得双倍积分奖励。会员专享，积分可兑换免费住宿及多种礼遇。",
        "https://www.marriott.com.cn/marriott-bonvoy/double-points.mi",
    ),
    (
        "春季美食节特别优惠",
        "品尝春季限定美食，指定餐厅消费满额享8折优惠。包含多款时令菜品和精选套餐。",
        "https://www.marriott.com.cn/dining/spring-food-festival.mi",
    ),
    (
        "商务差旅尊享计划",
        "为商务旅客定制的专属礼遇，包含延迟退房、行政酒廊使用权及专属商务服务。",
        "https://www.marriott.com.cn/specials/business-travel.mi",
    ),
    (
        "水疗养生套餐",
        "尊享90分钟身心放松体验，包含特色按摩及水疗护理。预订住宿套餐可享专属折扣。",
        "https://www.marriott.com.cn/specials/spa-wellness.mi",
    ),
    (
        "周末度假特惠",
        "周五至周日入住指定度假酒店，享房价7折优惠，含度假村活动体验及延迟退房。",
        "https://www.marriott.com.cn/specials/weekend-getaway.mi",
    ),
    (
        "新会员首住礼遇",
        "新注册万豪旅享家会员首次入住即获500积分奖励，更有机会升级房型。",
        "https://www.marriott.com.cn/marriott-bonvoy/new-member.mi",
    ),
    (
        "婚礼场地预订优惠",
        "婚宴预订享专属优惠，包含场地布置、定制菜单及新人住宿礼遇。",
        "https://www.marriott.com.cn/meetings/weddings.mi",
    ),
    (
        "中秋团圆季",
        "中秋佳节入住指定酒店，即赠精美月饼礼盒及客房延迟退房礼遇。",
        "https://www.marriott.com.cn/specials/mid-autumn.mi",
    ),
    (
        "提前预订立减优惠",
        "提前30天预订指定酒店客房，房价立减15%，可与其他礼遇叠加使用。",
        "https://www.marriott.com.cn/specials/advance-purchase.mi",
    ),
];

/// Returns the demo campaigns in a fixed order. Always the same ten records.
#[must_use]
pub fn demo_campaigns() -> Vec<CandidateRecord> {
    DEMO_CAMPAIGNS
        .iter()
        .map(|(name, info, url)| CandidateRecord::new(*name, Some(*info), *url))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use promowatch_core::CampaignCategory;

    use super::*;
    use crate::classify::classify;

    #[test]
    fn provides_ten_records() {
        assert_eq!(demo_campaigns().len(), 10);
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(demo_campaigns(), demo_campaigns());
    }

    #[test]
    fn names_are_unique_and_plausible() {
        let campaigns = demo_campaigns();
        let names: HashSet<_> = campaigns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), campaigns.len());
        assert!(campaigns.iter().all(|c| c.name.chars().count() > 3));
    }

    #[test]
    fn classifies_into_expected_categories() {
        let categories: Vec<_> = demo_campaigns()
            .iter()
            .map(|c| classify(&c.classification_text()))
            .collect();
        assert_eq!(
            categories,
            vec![
                CampaignCategory::Family,
                CampaignCategory::Rewards,
                CampaignCategory::Dining,
                CampaignCategory::Business,
                CampaignCategory::Spa,
                CampaignCategory::Travel,
                CampaignCategory::Rewards,
                CampaignCategory::Wedding,
                CampaignCategory::Seasonal,
                CampaignCategory::Promotion,
            ]
        );
    }
}
