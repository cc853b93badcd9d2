//! Market verdict from the classified result counts.

use nichescan_core::{AppItem, DomainCategory, ItemType, SeedingTarget, Verdict, VerdictColor};

const MANY_TARGETS: usize = 3;
const MANY_TARGETS_POINTS: u32 = 40;
const SOME_TARGETS_POINTS: u32 = 15;
const FEW_APPS: usize = 5;
const FEW_APPS_POINTS: u32 = 20;

const GREEN_THRESHOLD: u32 = 40;
const YELLOW_THRESHOLD: u32 = 15;

/// Hard obstacles among the top organic results needed to veto the market.
const VETO_OBSTACLES: usize = 2;
const VETO_WINDOW: usize = 3;

/// Additive opportunity score: community demand plus a bonus for thin supply.
///
/// An empty result set carries no evidence of thin supply and scores zero.
#[must_use]
pub fn opportunity_score(apps: &[AppItem], seeding_targets: &[SeedingTarget]) -> u32 {
    if apps.is_empty() && seeding_targets.is_empty() {
        return 0;
    }

    let mut score = 0;
    if seeding_targets.len() >= MANY_TARGETS {
        score += MANY_TARGETS_POINTS;
    } else if !seeding_targets.is_empty() {
        score += SOME_TARGETS_POINTS;
    }

    let real_apps = apps
        .iter()
        .filter(|a| a.item_type == ItemType::App)
        .count();
    if real_apps < FEW_APPS {
        score += FEW_APPS_POINTS;
    }
    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpportunityScorer {
    hard_obstacle_veto: bool,
}

impl Default for OpportunityScorer {
    fn default() -> Self {
        Self {
            hard_obstacle_veto: true,
        }
    }
}

impl OpportunityScorer {
    /// Scorer that only applies the threshold bands.
    #[must_use]
    pub fn without_veto() -> Self {
        Self {
            hard_obstacle_veto: false,
        }
    }

    /// Bands the opportunity score into a verdict.
    #[must_use]
    pub fn score(&self, apps: &[AppItem], seeding_targets: &[SeedingTarget]) -> Verdict {
        band(opportunity_score(apps, seeding_targets))
    }

    /// Like [`OpportunityScorer::score`], but a market whose top organic
    /// results are mostly review aggregators or code hosts is vetoed outright.
    ///
    /// `top_categories` lists the categories of the organic results in rank
    /// order; only the first three are considered.
    #[must_use]
    pub fn score_with_top_categories(
        &self,
        apps: &[AppItem],
        seeding_targets: &[SeedingTarget],
        top_categories: &[DomainCategory],
    ) -> Verdict {
        if self.hard_obstacle_veto {
            let obstacles = top_categories
                .iter()
                .take(VETO_WINDOW)
                .filter(|c| c.is_hard_obstacle())
                .count();
            if obstacles >= VETO_OBSTACLES {
                tracing::debug!(obstacles, "top results dominated by hard obstacles");
                return verdict(
                    "Do Not Build",
                    "Saturated: Do Not Build",
                    "<b>Hard to Outrank.</b> Review sites and code hosts hold the top results.",
                    VerdictColor::Red,
                );
            }
        }
        self.score(apps, seeding_targets)
    }
}

fn band(score: u32) -> Verdict {
    if score >= GREEN_THRESHOLD {
        verdict(
            "High Demand",
            "Underserved Market",
            "<b>High Interest, Low Supply.</b> Active discussions found but few dominant tools.",
            VerdictColor::Green,
        )
    } else if score >= YELLOW_THRESHOLD {
        verdict(
            "Community Buzz",
            "Active Discussions",
            "<b>Good Engagement.</b> Tools exist, but users are still discussing features.",
            VerdictColor::Yellow,
        )
    } else {
        verdict(
            "Well Established",
            "Saturated Market",
            "<b>Many Options.</b> Big brands dominate this niche.",
            VerdictColor::Red,
        )
    }
}

fn verdict(status: &str, title: &str, description: &str, color: VerdictColor) -> Verdict {
    Verdict {
        status: status.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        color,
    }
}

#[cfg(test)]
mod tests {
    use nichescan_core::PricingModel;

    use super::*;

    fn app(n: usize, item_type: ItemType) -> AppItem {
        AppItem {
            name: format!("App{n}"),
            domain: format!("app{n}.com"),
            url: format!("https://app{n}.com"),
            description: String::new(),
            item_type,
            pricing_model: PricingModel::Unknown,
            features: Vec::new(),
            audience: None,
            rating: None,
            review_count: None,
            cta_text: item_type.cta_text().to_string(),
        }
    }

    fn apps(count: usize) -> Vec<AppItem> {
        (0..count).map(|n| app(n, ItemType::App)).collect()
    }

    fn targets(count: usize) -> Vec<SeedingTarget> {
        (0..count)
            .map(|n| SeedingTarget {
                source: "Reddit".to_string(),
                title: format!("Thread {n}"),
                url: format!("https://reddit.com/r/x/{n}"),
                meta: format!("Rank #{n}"),
                is_hijackable: true,
            })
            .collect()
    }

    #[test]
    fn three_targets_and_two_apps_is_underserved() {
        assert_eq!(opportunity_score(&apps(2), &targets(3)), 60);
        let verdict = OpportunityScorer::default().score(&apps(2), &targets(3));
        assert_eq!(verdict.title, "Underserved Market");
        assert_eq!(verdict.color, VerdictColor::Green);
    }

    #[test]
    fn empty_results_are_saturated() {
        assert_eq!(opportunity_score(&[], &[]), 0);
        let verdict = OpportunityScorer::default().score(&[], &[]);
        assert_eq!(verdict.title, "Saturated Market");
        assert_eq!(verdict.color, VerdictColor::Red);
    }

    #[test]
    fn few_apps_without_discussion_is_active() {
        assert_eq!(opportunity_score(&apps(2), &[]), 20);
        let verdict = OpportunityScorer::default().score(&apps(2), &[]);
        assert_eq!(verdict.title, "Active Discussions");
    }

    #[test]
    fn crowded_market_without_discussion_is_saturated() {
        let verdict = OpportunityScorer::default().score(&apps(6), &[]);
        assert_eq!(opportunity_score(&apps(6), &[]), 0);
        assert_eq!(verdict.title, "Saturated Market");
        assert_eq!(verdict.status, "Well Established");
        assert_eq!(verdict.color, VerdictColor::Red);
    }

    #[test]
    fn one_target_with_many_apps_is_active() {
        let verdict = OpportunityScorer::default().score(&apps(8), &targets(1));
        assert_eq!(verdict.title, "Active Discussions");
        assert_eq!(verdict.color, VerdictColor::Yellow);
    }

    #[test]
    fn only_app_typed_items_count_as_supply() {
        let mixed: Vec<AppItem> = (0..8).map(|n| app(n, ItemType::Resource)).collect();
        assert_eq!(opportunity_score(&mixed, &[]), 20);
    }

    #[test]
    fn more_targets_never_lower_the_score() {
        for app_count in [0, 3, 5, 9] {
            let fixed = apps(app_count);
            let mut previous = 0;
            for target_count in 0..=3 {
                let score = opportunity_score(&fixed, &targets(target_count));
                assert!(score >= previous, "apps={app_count} targets={target_count}");
                previous = score;
            }
        }
    }

    #[test]
    fn two_hard_obstacles_in_top_three_veto() {
        let top = [
            DomainCategory::ReviewGiant,
            DomainCategory::Unknown,
            DomainCategory::TechRepo,
        ];
        let verdict =
            OpportunityScorer::default().score_with_top_categories(&apps(1), &targets(5), &top);
        assert_eq!(verdict.status, "Do Not Build");
        assert_eq!(verdict.color, VerdictColor::Red);
    }

    #[test]
    fn obstacles_below_top_three_do_not_veto() {
        let top = [
            DomainCategory::ReviewGiant,
            DomainCategory::Forum,
            DomainCategory::Unknown,
            DomainCategory::TechRepo,
        ];
        let verdict =
            OpportunityScorer::default().score_with_top_categories(&apps(1), &targets(5), &top);
        assert_eq!(verdict.title, "Underserved Market");
    }

    #[test]
    fn veto_can_be_disabled() {
        let top = [DomainCategory::ReviewGiant, DomainCategory::ReviewGiant];
        let verdict = OpportunityScorer::without_veto().score_with_top_categories(
            &apps(1),
            &targets(5),
            &top,
        );
        assert_eq!(verdict.title, "Underserved Market");
    }
}
