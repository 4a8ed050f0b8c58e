use super::Platform;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlatformShare {
    pub platform: Platform,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DayTotal {
    pub date: String,
    pub count: i64,
}

/// KPIs over a date range of daily reports.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub total: i64,
    pub days: i64,
    pub average_per_day: f64,
    pub platforms: Vec<PlatformShare>,
    pub busiest_day: Option<DayTotal>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fold aggregate rows into a [`Summary`].
///
/// Every platform appears in the output, with zero count when it has no rows.
/// Percentages are 0 when the total is 0.
pub fn summarize(
    platform_totals: &[(Platform, i64)],
    days: i64,
    busiest_day: Option<DayTotal>,
) -> Summary {
    let count_for = |platform: Platform| {
        platform_totals
            .iter()
            .filter(|(p, _)| *p == platform)
            .map(|(_, c)| *c)
            .sum::<i64>()
    };
    let total: i64 = Platform::ALL.iter().map(|p| count_for(*p)).sum();

    let platforms = Platform::ALL
        .iter()
        .map(|&platform| {
            let count = count_for(platform);
            let percentage = if total > 0 {
                round2(count as f64 * 100.0 / total as f64)
            } else {
                0.0
            };
            PlatformShare {
                platform,
                count,
                percentage,
            }
        })
        .collect();

    let average_per_day = if days > 0 {
        round2(total as f64 / days as f64)
    } else {
        0.0
    };

    Summary {
        total,
        days,
        average_per_day,
        platforms,
        busiest_day,
    }
}
