pub mod handler;
pub mod summary;

use crate::query::{fetch_page, Filter, PageMeta, Pagination};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use summary::{summarize, DayTotal, Summary};

pub const DEFAULT_REPORT_LIMIT: i64 = 100;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Bot,
    App,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Bot, Platform::App];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Bot => "bot",
            Platform::App => "app",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownPlatform;

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bot" => Ok(Platform::Bot),
            "app" => Ok(Platform::App),
            _ => Err(UnknownPlatform),
        }
    }
}

/// Strict `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// One counter per (date, platform).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DailyReport {
    pub id: i64,
    pub date: String,
    pub platform: String,
    pub count: i64,
}

impl DailyReport {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            platform: row.get(2)?,
            count: row.get(3)?,
        })
    }
}

/// Optional filters shared by the listing and the summary, already validated.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub platform: Option<Platform>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportFilter {
    fn to_filter(&self) -> Filter {
        let start = self.start_date.map(|d| d.format(DATE_FORMAT).to_string());
        let end = self.end_date.map(|d| d.format(DATE_FORMAT).to_string());
        Filter::new()
            .eq("platform", self.platform.map(|p| p.as_str()))
            .gte("date", start.as_deref())
            .lte("date", end.as_deref())
    }
}

/// Create the (date, platform) row with count 1 or increment it, atomically.
pub fn upsert_daily(
    conn: &Connection,
    date: NaiveDate,
    platform: Platform,
) -> rusqlite::Result<DailyReport> {
    conn.query_row(
        "INSERT INTO daily_reports (date, platform, count) VALUES (?1, ?2, 1)
         ON CONFLICT(date, platform) DO UPDATE SET count = count + 1
         RETURNING id, date, platform, count",
        params![date.format(DATE_FORMAT).to_string(), platform.as_str()],
        DailyReport::from_row,
    )
}

pub fn list_reports_page(
    conn: &Connection,
    filter: &ReportFilter,
    pagination: Pagination,
) -> rusqlite::Result<(Vec<DailyReport>, PageMeta)> {
    fetch_page(
        conn,
        "daily_reports",
        "id, date, platform, count",
        &filter.to_filter(),
        "date DESC, platform",
        pagination,
        DailyReport::from_row,
    )
}

/// Aggregate the date range into a [`Summary`]. A platform filter is ignored
/// here since the summary always breaks down by platform.
pub fn summary_for(conn: &Connection, filter: &ReportFilter) -> rusqlite::Result<Summary> {
    let range = ReportFilter {
        platform: None,
        ..filter.clone()
    }
    .to_filter();
    let binds = range.binds();

    let mut stmt = conn.prepare(&format!(
        "SELECT platform, SUM(count) FROM daily_reports WHERE {} GROUP BY platform",
        range.sql()
    ))?;
    let platform_totals = stmt
        .query_map(params_from_iter(binds), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter_map(|(p, c)| p.parse::<Platform>().ok().map(|p| (p, c)))
        .collect::<Vec<_>>();

    let days: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(DISTINCT date) FROM daily_reports WHERE {}",
            range.sql()
        ),
        params_from_iter(binds),
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT date, SUM(count) AS total FROM daily_reports WHERE {}
         GROUP BY date ORDER BY total DESC, date DESC LIMIT 1",
        range.sql()
    ))?;
    let busiest_day = stmt
        .query_map(params_from_iter(binds), |row| {
            Ok(DayTotal {
                date: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .next()
        .transpose()?;

    Ok(summarize(&platform_totals, days, busiest_day))
}
