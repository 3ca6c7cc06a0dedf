//! Fetch window: lookback period, bar interval and resampling.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::domain::price::{PriceBar, PriceSeries};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("invalid period '{0}' (expected Nd, Nwk, Nmo, Ny, ytd or max)")]
    InvalidPeriod(String),

    #[error("invalid interval '{0}' (expected 1d, 1wk or 1mo)")]
    InvalidInterval(String),
}

/// Lookback period ending at the window's end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Period {
    /// First date covered by the period, inclusive. `None` means unbounded.
    ///
    /// `Days(n)` covers the `n` calendar days ending at `end`, so `1d` is
    /// `end` alone.
    pub fn start_date(self, end: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Days(n) => end.checked_sub_days(Days::new(u64::from(n) - 1)),
            Period::Weeks(n) => end.checked_sub_days(Days::new(u64::from(n) * 7 - 1)),
            Period::Months(n) => end
                .checked_sub_months(Months::new(n))
                .and_then(|d| d.succ_opt()),
            Period::Years(n) => end
                .checked_sub_months(Months::new(n.saturating_mul(12)))
                .and_then(|d| d.succ_opt()),
            Period::YearToDate => NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Period::Max => None,
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{n}d"),
            Period::Weeks(n) => write!(f, "{n}wk"),
            Period::Months(n) => write!(f, "{n}mo"),
            Period::Years(n) => write!(f, "{n}y"),
            Period::YearToDate => f.write_str("ytd"),
            Period::Max => f.write_str("max"),
        }
    }
}

impl FromStr for Period {
    type Err = WindowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_ascii_lowercase();
        match lower.as_str() {
            "ytd" => return Ok(Period::YearToDate),
            "max" => return Ok(Period::Max),
            _ => {}
        }

        let split = lower
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| WindowError::InvalidPeriod(value.to_string()))?;
        let (digits, unit) = lower.split_at(split);
        let n: u32 = digits
            .parse()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| WindowError::InvalidPeriod(value.to_string()))?;

        match unit {
            "d" => Ok(Period::Days(n)),
            "wk" => Ok(Period::Weeks(n)),
            "mo" => Ok(Period::Months(n)),
            "y" => Ok(Period::Years(n)),
            _ => Err(WindowError::InvalidPeriod(value.to_string())),
        }
    }
}

/// Bar interval the series is resampled to before references are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    OneDay,
    OneWeek,
    OneMonth,
}

impl Interval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::OneWeek => "1wk",
            Self::OneMonth => "1mo",
        }
    }

    /// Aggregate daily bars into this interval's buckets.
    ///
    /// Each bucket is dated by its last bar and carries the first valid open
    /// and the last valid close seen in the bucket.
    pub fn resample(self, series: &PriceSeries) -> PriceSeries {
        if self == Interval::OneDay {
            return series.clone();
        }

        let mut buckets: Vec<((i32, u32), PriceBar)> = Vec::new();
        for bar in series.bars() {
            let key = self.bucket_key(bar.date);
            match buckets.last_mut() {
                Some((k, agg)) if *k == key => {
                    agg.date = bar.date;
                    if agg.valid_open().is_none() {
                        agg.open = bar.valid_open();
                    }
                    if let Some(close) = bar.valid_close() {
                        agg.close = Some(close);
                    }
                }
                _ => buckets.push((
                    key,
                    PriceBar::new(bar.date, bar.valid_open(), bar.valid_close()),
                )),
            }
        }

        PriceSeries::new(
            series.symbol(),
            buckets.into_iter().map(|(_, bar)| bar).collect(),
        )
    }

    fn bucket_key(self, date: NaiveDate) -> (i32, u32) {
        match self {
            Interval::OneDay => (date.year(), date.ordinal()),
            Interval::OneWeek => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Interval::OneMonth => (date.year(), date.month()),
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = WindowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1d" => Ok(Self::OneDay),
            "1wk" => Ok(Self::OneWeek),
            "1mo" => Ok(Self::OneMonth),
            other => Err(WindowError::InvalidInterval(other.to_owned())),
        }
    }
}

/// Dates and interval requested from the price source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
    pub interval: Interval,
}

impl FetchWindow {
    pub fn new(period: Period, end: NaiveDate, interval: Interval) -> Self {
        Self {
            start: period.start_date(end),
            end,
            interval,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date <= self.end && self.start.is_none_or(|start| date >= start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_periods() {
        assert_eq!("5d".parse::<Period>().unwrap(), Period::Days(5));
        assert_eq!("2wk".parse::<Period>().unwrap(), Period::Weeks(2));
        assert_eq!("3MO".parse::<Period>().unwrap(), Period::Months(3));
        assert_eq!("1y".parse::<Period>().unwrap(), Period::Years(1));
        assert_eq!("ytd".parse::<Period>().unwrap(), Period::YearToDate);
        assert_eq!(" max ".parse::<Period>().unwrap(), Period::Max);
    }

    #[test]
    fn rejects_invalid_periods() {
        for bad in ["", "d", "0d", "5", "5h", "-1d", "1.5y"] {
            assert!(
                matches!(bad.parse::<Period>(), Err(WindowError::InvalidPeriod(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn period_display_round_trips_text() {
        for text in ["5d", "2wk", "6mo", "10y", "ytd", "max"] {
            assert_eq!(text.parse::<Period>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn period_start_dates() {
        let end = date(2024, 3, 15);
        assert_eq!(Period::Days(1).start_date(end), Some(end));
        assert_eq!(Period::Days(5).start_date(end), Some(date(2024, 3, 11)));
        assert_eq!(Period::Weeks(1).start_date(end), Some(date(2024, 3, 9)));
        assert_eq!(Period::Months(1).start_date(end), Some(date(2024, 2, 16)));
        assert_eq!(Period::Years(1).start_date(end), Some(date(2023, 3, 16)));
        assert_eq!(Period::YearToDate.start_date(end), Some(date(2024, 1, 1)));
        assert_eq!(Period::Max.start_date(end), None);
    }

    #[test]
    fn parses_interval() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::OneDay);
        assert_eq!("1WK".parse::<Interval>().unwrap(), Interval::OneWeek);
        assert!(matches!(
            "2h".parse::<Interval>(),
            Err(WindowError::InvalidInterval(_))
        ));
    }

    #[test]
    fn window_contains() {
        let window = FetchWindow::new(Period::Days(3), date(2024, 1, 10), Interval::OneDay);
        assert!(!window.contains(date(2024, 1, 7)));
        assert!(window.contains(date(2024, 1, 8)));
        assert!(window.contains(date(2024, 1, 10)));
        assert!(!window.contains(date(2024, 1, 11)));

        let unbounded = FetchWindow::new(Period::Max, date(2024, 1, 10), Interval::OneDay);
        assert!(unbounded.contains(date(1990, 1, 1)));
    }

    #[test]
    fn resample_daily_is_identity() {
        let series = PriceSeries::new(
            "X",
            vec![PriceBar::close_only(date(2024, 1, 1), 1.0)],
        );
        assert_eq!(Interval::OneDay.resample(&series), series);
    }

    #[test]
    fn resample_monthly_takes_first_open_last_close() {
        let series = PriceSeries::new(
            "X",
            vec![
                PriceBar::new(date(2024, 1, 2), Some(10.0), Some(11.0)),
                PriceBar::new(date(2024, 1, 31), Some(12.0), Some(13.0)),
                PriceBar::new(date(2024, 2, 1), None, Some(14.0)),
                PriceBar::new(date(2024, 2, 2), Some(14.5), None),
            ],
        );
        let monthly = Interval::OneMonth.resample(&series);
        assert_eq!(monthly.len(), 2);
        assert_eq!(
            monthly.bars()[0],
            PriceBar::new(date(2024, 1, 31), Some(10.0), Some(13.0))
        );
        assert_eq!(
            monthly.bars()[1],
            PriceBar::new(date(2024, 2, 2), Some(14.5), Some(14.0))
        );
    }

    #[test]
    fn resample_weekly_uses_iso_weeks() {
        // 2024-01-05 is a Friday, 2024-01-08 the following Monday
        let series = PriceSeries::new(
            "X",
            vec![
                PriceBar::close_only(date(2024, 1, 4), 1.0),
                PriceBar::close_only(date(2024, 1, 5), 2.0),
                PriceBar::close_only(date(2024, 1, 8), 3.0),
            ],
        );
        let weekly = Interval::OneWeek.resample(&series);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly.bars()[0].close, Some(2.0));
        assert_eq!(weekly.bars()[0].date, date(2024, 1, 5));
        assert_eq!(weekly.bars()[1].close, Some(3.0));
    }
}
