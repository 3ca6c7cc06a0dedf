//! Plain text tables for terminal output.
//!
//! Prices and changes are rounded to two decimals here and nowhere else.

use std::io::Write;

use crate::domain::error::MoversError;
use crate::domain::monthly_returns::MonthlyReturnRow;
use crate::domain::report::{MoverRecord, MoversReport};
use crate::ports::report_port::ReportPort;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Signed percentage with two decimals, e.g. `+10.00%`. Never prints `-0.00%`.
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:+.2}%", rounded)
}

pub fn format_price(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "N/A".to_string()
    }
}

#[derive(Debug, Default)]
pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_set(
        &self,
        title: &str,
        records: &[MoverRecord],
        k: usize,
        out: &mut dyn Write,
    ) -> Result<(), MoversError> {
        writeln!(out, "{title}")?;
        if records.is_empty() {
            writeln!(out, "  No data available")?;
            return Ok(());
        }

        let name_width = records
            .iter()
            .map(|r| r.instrument_name.len())
            .max()
            .unwrap_or(0)
            .max("Instrument".len());
        let symbol_width = records
            .iter()
            .map(|r| r.symbol.len())
            .max()
            .unwrap_or(0)
            .max("Symbol".len());

        writeln!(
            out,
            "  {:>2}  {:<name_width$}  {:<symbol_width$}  {:>12}  {:>9}",
            "#", "Instrument", "Symbol", "Last", "Change"
        )?;
        for (i, r) in records.iter().enumerate() {
            writeln!(
                out,
                "  {:>2}  {:<name_width$}  {:<symbol_width$}  {:>12}  {:>9}",
                i + 1,
                r.instrument_name,
                r.symbol,
                format_price(r.last_price),
                format_percent(r.percent_change)
            )?;
        }
        if records.len() < k {
            writeln!(
                out,
                "  warning: only {} of {} requested instruments available",
                records.len(),
                k
            )?;
        }
        Ok(())
    }
}

impl ReportPort for TextReportAdapter {
    fn write(&self, report: &MoversReport, out: &mut dyn Write) -> Result<(), MoversError> {
        writeln!(out, "Baseline: {}", report.baseline)?;
        writeln!(out)?;
        self.write_set(
            &format!("Top {} gainers", report.k),
            &report.gainers,
            report.k,
            out,
        )?;
        writeln!(out)?;
        self.write_set(
            &format!("Top {} losers", report.k),
            &report.losers,
            report.k,
            out,
        )?;

        if !report.unavailable.is_empty() {
            writeln!(out)?;
            writeln!(out, "Unavailable:")?;
            for u in &report.unavailable {
                writeln!(out, "  {} ({}): {}", u.instrument_name, u.symbol, u.reason)?;
            }
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_heatmap(
        &self,
        symbol: &str,
        rows: &[MonthlyReturnRow],
        out: &mut dyn Write,
    ) -> Result<(), MoversError> {
        writeln!(out, "Monthly returns: {symbol}")?;
        if rows.is_empty() {
            writeln!(out, "  No data available")?;
            return Ok(());
        }

        write!(out, "{:<6}", "Year")?;
        for month in MONTHS {
            write!(out, " {:>8}", month)?;
        }
        writeln!(out, " {:>8}", "YTD")?;

        let cell = |v: Option<f64>| v.map(format_percent).unwrap_or_else(|| "-".to_string());
        for row in rows {
            write!(out, "{:<6}", row.year)?;
            for value in row.months {
                write!(out, " {:>8}", cell(value))?;
            }
            writeln!(out, " {:>8}", cell(row.ytd))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::UnavailableRecord;
    use crate::domain::variation::Unavailable;

    fn record(name: &str, symbol: &str, last: f64, pct: f64) -> MoverRecord {
        MoverRecord {
            instrument_name: name.into(),
            symbol: symbol.into(),
            category: None,
            last_price: last,
            percent_change: pct,
        }
    }

    fn render(report: &MoversReport) -> String {
        let mut buf = Vec::new();
        TextReportAdapter::new().write(report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(10.0), "+10.00%");
        assert_eq!(format_percent(-10.0), "-10.00%");
        assert_eq!(format_percent(1.23456), "+1.23%");
        assert_eq!(format_percent(-0.001), "+0.00%");
        assert_eq!(format_price(f64::NAN), "N/A");
        assert_eq!(format_price(2100.5), "2100.50");
    }

    #[test]
    fn renders_ranked_rows() {
        let report = MoversReport {
            k: 2,
            baseline: "last close vs previous close".into(),
            gainers: vec![record("Gold", "GC=F", 2100.0, 5.0), record("Silver", "SI=F", 24.0, 1.0)],
            losers: vec![record("Silver", "SI=F", 24.0, 1.0), record("Gold", "GC=F", 2100.0, 5.0)],
            unavailable: vec![],
        };
        let text = render(&report);
        assert!(text.contains("Baseline: last close vs previous close"));
        assert!(text.contains("Top 2 gainers"));
        assert!(text.contains("Gold"));
        assert!(text.contains("2100.00"));
        assert!(text.contains("+5.00%"));
        assert!(!text.contains("warning"));
        assert!(!text.contains("Unavailable"));
        let gold = text.find("GC=F").unwrap();
        let silver = text.find("SI=F").unwrap();
        assert!(gold < silver);
    }

    #[test]
    fn renders_empty_and_short_sets() {
        let empty = MoversReport {
            k: 5,
            baseline: "b".into(),
            gainers: vec![],
            losers: vec![],
            unavailable: vec![UnavailableRecord {
                instrument_name: "Zed".into(),
                symbol: "Z".into(),
                reason: Unavailable::DegenerateBaseline,
            }],
        };
        let text = render(&empty);
        assert_eq!(text.matches("No data available").count(), 2);
        assert!(text.contains("Zed (Z): degenerate baseline"));

        let short = MoversReport {
            k: 5,
            baseline: "b".into(),
            gainers: vec![record("A", "A", 1.0, 1.0)],
            losers: vec![record("A", "A", 1.0, 1.0)],
            unavailable: vec![],
        };
        assert!(render(&short).contains("only 1 of 5"));
    }

    #[test]
    fn grouped_output_has_headings() {
        let report = MoversReport {
            k: 1,
            baseline: "b".into(),
            gainers: vec![],
            losers: vec![],
            unavailable: vec![],
        };
        let mut buf = Vec::new();
        TextReportAdapter::new()
            .write_grouped(
                &[("Metals".into(), report.clone()), ("Energy".into(), report)],
                &mut buf,
            )
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.find("## Metals").unwrap() < text.find("## Energy").unwrap());
    }

    #[test]
    fn heatmap_rows() {
        let mut months = [None; 12];
        months[0] = Some(2.5);
        let rows = vec![MonthlyReturnRow {
            year: 2024,
            months,
            ytd: Some(2.5),
        }];
        let mut buf = Vec::new();
        TextReportAdapter::new()
            .write_heatmap("BHP", &rows, &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Monthly returns: BHP"));
        assert!(text.contains("Jan"));
        assert!(text.contains("YTD"));
        let line = text.lines().find(|l| l.starts_with("2024")).unwrap();
        assert_eq!(line.matches("+2.50%").count(), 2);
        assert_eq!(line.split_whitespace().filter(|c| *c == "-").count(), 11);
    }

    #[test]
    fn heatmap_empty() {
        let mut buf = Vec::new();
        TextReportAdapter::new().write_heatmap("X", &[], &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("No data available"));
    }
}
