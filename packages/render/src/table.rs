//! Tabular listing of a query result.
//!
//! Every merged record appears, located or not, ordered by event end date.
//! The registry sends dates as `dd/mm/yyyy`, which does not sort correctly
//! as text, so dates are parsed before comparison.

use std::cmp::Ordering;
use std::fmt::Write as _;

use chrono::NaiveDate;
use georisk_risk_models::{CommuneCode, MergedRiskRecord};

/// Date formats accepted for `date_fin_evt`, tried in order.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

/// Parses a registry event date.
#[must_use]
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Event end date as sent by the registry.
    pub date_fin_evt: String,
    /// Hazard label.
    pub libelle_risque_jo: String,
    /// Commune name, when the registry provides it.
    pub libelle_commune: Option<String>,
    /// Commune code.
    pub code_insee: CommuneCode,
    /// Whether the record has a map marker.
    pub located: bool,
    parsed_date: Option<NaiveDate>,
}

impl TableRow {
    /// The parsed end date, if it was in a recognized format.
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.parsed_date
    }

    fn cmp_by_date(&self, other: &Self) -> Ordering {
        match (self.parsed_date, other.parsed_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.date_fin_evt.cmp(&other.date_fin_evt),
        }
    }
}

impl From<&MergedRiskRecord> for TableRow {
    fn from(merged: &MergedRiskRecord) -> Self {
        let record = &merged.record;
        Self {
            parsed_date: parse_event_date(&record.date_fin_evt),
            date_fin_evt: record.date_fin_evt.clone(),
            libelle_risque_jo: record.libelle_risque_jo.clone(),
            libelle_commune: record.libelle_commune.clone(),
            code_insee: record.code_insee.clone(),
            located: merged.is_located(),
        }
    }
}

/// Rows sorted ascending by event end date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskTable {
    rows: Vec<TableRow>,
}

impl RiskTable {
    /// Builds the table from all merged records.
    ///
    /// Parsed dates sort chronologically; unparseable dates go after all
    /// parsed ones, ordered by raw text. Ties keep input order.
    #[must_use]
    pub fn build(records: &[MergedRiskRecord]) -> Self {
        let mut rows: Vec<TableRow> = records.iter().map(TableRow::from).collect();
        rows.sort_by(TableRow::cmp_by_date);
        Self { rows }
    }

    /// Rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Formats the table with fixed-width columns.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<12} {:<36} {:<24} {:<6} MAP",
            "END DATE", "RISK", "COMMUNE", "INSEE"
        );

        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<12} {:<36} {:<24} {:<6} {}",
                row.date_fin_evt,
                row.libelle_risque_jo,
                row.libelle_commune.as_deref().unwrap_or("-"),
                row.code_insee,
                if row.located { "yes" } else { "no" }
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use georisk_risk_models::{Coordinate, RiskRecord};

    use super::*;

    fn merged(code: &str, date: &str, located: bool) -> MergedRiskRecord {
        MergedRiskRecord {
            record: RiskRecord {
                code_insee: CommuneCode::normalize(code).unwrap(),
                date_fin_evt: date.to_string(),
                libelle_risque_jo: "Séisme".to_string(),
                date_debut_evt: None,
                libelle_commune: None,
                code_national_catnat: None,
            },
            location: located.then(|| Coordinate::new(48.8566, 2.3522)),
        }
    }

    fn dates(table: &RiskTable) -> Vec<&str> {
        table.rows().iter().map(|r| r.date_fin_evt.as_str()).collect()
    }

    #[test]
    fn parses_registry_and_iso_dates() {
        assert_eq!(
            parse_event_date("29/12/1999"),
            NaiveDate::from_ymd_opt(1999, 12, 29)
        );
        assert_eq!(
            parse_event_date("1999-12-29"),
            NaiveDate::from_ymd_opt(1999, 12, 29)
        );
        assert_eq!(parse_event_date("sometime"), None);
        assert_eq!(parse_event_date(""), None);
    }

    #[test]
    fn sorts_chronologically_not_lexicographically() {
        let table = RiskTable::build(&[
            merged("75056", "01/02/1999", true),
            merged("75056", "02/01/1999", true),
            merged("75056", "01/01/1999", true),
            merged("75056", "31/12/1998", true),
        ]);

        assert_eq!(
            dates(&table),
            vec!["31/12/1998", "01/01/1999", "02/01/1999", "01/02/1999"]
        );
    }

    #[test]
    fn unparseable_dates_sort_last() {
        let table = RiskTable::build(&[
            merged("75056", "", true),
            merged("75056", "15/06/2010", true),
            merged("75056", "inconnue", true),
        ]);

        assert_eq!(dates(&table), vec!["15/06/2010", "", "inconnue"]);
    }

    #[test]
    fn unlocated_records_are_listed() {
        let table = RiskTable::build(&[
            merged("75056", "01/01/2000", true),
            merged("99999", "01/01/1990", false),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].code_insee.as_str(), "99999");
        assert!(!table.rows()[0].located);
        assert!(table.rows()[1].located);
    }

    #[test]
    fn renders_header_and_rows() {
        let table = RiskTable::build(&[merged("75056", "01/01/2000", false)]);
        let text = table.render_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("END DATE"));
        assert!(lines[1].starts_with("01/01/2000"));
        assert!(lines[1].contains("75056"));
        assert!(lines[1].ends_with("no"));
    }
}
