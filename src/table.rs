//! The flat training table: column layout and one-hot rendering.
//!
//! Rows stay typed ([`OutputRow`]) until they are written. The column list is
//! fixed by the schema enums except for the `year_bm_<year>` indicators, whose
//! universe is the set of membership years in the profile table and is
//! resolved once per table.

use crate::error::{MergeError, MergeResult};
use crate::schema::{AgeBin, Channel, Gender, OfferType, OutputRow, WEEKDAY_LABELS};
use std::collections::HashSet;

pub const LABEL_COLUMNS: [&str; 3] = ["time", "total_amount", "offer_successful"];

/// Output of a merge run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingTable {
    pub rows: Vec<OutputRow>,
    /// Sorted membership years that get a one-hot column.
    pub member_years: Vec<i32>,
}

impl TrainingTable {
    #[must_use]
    pub fn new(rows: Vec<OutputRow>, mut member_years: Vec<i32>) -> Self {
        member_years.sort_unstable();
        member_years.dedup();
        Self { rows, member_years }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names: labels, then offer columns, then profile columns.
    ///
    /// # Errors
    /// [`MergeError::Schema`] if two columns share a name. The offer and
    /// profile namespaces are disjoint, so this only guards against future
    /// schema edits.
    pub fn header(&self) -> MergeResult<Vec<String>> {
        let mut cols: Vec<String> = LABEL_COLUMNS.iter().map(|c| c.to_string()).collect();
        cols.extend(offer_columns());
        cols.extend(profile_columns(&self.member_years));

        let mut seen = HashSet::with_capacity(cols.len());
        if let Some(dup) = cols.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(MergeError::schema(
                "output",
                format!("column '{dup}' appears twice"),
            ));
        }
        Ok(cols)
    }

    /// Render one row in header order. Booleans and indicators are `0`/`1`,
    /// a missing gender or age bin is an empty field.
    #[must_use]
    pub fn record(&self, row: &OutputRow) -> Vec<String> {
        let o = &row.offer;
        let p = &row.profile;
        let mut rec = vec![
            row.time.to_string(),
            row.total_amount.to_string(),
            row.offer_successful.to_string(),
            o.offerid.clone(),
            o.offer_type.to_string(),
            o.difficulty.to_string(),
            o.reward.to_string(),
            o.duration.to_string(),
        ];
        rec.extend(Channel::ALL.iter().map(|&c| flag(o.channels.contains(c))));
        rec.extend(OfferType::ALL.iter().map(|&t| flag(o.offer_type == t)));

        rec.extend([
            p.customerid.clone(),
            p.gender.map(Gender::as_str).unwrap_or_default().to_string(),
            p.age.to_string(),
            p.income.to_string(),
            p.became_member_on.format("%Y-%m-%d").to_string(),
            p.year_became_member.to_string(),
            p.month_became_member.to_string(),
            p.weekday_became_member.to_string(),
            p.weekday_label().to_string(),
            p.month_label().to_string(),
            p.age_bin.map(AgeBin::label).unwrap_or_default().to_string(),
        ]);
        rec.extend(Gender::ALL.iter().map(|&g| flag(p.gender == Some(g))));
        rec.extend(
            self.member_years
                .iter()
                .map(|&y| flag(p.year_became_member == y)),
        );
        rec.extend(AgeBin::all().map(|b| flag(p.age_bin == Some(b))));
        rec.extend((0..WEEKDAY_LABELS.len()).map(|d| flag(p.weekday_became_member as usize == d)));
        rec
    }

    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(|r| self.record(r))
    }
}

fn flag(b: bool) -> String {
    if b { "1" } else { "0" }.to_string()
}

fn offer_columns() -> Vec<String> {
    let mut cols: Vec<String> = ["offerid", "offer_type", "difficulty", "reward", "duration"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    cols.extend(Channel::ALL.iter().map(|c| format!("channel_{c}")));
    cols.extend(OfferType::ALL.iter().map(|t| format!("offer_{t}")));
    cols
}

fn profile_columns(member_years: &[i32]) -> Vec<String> {
    let mut cols: Vec<String> = [
        "customerid",
        "gender",
        "age",
        "income",
        "became_member_on",
        "year_became_member",
        "month_became_member",
        "weekday_became_member",
        "weekday_became_member_cat",
        "month_became_member_cat",
        "age_bins",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    cols.extend(Gender::ALL.iter().map(|g| format!("gender_{g}")));
    cols.extend(member_years.iter().map(|y| format!("year_bm_{y}")));
    cols.extend(AgeBin::all().map(|b| b.label().to_string()));
    cols.extend(WEEKDAY_LABELS.iter().map(|d| format!("weekda_bm_{d}")));
    cols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ChannelSet, Offer, Profile};
    use chrono::NaiveDate;

    fn row() -> OutputRow {
        OutputRow {
            time: 2.0,
            total_amount: 10.5,
            offer_successful: 1,
            offer: Offer {
                offerid: "o1".into(),
                offer_type: OfferType::Discount,
                difficulty: 10.0,
                reward: 2.0,
                duration: 7.0,
                channels: [Channel::Web, Channel::Email].into_iter().collect::<ChannelSet>(),
            },
            profile: Profile::new(
                "c1",
                Gender::M,
                33,
                72_000.0,
                NaiveDate::from_ymd_opt(2018, 4, 26).unwrap(),
            ),
        }
    }

    #[test]
    fn header_and_record_line_up() -> MergeResult<()> {
        let table = TrainingTable::new(vec![row()], vec![2018, 2013, 2018]);
        assert_eq!(table.member_years, vec![2013, 2018]);

        let header = table.header()?;
        let record = table.record(&table.rows[0]);
        assert_eq!(header.len(), record.len());

        let get = |name: &str| {
            let i = header.iter().position(|h| h == name).expect(name);
            record[i].as_str()
        };
        assert_eq!(get("time"), "2");
        assert_eq!(get("total_amount"), "10.5");
        assert_eq!(get("offer_successful"), "1");
        assert_eq!(get("offer_type"), "discount");
        assert_eq!(get("channel_web"), "1");
        assert_eq!(get("channel_social"), "0");
        assert_eq!(get("offer_discount"), "1");
        assert_eq!(get("offer_bogo"), "0");
        assert_eq!(get("became_member_on"), "2018-04-26");
        assert_eq!(get("gender_M"), "1");
        assert_eq!(get("year_bm_2013"), "0");
        assert_eq!(get("year_bm_2018"), "1");
        assert_eq!(get("31-40"), "1");
        assert_eq!(get("age_bins"), "31-40");
        // 2018-04-26 was a Thursday
        assert_eq!(get("weekday_became_member_cat"), "Thu");
        assert_eq!(get("weekda_bm_Thu"), "1");
        Ok(())
    }

    #[test]
    fn blank_gender_renders_empty_with_no_indicator() -> MergeResult<()> {
        let mut r = row();
        r.profile.gender = None;
        let table = TrainingTable::new(vec![r], vec![2018]);
        let header = table.header()?;
        let record = table.record(&table.rows[0]);
        for (name, value) in header.iter().zip(&record) {
            if name == "gender" {
                assert_eq!(value, "");
            } else if name.starts_with("gender_") {
                assert_eq!(value, "0", "{name}");
            }
        }
        Ok(())
    }

    #[test]
    fn header_order_starts_with_labels_then_offer() -> MergeResult<()> {
        let header = TrainingTable::new(vec![], vec![2017]).header()?;
        assert_eq!(&header[..4], &["time", "total_amount", "offer_successful", "offerid"]);
        let offer_end = header.iter().position(|h| h == "customerid").unwrap();
        assert_eq!(header[offer_end - 1], "offer_informational");
        Ok(())
    }
}
