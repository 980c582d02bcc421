//! Render model of the bill summary panel.

use crate::model::bill::Bill;
use crate::model::item::ItemId;
use crate::model::person::PersonId;
use crate::service::split::{compute_split, format_amount};
use std::fmt::Write as _;

/// Label used for shares whose person no longer exists.
pub const UNKNOWN_PERSON_LABEL: &str = "(unknown)";

/// One line of the items list.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub item_id: ItemId,
    pub name: String,
    pub price: f64,
    /// `"<name> - $<price>"`.
    pub label: String,
}

/// One line of the split list.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRow {
    pub person_id: PersonId,
    pub name: String,
    /// Unrounded owed amount.
    pub amount: f64,
    /// `"<name>: $<amount>"`.
    pub label: String,
}

/// Shared-percentages block of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemShares {
    pub item_id: ItemId,
    pub name: String,
    /// `"<person>: <percentage>%"` in share order.
    pub lines: Vec<String>,
}

/// Everything the summary panel shows, derived from one bill snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillSummary {
    pub items: Vec<ItemRow>,
    pub split: Vec<SplitRow>,
    pub shares: Vec<ItemShares>,
    pub total: f64,
    /// Price portion no existing person covers.
    pub unallocated: f64,
}

impl BillSummary {
    /// Derives the summary from `bill`.
    pub fn from_bill(bill: &Bill) -> Self {
        let split = compute_split(bill);

        let items = bill
            .items
            .iter()
            .map(|item| ItemRow {
                item_id: item.id.clone(),
                name: item.name.clone(),
                price: item.price,
                label: format!("{} - ${}", item.name, format_amount(item.price)),
            })
            .collect();

        let split_rows = split
            .iter()
            .map(|(person_id, amount)| {
                let name = person_name(bill, person_id).to_string();
                SplitRow {
                    person_id: person_id.to_string(),
                    label: format!("{name}: ${}", format_amount(amount)),
                    name,
                    amount,
                }
            })
            .collect();

        let shares = bill
            .items
            .iter()
            .map(|item| ItemShares {
                item_id: item.id.clone(),
                name: item.name.clone(),
                lines: item
                    .shared_by
                    .iter()
                    .map(|share| {
                        format!(
                            "{}: {}%",
                            person_name(bill, &share.person_id),
                            share.percentage
                        )
                    })
                    .collect(),
            })
            .collect();

        Self {
            items,
            split: split_rows,
            shares,
            total: bill.total(),
            unallocated: split.unallocated(),
        }
    }

    /// Split row of `person_id`.
    pub fn split_for(&self, person_id: &str) -> Option<&SplitRow> {
        self.split.iter().find(|row| row.person_id == person_id)
    }
}

fn person_name<'a>(bill: &'a Bill, person_id: &str) -> &'a str {
    bill.person(person_id)
        .map_or(UNKNOWN_PERSON_LABEL, |person| person.name.as_str())
}

/// Plain-text rendering of the summary panel.
pub fn render_text(summary: &BillSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Bill Summary");
    let _ = writeln!(out, "Items:");
    for row in &summary.items {
        let _ = writeln!(out, "  {}", row.label);
    }
    let _ = writeln!(out, "Split:");
    for row in &summary.split {
        let _ = writeln!(out, "  {}", row.label);
    }
    let _ = writeln!(out, "Shared Percentages:");
    for block in &summary.shares {
        let _ = writeln!(out, "  {}", block.name);
        for line in &block.lines {
            let _ = writeln!(out, "    - {line}");
        }
    }
    let _ = writeln!(out, "Total: ${}", format_amount(summary.total));
    if summary.unallocated > 0.0 {
        let _ = writeln!(out, "Unallocated: ${}", format_amount(summary.unallocated));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{render_text, BillSummary, UNKNOWN_PERSON_LABEL};
    use crate::model::bill::Bill;
    use crate::model::item::{BillItem, Share};
    use crate::model::person::Person;

    #[test]
    fn shares_of_missing_people_use_placeholder_label() {
        let bill = Bill::new()
            .with_person_added(Person::with_id("1", "Alice"))
            .with_item_added(BillItem::with_id(
                "tea",
                "Tea",
                4.0,
                vec![Share::new("1", 50), Share::new("ghost", 50)],
            ));

        let summary = BillSummary::from_bill(&bill);

        assert_eq!(
            summary.shares[0].lines,
            vec![
                "Alice: 50%".to_string(),
                format!("{UNKNOWN_PERSON_LABEL}: 50%")
            ]
        );
        assert_eq!(summary.split.len(), 1);
        assert!((summary.unallocated - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_bill_renders_zero_total() {
        let text = render_text(&BillSummary::from_bill(&Bill::new()));
        assert!(text.starts_with("Bill Summary\n"));
        assert!(text.contains("Total: $0.00"));
        assert!(!text.contains("Unallocated"));
    }
}
