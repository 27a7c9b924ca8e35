use std::collections::HashMap;

use tracing::debug;

use crate::schemas::{Expense, Group, MemberName};

/// Net position of every member: positive means the group owes them money,
/// negative means they owe the group.
pub type BalanceSheet = HashMap<MemberName, f64>;

/// Splits every expense evenly across `members` and credits the payer with
/// the full amount.
///
/// A payer that is not in `members` still gets credited and shows up as an
/// extra entry, which breaks the zero-sum property for that sheet. With no
/// members there is nobody to charge, so only the payer credits are applied.
pub fn compute_balances(members: &[MemberName], expenses: &[Expense]) -> BalanceSheet {
    let mut balance: BalanceSheet = members.iter().map(|m| (m.clone(), 0.0)).collect();

    for expense in expenses {
        let amount = expense.amount;
        if !members.is_empty() {
            let amount_per_member = amount / members.len() as f64;
            for member in members {
                balance
                    .entry(member.clone())
                    .and_modify(|v| *v -= amount_per_member)
                    .or_insert(-amount_per_member);
            }
        }
        balance
            .entry(expense.payer.clone())
            .and_modify(|v| *v += amount)
            .or_insert(amount);
    }

    debug!(
        members = members.len(),
        expenses = expenses.len(),
        entries = balance.len(),
        "computed balances"
    );
    balance
}

pub fn compute_balance_from_group(group: &Group) -> BalanceSheet {
    compute_balances(&group.members, &group.expenses)
}

pub fn my_balance(user: &str, members: &[MemberName], expenses: &[Expense]) -> f64 {
    compute_balances(members, expenses)
        .get(user)
        .copied()
        .unwrap_or(0.0)
}

/// How much `user` has to pay to get back to zero. Never negative.
pub fn settlement_amount(user: &str, members: &[MemberName], expenses: &[Expense]) -> f64 {
    (-my_balance(user, members, expenses)).max(0.0)
}

/// Sheet entries in member order, followed by payers outside the member list
/// sorted by name.
pub fn ordered_balances(members: &[MemberName], sheet: &BalanceSheet) -> Vec<(MemberName, f64)> {
    let mut ordered: Vec<(MemberName, f64)> = members
        .iter()
        .map(|m| (m.clone(), sheet.get(m).copied().unwrap_or(0.0)))
        .collect();

    let mut outsiders: Vec<(MemberName, f64)> = sheet
        .iter()
        .filter(|(name, _)| !members.contains(name))
        .map(|(name, value)| (name.clone(), *value))
        .collect();
    outsiders.sort_by(|a, b| a.0.cmp(&b.0));

    ordered.extend(outsiders);
    ordered
}

fn round_to_2_decimals(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Display form of an amount, e.g. `"-30.00 kr"`. Only for output; the
/// result must never be fed back into a computation.
pub fn format_amount(value: f64, currency: &str) -> String {
    let rounded = round_to_2_decimals(value);
    // Drift like -1e-15 would otherwise print as "-0.00"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.2} {}", rounded, currency)
}
